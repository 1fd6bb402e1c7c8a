//! Driver configuration.

/// Configuration for the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Maximum number of items the buffer may retain after a feed.
    ///
    /// Items stay buffered for as long as the active session could roll back
    /// to them, so a single session spanning a huge stream keeps all of it.
    /// Defaults to `None` (unbounded).
    pub buffer_limit: Option<usize>,
}

impl DriverConfig {
    /// Create a new config with the specified buffer limit.
    pub fn with_buffer_limit(limit: usize) -> Self {
        Self {
            buffer_limit: Some(limit),
        }
    }

    /// The limit, if `retained` items exceed it.
    #[inline]
    pub fn exceeded_limit(&self, retained: usize) -> Option<usize> {
        self.buffer_limit.filter(|&limit| retained > limit)
    }
}
