//! Stable error codes.
//!
//! - E1xxx: Parse failures raised by computations
//! - E2xxx: Structural usage errors (combinator or driver misuse)
//! - E3xxx: Resource limits

use std::fmt;

/// Searchable identifier attached to every error the engine reports.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Parse failures (E1xxx)
    /// Leaf expectation not met
    E1001,
    /// Item required at end of input
    E1002,
    /// Every alternative of a choice failed equally deep
    E1003,
    /// Failure raised by user code
    E1004,
    /// Computation broke the request/response protocol
    E1005,

    // Usage errors (E2xxx)
    /// Computation completed without suspending
    E2001,
    /// Computation completed without consuming while input remains
    E2002,
    /// Snapshot replayed into another session
    E2003,
    /// Snapshot offset outside the retained buffer
    E2004,
    /// Input fed after end of input was declared
    E2005,
    /// Driver used after an aborting failure
    E2006,

    // Resource limits (E3xxx)
    /// Retained buffer exceeded the configured limit
    E3001,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E3001 => "E3001",
        }
    }

    /// Check if this is a parse failure code.
    pub fn is_failure(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a usage error code.
    pub fn is_usage_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
