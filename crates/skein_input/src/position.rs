//! Line/column tracking driven by observer hooks.

use std::fmt;

use skein_parse::Observer;

/// A location in a character stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Characters consumed before this point.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
}

impl Position {
    /// The start of a stream.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// The position after `c`.
    #[must_use]
    pub fn advance(self, c: char) -> Self {
        if c == '\n' {
            Position {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Observer keeping a [`Position`] in step with the driver's cursor.
///
/// Every consumption pushes the previous position onto a history stack so a
/// rollback can restore it exactly, newlines included. A completed session
/// can never be rolled back, so completion clears the history.
#[derive(Clone, Debug, Default)]
pub struct LineTracker {
    position: Position,
    history: Vec<Position>,
}

impl LineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the driver's cursor.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of positions that can still be rolled back.
    pub fn pending(&self) -> usize {
        self.history.len()
    }
}

impl<O> Observer<char, O> for LineTracker {
    fn on_consume(&mut self, item: &char) {
        self.history.push(self.position);
        self.position = self.position.advance(*item);
    }

    fn on_rollback(&mut self, dropped: &[char]) {
        let keep = self.history.len().saturating_sub(dropped.len());
        if let Some(&restored) = self.history.get(keep) {
            self.position = restored;
        }
        self.history.truncate(keep);
    }

    fn on_complete(&mut self, _output: &O) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skein_parse::Observer;

    use super::{LineTracker, Position};

    fn consume(tracker: &mut LineTracker, text: &str) {
        for c in text.chars() {
            Observer::<char, ()>::on_consume(tracker, &c);
        }
    }

    #[test]
    fn test_advance_counts_lines() {
        let mut tracker = LineTracker::new();
        consume(&mut tracker, "ab\ncd");
        assert_eq!(
            tracker.position(),
            Position {
                offset: 5,
                line: 2,
                column: 3
            }
        );
        assert_eq!(tracker.position().to_string(), "2:3");
    }

    #[test]
    fn test_rollback_restores_across_newline() {
        let mut tracker = LineTracker::new();
        consume(&mut tracker, "x\n");
        let before = tracker.position();
        consume(&mut tracker, "y\nz");
        Observer::<char, ()>::on_rollback(&mut tracker, &['y', '\n', 'z']);
        assert_eq!(tracker.position(), before);
        assert_eq!(tracker.pending(), 2);
    }

    #[test]
    fn test_complete_commits_history() {
        let mut tracker = LineTracker::new();
        consume(&mut tracker, "abc");
        Observer::<char, ()>::on_complete(&mut tracker, &());
        assert_eq!(tracker.pending(), 0);
        assert_eq!(tracker.position().offset, 3);
    }
}
