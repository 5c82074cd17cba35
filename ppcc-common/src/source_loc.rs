//! Source location tracking for debug output
//!
//! This module provides the location type attached to compiled functions
//! and consumed by the emitter to produce file/line debug pseudo-ops.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line is 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    pub filename: String,
    pub line: u32,
}

impl SourceLoc {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
        }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0)
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = SourceLoc::new("main.c", 42);
        assert_eq!(loc.to_string(), "main.c:42");
    }
}
