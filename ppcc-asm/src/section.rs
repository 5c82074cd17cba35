//! Section placement intents
//!
//! Sections here describe *where* a definition wants to live, not how the
//! directive is spelled; the dialect maps each intent to its own section
//! directive string. One reserved sentinel string, `"COMM"`, means the
//! data has no section at all and is emitted as common storage.

use serde::{Deserialize, Serialize};

/// Sentinel section-directive string for common (uninitialized) storage
pub const COMM_SECTION: &str = "COMM";

/// Placement intent for a global definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    /// Executable code
    Text,
    /// Read-write data; uninitialized data may become common storage
    Data { initialized: bool },
    /// Read-write data addressable from the small-data base register
    SmallData { initialized: bool },
    /// Read-only data
    Const,
    /// Read-only data addressable from the small-data base register
    SmallConst,
    /// String literals
    StringLit,
    /// Floating-point literal pool
    Literal,
    /// Jump tables
    Jumptable,
    /// User-named section with explicit attributes
    User {
        name: String,
        writable: bool,
        executable: bool,
    },
}

/// Per-function section assignment: code, literal pool, jump tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTriple {
    pub text: Section,
    pub literal: Section,
    pub jumptable: Section,
}

impl Default for SectionTriple {
    fn default() -> Self {
        Self {
            text: Section::Text,
            literal: Section::Literal,
            jumptable: Section::Jumptable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_triple() {
        let triple = SectionTriple::default();
        assert_eq!(triple.text, Section::Text);
        assert_eq!(triple.literal, Section::Literal);
        assert_eq!(triple.jumptable, Section::Jumptable);
    }
}
