//! Emission configuration
//!
//! Options consumed (not owned) by the assembly emitter. The driver that
//! invokes the backend fills this in from its command line; the emitter
//! itself never touches process arguments or the filesystem.

use serde::{Deserialize, Serialize};

/// Options for assembly emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Target assembler dialect identifier ("elf", "linux" or "diab")
    pub target: String,

    /// Alignment (in bytes) applied before every function entry
    pub function_alignment: u32,

    /// Optional alignment applied before branch-target labels
    pub branch_target_alignment: Option<u32>,

    /// Optional alignment applied before conditional branches
    pub cond_branch_alignment: Option<u32>,

    /// Whether debug information (file/line pseudo-ops) is emitted
    pub debug_info: bool,

    /// Invocation options echoed into the output header comment
    pub options_comment: Option<String>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            target: "elf".to_string(),
            function_alignment: 4,
            branch_target_alignment: None,
            cond_branch_alignment: None,
            debug_info: false,
            options_comment: None,
        }
    }
}

impl EmitConfig {
    /// Configuration for a given target with all other options defaulted
    pub fn for_target(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmitConfig::default();
        assert_eq!(config.target, "elf");
        assert_eq!(config.function_alignment, 4);
        assert_eq!(config.branch_target_alignment, None);
        assert!(!config.debug_info);
    }

    #[test]
    fn test_for_target() {
        let config = EmitConfig::for_target("diab");
        assert_eq!(config.target, "diab");
        assert_eq!(config.function_alignment, 4);
    }
}
