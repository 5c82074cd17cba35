//! Global definitions handed to the emitter
//!
//! A program is an ordered list of global definitions plus per-symbol
//! section assignments. Functions carry their instruction sequence and
//! metadata; variables carry an ordered initializer list. Definitions with
//! an empty body/initializer are pure declarations and produce no output.

use crate::inst::Inst;
use crate::section::{Section, SectionTriple};
use ppcc_common::SourceLoc;
use std::collections::HashMap;

/// A compiled function ready for printing
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// Instruction sequence; empty means declaration only
    pub code: Vec<Inst>,
    /// Internal linkage (no .globl directive)
    pub is_static: bool,
    /// Source position of the function, for debug output
    pub loc: Option<SourceLoc>,
    /// Frame size in bytes, already materialized by frame lowering
    pub stack_size: u32,
}

/// One item of a variable initializer
#[derive(Debug, Clone, PartialEq)]
pub enum InitData {
    Int8(u8),
    Int16(u16),
    Int32(u32),
    Int64(u64),
    Float32(f32),
    Float64(f64),
    /// N bytes of zeroes
    Space(u32),
    /// Address of a symbol plus byte offset
    Addrof(String, i32),
}

impl InitData {
    /// Size of the item in bytes
    pub fn size(&self) -> u32 {
        match self {
            InitData::Int8(_) => 1,
            InitData::Int16(_) => 2,
            InitData::Int32(_) | InitData::Float32(_) | InitData::Addrof(_, _) => 4,
            InitData::Int64(_) | InitData::Float64(_) => 8,
            InitData::Space(n) => *n,
        }
    }
}

/// A global variable ready for printing
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    /// Initializer items; empty means declaration only
    pub init: Vec<InitData>,
    /// Explicit section, or None for the default placement
    pub section: Option<Section>,
    /// Explicit alignment in bytes, or None for the default (8)
    pub align: Option<u32>,
    /// Internal linkage (no .globl directive, .lcomm instead of .comm)
    pub is_static: bool,
}

/// A global definition: function or variable
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalDef {
    Function(FunctionDef),
    Variable(VariableDef),
}

/// A whole compilation unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Definitions in source order
    pub defs: Vec<GlobalDef>,
    /// Per-function section assignments; missing entries use the default
    pub sections: HashMap<String, SectionTriple>,
}

impl Program {
    pub fn new(defs: Vec<GlobalDef>) -> Self {
        Self {
            defs,
            sections: HashMap::new(),
        }
    }

    /// Section triple for a function symbol
    pub fn sections_for(&self, name: &str) -> SectionTriple {
        self.sections.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_data_sizes() {
        assert_eq!(InitData::Int8(1).size(), 1);
        assert_eq!(InitData::Int16(1).size(), 2);
        assert_eq!(InitData::Int32(1).size(), 4);
        assert_eq!(InitData::Int64(1).size(), 8);
        assert_eq!(InitData::Float32(1.0).size(), 4);
        assert_eq!(InitData::Float64(1.0).size(), 8);
        assert_eq!(InitData::Space(64).size(), 64);
        assert_eq!(InitData::Addrof("x".to_string(), 0).size(), 4);
    }

    #[test]
    fn test_default_section_lookup() {
        let program = Program::new(vec![]);
        let triple = program.sections_for("anything");
        assert_eq!(triple, SectionTriple::default());
    }
}
