//! PPC32 C Compiler - Machine Instruction Definitions
//!
//! This crate defines the machine-level program representation handed to
//! the assembly emitter: the PPC32 register model, relocatable constants,
//! section placement intents, the instruction set, and global definitions
//! (functions and initialized variables).
//!
//! Everything here is already register-allocated and target-legal; the
//! emitter only turns it into text.

pub mod global;
pub mod inst;
pub mod reg;
pub mod section;

pub use global::{FunctionDef, GlobalDef, InitData, Program, VariableDef};
pub use inst::{BuiltinOp, Cst, Inst, Label};
pub use reg::{CrBit, Fpr, Gpr};
pub use section::{Section, SectionTriple};
