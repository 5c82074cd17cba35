//! PPC32 C Compiler - Assembly Emission Backend
//!
//! This crate is the final stage of the compiler: it turns a fully
//! register-allocated instruction sequence into textual assembly for one
//! of the supported assembler dialects (ELF/GNU as, Diab). It handles:
//!
//! - Dialect-specific syntax (register spelling, relocations, sections)
//! - Branch relaxation (short vs long conditional branch forms)
//! - Jump table and floating-point literal pool materialization
//! - Global variable initializer rendering
//!
//! The entry point is [`emit_program`]: a pure function from a program,
//! plus emission configuration, to an assembly text stream.

pub mod dialect;
pub mod driver;
pub mod labels;
pub mod layout;
pub mod masks;
pub mod pools;

mod instr;
mod unit;

#[cfg(test)]
mod tests;

pub use dialect::{Dialect, DiabDialect, ElfDialect};
pub use driver::emit_program;
