//! PPC32 C Compiler - Common Types and Utilities
//!
//! This crate contains shared types, error definitions, and configuration
//! used across the assembly emission components of the PPC32 compiler.

pub mod config;
pub mod error;
pub mod source_loc;

pub use config::EmitConfig;
pub use error::EmitError;
pub use source_loc::SourceLoc;
