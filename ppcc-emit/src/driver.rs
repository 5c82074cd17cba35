//! Program-level emission driver
//!
//! Selects the dialect once from the configured target, emits the output
//! header and dialect prologue, then renders every global definition in
//! input order. All per-function mutable state (label numbering, literal
//! pools) and the per-run debug-filename interning live in [`EmitCtx`];
//! there is no global mutable state anywhere in the emitter.

use crate::dialect::{self, DebugFiles, Dialect};
use crate::labels::LabelAlloc;
use crate::pools::ConstantPools;
use ppcc_asm::Program;
use ppcc_common::{EmitConfig, EmitError};

/// Mutable emission state threaded through all layers
pub(crate) struct EmitCtx<'a> {
    pub(crate) dialect: &'a dyn Dialect,
    pub(crate) config: &'a EmitConfig,
    pub(crate) out: String,
    pub(crate) labels: LabelAlloc,
    pub(crate) pools: ConstantPools,
    pub(crate) files: DebugFiles,
}

impl<'a> EmitCtx<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect, config: &'a EmitConfig) -> Self {
        Self {
            dialect,
            config,
            out: String::new(),
            labels: LabelAlloc::new(),
            pools: ConstantPools::new(),
            files: DebugFiles::new(),
        }
    }

    /// Version and invocation-options comment header
    fn emit_header(&mut self) {
        let cmt = self.dialect.comment();
        self.out.push_str(&format!(
            "{cmt} File generated by ppcc {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(options) = &self.config.options_comment {
            self.out
                .push_str(&format!("{cmt} Invocation options: {options}\n"));
        }
    }
}

/// Render a whole program as assembly text
///
/// Pure and deterministic: the same program, configuration and dialect
/// always produce byte-identical output. On error the partial buffer is
/// discarded; there is no degraded output mode.
pub fn emit_program(program: &Program, config: &EmitConfig) -> Result<String, EmitError> {
    let dialect = dialect::for_target(&config.target)?;
    let mut ctx = EmitCtx::new(dialect.as_ref(), config);
    ctx.emit_header();
    ctx.dialect.prologue(&mut ctx.out, config.debug_info);
    for def in &program.defs {
        ctx.emit_def(def, program)?;
    }
    Ok(ctx.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_target_is_fatal() {
        let program = Program::new(vec![]);
        let config = EmitConfig::for_target("m68k");
        assert_eq!(
            emit_program(&program, &config).unwrap_err(),
            EmitError::UnknownTarget("m68k".to_string())
        );
    }

    #[test]
    fn test_header_names_the_compiler() {
        let program = Program::new(vec![]);
        let config = EmitConfig::default();
        let out = emit_program(&program, &config).unwrap();
        assert!(out.starts_with("# File generated by ppcc "));
    }

    #[test]
    fn test_options_comment_is_echoed() {
        let program = Program::new(vec![]);
        let config = EmitConfig {
            options_comment: Some("-O1 -g".to_string()),
            ..EmitConfig::default()
        };
        let out = emit_program(&program, &config).unwrap();
        assert!(out.contains("# Invocation options: -O1 -g\n"));
    }
}
