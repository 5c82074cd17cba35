//! Function and variable emission
//!
//! One global definition at a time: section switching, alignment,
//! visibility, the entry label, the body or initializer items, size/type
//! directives, and the end-of-function pool flush. Definitions without a
//! body or initializer are declarations and emit nothing.

use crate::driver::EmitCtx;
use log::debug;
use once_cell::sync::Lazy;
use ppcc_asm::section::COMM_SECTION;
use ppcc_asm::{FunctionDef, GlobalDef, InitData, Program, Section, VariableDef};
use ppcc_common::EmitError;
use regex::Regex;

/// Naming convention for compiler-generated string literals
static STRING_LITERAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__stringlit_[0-9]+$").expect("string literal regex"));

/// An all-byte initializer for a string-literal symbol prints as .ascii
fn is_string_literal(name: &str, init: &[InitData]) -> bool {
    STRING_LITERAL_NAME.is_match(name)
        && !init.is_empty()
        && init.iter().all(|item| matches!(item, InitData::Int8(_)))
}

/// Escape initializer bytes for an .ascii directive
///
/// Printable ASCII passes through; everything else (including embedded
/// NUL bytes) becomes a three-digit octal escape so the assembled bytes
/// match the initializer exactly.
fn ascii_escape(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'"' => escaped.push_str("\\\""),
            b'\\' => escaped.push_str("\\\\"),
            0x20..=0x7e => escaped.push(b as char),
            _ => escaped.push_str(&format!("\\{b:03o}")),
        }
    }
    escaped
}

impl EmitCtx<'_> {
    fn switch_section(&mut self, section: &Section) {
        let name = self.dialect.section_name(section);
        self.out.push_str(&format!("\t{name}\n"));
    }

    fn balign(&mut self, align: u32) {
        self.out.push_str(&format!("\t.balign\t{align}\n"));
    }

    pub(crate) fn emit_def(&mut self, def: &GlobalDef, program: &Program) -> Result<(), EmitError> {
        match def {
            GlobalDef::Function(f) if f.code.is_empty() => Ok(()),
            GlobalDef::Function(f) => self.emit_function(f, program),
            GlobalDef::Variable(v) if v.init.is_empty() => Ok(()),
            GlobalDef::Variable(v) => self.emit_variable(v),
        }
    }

    fn emit_function(&mut self, f: &FunctionDef, program: &Program) -> Result<(), EmitError> {
        debug!("emitting function '{}'", f.name);
        let triple = program.sections_for(&f.name);
        let d = self.dialect;
        self.switch_section(&triple.text);
        self.balign(self.config.function_alignment);
        if !f.is_static {
            self.out.push_str(&format!("\t.globl\t{}\n", f.name));
        }
        self.out.push_str(&format!("{}:\n", f.name));
        if let Some(loc) = &f.loc {
            d.file_line(&mut self.out, &mut self.files, &loc.filename, loc.line);
        }
        if f.stack_size > 0 {
            self.out
                .push_str(&format!("{} frame size: {} bytes\n", d.comment(), f.stack_size));
        }
        d.cfi_startproc(&mut self.out);
        self.labels.reset();
        self.emit_body(&f.code)?;
        d.cfi_endproc(&mut self.out);
        d.fun_info(&mut self.out, &f.name);
        self.pools
            .flush(&mut self.out, d, &triple.literal, &triple.jumptable);
        Ok(())
    }

    fn emit_variable(&mut self, v: &VariableDef) -> Result<(), EmitError> {
        debug!("emitting variable '{}'", v.name);
        let initialized = !matches!(v.init.as_slice(), [InitData::Space(_)]);
        let section = v
            .section
            .clone()
            .unwrap_or(Section::Data { initialized });
        let align = v.align.unwrap_or(8);
        let section_name = self.dialect.section_name(&section);
        if section_name == COMM_SECTION {
            let size = match v.init.as_slice() {
                [InitData::Space(n)] => *n,
                _ => {
                    return Err(EmitError::internal(format!(
                        "common symbol '{}' has a non-zero-fill initializer",
                        v.name
                    )));
                }
            };
            let directive = if v.is_static { ".lcomm" } else { ".comm" };
            self.out
                .push_str(&format!("\t{directive}\t{}, {size}, {align}\n", v.name));
            return Ok(());
        }
        self.out.push_str(&format!("\t{section_name}\n"));
        self.balign(align);
        if !v.is_static {
            self.out.push_str(&format!("\t.globl\t{}\n", v.name));
        }
        self.out.push_str(&format!("{}:\n", v.name));
        if is_string_literal(&v.name, &v.init) {
            let bytes: Vec<u8> = v
                .init
                .iter()
                .filter_map(|item| match item {
                    InitData::Int8(b) => Some(*b),
                    _ => None,
                })
                .collect();
            self.out
                .push_str(&format!("\t.ascii\t\"{}\"\n", ascii_escape(&bytes)));
        } else {
            for item in &v.init {
                self.emit_init_data(item);
            }
        }
        let d = self.dialect;
        d.var_info(&mut self.out, &v.name);
        Ok(())
    }

    fn emit_init_data(&mut self, item: &InitData) {
        let cmt = self.dialect.comment();
        let line = match item {
            InitData::Int8(b) => format!("\t.byte\t{b:#x}\n"),
            InitData::Int16(h) => format!("\t.short\t{h:#x}\n"),
            InitData::Int32(w) => format!("\t.long\t{w:#x}\n"),
            InitData::Int64(dw) => {
                format!("\t.long\t{:#x}, {:#x}\n", dw >> 32, dw & 0xffff_ffff)
            }
            InitData::Float32(x) => {
                format!("\t.long\t{:#x} {cmt} {x}\n", x.to_bits())
            }
            InitData::Float64(x) => {
                let bits = x.to_bits();
                format!(
                    "\t.long\t{:#x}, {:#x} {cmt} {x}\n",
                    bits >> 32,
                    bits & 0xffff_ffff
                )
            }
            InitData::Space(n) => format!("\t.space\t{n}\n"),
            InitData::Addrof(sym, ofs) => {
                if *ofs > 0 {
                    format!("\t.long\t{sym} + {ofs}\n")
                } else if *ofs < 0 {
                    format!("\t.long\t{sym} - {}\n", -i64::from(*ofs))
                } else {
                    format!("\t.long\t{sym}\n")
                }
            }
        };
        self.out.push_str(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_detection() {
        let bytes = vec![InitData::Int8(b'h'), InitData::Int8(b'i'), InitData::Int8(0)];
        assert!(is_string_literal("__stringlit_1", &bytes));
        assert!(is_string_literal("__stringlit_42", &bytes));
        assert!(!is_string_literal("message", &bytes));
        assert!(!is_string_literal("__stringlit_", &bytes));
        assert!(!is_string_literal("__stringlit_1", &[]));
        assert!(!is_string_literal(
            "__stringlit_1",
            &[InitData::Int8(b'h'), InitData::Int32(0)]
        ));
    }

    #[test]
    fn test_ascii_escape_round_trips() {
        assert_eq!(ascii_escape(b"hello"), "hello");
        assert_eq!(ascii_escape(b"a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(ascii_escape(b"line\n\0end"), "line\\012\\000end");
        assert_eq!(ascii_escape(&[0xff]), "\\377");
    }
}
