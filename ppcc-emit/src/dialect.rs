//! Assembler dialect abstraction
//!
//! All syntax decisions that differ between assemblers live behind the
//! [`Dialect`] trait: comment markers, register spelling, relocation
//! suffixes, section directive strings, call-frame-info support, and the
//! file prologue. The renderer and unit emitter never branch on the
//! target themselves; they go through the selected dialect.
//!
//! Adding a third dialect means adding one implementation here, nothing
//! else changes.

use ppcc_asm::{CrBit, Cst, Fpr, Gpr, Section};
use ppcc_common::EmitError;
use std::collections::HashMap;

/// Per-run interning of debug filenames
///
/// Filenames are numbered on first use (ELF `.file N`) or tracked as the
/// current file (Diab `.d2file`). Fresh per emission run, so repeated runs
/// produce identical output.
#[derive(Debug, Default)]
pub struct DebugFiles {
    numbers: HashMap<String, u32>,
    next: u32,
    current: Option<String>,
}

impl DebugFiles {
    pub fn new() -> Self {
        Self {
            numbers: HashMap::new(),
            next: 1,
            current: None,
        }
    }

    /// File number for a filename; true if this is its first use
    pub fn intern(&mut self, filename: &str) -> (u32, bool) {
        if let Some(&num) = self.numbers.get(filename) {
            return (num, false);
        }
        let num = self.next;
        self.next += 1;
        self.numbers.insert(filename.to_string(), num);
        (num, true)
    }

    /// Switch the current filename; true if it changed
    pub fn set_current(&mut self, filename: &str) -> bool {
        if self.current.as_deref() == Some(filename) {
            return false;
        }
        self.current = Some(filename.to_string());
        true
    }
}

/// Syntax rules for one target assembler
pub trait Dialect {
    /// Comment marker, e.g. "#" or ";"
    fn comment(&self) -> &'static str;

    /// Spelling of a general-purpose register operand
    fn gpr(&self, r: Gpr) -> String;

    /// Spelling of a floating-point register operand
    fn fpr(&self, r: Fpr) -> String;

    /// Spelling of a condition register operand (cr0, cr1, ...)
    fn creg(&self, n: u8) -> String;

    /// Spelling of a condition bit operand
    fn crbit(&self, b: CrBit) -> String {
        b.number().to_string()
    }

    /// Render a constant with its dialect relocation suffix
    fn constant(&self, c: &Cst) -> String;

    /// High-half relocation of a local label address
    fn label_high(&self, n: u32) -> String {
        format!(".L{n}@ha")
    }

    /// Low-half relocation of a local label address
    fn label_low(&self, n: u32) -> String {
        format!(".L{n}@l")
    }

    /// Section directive string for a placement intent
    ///
    /// Returns the reserved sentinel [`ppcc_asm::section::COMM_SECTION`]
    /// for data that must be emitted as common storage instead.
    fn section_name(&self, s: &Section) -> String;

    /// Whether this assembler accepts call-frame-info directives
    fn supports_cfi(&self) -> bool;

    fn cfi_startproc(&self, out: &mut String) {
        if self.supports_cfi() {
            out.push_str("\t.cfi_startproc\n");
        }
    }

    fn cfi_endproc(&self, out: &mut String) {
        if self.supports_cfi() {
            out.push_str("\t.cfi_endproc\n");
        }
    }

    fn cfi_adjust(&self, out: &mut String, delta: i32) {
        if self.supports_cfi() {
            out.push_str(&format!("\t.cfi_adjust_cfa_offset\t{delta}\n"));
        }
    }

    fn cfi_rel_offset(&self, out: &mut String, reg: Gpr, ofs: i32) {
        if self.supports_cfi() {
            out.push_str(&format!("\t.cfi_rel_offset\t{}, {}\n", self.gpr(reg), ofs));
        }
    }

    /// Emit type/size directives after a function body
    fn fun_info(&self, out: &mut String, name: &str);

    /// Emit type/size directives after a variable
    fn var_info(&self, out: &mut String, name: &str);

    /// Emit file/line debug pseudo-ops
    fn file_line(&self, out: &mut String, files: &mut DebugFiles, file: &str, line: u32);

    /// Emit the dialect-specific file prologue
    fn prologue(&self, out: &mut String, debug_info: bool);
}

/// Select the dialect for a configured target identifier
pub fn for_target(target: &str) -> Result<Box<dyn Dialect>, EmitError> {
    match target {
        "elf" | "linux" => Ok(Box::new(ElfDialect)),
        "diab" => Ok(Box::new(DiabDialect)),
        other => Err(EmitError::UnknownTarget(other.to_string())),
    }
}

/// `name`, `name + ofs` or `name - ofs`
fn symbol_offset(name: &str, ofs: i32) -> String {
    if ofs > 0 {
        format!("{name} + {ofs}")
    } else if ofs < 0 {
        format!("{name} - {}", -(ofs as i64))
    } else {
        name.to_string()
    }
}

/// ELF / GNU as syntax (Linux targets)
///
/// Registers are spelled as bare numbers; relocation operators apply to a
/// parenthesized symbol expression.
pub struct ElfDialect;

impl Dialect for ElfDialect {
    fn comment(&self) -> &'static str {
        "#"
    }

    fn gpr(&self, r: Gpr) -> String {
        r.number().to_string()
    }

    fn fpr(&self, r: Fpr) -> String {
        r.number().to_string()
    }

    fn creg(&self, n: u8) -> String {
        n.to_string()
    }

    fn constant(&self, c: &Cst) -> String {
        match c {
            Cst::Int(n) => n.to_string(),
            Cst::Symbol(s, ofs) => symbol_offset(s, *ofs),
            Cst::SymbolLow(s, ofs) => format!("({})@l", symbol_offset(s, *ofs)),
            Cst::SymbolHigh(s, ofs) => format!("({})@ha", symbol_offset(s, *ofs)),
            Cst::SymbolRelLow(s, ofs) => format!("({})@sda21@l", symbol_offset(s, *ofs)),
            Cst::SymbolRelHigh(s, ofs) => format!("({})@sda21@ha", symbol_offset(s, *ofs)),
        }
    }

    fn section_name(&self, s: &Section) -> String {
        match s {
            Section::Text => ".text".to_string(),
            Section::Data { initialized: true } => ".data".to_string(),
            Section::Data { initialized: false } => ppcc_asm::section::COMM_SECTION.to_string(),
            Section::SmallData { initialized: true } => {
                ".section\t.sdata,\"aw\",@progbits".to_string()
            }
            Section::SmallData { initialized: false } => {
                ppcc_asm::section::COMM_SECTION.to_string()
            }
            Section::Const => ".rodata".to_string(),
            Section::SmallConst => ".section\t.sdata2,\"a\",@progbits".to_string(),
            Section::StringLit => ".rodata".to_string(),
            Section::Literal => ".section\t.rodata.cst8,\"aM\",@progbits,8".to_string(),
            Section::Jumptable => ".text".to_string(),
            Section::User {
                name,
                writable,
                executable,
            } => {
                let mut flags = String::from("a");
                if *writable {
                    flags.push('w');
                }
                if *executable {
                    flags.push('x');
                }
                format!(".section\t\"{name}\",\"{flags}\",@progbits")
            }
        }
    }

    fn supports_cfi(&self) -> bool {
        true
    }

    fn fun_info(&self, out: &mut String, name: &str) {
        out.push_str(&format!("\t.type\t{name}, @function\n"));
        out.push_str(&format!("\t.size\t{name}, . - {name}\n"));
    }

    fn var_info(&self, out: &mut String, name: &str) {
        out.push_str(&format!("\t.type\t{name}, @object\n"));
        out.push_str(&format!("\t.size\t{name}, . - {name}\n"));
    }

    fn file_line(&self, out: &mut String, files: &mut DebugFiles, file: &str, line: u32) {
        let (num, first) = files.intern(file);
        if first {
            out.push_str(&format!("\t.file\t{num} \"{file}\"\n"));
        }
        out.push_str(&format!("\t.loc\t{num} {line}\n"));
    }

    fn prologue(&self, _out: &mut String, _debug_info: bool) {
        // GNU as needs no prologue directives
    }
}

/// Diab assembler syntax
///
/// Registers carry their r/f prefix, relocation operators apply to the
/// bare symbol expression, and CFI directives are not accepted at all.
pub struct DiabDialect;

impl Dialect for DiabDialect {
    fn comment(&self) -> &'static str {
        ";"
    }

    fn gpr(&self, r: Gpr) -> String {
        format!("r{}", r.number())
    }

    fn fpr(&self, r: Fpr) -> String {
        format!("f{}", r.number())
    }

    fn creg(&self, n: u8) -> String {
        format!("cr{n}")
    }

    fn constant(&self, c: &Cst) -> String {
        match c {
            Cst::Int(n) => n.to_string(),
            Cst::Symbol(s, ofs) => symbol_offset(s, *ofs),
            Cst::SymbolLow(s, ofs) => format!("{}@l", symbol_offset(s, *ofs)),
            Cst::SymbolHigh(s, ofs) => format!("{}@ha", symbol_offset(s, *ofs)),
            Cst::SymbolRelLow(s, ofs) => format!("{}@sdarx@l", symbol_offset(s, *ofs)),
            Cst::SymbolRelHigh(s, ofs) => format!("{}@sdarx@ha", symbol_offset(s, *ofs)),
        }
    }

    fn section_name(&self, s: &Section) -> String {
        match s {
            Section::Text => ".text".to_string(),
            Section::Data { initialized: true } => ".data".to_string(),
            Section::Data { initialized: false } => ppcc_asm::section::COMM_SECTION.to_string(),
            Section::SmallData { initialized: true } => ".sdata".to_string(),
            Section::SmallData { initialized: false } => {
                ppcc_asm::section::COMM_SECTION.to_string()
            }
            Section::Const => ".rodata".to_string(),
            Section::SmallConst => ".sdata2".to_string(),
            Section::StringLit => ".rodata".to_string(),
            Section::Literal => ".rodata".to_string(),
            Section::Jumptable => ".text".to_string(),
            Section::User {
                name,
                writable,
                executable,
            } => {
                let class = if *executable {
                    'c'
                } else if *writable {
                    'd'
                } else {
                    'n'
                };
                format!(".section\t{name},,{class}")
            }
        }
    }

    fn supports_cfi(&self) -> bool {
        false
    }

    fn fun_info(&self, out: &mut String, name: &str) {
        out.push_str(&format!("\t.type\t{name},@function\n"));
    }

    fn var_info(&self, out: &mut String, name: &str) {
        out.push_str(&format!("\t.type\t{name},@object\n"));
    }

    fn file_line(&self, out: &mut String, files: &mut DebugFiles, file: &str, line: u32) {
        if files.set_current(file) {
            out.push_str(&format!("\t.d2file\t\"{file}\"\n"));
        }
        out.push_str(&format!("\t.d2line\t{line}\n"));
    }

    fn prologue(&self, out: &mut String, debug_info: bool) {
        out.push_str("\t.xopt\talign-fill-text=0x60000000\n");
        if debug_info {
            out.push_str("\t.xopt\tasm-debug-on\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_target_selection() {
        assert!(for_target("elf").is_ok());
        assert!(for_target("linux").is_ok());
        assert!(for_target("diab").is_ok());
        assert_eq!(
            for_target("vax").err(),
            Some(EmitError::UnknownTarget("vax".to_string()))
        );
    }

    #[test]
    fn test_register_spelling() {
        assert_eq!(ElfDialect.gpr(Gpr::R3), "3");
        assert_eq!(ElfDialect.fpr(Fpr::F13), "13");
        assert_eq!(ElfDialect.creg(0), "0");
        assert_eq!(DiabDialect.gpr(Gpr::R3), "r3");
        assert_eq!(DiabDialect.fpr(Fpr::F13), "f13");
        assert_eq!(DiabDialect.creg(0), "cr0");
    }

    #[test]
    fn test_constant_relocations() {
        let low = Cst::SymbolLow("buf".to_string(), 4);
        let high = Cst::SymbolHigh("buf".to_string(), 0);
        assert_eq!(ElfDialect.constant(&low), "(buf + 4)@l");
        assert_eq!(ElfDialect.constant(&high), "(buf)@ha");
        assert_eq!(DiabDialect.constant(&low), "buf + 4@l");
        assert_eq!(DiabDialect.constant(&high), "buf@ha");

        let neg = Cst::Symbol("tbl".to_string(), -8);
        assert_eq!(ElfDialect.constant(&neg), "tbl - 8");
        assert_eq!(ElfDialect.constant(&Cst::Int(-42)), "-42");
    }

    #[test]
    fn test_label_relocations_agree_across_dialects() {
        assert_eq!(ElfDialect.label_high(102), ".L102@ha");
        assert_eq!(ElfDialect.label_low(102), ".L102@l");
        assert_eq!(DiabDialect.label_high(102), ".L102@ha");
        assert_eq!(DiabDialect.label_low(102), ".L102@l");
    }

    #[test]
    fn test_small_data_relocations() {
        let rel = Cst::SymbolRelLow("counter".to_string(), 0);
        assert_eq!(ElfDialect.constant(&rel), "(counter)@sda21@l");
        assert_eq!(DiabDialect.constant(&rel), "counter@sdarx@l");
    }

    #[test]
    fn test_uninitialized_sections_are_comm() {
        let bss = Section::Data { initialized: false };
        assert_eq!(ElfDialect.section_name(&bss), "COMM");
        assert_eq!(DiabDialect.section_name(&bss), "COMM");
        let sbss = Section::SmallData { initialized: false };
        assert_eq!(ElfDialect.section_name(&sbss), "COMM");
    }

    #[test]
    fn test_cfi_is_noop_for_diab() {
        let mut out = String::new();
        DiabDialect.cfi_startproc(&mut out);
        DiabDialect.cfi_adjust(&mut out, 16);
        DiabDialect.cfi_rel_offset(&mut out, Gpr::R31, -4);
        DiabDialect.cfi_endproc(&mut out);
        assert_eq!(out, "");

        let mut out = String::new();
        ElfDialect.cfi_startproc(&mut out);
        ElfDialect.cfi_adjust(&mut out, 16);
        ElfDialect.cfi_endproc(&mut out);
        assert_eq!(
            out,
            "\t.cfi_startproc\n\t.cfi_adjust_cfa_offset\t16\n\t.cfi_endproc\n"
        );
    }

    #[test]
    fn test_file_line_interning() {
        let mut files = DebugFiles::new();
        let mut out = String::new();
        ElfDialect.file_line(&mut out, &mut files, "a.c", 10);
        ElfDialect.file_line(&mut out, &mut files, "a.c", 11);
        ElfDialect.file_line(&mut out, &mut files, "b.c", 3);
        assert_eq!(
            out,
            "\t.file\t1 \"a.c\"\n\t.loc\t1 10\n\t.loc\t1 11\n\t.file\t2 \"b.c\"\n\t.loc\t2 3\n"
        );
    }

    #[test]
    fn test_diab_prologue() {
        let mut out = String::new();
        DiabDialect.prologue(&mut out, false);
        assert_eq!(out, "\t.xopt\talign-fill-text=0x60000000\n");

        let mut out = String::new();
        DiabDialect.prologue(&mut out, true);
        assert_eq!(
            out,
            "\t.xopt\talign-fill-text=0x60000000\n\t.xopt\tasm-debug-on\n"
        );
    }
}
