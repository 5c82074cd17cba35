//! Function-scoped literal pools and jump tables
//!
//! While a function body is rendered, float immediate loads deposit their
//! bit patterns here and multiway branches deposit their target tables.
//! At function end everything is flushed into the designated sections and
//! the pools are cleared, so nothing ever leaks into the next function.

use crate::dialect::Dialect;
use ppcc_asm::Section;

/// Accumulated literals and jump tables for one function
#[derive(Debug, Default)]
pub struct ConstantPools {
    /// 64-bit float literals, in discovery order
    doubles: Vec<(u32, u64)>,
    /// 32-bit float literals, in discovery order
    singles: Vec<(u32, u32)>,
    /// Jump tables: table label and translated destination labels
    jumptables: Vec<(u32, Vec<u32>)>,
}

impl ConstantPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_double(&mut self, label: u32, value: f64) {
        self.doubles.push((label, value.to_bits()));
    }

    pub fn record_single(&mut self, label: u32, value: f32) {
        self.singles.push((label, value.to_bits()));
    }

    pub fn record_jumptable(&mut self, label: u32, targets: Vec<u32>) {
        self.jumptables.push((label, targets));
    }

    pub fn is_empty(&self) -> bool {
        self.doubles.is_empty() && self.singles.is_empty() && self.jumptables.is_empty()
    }

    /// Emit pending literals and jump tables, then clear the pools
    ///
    /// 64-bit literals are split into two words, high word first, to match
    /// the target byte order. Alignment is 8 bytes for the literal section
    /// and 4 bytes for the jump-table section.
    pub fn flush(
        &mut self,
        out: &mut String,
        dialect: &dyn Dialect,
        literal: &Section,
        jumptable: &Section,
    ) {
        if !self.doubles.is_empty() || !self.singles.is_empty() {
            out.push_str(&format!("\t{}\n", dialect.section_name(literal)));
            out.push_str("\t.balign\t8\n");
            for (label, bits) in &self.doubles {
                out.push_str(&format!(
                    ".L{}:\t.long\t{:#x}, {:#x}\n",
                    label,
                    bits >> 32,
                    bits & 0xffff_ffff
                ));
            }
            for (label, bits) in &self.singles {
                out.push_str(&format!(".L{label}:\t.long\t{bits:#x}\n"));
            }
        }
        if !self.jumptables.is_empty() {
            out.push_str(&format!("\t{}\n", dialect.section_name(jumptable)));
            out.push_str("\t.balign\t4\n");
            for (label, targets) in &self.jumptables {
                out.push_str(&format!(".L{label}:\n"));
                for target in targets {
                    out.push_str(&format!("\t.long\t.L{target}\n"));
                }
            }
        }
        self.doubles.clear();
        self.singles.clear();
        self.jumptables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::ElfDialect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flush_emits_in_discovery_order() {
        let mut pools = ConstantPools::new();
        pools.record_double(100, 1.0);
        pools.record_double(101, -2.5);
        let mut out = String::new();
        pools.flush(
            &mut out,
            &ElfDialect,
            &Section::Literal,
            &Section::Jumptable,
        );
        assert_eq!(
            out,
            "\t.section\t.rodata.cst8,\"aM\",@progbits,8\n\
             \t.balign\t8\n\
             .L100:\t.long\t0x3ff00000, 0x0\n\
             .L101:\t.long\t0xc0040000, 0x0\n"
        );
        assert!(pools.is_empty());
    }

    #[test]
    fn test_flush_single_precision() {
        let mut pools = ConstantPools::new();
        pools.record_single(102, 1.5);
        let mut out = String::new();
        pools.flush(
            &mut out,
            &ElfDialect,
            &Section::Literal,
            &Section::Jumptable,
        );
        assert!(out.contains(".L102:\t.long\t0x3fc00000\n"));
        assert!(pools.is_empty());
    }

    #[test]
    fn test_flush_jumptable() {
        let mut pools = ConstantPools::new();
        pools.record_jumptable(104, vec![100, 101, 102]);
        let mut out = String::new();
        pools.flush(
            &mut out,
            &ElfDialect,
            &Section::Literal,
            &Section::Jumptable,
        );
        assert_eq!(
            out,
            "\t.text\n\
             \t.balign\t4\n\
             .L104:\n\
             \t.long\t.L100\n\
             \t.long\t.L101\n\
             \t.long\t.L102\n"
        );
        assert!(pools.is_empty());
    }

    #[test]
    fn test_empty_pools_emit_nothing() {
        let mut pools = ConstantPools::new();
        let mut out = String::new();
        pools.flush(
            &mut out,
            &ElfDialect,
            &Section::Literal,
            &Section::Jumptable,
        );
        assert_eq!(out, "");
    }
}
