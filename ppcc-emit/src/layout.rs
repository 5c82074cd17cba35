//! Code layout estimation
//!
//! Before printing a function body, every label is assigned an estimated
//! offset from the function start, measured in conservative size units.
//! The estimate decides which conditional branches fit the short encoding;
//! it is never used to emit real addresses, so over-approximation is safe
//! as long as it is consistent on both sides of each branch.

use ppcc_asm::{Inst, Label};
use std::collections::HashMap;

/// Conservative size of one instruction, in units of one machine word
///
/// Pseudo-instructions count what their expansion can emit at most: a
/// conditional branch may need the two-instruction long form, a float
/// immediate load expands to two instructions, a jump-table branch to
/// five. Labels, builtins and CFI directives occupy no code space.
pub fn instr_size(inst: &Inst) -> u32 {
    match inst {
        Inst::Label(_) | Inst::Builtin(_) | Inst::CfiAdjust(_) | Inst::CfiRelOffset(_, _) => 0,
        Inst::Bt(_, _) | Inst::Bf(_, _) | Inst::Lfi(_, _) | Inst::Lfis(_, _) => 2,
        Inst::Btbl(_, _) => 5,
        _ => 1,
    }
}

/// Estimated offset of every label defined in the instruction sequence
pub fn label_positions(code: &[Inst]) -> HashMap<Label, u32> {
    let mut positions = HashMap::new();
    let mut pc = 0u32;
    for inst in code {
        if let Inst::Label(lbl) = inst {
            positions.insert(*lbl, pc);
        }
        pc += instr_size(inst);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppcc_asm::{BuiltinOp, CrBit, Fpr, Gpr};

    #[test]
    fn test_size_costs() {
        assert_eq!(instr_size(&Inst::Add(Gpr::R3, Gpr::R4, Gpr::R5)), 1);
        assert_eq!(instr_size(&Inst::Label(Label(1))), 0);
        assert_eq!(
            instr_size(&Inst::Builtin(BuiltinOp::Annot("x".to_string()))),
            0
        );
        assert_eq!(instr_size(&Inst::CfiAdjust(8)), 0);
        assert_eq!(instr_size(&Inst::Bt(CrBit::Eq, Label(1))), 2);
        assert_eq!(instr_size(&Inst::Lfi(Fpr::F1, 1.0)), 2);
        assert_eq!(instr_size(&Inst::Lfis(Fpr::F1, 1.0)), 2);
        assert_eq!(instr_size(&Inst::Btbl(Gpr::R3, vec![Label(1)])), 5);
    }

    #[test]
    fn test_positions_record_running_offset() {
        let code = vec![
            Inst::Label(Label(0)),
            Inst::Add(Gpr::R3, Gpr::R4, Gpr::R5),
            Inst::Bt(CrBit::Lt, Label(0)),
            Inst::Label(Label(1)),
            Inst::Blr,
            Inst::Label(Label(2)),
        ];
        let positions = label_positions(&code);
        assert_eq!(positions[&Label(0)], 0);
        assert_eq!(positions[&Label(1)], 3);
        assert_eq!(positions[&Label(2)], 4);
    }

    #[test]
    fn test_positions_monotonically_non_decreasing() {
        let code = vec![
            Inst::Label(Label(0)),
            Inst::Label(Label(1)),
            Inst::Lfi(Fpr::F0, 2.5),
            Inst::Label(Label(2)),
            Inst::Btbl(Gpr::R3, vec![Label(0)]),
            Inst::Label(Label(3)),
        ];
        let positions = label_positions(&code);
        let offsets: Vec<u32> = (0..4).map(|i| positions[&Label(i)]).collect();
        for pair in offsets.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(offsets, vec![0, 0, 2, 7]);
    }
}
