//! PPC32 instruction set consumed by the assembly emitter
//!
//! The instruction union is closed: every variant the emitter receives is
//! already fully legal for the target. A handful of variants (frame
//! handling, raw float construction, unspecialized conversions) are
//! contractually eliminated by earlier lowering passes and only exist so
//! the printer can fail loudly if the contract is broken.

use crate::reg::{CrBit, Fpr, Gpr};
use std::fmt;

/// A code label, local to one function
///
/// Label identities are never meaningful across function boundaries; the
/// emitter renumbers them per function before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lbl{}", self.0)
    }
}

/// A constant operand, possibly relocatable
///
/// The low/high half forms support the two-instruction addressing idiom
/// (addis + load/store); the rel forms address small data relative to the
/// small-data base register.
#[derive(Debug, Clone, PartialEq)]
pub enum Cst {
    /// Plain integer immediate
    Int(i32),
    /// Absolute address of a symbol plus offset
    Symbol(String, i32),
    /// Low 16 bits of a symbol address
    SymbolLow(String, i32),
    /// High 16 bits of a symbol address, adjusted for signed low part
    SymbolHigh(String, i32),
    /// Low half of a symbol address relative to the small-data base
    SymbolRelLow(String, i32),
    /// High half of a symbol address relative to the small-data base
    SymbolRelHigh(String, i32),
}

/// Builtin operations that survive to emission time
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinOp {
    /// User inline assembly, passed through verbatim
    InlineAsm(String),
    /// Source annotation text; "#line:<file>:<line>" markers become
    /// file/line debug pseudo-ops, anything else a comment
    Annot(String),
}

/// PPC32 instructions, including emission-time pseudo-instructions
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    // Integer arithmetic
    Add(Gpr, Gpr, Gpr),          // rd = ra + rb
    Addc(Gpr, Gpr, Gpr),         // rd = ra + rb, sets carry
    Adde(Gpr, Gpr, Gpr),         // rd = ra + rb + carry
    Addi(Gpr, Gpr, Cst),         // rd = ra + cst
    Addic(Gpr, Gpr, Cst),        // rd = ra + cst, sets carry
    Addis(Gpr, Gpr, Cst),        // rd = ra + (cst << 16)
    Addze(Gpr, Gpr),             // rd = ra + carry
    Neg(Gpr, Gpr),               // rd = -ra
    Subfc(Gpr, Gpr, Gpr),        // rd = rb - ra, sets carry
    Subfe(Gpr, Gpr, Gpr),        // rd = rb - ra - (1 - carry)
    Subfic(Gpr, Gpr, Cst),       // rd = cst - ra, sets carry
    Subfze(Gpr, Gpr),            // rd = carry - 1 - ra
    Mulli(Gpr, Gpr, Cst),        // rd = ra * cst
    Mullw(Gpr, Gpr, Gpr),        // rd = low32(ra * rb)
    Mulhw(Gpr, Gpr, Gpr),        // rd = high32(ra * rb), signed
    Mulhwu(Gpr, Gpr, Gpr),       // rd = high32(ra * rb), unsigned
    Divw(Gpr, Gpr, Gpr),         // rd = ra / rb, signed
    Divwu(Gpr, Gpr, Gpr),        // rd = ra / rb, unsigned

    // Logical
    And(Gpr, Gpr, Gpr),          // rd = ra & rb, sets CR0
    Andc(Gpr, Gpr, Gpr),         // rd = ra & !rb
    Andi(Gpr, Gpr, Cst),         // rd = ra & cst, sets CR0
    Andis(Gpr, Gpr, Cst),        // rd = ra & (cst << 16), sets CR0
    Eqv(Gpr, Gpr, Gpr),          // rd = !(ra ^ rb)
    Nand(Gpr, Gpr, Gpr),         // rd = !(ra & rb)
    Nor(Gpr, Gpr, Gpr),          // rd = !(ra | rb)
    Or(Gpr, Gpr, Gpr),           // rd = ra | rb
    Orc(Gpr, Gpr, Gpr),          // rd = ra | !rb
    Ori(Gpr, Gpr, Cst),          // rd = ra | cst
    Oris(Gpr, Gpr, Cst),         // rd = ra | (cst << 16)
    Xor(Gpr, Gpr, Gpr),          // rd = ra ^ rb
    Xori(Gpr, Gpr, Cst),         // rd = ra ^ cst
    Xoris(Gpr, Gpr, Cst),        // rd = ra ^ (cst << 16)

    // Rotates and shifts
    Rlwinm(Gpr, Gpr, u32, u32),  // rd = rotl(ra, amount) & mask
    Rlwimi(Gpr, Gpr, u32, u32),  // rd = (rd & !mask) | (rotl(ra, amount) & mask)
    Slw(Gpr, Gpr, Gpr),          // rd = ra << rb
    Sraw(Gpr, Gpr, Gpr),         // rd = ra >> rb, arithmetic
    Srawi(Gpr, Gpr, u32),        // rd = ra >> amount, arithmetic
    Srw(Gpr, Gpr, Gpr),          // rd = ra >> rb, logical

    // Comparisons (results in CR0)
    Cmplw(Gpr, Gpr),             // unsigned compare ra, rb
    Cmplwi(Gpr, Cst),            // unsigned compare ra, cst
    Cmpw(Gpr, Gpr),              // signed compare ra, rb
    Cmpwi(Gpr, Cst),             // signed compare ra, cst
    Cror(CrBit, CrBit, CrBit),   // bd = b1 | b2

    // Branches and calls
    B(Label),                    // unconditional branch
    Bctr,                        // branch to CTR
    Bctrl,                       // branch to CTR and link
    Bf(CrBit, Label),            // branch if condition bit false
    Bl(String),                  // call symbol
    Blr,                         // return
    Bs(String),                  // tail jump to symbol
    Bt(CrBit, Label),            // branch if condition bit true
    Btbl(Gpr, Vec<Label>),       // indexed multiway branch (jump table)

    // Special register moves
    Mfcr(Gpr),                   // rd = CR
    Mflr(Gpr),                   // rd = LR
    Mr(Gpr, Gpr),                // rd = ra
    Mtctr(Gpr),                  // CTR = ra
    Mtlr(Gpr),                   // LR = ra

    // Integer loads
    Lbz(Gpr, Cst, Gpr),          // rd = zext8(mem[ra + cst])
    Lbzx(Gpr, Gpr, Gpr),         // rd = zext8(mem[ra + rb])
    Lha(Gpr, Cst, Gpr),          // rd = sext16(mem[ra + cst])
    Lhax(Gpr, Gpr, Gpr),         // rd = sext16(mem[ra + rb])
    Lhbrx(Gpr, Gpr, Gpr),        // rd = byterev16(mem[ra + rb])
    Lhz(Gpr, Cst, Gpr),          // rd = zext16(mem[ra + cst])
    Lhzx(Gpr, Gpr, Gpr),         // rd = zext16(mem[ra + rb])
    Lwz(Gpr, Cst, Gpr),          // rd = mem[ra + cst]
    Lwzx(Gpr, Gpr, Gpr),         // rd = mem[ra + rb]
    Lwbrx(Gpr, Gpr, Gpr),        // rd = byterev32(mem[ra + rb])
    Lwarx(Gpr, Gpr, Gpr),        // rd = mem[ra + rb], sets reservation

    // Float loads
    Lfd(Fpr, Cst, Gpr),          // fd = mem64[ra + cst]
    Lfdx(Fpr, Gpr, Gpr),         // fd = mem64[ra + rb]
    Lfs(Fpr, Cst, Gpr),          // fd = ext(mem32[ra + cst])
    Lfsx(Fpr, Gpr, Gpr),         // fd = ext(mem32[ra + rb])

    // Integer stores
    Stb(Gpr, Cst, Gpr),          // mem[ra + cst] = low8(rs)
    Stbx(Gpr, Gpr, Gpr),         // mem[ra + rb] = low8(rs)
    Sth(Gpr, Cst, Gpr),          // mem[ra + cst] = low16(rs)
    Sthx(Gpr, Gpr, Gpr),         // mem[ra + rb] = low16(rs)
    Sthbrx(Gpr, Gpr, Gpr),       // mem[ra + rb] = byterev16(rs)
    Stw(Gpr, Cst, Gpr),          // mem[ra + cst] = rs
    Stwx(Gpr, Gpr, Gpr),         // mem[ra + rb] = rs
    Stwbrx(Gpr, Gpr, Gpr),       // mem[ra + rb] = byterev32(rs)
    Stwcx(Gpr, Gpr, Gpr),        // conditional store, needs reservation

    // Float stores
    Stfd(Fpr, Cst, Gpr),         // mem64[ra + cst] = fs
    Stfdx(Fpr, Gpr, Gpr),        // mem64[ra + rb] = fs
    Stfs(Fpr, Cst, Gpr),         // mem32[ra + cst] = round(fs)
    Stfsx(Fpr, Gpr, Gpr),        // mem32[ra + rb] = round(fs)

    // Float arithmetic
    Fabs(Fpr, Fpr),              // fd = |fa|
    Fadd(Fpr, Fpr, Fpr),         // fd = fa + fb
    Fadds(Fpr, Fpr, Fpr),        // fd = fa + fb, single
    Fcmpu(Fpr, Fpr),             // compare fa, fb into CR0
    Fctiwz(Fpr, Fpr),            // fd = int(fb), round toward zero
    Fdiv(Fpr, Fpr, Fpr),         // fd = fa / fb
    Fdivs(Fpr, Fpr, Fpr),        // fd = fa / fb, single
    Fmadd(Fpr, Fpr, Fpr, Fpr),   // fd = fa * fb + fc
    Fmsub(Fpr, Fpr, Fpr, Fpr),   // fd = fa * fb - fc
    Fnmadd(Fpr, Fpr, Fpr, Fpr),  // fd = -(fa * fb + fc)
    Fnmsub(Fpr, Fpr, Fpr, Fpr),  // fd = -(fa * fb - fc)
    Fmr(Fpr, Fpr),               // fd = fb
    Fmul(Fpr, Fpr, Fpr),         // fd = fa * fb
    Fmuls(Fpr, Fpr, Fpr),        // fd = fa * fb, single
    Fneg(Fpr, Fpr),              // fd = -fb
    Fres(Fpr, Fpr),              // fd = estimate(1 / fb)
    Frsp(Fpr, Fpr),              // fd = single(fb)
    Fsel(Fpr, Fpr, Fpr, Fpr),    // fd = fa >= 0 ? fc : fb
    Fsqrt(Fpr, Fpr),             // fd = sqrt(fb)
    Fsub(Fpr, Fpr, Fpr),         // fd = fa - fb
    Fsubs(Fpr, Fpr, Fpr),        // fd = fa - fb, single

    // Synchronization and traps
    Eieio,                       // enforce in-order execution of I/O
    Isync,                       // instruction synchronize
    Sync,                        // memory barrier
    Trap,                        // unconditional trap

    // Emission-time pseudo-instructions
    Lfi(Fpr, f64),               // fd = double constant, via literal pool
    Lfis(Fpr, f32),              // fd = single constant, via literal pool
    Label(Label),                // code label definition
    Builtin(BuiltinOp),          // inline asm / annotation passthrough
    CfiAdjust(i32),              // CFA offset changed by delta
    CfiRelOffset(Gpr, i32),      // register saved at CFA-relative offset

    // Pre-lowered variants; reaching the printer is a contract violation
    Allocframe(u32, i32),        // expanded before register allocation
    Freeframe(u32, i32),         // expanded before register allocation
    Fmake(Fpr, Gpr, Gpr),        // raw float construction, pre-lowered
    Mfcrbit(Gpr, CrBit),         // expanded into mfcr + rlwinm earlier
    Fcti(Gpr, Fpr),              // specialized into fctiwz sequences earlier
}

impl Inst {
    /// Whether control can reach the next instruction in sequence
    ///
    /// Used to decide which label definitions are pure fallthrough points
    /// (which never need alignment padding) versus real branch targets.
    pub fn falls_through(&self) -> bool {
        !matches!(
            self,
            Inst::B(_) | Inst::Bctr | Inst::Blr | Inst::Bs(_) | Inst::Btbl(_, _)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_through() {
        assert!(!Inst::B(Label(1)).falls_through());
        assert!(!Inst::Blr.falls_through());
        assert!(!Inst::Bctr.falls_through());
        assert!(!Inst::Bs("exit".to_string()).falls_through());
        assert!(!Inst::Btbl(Gpr::R3, vec![Label(1), Label(2)]).falls_through());

        // Calls and conditional branches fall through
        assert!(Inst::Bl("memcpy".to_string()).falls_through());
        assert!(Inst::Bctrl.falls_through());
        assert!(Inst::Bt(CrBit::Eq, Label(1)).falls_through());
        assert!(Inst::Add(Gpr::R3, Gpr::R4, Gpr::R5).falls_through());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(format!("{}", Label(7)), "lbl7");
    }
}
