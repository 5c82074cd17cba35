//! Instruction rendering
//!
//! One instruction in, one or more assembly lines out. Most variants map
//! to a single fixed-syntax line through the dialect's register/constant
//! renderers; the pseudo-instructions (conditional branches out of short
//! range, jump tables, float immediates) synthesize multi-instruction
//! expansions and feed the literal/jump-table pools.

use crate::driver::EmitCtx;
use crate::layout;
use crate::masks::rolm_mask;
use once_cell::sync::Lazy;
use ppcc_asm::{BuiltinOp, CrBit, Gpr, Inst, Label};
use ppcc_common::EmitError;
use regex::Regex;
use std::collections::HashMap;

/// Encoded source-position marker inside annotation text
static LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#line:(.*):([1-9][0-9]*)$").expect("line marker regex"));

/// Renderer state carried across one function body
pub(crate) struct BodyState {
    /// Estimated offset of the next instruction, in size units
    pub(crate) pc: u32,
    /// Whether the previous instruction can fall through to this one
    pub(crate) fallthrough: bool,
}

impl EmitCtx<'_> {
    /// Conditional branch with short/long form selection
    ///
    /// If the estimated displacement fits the short encoding, one branch
    /// is emitted. Otherwise a branch on the inverted condition skips an
    /// unconditional branch to the real destination.
    fn emit_cond_branch(
        &mut self,
        taken: &str,
        inverted: &str,
        bit: CrBit,
        target: Label,
        positions: &HashMap<Label, u32>,
        pc: u32,
    ) -> Result<(), EmitError> {
        let dest = *positions.get(&target).ok_or_else(|| {
            EmitError::internal(format!("conditional branch to undefined label {target}"))
        })?;
        if let Some(align) = self.config.cond_branch_alignment {
            self.out.push_str(&format!("\t.balign\t{align}\n"));
        }
        let d = self.dialect;
        let displacement = i64::from(dest) - i64::from(pc);
        if (-0x2000..0x2000).contains(&displacement) {
            let n = self.labels.translate(target);
            self.out
                .push_str(&format!("\t{taken}\t{}, .L{n}\n", d.crbit(bit)));
        } else {
            let skip = self.labels.fresh();
            let n = self.labels.translate(target);
            self.out
                .push_str(&format!("\t{inverted}\t{}, .L{skip}\n", d.crbit(bit)));
            self.out.push_str(&format!("\tb\t.L{n}\n"));
            self.out.push_str(&format!(".L{skip}:\n"));
        }
        Ok(())
    }

    /// Render one instruction at the given body position
    pub(crate) fn emit_instr(
        &mut self,
        inst: &Inst,
        positions: &HashMap<Label, u32>,
        state: &BodyState,
    ) -> Result<(), EmitError> {
        let d = self.dialect;
        let cmt = d.comment();
        let g = |r| d.gpr(r);
        let fr = |r| d.fpr(r);
        let cst = |c: &ppcc_asm::Cst| d.constant(c);
        let bit = |b| d.crbit(b);
        let line = match inst {
            // Integer arithmetic
            Inst::Add(rd, ra, rb) => format!("\tadd\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Addc(rd, ra, rb) => format!("\taddc\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Adde(rd, ra, rb) => format!("\tadde\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Addi(rd, ra, c) => format!("\taddi\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Addic(rd, ra, c) => format!("\taddic\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Addis(rd, ra, c) => format!("\taddis\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Addze(rd, ra) => format!("\taddze\t{}, {}\n", g(*rd), g(*ra)),
            Inst::Neg(rd, ra) => format!("\tneg\t{}, {}\n", g(*rd), g(*ra)),
            Inst::Subfc(rd, ra, rb) => format!("\tsubfc\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Subfe(rd, ra, rb) => format!("\tsubfe\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Subfic(rd, ra, c) => format!("\tsubfic\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Subfze(rd, ra) => format!("\tsubfze\t{}, {}\n", g(*rd), g(*ra)),
            Inst::Mulli(rd, ra, c) => format!("\tmulli\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Mullw(rd, ra, rb) => format!("\tmullw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Mulhw(rd, ra, rb) => format!("\tmulhw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Mulhwu(rd, ra, rb) => format!("\tmulhwu\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Divw(rd, ra, rb) => format!("\tdivw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Divwu(rd, ra, rb) => format!("\tdivwu\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),

            // Logical
            Inst::And(rd, ra, rb) => format!("\tand.\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Andc(rd, ra, rb) => format!("\tandc\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Andi(rd, ra, c) => format!("\tandi.\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Andis(rd, ra, c) => format!("\tandis.\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Eqv(rd, ra, rb) => format!("\teqv\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Nand(rd, ra, rb) => format!("\tnand\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Nor(rd, ra, rb) => format!("\tnor\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Or(rd, ra, rb) => format!("\tor\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Orc(rd, ra, rb) => format!("\torc\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Ori(rd, ra, c) => format!("\tori\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Oris(rd, ra, c) => format!("\toris\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Xor(rd, ra, rb) => format!("\txor\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Xori(rd, ra, c) => format!("\txori\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),
            Inst::Xoris(rd, ra, c) => format!("\txoris\t{}, {}, {}\n", g(*rd), g(*ra), cst(c)),

            // Rotates and shifts
            Inst::Rlwinm(rd, ra, amount, mask) => {
                let (mb, me) = rolm_mask(*mask)?;
                format!(
                    "\trlwinm\t{}, {}, {}, {}, {} {} {:#010x}\n",
                    g(*rd),
                    g(*ra),
                    amount,
                    mb,
                    me,
                    cmt,
                    mask
                )
            }
            Inst::Rlwimi(rd, ra, amount, mask) => {
                let (mb, me) = rolm_mask(*mask)?;
                format!(
                    "\trlwimi\t{}, {}, {}, {}, {} {} {:#010x}\n",
                    g(*rd),
                    g(*ra),
                    amount,
                    mb,
                    me,
                    cmt,
                    mask
                )
            }
            Inst::Slw(rd, ra, rb) => format!("\tslw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Sraw(rd, ra, rb) => format!("\tsraw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Srawi(rd, ra, amount) => format!("\tsrawi\t{}, {}, {}\n", g(*rd), g(*ra), amount),
            Inst::Srw(rd, ra, rb) => format!("\tsrw\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),

            // Comparisons
            Inst::Cmplw(ra, rb) => format!("\tcmplw\t{}, {}, {}\n", d.creg(0), g(*ra), g(*rb)),
            Inst::Cmplwi(ra, c) => format!("\tcmplwi\t{}, {}, {}\n", d.creg(0), g(*ra), cst(c)),
            Inst::Cmpw(ra, rb) => format!("\tcmpw\t{}, {}, {}\n", d.creg(0), g(*ra), g(*rb)),
            Inst::Cmpwi(ra, c) => format!("\tcmpwi\t{}, {}, {}\n", d.creg(0), g(*ra), cst(c)),
            Inst::Cror(bd, b1, b2) => {
                format!("\tcror\t{}, {}, {}\n", bit(*bd), bit(*b1), bit(*b2))
            }

            // Branches and calls
            Inst::B(target) => {
                let n = self.labels.translate(*target);
                format!("\tb\t.L{n}\n")
            }
            Inst::Bctr => "\tbctr\n".to_string(),
            Inst::Bctrl => "\tbctrl\n".to_string(),
            Inst::Bt(b, target) => {
                return self.emit_cond_branch("bt", "bf", *b, *target, positions, state.pc);
            }
            Inst::Bf(b, target) => {
                return self.emit_cond_branch("bf", "bt", *b, *target, positions, state.pc);
            }
            Inst::Bl(sym) => format!("\tbl\t{sym}\n"),
            Inst::Blr => "\tblr\n".to_string(),
            Inst::Bs(sym) => format!("\tb\t{sym}\n"),
            Inst::Btbl(r, table) => {
                let targets: Vec<u32> = table.iter().map(|l| self.labels.translate(*l)).collect();
                let tbl = self.labels.fresh();
                let contents: Vec<String> = targets.iter().map(|n| format!(".L{n}")).collect();
                self.out.push_str(&format!(
                    "{cmt} jump table .L{tbl}: {}\n",
                    contents.join(" ")
                ));
                let scratch = g(Gpr::R12);
                self.out
                    .push_str(&format!("\tslwi\t{scratch}, {}, 2\n", g(*r)));
                self.out.push_str(&format!(
                    "\taddis\t{scratch}, {scratch}, {}\n",
                    d.label_high(tbl)
                ));
                self.out.push_str(&format!(
                    "\tlwz\t{scratch}, {}({scratch})\n",
                    d.label_low(tbl)
                ));
                self.out.push_str(&format!("\tmtctr\t{scratch}\n"));
                self.out.push_str("\tbctr\n");
                self.pools.record_jumptable(tbl, targets);
                return Ok(());
            }

            // Special register moves
            Inst::Mfcr(rd) => format!("\tmfcr\t{}\n", g(*rd)),
            Inst::Mflr(rd) => format!("\tmflr\t{}\n", g(*rd)),
            Inst::Mr(rd, ra) => format!("\tmr\t{}, {}\n", g(*rd), g(*ra)),
            Inst::Mtctr(ra) => format!("\tmtctr\t{}\n", g(*ra)),
            Inst::Mtlr(ra) => format!("\tmtlr\t{}\n", g(*ra)),

            // Integer loads
            Inst::Lbz(rd, c, ra) => format!("\tlbz\t{}, {}({})\n", g(*rd), cst(c), g(*ra)),
            Inst::Lbzx(rd, ra, rb) => format!("\tlbzx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lha(rd, c, ra) => format!("\tlha\t{}, {}({})\n", g(*rd), cst(c), g(*ra)),
            Inst::Lhax(rd, ra, rb) => format!("\tlhax\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lhbrx(rd, ra, rb) => format!("\tlhbrx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lhz(rd, c, ra) => format!("\tlhz\t{}, {}({})\n", g(*rd), cst(c), g(*ra)),
            Inst::Lhzx(rd, ra, rb) => format!("\tlhzx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lwz(rd, c, ra) => format!("\tlwz\t{}, {}({})\n", g(*rd), cst(c), g(*ra)),
            Inst::Lwzx(rd, ra, rb) => format!("\tlwzx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lwbrx(rd, ra, rb) => format!("\tlwbrx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),
            Inst::Lwarx(rd, ra, rb) => format!("\tlwarx\t{}, {}, {}\n", g(*rd), g(*ra), g(*rb)),

            // Float loads
            Inst::Lfd(fd, c, ra) => format!("\tlfd\t{}, {}({})\n", fr(*fd), cst(c), g(*ra)),
            Inst::Lfdx(fd, ra, rb) => format!("\tlfdx\t{}, {}, {}\n", fr(*fd), g(*ra), g(*rb)),
            Inst::Lfs(fd, c, ra) => format!("\tlfs\t{}, {}({})\n", fr(*fd), cst(c), g(*ra)),
            Inst::Lfsx(fd, ra, rb) => format!("\tlfsx\t{}, {}, {}\n", fr(*fd), g(*ra), g(*rb)),

            // Integer stores
            Inst::Stb(rs, c, ra) => format!("\tstb\t{}, {}({})\n", g(*rs), cst(c), g(*ra)),
            Inst::Stbx(rs, ra, rb) => format!("\tstbx\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),
            Inst::Sth(rs, c, ra) => format!("\tsth\t{}, {}({})\n", g(*rs), cst(c), g(*ra)),
            Inst::Sthx(rs, ra, rb) => format!("\tsthx\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),
            Inst::Sthbrx(rs, ra, rb) => format!("\tsthbrx\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),
            Inst::Stw(rs, c, ra) => format!("\tstw\t{}, {}({})\n", g(*rs), cst(c), g(*ra)),
            Inst::Stwx(rs, ra, rb) => format!("\tstwx\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),
            Inst::Stwbrx(rs, ra, rb) => format!("\tstwbrx\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),
            Inst::Stwcx(rs, ra, rb) => format!("\tstwcx.\t{}, {}, {}\n", g(*rs), g(*ra), g(*rb)),

            // Float stores
            Inst::Stfd(fs, c, ra) => format!("\tstfd\t{}, {}({})\n", fr(*fs), cst(c), g(*ra)),
            Inst::Stfdx(fs, ra, rb) => format!("\tstfdx\t{}, {}, {}\n", fr(*fs), g(*ra), g(*rb)),
            Inst::Stfs(fs, c, ra) => format!("\tstfs\t{}, {}({})\n", fr(*fs), cst(c), g(*ra)),
            Inst::Stfsx(fs, ra, rb) => format!("\tstfsx\t{}, {}, {}\n", fr(*fs), g(*ra), g(*rb)),

            // Float arithmetic
            Inst::Fabs(fd, fb) => format!("\tfabs\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fadd(fd, fa, fb) => format!("\tfadd\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fadds(fd, fa, fb) => format!("\tfadds\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fcmpu(fa, fb) => format!("\tfcmpu\t{}, {}, {}\n", d.creg(0), fr(*fa), fr(*fb)),
            Inst::Fctiwz(fd, fb) => format!("\tfctiwz\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fdiv(fd, fa, fb) => format!("\tfdiv\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fdivs(fd, fa, fb) => format!("\tfdivs\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fmadd(fd, fa, fb, fc) => format!(
                "\tfmadd\t{}, {}, {}, {}\n",
                fr(*fd),
                fr(*fa),
                fr(*fb),
                fr(*fc)
            ),
            Inst::Fmsub(fd, fa, fb, fc) => format!(
                "\tfmsub\t{}, {}, {}, {}\n",
                fr(*fd),
                fr(*fa),
                fr(*fb),
                fr(*fc)
            ),
            Inst::Fnmadd(fd, fa, fb, fc) => format!(
                "\tfnmadd\t{}, {}, {}, {}\n",
                fr(*fd),
                fr(*fa),
                fr(*fb),
                fr(*fc)
            ),
            Inst::Fnmsub(fd, fa, fb, fc) => format!(
                "\tfnmsub\t{}, {}, {}, {}\n",
                fr(*fd),
                fr(*fa),
                fr(*fb),
                fr(*fc)
            ),
            Inst::Fmr(fd, fb) => format!("\tfmr\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fmul(fd, fa, fb) => format!("\tfmul\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fmuls(fd, fa, fb) => format!("\tfmuls\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fneg(fd, fb) => format!("\tfneg\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fres(fd, fb) => format!("\tfres\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Frsp(fd, fb) => format!("\tfrsp\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fsel(fd, fa, fb, fc) => format!(
                "\tfsel\t{}, {}, {}, {}\n",
                fr(*fd),
                fr(*fa),
                fr(*fb),
                fr(*fc)
            ),
            Inst::Fsqrt(fd, fb) => format!("\tfsqrt\t{}, {}\n", fr(*fd), fr(*fb)),
            Inst::Fsub(fd, fa, fb) => format!("\tfsub\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),
            Inst::Fsubs(fd, fa, fb) => format!("\tfsubs\t{}, {}, {}\n", fr(*fd), fr(*fa), fr(*fb)),

            // Synchronization and traps
            Inst::Eieio => "\teieio\n".to_string(),
            Inst::Isync => "\tisync\n".to_string(),
            Inst::Sync => "\tsync\n".to_string(),
            Inst::Trap => "\ttrap\n".to_string(),

            // Pseudo-instructions
            Inst::Lfi(fd, value) => {
                let lbl = self.labels.fresh();
                let scratch = g(Gpr::R12);
                self.out
                    .push_str(&format!("\taddis\t{scratch}, 0, {}\n", d.label_high(lbl)));
                self.out.push_str(&format!(
                    "\tlfd\t{}, {}({scratch}) {cmt} {value}\n",
                    fr(*fd),
                    d.label_low(lbl)
                ));
                self.pools.record_double(lbl, *value);
                return Ok(());
            }
            Inst::Lfis(fd, value) => {
                let lbl = self.labels.fresh();
                let scratch = g(Gpr::R12);
                self.out
                    .push_str(&format!("\taddis\t{scratch}, 0, {}\n", d.label_high(lbl)));
                self.out.push_str(&format!(
                    "\tlfs\t{}, {}({scratch}) {cmt} {value}\n",
                    fr(*fd),
                    d.label_low(lbl)
                ));
                self.pools.record_single(lbl, *value);
                return Ok(());
            }
            Inst::Label(lbl) => {
                if !state.fallthrough {
                    if let Some(align) = self.config.branch_target_alignment {
                        self.out.push_str(&format!("\t.balign\t{align}\n"));
                    }
                }
                let n = self.labels.translate(*lbl);
                format!(".L{n}:\n")
            }
            Inst::Builtin(op) => {
                match op {
                    BuiltinOp::InlineAsm(text) => {
                        self.out.push_str(&format!("{cmt} begin inline assembly\n"));
                        self.out.push_str(&format!("\t{text}\n"));
                        self.out.push_str(&format!("{cmt} end inline assembly\n"));
                    }
                    BuiltinOp::Annot(text) => {
                        let parsed = LINE_MARKER.captures(text).and_then(|caps| {
                            let line: u32 = caps[2].parse().ok()?;
                            Some((caps[1].to_string(), line))
                        });
                        match parsed {
                            Some((file, line)) => {
                                self.dialect
                                    .file_line(&mut self.out, &mut self.files, &file, line);
                            }
                            None => {
                                self.out.push_str(&format!("{cmt} annotation: {text}\n"));
                            }
                        }
                    }
                }
                return Ok(());
            }
            Inst::CfiAdjust(delta) => {
                d.cfi_adjust(&mut self.out, *delta);
                return Ok(());
            }
            Inst::CfiRelOffset(reg, ofs) => {
                d.cfi_rel_offset(&mut self.out, *reg, *ofs);
                return Ok(());
            }

            // Contractually pre-lowered; reaching here is an upstream bug
            Inst::Allocframe(_, _) => {
                return Err(EmitError::internal(
                    "allocframe pseudo-instruction reached the printer",
                ));
            }
            Inst::Freeframe(_, _) => {
                return Err(EmitError::internal(
                    "freeframe pseudo-instruction reached the printer",
                ));
            }
            Inst::Fmake(_, _, _) => {
                return Err(EmitError::internal(
                    "raw float construction reached the printer",
                ));
            }
            Inst::Mfcrbit(_, _) => {
                return Err(EmitError::internal(
                    "untranslated move from condition bit reached the printer",
                ));
            }
            Inst::Fcti(_, _) => {
                return Err(EmitError::internal(
                    "unspecialized float-to-int conversion reached the printer",
                ));
            }
        };
        self.out.push_str(&line);
        Ok(())
    }

    /// Render a full function body, tracking position and fallthrough
    pub(crate) fn emit_body(&mut self, code: &[Inst]) -> Result<(), EmitError> {
        let positions = layout::label_positions(code);
        let mut state = BodyState {
            pc: 0,
            fallthrough: true,
        };
        for inst in code {
            self.emit_instr(inst, &positions, &state)?;
            state.pc += layout::instr_size(inst);
            state.fallthrough = inst.falls_through();
        }
        Ok(())
    }
}
