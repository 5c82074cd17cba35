//! PPC32 register model
//!
//! The target has 32 general-purpose registers, 32 floating-point
//! registers, and 4 usable bits of condition register CR0. How a register
//! is spelled in the output (`3` vs `r3`) is a dialect decision, so the
//! `Display` impls here give a neutral spelling used in diagnostics only.

use std::fmt;

/// General-purpose registers R0-R31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gpr {
    R0, R1, R2, R3, R4, R5, R6, R7,
    R8, R9, R10, R11, R12, R13, R14, R15,
    R16, R17, R18, R19, R20, R21, R22, R23,
    R24, R25, R26, R27, R28, R29, R30, R31,
}

impl Gpr {
    /// Hardware register number (0-31)
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Gpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.number())
    }
}

/// Floating-point registers F0-F31
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fpr {
    F0, F1, F2, F3, F4, F5, F6, F7,
    F8, F9, F10, F11, F12, F13, F14, F15,
    F16, F17, F18, F19, F20, F21, F22, F23,
    F24, F25, F26, F27, F28, F29, F30, F31,
}

impl Fpr {
    /// Hardware register number (0-31)
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Fpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.number())
    }
}

/// Bits of condition register CR0
///
/// Comparison results land in CR0; conditional branches test one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrBit {
    Lt, // bit 0: less than
    Gt, // bit 1: greater than
    Eq, // bit 2: equal
    So, // bit 3: summary overflow
}

impl CrBit {
    /// Bit index within CR0 (0-3)
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CrBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crbit{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_numbers() {
        assert_eq!(Gpr::R0.number(), 0);
        assert_eq!(Gpr::R12.number(), 12);
        assert_eq!(Gpr::R31.number(), 31);
        assert_eq!(Fpr::F1.number(), 1);
        assert_eq!(Fpr::F31.number(), 31);
        assert_eq!(CrBit::Lt.number(), 0);
        assert_eq!(CrBit::So.number(), 3);
    }

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Gpr::R3), "r3");
        assert_eq!(format!("{}", Fpr::F13), "f13");
        assert_eq!(format!("{}", CrBit::Eq), "crbit2");
    }
}
