//! Per-function label numbering
//!
//! Structural label identifiers from the instruction stream are renumbered
//! into small dense output numbers (`.L100`, `.L101`, ...) so the printed
//! assembly stays compact and label numbers can be reused across
//! functions. The allocator is reset at every function boundary.

use ppcc_asm::Label;
use std::collections::HashMap;

/// First output label number; numbers below are reserved
const FIRST_LABEL: u32 = 100;

/// Per-function label number allocator
#[derive(Debug)]
pub struct LabelAlloc {
    map: HashMap<Label, u32>,
    next: u32,
}

impl LabelAlloc {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            next: FIRST_LABEL,
        }
    }

    /// Output number for a structural label
    ///
    /// The first call for a label allocates the next unused number; later
    /// calls for the same label return the same number.
    pub fn translate(&mut self, label: Label) -> u32 {
        if let Some(&n) = self.map.get(&label) {
            return n;
        }
        let n = self.next;
        self.next += 1;
        self.map.insert(label, n);
        n
    }

    /// Allocate a fresh number with no structural counterpart
    ///
    /// Used for synthesized local labels: long-branch targets, literal
    /// pool entries, jump tables.
    pub fn fresh(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Clear all mappings at a function boundary
    pub fn reset(&mut self) {
        self.map.clear();
        self.next = FIRST_LABEL;
    }

    /// Number of structural labels mapped so far
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for LabelAlloc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_is_idempotent() {
        let mut alloc = LabelAlloc::new();
        let a = alloc.translate(Label(7));
        let b = alloc.translate(Label(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_translate_is_injective() {
        let mut alloc = LabelAlloc::new();
        let mut seen = std::collections::HashSet::new();
        for i in 0..50 {
            assert!(seen.insert(alloc.translate(Label(i))));
        }
        // Re-querying changes nothing
        for i in 0..50 {
            assert!(!seen.insert(alloc.translate(Label(i))));
        }
    }

    #[test]
    fn test_numbers_start_above_reserved_range() {
        let mut alloc = LabelAlloc::new();
        assert_eq!(alloc.translate(Label(0)), FIRST_LABEL);
        assert_eq!(alloc.fresh(), FIRST_LABEL + 1);
    }

    #[test]
    fn test_fresh_never_collides_with_translated() {
        let mut alloc = LabelAlloc::new();
        let t = alloc.translate(Label(1));
        let f = alloc.fresh();
        let t2 = alloc.translate(Label(2));
        assert_ne!(t, f);
        assert_ne!(f, t2);
    }

    #[test]
    fn test_reset_clears_mapping() {
        let mut alloc = LabelAlloc::new();
        let before = alloc.translate(Label(3));
        alloc.fresh();
        alloc.reset();
        assert!(alloc.is_empty());
        // Numbering restarts, so the same label gets the first number again
        assert_eq!(alloc.translate(Label(3)), before);
        assert_eq!(alloc.len(), 1);
    }
}
