//! Rotate-and-mask operand classification
//!
//! `rlwinm`/`rlwimi` take their mask as a (begin, end) bit pair in IBM
//! bit order (bit 0 is the most significant). The 32-bit masks produced
//! upstream are always a single contiguous run of ones, possibly wrapping
//! around; anything else cannot be encoded and means the instruction
//! selector broke its contract.

use ppcc_common::EmitError;

/// Decompose a contiguous (possibly wrapping) mask into (mb, me)
///
/// Scans the mask from the most significant bit, counting 0/1
/// transitions. A valid mask has exactly two transitions, or zero
/// transitions with all bits set. Invalid masks are a fatal
/// internal-consistency error, never silently approximated.
pub fn rolm_mask(mask: u32) -> Result<(u32, u32), EmitError> {
    let mut mb = 0u32; // position of the last 0 -> 1 transition
    let mut me = 32u32; // position of the last 1 -> 0 transition
    let mut last = mask & 1 != 0; // bit 31, so wraparound runs count once
    let mut transitions = 0u32;
    let mut probe = 0x8000_0000u32;
    for position in 0..32 {
        if mask & probe != 0 {
            if !last {
                transitions += 1;
                mb = position;
            }
            last = true;
        } else {
            if last {
                transitions += 1;
                me = position;
            }
            last = false;
        }
        probe >>= 1;
    }
    if transitions != 2 && (transitions != 0 || !last) {
        return Err(EmitError::internal(format!(
            "rlwinm mask {mask:#010x} is not a contiguous bit range"
        )));
    }
    // me marks the position after the run, wrapping past bit 31
    Ok((mb, (me + 31) % 32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_masks() {
        assert_eq!(rolm_mask(0x0000_fff0).unwrap(), (16, 27));
        assert_eq!(rolm_mask(0xff00_0000).unwrap(), (0, 7));
        assert_eq!(rolm_mask(0x0000_0001).unwrap(), (31, 31));
        assert_eq!(rolm_mask(0x8000_0000).unwrap(), (0, 0));
    }

    #[test]
    fn test_all_ones_mask() {
        assert_eq!(rolm_mask(0xffff_ffff).unwrap(), (0, 31));
    }

    #[test]
    fn test_wraparound_mask() {
        // Ones at both ends: the run wraps from bit 28 around to bit 3
        assert_eq!(rolm_mask(0xf000_000f).unwrap(), (28, 3));
    }

    #[test]
    fn test_invalid_masks_are_fatal() {
        assert!(rolm_mask(0).is_err());
        assert!(rolm_mask(0x0f0f_0000).is_err());
        assert!(rolm_mask(0x0000_0005).is_err());
    }
}
