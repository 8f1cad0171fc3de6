//! FSPEC (Field Specification) codec.
//!
//! An FSPEC is a sequence of octets whose bits 8..2 flag the presence of
//! consecutive fields and whose LSB (FX) says another octet follows. The
//! same FX-terminated shape is used for the primary subfield of compound
//! items.

use crate::cursor::Cursor;
use crate::types::{AsterixError, Result};

/// Field Extension indicator: LSB of an FSPEC or compound-primary octet.
pub const FX: u8 = 0x01;

/// Presence slots per FSPEC octet (bits 8..2).
pub const SLOTS_PER_OCTET: usize = 7;

/// Read an FX-terminated octet sequence.
///
/// Fails with `Truncated` if the buffer runs out while FX is still set.
pub fn read_fspec<'a>(c: &mut Cursor<'a>) -> Result<&'a [u8]> {
    let start = c.position();
    loop {
        let octet = c.read_u8()?;
        if octet & FX == 0 {
            break;
        }
    }
    Ok(c.since(start))
}

/// Map FSPEC presence bits to ascending Field Reference Numbers.
///
/// Bit `i` (counted from the MSB, 0..6) of octet `j` is FRN `7*j + i + 1`.
/// The FX bit never maps to an FRN. A flagged FRN above 255 fails with
/// `FrnOverflow`; clear bits in later octets are harmless.
pub fn fspec_to_frns(fspec: &[u8]) -> Result<Vec<u8>> {
    let mut frns = Vec::new();
    for (j, &octet) in fspec.iter().enumerate() {
        for i in 0..SLOTS_PER_OCTET {
            if octet & (0x80 >> i) != 0 {
                let frn = SLOTS_PER_OCTET * j + i + 1;
                frns.push(u8::try_from(frn).map_err(|_| AsterixError::FrnOverflow(frn))?);
            }
        }
    }
    Ok(frns)
}

/// Build the shortest FSPEC flagging exactly `frns`.
///
/// FRN 0 is ignored. An empty set still yields one (all-clear) octet, as a
/// record always carries at least one FSPEC octet.
pub fn encode_fspec(frns: &[u8]) -> Vec<u8> {
    let octets = frns
        .iter()
        .filter(|&&frn| frn > 0)
        .map(|&frn| (frn as usize - 1) / SLOTS_PER_OCTET + 1)
        .max()
        .unwrap_or(1);

    let mut fspec = vec![0u8; octets];
    for &frn in frns.iter().filter(|&&frn| frn > 0) {
        let idx = frn as usize - 1;
        fspec[idx / SLOTS_PER_OCTET] |= 0x80 >> (idx % SLOTS_PER_OCTET);
    }
    let last = fspec.len() - 1;
    for octet in &mut fspec[..last] {
        *octet |= FX;
    }
    fspec
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
