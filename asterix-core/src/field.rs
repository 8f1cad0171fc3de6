//! Data field readers.
//!
//! Each reader consumes exactly the octets of one field instance from the
//! cursor and returns them split along the structure of its encoding. No
//! reader interprets field semantics. Running out of input is always
//! `Truncated`, regardless of which layer asked for the bytes.
//!
//! Field encodings (EUROCONTROL ASTERIX Part 1, 4.3):
//! - Fixed: a predetermined number of octets
//! - Extended: fixed-size parts chained by the FX bit of each part's last octet
//! - Explicit, SP, RE: one length octet counting itself, then data
//! - Repetitive: one REP octet, then REP fixed-size parts
//! - Compound: FX-terminated primary subfield, then the flagged subfields
//! - RFS: count octet, then (FRN, field) pairs

use serde::Serialize;

use crate::cursor::Cursor;
use crate::fspec::{self, FX};
use crate::types::{serialize_hex, AsterixError, Result};
use crate::uap::{CompoundLayout, DataField, FieldKind, SubFieldKind, Uap};

// ---------------------------------------------------------------------------
// Decoded field payloads
// ---------------------------------------------------------------------------

/// Payload of one decoded field, shaped by its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Field {
    Fixed {
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    Extended {
        /// First part.
        #[serde(serialize_with = "serialize_hex")]
        primary: Vec<u8>,
        /// All extension parts, concatenated.
        #[serde(serialize_with = "serialize_hex")]
        secondary: Vec<u8>,
    },
    Explicit {
        len: u8,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    Repetitive {
        rep: u8,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    Compound {
        #[serde(serialize_with = "serialize_hex")]
        primary: Vec<u8>,
        subfields: Vec<SubItem>,
    },
    SpecialPurpose {
        len: u8,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    ReservedExpansion {
        len: u8,
        #[serde(serialize_with = "serialize_hex")]
        data: Vec<u8>,
    },
    RandomFieldSequencing {
        count: u8,
        fields: Vec<RfsItem>,
    },
}

/// A compound subfield, in primary-processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubItem {
    /// Index of the primary octet that flagged this subfield.
    pub octet: usize,
    /// Bit position within that octet, 8..=2.
    pub slot: u8,
    pub field: Field,
}

/// One (FRN, field) pair of a random field sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfsItem {
    pub frn: u8,
    pub field: Field,
}

impl Field {
    /// Re-encode to wire bytes from the structured payload alone.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Field::Fixed { data } => out.extend_from_slice(data),
            Field::Extended { primary, secondary } => {
                out.extend_from_slice(primary);
                out.extend_from_slice(secondary);
            }
            Field::Explicit { len, data }
            | Field::SpecialPurpose { len, data }
            | Field::ReservedExpansion { len, data } => {
                out.push(*len);
                out.extend_from_slice(data);
            }
            Field::Repetitive { rep, data } => {
                out.push(*rep);
                out.extend_from_slice(data);
            }
            Field::Compound { primary, subfields } => {
                out.extend_from_slice(primary);
                for sub in subfields {
                    sub.field.encode_into(out);
                }
            }
            Field::RandomFieldSequencing { count, fields } => {
                out.push(*count);
                for item in fields {
                    out.push(item.frn);
                    item.field.encode_into(out);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Read exactly `size` octets.
pub fn read_fixed(c: &mut Cursor<'_>, size: u8) -> Result<Field> {
    Ok(Field::Fixed {
        data: c.take(size as usize)?.to_vec(),
    })
}

/// Read `size`-octet parts until one ends with FX clear.
pub fn read_extended(c: &mut Cursor<'_>, size: u8) -> Result<Field> {
    let size = size as usize;
    let primary = c.take(size)?;
    let mut secondary = Vec::new();
    let mut last = primary.last().copied().unwrap_or(0);
    while last & FX != 0 {
        let part = c.take(size)?;
        secondary.extend_from_slice(part);
        last = part.last().copied().unwrap_or(0);
    }
    Ok(Field::Extended {
        primary: primary.to_vec(),
        secondary,
    })
}

/// Read a length octet `L` followed by `L - 1` data octets.
///
/// Shared by Explicit, SP and RE fields, which differ only in meaning.
fn read_length_prefixed(c: &mut Cursor<'_>) -> Result<(u8, Vec<u8>)> {
    let len = c.read_u8()?;
    if len == 0 {
        return Err(AsterixError::BadLength(0));
    }
    let data = c.take(len as usize - 1)?;
    Ok((len, data.to_vec()))
}

pub fn read_explicit(c: &mut Cursor<'_>) -> Result<Field> {
    let (len, data) = read_length_prefixed(c)?;
    Ok(Field::Explicit { len, data })
}

pub fn read_special_purpose(c: &mut Cursor<'_>) -> Result<Field> {
    let (len, data) = read_length_prefixed(c)?;
    Ok(Field::SpecialPurpose { len, data })
}

pub fn read_reserved_expansion(c: &mut Cursor<'_>) -> Result<Field> {
    let (len, data) = read_length_prefixed(c)?;
    Ok(Field::ReservedExpansion { len, data })
}

/// Read a REP octet followed by `REP * size` octets.
pub fn read_repetitive(c: &mut Cursor<'_>, size: u8) -> Result<Field> {
    let rep = c.read_u8()?;
    let data = c.take(rep as usize * size as usize)?;
    Ok(Field::Repetitive {
        rep,
        data: data.to_vec(),
    })
}

/// Read one compound subfield.
pub fn read_subfield(c: &mut Cursor<'_>, kind: SubFieldKind) -> Result<Field> {
    match kind {
        SubFieldKind::Fixed(size) => read_fixed(c, size),
        SubFieldKind::Extended(size) => read_extended(c, size),
        SubFieldKind::Explicit => read_explicit(c),
        SubFieldKind::Repetitive(size) => read_repetitive(c, size),
    }
}

/// Read a compound field: primary subfield, then every flagged subfield.
///
/// Within each primary octet, bits are processed 8 down to 2 and each one
/// selects the same slot of `layout`. A flagged spare slot fails with
/// `DatafieldUnknown(frn)`.
pub fn read_compound(c: &mut Cursor<'_>, frn: u8, layout: &CompoundLayout) -> Result<Field> {
    let primary = fspec::read_fspec(c)?;
    let mut subfields = Vec::new();

    for (octet, &bits) in primary.iter().enumerate() {
        for slot in (2..=8u8).rev() {
            if bits & (1 << (slot - 1)) == 0 {
                continue;
            }
            let kind = layout
                .slot(slot)
                .ok_or(AsterixError::DatafieldUnknown(frn))?;
            subfields.push(SubItem {
                octet,
                slot,
                field: read_subfield(c, kind)?,
            });
        }
    }

    Ok(Field::Compound {
        primary: primary.to_vec(),
        subfields,
    })
}

/// Read a random field sequence.
///
/// Each referenced FRN is resolved against the whole UAP and read with its
/// declared encoding. Unknown FRNs, spare FRNs and nested sequences fail
/// with `DatafieldUnknown`.
pub fn read_rfs(c: &mut Cursor<'_>, uap: &Uap) -> Result<Field> {
    let count = c.read_u8()?;
    let mut fields = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let frn = c.read_u8()?;
        let entry = uap.field(frn).ok_or(AsterixError::DatafieldUnknown(frn))?;
        if entry.kind == FieldKind::RandomFieldSequencing {
            return Err(AsterixError::DatafieldUnknown(frn));
        }
        let field = read_field(c, entry, uap)?;
        fields.push(RfsItem { frn, field });
    }
    Ok(Field::RandomFieldSequencing { count, fields })
}

/// Read one top-level field according to its UAP entry.
pub fn read_field(c: &mut Cursor<'_>, entry: &DataField, uap: &Uap) -> Result<Field> {
    match &entry.kind {
        FieldKind::Fixed(size) => read_fixed(c, *size),
        FieldKind::Extended(size) => read_extended(c, *size),
        FieldKind::Explicit => read_explicit(c),
        FieldKind::Repetitive(size) => read_repetitive(c, *size),
        FieldKind::Compound(layout) => read_compound(c, entry.frn, layout),
        FieldKind::SpecialPurpose => read_special_purpose(c),
        FieldKind::ReservedExpansion => read_reserved_expansion(c),
        FieldKind::RandomFieldSequencing => read_rfs(c, uap),
        FieldKind::Spare => Err(AsterixError::DatafieldUnknown(entry.frn)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Profile exercising every encoding, modelled on a made-up category.
    fn test_uap() -> Uap {
        let layout = CompoundLayout::new()
            .with(8, SubFieldKind::Fixed(1))
            .with(6, SubFieldKind::Extended(1))
            .with(4, SubFieldKind::Repetitive(2))
            .with(2, SubFieldKind::Explicit);
        Uap::new(
            26,
            "cat026_test",
            vec![
                DataField::new(1, "I026/001", FieldKind::Fixed(2)),
                DataField::new(2, "I026/002", FieldKind::Extended(1)),
                DataField::new(3, "I026/003", FieldKind::Compound(layout)),
                DataField::new(4, "I026/004", FieldKind::Repetitive(2)),
                DataField::new(5, "I026/005", FieldKind::Explicit),
                DataField::new(6, "I026/006", FieldKind::RandomFieldSequencing),
                DataField::new(7, "NA", FieldKind::Spare),
                DataField::new(8, "SP", FieldKind::SpecialPurpose),
            ],
        )
    }

    fn compound_layout() -> CompoundLayout {
        CompoundLayout::new()
            .with(8, SubFieldKind::Fixed(1))
            .with(7, SubFieldKind::Extended(1))
            .with(6, SubFieldKind::Explicit)
            .with(5, SubFieldKind::Repetitive(1))
    }

    // -- Fixed --

    #[test]
    fn test_read_fixed() {
        let data = [0xff, 0xff, 0xff, 0xff, 0x01];
        let mut c = Cursor::new(&data);
        let field = read_fixed(&mut c, 4).unwrap();
        assert_eq!(
            field,
            Field::Fixed {
                data: vec![0xff, 0xff, 0xff, 0xff]
            }
        );
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn test_read_fixed_truncated() {
        let mut c = Cursor::new(&[0xff]);
        assert!(matches!(
            read_fixed(&mut c, 2),
            Err(AsterixError::Truncated {
                needed: 2,
                available: 1
            })
        ));
    }

    // -- Extended --

    #[test]
    fn test_read_extended() {
        let data = [0xff, 0xff, 0xfe, 0xaa];
        let mut c = Cursor::new(&data);
        let field = read_extended(&mut c, 1).unwrap();
        assert_eq!(
            field,
            Field::Extended {
                primary: vec![0xff],
                secondary: vec![0xff, 0xfe]
            }
        );
        assert_eq!(field.encode(), vec![0xff, 0xff, 0xfe]);
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn test_read_extended_multi_octet_parts() {
        // Two-octet parts: FX lives in the second octet of each part.
        let data = [0x00, 0x01, 0x12, 0x34];
        let mut c = Cursor::new(&data);
        let field = read_extended(&mut c, 2).unwrap();
        assert_eq!(field.encode(), data.to_vec());
        assert!(c.is_empty());
    }

    #[test]
    fn test_read_extended_truncated() {
        let mut c = Cursor::new(&[0xff, 0x03]);
        assert!(matches!(
            read_extended(&mut c, 1),
            Err(AsterixError::Truncated { .. })
        ));
    }

    // -- Explicit / SP / RE --

    #[test]
    fn test_read_explicit() {
        let data = [0x04, 0xff, 0xff, 0xff];
        let mut c = Cursor::new(&data);
        let field = read_explicit(&mut c).unwrap();
        assert_eq!(
            field,
            Field::Explicit {
                len: 4,
                data: vec![0xff, 0xff, 0xff]
            }
        );
        assert_eq!(field.encode(), data.to_vec());
        assert!(c.is_empty());
    }

    #[test]
    fn test_read_explicit_bad_length() {
        let mut c = Cursor::new(&[0x00, 0xff]);
        assert!(matches!(
            read_explicit(&mut c),
            Err(AsterixError::BadLength(0))
        ));
    }

    #[test]
    fn test_read_explicit_truncated() {
        let mut c = Cursor::new(&[0x05, 0xff, 0xff]);
        assert!(matches!(
            read_explicit(&mut c),
            Err(AsterixError::Truncated {
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_read_sp_and_re_share_wire_shape() {
        let data = [0x03, 0x12, 0x34];
        let sp = read_special_purpose(&mut Cursor::new(&data)).unwrap();
        let re = read_reserved_expansion(&mut Cursor::new(&data)).unwrap();
        assert!(matches!(sp, Field::SpecialPurpose { len: 3, .. }));
        assert!(matches!(re, Field::ReservedExpansion { len: 3, .. }));
        assert_eq!(sp.encode(), re.encode());
    }

    // -- Repetitive --

    #[test]
    fn test_read_repetitive() {
        let data = [0x03, 0xff, 0xff, 0xfe];
        let mut c = Cursor::new(&data);
        let field = read_repetitive(&mut c, 1).unwrap();
        assert_eq!(
            field,
            Field::Repetitive {
                rep: 3,
                data: vec![0xff, 0xff, 0xfe]
            }
        );
        assert_eq!(field.encode(), data.to_vec());
    }

    #[test]
    fn test_read_repetitive_empty() {
        let mut c = Cursor::new(&[0x00, 0xaa]);
        let field = read_repetitive(&mut c, 8).unwrap();
        assert_eq!(field.encode(), vec![0x00]);
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn test_read_repetitive_truncated() {
        let mut c = Cursor::new(&[0x02, 0xff, 0xff, 0xff]);
        assert!(matches!(
            read_repetitive(&mut c, 2),
            Err(AsterixError::Truncated { .. })
        ));
    }

    // -- Compound --

    #[test]
    fn test_read_compound() {
        let data = [0xf0, 0xff, 0xff, 0xff, 0xfe, 0x02, 0xff, 0x02, 0xff, 0xff];
        let mut c = Cursor::new(&data);
        let field = read_compound(&mut c, 3, &compound_layout()).unwrap();
        assert!(c.is_empty());

        let Field::Compound { primary, subfields } = &field else {
            panic!("expected compound, got {field:?}");
        };
        assert_eq!(primary, &vec![0xf0]);
        let slots: Vec<u8> = subfields.iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![8, 7, 6, 5]);
        assert_eq!(
            subfields[1].field,
            Field::Extended {
                primary: vec![0xff],
                secondary: vec![0xff, 0xfe]
            }
        );
        assert_eq!(field.encode(), data.to_vec());
    }

    #[test]
    fn test_compound_encode_from_parts() {
        let field = Field::Compound {
            primary: vec![0xf0],
            subfields: vec![
                SubItem {
                    octet: 0,
                    slot: 8,
                    field: Field::Fixed { data: vec![0xff] },
                },
                SubItem {
                    octet: 0,
                    slot: 7,
                    field: Field::Extended {
                        primary: vec![0xff],
                        secondary: vec![0xff, 0xfe],
                    },
                },
                SubItem {
                    octet: 0,
                    slot: 6,
                    field: Field::Explicit {
                        len: 0x02,
                        data: vec![0xff],
                    },
                },
                SubItem {
                    octet: 0,
                    slot: 5,
                    field: Field::Repetitive {
                        rep: 0x02,
                        data: vec![0xff, 0xff],
                    },
                },
            ],
        };
        let b = field.encode();
        assert_eq!(b.len(), 10);
        assert_eq!(
            b,
            vec![0xf0, 0xff, 0xff, 0xff, 0xfe, 0x02, 0xff, 0x02, 0xff, 0xff]
        );
    }

    #[test]
    fn test_read_compound_unset_slots_consume_nothing() {
        // Only slot 6 (Explicit) flagged.
        let data = [0x20, 0x02, 0xab, 0xcd];
        let mut c = Cursor::new(&data);
        let field = read_compound(&mut c, 3, &compound_layout()).unwrap();
        assert_eq!(field.encode(), vec![0x20, 0x02, 0xab]);
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn test_read_compound_extended_primary() {
        // Two primary octets; each one selects from the same slot table.
        let data = [0x81, 0x80, 0x11, 0x22];
        let mut c = Cursor::new(&data);
        let field = read_compound(&mut c, 3, &compound_layout()).unwrap();
        let Field::Compound { primary, subfields } = &field else {
            panic!("expected compound");
        };
        assert_eq!(primary.len(), 2);
        assert_eq!(subfields.len(), 2);
        assert_eq!((subfields[0].octet, subfields[0].slot), (0, 8));
        assert_eq!((subfields[1].octet, subfields[1].slot), (1, 8));
        assert!(c.is_empty());
    }

    #[test]
    fn test_read_compound_long_primary_octet_index() {
        let mut data = vec![0x01; 299];
        data.extend_from_slice(&[0x80, 0x42]);
        let mut c = Cursor::new(&data);
        let field = read_compound(&mut c, 3, &compound_layout()).unwrap();
        let Field::Compound { subfields, .. } = &field else {
            panic!("expected compound");
        };
        assert_eq!(subfields.len(), 1);
        assert_eq!((subfields[0].octet, subfields[0].slot), (299, 8));
        assert_eq!(field.encode(), data);
    }

    #[test]
    fn test_read_compound_spare_slot() {
        // Slot 4 is not declared in the layout.
        let mut c = Cursor::new(&[0x08, 0xff]);
        assert!(matches!(
            read_compound(&mut c, 3, &compound_layout()),
            Err(AsterixError::DatafieldUnknown(3))
        ));
    }

    #[test]
    fn test_read_compound_truncated_primary() {
        let mut c = Cursor::new(&[0x81]);
        assert!(matches!(
            read_compound(&mut c, 3, &compound_layout()),
            Err(AsterixError::Truncated { .. })
        ));
    }

    // -- RFS --

    #[test]
    fn test_read_rfs() {
        let uap = test_uap();
        // Two fields out of order: FRN 5 (explicit), then FRN 1 (fixed 2).
        let data = [0x02, 0x05, 0x02, 0xaa, 0x01, 0x12, 0x34, 0xee];
        let mut c = Cursor::new(&data);
        let field = read_rfs(&mut c, &uap).unwrap();
        let Field::RandomFieldSequencing { count, fields } = &field else {
            panic!("expected rfs");
        };
        assert_eq!(*count, 2);
        assert_eq!(fields[0].frn, 5);
        assert_eq!(fields[1].frn, 1);
        assert_eq!(
            fields[1].field,
            Field::Fixed {
                data: vec![0x12, 0x34]
            }
        );
        assert_eq!(field.encode(), data[..7].to_vec());
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn test_read_rfs_unknown_frn() {
        let uap = test_uap();
        let mut c = Cursor::new(&[0x01, 0x2a, 0x00]);
        assert!(matches!(
            read_rfs(&mut c, &uap),
            Err(AsterixError::DatafieldUnknown(42))
        ));
    }

    #[test]
    fn test_read_rfs_rejects_nested_and_spare() {
        let uap = test_uap();
        let mut c = Cursor::new(&[0x01, 0x06, 0x00]);
        assert!(matches!(
            read_rfs(&mut c, &uap),
            Err(AsterixError::DatafieldUnknown(6))
        ));
        let mut c = Cursor::new(&[0x01, 0x07, 0x00]);
        assert!(matches!(
            read_rfs(&mut c, &uap),
            Err(AsterixError::DatafieldUnknown(7))
        ));
    }

    #[test]
    fn test_read_rfs_empty() {
        let uap = test_uap();
        let mut c = Cursor::new(&[0x00]);
        let field = read_rfs(&mut c, &uap).unwrap();
        assert_eq!(field.encode(), vec![0x00]);
    }

    // -- Dispatch --

    #[test]
    fn test_read_field_dispatch() {
        let uap = test_uap();
        let data = [0x80, 0x41, 0x03, 0x01, 0x02];
        let mut c = Cursor::new(&data);
        let field = read_field(&mut c, uap.field(3).unwrap(), &uap).unwrap();
        assert!(matches!(field, Field::Compound { .. }));
        assert_eq!(c.remaining(), 3);

        let sp = read_field(&mut c, uap.field(8).unwrap(), &uap).unwrap();
        assert!(matches!(sp, Field::SpecialPurpose { len: 3, .. }));
        assert!(c.is_empty());
    }

    #[test]
    fn test_read_field_spare() {
        let uap = test_uap();
        let mut c = Cursor::new(&[0xff]);
        assert!(matches!(
            read_field(&mut c, uap.field(7).unwrap(), &uap),
            Err(AsterixError::DatafieldUnknown(7))
        ));
    }
}
