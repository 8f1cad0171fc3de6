//! CAT048: Monoradar Target Reports.

use super::{CompoundLayout, DataField, FieldKind, SubFieldKind, Uap};

/// Standard CAT048 UAP (edition 1.21).
pub fn cat048() -> Uap {
    use FieldKind::*;

    // I048/130 Radar Plot Characteristics: seven one-octet subfields.
    let plot_characteristics = (2..=8).fold(CompoundLayout::new(), |layout, slot| {
        layout.with(slot, SubFieldKind::Fixed(1))
    });

    // I048/120 Radial Doppler Speed: CAL, then repeated raw Doppler samples.
    let doppler_speed = CompoundLayout::new()
        .with(8, SubFieldKind::Fixed(2))
        .with(7, SubFieldKind::Repetitive(6));

    Uap::new(
        48,
        "cat048_1.21",
        vec![
            DataField::new(1, "I048/010", Fixed(2)),
            DataField::new(2, "I048/140", Fixed(3)),
            DataField::new(3, "I048/020", Extended(1)),
            DataField::new(4, "I048/040", Fixed(4)),
            DataField::new(5, "I048/070", Fixed(2)),
            DataField::new(6, "I048/090", Fixed(2)),
            DataField::new(7, "I048/130", Compound(plot_characteristics)),
            DataField::new(8, "I048/220", Fixed(3)),
            DataField::new(9, "I048/240", Fixed(6)),
            DataField::new(10, "I048/250", Repetitive(8)),
            DataField::new(11, "I048/161", Fixed(2)),
            DataField::new(12, "I048/042", Fixed(4)),
            DataField::new(13, "I048/200", Fixed(4)),
            DataField::new(14, "I048/170", Extended(1)),
            DataField::new(15, "I048/210", Fixed(4)),
            DataField::new(16, "I048/030", Extended(1)),
            DataField::new(17, "I048/080", Fixed(2)),
            DataField::new(18, "I048/100", Fixed(4)),
            DataField::new(19, "I048/110", Fixed(2)),
            DataField::new(20, "I048/120", Compound(doppler_speed)),
            DataField::new(21, "I048/230", Fixed(2)),
            DataField::new(22, "I048/260", Fixed(7)),
            DataField::new(23, "I048/055", Fixed(1)),
            DataField::new(24, "I048/050", Fixed(2)),
            DataField::new(25, "I048/065", Fixed(1)),
            DataField::new(26, "I048/060", Fixed(2)),
            DataField::new(27, "SP", SpecialPurpose),
            DataField::new(28, "RE", ReservedExpansion),
        ],
    )
}
