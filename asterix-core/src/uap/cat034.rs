//! CAT034: Transmission of Monoradar Service Messages.

use super::{CompoundLayout, DataField, FieldKind, SubFieldKind, Uap};

/// Standard CAT034 UAP (edition 1.27).
pub fn cat034() -> Uap {
    use FieldKind::*;

    // I034/050 System Configuration and Status. Slots 7 and 6 are spare.
    let configuration_status = CompoundLayout::new()
        .with(8, SubFieldKind::Fixed(1))
        .with(5, SubFieldKind::Fixed(1))
        .with(4, SubFieldKind::Fixed(1))
        .with(3, SubFieldKind::Fixed(2));

    // I034/060 System Processing Mode.
    let processing_mode = CompoundLayout::new()
        .with(8, SubFieldKind::Fixed(1))
        .with(5, SubFieldKind::Fixed(1))
        .with(4, SubFieldKind::Fixed(1))
        .with(3, SubFieldKind::Fixed(1));

    Uap::new(
        34,
        "cat034_1.27",
        vec![
            DataField::new(1, "I034/010", Fixed(2)),
            DataField::new(2, "I034/000", Fixed(1)),
            DataField::new(3, "I034/030", Fixed(3)),
            DataField::new(4, "I034/020", Fixed(1)),
            DataField::new(5, "I034/041", Fixed(2)),
            DataField::new(6, "I034/050", Compound(configuration_status)),
            DataField::new(7, "I034/060", Compound(processing_mode)),
            DataField::new(8, "I034/070", Repetitive(2)),
            DataField::new(9, "I034/100", Fixed(8)),
            DataField::new(10, "I034/110", Fixed(1)),
            DataField::new(11, "I034/120", Fixed(8)),
            DataField::new(12, "I034/090", Fixed(2)),
            DataField::new(13, "RE", ReservedExpansion),
            DataField::new(14, "SP", SpecialPurpose),
        ],
    )
}
