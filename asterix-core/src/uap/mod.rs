//! User Application Profiles: per-category field layout tables.
//!
//! A UAP tells the record decoder, for every FRN, which data item lives
//! there and how its bytes are laid out on the wire. Decoding never mutates
//! a profile; overriding a category means building a new [`ProfileSet`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{AsterixError, Result};

mod cat034;
mod cat048;

pub use cat034::cat034;
pub use cat048::cat048;

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// Wire encoding of a top-level data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "size")]
pub enum FieldKind {
    /// Exactly `n` octets.
    Fixed(u8),
    /// `n`-octet groups chained by the LSB of each group's last octet.
    Extended(u8),
    /// One length octet counting itself, then the data.
    Explicit,
    /// One REP octet, then REP groups of `n` octets.
    Repetitive(u8),
    /// FX-terminated primary subfield selecting subfields from a layout.
    Compound(CompoundLayout),
    SpecialPurpose,
    ReservedExpansion,
    /// Count octet, then (FRN, field) pairs in any order.
    RandomFieldSequencing,
    /// Unused FRN. A record flagging it is malformed.
    Spare,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Fixed(_) => "fixed",
            FieldKind::Extended(_) => "extended",
            FieldKind::Explicit => "explicit",
            FieldKind::Repetitive(_) => "repetitive",
            FieldKind::Compound(_) => "compound",
            FieldKind::SpecialPurpose => "sp",
            FieldKind::ReservedExpansion => "re",
            FieldKind::RandomFieldSequencing => "rfs",
            FieldKind::Spare => "spare",
        }
    }
}

/// Wire encoding of a compound subfield. Subfields are never compound
/// themselves, so that case has no representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "size")]
pub enum SubFieldKind {
    Fixed(u8),
    Extended(u8),
    Explicit,
    Repetitive(u8),
}

/// Subfield table of a compound item, indexed by primary bit position
/// 8 (MSB) down to 2. Bit 1 is FX and has no slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompoundLayout {
    slots: [Option<SubFieldKind>; 7],
}

impl CompoundLayout {
    pub fn new() -> Self {
        CompoundLayout::default()
    }

    /// Declare the subfield at bit position `slot` (8..=2).
    ///
    /// Positions outside that range are ignored.
    pub fn with(mut self, slot: u8, kind: SubFieldKind) -> Self {
        if let Some(idx) = slot_index(slot) {
            self.slots[idx] = Some(kind);
        }
        self
    }

    /// Subfield declared at bit position `slot`, `None` for spare slots.
    pub fn slot(&self, slot: u8) -> Option<SubFieldKind> {
        slot_index(slot).and_then(|idx| self.slots[idx])
    }
}

fn slot_index(slot: u8) -> Option<usize> {
    (2..=8).contains(&slot).then(|| (8 - slot) as usize)
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// One UAP entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataField {
    pub frn: u8,
    /// Data item tag, e.g. `I048/010`.
    pub tag: String,
    pub kind: FieldKind,
}

impl DataField {
    pub fn new(frn: u8, tag: impl Into<String>, kind: FieldKind) -> Self {
        DataField {
            frn,
            tag: tag.into(),
            kind,
        }
    }
}

/// Field layout table for one category, ordered by FRN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Uap {
    pub category: u8,
    pub name: String,
    pub fields: Vec<DataField>,
}

impl Uap {
    pub fn new(category: u8, name: impl Into<String>, fields: Vec<DataField>) -> Self {
        Uap {
            category,
            name: name.into(),
            fields,
        }
    }

    /// Entry for `frn`, looked up by position (`frn - 1`).
    pub fn field(&self, frn: u8) -> Option<&DataField> {
        (frn as usize).checked_sub(1).and_then(|idx| self.fields.get(idx))
    }

    /// Number of FRNs in the table.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Profile set
// ---------------------------------------------------------------------------

/// Immutable mapping from category number to its UAP.
///
/// Built once by the embedding application and handed to every decode call.
/// Overrides produce a new set instead of mutating a shared one.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    profiles: BTreeMap<u8, Uap>,
}

impl ProfileSet {
    /// A set with no categories registered.
    pub fn empty() -> Self {
        ProfileSet::default()
    }

    /// The built-in tables shipped with this crate.
    pub fn builtin() -> Self {
        ProfileSet::empty()
            .with_profile(cat034())
            .with_profile(cat048())
    }

    /// Register `uap` under its category, replacing any existing table.
    pub fn with_profile(mut self, uap: Uap) -> Self {
        self.profiles.insert(uap.category, uap);
        self
    }

    /// Drop the table for `category`.
    pub fn without(mut self, category: u8) -> Self {
        self.profiles.remove(&category);
        self
    }

    /// Keep only the listed categories.
    pub fn retain(mut self, categories: &[u8]) -> Self {
        self.profiles.retain(|cat, _| categories.contains(cat));
        self
    }

    /// Look up the table for `category`.
    pub fn get(&self, category: u8) -> Result<&Uap> {
        self.profiles
            .get(&category)
            .ok_or(AsterixError::CategoryUnknown(category))
    }

    pub fn contains(&self, category: u8) -> bool {
        self.profiles.contains_key(&category)
    }

    /// Registered categories, ascending.
    pub fn categories(&self) -> impl Iterator<Item = u8> + '_ {
        self.profiles.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uap> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
