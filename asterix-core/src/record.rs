//! Decode one ASTERIX record: FSPEC, then the flagged fields in FRN order.

use log::{debug, trace};
use serde::Serialize;

use crate::cursor::Cursor;
use crate::field::{read_field, Field};
use crate::fspec::{fspec_to_frns, read_fspec};
use crate::types::{hex_encode, serialize_hex, AsterixError, DecodeFailure, Result};
use crate::uap::Uap;

/// One decoded data item of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub frn: u8,
    /// Data item tag copied from the UAP, e.g. `I048/010`.
    pub tag: String,
    pub field: Field,
    /// Exact wire bytes of the field.
    #[serde(serialize_with = "serialize_hex")]
    pub raw: Vec<u8>,
}

impl Item {
    pub fn payload(&self) -> &[u8] {
        &self.raw
    }

    /// `"<tag>: <hex>"`, for diagnostics only.
    pub fn to_display_string(&self) -> String {
        format!("{}: {}", self.tag, hex_encode(&self.raw))
    }
}

/// A record: FSPEC plus one item per flagged FRN, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(serialize_with = "serialize_hex")]
    pub fspec: Vec<u8>,
    pub items: Vec<Item>,
}

impl Record {
    /// Re-encode the record: FSPEC followed by every item's raw bytes.
    ///
    /// For a record that decoded without error this is exactly the input.
    pub fn payload(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(self.encoded_len());
        b.extend_from_slice(&self.fspec);
        for item in &self.items {
            b.extend_from_slice(&item.raw);
        }
        b
    }

    /// Size of the record on the wire.
    pub fn encoded_len(&self) -> usize {
        self.fspec.len() + self.items.iter().map(|i| i.raw.len()).sum::<usize>()
    }

    /// FSPEC line followed by one line per item, hex encoded.
    pub fn to_display_strings(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.items.len() + 1);
        lines.push(format!("FSPEC: {}", hex_encode(&self.fspec)));
        lines.extend(self.items.iter().map(Item::to_display_string));
        lines
    }

    /// Item decoded for `frn`, if the record carries it.
    pub fn item(&self, frn: u8) -> Option<&Item> {
        self.items.iter().find(|i| i.frn == frn)
    }

    /// Item decoded for the data item `tag`, if the record carries it.
    pub fn item_by_tag(&self, tag: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.tag == tag)
    }
}

/// Decode one record from the front of `data` using `uap`.
///
/// Returns the record and the number of bytes left after it. Any field
/// failure aborts the record; the failure carries the items decoded so far.
pub fn decode_record(
    data: &[u8],
    uap: &Uap,
) -> std::result::Result<(Record, usize), DecodeFailure<Record>> {
    let mut c = Cursor::new(data);
    let mut record = Record::default();

    match decode_items(&mut c, uap, &mut record) {
        Ok(()) => {
            debug!(
                "cat{:03} record: {} items, {} bytes",
                uap.category,
                record.items.len(),
                record.encoded_len()
            );
            Ok((record, c.remaining()))
        }
        Err(error) => {
            debug!(
                "cat{:03} record failed after {} items: {error}",
                uap.category,
                record.items.len()
            );
            Err(DecodeFailure::new(record, c.remaining(), error))
        }
    }
}

fn decode_items(c: &mut Cursor<'_>, uap: &Uap, record: &mut Record) -> Result<()> {
    record.fspec = read_fspec(c)?.to_vec();

    for frn in fspec_to_frns(&record.fspec)? {
        let entry = uap.field(frn).ok_or(AsterixError::DatafieldUnknown(frn))?;
        let start = c.position();
        let field = read_field(c, entry, uap)?;
        let raw = c.since(start).to_vec();
        trace!("{} ({}): {}", entry.tag, entry.kind.name(), hex_encode(&raw));

        record.items.push(Item {
            frn: entry.frn,
            tag: entry.tag.clone(),
            field,
            raw,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
