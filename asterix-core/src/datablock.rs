//! Data blocks and wrappers of data blocks.
//!
//! A data block is `CAT (1) + LEN (2, big-endian, header included)` followed
//! by one or more records of that category. A wrapper is any number of data
//! blocks, possibly of different categories, laid back to back.
//!
//! Decoding is fail-fast: the first error aborts the whole call and is
//! returned together with whatever was decoded up to that point.

use log::debug;
use serde::Serialize;

use crate::cursor::Cursor;
use crate::record::{decode_record, Record};
use crate::types::{AsterixError, DecodeFailure};
use crate::uap::ProfileSet;

/// Size of the CAT + LEN header.
pub const HEADER_LEN: usize = 3;

// ---------------------------------------------------------------------------
// DataBlock
// ---------------------------------------------------------------------------

/// One data block: a single category and its records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataBlock {
    pub category: u8,
    /// Declared length, header included.
    pub len: u16,
    pub records: Vec<Record>,
}

impl DataBlock {
    /// Re-encoded bytes of each record, in decode order.
    pub fn payload(&self) -> Vec<Vec<u8>> {
        self.records.iter().map(Record::payload).collect()
    }

    /// Re-encode the whole block, header included. The length field is
    /// recomputed from the records; a block too large for it fails with
    /// `Oversized`.
    pub fn encode(&self) -> Result<Vec<u8>, AsterixError> {
        let body: Vec<u8> = self.records.iter().flat_map(|r| r.payload()).collect();
        let total = HEADER_LEN + body.len();
        let len = u16::try_from(total).map_err(|_| AsterixError::Oversized(total))?;
        let mut b = Vec::with_capacity(total);
        b.push(self.category);
        b.extend_from_slice(&len.to_be_bytes());
        b.extend_from_slice(&body);
        Ok(b)
    }

    /// Display strings of every record.
    pub fn to_display_strings(&self) -> Vec<Vec<String>> {
        self.records.iter().map(Record::to_display_strings).collect()
    }
}

/// Decode one data block from the front of `data`.
///
/// Returns the block and the number of bytes following it. Fails with
/// `Undersized` when the declared length exceeds the buffer and with
/// `CategoryUnknown` when `profiles` has no table for the category; neither
/// yields any records.
pub fn decode_datablock(
    data: &[u8],
    profiles: &ProfileSet,
) -> Result<(DataBlock, usize), DecodeFailure<DataBlock>> {
    let mut c = Cursor::new(data);
    let mut block = DataBlock::default();

    match c.read_u8() {
        Ok(cat) => block.category = cat,
        Err(error) => return Err(failure(block, c.remaining(), error)),
    }
    match c.read_u16_be() {
        Ok(len) => block.len = len,
        Err(error) => return Err(failure(block, c.remaining(), error)),
    }

    let declared = block.len as usize;
    if declared < HEADER_LEN {
        let (len, unread) = (block.len, c.remaining());
        return Err(failure(block, unread, AsterixError::BadLength(len)));
    }
    if c.remaining() < declared - HEADER_LEN {
        let error = AsterixError::Undersized {
            declared,
            available: data.len(),
        };
        return Err(failure(block, c.remaining(), error));
    }

    let payload = match c.take(declared - HEADER_LEN) {
        Ok(p) => p,
        Err(error) => return Err(failure(block, c.remaining(), error)),
    };
    let after = c.remaining();

    let uap = match profiles.get(block.category) {
        Ok(uap) => uap,
        Err(error) => return Err(failure(block, after, error)),
    };

    let mut offset = 0;
    while offset < payload.len() {
        match decode_record(&payload[offset..], uap) {
            Ok((record, unread)) => {
                block.records.push(record);
                offset = payload.len() - unread;
            }
            Err(f) => {
                block.records.push(f.partial);
                return Err(failure(block, after + f.unread, f.error));
            }
        }
    }

    debug!(
        "cat{:03} block: len {}, {} records",
        block.category,
        block.len,
        block.records.len()
    );
    Ok((block, after))
}

fn failure(block: DataBlock, unread: usize, error: AsterixError) -> DecodeFailure<DataBlock> {
    debug!(
        "cat{:03} block (len {}) failed with {} bytes unread: {error}",
        block.category, block.len, unread
    );
    DecodeFailure::new(block, unread, error)
}

// ---------------------------------------------------------------------------
// WrapperDataBlock
// ---------------------------------------------------------------------------

/// Data blocks in buffer order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrapperDataBlock {
    pub blocks: Vec<DataBlock>,
}

impl WrapperDataBlock {
    /// Re-encode every block back to back.
    pub fn encode(&self) -> Result<Vec<u8>, AsterixError> {
        let mut b = Vec::new();
        for block in &self.blocks {
            b.extend_from_slice(&block.encode()?);
        }
        Ok(b)
    }

    /// Total number of records across all blocks.
    pub fn record_count(&self) -> usize {
        self.blocks.iter().map(|b| b.records.len()).sum()
    }
}

/// Decode consecutive data blocks until `data` is exhausted.
///
/// The first failing block aborts the call; the failure carries the blocks
/// decoded before it (not the failing one) and the unread count reported by
/// that block.
pub fn decode_wrapper(
    data: &[u8],
    profiles: &ProfileSet,
) -> Result<(WrapperDataBlock, usize), DecodeFailure<WrapperDataBlock>> {
    let mut wrapper = WrapperDataBlock::default();
    let mut offset = 0;

    loop {
        match decode_datablock(&data[offset..], profiles) {
            Ok((block, unread)) => {
                offset += block.len as usize;
                wrapper.blocks.push(block);
                if unread == 0 {
                    return Ok((wrapper, unread));
                }
            }
            Err(f) => {
                debug!(
                    "wrapper aborted after {} blocks at offset {offset}",
                    wrapper.blocks.len()
                );
                return Err(DecodeFailure::new(wrapper, f.unread, f.error));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
