//! Decode captures and aggregate per-category statistics.

use std::collections::BTreeMap;

use log::{info, warn};
use serde::Serialize;

use asterix_core::datablock::{decode_datablock, decode_wrapper, HEADER_LEN};
use asterix_core::{AsterixError, ProfileSet, WrapperDataBlock};

/// A data block that could not be decoded.
#[derive(Debug, Serialize)]
pub struct BlockIssue {
    /// Offset of the failing block within the capture.
    pub offset: usize,
    pub error: String,
}

/// Everything recovered from one capture.
#[derive(Debug, Default, Serialize)]
pub struct Outcome {
    #[serde(flatten)]
    pub wrapper: WrapperDataBlock,
    pub issues: Vec<BlockIssue>,
}

/// Decode one capture.
///
/// Without `skip_errors` this is a plain wrapper decode: the first failure
/// ends the capture. With it, a failing block whose declared length is
/// usable is stepped over and decoding resumes at the next block.
pub fn decode_capture(data: &[u8], profiles: &ProfileSet, skip_errors: bool) -> Outcome {
    if !skip_errors {
        return match decode_wrapper(data, profiles) {
            Ok((wrapper, _)) => Outcome {
                wrapper,
                issues: Vec::new(),
            },
            Err(f) => {
                let offset = f.partial.blocks.iter().map(|b| b.len as usize).sum();
                Outcome {
                    wrapper: f.partial,
                    issues: vec![BlockIssue {
                        offset,
                        error: f.error.to_string(),
                    }],
                }
            }
        };
    }

    let mut outcome = Outcome::default();
    let mut offset = 0;
    while offset < data.len() {
        match decode_datablock(&data[offset..], profiles) {
            Ok((block, _)) => {
                offset += block.len as usize;
                outcome.wrapper.blocks.push(block);
            }
            Err(f) => {
                let len = f.partial.len as usize;
                let resumable = is_resumable(&f.error) && len >= HEADER_LEN;
                outcome.issues.push(BlockIssue {
                    offset,
                    error: f.error.to_string(),
                });
                if !resumable {
                    break;
                }
                info!(
                    "skipping cat{:03} block at offset {offset} ({len} bytes)",
                    f.partial.category
                );
                offset += len;
            }
        }
    }
    outcome
}

/// Whether the declared block length can still be trusted after `error`.
fn is_resumable(error: &AsterixError) -> bool {
    matches!(
        error,
        AsterixError::CategoryUnknown(_)
            | AsterixError::DatafieldUnknown(_)
            | AsterixError::FrnOverflow(_)
            | AsterixError::Truncated { .. }
            | AsterixError::BadLength(_)
    )
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub blocks: u64,
    pub records: u64,
    pub bytes: u64,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub captures: u64,
    pub per_category: BTreeMap<u8, CategoryStats>,
    pub issues: u64,
}

impl Summary {
    pub fn add(&mut self, outcome: &Outcome) {
        self.captures += 1;
        self.issues += outcome.issues.len() as u64;
        for block in &outcome.wrapper.blocks {
            let stats = self.per_category.entry(block.category).or_default();
            stats.blocks += 1;
            stats.records += block.records.len() as u64;
            stats.bytes += block.len as u64;
        }
        for issue in &outcome.issues {
            warn!("block at offset {}: {}", issue.offset, issue.error);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
