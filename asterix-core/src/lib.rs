//! asterix-core: Pure decode library for EUROCONTROL ASTERIX data.
//!
//! No async, no I/O beyond the optional config file. Buffers go in, data
//! blocks, records and raw field payloads come out, shaped by the User
//! Application Profile of each category. Field semantics (units,
//! coordinates) are left to the caller.

pub mod config;
pub mod cursor;
pub mod datablock;
pub mod field;
pub mod fspec;
pub mod record;
pub mod types;
pub mod uap;

// Re-export commonly used types at crate root
pub use datablock::{decode_datablock, decode_wrapper, DataBlock, WrapperDataBlock};
pub use field::Field;
pub use record::{decode_record, Item, Record};
pub use types::*;
pub use uap::{FieldKind, ProfileSet, Uap};
