//! Capture input: hex text (one wrapper per line) or a raw binary file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::warn;

use asterix_core::types::{hex_decode, AsterixError};

/// One wrapper of data blocks read from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Where the bytes came from, e.g. `line 3`.
    pub label: String,
    pub data: Vec<u8>,
}

/// Read captures from `path` (`-` for stdin).
///
/// In hex mode, blank lines and `#` comments are skipped and lines that are
/// not valid hex are reported and dropped. In binary mode the whole input is
/// a single capture.
pub fn read_captures(path: &Path, binary: bool) -> Result<Vec<Capture>, AsterixError> {
    let mut reader: Box<dyn BufRead> = if path.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    if binary {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        return Ok(vec![Capture {
            label: path.display().to_string(),
            data,
        }]);
    }

    parse_hex_lines(reader)
}

/// Parse hex captures, one per line.
pub fn parse_hex_lines(reader: impl BufRead) -> Result<Vec<Capture>, AsterixError> {
    let mut captures = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let hex = line.trim();
        if hex.is_empty() || hex.starts_with('#') {
            continue;
        }
        match hex_decode(hex) {
            Ok(data) => captures.push(Capture {
                label: format!("line {}", idx + 1),
                data,
            }),
            Err(e) => warn!("skipping line {}: {e}", idx + 1),
        }
    }
    Ok(captures)
}
