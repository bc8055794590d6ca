//! Per-file stream compression.
//!
//! Each column file is an independent compressed stream, so columns can be
//! encoded and decoded in parallel without coordinating offsets.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use serde::{Deserialize, Serialize};

/// How column files are compressed. Recorded in the table metadata; every
/// column file of a table uses the same kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionKind {
    None,
    #[default]
    SnappyFramed,
}

impl CompressionKind {
    /// Wraps `file` for writing one column stream. Flushing the returned
    /// writer finalizes any pending frame.
    pub fn wrap_writer(self, file: File) -> Box<dyn Write + Send> {
        let buffered = BufWriter::new(file);
        match self {
            CompressionKind::None => Box::new(buffered),
            CompressionKind::SnappyFramed => Box::new(snap::write::FrameEncoder::new(buffered)),
        }
    }

    pub fn wrap_reader(self, file: File) -> Box<dyn Read + Send> {
        let buffered = BufReader::new(file);
        match self {
            CompressionKind::None => Box::new(buffered),
            CompressionKind::SnappyFramed => Box::new(snap::read::FrameDecoder::new(buffered)),
        }
    }
}

/// Reserved. Nothing is encrypted today, but the metadata field keeps old
/// readers from silently misreading a future encrypted container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionKind {
    #[default]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&CompressionKind::SnappyFramed).unwrap(),
            "\"SNAPPY_FRAMED\""
        );
        assert_eq!(serde_json::to_string(&CompressionKind::None).unwrap(), "\"NONE\"");
        assert_eq!(serde_json::to_string(&EncryptionKind::None).unwrap(), "\"NONE\"");
        let parsed: CompressionKind = serde_json::from_str("\"SNAPPY_FRAMED\"").unwrap();
        assert_eq!(parsed, CompressionKind::SnappyFramed);
    }

    #[test]
    fn default_is_snappy() {
        assert_eq!(CompressionKind::default(), CompressionKind::SnappyFramed);
    }
}
