//! Error taxonomy for loading an Allegro `.brd` file.
//!
//! Every variant here is fatal to the current load; nothing is retried by
//! this crate. Soft anomalies (missing pad number, unresolvable font,
//! unrecognized pad-component shape) are logged via `tracing` rather than
//! surfaced as errors; see the `graph_builder` module.

use thiserror::Error;

/// Byte-swaps a value the way the original importer does before formatting
/// it into an error message: on-disk integers are consumed in host order,
/// but diagnostics render them in the order the bytes actually appear in the
/// file.
pub(crate) fn local_ntohl(v: u32) -> u32 {
    v.swap_bytes()
}

#[derive(Debug, Error)]
pub enum BrdError {
    #[error("Failed to open file.")]
    FileOpen { source: std::io::Error },

    #[error("Board file magic=0x{0:08X} not recognized.")]
    UnknownMagic(u32),

    #[error("Units 0x{0:02X} not recognized.")]
    BadUnits(u8),

    #[error("Do not have parser for t=0x{0:08X} available.")]
    UnknownRecord(u32),

    #[error("Do not know how to handle subtype 0x{0:02X}.")]
    UnknownSubtype(u8),

    #[error("record at offset {offset} needs {needed} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl BrdError {
    /// Builds the `UnknownMagic` variant from a magic value already read in
    /// host (little-endian-consumed) order, applying the display swap.
    pub(crate) fn unknown_magic(raw: u32) -> Self {
        BrdError::UnknownMagic(local_ntohl(raw))
    }

    /// Builds the `UnknownRecord` variant from a raw tag byte, applying the
    /// same display swap the original importer applies before formatting.
    pub(crate) fn unknown_record(tag: u8) -> Self {
        BrdError::UnknownRecord(local_ntohl(tag as u32))
    }
}

pub type Result<T> = std::result::Result<T, BrdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_magic_message_matches_literal_bytes() {
        // File bytes 00 14 99 99 read as a little-endian u32 give 0x99991400;
        // the display swap restores the on-disk byte order for the message.
        let raw = u32::from_le_bytes([0x00, 0x14, 0x99, 0x99]);
        let err = BrdError::unknown_magic(raw);
        assert_eq!(
            err.to_string(),
            "Board file magic=0x00149999 not recognized."
        );
    }

    #[test]
    fn unknown_record_message_matches_corrupted_tag() {
        let err = BrdError::unknown_record(0xFF);
        assert_eq!(
            err.to_string(),
            "Do not have parser for t=0xFF000000 available."
        );
    }

    #[test]
    fn bad_units_message_is_literal() {
        let err = BrdError::BadUnits(0x04);
        assert_eq!(err.to_string(), "Units 0x04 not recognized.");
    }
}
