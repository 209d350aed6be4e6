//! The record grammar: the file magic/version lattice, scalar encodings,
//! and the fixed-layout shapes of every record tag this crate understands.
//!
//! Records are decoded into owned, typed values during the parse pass:
//! never dereference a raw offset after the index pass completes, and
//! never assume native alignment of file offsets.

use crate::error::BrdError;

/// Logical file-format version. Several literal on-disk magic values alias
/// to the same logical version; see [`Magic::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Magic {
    A160,
    A162,
    A164,
    A165,
    A166,
    A172,
    A174,
    A175,
}

impl Magic {
    /// Maps a raw, natively-consumed magic `u32` to its logical version.
    pub fn from_raw(raw: u32) -> Result<Magic, BrdError> {
        use Magic::*;
        Ok(match raw {
            0x0013_0000 | 0x0013_0200 => A160,
            0x0013_0402 | 0x0013_0600 => A162,
            0x0013_0800 | 0x0013_0A00 => A164,
            0x0013_0C00 => A165,
            0x0013_0E00 | 0x0013_1000 => A166,
            0x0014_0000 | 0x0014_0200 | 0x0014_0400 | 0x0014_0600 => A172,
            0x0014_0800 | 0x0014_0A00 | 0x0014_0C00 | 0x0014_0E00 => A174,
            0x0014_1000 | 0x0014_1200 | 0x0014_1400 | 0x0014_1500 | 0x0014_1502 => A175,
            other => return Err(BrdError::unknown_magic(other)),
        })
    }

    pub fn at_least(self, other: Magic) -> bool {
        self >= other
    }
}

/// Header `units` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    pub fn from_raw(raw: u8) -> Result<Units, BrdError> {
        match raw {
            0x01 => Ok(Units::Imperial),
            0x03 => Ok(Units::Metric),
            other => Err(BrdError::BadUnits(other)),
        }
    }

    /// Numerator of the scale factor; divide by the header's `unit_divisor`.
    pub fn numerator(self) -> f64 {
        match self {
            Units::Imperial => 25400.0,
            Units::Metric => 1_000_000.0,
        }
    }
}

/// Layer family byte, top bits of a [`LayerInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerFamily {
    BoardGeometry,
    Copper,
    Silk,
    Other(u8),
}

impl LayerFamily {
    pub fn from_raw(raw: u8) -> LayerFamily {
        match raw {
            0x01 => LayerFamily::BoardGeometry,
            0x06 => LayerFamily::Copper,
            0x09 => LayerFamily::Silk,
            other => LayerFamily::Other(other),
        }
    }
}

/// `(family, ordinal)` pair identifying a layer within a layer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerInfo {
    pub family: LayerFamily,
    pub ordinal: u8,
}

/// Pad type discriminator from `PAD_INFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadType {
    ThroughVia,
    Via,
    SmtPin,
    Slot,
    NonPlatedHole,
    SmtPin2,
    Unknown(u8),
}

impl PadType {
    pub fn from_raw(raw: u8) -> PadType {
        match raw {
            0 => PadType::ThroughVia,
            1 => PadType::Via,
            2 => PadType::SmtPin,
            4 => PadType::Slot,
            8 => PadType::NonPlatedHole,
            10 => PadType::SmtPin2,
            other => PadType::Unknown(other),
        }
    }
}

/// Text alignment, low bits of `TEXT_PROPERTIES.align`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Whether a text graphic is drawn mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextReversal {
    Normal,
    Reversed,
}

/// Shape of one [`PadStackComponent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    Circle,
    Rectangle,
    RoundRect,
    Custom,
}

impl PadShape {
    pub fn from_raw(raw: u8) -> Option<PadShape> {
        match raw {
            0x02 => Some(PadShape::Circle),
            0x05 | 0x06 => Some(PadShape::Rectangle),
            0x0B | 0x1B | 0x0C => Some(PadShape::RoundRect),
            0x16 => Some(PadShape::Custom),
            _ => None,
        }
    }
}

/// Rounds `n` up to the next multiple of 4 (on-disk variable-length records
/// are word-aligned).
pub fn round_to_word(n: u32) -> u32 {
    (n + 3) / 4 * 4
}

/// Decodes a `CADENCE_FP`: an IEEE-754 double stored as two 32-bit halves in
/// swapped order. `x`/`y` are the two halves exactly as they appear in the
/// struct; decoding concatenates them high/low reversed before
/// reinterpreting as `f64`.
pub fn cadence_fp_to_f64(x: u32, y: u32) -> f64 {
    let mut bytes = [0u8; 8];
    bytes[0..4].copy_from_slice(&y.to_le_bytes());
    bytes[4..8].copy_from_slice(&x.to_le_bytes());
    f64::from_le_bytes(bytes)
}

/// A 2D point in file-native signed integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Decoded file header. Only the fields this crate actually consumes are
/// named; the remaining ~20 linked-list head/tail pairs are kept in
/// `linked_lists` keyed by the field name used in the original layout, since
/// most of them are only ever looked up by the graph builder at a handful
/// of call sites.
#[derive(Debug, Clone)]
pub struct Header {
    pub magic: Magic,
    pub units: Units,
    pub unit_divisor: u32,
    pub max_key: u32,
    pub strings_count: u32,
    pub x27_end_offset: u32,
    /// 26 layer-set slots indexed by [`LayerFamily`]/ordinal bucket; only
    /// the slot for [`LayerFamily::Copper`] is consumed directly today.
    pub layer_sets: [u32; 26],
    pub linked_lists: LinkedLists,
}

/// Head/tail key pairs anchoring the header's intrusive linked lists, named
/// after the fields the graph builder actually walks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedLists {
    pub ll_x1b: LlPtrs,
    pub ll_x0e_x28: LlPtrs,
    pub ll_x14: LlPtrs,
    pub ll_x2b: LlPtrs,
    pub ll_x03_x30: LlPtrs,
    pub ll_x24_x28: LlPtrs,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LlPtrs {
    pub head: u32,
    pub tail: u32,
}

/// A record's 32-bit key plus its one-byte tag, common to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHead {
    pub k: u32,
    pub t: u8,
}

/// `T01` curved segment (arc). `center`/`radius` are decoded from the
/// on-disk `CADENCE_FP` triplet, not plain integer coordinates.
#[derive(Debug, Clone)]
pub struct Arc {
    pub k: u32,
    pub next: u32,
    pub subtype: u8,
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub radius: f64,
    pub width: i32,
}

/// `T15`/`T16`/`T17` straight segment. Carries no layer of its own; it
/// inherits the layer of the track/shape/annotation chain it's linked into.
#[derive(Debug, Clone)]
pub struct Segment {
    pub k: u32,
    pub t: u8,
    pub start: Point,
    pub end: Point,
    pub width: i32,
    pub next: u32,
}

/// `T1B` net.
#[derive(Debug, Clone)]
pub struct Net {
    pub k: u32,
    pub net_name_ref: u32,
    pub ptr1: u32,
    pub next: u32,
}

/// `T04` net assignment.
#[derive(Debug, Clone)]
pub struct NetAssignment {
    pub k: u32,
    pub ptr1: u32,
    pub ptr2: u32,
    pub next: u32,
}

/// `T05` track. `ptr0` continues the owning net assignment's geometry
/// chain; `first_segment_ptr` starts this track's own arc/segment chain.
#[derive(Debug, Clone)]
pub struct Track {
    pub k: u32,
    pub layer: LayerInfo,
    pub ptr0: u32,
    pub first_segment_ptr: u32,
}

/// `T33` via. `un1` continues the owning net assignment's geometry chain.
#[derive(Debug, Clone)]
pub struct Via {
    pub k: u32,
    pub layer: LayerInfo,
    pub coords: [i32; 2],
    pub net_ptr: u32,
    pub un1: u32,
}

/// `T28` shape/zone.
#[derive(Debug, Clone)]
pub struct Shape {
    pub k: u32,
    pub layer: LayerInfo,
    pub first_segment_ptr: u32,
    pub cutouts_ptr: u32,
    pub next: u32,
}

/// `T24` rectangle.
#[derive(Debug, Clone)]
pub struct Rectangle {
    pub k: u32,
    pub layer: LayerInfo,
    pub next: u32,
    pub coords: [i32; 4],
}

/// One entry of a pad-stack's trailing component array.
#[derive(Debug, Clone, Copy)]
pub struct PadStackComponent {
    pub t: u8,
    pub w: i32,
    pub h: i32,
    pub x3: i32,
    pub x4: i32,
    pub str_ptr: u32,
}

/// `T1C` pad stack.
#[derive(Debug, Clone)]
pub struct PadStack {
    pub k: u32,
    pub layer_count: u32,
    pub pad_type: PadType,
    pub components: Vec<PadStackComponent>,
}

/// `T32` placed pad.
#[derive(Debug, Clone)]
pub struct PlacedPad {
    pub k: u32,
    pub pad_ptr: u32,
    pub net_ptr: u32,
    pub un1: u32,
}

/// `T0D` pad backing (position/rotation/pad-stack reference).
#[derive(Debug, Clone)]
pub struct PadBacking {
    pub k: u32,
    pub coords: [i32; 2],
    pub rotation: i32,
    pub pad_stack_ptr: u32,
    pub str_ptr: u32,
}

/// `T2B` footprint definition.
#[derive(Debug, Clone)]
pub struct FootprintDef {
    pub k: u32,
    pub name_ref: u32,
    pub first_placement_ptr: u32,
    pub next: u32,
}

/// `T2D` footprint placement.
#[derive(Debug, Clone)]
pub struct PlacedFootprint {
    pub k: u32,
    pub coords: [i32; 2],
    pub rotation: i32,
    pub layer: u8,
    pub inst_ref: u32,
    pub first_pad_ptr: u32,
    pub ptr1: u32,
    pub ptr3: u32,
    pub ptr4: [u32; 2],
    pub ptr2: u32,
    pub next: u32,
}

/// `T07` instance record, consumed only for its refdes string.
#[derive(Debug, Clone)]
pub struct Instance {
    pub k: u32,
    pub refdes_string_ref: u32,
}

/// `T14` annotation head.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub k: u32,
    pub layer_ptr: u32,
    pub first_segment_ptr: u32,
    pub next: u32,
}

/// `T31` string graphic. The string bytes follow immediately after this
/// record's fixed prefix in the file.
#[derive(Debug, Clone)]
pub struct StringGraphic {
    pub k: u32,
    pub len: u32,
    pub text: String,
}

/// `T30` text wrapper.
#[derive(Debug, Clone)]
pub struct TextWrapper {
    pub k: u32,
    pub t: u8,
    pub str_graphic_ptr: u32,
    pub coords: [i32; 2],
    pub rotation: i32,
    pub str_layer: u16,
    pub align: TextAlignment,
    pub reversed: TextReversal,
    pub font_props_key: u8,
    pub next: u32,
}

/// Font metrics for one glyph entry (`T36` subtype `0x08`).
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    pub char_width: i32,
    pub char_height: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_word_matches_formula() {
        assert_eq!(round_to_word(0), 0);
        assert_eq!(round_to_word(1), 4);
        assert_eq!(round_to_word(4), 4);
        assert_eq!(round_to_word(5), 8);
        assert_eq!(round_to_word(7), 8);
        assert_eq!(round_to_word(8), 8);
    }

    #[test]
    fn magic_literal_aliases_resolve_to_same_logical_version() {
        assert_eq!(Magic::from_raw(0x0014_0000).unwrap(), Magic::A172);
        assert_eq!(Magic::from_raw(0x0014_0600).unwrap(), Magic::A172);
        assert_eq!(Magic::from_raw(0x0014_1502).unwrap(), Magic::A175);
    }

    #[test]
    fn magic_unknown_raw_fails() {
        let err = Magic::from_raw(0x00149999).unwrap_err();
        assert!(matches!(err, BrdError::UnknownMagic(_)));
    }

    #[test]
    fn units_scale_numerator() {
        assert_eq!(Units::from_raw(0x01).unwrap().numerator(), 25400.0);
        assert_eq!(Units::from_raw(0x03).unwrap().numerator(), 1_000_000.0);
        assert!(Units::from_raw(0x04).is_err());
    }

    #[test]
    fn cadence_fp_decodes_known_value() {
        let one = 1.0f64;
        let bytes = one.to_le_bytes();
        let y = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let x = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(cadence_fp_to_f64(x, y), 1.0);
    }

    #[test]
    fn pad_stack_component_count_formula() {
        let layer_count = 4u32;
        assert_eq!(10 + 3 * layer_count, 22);
        assert_eq!(21 + 4 * layer_count, 37);
    }
}
