//! Sequential record walker: reads the header, the interned string table,
//! then dispatches every record tag in file order, building the key→record
//! index and the version-specific side tables the graph builder consumes.

use std::collections::HashMap;

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::BrdError;
use crate::types::*;

const STRING_TABLE_OFFSET: usize = 0x1200;

/// One decoded record. Passthrough tags that the graph builder never
/// dereferences are interned only in [`Index::ptrs`], not here.
#[derive(Debug, Clone)]
pub enum Record {
    Arc(Arc),
    Segment(Segment),
    Net(Net),
    NetAssignment(NetAssignment),
    Track(Track),
    Via(Via),
    Shape(Shape),
    Rectangle(Rectangle),
    PadStack(PadStack),
    PlacedPad(PlacedPad),
    PadBacking(PadBacking),
    FootprintDef(FootprintDef),
    PlacedFootprint(PlacedFootprint),
    Instance(Instance),
    Annotation(Annotation),
    StringGraphic(StringGraphic),
    TextWrapper(TextWrapper),
    Cutout { k: u32, first_segment_ptr: u32, next: u32 },
}

/// A decoded `T2A` layer set: either inline-named entries (magic ≤ A_164)
/// or string-referenced entries (later magics).
#[derive(Debug, Clone)]
pub struct LayerSet {
    pub entries: Vec<LayerSetEntry>,
}

#[derive(Debug, Clone)]
pub struct LayerSetEntry {
    pub layer: LayerInfo,
    pub name: String,
}

/// `T1E` model-info payload: just the string trailer, keyed by record key.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub text: String,
}

/// The fully-populated index produced by [`parse`]. Borrows nothing from the
/// mapped file; every string and record has been copied out during the scan.
#[derive(Debug)]
pub struct Index {
    pub header: Header,
    pub strings: HashMap<u32, String>,
    /// key → tag byte, used for `is_type` checks during graph building.
    pub ptrs: HashMap<u32, u8>,
    pub records: HashMap<u32, Record>,
    pub layer_sets: HashMap<u32, LayerSet>,
    pub model_info: HashMap<u32, ModelInfo>,
    pub font_tables: HashMap<u32, Vec<FontMetrics>>,
    pub scale_factor: f64,
    pub magic: Magic,
}

impl Index {
    pub fn is_type(&self, key: u32, tag: u8) -> bool {
        self.ptrs.get(&key).copied() == Some(tag)
    }

    pub fn record(&self, key: u32) -> Option<&Record> {
        self.records.get(&key)
    }
}

struct Ctx<'a> {
    magic: Magic,
    ptrs: HashMap<u32, u8>,
    records: HashMap<u32, Record>,
    layer_sets: HashMap<u32, LayerSet>,
    model_info: HashMap<u32, ModelInfo>,
    font_tables: HashMap<u32, Vec<FontMetrics>>,
    strings: &'a HashMap<u32, String>,
}

impl<'a> Ctx<'a> {
    fn register(&mut self, k: u32, t: u8, record: Option<Record>) {
        self.ptrs.insert(k, t);
        if let Some(r) = record {
            self.records.insert(k, r);
        }
    }
}

fn read_head(cur: &mut Cursor) -> Result<(u8, u32), BrdError> {
    let t = cur.u8()?;
    cur.skip(3)?;
    let k = cur.u32()?;
    Ok((t, k))
}

/// On-disk size (bytes, including the record's own header) of a passthrough
/// tag this crate never dereferences beyond registering its key. Each
/// formula follows that tag's real struct, with the same `COND_FIELD`
/// conditions on `magic` as the original layout.
fn passthrough_record_size(tag: u8, magic: Magic) -> u32 {
    match tag {
        0x06 => {
            if magic.at_least(Magic::A172) {
                40
            } else {
                36
            }
        }
        0x08 => {
            if magic.at_least(Magic::A172) {
                32
            } else {
                24
            }
        }
        0x09 => {
            if magic.at_least(Magic::A174) {
                52
            } else if magic.at_least(Magic::A172) {
                48
            } else {
                44
            }
        }
        0x0A => {
            if magic.at_least(Magic::A174) {
                76
            } else if magic.at_least(Magic::A172) {
                72
            } else {
                68
            }
        }
        0x0C => {
            if magic.at_least(Magic::A174) {
                68
            } else if magic.at_least(Magic::A172) {
                64
            } else {
                56
            }
        }
        0x0E => {
            if magic.at_least(Magic::A172) {
                68
            } else {
                60
            }
        }
        0x20 => {
            if magic.at_least(Magic::A174) {
                80
            } else {
                40
            }
        }
        0x22 => {
            if magic.at_least(Magic::A172) {
                44
            } else {
                40
            }
        }
        0x23 => {
            if magic.at_least(Magic::A174) {
                88
            } else if magic.at_least(Magic::A164) {
                84
            } else {
                68
            }
        }
        0x26 => {
            if magic.at_least(Magic::A174) {
                28
            } else if magic.at_least(Magic::A172) {
                24
            } else {
                20
            }
        }
        0x2C => {
            if magic.at_least(Magic::A172) {
                44
            } else {
                36
            }
        }
        0x2E => {
            if magic.at_least(Magic::A172) {
                40
            } else {
                36
            }
        }
        0x2F => 32,
        0x37 => {
            if magic.at_least(Magic::A174) {
                432
            } else {
                428
            }
        }
        0x38 => {
            if magic.at_least(Magic::A174) {
                56
            } else if magic.at_least(Magic::A166) {
                52
            } else {
                64
            }
        }
        0x39 => 60,
        0x3A => {
            if magic.at_least(Magic::A174) {
                20
            } else {
                16
            }
        }
        other => unreachable!("no passthrough record size registered for tag 0x{other:02X}"),
    }
}

fn read_point(cur: &mut Cursor) -> Result<Point, BrdError> {
    let x = cur.i32()?;
    let y = cur.i32()?;
    Ok(Point { x, y })
}

/// Parses a whole `.brd` mapped file into an [`Index`].
pub fn parse(data: &[u8]) -> Result<Index, BrdError> {
    let mut cur = Cursor::new(data, 0);
    let raw_magic = cur.u32()?;
    let magic = Magic::from_raw(raw_magic)?;

    let header = decode_header(&mut cur, magic)?;
    let scale_factor = header.units.numerator() / header.unit_divisor as f64;

    cur.pos = STRING_TABLE_OFFSET;
    let mut strings = HashMap::new();
    for _ in 0..header.strings_count {
        let key = cur.u32()?;
        let start = cur.pos;
        let s = cur.c_str()?;
        let consumed = cur.pos - start;
        strings.insert(key, s);
        // c_str already advanced past the terminator; round the *whole*
        // entry (key + string + NUL) up to a word boundary.
        let total = 4 + consumed;
        let padded = round_to_word(total as u32) as usize;
        cur.pos = start + (padded - 4);
    }

    debug!(strings = strings.len(), "string table decoded");

    let mut ctx = Ctx {
        magic,
        ptrs: HashMap::new(),
        records: HashMap::new(),
        layer_sets: HashMap::new(),
        model_info: HashMap::new(),
        font_tables: HashMap::new(),
        strings: &strings,
    };

    while cur.pos < data.len() {
        let tag = match cur.peek_u8() {
            Ok(t) => t,
            Err(_) => break,
        };
        if tag == 0 {
            break;
        }
        dispatch(&mut cur, &header, &mut ctx, tag)?;
    }

    debug!(records = ctx.records.len(), "record dispatch complete");

    Ok(Index {
        header,
        strings,
        ptrs: ctx.ptrs,
        records: ctx.records,
        layer_sets: ctx.layer_sets,
        model_info: ctx.model_info,
        font_tables: ctx.font_tables,
        scale_factor,
        magic,
    })
}

fn decode_header(cur: &mut Cursor, magic: Magic) -> Result<Header, BrdError> {
    // magic already consumed by the caller.
    let units = Units::from_raw(cur.u8()?)?;
    cur.skip(3)?;
    let unit_divisor = cur.u32()?;
    let max_key = cur.u32()?;
    let strings_count = cur.u32()?;
    let x27_end_offset = cur.u32()?;
    cur.skip(60)?; // allegro_version string, not consumed by this crate

    let mut layer_sets = [0u32; 26];
    for slot in layer_sets.iter_mut() {
        *slot = cur.u32()?;
    }

    let mut read_pair = |cur: &mut Cursor| -> Result<LlPtrs, BrdError> {
        let head = cur.u32()?;
        let tail = cur.u32()?;
        Ok(LlPtrs { head, tail })
    };
    let linked_lists = LinkedLists {
        ll_x1b: read_pair(cur)?,
        ll_x0e_x28: read_pair(cur)?,
        ll_x14: read_pair(cur)?,
        ll_x2b: read_pair(cur)?,
        ll_x03_x30: read_pair(cur)?,
        ll_x24_x28: read_pair(cur)?,
    };

    Ok(Header {
        magic,
        units,
        unit_divisor,
        max_key,
        strings_count,
        x27_end_offset,
        layer_sets,
        linked_lists,
    })
}

/// The copper layer-set slot index within `header.layer_sets`.
pub const COPPER_LAYER_SET_SLOT: usize = 0;

fn dispatch(cur: &mut Cursor, header: &Header, ctx: &mut Ctx, tag: u8) -> Result<(), BrdError> {
    let magic = ctx.magic;
    match tag {
        0x01 => parse_arc(cur, ctx, magic),
        0x03 => parse_t03(cur, ctx),
        0x04 => parse_net_assignment(cur, ctx, magic),
        0x05 => parse_track(cur, ctx, magic),
        0x06 | 0x08 | 0x09 | 0x0A | 0x0C => {
            parse_generic_skip(cur, ctx, tag, passthrough_record_size(tag, magic))
        }
        0x07 => parse_instance(cur, ctx),
        0x0D => parse_pad_backing(cur, ctx),
        0x0E => parse_generic_skip(cur, ctx, tag, passthrough_record_size(tag, magic)),
        0x14 => parse_annotation(cur, ctx),
        0x15 | 0x16 | 0x17 => parse_segment(cur, ctx, tag, magic),
        0x1B => parse_net(cur, ctx, magic),
        0x1C => parse_pad_stack(cur, ctx, magic),
        0x1D => parse_1d(cur, ctx, magic),
        0x1E => parse_1e_model_info(cur, ctx, magic),
        0x1F => parse_1f(cur, ctx, magic),
        0x20 | 0x22 | 0x23 | 0x26 | 0x2C | 0x2E | 0x2F => {
            parse_generic_skip(cur, ctx, tag, passthrough_record_size(tag, magic))
        }
        0x21 => parse_21_metadata(cur, ctx),
        0x24 => parse_rectangle(cur, ctx, magic),
        0x27 => parse_27(cur, header),
        0x28 => parse_shape(cur, ctx, magic),
        0x2A => parse_2a_layer_info(cur, ctx, magic),
        0x2B => parse_footprint_def(cur, ctx),
        0x2D => parse_placed_footprint(cur, ctx),
        0x30 => parse_text_wrapper(cur, ctx),
        0x31 => parse_string_graphic(cur, ctx),
        0x32 => parse_placed_pad(cur, ctx),
        0x33 => parse_via(cur, ctx, magic),
        0x34 => parse_cutout(cur, ctx),
        0x35 => parse_generic_skip_fixed(cur, ctx, tag, 8 + 124),
        0x36 => parse_36(cur, ctx),
        0x37 | 0x38 | 0x39 | 0x3A => {
            parse_generic_skip(cur, ctx, tag, passthrough_record_size(tag, magic))
        }
        0x3B => parse_3b(cur, ctx),
        0x3C => parse_3c(cur, ctx),
        other => Err(BrdError::unknown_record(other)),
    }
}

fn parse_generic_skip(cur: &mut Cursor, ctx: &mut Ctx, tag: u8, size: u32) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    debug_assert_eq!(t, tag);
    cur.pos = start + size as usize;
    ctx.register(k, t, None);
    Ok(())
}

fn parse_generic_skip_fixed(
    cur: &mut Cursor,
    ctx: &mut Ctx,
    tag: u8,
    total_size: u32,
) -> Result<(), BrdError> {
    parse_generic_skip(cur, ctx, tag, total_size)
}

fn parse_arc(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let _t = cur.u16()?;
    cur.skip(1)?; // un0
    let subtype = cur.u8()?;
    let k = cur.u32()?;
    let next = cur.u32()?;
    cur.skip(4)?; // parent
    cur.skip(4)?; // un1, bit mask
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // un6
    }
    let width = cur.i32()?;
    let s = read_point(cur)?;
    let e = read_point(cur)?;
    let cx = cur.cadence_fp()?;
    let cy = cur.cadence_fp()?;
    let radius = cur.cadence_fp()?;
    let total = if magic.at_least(Magic::A172) { 84 } else { 80 };
    cur.pos = start + total as usize;
    ctx.register(
        k,
        0x01,
        Some(Record::Arc(Arc {
            k,
            next,
            subtype,
            start: s,
            end: e,
            center: Point {
                x: cx as i32,
                y: cy as i32,
            },
            radius,
            width,
        })),
    );
    Ok(())
}

fn parse_segment(cur: &mut Cursor, ctx: &mut Ctx, tag: u8, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let next = cur.u32()?;
    cur.skip(4)?; // parent
    cur.skip(4)?; // un3 / bitmask
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // un4 / un
    }
    let width = cur.i32()?;
    let s = read_point(cur)?;
    let e = read_point(cur)?;
    let total = if magic.at_least(Magic::A172) { 44 } else { 40 };
    cur.pos = start + total;
    ctx.register(
        k,
        t,
        Some(Record::Segment(Segment {
            k,
            t: tag,
            start: s,
            end: e,
            width,
            next,
        })),
    );
    Ok(())
}

fn parse_net(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let next = cur.u32()?;
    let net_name_ref = cur.u32()?;
    cur.skip(4)?; // un2, null
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // un4
    }
    cur.skip(4)?; // type bitmask
    let ptr1 = cur.u32()?;
    let total = if magic.at_least(Magic::A172) { 60 } else { 56 };
    cur.pos = start + total;
    ctx.register(
        k,
        t,
        Some(Record::Net(Net {
            k,
            net_name_ref,
            ptr1,
            next,
        })),
    );
    Ok(())
}

fn parse_net_assignment(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let next = cur.u32()?;
    let ptr1 = cur.u32()?;
    let ptr2 = cur.u32()?;
    let total = if magic.at_least(Magic::A174) { 24 } else { 20 };
    cur.pos = start + total;
    ctx.register(
        k,
        t,
        Some(Record::NetAssignment(NetAssignment {
            k,
            ptr1,
            ptr2,
            next,
        })),
    );
    Ok(())
}

fn parse_track(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let _t = cur.u16()?;
    let layer = read_layer_info(cur)?;
    let k = cur.u32()?;
    let ptr0 = cur.u32()?;
    cur.skip(4)?; // ptr1, ->x04
    cur.skip(8)?; // un1[2]
    cur.skip(8)?; // ptr2[2]
    cur.skip(4)?; // un2
    cur.skip(8)?; // ptr3[2]
    if magic.at_least(Magic::A172) {
        cur.skip(12)?; // un4[3]
    }
    let first_segment_ptr = cur.u32()?;
    let total = if magic.at_least(Magic::A172) { 68 } else { 56 };
    cur.pos = start + total;
    ctx.register(
        k,
        0x05,
        Some(Record::Track(Track {
            k,
            layer,
            ptr0,
            first_segment_ptr,
        })),
    );
    Ok(())
}

fn parse_via(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let _t = cur.u16()?;
    let layer = read_layer_info(cur)?;
    let k = cur.u32()?;
    let un1 = cur.u32()?;
    let net_ptr = cur.u32()?;
    cur.skip(4)?; // un2, bit field
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // un4
    }
    cur.skip(4)?; // ptr2
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // ptr7
    }
    let x = cur.i32()?;
    let y = cur.i32()?;
    let total = if magic.at_least(Magic::A172) { 80 } else { 72 };
    cur.pos = start + total;
    ctx.register(
        k,
        0x33,
        Some(Record::Via(Via {
            k,
            layer,
            coords: [x, y],
            net_ptr,
            un1,
        })),
    );
    Ok(())
}

fn read_layer_info(cur: &mut Cursor) -> Result<LayerInfo, BrdError> {
    let family = LayerFamily::from_raw(cur.u8()?);
    let ordinal = cur.u8()?;
    Ok(LayerInfo { family, ordinal })
}

fn parse_shape(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let _t = cur.u16()?;
    let layer = read_layer_info(cur)?;
    let k = cur.u32()?;
    let next = cur.u32()?;
    cur.skip(4)?; // ptr1
    cur.skip(4)?; // un2
    if magic.at_least(Magic::A172) {
        cur.skip(8)?; // un5[2]
    }
    cur.skip(4)?; // ptr2
    cur.skip(4)?; // ptr3
    let cutouts_ptr = cur.u32()?;
    let first_segment_ptr = cur.u32()?;
    cur.skip(4)?; // un3
    cur.skip(4)?; // un4
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // ptr7
    }
    cur.skip(4)?; // ptr6
    if !magic.at_least(Magic::A172) {
        cur.skip(4)?; // ptr7_16x
    }
    let total = if magic.at_least(Magic::A172) { 76 } else { 68 };
    cur.pos = start + total;
    ctx.register(
        k,
        0x28,
        Some(Record::Shape(Shape {
            k,
            layer,
            first_segment_ptr,
            cutouts_ptr,
            next,
        })),
    );
    Ok(())
}

fn parse_cutout(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let first_segment_ptr = cur.u32()?;
    let next = cur.u32()?;
    cur.pos = start + 16;
    ctx.register(
        k,
        t,
        Some(Record::Cutout {
            k,
            first_segment_ptr,
            next,
        }),
    );
    Ok(())
}

fn parse_rectangle(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let _t = cur.u16()?;
    let layer = read_layer_info(cur)?;
    let k = cur.u32()?;
    let next = cur.u32()?;
    cur.skip(4)?; // ptr1
    cur.skip(4)?; // un1
    if magic.at_least(Magic::A172) {
        cur.skip(4)?; // un2
    }
    let mut coords = [0i32; 4];
    for c in coords.iter_mut() {
        *c = cur.i32()?;
    }
    let total = if magic.at_least(Magic::A172) { 56 } else { 52 };
    cur.pos = start + total;
    ctx.register(
        k,
        0x24,
        Some(Record::Rectangle(Rectangle {
            k,
            layer,
            next,
            coords,
        })),
    );
    Ok(())
}

/// Component count for a pad stack's trailing array; see the project's
/// size-budget formula.
pub fn pad_component_count(magic: Magic, layer_count: u32) -> u32 {
    if magic.at_least(Magic::A172) {
        21 + 4 * layer_count
    } else {
        10 + 3 * layer_count
    }
}

fn parse_pad_stack(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let layer_count = cur.u32()?;
    let pad_type = PadType::from_raw(cur.u8()?);
    cur.skip(3)?;

    let count = pad_component_count(magic, layer_count);
    let entry_size: u32 = if magic.at_least(Magic::A172) { 36 } else { 28 };

    let mut components = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let entry_start = cur.pos;
        let comp_t = cur.u8()?;
        cur.skip(3)?;
        let w = cur.i32()?;
        let h = cur.i32()?;
        let x3 = cur.i32()?;
        let x4 = cur.i32()?;
        let str_ptr = cur.u32()?;
        cur.pos = entry_start + entry_size as usize;
        components.push(PadStackComponent {
            t: comp_t,
            w,
            h,
            x3,
            x4,
            str_ptr,
        });
    }

    let trailer = if magic.at_least(Magic::A172) {
        count * 40
    } else {
        count.saturating_mul(32).saturating_sub(4)
    };
    cur.skip(trailer)?;

    let _ = start;
    ctx.register(
        k,
        t,
        Some(Record::PadStack(PadStack {
            k,
            layer_count,
            pad_type,
            components,
        })),
    );
    Ok(())
}

fn parse_placed_pad(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let pad_ptr = cur.u32()?;
    let net_ptr = cur.u32()?;
    let un1 = cur.u32()?;
    cur.pos = start + 24;
    ctx.register(
        k,
        t,
        Some(Record::PlacedPad(PlacedPad {
            k,
            pad_ptr,
            net_ptr,
            un1,
        })),
    );
    Ok(())
}

fn parse_pad_backing(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let x = cur.i32()?;
    let y = cur.i32()?;
    let rotation = cur.i32()?;
    let pad_stack_ptr = cur.u32()?;
    let str_ptr = cur.u32()?;
    cur.pos = start + 32;
    ctx.register(
        k,
        t,
        Some(Record::PadBacking(PadBacking {
            k,
            coords: [x, y],
            rotation,
            pad_stack_ptr,
            str_ptr,
        })),
    );
    Ok(())
}

fn parse_footprint_def(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let name_ref = cur.u32()?;
    let first_placement_ptr = cur.u32()?;
    let next = cur.u32()?;
    cur.pos = start + 20;
    ctx.register(
        k,
        t,
        Some(Record::FootprintDef(FootprintDef {
            k,
            name_ref,
            first_placement_ptr,
            next,
        })),
    );
    Ok(())
}

fn parse_placed_footprint(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let x = cur.i32()?;
    let y = cur.i32()?;
    let rotation = cur.i32()?;
    let layer = cur.u8()?;
    cur.skip(3)?;
    let inst_ref = cur.u32()?;
    let first_pad_ptr = cur.u32()?;
    let ptr1 = cur.u32()?;
    let ptr3 = cur.u32()?;
    let ptr4a = cur.u32()?;
    let ptr4b = cur.u32()?;
    let ptr2 = cur.u32()?;
    let next = cur.u32()?;
    cur.pos = start + 56;
    ctx.register(
        k,
        t,
        Some(Record::PlacedFootprint(PlacedFootprint {
            k,
            coords: [x, y],
            rotation,
            layer,
            inst_ref,
            first_pad_ptr,
            ptr1,
            ptr3,
            ptr4: [ptr4a, ptr4b],
            ptr2,
            next,
        })),
    );
    Ok(())
}

fn parse_instance(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let refdes_string_ref = cur.u32()?;
    cur.pos = start + 12;
    ctx.register(
        k,
        t,
        Some(Record::Instance(Instance {
            k,
            refdes_string_ref,
        })),
    );
    Ok(())
}

fn parse_annotation(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let layer_ptr = cur.u32()?;
    let first_segment_ptr = cur.u32()?;
    let next = cur.u32()?;
    cur.pos = start + 24;
    ctx.register(
        k,
        t,
        Some(Record::Annotation(Annotation {
            k,
            layer_ptr,
            first_segment_ptr,
            next,
        })),
    );
    Ok(())
}

fn parse_string_graphic(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let len = cur.u32()?;
    let text = if len > 0 {
        let text_start = cur.pos;
        let s = cur.c_str()?;
        cur.pos = text_start + round_to_word(len) as usize;
        s
    } else {
        String::new()
    };
    let _ = start;
    ctx.register(
        k,
        t,
        Some(Record::StringGraphic(StringGraphic { k, len, text })),
    );
    Ok(())
}

fn parse_text_wrapper(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let start = cur.pos;
    let (t, k) = read_head(cur)?;
    let str_graphic_ptr = cur.u32()?;
    let x = cur.i32()?;
    let y = cur.i32()?;
    let rotation = cur.i32()?;
    let str_layer = cur.u16()?;
    cur.skip(2)?;
    let align_raw = cur.u8()?;
    let reversed_raw = cur.u8()?;
    let font_props_key = cur.u8()?;
    cur.skip(1)?;
    let next = cur.u32()?;
    cur.pos = start + 40;
    let align = match align_raw {
        1 => TextAlignment::Center,
        2 => TextAlignment::Right,
        _ => TextAlignment::Left,
    };
    let reversed = if reversed_raw != 0 {
        TextReversal::Reversed
    } else {
        TextReversal::Normal
    };
    ctx.register(
        k,
        t,
        Some(Record::TextWrapper(TextWrapper {
            k,
            t,
            str_graphic_ptr,
            coords: [x, y],
            rotation,
            str_layer,
            align,
            reversed,
            font_props_key,
            next,
        })),
    );
    Ok(())
}

fn parse_t03(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let subtype = cur.u8()?;
    cur.skip(3)?;
    match subtype {
        0x65 => {}
        0x64 | 0x66 | 0x67 | 0x6A => {
            cur.skip(4)?;
        }
        0x6D | 0x6E | 0x6F | 0x68 | 0x6B | 0x71 | 0x73 | 0x78 => {
            let size = cur.u32()?;
            cur.skip(round_to_word(size))?;
        }
        0x69 => {
            cur.skip(8)?;
        }
        0x6C => {
            let count = cur.u32()?;
            cur.skip(4 + 4 * count)?;
        }
        0x70 | 0x74 => {
            let x0 = cur.u16()? as u32;
            let x1 = cur.u16()? as u32;
            cur.skip(x1 + 4 * x0)?;
        }
        0xF6 => {
            cur.skip(80)?;
        }
        other => return Err(BrdError::UnknownSubtype(other)),
    }
    ctx.register(k, t, None);
    Ok(())
}

fn parse_1d(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let size_a = cur.u32()?;
    let size_b = cur.u32()?;
    let per_b = if magic.at_least(Magic::A162) { 56 } else { 48 };
    cur.skip(size_b * per_b)?;
    cur.skip(size_a * 256)?;
    if magic.at_least(Magic::A172) {
        cur.skip(4)?;
    }
    ctx.register(k, t, None);
    Ok(())
}

fn parse_1e_model_info(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let size = cur.u32()?;
    let text_start = cur.pos;
    let text = cur.c_str()?;
    cur.pos = text_start + round_to_word(size) as usize;
    if magic.at_least(Magic::A172) {
        cur.skip(4)?;
    }
    ctx.register(k, t, None);
    ctx.model_info.insert(k, ModelInfo { text });
    Ok(())
}

fn parse_1f(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let size = cur.u32()?;
    let skip = if magic.at_least(Magic::A175) {
        size * 384 + 8
    } else if magic.at_least(Magic::A172) {
        size * 280 + 8
    } else if magic.at_least(Magic::A162) {
        size * 280 + 4
    } else {
        size * 240 + 4
    };
    cur.skip(skip)?;
    ctx.register(k, t, None);
    Ok(())
}

fn parse_21_metadata(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let r = cur.u32()?;
    let size = cur.u32()?;
    match r {
        1304 => {
            // STACKUP_MATERIAL: fixed-size payload, not decoded further.
            cur.skip(64)?;
        }
        14093 => {
            cur.skip(size)?;
        }
        0x0407 => {
            cur.skip(32 + 1028)?;
        }
        _ => {
            cur.skip(size)?;
        }
    }
    ctx.register(k, t, None);
    Ok(())
}

fn parse_27(cur: &mut Cursor, header: &Header) -> Result<(), BrdError> {
    // Early-terminates the current scan block; no record is registered.
    let target = header.x27_end_offset.saturating_sub(1) as usize;
    cur.pos = target.min(cur.len());
    Ok(())
}

fn parse_2a_layer_info(cur: &mut Cursor, ctx: &mut Ctx, magic: Magic) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let count = cur.u32()?;
    if magic.at_least(Magic::A174) {
        cur.skip(4)?;
    }
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let layer = read_layer_info(cur)?;
        let name = if magic.at_least(Magic::A165) {
            let name_ref = cur.u32()?;
            ctx.strings.get(&name_ref).cloned().unwrap_or_default()
        } else {
            let raw = cur.bytes(32)?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            String::from_utf8_lossy(&raw[..end]).into_owned()
        };
        entries.push(LayerSetEntry { layer, name });
    }
    let set_key = cur.u32()?;
    ctx.register(k, t, None);
    ctx.layer_sets.insert(set_key, LayerSet { entries });
    Ok(())
}

fn parse_36(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let c = cur.u8()?;
    cur.skip(3)?;
    let size = cur.u32()?;
    match c {
        0x02 => {
            cur.skip(size * 16)?;
        }
        0x03 => {
            cur.skip(size * 20)?;
        }
        0x05 => {
            cur.skip(size * 28)?;
        }
        0x06 => {
            cur.skip(size * 24)?;
        }
        0x08 => {
            let mut metrics = Vec::with_capacity(size as usize);
            for _ in 0..size {
                let char_width = cur.i32()?;
                let char_height = cur.i32()?;
                metrics.push(FontMetrics {
                    char_width,
                    char_height,
                });
            }
            ctx.font_tables.insert(k, metrics);
        }
        0x0B => {
            cur.skip(size * 1016)?;
        }
        0x0C => {
            cur.skip(size * 232)?;
        }
        0x0D => {
            cur.skip(size * 200)?;
        }
        0x0F => {
            cur.skip(size * 12)?;
        }
        0x10 => {
            cur.skip(size * 108)?;
        }
        other => return Err(BrdError::UnknownSubtype(other)),
    }
    ctx.register(k, t, None);
    Ok(())
}

fn parse_3b(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let len = cur.u32()?;
    cur.skip(round_to_word(len))?;
    ctx.register(k, t, None);
    Ok(())
}

fn parse_3c(cur: &mut Cursor, ctx: &mut Ctx) -> Result<(), BrdError> {
    let (t, k) = read_head(cur)?;
    let size = cur.u32()?;
    cur.skip(size * 4)?;
    ctx.register(k, t, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_tag_fails_loudly() {
        let data = [0xFFu8, 0, 0, 0, 0, 0, 0, 0];
        let mut cur = Cursor::new(&data, 0);
        let header = Header {
            magic: Magic::A175,
            units: Units::Imperial,
            unit_divisor: 1000,
            max_key: 0,
            strings_count: 0,
            x27_end_offset: 0,
            layer_sets: [0; 26],
            linked_lists: LinkedLists::default(),
        };
        let mut ctx = Ctx {
            magic: Magic::A175,
            ptrs: HashMap::new(),
            records: HashMap::new(),
            layer_sets: HashMap::new(),
            model_info: HashMap::new(),
            font_tables: HashMap::new(),
            strings: &HashMap::new(),
        };
        let err = dispatch(&mut cur, &header, &mut ctx, 0xFF).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Do not have parser for t=0xFF000000 available."
        );
    }

    #[test]
    fn pad_component_count_matches_formula() {
        assert_eq!(pad_component_count(Magic::A160, 4), 22);
        assert_eq!(pad_component_count(Magic::A175, 4), 37);
    }
}
