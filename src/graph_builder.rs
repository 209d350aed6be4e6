//! Traverses the key-indexed record graph built by [`crate::parser`] and
//! emits board entities into a [`BoardSink`], in a strict 8-step order:
//! layer info must precede any geometry emission.

use tracing::warn;

use crate::board::*;
use crate::parser::{Index, Record};
use crate::types::{LayerFamily, PadShape, Point};

const MISSING_PAD_NUMBER: &str = "MISSING";

fn scale(idx: &Index, v: i32) -> f64 {
    v as f64 * idx.scale_factor
}

/// File coordinates to model coordinates: Y is negated because the file's
/// +Y is screen-down and the model's +Y is up.
fn pos(idx: &Index, p: Point) -> Pos2 {
    Pos2 {
        x: scale(idx, p.x),
        y: -scale(idx, p.y),
    }
}

fn pos_xy(idx: &Index, x: i32, y: i32) -> Pos2 {
    pos(idx, Point { x, y })
}

/// Maps a file layer ordinal within the copper set to a monotonically
/// increasing copper layer id: `0` is front, `count - 1` is back.
fn etch_layer(ordinal: u8, count: u32) -> BoardLayer {
    BoardLayer::Copper((ordinal as u32).min(count.saturating_sub(1)))
}

/// The silk-family ordinal → board layer table used for rectangles and any
/// other generic silk-layer lookup (distinct from the richer per-ordinal
/// override table zone emission uses, [`zone_silk_target`]).
fn lookup_pcb_layer(ordinal: u8) -> BoardLayer {
    match ordinal {
        0xF1 => BoardLayer::FSilkS,
        0xF3 => BoardLayer::BPaste,
        0xF4 => BoardLayer::FPaste,
        0xF6 => BoardLayer::BSilkS,
        0xF7 => BoardLayer::FSilkS,
        0xFA => BoardLayer::BCourtyard,
        0xFB => BoardLayer::FCourtyard,
        0xFD => BoardLayer::FSilkS,
        _ => BoardLayer::User(3),
    }
}

/// Per-ordinal target layer and fill flag for silk-family zone emission.
fn zone_silk_target(ordinal: u8) -> (BoardLayer, bool) {
    match ordinal {
        0xEC => (BoardLayer::BMask, true),
        0xED => (BoardLayer::FMask, true),
        0xF6 => (BoardLayer::FSilkS, false),
        0xF7 => (BoardLayer::User(6), true),
        0xEE => (BoardLayer::User(7), false),
        0xEF => (BoardLayer::User(8), false),
        0x02 => (BoardLayer::Eco1User, false),
        0x00 => (BoardLayer::Eco2User, false),
        _ => (BoardLayer::User(3), true),
    }
}

/// Walks a `T01`/`T15`/`T16`/`T17` chain starting at `key` into a closed
/// polyline. Idempotent: depends only on the (immutable) record index.
fn shape_starting_at(idx: &Index, key: u32) -> Vec<Pos2> {
    let mut points = Vec::new();
    let mut cur = key;
    let mut first = true;
    while cur != 0 {
        match idx.record(cur) {
            Some(Record::Arc(a)) => {
                if first {
                    points.push(pos(idx, a.start));
                }
                points.push(pos(idx, a.end));
                cur = a.next;
            }
            Some(Record::Segment(s)) => {
                if first {
                    points.push(pos(idx, s.start));
                }
                points.push(pos(idx, s.end));
                cur = s.next;
            }
            _ => break,
        }
        first = false;
    }
    points
}

/// Resolves a net's display name via its `T1B` record, creating the net on
/// the board the first time it is seen.
fn net_info<S: BoardSink>(idx: &Index, board: &mut S, net_key: u32) -> Option<NetHandle> {
    if net_key == 0 {
        return None;
    }
    match idx.record(net_key) {
        Some(Record::Net(net)) => {
            let name = idx
                .strings
                .get(&net.net_name_ref)
                .cloned()
                .unwrap_or_default();
            if name.is_empty() {
                None
            } else {
                Some(board.new_net(&name))
            }
        }
        _ => None,
    }
}

fn net_info_from_assignment<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    assignment: &crate::types::NetAssignment,
) -> Option<NetHandle> {
    net_info(idx, board, assignment.ptr1)
}

/// Public entry point: builds board entities from a parsed [`Index`].
pub fn build<S: BoardSink>(idx: &Index, board: &mut S) {
    let copper_count = resolve_layers(idx, board);

    walk_nets(idx, board, copper_count);
    walk_free_zones(idx, board, idx.header.linked_lists.ll_x0e_x28.head);
    walk_free_annotations(idx, board);
    walk_footprints(idx, board, copper_count);
    walk_free_text(idx, board, idx.header.linked_lists.ll_x03_x30.head);
    walk_free_rects_and_zones(idx, board, idx.header.linked_lists.ll_x24_x28.head);
}

/// Step 1/2: layer resolution and the copper-set name assignment. Returns
/// the copper layer count so callers can resolve per-record etch layers.
fn resolve_layers<S: BoardSink>(idx: &Index, board: &mut S) -> u32 {
    let copper_set_key = idx.header.layer_sets[crate::parser::COPPER_LAYER_SET_SLOT];
    let Some(set) = idx.layer_sets.get(&copper_set_key) else {
        return 0;
    };
    let count = set.entries.len() as u32;
    board.set_copper_layer_count(count);
    for entry in &set.entries {
        let layer = etch_layer(entry.layer.ordinal, count);
        board.set_layer_name(layer, &entry.name);
    }
    count
}

/// Step 3: nets and the geometry reachable from each net's assignment ring.
fn walk_nets<S: BoardSink>(idx: &Index, board: &mut S, copper_count: u32) {
    let ll = idx.header.linked_lists.ll_x1b;
    let mut net_key = ll.head;
    while net_key != 0 && net_key != ll.tail {
        let Some(Record::Net(net)) = idx.record(net_key) else {
            break;
        };
        let first_assignment = net.ptr1;
        let next_net = net.next;

        if first_assignment != 0 {
            walk_net_assignments(idx, board, first_assignment, net.k, copper_count);
        }

        net_key = next_net;
    }
}

/// Walks a net's assignment ring. The ring terminates when an assignment's
/// `next` loops back to the owning net's own key, not when it hits zero or
/// repeats its own key (malformed-file guards, kept as a backstop).
fn walk_net_assignments<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    start: u32,
    owner_net_key: u32,
    copper_count: u32,
) {
    let mut assignment_key = start;
    loop {
        let Some(Record::NetAssignment(assignment)) = idx.record(assignment_key) else {
            break;
        };
        let net = net_info_from_assignment(idx, board, assignment);

        walk_assignment_geometry(idx, board, assignment.ptr2, net, copper_count);

        let next = assignment.next;
        if next == 0 || next == owner_net_key || next == assignment_key {
            break;
        }
        assignment_key = next;
    }
}

fn walk_assignment_geometry<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    start: u32,
    net: Option<NetHandle>,
    copper_count: u32,
) {
    let mut key = start;
    loop {
        if key == 0 {
            break;
        }
        match idx.record(key) {
            Some(Record::Via(via)) => {
                board.add_via(ViaEntity {
                    position: pos_xy(idx, via.coords[0], via.coords[1]),
                    net,
                });
                key = via.un1;
            }
            Some(Record::PlacedPad(pad)) => {
                key = pad.un1;
            }
            Some(Record::Shape(shape)) => {
                emit_zone(idx, board, shape, net);
                key = shape.next;
            }
            Some(Record::Track(track)) => {
                emit_track(idx, board, track, net, copper_count);
                key = track.ptr0;
            }
            Some(Record::Cutout {
                first_segment_ptr: _,
                next,
                ..
            }) => {
                key = *next;
            }
            Some(Record::NetAssignment(_)) | Some(Record::Net(_)) => break,
            _ => break,
        }
    }
}

fn emit_track<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    track: &crate::types::Track,
    net: Option<NetHandle>,
    copper_count: u32,
) {
    let layer = etch_layer(track.layer.ordinal, copper_count);
    let mut seg_key = track.first_segment_ptr;
    while seg_key != 0 {
        match idx.record(seg_key) {
            Some(Record::Arc(a)) => {
                board.add_arc(ArcSegment {
                    layer,
                    net,
                    start: pos(idx, a.start),
                    end: pos(idx, a.end),
                    center: pos(idx, a.center),
                    width: scale(idx, a.width),
                });
                seg_key = a.next;
            }
            Some(Record::Segment(s)) => {
                board.add_track(TrackSegment {
                    layer,
                    net,
                    start: pos(idx, s.start),
                    end: pos(idx, s.end),
                    width: scale(idx, s.width),
                });
                seg_key = s.next;
            }
            _ => break,
        }
    }
}

fn emit_zone<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    shape: &crate::types::Shape,
    net: Option<NetHandle>,
) {
    match shape.layer.family {
        LayerFamily::Copper => {
            let outline = shape_starting_at(idx, shape.first_segment_ptr);
            let holes = collect_cutouts(idx, shape.cutouts_ptr);
            board.add_zone(ZoneEntity {
                layer: BoardLayer::Copper(shape.layer.ordinal as u32),
                net,
                name: Some(format!("x28: 0x{:08X}", shape.k)),
                filled: true,
                outline,
                holes,
            });
        }
        LayerFamily::BoardGeometry if shape.layer.ordinal == 0xFD => {
            board.add_polygon(PolygonShape {
                layer: BoardLayer::EdgeCuts,
                filled: false,
                outline: shape_starting_at(idx, shape.first_segment_ptr),
            });
        }
        LayerFamily::Silk => {
            let (layer, filled) = zone_silk_target(shape.layer.ordinal);
            board.add_polygon(PolygonShape {
                layer,
                filled,
                outline: shape_starting_at(idx, shape.first_segment_ptr),
            });
        }
        _ => {}
    }
}

fn collect_cutouts(idx: &Index, start: u32) -> Vec<Vec<Pos2>> {
    let mut holes = Vec::new();
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::Cutout {
                first_segment_ptr,
                next,
                ..
            }) => {
                let chain = shape_starting_at(idx, *first_segment_ptr);
                if chain.len() >= 3 {
                    holes.push(chain);
                }
                key = *next;
            }
            _ => break,
        }
    }
    holes
}

/// Step 4: zones not attached to any net.
fn walk_free_zones<S: BoardSink>(idx: &Index, board: &mut S, start: u32) {
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::Shape(shape)) => {
                emit_zone(idx, board, shape, None);
                key = shape.next;
            }
            Some(Record::Cutout { next, .. }) => {
                key = *next;
            }
            _ => break,
        }
    }
}

/// Step 5: annotations not attached to a footprint.
fn walk_free_annotations<S: BoardSink>(idx: &Index, board: &mut S) {
    let mut key = idx.header.linked_lists.ll_x14.head;
    let tail = idx.header.linked_lists.ll_x14.tail;
    while key != 0 && key != tail {
        match idx.record(key) {
            Some(Record::Annotation(ann)) => {
                emit_annotation(idx, board, ann);
                key = ann.next;
            }
            _ => break,
        }
    }
}

/// Walks an annotation chain, emitting each segment/arc as its own linear
/// shape rather than a single closed polyline (distinct from
/// `shape_starting_at`, used for zone/track outlines).
fn emit_annotation<S: BoardSink>(idx: &Index, board: &mut S, ann: &crate::types::Annotation) {
    let layer = BoardLayer::User(2);
    let mut key = ann.first_segment_ptr;
    while key != 0 {
        match idx.record(key) {
            Some(Record::Arc(a)) => {
                board.add_arc(ArcSegment {
                    layer,
                    net: None,
                    start: pos(idx, a.start),
                    end: pos(idx, a.end),
                    center: pos(idx, a.center),
                    width: scale(idx, a.width),
                });
                key = a.next;
            }
            Some(Record::Segment(s)) => {
                board.add_line(LineShape {
                    layer,
                    start: pos(idx, s.start),
                    end: pos(idx, s.end),
                });
                key = s.next;
            }
            _ => break,
        }
    }
}

/// Step 6: footprints and everything chained off a placement.
fn walk_footprints<S: BoardSink>(idx: &Index, board: &mut S, copper_count: u32) {
    let mut key = idx.header.linked_lists.ll_x2b.head;
    while key != 0 {
        let Some(Record::FootprintDef(def)) = idx.record(key) else {
            break;
        };
        let name = idx.strings.get(&def.name_ref).cloned().unwrap_or_default();
        let first_placement_ptr = def.first_placement_ptr;
        let next = def.next;
        walk_placements(idx, board, first_placement_ptr, &name, copper_count);
        key = next;
    }
}

fn walk_placements<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    start: u32,
    footprint_name: &str,
    copper_count: u32,
) {
    let mut key = start;
    while key != 0 {
        let Some(Record::PlacedFootprint(p)) = idx.record(key) else {
            break;
        };

        let refdes = resolve_refdes(idx, p.inst_ref).unwrap_or_else(|| "A0".to_owned());
        let front = p.layer == 0;
        let position = pos_xy(idx, p.coords[0], p.coords[1]);
        let rotation_deg = (if front { 1.0 } else { -1.0 }) * (p.rotation as f64) / 1000.0;

        let mut pads = Vec::new();
        walk_pads(idx, board, p.first_pad_ptr, &mut pads);

        let mut text = Vec::new();
        walk_footprint_text(idx, p.ptr3, &mut text);

        let mut zones = Vec::new();
        walk_footprint_zones(idx, p.ptr4[1], &mut zones);

        board.add_footprint(FootprintEntity {
            name: footprint_name.to_owned(),
            refdes,
            position,
            rotation_deg,
            layer: if front {
                BoardLayer::Copper(0)
            } else {
                BoardLayer::Copper(copper_count.saturating_sub(1))
            },
            allegro_id: format!("{:08X}", p.k),
            pads,
            text,
            zones,
        });

        if p.ptr1 != 0 {
            walk_footprint_annotations(idx, board, p.ptr1);
        }

        key = p.next;
    }
}

fn resolve_refdes(idx: &Index, inst_ref: u32) -> Option<String> {
    if inst_ref == 0 {
        return None;
    }
    match idx.record(inst_ref) {
        Some(Record::Instance(inst)) => idx.strings.get(&inst.refdes_string_ref).cloned(),
        _ => None,
    }
}

fn walk_footprint_annotations<S: BoardSink>(idx: &Index, board: &mut S, start: u32) {
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::Annotation(ann)) => {
                emit_annotation(idx, board, ann);
                key = ann.next;
            }
            _ => break,
        }
    }
}

fn walk_footprint_text<S: BoardSink>(idx: &Index, start: u32, out: &mut Vec<TextEntity>) {
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::TextWrapper(w)) => {
                if let Some(entity) = build_text_entity(idx, w) {
                    out.push(entity);
                }
                key = w.next;
            }
            _ => break,
        }
    }
}

fn build_text_entity(idx: &Index, w: &crate::types::TextWrapper) -> Option<TextEntity> {
    let graphic = match idx.record(w.str_graphic_ptr) {
        Some(Record::StringGraphic(g)) => g,
        _ => return None,
    };
    if graphic.text.is_empty() {
        return None;
    }

    let layer = match w.str_layer {
        0xF001 | 0xF002 => BoardLayer::FSilkS, // TOP_TEXT / TOP_REFDES
        0xF003 => BoardLayer::FSilkS,          // TOP_PIN
        0xF004 | 0xF005 => BoardLayer::BSilkS, // BOT_TEXT / BOT_REFDES
        0xF006 => BoardLayer::BSilkS,          // BOT_PIN
        0xF007 => BoardLayer::User(5),         // TOP_PIN_LABEL
        _ => BoardLayer::User(2),
    };

    let size = match idx.font_tables.get(&(w.font_props_key as u32)) {
        Some(metrics) if w.font_props_key > 0 => metrics
            .get((w.font_props_key - 1) as usize)
            .map(|m| Pos2 {
                x: scale(idx, m.char_width),
                y: scale(idx, m.char_height),
            }),
        _ => {
            warn!(key = w.font_props_key, "unresolvable font, using default size");
            None
        }
    };

    Some(TextEntity {
        layer,
        position: pos_xy(idx, w.coords[0], w.coords[1]),
        rotation_deg: w.rotation as f64 / 1000.0,
        mirrored: w.reversed == crate::types::TextReversal::Reversed,
        alignment: match w.align {
            crate::types::TextAlignment::Left => TextAlignment::Left,
            crate::types::TextAlignment::Center => TextAlignment::Center,
            crate::types::TextAlignment::Right => TextAlignment::Right,
        },
        text: graphic.text.clone(),
        size,
    })
}

fn walk_footprint_zones<S: BoardSink>(idx: &Index, start: u32, out: &mut Vec<ZoneEntity>) {
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::Shape(shape)) => {
                let (layer, filled, outline, holes) = match shape.layer.family {
                    LayerFamily::Copper => (
                        BoardLayer::Copper(shape.layer.ordinal as u32),
                        true,
                        shape_starting_at(idx, shape.first_segment_ptr),
                        collect_cutouts(idx, shape.cutouts_ptr),
                    ),
                    LayerFamily::Silk => {
                        let (layer, filled) = zone_silk_target(shape.layer.ordinal);
                        (
                            layer,
                            filled,
                            shape_starting_at(idx, shape.first_segment_ptr),
                            Vec::new(),
                        )
                    }
                    _ => {
                        key = shape.next;
                        continue;
                    }
                };
                out.push(ZoneEntity {
                    layer,
                    net: None,
                    name: Some(format!("x28: 0x{:08X}", shape.k)),
                    filled,
                    outline,
                    holes,
                });
                key = shape.next;
            }
            Some(Record::Cutout { next, .. }) => {
                key = *next;
            }
            _ => break,
        }
    }
}

fn walk_pads<S: BoardSink>(idx: &Index, board: &mut S, start: u32, out: &mut Vec<PadEntity>) {
    let mut key = start;
    while key != 0 {
        let Some(Record::PlacedPad(placed)) = idx.record(key) else {
            break;
        };
        if let Some(entity) = build_pad(idx, board, placed) {
            out.extend(entity);
        }
        key = placed.un1;
    }
}

fn build_pad<S: BoardSink>(
    idx: &Index,
    board: &mut S,
    placed: &crate::types::PlacedPad,
) -> Option<Vec<PadEntity>> {
    let backing = match idx.record(placed.pad_ptr) {
        Some(Record::PadBacking(b)) => b,
        _ => return None,
    };
    let pad_stack = match idx.record(backing.pad_stack_ptr) {
        Some(Record::PadStack(ps)) => ps,
        _ => return None,
    };

    let net = match idx.record(placed.net_ptr) {
        Some(Record::NetAssignment(assignment)) => net_info_from_assignment(idx, board, assignment),
        _ => None,
    };

    let number = idx
        .strings
        .get(&backing.str_ptr)
        .cloned()
        .unwrap_or_else(|| {
            warn!("pad number string could not be resolved");
            MISSING_PAD_NUMBER.to_owned()
        });

    let magic = idx.magic;
    let primary_index = if magic.at_least(crate::types::Magic::A172) {
        23
    } else {
        12
    };
    let mask_index = if magic.at_least(crate::types::Magic::A172) {
        14
    } else {
        0
    };
    let paste_index = if magic.at_least(crate::types::Magic::A172) {
        16
    } else {
        5
    };

    let attrib = match pad_stack.pad_type {
        crate::types::PadType::SmtPin | crate::types::PadType::SmtPin2 => PadAttrib::Smd,
        crate::types::PadType::ThroughVia | crate::types::PadType::Slot => PadAttrib::Pth,
        crate::types::PadType::NonPlatedHole => PadAttrib::Npth,
        crate::types::PadType::Unknown(t) => {
            warn!(pad_type = t, "unrecognized pad type, defaulting to through-hole");
            PadAttrib::Pth
        }
        crate::types::PadType::Via => PadAttrib::Pth,
    };

    let mut pads = Vec::new();
    if let Some(comp) = pad_stack.components.get(primary_index) {
        if comp.t != 0 {
            pads.push(pad_component_to_entity(
                idx,
                comp,
                BoardLayer::Copper(0),
                attrib,
                &number,
                net,
            ));
        }
    }
    if let Some(comp) = pad_stack.components.get(mask_index) {
        if comp.t != 0 {
            pads.push(pad_component_to_entity(
                idx,
                comp,
                BoardLayer::FMask,
                attrib,
                &number,
                net,
            ));
        }
    }
    if let Some(comp) = pad_stack.components.get(paste_index) {
        if comp.t != 0 {
            pads.push(pad_component_to_entity(
                idx,
                comp,
                BoardLayer::FPaste,
                attrib,
                &number,
                net,
            ));
        }
    }

    Some(pads)
}

fn pad_component_to_entity(
    idx: &Index,
    comp: &crate::types::PadStackComponent,
    layer: BoardLayer,
    attrib: PadAttrib,
    number: &str,
    net: Option<NetHandle>,
) -> PadEntity {
    let geometry = match PadShape::from_raw(comp.t) {
        Some(PadShape::Circle) => PadGeometry::Circle {
            size: Pos2 {
                x: scale(idx, comp.w),
                y: scale(idx, comp.h),
            },
        },
        Some(PadShape::Rectangle) => PadGeometry::Rectangle {
            size: Pos2 {
                x: scale(idx, comp.w),
                y: scale(idx, comp.h),
            },
        },
        Some(PadShape::RoundRect) => PadGeometry::RoundRect {
            size: Pos2 {
                x: scale(idx, comp.w),
                y: scale(idx, comp.h),
            },
        },
        Some(PadShape::Custom) => {
            let outline = match idx.record(comp.str_ptr) {
                Some(Record::Shape(shape)) => shape_starting_at(idx, shape.first_segment_ptr),
                _ => Vec::new(),
            };
            PadGeometry::Custom { outline }
        }
        None => {
            warn!(tag = comp.t, "unrecognized pad component shape");
            PadGeometry::Rectangle {
                size: Pos2 {
                    x: scale(idx, comp.w),
                    y: scale(idx, comp.h),
                },
            }
        }
    };

    PadEntity {
        layer,
        number: number.to_owned(),
        net,
        attrib,
        geometry,
        offset: Pos2 {
            x: scale(idx, comp.x3),
            y: -scale(idx, comp.x4),
        },
    }
}

/// Step 7: text not attached to a footprint.
fn walk_free_text<S: BoardSink>(idx: &Index, board: &mut S, start: u32) {
    let mut key = start;
    while key != 0 {
        match idx.record(key) {
            Some(Record::TextWrapper(w)) => {
                if let Some(entity) = build_text_entity(idx, w) {
                    board.add_text(entity);
                }
                key = w.next;
            }
            // T03 entries are interleaved structural records in this chain
            // and are skipped (see the parser's passthrough table).
            None if idx.is_type(key, 0x03) => break,
            _ => break,
        }
    }
}

/// Step 8: rectangles and zones not attached to a footprint or net.
fn walk_free_rects_and_zones<S: BoardSink>(idx: &Index, board: &mut S, start: u32) {
    let mut key = start;
    while key != 0 {
        if idx.is_type(key, 0x24) {
            if let Some(Record::Rectangle(rect)) = idx.record(key) {
                let layer = lookup_pcb_layer(rect.layer.ordinal);
                let outline = vec![
                    pos_xy(idx, rect.coords[0], rect.coords[1]),
                    pos_xy(idx, rect.coords[2], rect.coords[1]),
                    pos_xy(idx, rect.coords[2], rect.coords[3]),
                    pos_xy(idx, rect.coords[0], rect.coords[3]),
                ];
                board.add_polygon(PolygonShape {
                    layer,
                    filled: false,
                    outline,
                });
            }
            break;
        } else if idx.is_type(key, 0x28) {
            if let Some(Record::Shape(shape)) = idx.record(key) {
                emit_zone(idx, board, shape, None);
                key = shape.next;
                continue;
            }
            break;
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::HashMap;

    fn test_index() -> Index {
        Index {
            header: Header {
                magic: Magic::A175,
                units: Units::Metric,
                unit_divisor: 1000,
                max_key: 10,
                strings_count: 0,
                x27_end_offset: 0,
                layer_sets: [0; 26],
                linked_lists: LinkedLists::default(),
            },
            strings: HashMap::new(),
            ptrs: HashMap::new(),
            records: HashMap::new(),
            layer_sets: HashMap::new(),
            model_info: HashMap::new(),
            font_tables: HashMap::new(),
            scale_factor: 1_000_000.0 / 1000.0,
            magic: Magic::A175,
        }
    }

    #[test]
    fn y_negation_is_uniform() {
        let idx = test_index();
        let p = pos_xy(&idx, 10, 20);
        let mirrored = pos_xy(&idx, 10, -20);
        assert_eq!(p.x, mirrored.x);
        assert_eq!(p.y, -mirrored.y);
    }

    #[test]
    fn shape_starting_at_is_idempotent() {
        let mut idx = test_index();
        idx.records.insert(
            1,
            Record::Segment(Segment {
                k: 1,
                t: 0x15,
                start: Point { x: 0, y: 0 },
                end: Point { x: 10, y: 0 },
                width: 1,
                next: 2,
            }),
        );
        idx.records.insert(
            2,
            Record::Segment(Segment {
                k: 2,
                t: 0x15,
                start: Point { x: 10, y: 0 },
                end: Point { x: 10, y: 10 },
                width: 1,
                next: 0,
            }),
        );
        let a = shape_starting_at(&idx, 1);
        let b = shape_starting_at(&idx, 1);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn etch_layer_front_and_back() {
        assert_eq!(etch_layer(0, 4), BoardLayer::Copper(0));
        assert_eq!(etch_layer(3, 4), BoardLayer::Copper(3));
    }

    #[test]
    fn arc_radius_consistency() {
        // start and end equidistant from center within one internal unit.
        let idx = test_index();
        let center = Point { x: 0, y: 0 };
        let start = Point { x: 10, y: 0 };
        let end = Point { x: 0, y: 10 };
        let r1 = ((scale(&idx, start.x) - scale(&idx, center.x)).powi(2)
            + (scale(&idx, start.y) - scale(&idx, center.y)).powi(2))
        .sqrt();
        let r2 = ((scale(&idx, end.x) - scale(&idx, center.x)).powi(2)
            + (scale(&idx, end.y) - scale(&idx, center.y)).powi(2))
        .sqrt();
        assert!((r1 - r2).abs() < idx.scale_factor);
    }
}
