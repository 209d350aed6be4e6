//! The neutral board model's required interface and the entity values
//! the graph builder emits into it.
//!
//! The board model itself is an external collaborator: this crate only
//! specifies, via [`BoardSink`], what it must accept. [`InMemoryBoard`] is a
//! small reference implementation used by tests and the CLI summary host.

use std::collections::HashMap;

/// A copper or named auxiliary layer on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardLayer {
    /// `0` is front copper, `count - 1` is back copper, everything else is
    /// an inner layer numbered monotonically from the front.
    Copper(u32),
    FSilkS,
    BSilkS,
    FMask,
    BMask,
    FPaste,
    BPaste,
    FCourtyard,
    BCourtyard,
    EdgeCuts,
    Eco1User,
    Eco2User,
    User(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct TrackSegment {
    pub layer: BoardLayer,
    pub net: Option<NetHandle>,
    pub start: Pos2,
    pub end: Pos2,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct ArcSegment {
    pub layer: BoardLayer,
    pub net: Option<NetHandle>,
    pub start: Pos2,
    pub end: Pos2,
    pub center: Pos2,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct ViaEntity {
    pub position: Pos2,
    pub net: Option<NetHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAttrib {
    Smd,
    Pth,
    Npth,
}

#[derive(Debug, Clone)]
pub enum PadGeometry {
    Circle { size: Pos2 },
    Rectangle { size: Pos2 },
    RoundRect { size: Pos2 },
    Custom { outline: Vec<Pos2> },
}

#[derive(Debug, Clone)]
pub struct PadEntity {
    pub layer: BoardLayer,
    pub number: String,
    pub net: Option<NetHandle>,
    pub attrib: PadAttrib,
    pub geometry: PadGeometry,
    pub offset: Pos2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub struct TextEntity {
    pub layer: BoardLayer,
    pub position: Pos2,
    pub rotation_deg: f64,
    pub mirrored: bool,
    pub alignment: TextAlignment,
    pub text: String,
    pub size: Option<Pos2>,
}

#[derive(Debug, Clone)]
pub struct ZoneEntity {
    pub layer: BoardLayer,
    pub net: Option<NetHandle>,
    pub name: Option<String>,
    pub filled: bool,
    pub outline: Vec<Pos2>,
    pub holes: Vec<Vec<Pos2>>,
}

#[derive(Debug, Clone)]
pub struct PolygonShape {
    pub layer: BoardLayer,
    pub filled: bool,
    pub outline: Vec<Pos2>,
}

#[derive(Debug, Clone)]
pub struct LineShape {
    pub layer: BoardLayer,
    pub start: Pos2,
    pub end: Pos2,
}

#[derive(Debug, Clone)]
pub struct FootprintEntity {
    pub name: String,
    pub refdes: String,
    pub position: Pos2,
    pub rotation_deg: f64,
    pub layer: BoardLayer,
    pub allegro_id: String,
    pub pads: Vec<PadEntity>,
    pub text: Vec<TextEntity>,
    pub zones: Vec<ZoneEntity>,
}

/// Everything the graph builder needs from the host's board model. A real
/// host backs this with its own document/undo-aware board object; this
/// crate never constructs one itself.
pub trait BoardSink {
    fn set_copper_layer_count(&mut self, n: u32);
    fn set_layer_name(&mut self, layer: BoardLayer, name: &str);

    fn find_net(&self, name: &str) -> Option<NetHandle>;
    fn new_net(&mut self, name: &str) -> NetHandle;
    fn net_count(&self) -> usize;

    fn add_track(&mut self, seg: TrackSegment);
    fn add_arc(&mut self, arc: ArcSegment);
    fn add_via(&mut self, via: ViaEntity);
    fn add_zone(&mut self, zone: ZoneEntity);
    fn add_polygon(&mut self, shape: PolygonShape);
    fn add_line(&mut self, line: LineShape);
    fn add_text(&mut self, text: TextEntity);
    fn add_footprint(&mut self, footprint: FootprintEntity);
}

/// Reference [`BoardSink`] that just records everything it's given. Used by
/// this crate's own tests and by the CLI `inspect` subcommand.
#[derive(Debug, Default)]
pub struct InMemoryBoard {
    pub copper_layer_count: u32,
    pub layer_names: HashMap<BoardLayer, String>,
    nets_by_name: HashMap<String, NetHandle>,
    pub net_names: Vec<String>,
    pub tracks: Vec<TrackSegment>,
    pub arcs: Vec<ArcSegment>,
    pub vias: Vec<ViaEntity>,
    pub zones: Vec<ZoneEntity>,
    pub polygons: Vec<PolygonShape>,
    pub lines: Vec<LineShape>,
    pub text: Vec<TextEntity>,
    pub footprints: Vec<FootprintEntity>,
}

impl BoardSink for InMemoryBoard {
    fn set_copper_layer_count(&mut self, n: u32) {
        self.copper_layer_count = n;
    }

    fn set_layer_name(&mut self, layer: BoardLayer, name: &str) {
        self.layer_names.insert(layer, name.to_owned());
    }

    fn find_net(&self, name: &str) -> Option<NetHandle> {
        self.nets_by_name.get(name).copied()
    }

    fn new_net(&mut self, name: &str) -> NetHandle {
        if let Some(existing) = self.nets_by_name.get(name) {
            return *existing;
        }
        let handle = NetHandle(self.net_names.len() as u32);
        self.net_names.push(name.to_owned());
        self.nets_by_name.insert(name.to_owned(), handle);
        handle
    }

    fn net_count(&self) -> usize {
        self.net_names.len()
    }

    fn add_track(&mut self, seg: TrackSegment) {
        self.tracks.push(seg);
    }

    fn add_arc(&mut self, arc: ArcSegment) {
        self.arcs.push(arc);
    }

    fn add_via(&mut self, via: ViaEntity) {
        self.vias.push(via);
    }

    fn add_zone(&mut self, zone: ZoneEntity) {
        self.zones.push(zone);
    }

    fn add_polygon(&mut self, shape: PolygonShape) {
        self.polygons.push(shape);
    }

    fn add_line(&mut self, line: LineShape) {
        self.lines.push(line);
    }

    fn add_text(&mut self, text: TextEntity) {
        self.text.push(text);
    }

    fn add_footprint(&mut self, footprint: FootprintEntity) {
        self.footprints.push(footprint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_net_is_idempotent_by_name() {
        let mut board = InMemoryBoard::default();
        let a = board.new_net("GND");
        let b = board.new_net("GND");
        assert_eq!(a, b);
        assert_eq!(board.net_count(), 1);
    }

    #[test]
    fn find_net_before_creation_is_none() {
        let board = InMemoryBoard::default();
        assert_eq!(board.find_net("GND"), None);
    }
}
