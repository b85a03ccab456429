//! C3: MVT writer primitives. Builds Mapbox Vector Tile v2.1 bytes directly
//! into `Vec<u8>` scratch buffers rather than through a generated protobuf
//! type, since the tag/varint/zigzag framing is core logic here and must be
//! bit-reproducible. Each submessage is built in its own scratch buffer so
//! its length is known before the length-delimited prefix is written.

use crate::coord::{TileLine, TilePoint};
use crate::mvt::varint::{write_varint, zigzag_encode};

fn write_tag(buf: &mut Vec<u8>, field: u32, wire_type: u8) {
    write_varint(buf, (u64::from(field) << 3) | u64::from(wire_type));
}

fn write_varint_field(buf: &mut Vec<u8>, field: u32, value: u64) {
    write_tag(buf, field, 0);
    write_varint(buf, value);
}

fn write_string_field(buf: &mut Vec<u8>, field: u32, s: &str) {
    write_tag(buf, field, 2);
    write_varint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn write_length_delimited(buf: &mut Vec<u8>, field: u32, payload: &[u8]) {
    write_tag(buf, field, 2);
    write_varint(buf, payload.len() as u64);
    buf.extend_from_slice(payload);
}

fn write_packed_u32_field(buf: &mut Vec<u8>, field: u32, values: &[u32]) {
    let mut payload = Vec::with_capacity(values.len() * 2);
    for v in values {
        write_varint(&mut payload, u64::from(*v));
    }
    write_length_delimited(buf, field, &payload);
}

/// Feature geometry type, per the MVT spec's `GeomType` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomType {
    Point = 1,
    Line = 2,
}

/// Command header `(count << 3) | cmd`.
fn command_integer(cmd: u32, count: u32) -> u32 {
    (count << 3) | cmd
}

const MOVE_TO: u32 = 1;
const LINE_TO: u32 = 2;

/// Encodes a clipped line (>= 2 points) as packed geometry commands: an
/// absolute `MoveTo` to the first point, then a `LineTo` run of
/// cursor-relative zig-zag deltas to the rest.
#[must_use]
pub fn encode_linestring(line: &TileLine) -> Vec<u32> {
    assert!(line.len() >= 2, "a line feature's geometry must have >= 2 points");

    let mut cmds = Vec::with_capacity(2 + (line.len() - 1) * 2 + 2);
    let mut cursor = (0i32, 0i32);

    cmds.push(command_integer(MOVE_TO, 1));
    cmds.push(zigzag_encode(line[0].x - cursor.0));
    cmds.push(zigzag_encode(line[0].y - cursor.1));
    cursor = (line[0].x, line[0].y);

    cmds.push(command_integer(
        LINE_TO,
        u32::try_from(line.len() - 1).expect("clipped line segment count fits u32"),
    ));
    for p in &line[1..] {
        cmds.push(zigzag_encode(p.x - cursor.0));
        cmds.push(zigzag_encode(p.y - cursor.1));
        cursor = (p.x, p.y);
    }

    cmds
}

/// Encodes a single point as one absolute `MoveTo`.
#[must_use]
pub fn encode_point(p: TilePoint) -> Vec<u32> {
    vec![command_integer(MOVE_TO, 1), zigzag_encode(p.x), zigzag_encode(p.y)]
}

/// Builds one `Feature` message: id, packed tag pairs, geometry type, and
/// packed geometry commands.
#[must_use]
pub fn build_feature(id: u64, tags: &[u32], geom_type: GeomType, geometry: &[u32]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_varint_field(&mut buf, 1, id);
    write_packed_u32_field(&mut buf, 2, tags);
    write_varint_field(&mut buf, 3, geom_type as u64);
    write_packed_u32_field(&mut buf, 4, geometry);
    buf
}

#[must_use]
pub fn value_string(s: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    write_string_field(&mut buf, 1, s);
    buf
}

#[must_use]
pub fn value_double(v: f64) -> Vec<u8> {
    let mut buf = Vec::new();
    write_tag(&mut buf, 3, 1); // wire type 1 = 64-bit
    buf.extend_from_slice(&v.to_le_bytes());
    buf
}

#[must_use]
pub fn value_uint(v: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    write_varint_field(&mut buf, 5, v);
    buf
}

#[must_use]
pub fn value_bool(v: bool) -> Vec<u8> {
    let mut buf = Vec::new();
    write_varint_field(&mut buf, 7, u64::from(v));
    buf
}

/// Accumulates one layer's bytes: header fields first, then features as
/// they're produced, then keys/values once pass 2 finishes interning.
pub struct LayerWriter {
    buf: Vec<u8>,
    next_feature_id: u64,
}

impl LayerWriter {
    #[must_use]
    pub fn new(name: &str, extent: u32) -> Self {
        let mut buf = Vec::new();
        write_varint_field(&mut buf, 15, 2); // version = 2
        write_string_field(&mut buf, 1, name);
        write_varint_field(&mut buf, 5, u64::from(extent));
        Self {
            buf,
            next_feature_id: 1,
        }
    }

    /// Returns the next 1-based, strictly increasing feature id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_feature_id;
        self.next_feature_id += 1;
        id
    }

    pub fn add_feature(&mut self, feature_bytes: &[u8]) {
        write_length_delimited(&mut self.buf, 2, feature_bytes);
    }

    pub fn add_key(&mut self, key: &str) {
        write_string_field(&mut self.buf, 3, key);
    }

    pub fn add_value(&mut self, value_bytes: &[u8]) {
        write_length_delimited(&mut self.buf, 4, value_bytes);
    }

    /// Whether any feature has been added yet; used by the assembler to
    /// decide whether a layer may be omitted entirely for an empty tile.
    #[must_use]
    pub fn feature_count(&self) -> u64 {
        self.next_feature_id - 1
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Accumulates the top-level `Tile` message's layers.
#[derive(Default)]
pub struct TileWriter {
    buf: Vec<u8>,
}

impl TileWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: LayerWriter) {
        let bytes = layer.into_bytes();
        write_length_delimited(&mut self.buf, 3, &bytes);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TilePoint;

    #[test]
    fn linestring_first_move_is_absolute_from_origin() {
        let line = vec![TilePoint { x: 10, y: 20 }, TilePoint { x: 15, y: 20 }];
        let cmds = encode_linestring(&line);
        assert_eq!(cmds[0], command_integer(MOVE_TO, 1));
        assert_eq!(cmds[1], zigzag_encode(10));
        assert_eq!(cmds[2], zigzag_encode(20));
        assert_eq!(cmds[3], command_integer(LINE_TO, 1));
        assert_eq!(cmds[4], zigzag_encode(5));
        assert_eq!(cmds[5], zigzag_encode(0));
    }

    #[test]
    fn point_geometry_is_one_absolute_move_to() {
        let cmds = encode_point(TilePoint { x: -3, y: 7 });
        assert_eq!(cmds, vec![command_integer(MOVE_TO, 1), zigzag_encode(-3), zigzag_encode(7)]);
    }

    #[test]
    fn layer_writer_produces_no_trailing_padding() {
        let mut layer = LayerWriter::new("speeds", 4096);
        let id = layer.next_id();
        let geom = encode_point(TilePoint { x: 1, y: 1 });
        layer.add_feature(&build_feature(id, &[0, 1], GeomType::Point, &geom));
        layer.add_key("k");
        layer.add_value(&value_bool(true));
        let bytes = layer.into_bytes();
        assert!(!bytes.is_empty());

        let mut tile = TileWriter::new();
        tile.add_layer(layer);
        let tile_bytes = tile.into_bytes();
        assert_eq!(tile_bytes.len(), bytes.len() + expected_tag_and_len_overhead(bytes.len()));
    }

    fn expected_tag_and_len_overhead(payload_len: usize) -> usize {
        // 1 byte for the field tag (field 3, wire type 2) + varint length prefix.
        let mut len_buf = Vec::new();
        write_varint(&mut len_buf, payload_len as u64);
        1 + len_buf.len()
    }
}
