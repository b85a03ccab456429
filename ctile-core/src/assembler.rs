//! C6: tile assembler. Drives the two-pass walk over `edges_in_box` that
//! every other component feeds into, and exposes `handle_request`, the
//! core's single outbound entry point.

use geo::{Distance, Haversine};
use tracing::{debug, trace};

use crate::clip::{clip_line, point_in_clip_box};
use crate::coord::{EXTENT, GeoCoord, MercBBox, TileParams, TurnData};
use crate::error::TileError;
use crate::facade::{Edge, Facade, FacadeError};
use crate::intern::{self, InternTable};
use crate::mercator::{wgs84_to_tile, xyz_to_mercator, xyz_to_wgs84};
use crate::mvt::writer::{self, GeomType, LayerWriter, TileWriter};
use crate::turns::extract_turn_data;

const SPEEDS_LAYER_NAME: &str = "speeds";
const TURNS_LAYER_NAME: &str = "turns";

#[derive(Debug, Clone, Copy)]
struct Direction {
    weight: i32,
    datasource: u8,
}

/// Per-edge results cached from pass 1 and reused in pass 2, halving facade
/// calls (spec'd as an allowed implementation choice; the source
/// recomputes these in pass 2, which is also legal and behaviorally
/// identical).
#[derive(Debug, Default)]
struct EdgeAttrs {
    fwd: Option<Direction>,
    rev: Option<Direction>,
    turns: Vec<TurnData>,
}

/// Runs the full request: bbox query, two-pass walk, and MVT serialization.
///
/// # Errors
/// Returns [`TileError::Facade`] if any facade lookup is inconsistent with
/// the edges it itself returned (a programming error in the collaborator,
/// per the spec's error table — never triggered by otherwise-valid input).
pub fn handle_request<F: Facade>(facade: &F, params: TileParams) -> Result<Vec<u8>, TileError> {
    debug!(z = params.z, x = params.x, y = params.y, "handling tile request");

    let wgs = xyz_to_wgs84(params.z, params.x, params.y);
    let sw = GeoCoord::from_degrees(wgs.min_lon, wgs.min_lat);
    let ne = GeoCoord::from_degrees(wgs.max_lon, wgs.max_lat);

    let edges = facade.edges_in_box(sw, ne);
    trace!(edge_count = edges.len(), "queried edges in box");

    let mut line_ints = InternTable::new();
    let mut point_ints = InternTable::new();
    let (attrs, max_datasource_id) = pass_one(facade, &edges, &mut line_ints, &mut point_ints)?;

    let merc_bbox = xyz_to_mercator(params.z, params.x, params.y);

    let speeds_layer = build_speeds_layer(
        facade,
        &edges,
        &attrs,
        merc_bbox,
        max_datasource_id,
        &mut line_ints,
    )?;
    let turns_layer = build_turns_layer(facade, &edges, &attrs, merc_bbox, &point_ints)?;

    let speed_features = speeds_layer.feature_count();
    let turn_features = turns_layer.feature_count();

    let mut tile = TileWriter::new();
    if speed_features > 0 {
        tile.add_layer(speeds_layer);
    }
    if turn_features > 0 {
        tile.add_layer(turns_layer);
    }

    debug!(speed_features, turn_features, "tile assembled");
    Ok(tile.into_bytes())
}

/// Pass 1: walk every edge once, interning per-segment weights and
/// resolving turn penalties for intersection-terminating segments.
fn pass_one<F: Facade>(
    facade: &F,
    edges: &[Edge],
    line_ints: &mut InternTable,
    point_ints: &mut InternTable,
) -> Result<(Vec<EdgeAttrs>, u8), TileError> {
    let mut attrs = Vec::with_capacity(edges.len());
    let mut max_datasource_id: u8 = 0;

    for edge in edges {
        let mut edge_attrs = EdgeAttrs::default();

        if let Some(geom_id) = edge.forward_packed_geometry_id {
            let weights = facade.uncompressed_weights(geom_id)?;
            let datasources = facade.uncompressed_datasources(geom_id)?;
            let weight = *weights
                .get(edge.fwd_segment_position)
                .ok_or(FacadeError::SegmentPositionOutOfRange {
                    position: edge.fwd_segment_position,
                    length: weights.len(),
                })?;
            let datasource = *datasources
                .get(edge.fwd_segment_position)
                .ok_or(FacadeError::SegmentPositionOutOfRange {
                    position: edge.fwd_segment_position,
                    length: datasources.len(),
                })?;

            line_ints.intern(weight);
            max_datasource_id = max_datasource_id.max(datasource);

            if edge.fwd_segment_position + 1 == weights.len() {
                edge_attrs.turns = extract_turn_data(facade, edge, point_ints)?;
            }

            edge_attrs.fwd = Some(Direction { weight, datasource });
        }

        if let Some(geom_id) = edge.reverse_packed_geometry_id {
            let weights = facade.uncompressed_weights(geom_id)?;
            let datasources = facade.uncompressed_datasources(geom_id)?;
            let rev_position =
                weights
                    .len()
                    .checked_sub(edge.fwd_segment_position + 1)
                    .ok_or(FacadeError::SegmentPositionOutOfRange {
                        position: edge.fwd_segment_position,
                        length: weights.len(),
                    })?;
            let weight = *weights
                .get(rev_position)
                .ok_or(FacadeError::SegmentPositionOutOfRange {
                    position: rev_position,
                    length: weights.len(),
                })?;
            let datasource = *datasources
                .get(rev_position)
                .ok_or(FacadeError::SegmentPositionOutOfRange {
                    position: rev_position,
                    length: datasources.len(),
                })?;

            line_ints.intern(weight);
            max_datasource_id = max_datasource_id.max(datasource);
            edge_attrs.rev = Some(Direction { weight, datasource });
        }

        attrs.push(edge_attrs);
    }

    Ok((attrs, max_datasource_id))
}

/// Pass 2a: the `speeds` line layer.
fn build_speeds_layer<F: Facade>(
    facade: &F,
    edges: &[Edge],
    attrs: &[EdgeAttrs],
    merc_bbox: MercBBox,
    max_datasource_id: u8,
    line_ints: &mut InternTable,
) -> Result<LayerWriter, TileError> {
    let mut layer = LayerWriter::new(SPEEDS_LAYER_NAME, EXTENT.unsigned_abs());

    for (edge, edge_attrs) in edges.iter().zip(attrs) {
        if let Some(dir) = &edge_attrs.fwd {
            emit_speed_feature(
                facade,
                &mut layer,
                edge,
                dir,
                true,
                merc_bbox,
                max_datasource_id,
                line_ints,
            )?;
        }
        if let Some(dir) = &edge_attrs.rev {
            emit_speed_feature(
                facade,
                &mut layer,
                edge,
                dir,
                false,
                merc_bbox,
                max_datasource_id,
                line_ints,
            )?;
        }
    }

    for key in intern::LINE_KEYS {
        layer.add_key(key);
    }
    for v in 0..u32::try_from(intern::SPEED_TABLE_SIZE).expect("SPEED_TABLE_SIZE fits u32") {
        layer.add_value(&writer::value_uint(u64::from(v)));
    }
    layer.add_value(&writer::value_bool(true));
    layer.add_value(&writer::value_bool(false));
    for ds in 0..=max_datasource_id {
        let name = facade.datasource_name(ds)?;
        layer.add_value(&writer::value_string(&name));
    }
    for v in line_ints.values() {
        layer.add_value(&writer::value_double(f64::from(*v) / 10.0));
    }

    Ok(layer)
}

#[allow(clippy::too_many_arguments)]
fn emit_speed_feature<F: Facade>(
    facade: &F,
    layer: &mut LayerWriter,
    edge: &Edge,
    dir: &Direction,
    forward: bool,
    merc_bbox: MercBBox,
    max_datasource_id: u8,
    line_ints: &mut InternTable,
) -> Result<(), TileError> {
    let segment_enabled = if forward {
        edge.forward_segment_id.enabled
    } else {
        edge.reverse_segment_id.enabled
    };
    if dir.weight == 0 || !segment_enabled {
        return Ok(());
    }

    let (from, to) = if forward { (edge.u, edge.v) } else { (edge.v, edge.u) };
    let coord_from = facade.coord_of_node(from)?;
    let coord_to = facade.coord_of_node(to)?;

    let length_m = Haversine.distance(coord_from.as_geo_point(), coord_to.as_geo_point());
    let speed_kmh = (length_m / f64::from(dir.weight) * 10.0 * 3.6).round();
    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::cast_sign_loss)]
    let speed_clamped = speed_kmh.clamp(0.0, 127.0) as u32;

    let p0 = wgs84_to_tile(coord_from, merc_bbox);
    let p1 = wgs84_to_tile(coord_to, merc_bbox);
    let line = clip_line(p0, p1);
    if line.is_empty() {
        return Ok(());
    }

    let duration_offset = line_ints.intern(dir.weight);
    let datasource_offset = intern::datasource_offset(dir.datasource);
    let duration_base = intern::duration_base_offset(max_datasource_id);
    let is_small_offset = if edge.component_is_tiny {
        intern::BOOL_TRUE_OFFSET
    } else {
        intern::BOOL_FALSE_OFFSET
    };

    let tags = [
        0,
        speed_clamped,
        1,
        u32::try_from(is_small_offset).expect("is_small offset fits u32"),
        2,
        u32::try_from(datasource_offset).expect("datasource offset fits u32"),
        3,
        u32::try_from(duration_base + duration_offset).expect("duration offset fits u32"),
    ];

    let id = layer.next_id();
    let geometry = writer::encode_linestring(&line);
    layer.add_feature(&writer::build_feature(id, &tags, GeomType::Line, &geometry));

    Ok(())
}

/// Pass 2b: the `turns` point layer.
fn build_turns_layer<F: Facade>(
    facade: &F,
    edges: &[Edge],
    attrs: &[EdgeAttrs],
    merc_bbox: MercBBox,
    point_ints: &InternTable,
) -> Result<LayerWriter, TileError> {
    let mut layer = LayerWriter::new(TURNS_LAYER_NAME, EXTENT.unsigned_abs());

    for (edge, edge_attrs) in edges.iter().zip(attrs) {
        if edge_attrs.turns.is_empty() {
            continue;
        }

        let coord_v = facade.coord_of_node(edge.v)?;
        let point = wgs84_to_tile(coord_v, merc_bbox);
        if !point_in_clip_box(point) {
            continue;
        }

        for turn in &edge_attrs.turns {
            let tags = [
                0,
                u32::try_from(turn.in_offset).expect("in offset fits u32"),
                1,
                u32::try_from(turn.out_offset).expect("out offset fits u32"),
                2,
                u32::try_from(turn.weight_offset).expect("weight offset fits u32"),
            ];
            let id = layer.next_id();
            let geometry = writer::encode_point(point);
            layer.add_feature(&writer::build_feature(id, &tags, GeomType::Point, &geometry));
        }
    }

    for key in intern::POINT_KEYS {
        layer.add_key(key);
    }
    for v in point_ints.values() {
        let wire_value = i64::from(*v) as u64;
        layer.add_value(&writer::value_uint(wire_value));
    }

    Ok(layer)
}
