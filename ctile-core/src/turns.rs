//! C5: turn-penalty extractor. A pure function of the facade and one edge —
//! no cyclic ownership with the assembler, per the design note that this
//! needs no more than a free function borrowing the facade.

use geo::{Bearing, Haversine};
use tracing::warn;

use crate::coord::TurnData;
use crate::error::TileError;
use crate::facade::{Edge, Facade, NodeId};
use crate::intern::InternTable;

/// Geodesic bearing in `[0, 360)`, degrees.
#[expect(clippy::cast_possible_truncation)]
fn bearing_degrees(a: geo::Point<f64>, b: geo::Point<f64>) -> i32 {
    Haversine.bearing(a, b).rem_euclid(360.0) as i32
}

/// Enumerates the outgoing shortcuts from an intersection-terminating edge,
/// interns each resolved bearing/weight into `point_ints`, and returns one
/// [`TurnData`] per surviving successor node. Invoked only when the caller
/// has already established that this edge's forward segment terminates at
/// an edge-based node (`fwd_segment_position == len(forward_geometry) - 1`).
///
/// # Errors
/// Propagates any [`crate::facade::FacadeError`] raised by facade lookups.
pub fn extract_turn_data<F: Facade + ?Sized>(
    facade: &F,
    edge: &Edge,
    point_ints: &mut InternTable,
) -> Result<Vec<TurnData>, TileError> {
    let Some(geom_id) = edge.forward_packed_geometry_id else {
        return Ok(Vec::new());
    };

    let weights = facade.uncompressed_weights(geom_id)?;
    let sum_node_weight: i32 = weights.iter().sum();

    let geometry = facade.uncompressed_geometry(geom_id)?;
    let coord_b = facade.coord_of_node(edge.v)?;
    // The node immediately preceding `v` along this edge. A single-segment
    // edge has no intermediate node, so `coord_a` falls back to `u`.
    let coord_a = if geometry.len() >= 2 {
        facade.coord_of_node(geometry[geometry.len() - 2])?
    } else {
        facade.coord_of_node(edge.u)?
    };

    let bearing_in = bearing_degrees(coord_a.as_geo_point(), coord_b.as_geo_point());

    // Insertion-ordered map from successor node to its turn weight. A Vec
    // rather than a HashMap: last-write-wins dedup is required, but so is
    // deterministic first-occurrence ordering of the emitted turns.
    let mut by_successor: Vec<(NodeId, i32)> = Vec::new();

    for shortcut in facade.adjacent_edge_range(edge.forward_segment_id.id) {
        let data = facade.edge_data(shortcut)?;
        if !data.forward {
            continue;
        }

        let target = facade.target(shortcut)?;
        let constituents = facade.unpack_edge_to_edges(edge.forward_segment_id.id, target)?;
        if constituents.len() < 2 {
            // Degenerate shortcut: only represents the edge we arrived on.
            continue;
        }

        let successor_geom = facade.geometry_index_for_edge(constituents[1].id)?;
        let successor_nodes = facade.uncompressed_geometry(successor_geom)?;
        let Some(&c_node) = successor_nodes.first() else {
            continue;
        };

        let turn_weight = constituents[0].distance - sum_node_weight;
        if turn_weight < 0 {
            warn!(
                turn_weight,
                edge_u = edge.u,
                edge_v = edge.v,
                "negative turn weight computed; preserving upstream behavior"
            );
        }

        if let Some(entry) = by_successor.iter_mut().find(|(n, _)| *n == c_node) {
            entry.1 = turn_weight;
        } else {
            by_successor.push((c_node, turn_weight));
        }
    }

    let mut out = Vec::with_capacity(by_successor.len());
    for (c_node, turn_weight) in by_successor {
        let coord_c = facade.coord_of_node(c_node)?;
        let bearing_out = bearing_degrees(coord_b.as_geo_point(), coord_c.as_geo_point());

        out.push(TurnData {
            in_offset: point_ints.intern(bearing_in),
            out_offset: point_ints.intern(bearing_out),
            weight_offset: point_ints.intern(turn_weight),
        });
    }

    Ok(out)
}
