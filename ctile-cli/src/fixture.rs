//! Loads a synthetic graph from a JSON fixture file and exposes it as a
//! [`ctile_core::facade::Facade`]. This is test/demo tooling only — the real
//! graph backend, geometry store, and R-tree live outside the core crate
//! entirely (spec.md §1, "Out of scope").

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use ctile_core::coord::GeoCoord;
use ctile_core::facade::{
    ConstituentEdge, Edge, Facade, FacadeError, NodeId, PackedGeomId, SegmentId,
    ShortcutEdgeData, ShortcutId,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FixtureNode {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub struct FixtureGeometry {
    pub id: PackedGeomId,
    #[serde(default)]
    pub weights: Vec<i32>,
    #[serde(default)]
    pub datasources: Vec<u8>,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureSegmentId {
    pub id: u64,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct FixtureEdge {
    pub u: NodeId,
    pub v: NodeId,
    pub forward_packed_geometry_id: Option<PackedGeomId>,
    pub reverse_packed_geometry_id: Option<PackedGeomId>,
    pub fwd_segment_position: usize,
    pub forward_segment_id: FixtureSegmentId,
    pub reverse_segment_id: FixtureSegmentId,
    #[serde(default)]
    pub component_is_tiny: bool,
}

#[derive(Debug, Deserialize)]
pub struct FixtureShortcut {
    pub id: u64,
    pub forward: bool,
    pub backward: bool,
    pub target: u64,
}

#[derive(Debug, Deserialize)]
pub struct FixtureUnpack {
    pub source: u64,
    pub target: u64,
    pub constituents: Vec<FixtureConstituent>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureConstituent {
    pub id: u64,
    pub distance: i32,
}

#[derive(Debug, Deserialize)]
pub struct FixtureDatasource {
    pub id: u8,
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Fixture {
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
    #[serde(default)]
    pub geometries: Vec<FixtureGeometry>,
    #[serde(default)]
    pub edges: Vec<FixtureEdge>,
    /// `edge-based-edge id -> outgoing shortcut ids`, from the contraction
    /// hierarchy's adjacency index.
    #[serde(default)]
    pub adjacency: HashMap<String, Vec<u64>>,
    #[serde(default)]
    pub shortcuts: Vec<FixtureShortcut>,
    #[serde(default)]
    pub unpacks: Vec<FixtureUnpack>,
    /// `edge-based-edge id -> packed geometry id`, for the second
    /// constituent edge of an unpacked shortcut.
    #[serde(default)]
    pub geometry_for_edge: HashMap<String, PackedGeomId>,
    #[serde(default)]
    pub datasources: Vec<FixtureDatasource>,
}

/// An in-memory [`Facade`] built once from a parsed [`Fixture`].
pub struct InMemoryFacade {
    coords: HashMap<NodeId, GeoCoord>,
    edges: Vec<Edge>,
    geometries: HashMap<PackedGeomId, FixtureGeometry>,
    adjacency: HashMap<u64, Vec<ShortcutId>>,
    shortcuts: HashMap<ShortcutId, FixtureShortcut>,
    unpacks: HashMap<(u64, u64), Vec<ConstituentEdge>>,
    geometry_for_edge: HashMap<u64, PackedGeomId>,
    datasource_names: HashMap<u8, String>,
}

impl InMemoryFacade {
    /// # Errors
    /// Returns an error if `path` cannot be read or does not contain valid
    /// fixture JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))?;
        let fixture: Fixture =
            serde_json::from_slice(&bytes).context("invalid JSON in tile fixture")?;
        Ok(Self::from_fixture(fixture))
    }

    fn from_fixture(fixture: Fixture) -> Self {
        let coords = fixture
            .nodes
            .into_iter()
            .map(|n| (n.id, GeoCoord::from_degrees(n.lon, n.lat)))
            .collect();

        let edges = fixture
            .edges
            .into_iter()
            .map(|e| Edge {
                u: e.u,
                v: e.v,
                forward_packed_geometry_id: e.forward_packed_geometry_id,
                reverse_packed_geometry_id: e.reverse_packed_geometry_id,
                fwd_segment_position: e.fwd_segment_position,
                forward_segment_id: SegmentId {
                    id: e.forward_segment_id.id,
                    enabled: e.forward_segment_id.enabled,
                },
                reverse_segment_id: SegmentId {
                    id: e.reverse_segment_id.id,
                    enabled: e.reverse_segment_id.enabled,
                },
                component_is_tiny: e.component_is_tiny,
            })
            .collect();

        let geometries = fixture.geometries.into_iter().map(|g| (g.id, g)).collect();

        let adjacency = fixture
            .adjacency
            .into_iter()
            .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, v)))
            .collect();

        let shortcuts = fixture.shortcuts.into_iter().map(|s| (s.id, s)).collect();

        let unpacks = fixture
            .unpacks
            .into_iter()
            .map(|u| {
                let constituents = u
                    .constituents
                    .into_iter()
                    .map(|c| ConstituentEdge { id: c.id, distance: c.distance })
                    .collect();
                ((u.source, u.target), constituents)
            })
            .collect();

        let geometry_for_edge = fixture
            .geometry_for_edge
            .into_iter()
            .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, v)))
            .collect();

        let datasource_names = fixture.datasources.into_iter().map(|d| (d.id, d.name)).collect();

        Self {
            coords,
            edges,
            geometries,
            adjacency,
            shortcuts,
            unpacks,
            geometry_for_edge,
            datasource_names,
        }
    }
}

impl Facade for InMemoryFacade {
    fn edges_in_box(&self, _sw: GeoCoord, _ne: GeoCoord) -> Vec<Edge> {
        self.edges.clone()
    }

    fn coord_of_node(&self, node: NodeId) -> std::result::Result<GeoCoord, FacadeError> {
        self.coords.get(&node).copied().ok_or(FacadeError::NodeNotFound(node))
    }

    fn uncompressed_weights(&self, geom: PackedGeomId) -> std::result::Result<Vec<i32>, FacadeError> {
        self.geometries
            .get(&geom)
            .map(|g| g.weights.clone())
            .ok_or(FacadeError::GeometryNotFound(geom))
    }

    fn uncompressed_datasources(&self, geom: PackedGeomId) -> std::result::Result<Vec<u8>, FacadeError> {
        self.geometries
            .get(&geom)
            .map(|g| g.datasources.clone())
            .ok_or(FacadeError::GeometryNotFound(geom))
    }

    fn uncompressed_geometry(&self, geom: PackedGeomId) -> std::result::Result<Vec<NodeId>, FacadeError> {
        self.geometries
            .get(&geom)
            .map(|g| g.nodes.clone())
            .ok_or(FacadeError::GeometryNotFound(geom))
    }

    fn adjacent_edge_range(&self, edge: u64) -> Vec<ShortcutId> {
        self.adjacency.get(&edge).cloned().unwrap_or_default()
    }

    fn edge_data(&self, shortcut: ShortcutId) -> std::result::Result<ShortcutEdgeData, FacadeError> {
        self.shortcuts
            .get(&shortcut)
            .map(|s| ShortcutEdgeData { forward: s.forward, backward: s.backward })
            .ok_or(FacadeError::EdgeNotFound(shortcut))
    }

    fn target(&self, shortcut: ShortcutId) -> std::result::Result<u64, FacadeError> {
        self.shortcuts
            .get(&shortcut)
            .map(|s| s.target)
            .ok_or(FacadeError::EdgeNotFound(shortcut))
    }

    fn unpack_edge_to_edges(
        &self,
        source: u64,
        target: u64,
    ) -> std::result::Result<Vec<ConstituentEdge>, FacadeError> {
        self.unpacks.get(&(source, target)).cloned().ok_or(FacadeError::EdgeNotFound(target))
    }

    fn geometry_index_for_edge(&self, edge: u64) -> std::result::Result<PackedGeomId, FacadeError> {
        self.geometry_for_edge.get(&edge).copied().ok_or(FacadeError::EdgeNotFound(edge))
    }

    fn datasource_name(&self, id: u8) -> std::result::Result<String, FacadeError> {
        self.datasource_names.get(&id).cloned().ok_or(FacadeError::UnknownDatasource(id))
    }
}
