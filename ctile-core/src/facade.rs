//! The read-only external dependency boundary. Everything the assembler
//! needs from graph storage, the compressed geometry store, and the static
//! R-tree spatial index is expressed here as a trait, per the design note
//! that the facade is polymorphic over the graph backend but needs only
//! these operations.

use thiserror::Error;

use crate::coord::GeoCoord;

pub type NodeId = u64;
pub type PackedGeomId = u64;
pub type EdgeBasedEdgeId = u64;
pub type ShortcutId = EdgeBasedEdgeId;

/// A segment reference on one direction of an edge, carrying whether that
/// direction is routable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentId {
    pub id: EdgeBasedEdgeId,
    pub enabled: bool,
}

/// One directed road segment returned by a bbox query. `forward_packed_geometry_id`
/// and `reverse_packed_geometry_id` are `None` where the source data would use a
/// `NO_GEOMETRY` sentinel to mean "this direction is disabled".
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub forward_packed_geometry_id: Option<PackedGeomId>,
    pub reverse_packed_geometry_id: Option<PackedGeomId>,
    pub fwd_segment_position: usize,
    pub forward_segment_id: SegmentId,
    pub reverse_segment_id: SegmentId,
    pub component_is_tiny: bool,
}

/// One constituent edge-based edge produced by unpacking a contraction
/// hierarchy shortcut, carrying its id and cumulative path weight
/// (deciseconds).
#[derive(Debug, Clone, Copy)]
pub struct ConstituentEdge {
    pub id: EdgeBasedEdgeId,
    pub distance: i32,
}

/// Directional flags on a shortcut edge, as consumed when deciding whether
/// it represents a usable forward maneuver.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutEdgeData {
    pub forward: bool,
    pub backward: bool,
}

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("packed geometry {0} not found")]
    GeometryNotFound(PackedGeomId),
    #[error("segment position {position} out of range for geometry of length {length}")]
    SegmentPositionOutOfRange { position: usize, length: usize },
    #[error("edge-based edge {0} not found")]
    EdgeNotFound(EdgeBasedEdgeId),
    #[error("datasource id {0} has no registered name")]
    UnknownDatasource(u8),
}

/// Read-only access to the routing graph, the compressed geometry store,
/// and the contraction hierarchy's shortcut index. A request borrows one
/// `Facade` implementation for its whole lifetime and never mutates it.
pub trait Facade {
    /// All directed edges whose geometry intersects the box `[sw, ne]`.
    /// Order is significant: feature ids in the output tile follow this
    /// order (spec'd as the order the backing R-tree query returns).
    fn edges_in_box(&self, sw: GeoCoord, ne: GeoCoord) -> Vec<Edge>;

    /// # Errors
    /// Returns [`FacadeError::NodeNotFound`] for an unknown node id.
    fn coord_of_node(&self, node: NodeId) -> Result<GeoCoord, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::GeometryNotFound`] for an unknown geometry id.
    fn uncompressed_weights(&self, geom: PackedGeomId) -> Result<Vec<i32>, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::GeometryNotFound`] for an unknown geometry id.
    fn uncompressed_datasources(&self, geom: PackedGeomId) -> Result<Vec<u8>, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::GeometryNotFound`] for an unknown geometry id.
    fn uncompressed_geometry(&self, geom: PackedGeomId) -> Result<Vec<NodeId>, FacadeError>;

    /// The outgoing shortcuts adjacent to an edge-based-edge id, as seen by
    /// the contraction hierarchy's adjacency iterator.
    fn adjacent_edge_range(&self, edge: EdgeBasedEdgeId) -> Vec<ShortcutId>;

    /// # Errors
    /// Returns [`FacadeError::EdgeNotFound`] for an unknown shortcut id.
    fn edge_data(&self, shortcut: ShortcutId) -> Result<ShortcutEdgeData, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::EdgeNotFound`] for an unknown shortcut id.
    fn target(&self, shortcut: ShortcutId) -> Result<EdgeBasedEdgeId, FacadeError>;

    /// Expands the shortcut spanning `source -> target` into its two direct
    /// constituent edges.
    ///
    /// # Errors
    /// Returns [`FacadeError::EdgeNotFound`] if the pair does not name a
    /// known shortcut.
    fn unpack_edge_to_edges(
        &self,
        source: EdgeBasedEdgeId,
        target: EdgeBasedEdgeId,
    ) -> Result<Vec<ConstituentEdge>, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::EdgeNotFound`] for an unknown edge-based edge id.
    fn geometry_index_for_edge(&self, edge: EdgeBasedEdgeId) -> Result<PackedGeomId, FacadeError>;

    /// # Errors
    /// Returns [`FacadeError::UnknownDatasource`] for an id with no
    /// registered name.
    fn datasource_name(&self, id: u8) -> Result<String, FacadeError>;
}
