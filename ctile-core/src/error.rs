use thiserror::Error;

use crate::facade::FacadeError;

/// Top-level failure mode for a tile request. Matches the error table: an
/// invalid request is rejected before any facade call is made, and any
/// facade inconsistency aborts the request as a programming error rather
/// than producing a partial tile.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("invalid tile coordinates z={z} x={x} y={y}")]
    InvalidParams { z: u8, x: u32, y: u32 },

    #[error("facade lookup failed: {0}")]
    Facade(#[from] FacadeError),
}
