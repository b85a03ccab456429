//! Coordinate types shared by every component: WGS84 fixed-point degrees,
//! Web-Mercator pixel space, tile-local integer grid units, and the small
//! per-request records the assembler threads between passes.

/// Resolution of the tile grid, in grid units, across one tile's width/height.
pub const EXTENT: i32 = 4096;
/// Overdraw margin around the tile, in grid units, used while clipping.
pub const BUFFER: i32 = 128;

/// Scale between [`GeoCoord`]'s integer fields and floating-point degrees.
/// Matches the routing engine's own shape-codec precision.
const COORD_PRECISION: f64 = 1e-6;

/// A WGS84 longitude/latitude pair, held as fixed-point microdegrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoCoord {
    pub lon_e6: i32,
    pub lat_e6: i32,
}

impl GeoCoord {
    #[must_use]
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        let coord = Self {
            lon_e6: (lon / COORD_PRECISION).round() as i32,
            lat_e6: (lat / COORD_PRECISION).round() as i32,
        };
        coord
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        f64::from(self.lon_e6) * COORD_PRECISION
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        f64::from(self.lat_e6) * COORD_PRECISION
    }

    #[must_use]
    pub fn as_geo_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon(), self.lat())
    }
}

/// A point in Web-Mercator pixel space: `lon * DEGREE_TO_PX`,
/// `lat_to_merc_y(lat) * DEGREE_TO_PX`. Not literal meters; see
/// [`crate::mercator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercCoord {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned bounding box in Mercator pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercBBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MercBBox {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A WGS84 bounding box, as returned by `xyz_to_wgs84`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WgsBBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// A tile-local grid point. Signed so it can carry buffer overdraw outside
/// `[0, EXTENT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

/// A clipped (or not-yet-clipped) ordered sequence of grid points. Either
/// empty or at least 2 points; see [`crate::clip::clip_line`].
pub type TileLine = Vec<TilePoint>;

/// Validated `(z, x, y)` slippy-map tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileParams {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileParams {
    /// # Errors
    /// Returns [`crate::error::TileError::InvalidParams`] if `z > 22` or if
    /// `x`/`y` are out of range for that zoom level.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, crate::error::TileError> {
        if z > 22 {
            return Err(crate::error::TileError::InvalidParams { z, x, y });
        }
        let n = 1u32 << z;
        if x >= n || y >= n {
            return Err(crate::error::TileError::InvalidParams { z, x, y });
        }
        Ok(Self { z, x, y })
    }
}

/// Three offsets into the turns-layer value table, resolved by the turn
/// extractor and consumed by the assembler's second pass.
#[derive(Debug, Clone, Copy)]
pub struct TurnData {
    pub in_offset: usize,
    pub out_offset: usize,
    pub weight_offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_coord_round_trips_through_fixed_point() {
        let c = GeoCoord::from_degrees(13.414_2, 52.523_1);
        assert!((c.lon() - 13.414_2).abs() < 1e-6);
        assert!((c.lat() - 52.523_1).abs() < 1e-6);
    }

    #[test]
    fn tile_params_rejects_out_of_range_zoom() {
        assert!(TileParams::new(23, 0, 0).is_err());
    }

    #[test]
    fn tile_params_rejects_out_of_range_xy() {
        assert!(TileParams::new(3, 8, 0).is_err()); // 2^3 = 8, x must be < 8
        assert!(TileParams::new(3, 0, 8).is_err());
        assert!(TileParams::new(3, 7, 7).is_ok());
    }
}
