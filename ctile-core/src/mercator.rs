//! C1: Mercator / tile-grid projection. Converts `(z, x, y)` to a WGS84 bbox
//! and a Mercator-pixel bbox, and projects WGS84 points into tile-local
//! grid units in `[0, EXTENT]` (plus buffer overdraw).

use std::f64::consts::PI;

use crate::coord::{EXTENT, GeoCoord, MercBBox, TilePoint, WgsBBox};

const TILE_SIZE: f64 = 256.0;
/// `TILE_SIZE / 360`, the scale factor between degrees and Mercator pixel
/// units at the implicit zoom-0 reference.
pub const DEGREE_TO_PX: f64 = TILE_SIZE / 360.0;

/// Mercator's maximum latitude, where `lat_to_merc_y` would otherwise diverge.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Computes the geographic bounding box of tile `(z, x, y)` using the
/// standard slippy-map corner formulas. `y` grows south, so `min_lat` comes
/// from row `y + 1` and `max_lat` from row `y`.
#[must_use]
pub fn xyz_to_wgs84(z: u8, x: u32, y: u32) -> WgsBBox {
    let n = f64::from(1u32 << z);
    let lon = |tx: u32| f64::from(tx) / n * 360.0 - 180.0;
    let lat = |ty: u32| {
        let sigma = PI * (1.0 - 2.0 * f64::from(ty) / n);
        sigma.sinh().atan().to_degrees()
    };
    WgsBBox {
        min_lon: lon(x),
        min_lat: lat(y + 1),
        max_lon: lon(x + 1),
        max_lat: lat(y),
    }
}

/// Web-Mercator's `y` coordinate for a latitude, in degrees-equivalent units
/// (to be scaled by [`DEGREE_TO_PX`] for tile math). Clamped at the
/// projection's domain limit.
#[must_use]
pub fn lat_to_merc_y(lat: f64) -> f64 {
    let clamped = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    ((clamped * PI / 360.0 + PI / 4.0).tan()).ln() * 180.0 / PI
}

/// Computes the bounding box of tile `(z, x, y)` in Mercator-pixel units.
#[must_use]
pub fn xyz_to_mercator(z: u8, x: u32, y: u32) -> MercBBox {
    let wgs = xyz_to_wgs84(z, x, y);
    MercBBox {
        min_x: wgs.min_lon * DEGREE_TO_PX,
        max_x: wgs.max_lon * DEGREE_TO_PX,
        min_y: lat_to_merc_y(wgs.min_lat) * DEGREE_TO_PX,
        max_y: lat_to_merc_y(wgs.max_lat) * DEGREE_TO_PX,
    }
}

/// Projects a WGS84 point into tile-local grid units given the tile's
/// Mercator-pixel bbox. The `y` axis inverts: tile coordinates grow
/// downward while Mercator `y` grows with latitude.
#[must_use]
pub fn wgs84_to_tile(point: GeoCoord, bbox: MercBBox) -> TilePoint {
    let px_merc = point.lon() * DEGREE_TO_PX;
    let py_merc = lat_to_merc_y(point.lat()) * DEGREE_TO_PX;
    let tx = (px_merc - bbox.min_x) / bbox.width() * f64::from(EXTENT);
    let ty = (bbox.max_y - py_merc) / bbox.height() * f64::from(EXTENT);
    #[expect(clippy::cast_possible_truncation)]
    let point = TilePoint {
        x: tx.round() as i32,
        y: ty.round() as i32,
    };
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_tile_spans_mercator_latitude_limits() {
        let bbox = xyz_to_wgs84(0, 0, 0);
        assert!((bbox.min_lon - (-180.0)).abs() < 1e-9);
        assert!((bbox.max_lon - 180.0).abs() < 1e-9);
        assert!((bbox.max_lat - MAX_MERCATOR_LAT).abs() < 1e-3);
        assert!((bbox.min_lat - (-MAX_MERCATOR_LAT)).abs() < 1e-3);
    }

    #[test]
    fn adjacent_tiles_share_an_edge() {
        let right = xyz_to_wgs84(5, 10, 3);
        let left = xyz_to_wgs84(5, 11, 3);
        assert!((right.max_lon - left.min_lon).abs() < 1e-9);
    }

    #[test]
    fn corners_project_to_tile_extremes() {
        let z = 14;
        let x = 8529;
        let y = 5975;
        let wgs = xyz_to_wgs84(z, x, y);
        let merc = xyz_to_mercator(z, x, y);

        let nw = GeoCoord::from_degrees(wgs.min_lon, wgs.max_lat);
        let se = GeoCoord::from_degrees(wgs.max_lon, wgs.min_lat);

        let p_nw = wgs84_to_tile(nw, merc);
        let p_se = wgs84_to_tile(se, merc);

        assert_eq!(p_nw, TilePoint { x: 0, y: 0 });
        assert_eq!(p_se, TilePoint { x: EXTENT, y: EXTENT });
    }

    #[test]
    fn lat_to_merc_y_is_monotonically_increasing() {
        assert!(lat_to_merc_y(10.0) > lat_to_merc_y(0.0));
        assert!(lat_to_merc_y(0.0) > lat_to_merc_y(-10.0));
    }
}
