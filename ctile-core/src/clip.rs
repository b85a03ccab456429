//! C2: geometry clipper. Clips a 2-point line against the tile's buffered
//! extent using Cohen-Sutherland, and tests single points against the same
//! box. Operates entirely in tile grid units.

use crate::coord::{BUFFER, EXTENT, TileLine, TilePoint};

const CLIP_MIN: i32 = -BUFFER;
const CLIP_MAX: i32 = EXTENT + BUFFER;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn out_code(x: f64, y: f64) -> u8 {
    let mut code = INSIDE;
    if x < f64::from(CLIP_MIN) {
        code |= LEFT;
    } else if x > f64::from(CLIP_MAX) {
        code |= RIGHT;
    }
    if y < f64::from(CLIP_MIN) {
        code |= TOP;
    } else if y > f64::from(CLIP_MAX) {
        code |= BOTTOM;
    }
    code
}

/// Inclusive test: is `p` within `[-BUFFER, EXTENT+BUFFER]^2`?
#[must_use]
pub fn point_in_clip_box(p: TilePoint) -> bool {
    p.x >= CLIP_MIN && p.x <= CLIP_MAX && p.y >= CLIP_MIN && p.y <= CLIP_MAX
}

/// Clips the segment `a -> b` against the tile's buffered extent.
/// Rounding to grid-unit integers has already happened in `a`/`b`; any new
/// intersection point this produces is rounded once more before being
/// returned, so the result is always 0 or exactly 2 points — never 1, even
/// when the original segment barely grazes the box.
#[must_use]
pub fn clip_line(a: TilePoint, b: TilePoint) -> TileLine {
    let mut x0 = f64::from(a.x);
    let mut y0 = f64::from(a.y);
    let mut x1 = f64::from(b.x);
    let mut y1 = f64::from(b.y);

    let mut code0 = out_code(x0, y0);
    let mut code1 = out_code(x1, y1);

    loop {
        if code0 | code1 == INSIDE {
            #[expect(clippy::cast_possible_truncation)]
            let p0 = TilePoint {
                x: x0.round() as i32,
                y: y0.round() as i32,
            };
            #[expect(clippy::cast_possible_truncation)]
            let p1 = TilePoint {
                x: x1.round() as i32,
                y: y1.round() as i32,
            };
            return if p0 == p1 { Vec::new() } else { vec![p0, p1] };
        }
        if code0 & code1 != INSIDE {
            return Vec::new();
        }

        let code_out = if code0 != INSIDE { code0 } else { code1 };
        let (x, y) = if code_out & TOP != 0 {
            (
                x0 + (x1 - x0) * (f64::from(CLIP_MIN) - y0) / (y1 - y0),
                f64::from(CLIP_MIN),
            )
        } else if code_out & BOTTOM != 0 {
            (
                x0 + (x1 - x0) * (f64::from(CLIP_MAX) - y0) / (y1 - y0),
                f64::from(CLIP_MAX),
            )
        } else if code_out & RIGHT != 0 {
            (
                f64::from(CLIP_MAX),
                y0 + (y1 - y0) * (f64::from(CLIP_MAX) - x0) / (x1 - x0),
            )
        } else {
            (
                f64::from(CLIP_MIN),
                y0 + (y1 - y0) * (f64::from(CLIP_MIN) - x0) / (x1 - x0),
            )
        };

        if code_out == code0 {
            x0 = x;
            y0 = y;
            code0 = out_code(x0, y0);
        } else {
            x1 = x;
            y1 = y;
            code1 = out_code(x1, y1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_inside_segment_is_unchanged() {
        let a = TilePoint { x: 0, y: 0 };
        let b = TilePoint { x: 100, y: 100 };
        assert_eq!(clip_line(a, b), vec![a, b]);
    }

    #[test]
    fn fully_outside_segment_is_empty() {
        let a = TilePoint {
            x: CLIP_MAX + 1000,
            y: 0,
        };
        let b = TilePoint {
            x: CLIP_MAX + 2000,
            y: 0,
        };
        assert!(clip_line(a, b).is_empty());
    }

    #[test]
    fn segment_crossing_right_edge_is_clipped_to_two_points() {
        let a = TilePoint { x: 0, y: 0 };
        let b = TilePoint {
            x: CLIP_MAX + 1000,
            y: 0,
        };
        let clipped = clip_line(a, b);
        assert_eq!(clipped.len(), 2);
        assert_eq!(clipped[0], a);
        assert_eq!(clipped[1].x, CLIP_MAX);
    }

    #[test]
    fn degenerate_point_segment_on_boundary_is_discarded() {
        let p = TilePoint {
            x: CLIP_MAX,
            y: CLIP_MAX,
        };
        assert!(clip_line(p, p).is_empty());
    }

    #[test]
    fn point_in_clip_box_is_inclusive_at_boundaries() {
        assert!(point_in_clip_box(TilePoint {
            x: CLIP_MIN,
            y: CLIP_MIN
        }));
        assert!(point_in_clip_box(TilePoint {
            x: CLIP_MAX,
            y: CLIP_MAX
        }));
        assert!(!point_in_clip_box(TilePoint {
            x: CLIP_MAX + 1,
            y: 0
        }));
    }
}
