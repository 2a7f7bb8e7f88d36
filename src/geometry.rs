//! Corner geometry for detected markers.
//!
//! The detector reports the four corners of a QR quadrilateral in arbitrary
//! rotational order. This module assigns each point a canonical role
//! (top-left, top-right, bottom-left, bottom-right) so that downstream
//! consumers always see the same ordering regardless of how the marker was
//! rotated in the image.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 2D point in image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// x + y. Smallest at the corner nearest the image origin.
    fn corner_sum(&self) -> f64 {
        self.x + self.y
    }

    /// y - x. Smallest where x dominates y.
    fn corner_diff(&self) -> f64 {
        self.y - self.x
    }
}

/// The four corners of a marker quadrilateral with canonical roles assigned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl OrderedCorners {
    /// Arithmetic mean of the four corners.
    pub fn centroid(&self) -> Point {
        Point {
            x: (self.top_left.x + self.top_right.x + self.bottom_left.x + self.bottom_right.x)
                / 4.0,
            y: (self.top_left.y + self.top_right.y + self.bottom_left.y + self.bottom_right.y)
                / 4.0,
        }
    }
}

/// The orderer was handed something other than exactly four points.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected exactly 4 corner points, got {0}")]
pub struct InvalidCornerCount(pub usize);

/// Assign canonical roles to the four corners of a quadrilateral.
///
/// Roles follow the relative geometry of the points only, so any permutation
/// of the same four points yields the same assignment:
/// - top-left: minimum x + y
/// - bottom-right: maximum x + y
/// - top-right: minimum y - x
/// - bottom-left: maximum y - x
///
/// Correct for convex, axis-aligned-to-moderately-rotated quadrilaterals,
/// which is the expected case for a camera-facing marker. Ties keep the
/// first occurrence in input order so degenerate (perfectly symmetric)
/// inputs still order reproducibly.
pub fn order_corners(points: &[Point]) -> Result<OrderedCorners, InvalidCornerCount> {
    if points.len() != 4 {
        return Err(InvalidCornerCount(points.len()));
    }

    let mut top_left = points[0];
    let mut bottom_right = points[0];
    let mut top_right = points[0];
    let mut bottom_left = points[0];

    for p in &points[1..] {
        if p.corner_sum() < top_left.corner_sum() {
            top_left = *p;
        }
        if p.corner_sum() > bottom_right.corner_sum() {
            bottom_right = *p;
        }
        if p.corner_diff() < top_right.corner_diff() {
            top_right = *p;
        }
        if p.corner_diff() > bottom_left.corner_diff() {
            bottom_left = *p;
        }
    }

    Ok(OrderedCorners {
        top_left,
        top_right,
        bottom_left,
        bottom_right,
    })
}

/// Normalize a raw detector point set to exactly four points.
///
/// Detectors occasionally report extra points; those are truncated rather
/// than rejected. Fewer than four points cannot be repaired and yields
/// `None`, which the tracking loop treats as "no marker this frame".
pub fn normalize_corner_points(raw: &[Point]) -> Option<[Point; 4]> {
    if raw.len() < 4 {
        return None;
    }
    Some([raw[0], raw[1], raw[2], raw[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_corners() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ]
    }

    /// All permutations of [0, 1, 2, 3], via Heap's algorithm.
    fn permutations() -> Vec<[usize; 4]> {
        let mut out = Vec::new();
        let mut idx = [0usize, 1, 2, 3];
        fn heap(k: usize, idx: &mut [usize; 4], out: &mut Vec<[usize; 4]>) {
            if k == 1 {
                out.push(*idx);
                return;
            }
            for i in 0..k {
                heap(k - 1, idx, out);
                if k % 2 == 0 {
                    idx.swap(i, k - 1);
                } else {
                    idx.swap(0, k - 1);
                }
            }
        }
        heap(4, &mut idx, &mut out);
        out
    }

    #[test]
    fn assigns_roles_for_axis_aligned_square() {
        let scrambled = [
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        let ordered = order_corners(&scrambled).unwrap();
        assert_eq!(ordered.top_left, Point::new(0.0, 0.0));
        assert_eq!(ordered.top_right, Point::new(10.0, 0.0));
        assert_eq!(ordered.bottom_left, Point::new(0.0, 10.0));
        assert_eq!(ordered.bottom_right, Point::new(10.0, 10.0));
    }

    #[test]
    fn ordering_is_permutation_invariant() {
        let base = square_corners();
        let reference = order_corners(&base).unwrap();
        for perm in permutations() {
            let shuffled: Vec<Point> = perm.iter().map(|&i| base[i]).collect();
            assert_eq!(order_corners(&shuffled).unwrap(), reference);
        }
    }

    #[test]
    fn tolerates_rotation() {
        // The unit-ish square from square_corners() rotated 30 degrees about
        // its center (5, 5). The visually upper-left point must still land
        // in the top-left slot.
        let (sin, cos) = 30.0f64.to_radians().sin_cos();
        let rotate = |p: Point| {
            let (dx, dy) = (p.x - 5.0, p.y - 5.0);
            Point::new(5.0 + dx * cos - dy * sin, 5.0 + dx * sin + dy * cos)
        };
        let rotated: Vec<Point> = square_corners().iter().copied().map(rotate).collect();
        let ordered = order_corners(&rotated).unwrap();

        assert_eq!(ordered.top_left, rotate(Point::new(0.0, 0.0)));
        assert_eq!(ordered.top_right, rotate(Point::new(10.0, 0.0)));
        assert_eq!(ordered.bottom_left, rotate(Point::new(0.0, 10.0)));
        assert_eq!(ordered.bottom_right, rotate(Point::new(10.0, 10.0)));
    }

    #[test]
    fn ties_keep_first_occurrence() {
        // Every point ties on both x + y and y - x; the first point in input
        // order must win every role.
        let degenerate = [
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
        ];
        let ordered = order_corners(&degenerate).unwrap();
        assert_eq!(ordered.top_left, degenerate[0]);
        assert_eq!(ordered.top_right, degenerate[0]);
        assert_eq!(ordered.bottom_left, degenerate[0]);
        assert_eq!(ordered.bottom_right, degenerate[0]);
    }

    #[test]
    fn rejects_wrong_point_counts() {
        let three = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert_eq!(order_corners(&three), Err(InvalidCornerCount(3)));

        let five: Vec<Point> = (0..5).map(|i| Point::new(i as f64, 0.0)).collect();
        assert_eq!(order_corners(&five), Err(InvalidCornerCount(5)));
    }

    #[test]
    fn normalize_truncates_extras() {
        let five: Vec<Point> = (0..5).map(|i| Point::new(i as f64, i as f64)).collect();
        let normalized = normalize_corner_points(&five).unwrap();
        assert_eq!(normalized.len(), 4);
        assert_eq!(normalized[3], Point::new(3.0, 3.0));
    }

    #[test]
    fn normalize_rejects_short_input() {
        let three: Vec<Point> = (0..3).map(|i| Point::new(i as f64, 0.0)).collect();
        assert!(normalize_corner_points(&three).is_none());
    }

    #[test]
    fn centroid_of_square() {
        let ordered = order_corners(&square_corners()).unwrap();
        assert_eq!(ordered.centroid(), Point::new(5.0, 5.0));
    }
}
