/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/

use super::point_segment_distance;
use crate::structures::Point2D;

/// Tests if a point is Left|On|Right of an infinite line,
/// based on http://geomalgorithms.com/a03-_inclusion.html.
///
/// Return: > 0 for p2 left of the line through p0 and p1
///         = 0 for p2 on the line through p0 and p1
///         < 0 for p2 right of the line through p0 and p1
fn is_left(p0: &Point2D, p1: &Point2D, p2: &Point2D) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Index pairs of the ring's edges. A ring that does not repeat its first
/// vertex is closed implicitly.
fn ring_edges(poly: &[Point2D]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = poly.len();
    let closed = n > 1 && poly[0].nearly_equals(&poly[n - 1]);
    let num_edges = if n < 2 {
        0
    } else if closed {
        n - 1
    } else {
        n
    };
    (0..num_edges).map(move |i| (i, (i + 1) % n))
}

/// Tests whether a point is within a polygon ring using the winding number.
/// Points exactly on an edge may fall either way; use
/// `point_on_poly_boundary` where the boundary matters.
pub fn point_in_poly(p: &Point2D, poly: &[Point2D]) -> bool {
    winding_number(p, poly) != 0i32
}

/// Calculates the winding number (wn) of a ring around a point. The point
/// falls within the ring if the winding number is non-zero.
pub fn winding_number(p: &Point2D, poly: &[Point2D]) -> i32 {
    let mut wn = 0i32;
    for (i, j) in ring_edges(poly) {
        if poly[i].y <= p.y {
            // an upward crossing with p left of edge
            if poly[j].y > p.y && is_left(&poly[i], &poly[j], p) > 0f64 {
                wn += 1i32;
            }
        } else if poly[j].y <= p.y && is_left(&poly[i], &poly[j], p) < 0f64 {
            // a downward crossing with p right of edge
            wn -= 1i32;
        }
    }
    wn
}

/// True if the point lies on one of the ring's edges (within `tolerance`).
pub fn point_on_poly_boundary(p: &Point2D, poly: &[Point2D], tolerance: f64) -> bool {
    ring_edges(poly).any(|(i, j)| point_segment_distance(p, &poly[i], &poly[j]) <= tolerance)
}
