/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/

use crate::structures::Point2D;

/// Shoelace area; positive for counter-clockwise rings, negative for clockwise.
/// The ring may or may not repeat its first vertex.
pub fn signed_polygon_area(vertices: &[Point2D]) -> f64 {
    let num_vertices = vertices.len();
    if num_vertices < 3 {
        return 0f64;
    }

    let mut area = 0f64;
    for i in 0..num_vertices - 1 {
        area += vertices[i].x * vertices[i + 1].y - vertices[i + 1].x * vertices[i].y;
    }
    area +=
        vertices[num_vertices - 1].x * vertices[0].y - vertices[0].x * vertices[num_vertices - 1].y;

    area / 2.0f64
}

#[cfg(test)]
mod test {
    use super::signed_polygon_area;
    use crate::structures::Point2D;

    #[test]
    fn test_closed_polygon_area() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert_eq!(signed_polygon_area(&poly), 25f64);
    }

    #[test]
    fn test_open_clockwise_polygon_area() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 0.0),
        ];
        assert_eq!(signed_polygon_area(&poly), -25f64);
    }

    #[test]
    fn test_degenerate_polygon_area() {
        let line = [Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)];
        assert_eq!(signed_polygon_area(&line), 0f64);
    }
}
