/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use super::signed_polygon_area;
use crate::structures::Point2D;

/// Checks whether a ring of Point2D is in clockwise order. Shapefile outer
/// rings are clockwise; holes are counter-clockwise.
pub fn is_clockwise_order(points: &[Point2D]) -> bool {
    signed_polygon_area(points) < 0f64
}

#[cfg(test)]
mod test {
    use super::is_clockwise_order;
    use crate::structures::Point2D;

    #[test]
    fn test_is_clockwise_order() {
        let cw = [
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(0.0, 0.0),
        ];
        assert!(is_clockwise_order(&cw));

        let ccw: Vec<Point2D> = cw.iter().rev().cloned().collect();
        assert!(!is_clockwise_order(&ccw));
    }

    #[test]
    fn test_concave_ring() {
        // a clockwise 'C' shape
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 6.0),
            Point2D::new(6.0, 6.0),
            Point2D::new(6.0, 4.0),
            Point2D::new(2.0, 4.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(6.0, 2.0),
            Point2D::new(6.0, 0.0),
            Point2D::new(0.0, 0.0),
        ];
        assert!(is_clockwise_order(&poly));
    }
}
