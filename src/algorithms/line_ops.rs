/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/

use crate::structures::Point2D;

/// Perpendicular distance from a point to the infinite line through `start` and `end`.
pub fn point_line_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    if start == end {
        point.distance(start)
    } else {
        let numerator = ((end.x - start.x) * (start.y - point.y)
            - (start.x - point.x) * (end.y - start.y))
            .abs();
        let denominator = start.distance(end);
        numerator / denominator
    }
}

/// Shortest distance from a point to the closed segment `start`-`end`.
pub fn point_segment_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let seg = *end - *start;
    let len_sqr = seg * seg;
    if len_sqr == 0f64 {
        return point.distance(start);
    }
    let t = (*point - *start) * seg / len_sqr;
    if t <= 0f64 {
        point.distance(start)
    } else if t >= 1f64 {
        point.distance(end)
    } else {
        point_line_distance(point, start, end)
    }
}

/// Shortest distance from a point to an open polyline. A single-vertex
/// polyline degenerates to a point distance.
pub fn point_polyline_distance(point: &Point2D, line: &[Point2D]) -> f64 {
    match line.len() {
        0 => f64::INFINITY,
        1 => point.distance(&line[0]),
        _ => {
            let mut min_dist = f64::INFINITY;
            for i in 0..line.len() - 1 {
                let d = point_segment_distance(point, &line[i], &line[i + 1]);
                if d < min_dist {
                    min_dist = d;
                    if min_dist == 0f64 {
                        break;
                    }
                }
            }
            min_dist
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_point_line_distance() {
        let d = point_line_distance(
            &Point2D::new(5.0, 3.0),
            &Point2D::new(0.0, 0.0),
            &Point2D::new(10.0, 0.0),
        );
        assert_eq!(d, 3.0);
    }

    #[test]
    fn test_point_segment_distance_beyond_end() {
        let start = Point2D::new(0.0, 0.0);
        let end = Point2D::new(10.0, 0.0);
        // the projection falls past the end vertex
        assert_eq!(point_segment_distance(&Point2D::new(13.0, 4.0), &start, &end), 5.0);
        assert_eq!(point_segment_distance(&Point2D::new(-3.0, -4.0), &start, &end), 5.0);
        assert_eq!(point_segment_distance(&Point2D::new(4.0, 0.0), &start, &end), 0.0);
    }

    #[test]
    fn test_point_polyline_distance() {
        let line = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
        ];
        assert_eq!(point_polyline_distance(&Point2D::new(12.0, 5.0), &line), 2.0);
        assert_eq!(point_polyline_distance(&Point2D::new(10.0, 10.0), &line), 0.0);
        assert_eq!(point_polyline_distance(&Point2D::new(1.0, 1.0), &[]), f64::INFINITY);
    }
}
