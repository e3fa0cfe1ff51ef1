/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
// private sub-module defined in other files
mod is_clockwise_order;
mod line_ops;
mod poly_area;
mod poly_ops;

// exports identifiers from private sub-modules in the current module namespace
pub use self::is_clockwise_order::is_clockwise_order;
pub use self::line_ops::{point_line_distance, point_polyline_distance, point_segment_distance};
pub use self::poly_area::signed_polygon_area;
pub use self::poly_ops::{point_in_poly, point_on_poly_boundary, winding_number};
