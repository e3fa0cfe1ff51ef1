/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/

// private sub-module defined in other files
mod extract_by_mask;
mod idw_interpolation;
mod select_by_attribute;
mod select_by_location;
mod surface_volume;

// exports identifiers from private sub-modules in the current module namespace
pub use self::extract_by_mask::extract_by_mask;
pub use self::idw_interpolation::{IdwInterpolation, IdwSample};
pub use self::select_by_attribute::select_by_attribute;
pub use self::select_by_location::{
    remove_within_distance, select_completely_within, BOUNDARY_TOLERANCE,
};
pub use self::surface_volume::{ReferencePlane, SurfaceVolume, REPORT_HEADER};
