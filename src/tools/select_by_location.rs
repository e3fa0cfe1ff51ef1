/*
This tool is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::structures::BoundingBox;
use crate::utils::ProgressReporter;
use crate::vector::{FeatureLayer, ShapeType, Shapefile, ShapefileGeometry};
use std::f64;
use std::io::{Error, ErrorKind};

/// Points closer than this to a mask edge count as touching the boundary.
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Narrows a layer's selection to features lying completely inside the
/// polygons of `mask`. Every vertex must be strictly inside some mask polygon;
/// vertices on a mask boundary or inside a hole disqualify the feature.
/// Returns the number of features still selected.
pub fn select_completely_within(
    layer: &mut FeatureLayer,
    mask: &Shapefile,
    verbose: bool,
) -> Result<usize, Error> {
    if mask.header.shape_type.base_shape_type() != ShapeType::Polygon {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "The mask {} must be of polygon base shape type.",
                mask.get_short_filename()
            ),
        ));
    }
    let polygons: Vec<(&ShapefileGeometry, BoundingBox)> = mask
        .records
        .iter()
        .filter(|sfg| sfg.shape_type != ShapeType::Null && !sfg.points.is_empty())
        .map(|sfg| (sfg, sfg.get_bounding_box()))
        .collect();

    let total = layer.selection_count();
    let mut progress = ProgressReporter::new("Selecting within mask", verbose);
    let mut n = 0usize;
    layer.retain(|_, feature| {
        n += 1;
        progress.update(n, total);
        if feature.points.is_empty() {
            return false;
        }
        polygons.iter().any(|(poly, bb)| {
            feature.points.iter().all(|p| {
                bb.is_point_in_box(p.x, p.y)
                    && poly.contains_point(p)
                    && !poly.is_on_boundary(p, BOUNDARY_TOLERANCE)
            })
        })
    });
    Ok(layer.selection_count())
}

/// Removes from a layer's selection every feature with a vertex within
/// `distance` (inclusive) of any selected feature of `near`. With a distance
/// of zero, only features touching a `near` feature are removed. Returns the
/// number of features removed.
pub fn remove_within_distance(
    layer: &mut FeatureLayer,
    near: &FeatureLayer,
    distance: f64,
    verbose: bool,
) -> Result<usize, Error> {
    if !distance.is_finite() || distance < 0f64 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("The search distance must be a non-negative number, found {}.", distance),
        ));
    }
    let targets: Vec<(&ShapefileGeometry, BoundingBox)> = near
        .selected_records()
        .filter(|(_, sfg)| sfg.shape_type != ShapeType::Null && !sfg.points.is_empty())
        .map(|(_, sfg)| {
            let mut bb = sfg.get_bounding_box();
            bb.expand_by(distance);
            (sfg, bb)
        })
        .collect();

    let before = layer.selection_count();
    let mut progress = ProgressReporter::new("Removing features near channels", verbose);
    let mut n = 0usize;
    layer.retain(|_, feature| {
        n += 1;
        progress.update(n, before);
        !feature.points.iter().any(|p| {
            targets
                .iter()
                .any(|(target, bb)| bb.is_point_in_box(p.x, p.y) && target.distance_to_point(p) <= distance)
        })
    });
    Ok(before - layer.selection_count())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Point2D;
    use crate::vector::{AttributeField, FieldData};

    fn points(coords: &[(f64, f64)]) -> FeatureLayer {
        let mut sf = Shapefile::new("pts.shp", ShapeType::Point).unwrap();
        sf.attributes.add_field(&AttributeField::new("ID", 'N', 5, 0));
        for (i, (x, y)) in coords.iter().enumerate() {
            let mut sfg = ShapefileGeometry::new(ShapeType::Point);
            sfg.add_point(Point2D::new(*x, *y));
            sf.add_record(sfg);
            sf.attributes.add_record(vec![FieldData::Int(i as i32)], false);
        }
        FeatureLayer::new("pts", sf)
    }

    fn square_mask(size: f64) -> Shapefile {
        let mut sf = Shapefile::new("mask.shp", ShapeType::Polygon).unwrap();
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        sfg.add_part(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, size),
            Point2D::new(size, size),
            Point2D::new(size, 0.0),
            Point2D::new(0.0, 0.0),
        ]);
        sf.add_record(sfg);
        sf.attributes.add_record(vec![], false);
        sf
    }

    fn channel_layer(lines: &[[(f64, f64); 2]]) -> FeatureLayer {
        let mut sf = Shapefile::new("chan.shp", ShapeType::PolyLine).unwrap();
        for line in lines {
            let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
            sfg.add_part(&[
                Point2D::new(line[0].0, line[0].1),
                Point2D::new(line[1].0, line[1].1),
            ]);
            sf.add_record(sfg);
            sf.attributes.add_record(vec![], false);
        }
        FeatureLayer::new("chan", sf)
    }

    #[test]
    fn test_boundary_points_are_not_within() {
        let mut layer = points(&[(5.0, 5.0), (0.0, 5.0), (10.0, 10.0), (11.0, 5.0)]);
        let n = select_completely_within(&mut layer, &square_mask(10.0), false).unwrap();
        assert_eq!(n, 1);
        assert_eq!(layer.selection(), &[0]);
    }

    #[test]
    fn test_mask_must_be_polygon() {
        let mut layer = points(&[(5.0, 5.0)]);
        let not_a_mask = points(&[(0.0, 0.0)]).source;
        assert!(select_completely_within(&mut layer, &not_a_mask, false).is_err());
    }

    #[test]
    fn test_zero_distance_removes_only_coincident_points() {
        let mut layer = points(&[(5.0, 0.0), (5.0, 0.001), (20.0, 0.0)]);
        let chan = channel_layer(&[[(0.0, 0.0), (10.0, 0.0)]]);
        let removed = remove_within_distance(&mut layer, &chan, 0.0, false).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(layer.selection(), &[1, 2]);
    }

    #[test]
    fn test_distance_is_inclusive_and_monotonic() {
        let coords = [(5.0, 5.0), (5.0, 10.0), (5.0, 20.0), (5.0, 40.0)];
        let chan = channel_layer(&[[(0.0, 0.0), (10.0, 0.0)]]);
        let mut last = usize::MAX;
        for d in [0.0, 5.0, 10.0, 20.0, 50.0] {
            let mut layer = points(&coords);
            remove_within_distance(&mut layer, &chan, d, false).unwrap();
            assert!(layer.selection_count() <= last);
            last = layer.selection_count();
        }
        let mut layer = points(&coords);
        remove_within_distance(&mut layer, &chan, 10.0, false).unwrap();
        assert_eq!(layer.selection(), &[2, 3]);
    }

    #[test]
    fn test_only_selected_channels_count() {
        let mut layer = points(&[(5.0, 1.0)]);
        let mut chan = channel_layer(&[[(0.0, 0.0), (10.0, 0.0)]]);
        chan.set_selection(vec![]);
        assert_eq!(remove_within_distance(&mut layer, &chan, 5.0, false).unwrap(), 0);
        assert!(remove_within_distance(&mut layer, &chan, -1.0, false).is_err());
        assert!(remove_within_distance(&mut layer, &chan, f64::NAN, false).is_err());
    }
}
