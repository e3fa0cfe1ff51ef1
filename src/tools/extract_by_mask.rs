/*
This tool is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::raster::Raster;
use crate::structures::Point2D;
use crate::utils::ProgressReporter;
use crate::vector::{ShapeType, Shapefile};
use std::io::{Error, ErrorKind};

/// Clips a raster to the polygons of a mask. The output keeps the input's
/// grid; a cell keeps its value when its centre falls inside a mask polygon
/// (outside any hole), and every other cell becomes nodata. Returns the
/// clipped raster, not yet written, named `output_file`.
pub fn extract_by_mask(
    input: &Raster,
    mask: &Shapefile,
    output_file: &str,
    verbose: bool,
) -> Result<Raster, Error> {
    if mask.header.shape_type.base_shape_type() != ShapeType::Polygon {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "The mask vector data must be of polygon base shape type.",
        ));
    }

    let mut output = Raster::initialize_using_file(output_file, input);
    let nodata = input.configs.nodata;
    let rows = input.configs.rows as isize;
    let columns = input.configs.columns as isize;
    let num_records = mask.num_records;
    let mut progress = ProgressReporter::new("Progress", verbose);
    for (record_num, record) in mask.records.iter().enumerate() {
        if record.shape_type == ShapeType::Null || record.points.is_empty() {
            continue;
        }
        // only scan the rows and columns under the record's extent
        let bb = record.get_bounding_box();
        let starting_row = input.get_row_from_y(bb.max_y).max(0);
        let ending_row = input.get_row_from_y(bb.min_y).min(rows - 1);
        let starting_col = input.get_column_from_x(bb.min_x).max(0);
        let ending_col = input.get_column_from_x(bb.max_x).min(columns - 1);
        for row in starting_row..=ending_row {
            let y = input.get_y_from_row(row);
            for col in starting_col..=ending_col {
                let z = input.get_value(row, col);
                if z == nodata || output.get_value(row, col) != nodata {
                    continue;
                }
                let x = input.get_x_from_column(col);
                if record.contains_point(&Point2D::new(x, y)) {
                    output.set_value(row, col, z);
                }
            }
        }
        progress.update(record_num + 1, num_records);
    }
    output.update_min_max();
    Ok(output)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::raster::RasterConfigs;
    use crate::vector::ShapefileGeometry;

    fn ramp() -> Raster {
        let configs = RasterConfigs {
            rows: 4,
            columns: 4,
            north: 40.0,
            south: 0.0,
            west: 0.0,
            east: 40.0,
            resolution_x: 10.0,
            resolution_y: 10.0,
            ..Default::default()
        };
        let mut r = Raster::initialize_using_config("ramp.asc", &configs);
        for row in 0..4 {
            for col in 0..4 {
                r.set_value(row, col, (row * 4 + col) as f64);
            }
        }
        r
    }

    fn mask_with_hole() -> Shapefile {
        let mut sf = Shapefile::new("mask.shp", ShapeType::Polygon).unwrap();
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        // clockwise outer ring covering the centres of the upper-left 3 x 3 block
        sfg.add_part(&[
            Point2D::new(0.0, 10.0),
            Point2D::new(0.0, 40.0),
            Point2D::new(30.0, 40.0),
            Point2D::new(30.0, 10.0),
            Point2D::new(0.0, 10.0),
        ]);
        // counter-clockwise hole around the centre of cell (1, 1)
        sfg.add_part(&[
            Point2D::new(12.0, 22.0),
            Point2D::new(18.0, 22.0),
            Point2D::new(18.0, 28.0),
            Point2D::new(12.0, 28.0),
            Point2D::new(12.0, 22.0),
        ]);
        sf.add_record(sfg);
        sf.attributes.add_record(vec![], false);
        sf
    }

    #[test]
    fn test_clip_keeps_grid_and_sets_nodata() {
        let input = ramp();
        let output = extract_by_mask(&input, &mask_with_hole(), "clip.asc", false).unwrap();
        assert_eq!(output.configs.rows, 4);
        assert_eq!(output.configs.columns, 4);
        assert_eq!(output.num_valid_cells(), 8);
        assert_eq!(output.get_value(0, 0), 0.0);
        assert_eq!(output.get_value(2, 2), 10.0);
        assert!(output.is_nodata(output.get_value(1, 1)));
        assert!(output.is_nodata(output.get_value(3, 0)));
        assert!(output.is_nodata(output.get_value(0, 3)));
    }

    #[test]
    fn test_mask_outside_raster() {
        let mut sf = Shapefile::new("mask.shp", ShapeType::Polygon).unwrap();
        let mut sfg = ShapefileGeometry::new(ShapeType::Polygon);
        sfg.add_part(&[
            Point2D::new(100.0, 100.0),
            Point2D::new(100.0, 200.0),
            Point2D::new(200.0, 200.0),
            Point2D::new(100.0, 100.0),
        ]);
        sf.add_record(sfg);
        sf.attributes.add_record(vec![], false);
        let output = extract_by_mask(&ramp(), &sf, "clip.asc", false).unwrap();
        assert_eq!(output.num_valid_cells(), 0);
    }
}
