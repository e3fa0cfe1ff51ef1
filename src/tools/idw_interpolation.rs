/*
This tool is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::raster::{Raster, RasterConfigs};
use crate::structures::{BoundingBox, Point2D};
use crate::utils::ProgressReporter;
use crate::vector::{FeatureLayer, FieldData, ShapeType, ShapeTypeDimension};
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use std::cmp::Ordering;
use std::f64;
use std::io::{Error, ErrorKind};

/// A sample point with the value to be interpolated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdwSample {
    pub point: Point2D,
    pub value: f64,
}

/// Inverse-distance weighted gridding of point samples with a variable search
/// radius: each cell centre takes the weighted mean of its `num_neighbours`
/// nearest samples, optionally limited to `max_distance`. Equidistant
/// candidates are ordered by sample index, so the neighbours chosen for a
/// cell never depend on the tree's internal layout.
#[derive(Clone, Debug)]
pub struct IdwInterpolation {
    pub cell_size: f64,
    pub power: f64,
    pub num_neighbours: usize,
    /// Zero means unlimited.
    pub max_distance: f64,
    pub nodata: f64,
    pub verbose: bool,
}

impl Default for IdwInterpolation {
    fn default() -> IdwInterpolation {
        IdwInterpolation {
            cell_size: 204.600412805364,
            power: 2f64,
            num_neighbours: 12,
            max_distance: 0f64,
            nodata: -32768f64,
            verbose: false,
        }
    }
}

impl IdwInterpolation {
    /// Collects the samples of a point layer's active selection, in record
    /// order. Values come from `field_name`, or from the z-values of a
    /// PointZ/MultiPointZ layer when `use_z` is set. Records with null
    /// values are skipped.
    pub fn gather_samples(
        layer: &FeatureLayer,
        field_name: &str,
        use_z: bool,
    ) -> Result<Vec<IdwSample>, Error> {
        let input = &layer.source;
        if input.header.shape_type.base_shape_type() != ShapeType::Point
            && input.header.shape_type.base_shape_type() != ShapeType::MultiPoint
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input vector data must be of point base shape type.",
            ));
        }
        if use_z {
            if input.header.shape_type.dimension() != ShapeTypeDimension::Z {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "The input vector data must be of PointZ or MultiPointZ shape type to use z-values.",
                ));
            }
        } else {
            let field_index = input.attributes.get_field_num(field_name).ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    format!("Attribute {} not found in table of {}.", field_name, layer.name),
                )
            })?;
            if !input.attributes.is_field_numeric(field_index) {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    "Non-numeric attributes cannot be interpolated.",
                ));
            }
        }

        let mut samples = vec![];
        for (record_num, record) in layer.selected_records() {
            if record.shape_type == ShapeType::Null {
                continue;
            }
            let attribute_value = if use_z {
                None
            } else {
                match input.attributes.get_value(record_num, field_name) {
                    FieldData::Int(val) => Some(val as f64),
                    FieldData::Real(val) => Some(val),
                    _ => continue,
                }
            };
            for (i, p) in record.points.iter().enumerate() {
                let value = match attribute_value {
                    Some(v) => v,
                    None => match record.z_array.get(i) {
                        Some(z) => *z,
                        None => continue,
                    },
                };
                if value.is_finite() {
                    samples.push(IdwSample { point: *p, value });
                }
            }
        }
        Ok(samples)
    }

    /// Grid covering the samples' bounding box, anchored at its west and north
    /// edges. Always at least one row and one column.
    pub fn output_configs(&self, samples: &[IdwSample]) -> RasterConfigs {
        let mut bb = BoundingBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for s in samples {
            bb.min_x = bb.min_x.min(s.point.x);
            bb.max_x = bb.max_x.max(s.point.x);
            bb.min_y = bb.min_y.min(s.point.y);
            bb.max_y = bb.max_y.max(s.point.y);
        }
        let rows = ((bb.get_height() / self.cell_size).ceil() as usize).max(1);
        let columns = ((bb.get_width() / self.cell_size).ceil() as usize).max(1);
        RasterConfigs {
            rows,
            columns,
            nodata: self.nodata,
            north: bb.max_y,
            south: bb.max_y - rows as f64 * self.cell_size,
            west: bb.min_x,
            east: bb.min_x + columns as f64 * self.cell_size,
            resolution_x: self.cell_size,
            resolution_y: self.cell_size,
            ..Default::default()
        }
    }

    /// Interpolates the samples onto a new raster named `output_file`. The
    /// raster is returned, not written.
    pub fn run(&self, samples: &[IdwSample], output_file: &str) -> Result<Raster, Error> {
        if samples.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "There are no points to interpolate; the point selection is empty.",
            ));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0f64) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The output cell size must be a positive number.",
            ));
        }
        if self.num_neighbours == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "At least one neighbouring point is required.",
            ));
        }

        const DIMENSIONS: usize = 2;
        const CAPACITY_PER_NODE: usize = 64;
        let mut tree = KdTree::with_capacity(DIMENSIONS, CAPACITY_PER_NODE);
        for (i, s) in samples.iter().enumerate() {
            tree.add([s.point.x, s.point.y], i).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("Could not index point {}: {:?}", s.point, e),
                )
            })?;
        }

        let mut output = Raster::initialize_using_config(output_file, &self.output_configs(samples));
        let rows = output.configs.rows as isize;
        let columns = output.configs.columns as isize;
        let mut progress = ProgressReporter::new("Progress", self.verbose);
        for row in 0..rows {
            let y = output.get_y_from_row(row);
            for col in 0..columns {
                let x = output.get_x_from_column(col);
                let neighbours = self.find_neighbours(&tree, x, y)?;
                if let Some(z) = self.weighted_value(&neighbours, samples) {
                    output.set_value(row, col, z);
                }
            }
            progress.update(row as usize + 1, rows as usize);
        }
        output.update_min_max();
        Ok(output)
    }

    /// The (squared distance, sample index) pairs used for a cell centre,
    /// nearest first, ties broken by index.
    fn find_neighbours(
        &self,
        tree: &KdTree<f64, usize, [f64; 2]>,
        x: f64,
        y: f64,
    ) -> Result<Vec<(f64, usize)>, Error> {
        let to_error = |e: kdtree::ErrorKind| Error::new(ErrorKind::Other, format!("Neighbour search failed: {:?}", e));
        let radius_sq = if self.max_distance > 0f64 {
            self.max_distance * self.max_distance
        } else {
            let nearest = tree
                .nearest(&[x, y], self.num_neighbours, &squared_euclidean)
                .map_err(to_error)?;
            match nearest.last() {
                Some((d, _)) => *d,
                None => return Ok(vec![]),
            }
        };
        // widen slightly so candidates tied with the k-th distance are all seen
        let search_radius = radius_sq * (1f64 + 1e-12) + f64::MIN_POSITIVE;
        let mut candidates: Vec<(f64, usize)> = tree
            .within(&[x, y], search_radius, &squared_euclidean)
            .map_err(to_error)?
            .into_iter()
            .filter(|(d, _)| *d <= radius_sq || self.max_distance <= 0f64)
            .map(|(d, i)| (d, *i))
            .collect();
        candidates.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        candidates.truncate(self.num_neighbours);
        Ok(candidates)
    }

    fn weighted_value(&self, neighbours: &[(f64, usize)], samples: &[IdwSample]) -> Option<f64> {
        if neighbours.is_empty() {
            return None;
        }
        // a sample at the cell centre supplies the value directly
        if neighbours[0].0 == 0f64 {
            return Some(samples[neighbours[0].1].value);
        }
        let mut sum_weights = 0f64;
        let mut sum = 0f64;
        for (dist_sq, i) in neighbours {
            let w = 1f64 / dist_sq.powf(self.power / 2f64);
            sum_weights += w;
            sum += w * samples[*i].value;
        }
        if sum_weights > 0f64 && sum_weights.is_finite() {
            Some(sum / sum_weights)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(x: f64, y: f64, value: f64) -> IdwSample {
        IdwSample {
            point: Point2D::new(x, y),
            value,
        }
    }

    #[test]
    fn test_extent_from_points() {
        let idw = IdwInterpolation {
            cell_size: 100.0,
            ..Default::default()
        };
        let samples = [sample(0.0, 0.0, 1.0), sample(400.0, 400.0, 1.0), sample(250.0, 30.0, 1.0)];
        let configs = idw.output_configs(&samples);
        assert_eq!((configs.rows, configs.columns), (4, 4));
        assert_eq!(configs.west, 0.0);
        assert_eq!(configs.north, 400.0);
        assert_eq!(configs.south, 0.0);

        // a single point still yields one cell
        let configs = idw.output_configs(&[sample(5.0, 5.0, 1.0)]);
        assert_eq!((configs.rows, configs.columns), (1, 1));
    }

    #[test]
    fn test_constant_surface() {
        let idw = IdwInterpolation {
            cell_size: 100.0,
            ..Default::default()
        };
        let samples = [
            sample(0.0, 0.0, -3.5),
            sample(400.0, 0.0, -3.5),
            sample(0.0, 400.0, -3.5),
            sample(400.0, 400.0, -3.5),
        ];
        let r = idw.run(&samples, "idw.asc").unwrap();
        assert_eq!(r.num_valid_cells(), 16);
        for row in 0..4 {
            for col in 0..4 {
                assert!((r.get_value(row, col) + 3.5).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_inverse_square_weights() {
        let idw = IdwInterpolation {
            cell_size: 10.0,
            num_neighbours: 2,
            ..Default::default()
        };
        // cell centre at (5, 5); the two nearest are at squared distances 25 and 50
        let samples = [sample(0.0, 10.0, 10.0), sample(5.0, 0.0, 0.0), sample(10.0, -10.0, 0.0)];
        let r = idw.run(&samples, "idw.asc").unwrap();
        let expected = (10.0 / 50.0 + 0.0 / 25.0) / (1.0 / 50.0 + 1.0 / 25.0);
        assert!((r.get_value(0, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_by_index() {
        let idw = IdwInterpolation {
            cell_size: 10.0,
            num_neighbours: 1,
            ..Default::default()
        };
        // both samples are equidistant from the single cell centre (5, 5)
        let a = [sample(0.0, 0.0, 1.0), sample(10.0, 10.0, 2.0)];
        let b = [sample(10.0, 10.0, 2.0), sample(0.0, 0.0, 1.0)];
        assert_eq!(idw.run(&a, "a.asc").unwrap().get_value(0, 0), 1.0);
        assert_eq!(idw.run(&b, "b.asc").unwrap().get_value(0, 0), 2.0);
    }

    #[test]
    fn test_gather_samples_from_field_and_z() {
        use crate::vector::{AttributeField, Shapefile, ShapefileGeometry};

        let mut sf = Shapefile::new("depths.shp", ShapeType::PointZ).unwrap();
        sf.attributes.add_field(&AttributeField::new("RD03alt", 'N', 10, 2));
        let rows = [(1.0, -4.0, FieldData::Real(2.5)), (2.0, -6.0, FieldData::Null), (3.0, -8.0, FieldData::Int(7))];
        for (x, z, depth) in rows.iter() {
            let mut sfg = ShapefileGeometry::new(ShapeType::PointZ);
            sfg.add_pointz(Point2D::new(*x, 0.0), 0.0, *z);
            sf.add_record(sfg);
            sf.attributes.add_record(vec![depth.clone()], false);
        }
        let layer = FeatureLayer::new("depths", sf);

        let from_field = IdwInterpolation::gather_samples(&layer, "RD03alt", false).unwrap();
        assert_eq!(from_field, vec![sample(1.0, 0.0, 2.5), sample(3.0, 0.0, 7.0)]);
        let from_z = IdwInterpolation::gather_samples(&layer, "RD03alt", true).unwrap();
        assert_eq!(
            from_z.iter().map(|s| s.value).collect::<Vec<f64>>(),
            vec![-4.0, -6.0, -8.0]
        );
        let err = IdwInterpolation::gather_samples(&layer, "DEPTH", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_empty_input_fails() {
        let idw = IdwInterpolation::default();
        let err = idw.run(&[], "idw.asc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("selection is empty"));
    }
}
