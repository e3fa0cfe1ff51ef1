/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/

// Shapefile is the only vector format for now.
pub mod shapefile;

pub use self::shapefile::attributes::*;
pub use self::shapefile::geometry::*;
pub use self::shapefile::Shapefile;
pub use crate::structures::Point2D;

use std::io::Error;

/// A named view over a loaded shapefile with an active selection of record
/// indices. The underlying features are never modified; selections only
/// narrow or replace the set of indices.
#[derive(Clone, Debug)]
pub struct FeatureLayer {
    pub name: String,
    pub source: Shapefile,
    selection: Vec<usize>,
}

impl FeatureLayer {
    /// Wraps a shapefile as a layer with every record selected.
    pub fn new(name: &str, source: Shapefile) -> FeatureLayer {
        let selection = (0..source.num_records).collect();
        FeatureLayer {
            name: name.to_string(),
            source,
            selection,
        }
    }

    /// Reads a shapefile from disk and wraps it as a fully selected layer.
    pub fn from_file(name: &str, file_name: &str) -> Result<FeatureLayer, Error> {
        Ok(FeatureLayer::new(name, Shapefile::read(file_name)?))
    }

    /// Record indices of the active selection, in ascending order.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_selection_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Replaces the selection. Out-of-range indices are dropped and the
    /// result is sorted and de-duplicated.
    pub fn set_selection(&mut self, mut indices: Vec<usize>) {
        indices.retain(|i| *i < self.source.num_records);
        indices.sort_unstable();
        indices.dedup();
        self.selection = indices;
    }

    /// Keeps only the selected records for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &ShapefileGeometry) -> bool,
    {
        let source = &self.source;
        self.selection.retain(|&i| keep(i, source.get_record(i)));
    }

    /// Selected records with their indices.
    pub fn selected_records(&self) -> impl Iterator<Item = (usize, &ShapefileGeometry)> + '_ {
        self.selection.iter().map(move |&i| (i, self.source.get_record(i)))
    }

    /// Persists the selected features (geometry, attributes, projection) as a
    /// new shapefile, replacing any file of the same name.
    pub fn write_selection(&self, file_name: &str) -> Result<Shapefile, Error> {
        let mut output = Shapefile::initialize_using_file(
            file_name,
            &self.source,
            self.source.header.shape_type,
            true,
        )?;
        for (i, record) in self.selected_records() {
            output.add_record(record.clone());
            output.attributes.add_record(
                self.source.attributes.get_record(i).to_vec(),
                false,
            );
        }
        output.write()?;
        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn three_points() -> Shapefile {
        let mut sf = Shapefile::new("points.shp", ShapeType::Point).unwrap();
        sf.attributes
            .add_field(&AttributeField::new("ID", 'N', 5, 0));
        for i in 0..3 {
            let mut sfg = ShapefileGeometry::new(ShapeType::Point);
            sfg.add_point(Point2D::new(i as f64, 0.0));
            sf.add_record(sfg);
            sf.attributes.add_record(vec![FieldData::Int(i)], false);
        }
        sf
    }

    #[test]
    fn test_selection_narrowing() {
        let mut layer = FeatureLayer::new("pts", three_points());
        assert_eq!(layer.selection(), &[0, 1, 2]);
        layer.retain(|_, sfg| sfg.points[0].x > 0.5);
        assert_eq!(layer.selection(), &[1, 2]);
        layer.set_selection(vec![2, 2, 7, 0]);
        assert_eq!(layer.selection(), &[0, 2]);
        assert_eq!(layer.selection_count(), 2);
        // the source is untouched by any of this
        assert_eq!(layer.source.num_records, 3);
    }

    #[test]
    fn test_write_selection() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sel.shp").to_string_lossy().to_string();
        let mut layer = FeatureLayer::new("pts", three_points());
        layer.set_selection(vec![1]);
        layer.write_selection(&out).unwrap();
        let read_back = Shapefile::read(&out).unwrap();
        assert_eq!(read_back.num_records, 1);
        assert_eq!(read_back.attributes.get_value(0, "ID"), FieldData::Int(1));
    }
}
