/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT

Notes: Rasters are held in memory as row-major f64 grids. Row 0 is the
northern-most row. ArcInfo ASCII grids are the only on-disk format.
*/
pub mod arcascii_raster;

use self::arcascii_raster::*;
use crate::structures::BoundingBox;
use std::default::Default;
use std::f64;
use std::io::{Error, ErrorKind};
use std::ops::{Index, IndexMut};
use std::path::Path;

#[derive(Default, Clone, Debug)]
pub struct Raster {
    pub file_name: String,
    file_mode: String,
    pub raster_type: RasterType,
    pub configs: RasterConfigs,
    data: Vec<f64>,
}

impl Index<(isize, isize)> for Raster {
    type Output = f64;

    fn index(&self, index: (isize, isize)) -> &f64 {
        match self.cell_index(index.0, index.1) {
            Some(idx) => &self.data[idx],
            None => &self.configs.nodata,
        }
    }
}

impl IndexMut<(isize, isize)> for Raster {
    fn index_mut(&mut self, index: (isize, isize)) -> &mut f64 {
        match self.cell_index(index.0, index.1) {
            Some(idx) => &mut self.data[idx],
            None => &mut self.configs.nodata,
        }
    }
}

impl Raster {
    /// Opens a raster. `file_mode` "r" reads the file from disk; any other mode
    /// returns an empty raster to be configured with one of the `initialize_*`
    /// functions.
    pub fn new(file_name: &str, file_mode: &str) -> Result<Raster, Error> {
        let fm = file_mode.to_lowercase();
        let raster_type = get_raster_type_from_file(file_name);
        let mut r = Raster {
            file_name: file_name.to_string(),
            file_mode: fm.clone(),
            raster_type,
            ..Default::default()
        };
        if fm.contains('r') {
            match raster_type {
                RasterType::ArcAscii => {
                    read_arcascii(&r.file_name, &mut r.configs, &mut r.data)?;
                    r.update_min_max();
                }
                RasterType::Unknown => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("Unrecognized raster type: {}", file_name),
                    ));
                }
            }
        }
        Ok(r)
    }

    /// Creates a new in-memory raster with the given configuration, filled with nodata.
    pub fn initialize_using_config(file_name: &str, configs: &RasterConfigs) -> Raster {
        let mut output = Raster {
            file_name: file_name.to_string(),
            file_mode: "w".to_string(),
            raster_type: get_raster_type_from_file(file_name),
            configs: configs.clone(),
            ..Default::default()
        };
        output.configs.minimum = f64::INFINITY;
        output.configs.maximum = f64::NEG_INFINITY;
        output.data = vec![output.configs.nodata; output.configs.rows * output.configs.columns];
        output
    }

    /// Creates a new raster sharing the grid and nodata value of `input`.
    pub fn initialize_using_file(file_name: &str, input: &Raster) -> Raster {
        Raster::initialize_using_config(file_name, &input.configs)
    }

    fn cell_index(&self, row: isize, column: isize) -> Option<usize> {
        if row < 0 || column < 0 {
            return None;
        }
        let (r, c) = (row as usize, column as usize);
        if r >= self.configs.rows || c >= self.configs.columns {
            return None;
        }
        Some(r * self.configs.columns + c)
    }

    /// Value at a cell; nodata outside the grid.
    pub fn get_value(&self, row: isize, column: isize) -> f64 {
        self[(row, column)]
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: f64) {
        if let Some(idx) = self.cell_index(row, column) {
            self.data[idx] = value;
        }
    }

    pub fn is_nodata(&self, value: f64) -> bool {
        value == self.configs.nodata || value.is_nan()
    }

    /// Number of cells holding a valid (non-nodata) value.
    pub fn num_valid_cells(&self) -> usize {
        self.data.iter().filter(|v| !self.is_nodata(**v)).count()
    }

    /// The x-coordinate of a column's centre.
    pub fn get_x_from_column(&self, column: isize) -> f64 {
        self.configs.west + self.configs.resolution_x / 2f64
            + column as f64 * self.configs.resolution_x
    }

    /// The y-coordinate of a row's centre.
    pub fn get_y_from_row(&self, row: isize) -> f64 {
        self.configs.north - self.configs.resolution_y / 2f64 - row as f64 * self.configs.resolution_y
    }

    pub fn get_column_from_x(&self, x: f64) -> isize {
        ((x - self.configs.west) / self.configs.resolution_x).floor() as isize
    }

    pub fn get_row_from_y(&self, y: f64) -> isize {
        ((self.configs.north - y) / self.configs.resolution_y).floor() as isize
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            self.configs.west,
            self.configs.east,
            self.configs.south,
            self.configs.north,
        )
    }

    /// Planar area of a single cell.
    pub fn cell_area(&self) -> f64 {
        self.configs.resolution_x * self.configs.resolution_y
    }

    pub fn update_min_max(&mut self) {
        self.configs.minimum = f64::INFINITY;
        self.configs.maximum = f64::NEG_INFINITY;
        for i in 0..self.data.len() {
            let v = self.data[i];
            if !self.is_nodata(v) {
                if v < self.configs.minimum {
                    self.configs.minimum = v;
                }
                if v > self.configs.maximum {
                    self.configs.maximum = v;
                }
            }
        }
    }

    pub fn write(&mut self) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The raster was opened in read-only mode.",
            ));
        }
        self.update_min_max();
        match self.raster_type {
            RasterType::ArcAscii => write_arcascii(self),
            RasterType::Unknown => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized raster type: {}", self.file_name),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterConfigs {
    pub rows: usize,
    pub columns: usize,
    pub nodata: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution_x: f64,
    pub resolution_y: f64,
    pub minimum: f64,
    pub maximum: f64,
}

impl Default for RasterConfigs {
    fn default() -> RasterConfigs {
        RasterConfigs {
            rows: 0,
            columns: 0,
            nodata: -32768.0,
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
            resolution_x: f64::NEG_INFINITY,
            resolution_y: f64::NEG_INFINITY,
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum RasterType {
    #[default]
    Unknown,
    ArcAscii,
}

fn get_raster_type_from_file(file_name: &str) -> RasterType {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "asc" | "txt" => RasterType::ArcAscii,
        _ => RasterType::Unknown,
    }
}
