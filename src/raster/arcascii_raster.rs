/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use super::{Raster, RasterConfigs};
use std::f64;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::{Error, ErrorKind};

fn bad_header(file_name: &str, line: &str) -> Error {
    Error::new(
        ErrorKind::InvalidData,
        format!("Could not parse line '{}' in {}.", line.trim(), file_name),
    )
}

pub fn read_arcascii(
    file_name: &str,
    configs: &mut RasterConfigs,
    data: &mut Vec<f64>,
) -> Result<(), Error> {
    let f = BufReader::new(File::open(file_name)?);

    let mut xllcenter = f64::NEG_INFINITY;
    let mut yllcenter = f64::NEG_INFINITY;
    let mut xllcorner = f64::NEG_INFINITY;
    let mut yllcorner = f64::NEG_INFINITY;
    configs.nodata = -9999.0;
    data.clear();
    for line in f.lines() {
        let line = line?;
        let vec = line.split_whitespace().collect::<Vec<&str>>();
        if vec.is_empty() {
            continue;
        }
        let key = vec[0].to_lowercase();
        if key.starts_with(|c: char| c.is_ascii_alphabetic()) && key != "nan" {
            if vec.len() < 2 {
                return Err(bad_header(file_name, &line));
            }
            let value = vec[1];
            let as_f64 = || value.parse::<f64>().map_err(|_| bad_header(file_name, &line));
            let as_usize = || value.parse::<usize>().map_err(|_| bad_header(file_name, &line));
            match key.as_str() {
                "nrows" => configs.rows = as_usize()?,
                "ncols" => configs.columns = as_usize()?,
                "xllcorner" => xllcorner = as_f64()?,
                "yllcorner" => yllcorner = as_f64()?,
                "xllcenter" => xllcenter = as_f64()?,
                "yllcenter" => yllcenter = as_f64()?,
                "cellsize" => {
                    configs.resolution_x = as_f64()?;
                    configs.resolution_y = configs.resolution_x;
                }
                "nodata_value" => configs.nodata = as_f64()?,
                _ => return Err(bad_header(file_name, &line)),
            }
        } else {
            // it's a data line
            for val in vec {
                data.push(val.parse::<f64>().map_err(|_| bad_header(file_name, &line))?);
            }
        }
    }

    if data.len() != configs.rows * configs.columns {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "{} declares {} x {} cells but holds {} values.",
                file_name,
                configs.rows,
                configs.columns,
                data.len()
            ),
        ));
    }
    if !(configs.resolution_x > 0f64) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{} is missing a valid CELLSIZE.", file_name),
        ));
    }

    // set the North, East, South, and West coodinates
    if xllcorner.is_finite() && yllcorner.is_finite() {
        configs.west = xllcorner;
        configs.south = yllcorner;
    } else if xllcenter.is_finite() && yllcenter.is_finite() {
        configs.west = xllcenter - 0.5 * configs.resolution_x;
        configs.south = yllcenter - 0.5 * configs.resolution_y;
    } else {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{} is missing its lower-left coordinates.", file_name),
        ));
    }
    configs.east = configs.west + configs.columns as f64 * configs.resolution_x;
    configs.north = configs.south + configs.rows as f64 * configs.resolution_y;

    Ok(())
}

/// Writes the raster using the shortest representation that round-trips each
/// value exactly.
pub fn write_arcascii(r: &mut Raster) -> Result<(), Error> {
    let f = File::create(&r.file_name)?;
    let mut writer = BufWriter::new(f);

    writer.write_all(format!("NCOLS {}\n", r.configs.columns).as_bytes())?;
    writer.write_all(format!("NROWS {}\n", r.configs.rows).as_bytes())?;
    writer.write_all(format!("XLLCORNER {}\n", r.configs.west).as_bytes())?;
    writer.write_all(format!("YLLCORNER {}\n", r.configs.south).as_bytes())?;
    writer.write_all(format!("CELLSIZE {}\n", r.configs.resolution_x).as_bytes())?;
    writer.write_all(format!("NODATA_VALUE {}\n", r.configs.nodata).as_bytes())?;

    let columns = r.configs.columns;
    for row in 0..r.configs.rows {
        let line = (0..columns)
            .map(|col| format!("{}", r.get_value(row as isize, col as isize)))
            .collect::<Vec<String>>()
            .join(" ");
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::super::{Raster, RasterConfigs};
    use std::fs;

    #[test]
    fn test_write_then_read_full_precision() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("surface.asc").to_string_lossy().to_string();
        let configs = RasterConfigs {
            rows: 2,
            columns: 2,
            north: 409.200825610728,
            south: 0.0,
            west: 10.0,
            east: 419.200825610728,
            resolution_x: 204.600412805364,
            resolution_y: 204.600412805364,
            ..Default::default()
        };
        let mut r = Raster::initialize_using_config(&file_name, &configs);
        r.set_value(0, 0, -1.0 / 3.0);
        r.set_value(1, 1, 12.125);
        r.write().unwrap();

        let input = Raster::new(&file_name, "r").unwrap();
        assert_eq!(input.configs.rows, 2);
        assert_eq!(input.configs.resolution_x, 204.600412805364);
        assert_eq!(input.get_value(0, 0), -1.0 / 3.0);
        assert_eq!(input.get_value(1, 1), 12.125);
        assert!(input.is_nodata(input.get_value(0, 1)));
        assert_eq!(input.configs.minimum, -1.0 / 3.0);
    }

    #[test]
    fn test_cell_centre_header_and_bad_counts() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("centre.asc");
        fs::write(
            &file_name,
            "ncols 2\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\nnodata_value -9999\n1 2\n",
        )
        .unwrap();
        let r = Raster::new(&file_name.to_string_lossy(), "r").unwrap();
        assert_eq!(r.configs.west, 0.0);
        assert_eq!(r.configs.north, 10.0);

        fs::write(
            &file_name,
            "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 10\n1 2\n",
        )
        .unwrap();
        assert!(Raster::new(&file_name.to_string_lossy(), "r").is_err());
    }
}
