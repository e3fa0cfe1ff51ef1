/*
This tool is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::raster::Raster;
use crate::utils::{format_with_separators, ProgressReporter};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::str::FromStr;

pub const REPORT_HEADER: &str = "Dataset Plane_Height Reference Z_Factor Area_2D Area_3D Volume";

/// Which side of the reference plane is integrated.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferencePlane {
    /// The plane lies below the surface; integrates surface minus plane.
    #[default]
    Below,
    /// The plane lies above the surface; integrates plane minus surface.
    Above,
}

impl fmt::Display for ReferencePlane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferencePlane::Below => write!(f, "BELOW"),
            ReferencePlane::Above => write!(f, "ABOVE"),
        }
    }
}

impl FromStr for ReferencePlane {
    type Err = Error;

    fn from_str(s: &str) -> Result<ReferencePlane, Error> {
        match s.trim().to_uppercase().as_str() {
            "BELOW" => Ok(ReferencePlane::Below),
            "ABOVE" => Ok(ReferencePlane::Above),
            _ => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized reference plane '{}'; use BELOW or ABOVE.", s),
            )),
        }
    }
}

/// The result of integrating a surface against a horizontal plane.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceVolume {
    pub dataset: String,
    pub plane_height: f64,
    pub reference: ReferencePlane,
    pub z_factor: f64,
    /// Planar area of all valid cells.
    pub area_2d: f64,
    /// Surface area of all valid cells.
    pub area_3d: f64,
    pub volume: f64,
}

impl SurfaceVolume {
    /// Integrates every valid cell of `input`. Nodata cells contribute to
    /// neither the areas nor the volume. A BELOW plane must lie at or below the
    /// surface minimum and an ABOVE plane at or above its maximum; a plane that
    /// cuts the surface is an `InvalidInput` error.
    pub fn calculate(
        input: &Raster,
        reference: ReferencePlane,
        plane_height: f64,
        z_factor: f64,
        verbose: bool,
    ) -> Result<SurfaceVolume, Error> {
        if !plane_height.is_finite() || !z_factor.is_finite() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The plane height and z-factor must be finite numbers.",
            ));
        }
        let rows = input.configs.rows as isize;
        let columns = input.configs.columns as isize;
        let res_x = input.configs.resolution_x;
        let res_y = input.configs.resolution_y;
        let cell_area = input.cell_area();
        let value_at = |row: isize, col: isize| -> Option<f64> {
            let z = input.get_value(row, col);
            if input.is_nodata(z) {
                None
            } else {
                Some(z * z_factor)
            }
        };
        // central difference where both neighbours are valid, one-sided otherwise
        let slope = |behind: Option<f64>, here: f64, ahead: Option<f64>, spacing: f64| -> f64 {
            match (behind, ahead) {
                (Some(b), Some(a)) => (a - b) / (2f64 * spacing),
                (None, Some(a)) => (a - here) / spacing,
                (Some(b), None) => (here - b) / spacing,
                (None, None) => 0f64,
            }
        };

        let mut area_2d = 0f64;
        let mut area_3d = 0f64;
        let mut volume = 0f64;
        let mut min_z = f64::INFINITY;
        let mut max_z = f64::NEG_INFINITY;
        let mut progress = ProgressReporter::new("Progress", verbose);
        for row in 0..rows {
            for col in 0..columns {
                let z = match value_at(row, col) {
                    Some(z) => z,
                    None => continue,
                };
                area_2d += cell_area;
                let dzdx = slope(value_at(row, col - 1), z, value_at(row, col + 1), res_x);
                // rows increase southward
                let dzdy = slope(value_at(row + 1, col), z, value_at(row - 1, col), res_y);
                area_3d += cell_area * (1f64 + dzdx * dzdx + dzdy * dzdy).sqrt();
                min_z = min_z.min(z);
                max_z = max_z.max(z);
                volume += match reference {
                    ReferencePlane::Below => z - plane_height,
                    ReferencePlane::Above => plane_height - z,
                } * cell_area;
            }
            progress.update(row as usize + 1, rows as usize);
        }

        // the plane must not cut the surface
        match reference {
            ReferencePlane::Below if min_z < plane_height => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "The BELOW reference plane at {} lies above the surface minimum of {}; use a base height of {} or lower.",
                        plane_height, min_z, min_z
                    ),
                ));
            }
            ReferencePlane::Above if max_z > plane_height => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "The ABOVE reference plane at {} lies below the surface maximum of {}; use a base height of {} or higher.",
                        plane_height, max_z, max_z
                    ),
                ));
            }
            _ => {}
        }

        let dataset = Path::new(&input.file_name)
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(SurfaceVolume {
            dataset,
            plane_height,
            reference,
            z_factor,
            area_2d,
            area_3d,
            volume,
        })
    }

    /// The two-line text report: a fixed header, then the values. Areas carry
    /// thousands separators; the volume does not.
    pub fn to_report(&self) -> String {
        format!(
            "{}\n{} {} {} {} {} {} {}\n",
            REPORT_HEADER,
            self.dataset,
            self.plane_height,
            self.reference,
            self.z_factor,
            format_with_separators(self.area_2d, 2),
            format_with_separators(self.area_3d, 2),
            self.volume
        )
    }

    pub fn write_report(&self, file_name: &Path) -> Result<(), Error> {
        fs::write(file_name, self.to_report())
    }

    /// Parses a report produced by `to_report`. The header must match exactly;
    /// values are read from the end of the last line, so the volume is its
    /// last token and the planar area its third-from-last.
    pub fn parse_report(text: &str) -> Result<SurfaceVolume, Error> {
        let bad_report = |msg: String| Error::new(ErrorKind::InvalidData, msg);
        let mut lines = text.lines().map(|l| l.trim()).filter(|l| !l.is_empty());
        let header = lines
            .next()
            .ok_or_else(|| bad_report("The volume report is empty.".to_string()))?;
        if header.split_whitespace().collect::<Vec<&str>>().join(" ") != REPORT_HEADER {
            return Err(bad_report(format!(
                "Unexpected volume report header '{}'.",
                header
            )));
        }
        let last = lines
            .last()
            .ok_or_else(|| bad_report("The volume report holds no values.".to_string()))?;
        let tokens = last.split_whitespace().collect::<Vec<&str>>();
        let n = tokens.len();
        if n < 7 {
            return Err(bad_report(format!(
                "Expected at least 7 fields in volume report line '{}'.",
                last
            )));
        }
        let number = |token: &str, name: &str| -> Result<f64, Error> {
            let v = token.replace(',', "").parse::<f64>().map_err(|_| {
                bad_report(format!("Could not parse {} from '{}'.", name, token))
            })?;
            if v.is_finite() {
                Ok(v)
            } else {
                Err(bad_report(format!("{} is not finite: '{}'.", name, token)))
            }
        };
        if tokens[n - 1].contains(',') {
            return Err(bad_report(format!(
                "The volume '{}' should not contain separators.",
                tokens[n - 1]
            )));
        }
        Ok(SurfaceVolume {
            dataset: tokens[..n - 6].join(" "),
            plane_height: number(tokens[n - 6], "Plane_Height")?,
            reference: tokens[n - 5]
                .parse::<ReferencePlane>()
                .map_err(|e| bad_report(e.to_string()))?,
            z_factor: number(tokens[n - 4], "Z_Factor")?,
            area_2d: number(tokens[n - 3], "Area_2D")?,
            area_3d: number(tokens[n - 2], "Area_3D")?,
            volume: number(tokens[n - 1], "Volume")?,
        })
    }

    pub fn read_report(file_name: &Path) -> Result<SurfaceVolume, Error> {
        SurfaceVolume::parse_report(&fs::read_to_string(file_name)?)
    }
}
