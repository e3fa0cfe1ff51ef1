/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::sweep::FailurePolicy;
use crate::tools::ReferencePlane;
use crate::volume_log::LogFields;
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// A structure to hold environment settings. Backed by a settings.json file in
/// the current directory; any field missing from the file takes its default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Configs {
    pub verbose_mode: bool,
    /// Directory holding the source datasets and the cumulative log.
    pub working_directory: String,
    /// Directory for per-iteration artifacts; empty means the working directory.
    pub workspace: String,
    /// Directory for transient reports; empty means `<workspace>/scratch`.
    pub scratch_workspace: String,
    pub depths_file: String,
    pub area_mask_file: String,
    pub channels_file: String,
    pub depth_field: String,
    /// Take depths from PointZ z-values rather than `depth_field`.
    pub use_z: bool,
    pub channel_type_field: String,
    pub channel_types: Vec<String>,
    /// Custom selection expression; overrides `channel_type_field`/`channel_types` when set.
    pub channel_statement: String,
    pub cell_size: f64,
    pub idw_power: f64,
    pub idw_neighbours: usize,
    /// Maximum neighbour search distance; 0 for unlimited.
    pub idw_max_distance: f64,
    pub reference_plane: ReferencePlane,
    pub base_height: f64,
    pub z_factor: f64,
    pub output_file: String,
    pub log_fields: LogFields,
    pub sweep_start: f64,
    pub sweep_end: f64,
    pub sweep_step: f64,
    pub on_error: FailurePolicy,
    /// Keep the per-iteration report files in the scratch workspace.
    pub keep_artifacts: bool,
}

impl Default for Configs {
    fn default() -> Configs {
        Configs {
            verbose_mode: true,
            working_directory: String::new(),
            workspace: String::new(),
            scratch_workspace: String::new(),
            depths_file: "depths.shp".to_string(),
            area_mask_file: "area_mask.shp".to_string(),
            channels_file: "features.shp".to_string(),
            depth_field: "RD03alt".to_string(),
            use_z: false,
            channel_type_field: "CHAN_TYPE".to_string(),
            channel_types: vec!["SUPPLY".to_string(), "ESCAPE".to_string()],
            channel_statement: String::new(),
            cell_size: 204.600412805364,
            idw_power: 2.0,
            idw_neighbours: 12,
            idw_max_distance: 0.0,
            reference_plane: ReferencePlane::Below,
            base_height: 0.0,
            z_factor: 1.0,
            output_file: "output.txt".to_string(),
            log_fields: LogFields::VolumeAndArea,
            sweep_start: 0.0,
            sweep_end: 500.0,
            sweep_step: 10.0,
            on_error: FailurePolicy::Halt,
            keep_artifacts: false,
        }
    }
}

impl Configs {
    pub fn new() -> Configs {
        Configs::default()
    }

    /// Resolves a file name against the working directory unless it is absolute.
    pub fn in_working_directory(&self, file_name: &str) -> PathBuf {
        let p = Path::new(file_name);
        if p.is_absolute() || self.working_directory.is_empty() {
            p.to_path_buf()
        } else {
            Path::new(&self.working_directory).join(p)
        }
    }

    pub fn workspace_dir(&self) -> PathBuf {
        if self.workspace.is_empty() {
            if self.working_directory.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(&self.working_directory)
            }
        } else {
            self.in_working_directory(&self.workspace)
        }
    }

    pub fn scratch_dir(&self) -> PathBuf {
        if self.scratch_workspace.is_empty() {
            self.workspace_dir().join("scratch")
        } else {
            self.in_working_directory(&self.scratch_workspace)
        }
    }

    /// The attribute predicate used to select channel features.
    pub fn channel_predicate(&self) -> String {
        if !self.channel_statement.trim().is_empty() {
            return self.channel_statement.clone();
        }
        self.channel_types
            .iter()
            .map(|t| format!("{} == \"{}\"", self.channel_type_field, t.replace('"', "")))
            .collect::<Vec<String>>()
            .join(" || ")
    }

    /// Checks the numeric parameters before any work starts.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: &str| Err(Error::new(ErrorKind::InvalidInput, msg.to_string()));
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return invalid("The cell size must be a positive number.");
        }
        if !(self.idw_power.is_finite() && self.idw_power > 0.0) {
            return invalid("The IDW power must be a positive number.");
        }
        if self.idw_neighbours == 0 {
            return invalid("The IDW neighbourhood must contain at least one point.");
        }
        if !(self.idw_max_distance.is_finite() && self.idw_max_distance >= 0.0) {
            return invalid("The IDW maximum search distance must be zero or positive.");
        }
        if !self.z_factor.is_finite() || !self.base_height.is_finite() {
            return invalid("The plane height and z-factor must be finite.");
        }
        if !(self.sweep_step.is_finite() && self.sweep_step > 0.0) {
            return invalid("The sweep step must be a positive number.");
        }
        if !(self.sweep_start.is_finite() && self.sweep_start >= 0.0) || !self.sweep_end.is_finite() {
            return invalid("The sweep start must be zero or positive and the end finite.");
        }
        if self.channel_statement.trim().is_empty() && self.channel_types.is_empty() {
            return invalid("No channel types were specified for selection.");
        }
        Ok(())
    }
}

fn config_file_path() -> Result<PathBuf, Error> {
    Ok(std::env::current_dir()?.join("settings.json"))
}

/// Reads settings.json from the current directory, falling back to the
/// defaults if there is no such file.
pub fn get_configs() -> Result<Configs, Error> {
    read_configs(&config_file_path()?)
}

pub fn read_configs(config_file: &Path) -> Result<Configs, Error> {
    match fs::read_to_string(config_file) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", config_file.display(), e),
            )
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Configs::new()),
        Err(e) => Err(e),
    }
}

pub fn write_configs(configs: &Configs, config_file: &Path) -> Result<(), Error> {
    let configs_json = serde_json::to_string_pretty(configs)
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
    let mut file = File::create(config_file)?;
    file.write_all(configs_json.as_bytes())?;
    Ok(())
}
