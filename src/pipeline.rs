/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::configs::Configs;
use crate::error::{PipelineError, Stage, StageContext};
use crate::tools::{
    extract_by_mask, remove_within_distance, select_by_attribute, select_completely_within,
    IdwInterpolation, SurfaceVolume,
};
use crate::vector::{FeatureLayer, Shapefile};
use crate::volume_log::{append_record, LogFields, VolumeRecord};
use crate::workspace::ScratchWorkspace;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// File names of one iteration's artifacts, namespaced by buffer distance so
/// iterations never share intermediate files.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationArtifacts {
    pub channel_selection: PathBuf,
    pub idw_raster: PathBuf,
    pub clipped_raster: PathBuf,
    /// Relative to the scratch workspace.
    pub report_name: String,
}

/// A filename-safe label for a buffer distance, e.g. `10` or `12_5`.
pub fn buffer_label(buffer: f64) -> String {
    format!("{}", buffer).replace('.', "_").replace('-', "m")
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// The fixed sequence of stages run for each buffer distance.
pub struct Pipeline<'a> {
    configs: &'a Configs,
}

impl<'a> Pipeline<'a> {
    pub fn new(configs: &'a Configs) -> Result<Pipeline<'a>, Error> {
        configs.validate()?;
        Ok(Pipeline { configs })
    }

    pub fn artifacts(&self, buffer: f64) -> IterationArtifacts {
        let workspace = self.configs.workspace_dir();
        let label = buffer_label(buffer);
        IterationArtifacts {
            channel_selection: workspace.join(format!("features_Select_b{}.shp", label)),
            idw_raster: workspace.join(format!("Idw_depths_b{}.asc", label)),
            clipped_raster: workspace.join(format!("Extract_Idw_b{}.asc", label)),
            report_name: format!("VOL_b{}.txt", label),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.configs.in_working_directory(&self.configs.output_file)
    }

    /// Runs every stage for one buffer distance and appends the result to the
    /// log. Nothing is logged unless every earlier stage succeeds.
    pub fn run_iteration(
        &self,
        buffer: f64,
        scratch: &mut ScratchWorkspace,
    ) -> Result<VolumeRecord, PipelineError> {
        let configs = self.configs;
        let verbose = configs.verbose_mode;
        let artifacts = self.artifacts(buffer);

        // Load
        if verbose {
            println!("Reading data...")
        };
        let depths_file = path_string(&configs.in_working_directory(&configs.depths_file));
        let mask_file = path_string(&configs.in_working_directory(&configs.area_mask_file));
        let channels_file = path_string(&configs.in_working_directory(&configs.channels_file));
        let mut depths = FeatureLayer::from_file("depths", &depths_file).at_stage(buffer, Stage::Load)?;
        let mask = Shapefile::read(&mask_file).at_stage(buffer, Stage::Load)?;
        let mut channels =
            FeatureLayer::from_file("channels", &channels_file).at_stage(buffer, Stage::Load)?;
        if verbose && mask.projection.is_empty() {
            println!("Warning: Projection file not located for {}.", mask_file);
        }

        // SpatialFilter
        let within = select_completely_within(&mut depths, &mask, verbose)
            .at_stage(buffer, Stage::SpatialFilter)?;
        if verbose {
            println!("Depth points within the mask: {}", within);
        }

        // AttributeSelect
        select_by_attribute(&mut channels, &configs.channel_predicate(), verbose)
            .at_stage(buffer, Stage::AttributeSelect)?;
        fs::create_dir_all(configs.workspace_dir()).at_stage(buffer, Stage::AttributeSelect)?;
        let selection_file = path_string(&artifacts.channel_selection);
        channels
            .write_selection(&selection_file)
            .at_stage(buffer, Stage::AttributeSelect)?;
        let selected_channels = FeatureLayer::from_file("features_Select", &selection_file)
            .at_stage(buffer, Stage::AttributeSelect)?;

        // ExclusionFilter
        let removed = remove_within_distance(&mut depths, &selected_channels, buffer, verbose)
            .at_stage(buffer, Stage::ExclusionFilter)?;
        if verbose {
            println!(
                "Removed {} depth points within {} of {} channels; {} remain.",
                removed,
                buffer,
                selected_channels.selection_count(),
                depths.selection_count()
            );
        }

        // Interpolate
        if depths.is_selection_empty() {
            return Err(PipelineError::new(
                buffer,
                Stage::Interpolate,
                Error::new(
                    ErrorKind::InvalidInput,
                    format!(
                        "No depth points remain inside the mask after removing points within {} of the selected channels.",
                        buffer
                    ),
                ),
            ));
        }
        let samples = IdwInterpolation::gather_samples(&depths, &configs.depth_field, configs.use_z)
            .at_stage(buffer, Stage::Interpolate)?;
        let idw = IdwInterpolation {
            cell_size: configs.cell_size,
            power: configs.idw_power,
            num_neighbours: configs.idw_neighbours,
            max_distance: configs.idw_max_distance,
            verbose,
            ..Default::default()
        };
        let mut surface = idw
            .run(&samples, &path_string(&artifacts.idw_raster))
            .at_stage(buffer, Stage::Interpolate)?;
        surface.write().at_stage(buffer, Stage::Interpolate)?;

        // Clip
        let mut clipped = extract_by_mask(
            &surface,
            &mask,
            &path_string(&artifacts.clipped_raster),
            verbose,
        )
        .at_stage(buffer, Stage::Clip)?;
        clipped.write().at_stage(buffer, Stage::Clip)?;

        // Integrate
        let result = SurfaceVolume::calculate(
            &clipped,
            configs.reference_plane,
            configs.base_height,
            configs.z_factor,
            verbose,
        )
        .at_stage(buffer, Stage::Integrate)?;
        let report = scratch.track(&artifacts.report_name);
        result.write_report(&report).at_stage(buffer, Stage::Integrate)?;

        // Log
        let record = VolumeRecord {
            buffer,
            volume: result.volume,
            area: match configs.log_fields {
                LogFields::Volume => None,
                LogFields::VolumeAndArea => Some(result.area_2d),
            },
        };
        append_record(&self.log_file(), &record, configs.log_fields)
            .at_stage(buffer, Stage::Log)?;
        if verbose {
            println!("Buffer {}: volume {}, area {}", buffer, result.volume, result.area_2d);
        }
        Ok(record)
    }
}
