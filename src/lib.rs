/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
extern crate byteorder;

pub mod algorithms;
pub mod configs;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod structures;
pub mod sweep;
pub mod tools;
pub mod utils;
pub mod vector;
pub mod volume_log;
pub mod workspace;

pub use crate::configs::Configs;
pub use crate::error::{PipelineError, Stage};
pub use crate::pipeline::Pipeline;
pub use crate::sweep::{BufferSweep, FailurePolicy, SweepSummary};
pub use crate::volume_log::{LogFields, VolumeRecord};
