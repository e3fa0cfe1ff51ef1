/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use std::fmt;
use thiserror::Error;

/// The stages of one sweep iteration, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    SpatialFilter,
    AttributeSelect,
    ExclusionFilter,
    Interpolate,
    Clip,
    Integrate,
    Log,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Stage::Load => "load",
            Stage::SpatialFilter => "spatial filter",
            Stage::AttributeSelect => "attribute select",
            Stage::ExclusionFilter => "exclusion filter",
            Stage::Interpolate => "interpolate",
            Stage::Clip => "clip",
            Stage::Integrate => "integrate",
            Stage::Log => "log",
        };
        write!(f, "{}", s)
    }
}

/// A failed sweep iteration. The message names the buffer distance so the
/// sweep can be resumed from there.
#[derive(Error, Debug)]
#[error("buffer {buffer}: {stage} failed: {source}")]
pub struct PipelineError {
    pub buffer: f64,
    pub stage: Stage,
    #[source]
    pub source: std::io::Error,
}

impl PipelineError {
    pub fn new(buffer: f64, stage: Stage, source: std::io::Error) -> PipelineError {
        PipelineError {
            buffer,
            stage,
            source,
        }
    }
}

/// Attaches the buffer and stage to an I/O result.
pub trait StageContext<T> {
    fn at_stage(self, buffer: f64, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> StageContext<T> for Result<T, std::io::Error> {
    fn at_stage(self, buffer: f64, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::new(buffer, stage, e))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_error_display_names_buffer_and_stage() {
        let err = PipelineError::new(
            30.0,
            Stage::Interpolate,
            Error::new(ErrorKind::InvalidInput, "no points"),
        );
        assert_eq!(err.to_string(), "buffer 30: interpolate failed: no points");
    }

    #[test]
    fn test_stage_context() {
        let res: Result<(), Error> = Err(Error::new(ErrorKind::NotFound, "depths.shp"));
        let err = res.at_stage(12.5, Stage::Load).unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert_eq!(err.buffer, 12.5);
        assert_eq!(err.source.kind(), ErrorKind::NotFound);
    }
}
