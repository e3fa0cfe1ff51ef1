/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::configs::Configs;
use crate::error::{PipelineError, Stage, StageContext};
use crate::pipeline::Pipeline;
use crate::utils::get_formatted_elapsed_time;
use crate::volume_log::{read_records, VolumeRecord};
use crate::workspace::ScratchWorkspace;
use serde_derive::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};
use std::str::FromStr;
use std::time::Instant;

/// What the sweep does when an iteration fails.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed iteration.
    #[default]
    Halt,
    /// Report the failure and carry on with the next buffer distance.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<FailurePolicy, Error> {
        match s.trim().to_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "skip" => Ok(FailurePolicy::Skip),
            _ => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized failure policy '{}'; use halt or skip.", s),
            )),
        }
    }
}

/// The outcome of a sweep that ran to completion.
#[derive(Debug, Default)]
pub struct SweepSummary {
    pub completed: Vec<VolumeRecord>,
    /// Only populated under `FailurePolicy::Skip`.
    pub failures: Vec<PipelineError>,
    /// Buffers passed over because the log already held them.
    pub resumed_past: usize,
}

/// Runs the pipeline once per buffer distance in `[start, end)`.
pub struct BufferSweep {
    pub configs: Configs,
    pub resume: bool,
}

impl BufferSweep {
    pub fn new(configs: Configs) -> BufferSweep {
        BufferSweep {
            configs,
            resume: false,
        }
    }

    /// The buffer distances of the sweep, in increasing order.
    pub fn buffers(&self) -> Vec<f64> {
        let c = &self.configs;
        if !(c.sweep_step > 0f64) || !c.sweep_start.is_finite() || !c.sweep_end.is_finite() {
            return vec![];
        }
        let mut ret = vec![];
        let mut i = 0usize;
        loop {
            // computed from the index so rounding does not accumulate
            let b = c.sweep_start + i as f64 * c.sweep_step;
            if b >= c.sweep_end {
                break;
            }
            ret.push(b);
            i += 1;
        }
        ret
    }

    /// Buffers still to run. With `resume`, those at or below the largest
    /// buffer already logged are dropped.
    pub fn pending_buffers(&self, log_records: &[VolumeRecord]) -> Vec<f64> {
        let buffers = self.buffers();
        if !self.resume {
            return buffers;
        }
        match log_records
            .iter()
            .map(|r| r.buffer)
            .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |a| a.max(b))))
        {
            Some(last) => buffers.into_iter().filter(|b| *b > last).collect(),
            None => buffers,
        }
    }

    pub fn run(&self) -> Result<SweepSummary, PipelineError> {
        let configs = &self.configs;
        let verbose = configs.verbose_mode;
        let start = Instant::now();
        let first = self.buffers().first().copied().unwrap_or(configs.sweep_start);
        let pipeline = Pipeline::new(configs).at_stage(first, Stage::Load)?;

        let mut summary = SweepSummary::default();
        let buffers = if self.resume {
            let logged = read_records(&pipeline.log_file())
                .at_stage(first, Stage::Log)?;
            let pending = self.pending_buffers(&logged);
            summary.resumed_past = self.buffers().len() - pending.len();
            if verbose && summary.resumed_past > 0 {
                println!("Resuming after {} logged buffer distances.", summary.resumed_past);
            }
            pending
        } else {
            self.buffers()
        };

        let mut scratch = ScratchWorkspace::acquire(&configs.scratch_dir(), configs.keep_artifacts)
            .at_stage(first, Stage::Load)?;
        let num_buffers = buffers.len();
        for (i, buffer) in buffers.into_iter().enumerate() {
            if verbose {
                println!("start {}", buffer);
            }
            match pipeline.run_iteration(buffer, &mut scratch) {
                Ok(record) => summary.completed.push(record),
                Err(e) => match configs.on_error {
                    FailurePolicy::Halt => return Err(e),
                    FailurePolicy::Skip => {
                        println!("Warning: {}", e);
                        summary.failures.push(e);
                    }
                },
            }
            if verbose {
                println!("Sweep progress: {}%", (100 * (i + 1)) / num_buffers);
            }
        }

        if verbose {
            println!(
                "Completed {} of {} buffer distances.",
                summary.completed.len(),
                num_buffers
            );
            println!("Elapsed Time (Including I/O): {}", get_formatted_elapsed_time(start));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_sweep_is_0_to_490() {
        let sweep = BufferSweep::new(Configs::new());
        let buffers = sweep.buffers();
        assert_eq!(buffers.len(), 50);
        assert_eq!(buffers[0], 0.0);
        assert_eq!(buffers[49], 490.0);
    }

    #[test]
    fn test_fractional_step_excludes_end() {
        let mut configs = Configs::new();
        configs.sweep_start = 0.0;
        configs.sweep_end = 1.0;
        configs.sweep_step = 0.1;
        let buffers = BufferSweep::new(configs).buffers();
        assert_eq!(buffers.len(), 10);
        assert!((buffers[9] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_resume_skips_logged_buffers() {
        let mut sweep = BufferSweep::new(Configs::new());
        let logged = vec![
            VolumeRecord {
                buffer: 0.0,
                volume: 1.0,
                area: Some(1.0),
            },
            VolumeRecord {
                buffer: 20.0,
                volume: 1.0,
                area: Some(1.0),
            },
        ];
        assert_eq!(sweep.pending_buffers(&logged).len(), 50);
        sweep.resume = true;
        let pending = sweep.pending_buffers(&logged);
        assert_eq!(pending.len(), 47);
        assert_eq!(pending[0], 30.0);
        assert_eq!(sweep.pending_buffers(&[]).len(), 50);
    }

    #[test]
    fn test_failure_policy_parsing() {
        assert_eq!("skip".parse::<FailurePolicy>().unwrap(), FailurePolicy::Skip);
        assert_eq!("HALT".parse::<FailurePolicy>().unwrap(), FailurePolicy::Halt);
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
