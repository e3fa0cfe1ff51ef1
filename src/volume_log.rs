/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::fs::OpenOptions;
use std::io::prelude::*;
use std::io::{Error, ErrorKind, SeekFrom};
use std::path::Path;

/// Which values each log line carries after the buffer distance.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFields {
    Volume,
    #[default]
    VolumeAndArea,
}

/// The first line of every log, whichever fields the records carry.
pub const LOG_HEADER: &str = "Buffer Volume";

/// One sweep result: the only state that persists between runs.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeRecord {
    pub buffer: f64,
    pub volume: f64,
    pub area: Option<f64>,
}

impl VolumeRecord {
    /// The record as a log line (without the newline).
    pub fn to_line(&self, fields: LogFields) -> Result<String, Error> {
        match (fields, self.area) {
            (LogFields::Volume, _) => Ok(format!("{} {}", self.buffer, self.volume)),
            (LogFields::VolumeAndArea, Some(area)) => {
                Ok(format!("{} {} {}", self.buffer, self.volume, area))
            }
            (LogFields::VolumeAndArea, None) => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("The record for buffer {} has no area to log.", self.buffer),
            )),
        }
    }

    /// Parses a log line. Two values make a volume-only record, three a
    /// record with an area.
    pub fn parse_line(line: &str) -> Result<VolumeRecord, Error> {
        let tokens = line.split_whitespace().collect::<Vec<&str>>();
        let number = |token: &str| -> Result<f64, Error> {
            match token.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Could not parse '{}' in log line '{}'.", token, line),
                )),
            }
        };
        match tokens.len() {
            2 | 3 => Ok(VolumeRecord {
                buffer: number(tokens[0])?,
                volume: number(tokens[1])?,
                area: match tokens.get(2) {
                    Some(t) => Some(number(t)?),
                    None => None,
                },
            }),
            n => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Expected 2 or 3 values in log line '{}', found {}.", line, n),
            )),
        }
    }
}

/// Appends one record to the log, writing the header first when the file is
/// absent or empty. Existing content is never truncated; a file starting with
/// anything but the header is rejected.
pub fn append_record(log_file: &Path, record: &VolumeRecord, fields: LogFields) -> Result<(), Error> {
    let line = record.to_line(fields)?;
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(log_file)?;
    let len = file.metadata()?.len();

    let mut text = String::new();
    if len == 0 {
        text.push_str(LOG_HEADER);
        text.push('\n');
    } else {
        file.seek(SeekFrom::Start(0))?;
        let mut first_line = String::new();
        std::io::BufReader::new(&file).read_line(&mut first_line)?;
        if first_line.trim() != LOG_HEADER {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "{} starts with '{}' but '{}' was expected.",
                    log_file.display(),
                    first_line.trim(),
                    LOG_HEADER
                ),
            ));
        }
        // finish a line left incomplete by an interrupted write
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            text.push('\n');
        }
    }
    text.push_str(&line);
    text.push('\n');
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Reads every record from a log. A missing or empty log holds no records.
pub fn read_records(log_file: &Path) -> Result<Vec<VolumeRecord>, Error> {
    let contents = match fs::read_to_string(log_file) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    match lines.next() {
        None => Ok(vec![]),
        Some(header) if header.trim() == LOG_HEADER => {
            lines.map(VolumeRecord::parse_line).collect()
        }
        Some(header) => Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "{} starts with '{}' but '{}' was expected.",
                log_file.display(),
                header.trim(),
                LOG_HEADER
            ),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(buffer: f64, volume: f64, area: f64) -> VolumeRecord {
        VolumeRecord {
            buffer,
            volume,
            area: Some(area),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output.txt");
        for b in 0..3 {
            append_record(&log, &record(b as f64 * 10.0, 1.5, 2.0), LogFields::VolumeAndArea).unwrap();
        }
        let text = fs::read_to_string(&log).unwrap();
        assert_eq!(text, "Buffer Volume\n0 1.5 2\n10 1.5 2\n20 1.5 2\n");
        assert_eq!(read_records(&log).unwrap().len(), 3);
    }

    #[test]
    fn test_volume_only_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output.txt");
        fs::write(&log, "").unwrap();
        append_record(&log, &record(5.0, 123.25, 9.0), LogFields::Volume).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "Buffer Volume\n5 123.25\n");
        let records = read_records(&log).unwrap();
        assert_eq!(
            records,
            vec![VolumeRecord {
                buffer: 5.0,
                volume: 123.25,
                area: None
            }]
        );
    }

    #[test]
    fn test_variants_share_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output.txt");
        append_record(&log, &record(0.0, 1.0, 4.0), LogFields::Volume).unwrap();
        append_record(&log, &record(10.0, 2.0, 4.0), LogFields::VolumeAndArea).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "Buffer Volume\n0 1\n10 2 4\n");
        let records = read_records(&log).unwrap();
        assert_eq!(records[0].area, None);
        assert_eq!(records[1].area, Some(4.0));
    }

    #[test]
    fn test_foreign_file_is_not_appended_to() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output.txt");
        fs::write(&log, "Buffer Volume Area\n0 1 2\n").unwrap();
        let err = append_record(&log, &record(10.0, 1.0, 1.0), LogFields::VolumeAndArea).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(fs::read_to_string(&log).unwrap(), "Buffer Volume Area\n0 1 2\n");
        assert_eq!(read_records(&log).unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_incomplete_last_line_is_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("output.txt");
        fs::write(&log, "Buffer Volume\n0 1").unwrap();
        append_record(&log, &record(10.0, 2.0, 0.0), LogFields::Volume).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "Buffer Volume\n0 1\n10 2\n");
    }

    #[test]
    fn test_strict_line_parsing() {
        assert_eq!(VolumeRecord::parse_line("10 2.5").unwrap().area, None);
        assert_eq!(VolumeRecord::parse_line("10 2.5 7").unwrap().area, Some(7.0));
        assert!(VolumeRecord::parse_line("10").is_err());
        assert!(VolumeRecord::parse_line("10 1 2 3").is_err());
        assert!(VolumeRecord::parse_line("10 abc 3").is_err());
        assert!(VolumeRecord::parse_line("10 1,000").is_err());
        assert!(record(1.0, 1.0, 1.0).to_line(LogFields::Volume).is_ok());
        let no_area = VolumeRecord {
            buffer: 1.0,
            volume: 1.0,
            area: None,
        };
        assert!(no_area.to_line(LogFields::VolumeAndArea).is_err());
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_records(&dir.path().join("none.txt")).unwrap().is_empty());
    }
}
