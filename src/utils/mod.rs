/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
// private sub-module defined in other files
mod byte_order_reader;

// exports identifiers from private sub-modules in the current module namespace
pub use self::byte_order_reader::ByteOrderReader;
pub use self::byte_order_reader::Endianness;

use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}

/// Formats a number with comma thousands separators and `decimals` decimal places,
/// e.g. `1234567.891` -> `1,234,567.89`.
pub fn format_with_separators(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match s.find('.') {
        Some(i) => (&s[..i], &s[i..]),
        None => (&s[..], ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && s.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, grouped, frac_part)
}

/// Prints progress lines only when the integer percentage changes.
pub struct ProgressReporter {
    label: String,
    verbose: bool,
    old_progress: usize,
}

impl ProgressReporter {
    pub fn new(label: &str, verbose: bool) -> ProgressReporter {
        ProgressReporter {
            label: label.to_string(),
            verbose,
            old_progress: usize::MAX,
        }
    }

    /// `done` of `total` steps have completed.
    pub fn update(&mut self, done: usize, total: usize) {
        if !self.verbose || total == 0 {
            return;
        }
        let progress = (100.0_f64 * done as f64 / total as f64) as usize;
        if progress != self.old_progress {
            println!("{}: {}%", self.label, progress);
            self.old_progress = progress;
        }
    }
}

#[cfg(test)]
mod test {
    use super::format_with_separators;

    #[test]
    fn test_format_with_separators() {
        assert_eq!(format_with_separators(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_with_separators(999.0, 0), "999");
        assert_eq!(format_with_separators(1000.0, 1), "1,000.0");
        assert_eq!(format_with_separators(-12345.5, 1), "-12,345.5");
        assert_eq!(format_with_separators(0.0, 2), "0.00");
    }
}
