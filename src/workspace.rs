/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use std::fs;
use std::io::Error;
use std::path::{Path, PathBuf};

/// A scratch directory held for the duration of a sweep. Files registered
/// with `track` are removed when the guard is dropped, on success and failure
/// alike, as is the directory itself if the guard created it and it is empty.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: PathBuf,
    created: bool,
    keep_files: bool,
    files: Vec<PathBuf>,
}

impl ScratchWorkspace {
    pub fn acquire(dir: &Path, keep_files: bool) -> Result<ScratchWorkspace, Error> {
        let created = !dir.exists();
        fs::create_dir_all(dir)?;
        Ok(ScratchWorkspace {
            dir: dir.to_path_buf(),
            created,
            keep_files,
            files: vec![],
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A path inside the scratch directory, registered for removal.
    pub fn track(&mut self, file_name: &str) -> PathBuf {
        let path = self.dir.join(file_name);
        if !self.files.contains(&path) {
            self.files.push(path.clone());
        }
        path
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if self.keep_files {
            return;
        }
        for f in &self.files {
            let _ = fs::remove_file(f);
        }
        if self.created {
            // only succeeds when empty
            let _ = fs::remove_dir(&self.dir);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tracked_files_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let scratch_dir = root.path().join("scratch");
        {
            let mut scratch = ScratchWorkspace::acquire(&scratch_dir, false).unwrap();
            let report = scratch.track("VOL_b0.txt");
            fs::write(&report, "x").unwrap();
            assert!(report.exists());
        }
        assert!(!scratch_dir.exists());
    }

    #[test]
    fn test_existing_directory_and_kept_files_survive() {
        let root = tempfile::tempdir().unwrap();
        let report = {
            let mut scratch = ScratchWorkspace::acquire(root.path(), true).unwrap();
            let report = scratch.track("VOL_b0.txt");
            fs::write(&report, "x").unwrap();
            report
        };
        assert!(report.exists());
        {
            let mut scratch = ScratchWorkspace::acquire(root.path(), false).unwrap();
            scratch.track("VOL_b0.txt");
        }
        assert!(!report.exists());
        assert!(root.path().exists());
    }
}
