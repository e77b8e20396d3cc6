//! Input file resolution.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::EtlError;
use crate::report::REPORT_FILE_NAMES;

/// Whether `path` names one of the reports this crate writes.
#[must_use]
pub fn is_report_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    REPORT_FILE_NAMES.iter().any(|report| name.ends_with(report))
}

/// Resolve the run's input files.
///
/// Report outputs are excluded. A directory expands to the `*.csv` files it
/// contains, in name order. Every remaining path must exist.
///
/// # Errors
///
/// [`EtlError::MissingInput`] for a path that does not exist,
/// [`EtlError::NoInputFiles`] if nothing is left, [`EtlError::Io`] if a
/// directory cannot be listed.
pub fn resolve_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, EtlError> {
    let mut inputs = Vec::new();

    for path in paths {
        if is_report_file(path) {
            debug!(path = %path.display(), "Skipping report file");
            continue;
        }
        if !path.exists() {
            error!(path = %path.display(), "No such file");
            return Err(EtlError::MissingInput { path: path.clone() });
        }
        if path.is_dir() {
            inputs.extend(csv_files_in(path)?);
        } else {
            inputs.push(path.clone());
        }
    }

    if inputs.is_empty() {
        return Err(EtlError::NoInputFiles);
    }
    Ok(inputs)
}

fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>, EtlError> {
    let entries = fs::read_dir(dir).map_err(|e| EtlError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EtlError::io(dir, e))?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv && !is_report_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_report_files_are_recognized() {
        assert!(is_report_file(Path::new("out/PRICE.csv")));
        assert!(is_report_file(Path::new("GAINS.csv")));
        assert!(is_report_file(Path::new("VOLUME.csv")));
        assert!(!is_report_file(Path::new("D0.csv")));
    }

    #[test]
    fn test_no_paths_is_fatal() {
        assert!(matches!(resolve_inputs(&[]), Err(EtlError::NoInputFiles)));
    }

    #[test]
    fn test_only_reports_is_fatal() {
        let paths = vec![PathBuf::from("PRICE.csv"), PathBuf::from("GAINS.csv")];
        assert!(matches!(resolve_inputs(&paths), Err(EtlError::NoInputFiles)));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("D0.csv");
        File::create(&present).unwrap();
        let missing = dir.path().join("D1.csv");

        let result = resolve_inputs(&[present, missing.clone()]);
        match result {
            Err(EtlError::MissingInput { path }) => assert_eq!(path, missing),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_expands_to_sorted_csv_files() {
        let dir = tempdir().unwrap();
        for name in ["D1.csv", "D0.csv", "PRICE.csv", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let inputs = resolve_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["D0.csv", "D1.csv"]);
    }
}
