use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ev_core::EventError;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan};

pub(crate) fn resolve_data_dir(data_dir: &str) -> Result<PathBuf, EventError> {
    let path = PathBuf::from(data_dir);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(EventError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("data-dir does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(EventError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("data-dir is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

/// Every `.json` file under `data_dir`, keyed by its `/`-separated relative path.
pub(crate) fn read_data_files_from_dir(
    data_dir: &Path,
) -> Result<BTreeMap<String, String>, EventError> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(data_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let relative = path
            .strip_prefix(data_dir)
            .map_err(map_cli_source_scan)?
            .to_string_lossy()
            .replace('\\', "/");

        let content = fs::read_to_string(path).map_err(map_cli_source_read)?;
        files.insert(relative, content);
    }

    if files.is_empty() {
        return Err(EventError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .json files under {}", data_dir.display()),
        ));
    }

    Ok(files)
}

pub(crate) fn load_data_dir(data_dir: &str) -> Result<BTreeMap<String, String>, EventError> {
    let root = resolve_data_dir(data_dir)?;
    read_data_files_from_dir(&root)
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn resolve_data_dir_validates_existence_and_directory() {
        let missing = temp_path("missing-dir");
        let missing_err = resolve_data_dir(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(missing_err.code, "CLI_SOURCE_NOT_FOUND");

        let file_path = temp_path("plain-file");
        write_file(&file_path, "x");
        let file_err = resolve_data_dir(file_path.to_string_lossy().as_ref())
            .expect_err("file path should fail");
        assert_eq!(file_err.code, "CLI_SOURCE_NOT_DIR");
    }

    #[test]
    fn read_data_files_from_dir_keeps_json_only() {
        let root = temp_path("data-dir");
        write_file(&root.join("CommonEvents.json"), "[null]");
        write_file(&root.join("maps").join("Map001.json"), "{\"events\":[]}");
        write_file(&root.join("notes.txt"), "ignored");

        let files = read_data_files_from_dir(&root).expect("scan should pass");
        assert_eq!(files.len(), 2);
        assert!(files.contains_key("CommonEvents.json"));
        assert!(files.contains_key("maps/Map001.json"));
    }

    #[test]
    fn read_data_files_from_dir_errors_when_no_json_files() {
        let root = temp_path("empty-data-dir");
        write_file(&root.join("readme.txt"), "not data");

        let error =
            read_data_files_from_dir(&root).expect_err("empty data set should return error");
        assert_eq!(error.code, "CLI_SOURCE_EMPTY");
    }
}
