use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{EvToolError, TestCase, TESTCASE_SCHEMA_V1};

/// Project data files under a demo directory. `testcase.json` is left out.
pub fn read_data_files_from_dir(
    demo_dir: &Path,
) -> Result<BTreeMap<String, String>, EvToolError> {
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(demo_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json")
            || path.file_name().and_then(|name| name.to_str()) == Some("testcase.json")
        {
            continue;
        }

        let Ok(relative) = path.strip_prefix(demo_dir) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        let content = fs::read_to_string(path).map_err(|source| EvToolError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        files.insert(relative, content);
    }

    if files.is_empty() {
        return Err(EvToolError::SourceEmpty {
            path: demo_dir.to_path_buf(),
        });
    }

    Ok(files)
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, EvToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| EvToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| EvToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(EvToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}
