#![allow(dead_code)]

use std::path::{Path, PathBuf};

use covconvert::model::{BlockRange, MethodRecord};
use covconvert::provider::covdata::{CovdataModule, CovdataSet};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A method whose blocks all live in `file`; each range is
/// `(start_line, end_line, block_index)`.
pub fn method(name: &str, file: &str, ranges: &[(u32, u32, u32)]) -> MethodRecord {
    MethodRecord {
        id: 1,
        name: name.to_string(),
        ranges: ranges
            .iter()
            .map(|&(start_line, end_line, block_index)| BlockRange {
                source_file: file.to_string(),
                start_line,
                end_line,
                block_index,
                valid: true,
            })
            .collect(),
        ..Default::default()
    }
}

pub fn module(hits: &[u8], methods: Vec<MethodRecord>) -> CovdataModule {
    CovdataModule {
        name: "app.exe".to_string(),
        hits: hits.to_vec(),
        methods,
    }
}

/// Save a single-module artifact under `dir` and return its path.
pub fn write_artifact(dir: &Path, name: &str, module: CovdataModule) -> PathBuf {
    let path = dir.join(name);
    CovdataSet::new(vec![module]).save(&path).unwrap();
    path
}

/// Split an LCOV report into its per-file sections.
pub fn sections(report: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for line in report.lines() {
        current.push(line);
        if line == "end_of_record" {
            out.push(std::mem::take(&mut current));
        }
    }
    assert!(current.is_empty(), "report ends without end_of_record");
    out
}
