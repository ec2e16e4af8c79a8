/// Selection of the report format from the destination path.
///
/// Strategy:
///   1. An explicit `--format` wins (handled by caller)
///   2. A file name ending in `.xml` (any case) selects the XML dump
///   3. Everything else is written as LCOV
use std::path::Path;

use clap::ValueEnum;

use crate::report::{LcovWriter, ReportWriter, XmlWriter};

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Lcov,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Lcov => "lcov",
            Format::Xml => "xml",
        }
    }

    pub fn writer(&self) -> Box<dyn ReportWriter> {
        match self {
            Format::Lcov => Box::new(LcovWriter),
            Format::Xml => Box::new(XmlWriter),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the report format from the destination file name.
pub fn detect_format(path: &Path) -> Format {
    let is_xml = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".xml"));
    if is_xml {
        Format::Xml
    } else {
        Format::Lcov
    }
}
