//! Serialisation of a combined coverage result.
//!
//! LCOV output, per source file in first-encounter order:
//!
//! ```text
//! SF:<source file>
//! FN:<line>,<function name>
//! DA:<line>,<execution count>
//! LH:<lines hit>
//! LF:<lines found>
//! end_of_record
//! ```
//!
//! `FN` and `DA` records are sorted by line number. The XML output is a plain
//! dump of modules, methods and block ranges with no line aggregation.

use std::fmt::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::aggregate::aggregate;
use crate::error::{ConvertError, Result};
use crate::model::{CoverageStatus, FileRecords};
use crate::provider::{CoverageData, CoverageModule};

/// A report rendered in memory, ready to be persisted.
#[derive(Debug)]
pub struct RenderedReport {
    pub contents: Vec<u8>,
    /// Short human-readable description of what the report contains.
    pub description: String,
}

/// Trait for report serialisers.
pub trait ReportWriter {
    fn render(&self, data: &dyn CoverageData) -> Result<RenderedReport>;
}

/// LCOV line-coverage writer.
pub struct LcovWriter;

impl ReportWriter for LcovWriter {
    fn render(&self, data: &dyn CoverageData) -> Result<RenderedReport> {
        let files = aggregate(data)?;
        let summary = files.summary();
        let description = format!(
            "{} files, {}/{} lines covered ({:.1}%)",
            summary.total_files,
            summary.covered_lines,
            summary.total_lines,
            summary.line_rate() * 100.0
        );
        Ok(RenderedReport {
            contents: format_lcov(&files).into_bytes(),
            description,
        })
    }
}

/// Format aggregated file records as LCOV text.
#[must_use]
pub fn format_lcov(files: &FileRecords) -> String {
    let mut out = String::new();
    for (path, record) in files.iter() {
        writeln!(out, "SF:{path}").unwrap();
        for (line, name) in &record.functions {
            writeln!(out, "FN:{line},{name}").unwrap();
        }
        for (line, status) in &record.covered_lines {
            writeln!(out, "DA:{line},{}", status.execution_count()).unwrap();
        }
        writeln!(out, "LH:{}", record.lines_hit()).unwrap();
        writeln!(out, "LF:{}", record.lines_found()).unwrap();
        out.push_str("end_of_record\n");
    }
    out
}

/// Structured XML dump of the combined coverage.
pub struct XmlWriter;

impl ReportWriter for XmlWriter {
    fn render(&self, data: &dyn CoverageData) -> Result<RenderedReport> {
        let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("CoverageDSPriv")))?;

        let modules = data.modules();
        let mut method_count = 0usize;
        for module in &modules {
            method_count += write_module(&mut writer, *module)?;
        }

        writer.write_event(Event::End(BytesEnd::new("CoverageDSPriv")))?;

        let mut contents = writer.into_inner();
        contents.push(b'\n');
        Ok(RenderedReport {
            contents,
            description: format!("{} modules, {} methods", modules.len(), method_count),
        })
    }
}

fn write_module(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    module: &dyn CoverageModule,
) -> Result<usize> {
    let hits = module.hit_buffer();
    let covered = hits.iter().filter(|&&b| b != 0).count();

    let mut element = BytesStart::new("Module");
    element.push_attribute(("name", module.name()));
    element.push_attribute(("blocks", hits.len().to_string().as_str()));
    element.push_attribute(("blocks_covered", covered.to_string().as_str()));
    writer.write_event(Event::Start(element))?;

    let reader = module
        .symbol_reader()
        .map_err(|e| ConvertError::symbols(module.name(), e))?;

    let mut count = 0;
    for method in reader {
        let method = method.map_err(|e| ConvertError::symbols(module.name(), e))?;

        let mut element = BytesStart::new("Method");
        element.push_attribute(("id", method.id.to_string().as_str()));
        element.push_attribute(("name", method.name.as_str()));
        element.push_attribute(("undecorated_name", method.undecorated_name.as_str()));
        element.push_attribute(("class", method.class_name.as_str()));
        element.push_attribute(("namespace", method.namespace.as_str()));
        writer.write_event(Event::Start(element))?;

        for range in &method.ranges {
            let mut lines = BytesStart::new("Lines");
            lines.push_attribute(("source_file", range.source_file.as_str()));
            lines.push_attribute(("start_line", range.start_line.to_string().as_str()));
            lines.push_attribute(("end_line", range.end_line.to_string().as_str()));
            lines.push_attribute(("block_index", range.block_index.to_string().as_str()));
            let hit = hits.get(range.block_index as usize).filter(|_| range.valid);
            if let Some(&byte) = hit {
                let coverage = match CoverageStatus::from_hit(byte) {
                    CoverageStatus::NotCovered => "not_covered",
                    _ => "covered",
                };
                lines.push_attribute(("coverage", coverage));
            }
            writer.write_event(Event::Empty(lines))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Method")))?;
        count += 1;
    }

    writer.write_event(Event::End(BytesEnd::new("Module")))?;
    Ok(count)
}
