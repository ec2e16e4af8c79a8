//! Projection of block-level hit flags onto source lines.

use crate::error::{ConvertError, Result};
use crate::model::FileRecords;
use crate::provider::{CoverageData, CoverageModule};

/// Walk every module of `data` and build the per-file line records.
pub fn aggregate(data: &dyn CoverageData) -> Result<FileRecords> {
    let mut files = FileRecords::new();
    for module in data.modules() {
        aggregate_module(module, &mut files)?;
    }
    tracing::debug!(files = files.len(), "aggregated line coverage");
    Ok(files)
}

fn aggregate_module(module: &dyn CoverageModule, files: &mut FileRecords) -> Result<()> {
    let hits = module.hit_buffer();
    let reader = module
        .symbol_reader()
        .map_err(|e| ConvertError::symbols(module.name(), e))?;

    let mut methods = 0usize;
    for method in reader {
        let method = method.map_err(|e| ConvertError::symbols(module.name(), e))?;
        // All ranges of a method belong to the file of its first range.
        let Some(first) = method.ranges.first() else {
            continue;
        };
        let record = files.record_mut(&first.source_file);
        record.add_function(first.start_line, &method.name);
        record.add_blocks_coverage(&method.ranges, hits);
        methods += 1;
    }

    tracing::debug!(
        module = module.name(),
        blocks = hits.len(),
        methods,
        "aggregated module"
    );
    Ok(())
}
