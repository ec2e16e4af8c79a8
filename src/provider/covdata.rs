/// File-backed provider for `.covdata` artifacts.
///
/// A `.covdata` file is a JSON document carrying what a symbol engine would
/// otherwise supply at conversion time:
///
///   {
///     "modules": [{
///       "name": "app.exe",
///       "hits": [1, 0, ...],            one byte per block
///       "methods": [{
///         "id": 1, "name": "foo",
///         "undecorated_name": "...", "class_name": "...", "namespace": "...",
///         "ranges": [{"source_file": "a.cpp", "start_line": 10,
///                     "end_line": 12, "block_index": 0, "valid": true}]
///       }]
///     }]
///   }
///
/// Joining keeps the modules of both runs side by side. When two runs hit
/// the same source line differently, the aggregator reconciles the line into
/// `PartiallyCovered`.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    CoverageData, CoverageModule, CoverageProvider, ProviderError, ProviderResult, SymbolReader,
};
use crate::model::MethodRecord;

/// Provider reading `.covdata` artifacts from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct CovdataProvider;

impl CoverageProvider for CovdataProvider {
    type Data = CovdataSet;

    fn load(&self, path: &Path) -> ProviderResult<CovdataSet> {
        let file = File::open(path)?;
        let set: CovdataSet = serde_json::from_reader(BufReader::new(file))?;
        tracing::trace!(path = %path.display(), modules = set.modules.len(), "opened covdata");
        Ok(set)
    }

    fn join(&self, left: &CovdataSet, right: &CovdataSet) -> ProviderResult<CovdataSet> {
        let modules = left
            .modules
            .iter()
            .chain(right.modules.iter())
            .cloned()
            .collect();
        Ok(CovdataSet { modules })
    }
}

/// Coverage of one or more runs, as loaded from `.covdata`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovdataSet {
    pub modules: Vec<CovdataModule>,
}

impl CovdataSet {
    pub fn new(modules: Vec<CovdataModule>) -> Self {
        Self { modules }
    }

    /// Write the set as a `.covdata` artifact.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()
    }
}

impl Drop for CovdataSet {
    fn drop(&mut self) {
        tracing::trace!(modules = self.modules.len(), "released covdata");
    }
}

impl CoverageData for CovdataSet {
    fn modules(&self) -> Vec<&dyn CoverageModule> {
        self.modules
            .iter()
            .map(|m| m as &dyn CoverageModule)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovdataModule {
    pub name: String,
    #[serde(default)]
    pub hits: Vec<u8>,
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
}

impl CoverageModule for CovdataModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn hit_buffer(&self) -> &[u8] {
        &self.hits
    }

    fn symbol_reader(&self) -> ProviderResult<SymbolReader<'_>> {
        Ok(Box::new(
            self.methods
                .iter()
                .cloned()
                .map(Ok::<MethodRecord, ProviderError>),
        ))
    }
}
