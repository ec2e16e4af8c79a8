//! The coverage provider boundary.
//!
//! A provider knows how to load a measurement artifact, how to join two
//! loaded results, and how to expose each module's hit buffer and symbols.
//! Loaded results are owned values: dropping one releases whatever native or
//! file-backed resources it holds.

pub mod covdata;

use std::path::Path;

use crate::model::MethodRecord;

/// Error type providers report. The merger attaches the artifact path.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Enumerates the methods of one module together with their block ranges.
pub type SymbolReader<'a> = Box<dyn Iterator<Item = ProviderResult<MethodRecord>> + 'a>;

/// Loads and joins coverage results. Joins are not assumed to be safe to run
/// concurrently.
pub trait CoverageProvider {
    type Data: CoverageData;

    /// Load a single measurement artifact.
    fn load(&self, path: &Path) -> ProviderResult<Self::Data>;

    /// Produce a new result combining `left` and `right`. Both operands stay
    /// owned by the caller, which is responsible for dropping them.
    fn join(&self, left: &Self::Data, right: &Self::Data) -> ProviderResult<Self::Data>;
}

/// A loaded or joined coverage result.
pub trait CoverageData {
    fn modules(&self) -> Vec<&dyn CoverageModule>;
}

/// One instrumented binary inside a coverage result.
pub trait CoverageModule {
    fn name(&self) -> &str;

    /// One byte per block: zero when the block never executed.
    fn hit_buffer(&self) -> &[u8];

    fn symbol_reader(&self) -> ProviderResult<SymbolReader<'_>>;
}
