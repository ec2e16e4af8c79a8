//! Folding several coverage artifacts into one combined result.

use std::path::PathBuf;

use crate::error::{ConvertError, Result};
use crate::provider::CoverageProvider;

/// Load every artifact in `paths` and join them left to right.
///
/// Each intermediate is dropped as soon as the next join has been attempted,
/// so no more than the accumulator, the freshly loaded artifact and the join
/// result are alive at once. On failure everything loaded so far is dropped
/// before the error is returned.
pub fn merge_artifacts<P: CoverageProvider>(provider: &P, paths: &[PathBuf]) -> Result<P::Data> {
    let (first, rest) = paths
        .split_first()
        .ok_or_else(|| ConvertError::Usage("no coverage artifacts given".to_string()))?;

    tracing::debug!(path = %first.display(), "loading coverage artifact");
    let mut acc = provider
        .load(first)
        .map_err(|e| ConvertError::artifact_load(first, e))?;

    for path in rest {
        tracing::debug!(path = %path.display(), "loading coverage artifact");
        let current = provider
            .load(path)
            .map_err(|e| ConvertError::artifact_load(path, e))?;

        let joined = provider.join(&acc, &current);
        drop(current);
        drop(acc);

        acc = joined.map_err(|e| ConvertError::Merge {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "joined coverage artifact");
    }

    tracing::info!(artifacts = paths.len(), "merged coverage artifacts");
    Ok(acc)
}
