//! End-to-end conversion: merge artifacts, render, persist.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::detect::Format;
use crate::error::{ConvertError, Result};
use crate::merge::merge_artifacts;
use crate::provider::CoverageProvider;

/// Merge `sources` with `provider` and write the report to `destination`.
/// Returns a one-line description of what was written.
///
/// The destination is only touched once the whole report has been rendered,
/// and is replaced atomically.
pub fn convert<P: CoverageProvider>(
    provider: &P,
    destination: &Path,
    sources: &[PathBuf],
    format: Format,
) -> Result<String> {
    let data = merge_artifacts(provider, sources)?;
    let rendered = format.writer().render(&data)?;
    drop(data);

    persist(destination, &rendered.contents)?;
    tracing::info!(
        destination = %destination.display(),
        bytes = rendered.contents.len(),
        "wrote {format} report"
    );

    Ok(format!(
        "Wrote {} report to {}: {}\n",
        format,
        destination.display(),
        rendered.description
    ))
}

/// Write `contents` to a temporary file beside `destination`, then rename it
/// into place. An existing destination keeps its permissions; a new one gets
/// the same mode a plain `File::create` would.
fn persist(destination: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| ConvertError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let existing = std::fs::metadata(destination)
        .ok()
        .map(|meta| meta.permissions());

    #[allow(unused_mut)]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_error)?;
    if let Some(permissions) = existing {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    tmp.write_all(contents).map_err(write_error)?;
    tmp.flush().map_err(write_error)?;
    tmp.persist(destination).map_err(|e| write_error(e.error))?;
    Ok(())
}
