//! "Download Results": write the images carried in a result to disk.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::{decode_data_uri, AnalysisResult, DataUriError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("original image cannot be decoded: {0}")]
    Original(#[from] DataUriError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Files produced by [`export_results`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedFiles {
    pub original: PathBuf,
    pub overlays: Vec<PathBuf>,
    /// Overlays given as remote URLs rather than embedded data.
    pub skipped: usize,
}

fn write_file(path: PathBuf, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    fs::write(&path, bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Write the original image and every embedded overlay into `dir`.
pub fn export_results(
    result: &AnalysisResult,
    dir: &Path,
    date: NaiveDate,
) -> Result<ExportedFiles, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let stamp = date.format("%Y-%m-%d");

    let original = decode_data_uri(&result.original_image)?;
    let original_path = write_file(
        dir.join(format!("lungai_analysis_{}.{}", stamp, original.extension())),
        &original.bytes,
    )?;

    let mut exported = ExportedFiles {
        original: original_path,
        ..ExportedFiles::default()
    };

    for overlay in &result.overlay_images {
        match decode_data_uri(&overlay.image) {
            Ok(image) => {
                let path = dir.join(format!(
                    "lungai_overlay_{}_{}.{}",
                    overlay.disease.slug(),
                    stamp,
                    image.extension()
                ));
                exported.overlays.push(write_file(path, &image.bytes)?);
            }
            Err(e) => {
                tracing::warn!(disease = %overlay.disease, error = %e, "Skipping overlay that is not embedded");
                exported.skipped += 1;
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        overlays = exported.overlays.len(),
        skipped = exported.skipped,
        "Results exported"
    );
    Ok(exported)
}
