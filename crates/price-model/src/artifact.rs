//! Persisted Model Artifact
//!
//! A single file holding the schema, vocabulary, coefficients and intercept.
//! `.bin` files use postcard, everything else is JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use feature_engine::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ArtifactError;
use crate::model::FittedModel;

/// Current on-disk layout version
pub const ARTIFACT_VERSION: u32 = 1;

/// Encoding of the artifact file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactFormat {
    Json,
    Postcard,
}

impl ArtifactFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("postcard") => ArtifactFormat::Postcard,
            _ => ArtifactFormat::Json,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<M> {
    format_version: u32,
    model: M,
}

/// Write a model to `path`, creating parent directories
pub fn save(model: &FittedModel, path: &Path) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let envelope = Envelope {
        format_version: ARTIFACT_VERSION,
        model,
    };
    let format = ArtifactFormat::from_path(path);

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    match format {
        ArtifactFormat::Json => serde_json::to_writer_pretty(&mut writer, &envelope)?,
        ArtifactFormat::Postcard => {
            let bytes = postcard::to_allocvec(&envelope)?;
            writer.write_all(&bytes).map_err(io_err)?;
        }
    }
    writer.flush().map_err(io_err)?;

    info!(
        "Saved {:?} model artifact to {} ({} columns)",
        format,
        path.display(),
        model.schema().len()
    );
    Ok(())
}

/// Read and validate a model from `path`
pub fn load(path: &Path) -> Result<FittedModel, ArtifactError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let format = ArtifactFormat::from_path(path);
    debug!("Read {} bytes of {:?} artifact", bytes.len(), format);

    let envelope: Envelope<FittedModel> = match format {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)?,
        ArtifactFormat::Postcard => postcard::from_bytes(&bytes)?,
    };

    if envelope.format_version != ARTIFACT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: envelope.format_version,
            expected: ARTIFACT_VERSION,
        });
    }
    let model = envelope.model;
    if model.schema().version() != SCHEMA_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: model.schema().version(),
            expected: SCHEMA_VERSION,
        });
    }
    model.check_consistency().map_err(ArtifactError::Inconsistent)?;

    info!(
        "Loaded model artifact from {} ({} columns, trained {})",
        path.display(),
        model.schema().len(),
        model.metadata().trained_at
    );
    Ok(model)
}
