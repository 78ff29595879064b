//! `dreg rm`: delete images by tag.
//!
//! Removal is best effort. Each image is resolved to its manifest digest and
//! that manifest deleted; a failure is reported and the next image is tried.

use std::io::Write;

use clap::Args;
use ociclient::{ImageReference, ImageReferenceError, Registry, RegistryError};
use thiserror::Error;
use tracing::debug;

use crate::error::{CliError, Result};

#[derive(Args, Debug, Clone, Default)]
pub struct RmArgs {
    /// Images to delete from registry
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<String>,
}

/// Why one image was not removed. `image` is the specifier as given.
#[derive(Error, Debug)]
pub enum RemovalError {
    #[error("Couldn't parse {image}: {source}")]
    Parse {
        image: String,
        source: ImageReferenceError,
    },

    #[error("Couldn't find {image}: {source}")]
    Resolve {
        image: String,
        source: RegistryError,
    },

    #[error("Couldn't remove {image}: {source}")]
    Delete {
        image: String,
        source: RegistryError,
    },
}

impl RemovalError {
    pub fn image(&self) -> &str {
        match self {
            RemovalError::Parse { image, .. }
            | RemovalError::Resolve { image, .. }
            | RemovalError::Delete { image, .. } => image,
        }
    }
}

/// Outcome of a removal batch.
#[derive(Debug, Default)]
pub struct RemovalReport {
    pub attempted: usize,
    pub removed: Vec<String>,
    pub failed: Vec<RemovalError>,
}

impl RemovalReport {
    pub fn not_removed(&self) -> usize {
        self.attempted.saturating_sub(self.removed.len())
    }

    /// Reduce the report to the command's outcome: an error counting the
    /// images left in place, if any.
    pub fn into_result(self) -> Result<()> {
        match self.not_removed() {
            0 => Ok(()),
            count => Err(CliError::NotRemoved { count }),
        }
    }
}

pub async fn run<R, O, E>(
    registry: &R,
    images: &[String],
    verbose: bool,
    out: &mut O,
    err: &mut E,
) -> Result<RemovalReport>
where
    R: Registry + ?Sized,
    O: Write,
    E: Write,
{
    let mut report = RemovalReport {
        attempted: images.len(),
        ..Default::default()
    };

    for image in images {
        match remove_one(registry, image).await {
            Ok(()) => {
                if verbose {
                    writeln!(out, "{} removed", image)?;
                }
                report.removed.push(image.clone());
            }
            Err(e) => {
                writeln!(err, "{}", e)?;
                report.failed.push(e);
            }
        }
    }

    Ok(report)
}

async fn remove_one<R>(registry: &R, image: &str) -> std::result::Result<(), RemovalError>
where
    R: Registry + ?Sized,
{
    let reference: ImageReference = image.parse().map_err(|source| RemovalError::Parse {
        image: image.to_string(),
        source,
    })?;

    let digest = registry
        .get_digest(&reference.repository, &reference.reference)
        .await
        .map_err(|source| RemovalError::Resolve {
            image: image.to_string(),
            source,
        })?;
    debug!("{} resolved to {}", reference, digest);

    registry
        .delete_image(&reference.repository, &digest.to_string())
        .await
        .map_err(|source| RemovalError::Delete {
            image: image.to_string(),
            source,
        })
}
