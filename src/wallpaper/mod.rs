/// Wallpaper generation module
///
/// This module handles:
/// - Composing the output artifact from the selection (composer.rs)
/// - Handing the artifact to the OS (apply.rs)
/// - The one-cycle-at-a-time generation flow tying the two together

pub mod apply;
pub mod composer;

use std::path::PathBuf;

use thiserror::Error;
use tokio::task;

use crate::gallery::data::PhotoRef;
use apply::ApplyError;
use composer::ComposeError;

/// Which composer a selection routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Exactly one photo: saved as-is
    Single,
    /// Two or more photos: 3x3 collage
    Collage,
}

/// Dispatch rule: nothing selected → no generation, one photo → single
/// mode, two or more → collage mode.
pub fn render_mode(selected: usize) -> Option<RenderMode> {
    match selected {
        0 => None,
        1 => Some(RenderMode::Single),
        _ => Some(RenderMode::Collage),
    }
}

/// A generation cycle failure, from either stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Run one full generation cycle: download, compose, write, apply.
///
/// The caller keeps cycles serialized; this function assumes it is the
/// only one in flight.
pub async fn generate(
    client: reqwest::Client,
    photos: Vec<PhotoRef>,
) -> Result<PathBuf, GenerateError> {
    let path = match render_mode(photos.len()) {
        None => return Err(ComposeError::EmptySelection.into()),
        Some(RenderMode::Single) => {
            let photo = photos
                .into_iter()
                .next()
                .ok_or(ComposeError::EmptySelection)?;
            composer::render_single(client, photo).await?
        }
        Some(RenderMode::Collage) => composer::render_collage(client, photos).await?,
    };

    let artifact = path.clone();
    task::spawn_blocking(move || apply::set_desktop_background(&artifact))
        .await
        .map_err(|e| {
            GenerateError::Apply(ApplyError::CommandFailed {
                detail: format!("task join error: {}", e),
            })
        })??;

    println!("🖥️  Desktop background set to {}", path.display());
    Ok(path)
}
