use std::path::{Path, PathBuf};

use clap::Args;

use common::frame::Content;
use common::scrub::{strip_metadata, ScrubError};

use super::{submit, PostError, PostOutput};

#[derive(Args, Debug, Clone)]
pub struct Image {
    /// Image file to encrypt and post
    #[arg(long)]
    pub path: PathBuf,

    /// MIME type (guessed from the file extension if omitted)
    #[arg(long)]
    pub mime: Option<String>,
}

/// The MIME type to post `path` under: the explicit one, or a guess from
///  the extension that must be an image type
pub fn resolve_mime(path: &Path, explicit: Option<&str>) -> Result<String, PostError> {
    if let Some(mime) = explicit {
        return Ok(mime.to_string());
    }
    mime_guess::from_path(path)
        .iter()
        .find(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| PostError::UnknownMime(path.display().to_string()))
}

/// Read `path` and build image content with metadata stripped.
///
/// Formats the scrubber can't handle are posted as read, with a warning
///  when the file looked like a supported format but failed to parse.
pub async fn prepare_image(path: &Path, mime: &str) -> Result<Content, PostError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| PostError::Read(path.display().to_string(), e))?;
    tracing::debug!(path = %path.display(), %mime, size = data.len(), "read image");

    let data = match strip_metadata(&data) {
        Ok(stripped) => {
            tracing::debug!(
                removed = data.len().saturating_sub(stripped.len()),
                "stripped image metadata"
            );
            stripped
        }
        Err(ScrubError::Unsupported) => {
            tracing::debug!(%mime, "no metadata stripping for format, posting as is");
            data
        }
        Err(e) => {
            tracing::warn!("could not strip image metadata, posting original: {}", e);
            data
        }
    };

    Ok(Content::image(mime, data)?)
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Image {
    type Error = PostError;
    type Output = PostOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mime = resolve_mime(&self.path, self.mime.as_deref())?;
        let content = prepare_image(&self.path, &mime).await?;
        submit(ctx, content).await
    }
}
