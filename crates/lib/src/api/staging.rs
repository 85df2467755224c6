//! Attachment staging: copy local files to a publicly served directory and derive their URL.

use crate::api::SendError;
use std::path::{Path, PathBuf};

/// Copies attachments into `location` (when set) and builds `public_url + file name`.
#[derive(Debug, Clone, Default)]
pub struct AttachmentStager {
    location: Option<PathBuf>,
    public_url: Option<String>,
}

impl AttachmentStager {
    pub fn new(location: Option<PathBuf>, public_url: Option<String>) -> Self {
        Self {
            location,
            public_url,
        }
    }

    /// Stage one file and return the URL the platform should fetch it from.
    pub async fn stage(&self, attachment: &Path) -> Result<String, SendError> {
        let base = self.public_url.as_deref().ok_or(SendError::MissingPublicUrl)?;
        let file_name = attachment
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SendError::InvalidArgument(format!(
                    "attachment has no file name: {}",
                    attachment.display()
                ))
            })?;

        if let Some(ref dir) = self.location {
            let dest = dir.join(file_name);
            if same_file(attachment, &dest).await {
                log::debug!("attachment {} already staged", attachment.display());
            } else {
                tokio::fs::copy(attachment, &dest).await?;
                log::debug!(
                    "staged attachment {} -> {}",
                    attachment.display(),
                    dest.display()
                );
            }
        }

        Ok(format!("{}{}", base, file_name))
    }
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
