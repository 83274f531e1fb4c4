/// Filesystem source resolver
use async_trait::async_trait;
use tensai_core::{CoreError, Result, SourceLocator};
use tensai_playback::{MediaHandle, SourceResolver};

/// Resolves file paths (which must exist), URLs and blob references
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResolver;

impl FsResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceResolver for FsResolver {
    async fn resolve(&self, locator: &SourceLocator) -> Result<MediaHandle> {
        let uri = match locator {
            SourceLocator::Path(path) => {
                let metadata = tokio::fs::metadata(path)
                    .await
                    .map_err(|_| CoreError::not_found("file", path.display().to_string()))?;
                if !metadata.is_file() {
                    return Err(CoreError::invalid_input(format!(
                        "{} is not a file",
                        path.display()
                    )));
                }
                path.display().to_string()
            }
            SourceLocator::Url(url) => url.clone(),
            SourceLocator::Blob(key) => key.clone(),
        };

        Ok(MediaHandle {
            locator: locator.clone(),
            uri,
            transient: locator.is_transient(),
        })
    }

    async fn release(&self, handle: &MediaHandle) {
        tracing::debug!(uri = %handle.uri, "Revoked transient handle");
    }
}
