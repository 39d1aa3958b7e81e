use crate::error::OptimizeError;
use async_trait::async_trait;
use std::path::Path;

/// The remote transformation: shrink the image at `source` and write the
/// optimized bytes to `destination`. Implementations report success or one
/// of the closed failure categories; the calling engine treats the call as
/// opaque.
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn optimize(&self, source: &Path, destination: &Path) -> Result<(), OptimizeError>;

    /// Month-to-date compression count for the configured account. Also
    /// serves as a credential check.
    async fn compression_count(&self) -> Result<u64, OptimizeError>;
}
