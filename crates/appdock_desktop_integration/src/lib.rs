//! Extraction of desktop-integration resources from application payloads.
//!
//! Integrating a self-contained application bundle into the desktop
//! environment requires a handful of files from its payload: the primary
//! desktop entry, icons, AppStream metadata and shared MIME-info packages.
//! [`ResourcesExtractor`] collects them into an in-memory
//! [`DesktopIntegrationResources`] bundle without relying on the container's
//! own symlink handling, which not every supported payload format provides.

use appdock_payload::PayloadError;

mod entries_cache;
mod extractor;
mod resources;

pub use extractor::ResourcesExtractor;
pub use resources::{DesktopIntegrationResources, ResourceFile};

/// An error that can occur while extracting desktop-integration resources.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// A chain of link entries revisited a path while being resolved.
    ///
    /// This indicates a malformed container; the whole extraction is aborted
    /// rather than returning a partial bundle.
    #[error("link cycle in payload while resolving {0}")]
    PayloadLinkCycle(String),

    /// The underlying payload could not be walked or read.
    #[error("failed to read the payload")]
    PayloadRead(#[from] PayloadError),
}
