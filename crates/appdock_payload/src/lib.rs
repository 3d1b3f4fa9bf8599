#![deny(missing_docs)]

//! This crate exposes the payload of a self-contained application bundle —
//! the embedded filesystem-like container holding the application's files —
//! as a restartable, forward-only sequence of entries.
//!
//! The walk seam is the [`PayloadSource`] trait. Two sources are provided:
//! [`TarPayload`] walks a tar archive behind any `Read + Seek` handle, and
//! [`InMemoryPayload`] assembles synthetic payloads entry by entry, which is
//! mostly useful in tests.

mod archive;
mod entry;
mod memory;
mod source;

pub use archive::TarPayload;
pub use entry::{PayloadEntry, PayloadEntryKind};
pub use memory::InMemoryPayload;
pub use source::PayloadSource;

/// An error that can occur while walking a payload container.
#[derive(thiserror::Error, Debug)]
#[allow(missing_docs)]
pub enum PayloadError {
    #[error("an io error occurred")]
    Io(#[from] std::io::Error),

    #[error("payload entry path is not valid unicode: {0:?}")]
    NonUnicodePath(std::path::PathBuf),

    #[error("link entry {0} carries no target")]
    MissingLinkTarget(String),

    #[error("payload entry {0} has no readable content")]
    NoContent(String),
}
