//! The payload entry model.

use std::io::Read;

use crate::PayloadError;

/// The kind of a payload entry.
///
/// Link entries carry the target string exactly as stored in the container;
/// no resolution is performed at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadEntryKind {
    /// A regular file with byte contents.
    File,
    /// A directory.
    Directory,
    /// A symbolic (or hard) link to another entry.
    Link {
        /// The raw target path as stored in the container.
        target: String,
    },
}

/// A single entry produced during a payload walk.
///
/// Entries are ephemeral: they are only valid inside the visit callback that
/// received them, and their content can be read at most once. Seeing an entry
/// again requires a fresh walk.
pub struct PayloadEntry<'a> {
    path: String,
    kind: PayloadEntryKind,
    content: Option<&'a mut dyn Read>,
}

impl<'a> PayloadEntry<'a> {
    /// Creates an entry without readable content (directories and links).
    pub fn new(path: impl Into<String>, kind: PayloadEntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
            content: None,
        }
    }

    /// Creates a regular file entry with its content reader.
    pub fn file(path: impl Into<String>, content: &'a mut dyn Read) -> Self {
        Self {
            path: path.into(),
            kind: PayloadEntryKind::File,
            content: Some(content),
        }
    }

    /// The entry path, relative to the payload root, without a leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The kind of this entry.
    pub fn kind(&self) -> &PayloadEntryKind {
        &self.kind
    }

    /// For link entries, the raw target path.
    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            PayloadEntryKind::Link { target } => Some(target),
            _ => None,
        }
    }

    /// Reads the full content of a regular file entry.
    ///
    /// The content can be consumed once per walk; a second call, or a call on
    /// a directory or link entry, fails with [`PayloadError::NoContent`].
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>, PayloadError> {
        let reader = self
            .content
            .take()
            .ok_or_else(|| PayloadError::NoContent(self.path.clone()))?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl std::fmt::Debug for PayloadEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadEntry")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
