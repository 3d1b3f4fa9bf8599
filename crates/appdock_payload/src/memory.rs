//! Synthetic payloads assembled in memory.

use std::io::Cursor;

use crate::{PayloadEntry, PayloadEntryKind, PayloadError, PayloadSource};

#[derive(Debug, Clone)]
struct MemoryEntry {
    path: String,
    kind: PayloadEntryKind,
    data: Vec<u8>,
}

/// A payload source assembled entry by entry and walked in insertion order.
///
/// Mostly useful to build synthetic payloads in tests:
///
/// ```
/// use appdock_payload::{InMemoryPayload, PayloadEntryKind, PayloadSource};
///
/// let mut payload = InMemoryPayload::new()
///     .file("app.desktop", "[Desktop Entry]")
///     .link(".DirIcon", "app.png")
///     .file("app.png", b"png bytes".to_vec());
///
/// let mut paths = Vec::new();
/// payload.walk(&mut |entry| {
///     paths.push(entry.path().to_owned());
///     Ok(())
/// })?;
/// assert_eq!(paths, ["app.desktop", ".DirIcon", "app.png"]);
/// # Ok::<_, appdock_payload::PayloadError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryPayload {
    entries: Vec<MemoryEntry>,
}

impl InMemoryPayload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a regular file entry with the given contents.
    pub fn file(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            kind: PayloadEntryKind::File,
            data: data.into(),
        });
        self
    }

    /// Appends a directory entry.
    pub fn dir(mut self, path: impl Into<String>) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            kind: PayloadEntryKind::Directory,
            data: Vec::new(),
        });
        self
    }

    /// Appends a link entry with the given raw target.
    pub fn link(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            kind: PayloadEntryKind::Link {
                target: target.into(),
            },
            data: Vec::new(),
        });
        self
    }
}

impl PayloadSource for InMemoryPayload {
    fn walk(
        &mut self,
        visit: &mut dyn FnMut(&mut PayloadEntry<'_>) -> Result<(), PayloadError>,
    ) -> Result<(), PayloadError> {
        for entry in &self.entries {
            match &entry.kind {
                PayloadEntryKind::File => {
                    let mut content = Cursor::new(entry.data.as_slice());
                    visit(&mut PayloadEntry::file(entry.path.clone(), &mut content))?;
                }
                kind => visit(&mut PayloadEntry::new(entry.path.clone(), kind.clone()))?,
            }
        }
        Ok(())
    }
}
