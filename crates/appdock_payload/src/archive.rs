//! Walking tar archives as payload containers.

use std::io::{Read, Seek, SeekFrom};

use crate::{PayloadEntry, PayloadEntryKind, PayloadError, PayloadSource};

/// A payload source backed by an uncompressed tar archive.
///
/// The handle is rewound at the start of every walk, which keeps the source
/// restartable as long as `R` implements [`Seek`]. Compressed archives must
/// be decompressed into a seekable handle (a file or an in-memory buffer)
/// before being walked.
pub struct TarPayload<R> {
    reader: R,
}

impl<R: Read + Seek> TarPayload<R> {
    /// Creates a payload source over an open tar archive handle.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consumes the source and returns the underlying handle.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> PayloadSource for TarPayload<R> {
    fn walk(
        &mut self,
        visit: &mut dyn FnMut(&mut PayloadEntry<'_>) -> Result<(), PayloadError>,
    ) -> Result<(), PayloadError> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut archive = tar::Archive::new(&mut self.reader);

        for entry in archive.entries()? {
            let mut entry = entry?;
            let path = entry_path(&entry)?;
            let entry_type = entry.header().entry_type();

            if entry_type.is_dir() {
                visit(&mut PayloadEntry::new(path, PayloadEntryKind::Directory))?;
            } else if entry_type.is_symlink() || entry_type.is_hard_link() {
                let target = link_target(&entry, &path)?;
                visit(&mut PayloadEntry::new(
                    path,
                    PayloadEntryKind::Link { target },
                ))?;
            } else if entry_type.is_file() {
                visit(&mut PayloadEntry::file(path, &mut entry))?;
            }
            // Fifos, sockets and device nodes have no counterpart in the
            // entry model and are skipped.
        }

        Ok(())
    }
}

fn entry_path<R: Read>(entry: &tar::Entry<'_, R>) -> Result<String, PayloadError> {
    let path = entry.path()?;
    let path = path
        .to_str()
        .ok_or_else(|| PayloadError::NonUnicodePath(path.to_path_buf()))?;
    Ok(path
        .trim_start_matches("./")
        .trim_end_matches('/')
        .to_owned())
}

fn link_target<R: Read>(entry: &tar::Entry<'_, R>, path: &str) -> Result<String, PayloadError> {
    let target = entry
        .link_name()?
        .ok_or_else(|| PayloadError::MissingLinkTarget(path.to_owned()))?;
    let target = target
        .to_str()
        .ok_or_else(|| PayloadError::NonUnicodePath(target.to_path_buf()))?;
    Ok(target.to_owned())
}
