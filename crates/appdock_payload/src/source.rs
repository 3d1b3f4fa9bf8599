//! The walk primitive payload sources implement.

use crate::{PayloadEntry, PayloadError};

/// A restartable, forward-only source of payload entries.
///
/// Every call to [`walk`](PayloadSource::walk) starts a fresh pass over the
/// payload in container order. Entries are handed to the visitor one at a
/// time and become invalid as soon as the visitor returns. Sources must
/// surface iteration failures as errors rather than silently truncating a
/// walk.
pub trait PayloadSource {
    /// Walks all entries, invoking `visit` for each one in payload order.
    ///
    /// An error returned by the visitor aborts the walk and is passed through
    /// unchanged.
    fn walk(
        &mut self,
        visit: &mut dyn FnMut(&mut PayloadEntry<'_>) -> Result<(), PayloadError>,
    ) -> Result<(), PayloadError>;
}

impl<S: PayloadSource + ?Sized> PayloadSource for &mut S {
    fn walk(
        &mut self,
        visit: &mut dyn FnMut(&mut PayloadEntry<'_>) -> Result<(), PayloadError>,
    ) -> Result<(), PayloadError> {
        (**self).walk(visit)
    }
}
