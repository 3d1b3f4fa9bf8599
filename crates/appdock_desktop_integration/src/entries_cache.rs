//! Resolution of payload entry paths to the regular files they designate.
//!
//! The payload can only be walked forward, so a link may be observed before
//! its target. The cache is therefore built incrementally during a single
//! pass: regular files resolve to themselves, links either resolve
//! immediately (target already known) or are parked in a pending index keyed
//! by the not-yet-seen target path and flushed transitively once that target
//! resolves.

use std::collections::{HashMap, HashSet};

use crate::ExtractError;

/// Resolution outcome for a recorded path once the pass is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution<'a> {
    /// The path designates, or links (possibly through further links) to,
    /// this regular file.
    File(&'a str),
    /// The path belongs to a link chain that never reaches a regular file.
    Dangling,
}

#[derive(Debug, Default)]
pub(crate) struct PayloadEntriesCache {
    /// Original path -> path of the regular file it resolves to.
    resolved: HashMap<String, String>,
    /// Raw target of every link that has not resolved yet.
    links: HashMap<String, String>,
    /// Target path -> link paths waiting on that target.
    waiting: HashMap<String, Vec<String>>,
}

impl PayloadEntriesCache {
    /// Records a regular file entry, which resolves to itself.
    pub(crate) fn record_file(&mut self, path: &str) {
        self.finalize(path.to_owned(), path.to_owned());
    }

    /// Records a link entry with its normalized target path.
    pub(crate) fn record_link(&mut self, path: &str, target: &str) {
        if let Some(file) = self.resolved.get(target) {
            let file = file.clone();
            self.finalize(path.to_owned(), file);
        } else {
            self.links.insert(path.to_owned(), target.to_owned());
            self.waiting
                .entry(target.to_owned())
                .or_default()
                .push(path.to_owned());
        }
    }

    /// Resolves a recorded path. Idempotent.
    ///
    /// A path that is still unresolved after the pass is followed through the
    /// raw link map: a chain that revisits a path fails with
    /// [`ExtractError::PayloadLinkCycle`], one that dead-ends dangles.
    pub(crate) fn resolution(&self, path: &str) -> Result<Resolution<'_>, ExtractError> {
        if let Some(file) = self.resolved.get(path) {
            return Ok(Resolution::File(file));
        }

        // Whenever any suffix of a chain resolves, the whole chain is flushed
        // into `resolved`; an unresolved chain can only dangle or cycle.
        let mut visited = HashSet::new();
        let mut current = path;
        while let Some(target) = self.links.get(current) {
            if !visited.insert(current) {
                return Err(ExtractError::PayloadLinkCycle(path.to_owned()));
            }
            current = target;
        }
        Ok(Resolution::Dangling)
    }

    /// Marks `path` as resolving to the regular file `file` and flushes every
    /// link waiting on it, transitively.
    fn finalize(&mut self, path: String, file: String) {
        let mut queue = vec![path];
        while let Some(path) = queue.pop() {
            self.links.remove(&path);
            if let Some(waiters) = self.waiting.remove(&path) {
                queue.extend(waiters);
            }
            self.resolved.insert(path, file.clone());
        }
    }
}
