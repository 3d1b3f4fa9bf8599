use std::collections::BTreeMap;

/// A file extracted from the payload, remembered under the path at which it
/// was discovered (a link keeps its own path, not its target's).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Path of the entry inside the payload, relative to the payload root.
    pub path: String,
    /// The file contents.
    pub data: Vec<u8>,
}

/// The desktop-integration resources extracted from an application payload.
///
/// A category without matches is simply empty; only enabled categories are
/// ever populated. Multi-valued categories are keyed by the path at which
/// each resource was discovered, so repeated extractions of the same payload
/// compare equal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DesktopIntegrationResources {
    /// The application's primary desktop entry.
    pub desktop_entry: Option<ResourceFile>,
    /// Icon files, keyed by discovery path.
    pub icons: BTreeMap<String, Vec<u8>>,
    /// The AppStream metadata file.
    pub appstream: Option<ResourceFile>,
    /// Shared MIME-info packages, keyed by discovery path.
    pub mime_packages: BTreeMap<String, Vec<u8>>,
}

impl DesktopIntegrationResources {
    /// Returns `true` when no category holds any resource.
    pub fn is_empty(&self) -> bool {
        self.desktop_entry.is_none()
            && self.icons.is_empty()
            && self.appstream.is_none()
            && self.mime_packages.is_empty()
    }
}
