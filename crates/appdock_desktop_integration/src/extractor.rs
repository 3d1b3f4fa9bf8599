//! The two-pass resources extractor.

use std::collections::HashMap;

use appdock_payload::{PayloadEntryKind, PayloadSource};

use crate::entries_cache::{PayloadEntriesCache, Resolution};
use crate::{DesktopIntegrationResources, ExtractError, ResourceFile};

/// The four disjoint resource categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceKind {
    DesktopEntry,
    Icon,
    AppStream,
    MimePackage,
}

/// The enabled-category toggles, applied as a classification filter.
#[derive(Debug, Default, Clone, Copy)]
struct ResourceFilter {
    desktop_entry: bool,
    icons: bool,
    appstream: bool,
    mime_packages: bool,
}

impl ResourceFilter {
    /// Classifies a payload path, consulting only enabled categories.
    ///
    /// The category rules are mutually exclusive by construction, so the
    /// probe order does not matter.
    fn classify(&self, path: &str) -> Option<ResourceKind> {
        if self.desktop_entry && is_main_desktop_entry(path) {
            Some(ResourceKind::DesktopEntry)
        } else if self.icons && is_icon_file(path) {
            Some(ResourceKind::Icon)
        } else if self.appstream && is_appstream_file(path) {
            Some(ResourceKind::AppStream)
        } else if self.mime_packages && is_mime_package_file(path) {
            Some(ResourceKind::MimePackage)
        } else {
            None
        }
    }
}

const ICON_EXTENSIONS: &[&str] = &["png", "svg", "svgz", "xpm"];

/// The application's primary desktop entry: a `*.desktop` file at the
/// payload root.
fn is_main_desktop_entry(path: &str) -> bool {
    !path.contains('/') && path.ends_with(".desktop")
}

/// Icon files: the well-known `.DirIcon` name or an image at the payload
/// root, or an image under the icon-theme and pixmap locations.
fn is_icon_file(path: &str) -> bool {
    if path == ".DirIcon" {
        return true;
    }
    let themed = path.starts_with("usr/share/icons/") || path.starts_with("usr/share/pixmaps/");
    (themed || !path.contains('/')) && has_icon_extension(path)
}

fn has_icon_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, extension)| ICON_EXTENSIONS.contains(&extension))
}

/// AppStream metadata under `usr/share/metainfo/`, or the legacy
/// `usr/share/appdata/` location.
fn is_appstream_file(path: &str) -> bool {
    (path.starts_with("usr/share/metainfo/") || path.starts_with("usr/share/appdata/"))
        && (path.ends_with(".appdata.xml") || path.ends_with(".metainfo.xml"))
}

/// Shared MIME-info packages under `usr/share/mime/packages/`.
fn is_mime_package_file(path: &str) -> bool {
    path.starts_with("usr/share/mime/packages/") && path.ends_with(".xml")
}

/// Rewrites a link target so it can be looked up among payload entry paths,
/// which are root-relative and carry no leading slash. Relative targets are
/// anchored at the link's parent directory; `.` and `..` components collapse.
fn resolve_target_path(link_path: &str, target: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !target.starts_with('/') {
        if let Some((dir, _)) = link_path.rsplit_once('/') {
            parts.extend(dir.split('/'));
        }
    }
    for component in target.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            component => parts.push(component),
        }
    }
    parts.join("/")
}

/// Extracts desktop-integration resources from an application payload.
///
/// Reading link entries straight through the container is not reliable for
/// every supported payload format, so the extractor walks the source twice:
/// once to resolve every candidate resource to the regular file it ultimately
/// designates, and once to read the resolved files.
///
/// All categories start disabled; enable the ones to extract before calling
/// [`extract`](ResourcesExtractor::extract):
///
/// ```
/// use appdock_desktop_integration::ResourcesExtractor;
/// use appdock_payload::InMemoryPayload;
///
/// let payload = InMemoryPayload::new()
///     .file("app.desktop", "[Desktop Entry]\nName=App\n")
///     .link(".DirIcon", "usr/share/icons/hicolor/256x256/apps/app.png")
///     .file("usr/share/icons/hicolor/256x256/apps/app.png", b"png bytes".to_vec());
///
/// let resources = ResourcesExtractor::new(payload)
///     .extract_desktop_entry(true)
///     .extract_icons(true)
///     .extract()?;
///
/// assert!(resources.desktop_entry.is_some());
/// assert_eq!(resources.icons.len(), 2);
/// # Ok::<_, appdock_desktop_integration::ExtractError>(())
/// ```
pub struct ResourcesExtractor<S> {
    source: S,
    filter: ResourceFilter,
}

impl<S> ResourcesExtractor<S> {
    /// Creates an extractor over an already-open payload source with every
    /// category disabled.
    pub fn new(source: S) -> Self {
        Self {
            source,
            filter: ResourceFilter::default(),
        }
    }

    /// Enables or disables extraction of the primary desktop entry.
    pub fn extract_desktop_entry(mut self, extract: bool) -> Self {
        self.filter.desktop_entry = extract;
        self
    }

    /// Enables or disables extraction of icon files.
    pub fn extract_icons(mut self, extract: bool) -> Self {
        self.filter.icons = extract;
        self
    }

    /// Enables or disables extraction of the AppStream metadata file.
    pub fn extract_appstream(mut self, extract: bool) -> Self {
        self.filter.appstream = extract;
        self
    }

    /// Enables or disables extraction of shared MIME-info packages.
    pub fn extract_mime_packages(mut self, extract: bool) -> Self {
        self.filter.mime_packages = extract;
        self
    }
}

impl<S: PayloadSource> ResourcesExtractor<S> {
    /// Extracts the enabled resource categories into a bundle.
    ///
    /// Fails with [`ExtractError::PayloadLinkCycle`] when a link chain among
    /// the candidate resources revisits a path, and with
    /// [`ExtractError::PayloadRead`] when the container itself cannot be
    /// walked or read; no partial bundle is returned in either case. An
    /// enabled category without matches is not an error.
    pub fn extract(&mut self) -> Result<DesktopIntegrationResources, ExtractError> {
        let targets = self.resolve_final_paths()?;
        self.read_resource_files(&targets)
    }

    /// First walk: record every file and link in the resolution cache,
    /// classify the paths of enabled categories, and map each classified path
    /// to the regular file it resolves to.
    ///
    /// Returns the read schedule for the second walk: resolved file path ->
    /// categories and discovery paths waiting for its bytes.
    fn resolve_final_paths(
        &mut self,
    ) -> Result<HashMap<String, Vec<(ResourceKind, String)>>, ExtractError> {
        let mut cache = PayloadEntriesCache::default();
        let mut interest: Vec<(ResourceKind, String)> = Vec::new();
        let filter = self.filter;

        self.source.walk(&mut |entry| {
            match entry.kind() {
                PayloadEntryKind::Directory => {}
                PayloadEntryKind::File => {
                    cache.record_file(entry.path());
                    if let Some(kind) = filter.classify(entry.path()) {
                        interest.push((kind, entry.path().to_owned()));
                    }
                }
                PayloadEntryKind::Link { target } => {
                    // Links are cached unconditionally: a chain may pass
                    // through entries that belong to no category.
                    let target = resolve_target_path(entry.path(), target);
                    cache.record_link(entry.path(), &target);
                    if let Some(kind) = filter.classify(entry.path()) {
                        interest.push((kind, entry.path().to_owned()));
                    }
                }
            }
            Ok(())
        })?;

        let mut targets: HashMap<String, Vec<(ResourceKind, String)>> = HashMap::new();
        for (kind, path) in interest {
            match cache.resolution(&path)? {
                Resolution::File(file) => {
                    tracing::trace!(resource = %path, file = %file, "scheduling resource");
                    targets.entry(file.to_owned()).or_default().push((kind, path));
                }
                Resolution::Dangling => {
                    tracing::debug!(
                        resource = %path,
                        "payload link never reaches a regular file, skipping"
                    );
                }
            }
        }
        Ok(targets)
    }

    /// Second walk: read each scheduled regular file once and fan its bytes
    /// out to every resource that resolved to it. Singleton categories keep
    /// the first match in payload order.
    fn read_resource_files(
        &mut self,
        targets: &HashMap<String, Vec<(ResourceKind, String)>>,
    ) -> Result<DesktopIntegrationResources, ExtractError> {
        let mut resources = DesktopIntegrationResources::default();

        self.source.walk(&mut |entry| {
            if !matches!(entry.kind(), PayloadEntryKind::File) {
                return Ok(());
            }
            let Some(consumers) = targets.get(entry.path()) else {
                return Ok(());
            };

            let data = entry.read_to_vec()?;
            for (kind, path) in consumers {
                match kind {
                    ResourceKind::DesktopEntry => {
                        if resources.desktop_entry.is_none() {
                            resources.desktop_entry = Some(ResourceFile {
                                path: path.clone(),
                                data: data.clone(),
                            });
                        }
                    }
                    ResourceKind::Icon => {
                        resources.icons.insert(path.clone(), data.clone());
                    }
                    ResourceKind::AppStream => {
                        if resources.appstream.is_none() {
                            resources.appstream = Some(ResourceFile {
                                path: path.clone(),
                                data: data.clone(),
                            });
                        }
                    }
                    ResourceKind::MimePackage => {
                        resources.mime_packages.insert(path.clone(), data.clone());
                    }
                }
            }
            Ok(())
        })?;

        Ok(resources)
    }
}
