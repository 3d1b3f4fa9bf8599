use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};

use appdock_desktop_integration::{DesktopIntegrationResources, ExtractError, ResourcesExtractor};
use appdock_payload::{PayloadEntry, PayloadEntryKind, PayloadError, PayloadSource, TarPayload};
use assert_matches::assert_matches;

fn append_file(builder: &mut tar::Builder<Vec<u8>>, path: &str, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, data).unwrap();
}

fn append_symlink(builder: &mut tar::Builder<Vec<u8>>, path: &str, target: &str) {
    let mut header = tar::Header::new_gnu();
    header.set_size(0);
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_cksum();
    builder.append_link(&mut header, path, target).unwrap();
}

fn build_tar(build: impl FnOnce(&mut tar::Builder<Vec<u8>>)) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    build(&mut builder);
    builder.into_inner().unwrap()
}

fn extract_all(
    payload: TarPayload<impl Read + io::Seek>,
) -> Result<DesktopIntegrationResources, ExtractError> {
    ResourcesExtractor::new(payload)
        .extract_desktop_entry(true)
        .extract_icons(true)
        .extract_appstream(true)
        .extract_mime_packages(true)
        .extract()
}

#[test]
fn extracts_the_expected_resources_from_an_appdir() {
    let bytes = build_tar(|builder| {
        append_file(builder, "app.desktop", b"[Desktop Entry]\nName=App\n");
        append_file(builder, "app.png", b"png bytes");
        append_symlink(builder, "icon-link.png", "app.png");
    });

    let resources = extract_all(TarPayload::new(Cursor::new(bytes))).unwrap();

    let desktop_entry = resources.desktop_entry.unwrap();
    assert_eq!(desktop_entry.path, "app.desktop");
    assert_eq!(desktop_entry.data, b"[Desktop Entry]\nName=App\n");

    assert_eq!(resources.icons.len(), 2);
    assert_eq!(resources.icons.get("app.png"), Some(&b"png bytes".to_vec()));
    assert_eq!(
        resources.icons.get("icon-link.png"),
        Some(&b"png bytes".to_vec())
    );

    assert!(resources.appstream.is_none());
    assert!(resources.mime_packages.is_empty());
}

#[test]
fn link_chains_collapse_to_the_final_file() {
    // Both links precede the file they ultimately designate, so resolution
    // completes only when the target is observed.
    let bytes = build_tar(|builder| {
        append_symlink(builder, "icon-a.png", "icon-b.png");
        append_symlink(builder, "icon-b.png", "usr/share/icons/app.png");
        append_file(builder, "usr/share/icons/app.png", b"png bytes");
    });

    let resources = extract_all(TarPayload::new(Cursor::new(bytes))).unwrap();

    assert_eq!(resources.icons.len(), 3);
    for path in ["icon-a.png", "icon-b.png", "usr/share/icons/app.png"] {
        assert_eq!(resources.icons.get(path), Some(&b"png bytes".to_vec()));
    }
}

#[test]
fn relative_targets_resolve_against_the_link_directory() {
    let bytes = build_tar(|builder| {
        append_file(builder, "usr/share/pixmaps/real.svg", b"<svg/>");
        append_symlink(builder, "usr/share/icons/app.svg", "../pixmaps/real.svg");
    });

    let resources = extract_all(TarPayload::new(Cursor::new(bytes))).unwrap();

    assert_eq!(resources.icons.len(), 2);
    assert_eq!(
        resources.icons.get("usr/share/icons/app.svg"),
        Some(&b"<svg/>".to_vec())
    );
}

#[test]
fn link_cycles_fail_extraction() {
    let bytes = build_tar(|builder| {
        append_symlink(builder, "a.desktop", "b.desktop");
        append_symlink(builder, "b.desktop", "a.desktop");
    });

    let result = extract_all(TarPayload::new(Cursor::new(bytes)));
    assert_matches!(result, Err(ExtractError::PayloadLinkCycle(_)));
}

#[test]
fn dangling_links_are_skipped_without_error() {
    let bytes = build_tar(|builder| {
        append_file(builder, "app.desktop", b"[Desktop Entry]");
        append_symlink(builder, ".DirIcon", "usr/share/icons/missing.png");
    });

    let resources = extract_all(TarPayload::new(Cursor::new(bytes))).unwrap();

    assert!(resources.desktop_entry.is_some());
    assert!(resources.icons.is_empty());
}

#[test]
fn repeat_extraction_is_bit_identical() {
    let bytes = build_tar(|builder| {
        append_file(builder, "app.desktop", b"[Desktop Entry]");
        append_symlink(builder, ".DirIcon", "app.png");
        append_file(builder, "app.png", b"png bytes");
        append_file(builder, "usr/share/mime/packages/x-app.xml", b"<mime-info/>");
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let first = extract_all(TarPayload::new(file.reopen().unwrap())).unwrap();
    let second = extract_all(TarPayload::new(file.reopen().unwrap())).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.icons.len(), 2);
}

/// A payload source that records which entries had their content read.
struct SpySource {
    entries: Vec<(String, PayloadEntryKind, Vec<u8>)>,
    reads: RefCell<Vec<String>>,
}

struct SpyReader<'a> {
    inner: Cursor<&'a [u8]>,
    path: &'a str,
    reads: &'a RefCell<Vec<String>>,
}

impl Read for SpyReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.reads.borrow().iter().any(|path| path == self.path) {
            self.reads.borrow_mut().push(self.path.to_owned());
        }
        self.inner.read(buf)
    }
}

impl PayloadSource for SpySource {
    fn walk(
        &mut self,
        visit: &mut dyn FnMut(&mut PayloadEntry<'_>) -> Result<(), PayloadError>,
    ) -> Result<(), PayloadError> {
        let reads = &self.reads;
        for (path, kind, data) in &self.entries {
            match kind {
                PayloadEntryKind::File => {
                    let mut reader = SpyReader {
                        inner: Cursor::new(data.as_slice()),
                        path,
                        reads,
                    };
                    visit(&mut PayloadEntry::file(path.clone(), &mut reader))?;
                }
                kind => visit(&mut PayloadEntry::new(path.clone(), kind.clone()))?,
            }
        }
        Ok(())
    }
}

#[test]
fn disabled_categories_cause_no_reads() {
    let mut source = SpySource {
        entries: vec![
            (
                "app.desktop".to_owned(),
                PayloadEntryKind::File,
                b"[Desktop Entry]".to_vec(),
            ),
            (
                "app.png".to_owned(),
                PayloadEntryKind::File,
                b"png bytes".to_vec(),
            ),
            (
                "usr/share/mime/packages/x-app.xml".to_owned(),
                PayloadEntryKind::File,
                b"<mime-info/>".to_vec(),
            ),
        ],
        reads: RefCell::new(Vec::new()),
    };

    let resources = ResourcesExtractor::new(&mut source)
        .extract_desktop_entry(true)
        .extract()
        .unwrap();

    assert!(resources.desktop_entry.is_some());
    assert!(resources.icons.is_empty());
    assert_eq!(source.reads.into_inner(), vec!["app.desktop".to_owned()]);
}
