//! OPF package document parsing: metadata, manifest and spine.

use std::collections::HashMap;

use anyhow::{Result, bail};
use quick_xml::events::Event;

use super::xml::{attr, lenient_reader, local_name, resolve_reference};

/// A manifest `item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: Option<String>,
}

/// A spine `itemref`, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    pub idref: String,
    /// `linear="no"` marks auxiliary content; it is still readable.
    pub linear: bool,
}

/// Dublin Core fields we surface to the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Package {
    pub metadata: Metadata,
    pub manifest: HashMap<String, ManifestItem>,
    pub spine: Vec<SpineItem>,
}

impl Package {
    /// Join the spine against the manifest.
    ///
    /// Yields `(idref, href)` in spine order; itemrefs without a manifest
    /// entry are dropped.
    pub fn reading_order(&self) -> impl Iterator<Item = (&str, &str)> {
        self.spine.iter().filter_map(|item| match self.manifest.get(&item.idref) {
            Some(entry) => Some((item.idref.as_str(), entry.href.as_str())),
            None => {
                tracing::warn!(idref = %item.idref, "spine item missing from manifest");
                None
            }
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Metadata,
    Manifest,
    Spine,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Creator,
    Language,
}

pub fn parse_package(content: &[u8]) -> Result<Package> {
    let mut reader = lenient_reader(content);
    let mut buf = Vec::new();
    let mut package = Package::default();
    let mut section = Section::Other;
    let mut field: Option<(Field, String)> = None;
    let mut saw_package = false;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => bail!("Malformed package document: {}", e),
        };

        match event {
            Event::Start(e) => {
                let name = local_name(e.name().as_ref());
                match (section, name.as_str()) {
                    (_, "package") => saw_package = true,
                    (_, "metadata") => section = Section::Metadata,
                    (_, "manifest") => section = Section::Manifest,
                    (_, "spine") => section = Section::Spine,
                    (Section::Metadata, "title") => field = Some((Field::Title, String::new())),
                    (Section::Metadata, "creator") => field = Some((Field::Creator, String::new())),
                    (Section::Metadata, "language") => {
                        field = Some((Field::Language, String::new()))
                    }
                    (Section::Manifest, "item") => add_manifest_item(&mut package, &reader, &e),
                    (Section::Spine, "itemref") => add_spine_item(&mut package, &reader, &e),
                    _ => {}
                }
            }
            Event::Empty(e) => match (section, local_name(e.name().as_ref()).as_str()) {
                (Section::Manifest, "item") => add_manifest_item(&mut package, &reader, &e),
                (Section::Spine, "itemref") => add_spine_item(&mut package, &reader, &e),
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&t.decode().unwrap_or_default());
                }
            }
            Event::CData(t) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&resolve_reference(&r.decode().unwrap_or_default()));
                }
            }
            Event::End(e) => {
                let name = local_name(e.name().as_ref());
                match name.as_str() {
                    "metadata" | "manifest" | "spine" => section = Section::Other,
                    "title" | "creator" | "language" => {
                        if let Some((kind, text)) = field.take() {
                            store_field(&mut package.metadata, kind, text);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_package {
        bail!("Package document has no <package> element");
    }

    tracing::debug!(
        manifest = package.manifest.len(),
        spine = package.spine.len(),
        "parsed package document"
    );
    Ok(package)
}

fn add_manifest_item(
    package: &mut Package,
    reader: &quick_xml::Reader<&[u8]>,
    e: &quick_xml::events::BytesStart<'_>,
) {
    let (Some(id), Some(href)) = (attr(reader, e, "id"), attr(reader, e, "href")) else {
        tracing::debug!("manifest item without id or href ignored");
        return;
    };
    let media_type = attr(reader, e, "media-type");
    package.manifest.insert(id, ManifestItem { href, media_type });
}

fn add_spine_item(
    package: &mut Package,
    reader: &quick_xml::Reader<&[u8]>,
    e: &quick_xml::events::BytesStart<'_>,
) {
    let Some(idref) = attr(reader, e, "idref") else {
        return;
    };
    let linear = attr(reader, e, "linear").is_none_or(|v| v.trim() != "no");
    package.spine.push(SpineItem { idref, linear });
}

fn store_field(metadata: &mut Metadata, kind: Field, text: String) {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return;
    }
    let slot = match kind {
        Field::Title => &mut metadata.title,
        Field::Creator => &mut metadata.creator,
        Field::Language => &mut metadata.language,
    };
    // First occurrence wins.
    slot.get_or_insert(text);
}
