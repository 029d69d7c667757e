//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing.
//!
//! Feeds are read with a streaming `quick-xml` reader rather than a typed
//! schema because upstream feeds are loosely structured and drift often:
//! every `<item>` / `<entry>` becomes a [`RawEntry`] with whatever known
//! fields it carries. Text is kept escaped; entity decoding and tag
//! stripping happen in [`crate::normalize`].

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::models::RawEntry;
use crate::scrapers::SiteAdapter;

/// Adapter for any syndication feed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RssAdapter;

#[async_trait]
impl SiteAdapter for RssAdapter {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch(&self, fetcher: &Fetcher, url: &str) -> Vec<RawEntry> {
        fetcher.fetch_feed(url).await
    }

    fn parse(&self, payload: &str, _page_url: &str) -> Vec<RawEntry> {
        parse_feed(payload).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Content,
    Guid,
    Published,
    Updated,
    Created,
}

impl Field {
    fn from_tag(qname: &[u8]) -> Option<Self> {
        Some(match qname {
            b"title" | b"atom:title" => Field::Title,
            b"link" => Field::Link,
            b"description" | b"summary" | b"atom:summary" => Field::Description,
            b"content:encoded" | b"content" | b"atom:content" => Field::Content,
            b"guid" | b"id" | b"atom:id" => Field::Guid,
            b"pubDate" | b"published" | b"issued" | b"atom:published" => Field::Published,
            b"updated" | b"modified" | b"atom:updated" | b"dcterms:modified" => Field::Updated,
            b"dc:date" | b"dcterms:created" | b"created" => Field::Created,
            _ => return None,
        })
    }

    fn store(self, entry: &mut RawEntry, value: String) {
        if value.trim().is_empty() {
            return;
        }
        let slot = match self {
            Field::Title => &mut entry.title,
            Field::Link => &mut entry.link,
            Field::Description => &mut entry.description,
            Field::Content => &mut entry.content,
            Field::Guid => &mut entry.guid,
            Field::Published => &mut entry.published,
            Field::Updated => &mut entry.updated,
            Field::Created => &mut entry.created,
        };
        // first occurrence wins, e.g. a <link> before an alternate one
        if slot.is_none() {
            *slot = Some(value.trim().to_string());
        }
    }
}

fn is_entry(qname: &[u8]) -> bool {
    matches!(qname, b"item" | b"entry" | b"atom:entry")
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_image_type(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| m.starts_with("image/"))
}

/// Pull structured media and Atom links out of a tag that does not carry text.
fn apply_attributes(e: &BytesStart<'_>, entry: &mut RawEntry) {
    match e.name().as_ref() {
        b"media:content" | b"media:thumbnail" => {
            let medium = attr(e, b"medium");
            let kind = attr(e, b"type");
            let looks_like_image = medium.as_deref() == Some("image")
                || is_image_type(kind.as_deref())
                || (medium.is_none() && kind.is_none());
            if looks_like_image && entry.image.is_none() {
                entry.image = attr(e, b"url");
            }
        }
        b"enclosure" => {
            if is_image_type(attr(e, b"type").as_deref()) && entry.image.is_none() {
                entry.image = attr(e, b"url");
            }
        }
        b"link" | b"atom:link" => {
            let rel = attr(e, b"rel");
            match rel.as_deref() {
                None | Some("alternate") => {
                    if entry.link.is_none() {
                        entry.link = attr(e, b"href");
                    }
                }
                Some("enclosure") if is_image_type(attr(e, b"type").as_deref()) => {
                    if entry.image.is_none() {
                        entry.image = attr(e, b"href");
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
}

/// Parse a feed document into raw entries, in document order.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the document is not well-formed XML.
#[instrument(level = "debug", skip_all, fields(bytes = xml.len()))]
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    // (field, closing tag, accumulated text)
    let mut open: Option<(Field, Vec<u8>, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse("feed", format!("{e} at byte {}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                let qname = e.name();
                if is_entry(qname.as_ref()) {
                    current = Some(RawEntry::default());
                    open = None;
                    continue;
                }
                let Some(entry) = current.as_mut() else { continue };
                if open.is_some() {
                    // markup nested in a text field (e.g. XHTML content)
                    continue;
                }
                apply_attributes(&e, entry);
                if let Some(field) = Field::from_tag(qname.as_ref()) {
                    open = Some((field, qname.as_ref().to_vec(), String::new()));
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    if open.is_none() {
                        apply_attributes(&e, entry);
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, _, text)) = open.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                if let Some((_, _, text)) = open.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, _, text)) = open.as_mut() {
                    text.push('&');
                    text.push_str(&String::from_utf8_lossy(&r));
                    text.push(';');
                }
            }
            Event::End(e) => {
                let qname = e.name();
                let closes_field = open
                    .as_ref()
                    .is_some_and(|(_, tag, _)| tag.as_slice() == qname.as_ref());
                if closes_field {
                    if let (Some((field, _, text)), Some(entry)) = (open.take(), current.as_mut()) {
                        field.store(entry, text);
                    }
                } else if is_entry(qname.as_ref()) {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    open = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}
