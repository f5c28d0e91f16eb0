//! XMP packet reader.
//!
//! Walks the RDF tree with a pull parser and collects every top-level
//! camera-raw property, whether written as an attribute of an
//! `rdf:Description`, as a simple element, as an `rdf:Seq`/`rdf:Bag` array or
//! as an `rdf:Alt` of language alternatives. Properties nested inside a
//! camera-raw struct (e.g. the fields of `crs:Look`) are not top-level and are
//! skipped along with the struct itself.

use super::{Property, XmpError, CAMERA_RAW_NS};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

const DEFAULT_PREFIX: &str = "crs";

/// Container shape of the property being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Simple,
    Array,
    Alternatives,
}

/// Array item currently open.
#[derive(Debug, Default)]
struct Item {
    lang: Option<String>,
    text: String,
}

/// A camera-raw property element that has been opened but not closed.
#[derive(Debug)]
struct Pending {
    name: String,
    /// Element stack depth of the property element itself
    depth: usize,
    shape: Shape,
    text: String,
    items: Vec<String>,
    alternatives: Vec<(String, String)>,
    item: Option<Item>,
    structured: bool,
}

impl Pending {
    fn new(name: String, depth: usize) -> Self {
        Self {
            name,
            depth,
            shape: Shape::Simple,
            text: String::new(),
            items: Vec::new(),
            alternatives: Vec::new(),
            item: None,
            structured: false,
        }
    }

    /// Open a child element at `level` below the property element.
    fn open_child(&mut self, local: &str, lang: Option<String>, level: usize) {
        match (local, level) {
            ("Seq" | "Bag", 1) => self.shape = Shape::Array,
            ("Alt", 1) => self.shape = Shape::Alternatives,
            ("li", 2) if self.shape != Shape::Simple => {
                self.item = Some(Item {
                    lang,
                    text: String::new(),
                })
            }
            (_, 1) => self.structured = true,
            _ => {}
        }
    }

    fn close_item(&mut self) {
        if let Some(item) = self.item.take() {
            match self.shape {
                Shape::Array => self.items.push(item.text),
                Shape::Alternatives => {
                    let lang = item.lang.unwrap_or_else(|| super::X_DEFAULT.to_string());
                    self.alternatives.push((lang, item.text));
                }
                Shape::Simple => {}
            }
        }
    }

    fn push_text(&mut self, text: &str, stack_len: usize) {
        if let Some(item) = self.item.as_mut() {
            item.text.push_str(text);
        } else if stack_len == self.depth {
            self.text.push_str(text);
        }
    }

    fn finish(self) -> Option<(String, Property)> {
        let property = match self.shape {
            Shape::Array => Property::Array(self.items),
            Shape::Alternatives => Property::Alternatives(self.alternatives),
            Shape::Simple if self.structured => return None,
            Shape::Simple => Property::Simple(self.text.trim().to_string()),
        };
        Some((self.name, property))
    }
}

/// Split a qualified name into `(prefix, local)`.
fn split_name(raw: &[u8]) -> (String, String) {
    let name = String::from_utf8_lossy(raw);
    match name.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), name.to_string()),
    }
}

/// Reader state shared across events.
struct PacketReader {
    prefixes: HashSet<String>,
    properties: BTreeMap<String, Property>,
    stack: Vec<String>,
    pending: Option<Pending>,
}

impl PacketReader {
    fn new() -> Self {
        Self {
            prefixes: HashSet::from([DEFAULT_PREFIX.to_string()]),
            properties: BTreeMap::new(),
            stack: Vec::new(),
            pending: None,
        }
    }

    /// Attributes of an element as `(qualified name, value)` pairs. Prefixes
    /// bound to the camera-raw namespace are recorded along the way.
    fn attributes(&mut self, e: &BytesStart) -> Result<Vec<(String, String)>, XmpError> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| XmpError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| XmpError::Encoding(format!("{key}: {err}")))?
                .to_string();
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                if value == CAMERA_RAW_NS {
                    self.prefixes.insert(prefix.to_string());
                }
            }
            out.push((key, value));
        }
        Ok(out)
    }

    fn is_camera_raw(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    fn store_attribute_properties(&mut self, attributes: &[(String, String)]) {
        for (key, value) in attributes {
            let (prefix, local) = split_name(key.as_bytes());
            if self.is_camera_raw(&prefix) {
                trace!(name = %local, "attribute property");
                self.properties
                    .insert(local, Property::Simple(value.trim().to_string()));
            }
        }
    }

    fn start(&mut self, e: &BytesStart, empty: bool) -> Result<(), XmpError> {
        let attributes = self.attributes(e)?;
        let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let (prefix, local) = split_name(qname.as_bytes());
        let lang = attributes
            .iter()
            .find(|(k, _)| k == "xml:lang")
            .map(|(_, v)| v.clone());
        let depth = self.stack.len();

        if let Some(pending) = self.pending.as_mut() {
            let level = depth + 1 - pending.depth;
            pending.open_child(&local, lang, level);
            if empty && local == "li" && level == 2 {
                pending.close_item();
            }
        } else if self.is_camera_raw(&prefix) {
            let resource = attributes
                .iter()
                .any(|(k, v)| k == "rdf:parseType" && v == "Resource");
            let rdf_value = attributes
                .iter()
                .find(|(k, _)| k == "rdf:value")
                .map(|(_, v)| v.trim().to_string());
            if empty {
                match rdf_value {
                    Some(value) => {
                        trace!(name = %local, "rdf:value property");
                        self.properties.insert(local, Property::Simple(value));
                    }
                    None if attributes.is_empty() => {
                        self.properties.insert(local, Property::Simple(String::new()));
                    }
                    None => debug!(name = %local, "skipping camera-raw struct written as attributes"),
                }
            } else {
                let mut pending = Pending::new(local, depth + 1);
                pending.structured = resource;
                self.pending = Some(pending);
            }
        } else {
            self.store_attribute_properties(&attributes);
        }

        if !empty {
            self.stack.push(qname);
        }
        Ok(())
    }

    fn end(&mut self) {
        let depth = self.stack.len();
        let property_depth = self.pending.as_ref().map(|p| p.depth);
        match property_depth {
            Some(d) if d == depth => {
                let finished = self.pending.take().and_then(Pending::finish);
                match finished {
                    Some((name, property)) => {
                        trace!(%name, "element property");
                        self.properties.insert(name, property);
                    }
                    None => debug!("skipping structured camera-raw property"),
                }
            }
            Some(d) if d + 2 == depth => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.close_item();
                }
            }
            _ => {}
        }
        self.stack.pop();
    }

    fn text(&mut self, text: &str) {
        let depth = self.stack.len();
        if let Some(pending) = self.pending.as_mut() {
            pending.push_text(text, depth);
        }
    }
}

/// Read all top-level camera-raw properties from an XMP packet.
pub(super) fn read_properties(xml: &str) -> Result<BTreeMap<String, Property>, XmpError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut state = PacketReader::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => state.start(&e, false)?,
            Ok(Event::Empty(e)) => state.start(&e, true)?,
            Ok(Event::End(_)) => state.end(),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| XmpError::Encoding(err.to_string()))?;
                state.text(&text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).to_string();
                state.text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmpError::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    debug!(count = state.properties.len(), "read camera-raw properties");
    Ok(state.properties)
}
