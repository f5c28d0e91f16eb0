//! Camera-raw properties read from XMP sidecars.
//!
//! [`XmpProperties`] is an in-memory property store keyed by the local name of
//! each camera-raw field (`Exposure2012`, `ToneCurvePV2012`, ...). It can be
//! filled by parsing an XMP packet or built up programmatically, and it is the
//! standard [`ParameterSource`] implementation.
//!
//! # Examples
//!
//! ```ignore
//! use xmpreset_core::{ParameterSource, XmpProperties};
//!
//! let props = XmpProperties::parse(&std::fs::read_to_string("photo.xmp")?)?;
//! if props.exists("Vibrance") {
//!     println!("vibrance {}", props.get_float("Vibrance")?);
//! }
//! ```

mod parse;

use crate::source::{ParameterSource, SourceError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Namespace URI of the camera-raw settings schema.
pub const CAMERA_RAW_NS: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";

/// Language used for localized text when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Language tag of the default alternative in an `rdf:Alt`.
pub const X_DEFAULT: &str = "x-default";

/// Error types for reading XMP packets.
#[derive(Debug, Error)]
pub enum XmpError {
    /// The packet is not well-formed XML.
    #[error("XMP parse error: {0}")]
    Xml(String),

    /// A value could not be decoded.
    #[error("XMP value could not be decoded: {0}")]
    Encoding(String),
}

/// A single camera-raw property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// Simple text value (attribute or element content)
    Simple(String),
    /// Ordered array (`rdf:Seq` or `rdf:Bag`)
    Array(Vec<String>),
    /// Language alternatives (`rdf:Alt`) as `(language, text)` pairs
    Alternatives(Vec<(String, String)>),
}

/// Camera-raw properties of one sidecar.
#[derive(Debug, Clone, PartialEq)]
pub struct XmpProperties {
    properties: BTreeMap<String, Property>,
    language: String,
}

impl Default for XmpProperties {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl XmpProperties {
    /// Create an empty property store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the camera-raw properties out of an XMP packet.
    ///
    /// # Errors
    /// Returns `XmpError` if the packet is not well-formed XML.
    pub fn parse(xml: &str) -> Result<Self, XmpError> {
        Self::parse_with_language(xml, DEFAULT_LANGUAGE)
    }

    /// Parse an XMP packet, preferring `language` for localized text.
    pub fn parse_with_language(xml: &str, language: &str) -> Result<Self, XmpError> {
        let properties = parse::read_properties(xml)?;
        Ok(Self {
            properties,
            language: language.to_string(),
        })
    }

    /// Set the preferred language for localized text.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Add a simple value.
    pub fn with_value(mut self, name: &str, value: impl ToString) -> Self {
        self.insert(name, Property::Simple(value.to_string()));
        self
    }

    /// Add an array value.
    pub fn with_array<S: AsRef<str>>(mut self, name: &str, items: &[S]) -> Self {
        let items = items.iter().map(|s| s.as_ref().to_string()).collect();
        self.insert(name, Property::Array(items));
        self
    }

    /// Add localized alternatives as `(language, text)` pairs.
    pub fn with_localized(mut self, name: &str, alternatives: &[(&str, &str)]) -> Self {
        let alternatives = alternatives
            .iter()
            .map(|(lang, text)| (lang.to_string(), text.to_string()))
            .collect();
        self.insert(name, Property::Alternatives(alternatives));
        self
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, name: &str, property: Property) {
        self.properties.insert(name.to_string(), property);
    }

    /// Look up a raw property.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Property names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Pick the best alternative: preferred language, then `x-default`, then
    /// the first entry.
    fn pick_alternative<'a>(&self, alternatives: &'a [(String, String)]) -> Option<&'a str> {
        let by_lang = |lang: &str| {
            alternatives
                .iter()
                .find(|(l, _)| l.eq_ignore_ascii_case(lang))
                .map(|(_, text)| text.as_str())
        };
        by_lang(&self.language)
            .or_else(|| by_lang(X_DEFAULT))
            .or_else(|| alternatives.first().map(|(_, text)| text.as_str()))
    }
}

impl ParameterSource for XmpProperties {
    fn exists(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    fn get_string(&self, name: &str) -> Result<String, SourceError> {
        match self.properties.get(name) {
            Some(Property::Simple(value)) => Ok(value.clone()),
            Some(Property::Alternatives(alternatives)) => self
                .pick_alternative(alternatives)
                .map(str::to_string)
                .ok_or_else(|| SourceError::malformed(name, "", "a non-empty alternative list")),
            Some(Property::Array(items)) => Err(SourceError::malformed(
                name,
                &items.join(" | "),
                "a simple value",
            )),
            None => Err(SourceError::missing(name)),
        }
    }

    fn get_localized_text(&self, name: &str) -> Result<String, SourceError> {
        self.get_string(name)
    }

    fn count_array_items(&self, name: &str) -> usize {
        match self.properties.get(name) {
            Some(Property::Array(items)) => items.len(),
            _ => 0,
        }
    }

    fn get_array_item(&self, name: &str, index: usize) -> Result<String, SourceError> {
        match self.properties.get(name) {
            Some(Property::Array(items)) => {
                items
                    .get(index)
                    .cloned()
                    .ok_or_else(|| SourceError::IndexOutOfRange {
                        name: name.to_string(),
                        index,
                        len: items.len(),
                    })
            }
            Some(Property::Simple(value)) => {
                Err(SourceError::malformed(name, value, "an array"))
            }
            Some(Property::Alternatives(_)) => {
                Err(SourceError::malformed(name, "", "an array"))
            }
            None => Err(SourceError::missing(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let props = XmpProperties::new()
            .with_value("Vibrance", "+40")
            .with_array("ToneCurvePV2012", &["0, 0", "255, 255"]);

        assert!(props.exists("Vibrance"));
        assert!(!props.exists("Saturation"));
        assert_eq!(props.get_float("Vibrance"), Ok(40.0));
        assert_eq!(props.count_array_items("ToneCurvePV2012"), 2);
        assert_eq!(props.get_array_item("ToneCurvePV2012", 1).unwrap(), "255, 255");
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_array_index_out_of_range() {
        let props = XmpProperties::new().with_array("ToneCurve", &["0, 0"]);
        assert_eq!(
            props.get_array_item("ToneCurve", 3),
            Err(SourceError::IndexOutOfRange {
                name: "ToneCurve".to_string(),
                index: 3,
                len: 1
            })
        );
    }

    #[test]
    fn test_array_is_not_a_simple_value() {
        let props = XmpProperties::new().with_array("ToneCurve", &["0, 0"]);
        assert!(matches!(
            props.get_string("ToneCurve"),
            Err(SourceError::Malformed { .. })
        ));
        assert_eq!(props.count_array_items("Missing"), 0);
    }

    #[test]
    fn test_localized_prefers_language() {
        let props = XmpProperties::new()
            .with_localized("Name", &[("x-default", "Warm"), ("de-DE", "Warm DE")])
            .with_language("de-de");
        assert_eq!(props.get_localized_text("Name").unwrap(), "Warm DE");
    }

    #[test]
    fn test_localized_falls_back_to_default_then_first() {
        let props = XmpProperties::new()
            .with_localized("Name", &[("fr-FR", "Chaud"), ("x-default", "Warm")])
            .with_localized("Group", &[("fr-FR", "Film")]);
        assert_eq!(props.get_localized_text("Name").unwrap(), "Warm");
        assert_eq!(props.get_localized_text("Group").unwrap(), "Film");
    }

    #[test]
    fn test_names_sorted() {
        let props = XmpProperties::new()
            .with_value("Tint", 5)
            .with_value("Exposure", 1);
        let names: Vec<&str> = props.names().collect();
        assert_eq!(names, vec!["Exposure", "Tint"]);
    }
}
