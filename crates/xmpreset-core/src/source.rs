//! Parameter source abstraction.
//!
//! Feature processors read develop settings by field name through
//! [`ParameterSource`]. Reads are side-effect free and may be repeated; a
//! missing field and a field that is present but unreadable are reported as
//! distinct errors so callers can treat the first as "feature not present" and
//! the second as a warning.

use thiserror::Error;

/// Error types for parameter reads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The field does not exist.
    #[error("field {name} is not present")]
    Missing { name: String },

    /// The field exists but its value has the wrong shape or syntax.
    #[error("field {name} has value {value:?}, expected {expected}")]
    Malformed {
        name: String,
        value: String,
        expected: &'static str,
    },

    /// Array index past the end of an array field.
    #[error("field {name} has {len} items, index {index} is out of range")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

impl SourceError {
    pub fn missing(name: &str) -> Self {
        SourceError::Missing {
            name: name.to_string(),
        }
    }

    pub fn malformed(name: &str, value: &str, expected: &'static str) -> Self {
        SourceError::Malformed {
            name: name.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

/// Read-only lookup of develop settings by field name.
pub trait ParameterSource {
    /// Check whether a field is present.
    fn exists(&self, name: &str) -> bool;

    /// Read a simple field as a string.
    fn get_string(&self, name: &str) -> Result<String, SourceError>;

    /// Read a localized text field, honouring the source's language preference.
    fn get_localized_text(&self, name: &str) -> Result<String, SourceError> {
        self.get_string(name)
    }

    /// Number of items in an array field; zero if absent or not an array.
    fn count_array_items(&self, name: &str) -> usize;

    /// Read an array item (0-based).
    fn get_array_item(&self, name: &str, index: usize) -> Result<String, SourceError>;

    /// Read a numeric field. Sidecars write signed values with an explicit
    /// `+`, which is accepted.
    fn get_float(&self, name: &str) -> Result<f64, SourceError> {
        let raw = self.get_string(name)?;
        parse_float(&raw).ok_or_else(|| SourceError::malformed(name, &raw, "a number"))
    }

    /// Read a boolean field (`True`/`False` in any case, or `1`/`0`).
    fn get_bool(&self, name: &str) -> Result<bool, SourceError> {
        let raw = self.get_string(name)?;
        parse_bool(&raw).ok_or_else(|| SourceError::malformed(name, &raw, "a boolean"))
    }
}

/// Parse a float, tolerating surrounding whitespace.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a boolean in any of the spellings sidecars use.
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Minimal source backed by a map of simple values.
    struct Fields(HashMap<&'static str, &'static str>);

    impl ParameterSource for Fields {
        fn exists(&self, name: &str) -> bool {
            self.0.contains_key(name)
        }

        fn get_string(&self, name: &str) -> Result<String, SourceError> {
            self.0
                .get(name)
                .map(|v| v.to_string())
                .ok_or_else(|| SourceError::missing(name))
        }

        fn count_array_items(&self, _name: &str) -> usize {
            0
        }

        fn get_array_item(&self, name: &str, index: usize) -> Result<String, SourceError> {
            Err(SourceError::IndexOutOfRange {
                name: name.to_string(),
                index,
                len: 0,
            })
        }
    }

    fn fields(pairs: &[(&'static str, &'static str)]) -> Fields {
        Fields(pairs.iter().copied().collect())
    }

    #[test]
    fn test_parse_float_signed() {
        assert_eq!(parse_float("+0.50"), Some(0.5));
        assert_eq!(parse_float(" -12 "), Some(-12.0));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float("inf"), None);
    }

    #[test]
    fn test_parse_bool_spellings() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_default_get_float() {
        let source = fields(&[("Exposure2012", "+1.25"), ("Name", "Soft")]);
        assert_eq!(source.get_float("Exposure2012"), Ok(1.25));
        assert_eq!(
            source.get_float("Name"),
            Err(SourceError::malformed("Name", "Soft", "a number"))
        );
        assert_eq!(source.get_float("Contrast"), Err(SourceError::missing("Contrast")));
    }

    #[test]
    fn test_default_get_bool() {
        let source = fields(&[("ConvertToGrayscale", "True")]);
        assert_eq!(source.get_bool("ConvertToGrayscale"), Ok(true));
    }

    #[test]
    fn test_default_localized_text_falls_back_to_string() {
        let source = fields(&[("Group", "Film")]);
        assert_eq!(source.get_localized_text("Group").unwrap(), "Film");
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::malformed("Vibrance", "x", "a number");
        assert_eq!(err.to_string(), r#"field Vibrance has value "x", expected a number"#);
    }
}
