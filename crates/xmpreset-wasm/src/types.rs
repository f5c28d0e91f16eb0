//! WASM-compatible wrapper types for converted presets.

use js_sys::Array;
use wasm_bindgen::prelude::*;
use xmpreset_core::{Conversion, Preset};

/// A converted preset wrapper for JavaScript.
///
/// Holds the preset and the warnings raised while converting it. The preset
/// stays in WASM memory until `to_object()` or `to_json()` copies it out.
#[wasm_bindgen]
pub struct JsPreset {
    preset: Preset,
    warnings: Vec<String>,
}

#[cfg(test)]
impl JsPreset {
    pub(crate) fn preset(&self) -> &Preset {
        &self.preset
    }

    pub(crate) fn warning_messages(&self) -> &[String] {
        &self.warnings
    }
}

impl From<Conversion> for JsPreset {
    fn from(conversion: Conversion) -> Self {
        JsPreset {
            preset: conversion.preset,
            warnings: conversion.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[wasm_bindgen]
impl JsPreset {
    /// Output identifier
    #[wasm_bindgen(getter)]
    pub fn key(&self) -> String {
        self.preset.key.clone()
    }

    /// Preset name, if the sidecar carried one
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> Option<String> {
        self.preset.info.name.clone()
    }

    /// Preset group, if the sidecar carried one
    #[wasm_bindgen(getter)]
    pub fn group(&self) -> Option<String> {
        self.preset.info.group.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn filter_count(&self) -> usize {
        self.preset.filters.len()
    }

    /// Filter keys in execution order.
    pub fn filter_keys(&self) -> Array {
        self.preset
            .filters
            .iter()
            .map(|f| JsValue::from_str(&f.key))
            .collect()
    }

    /// Warning messages raised during conversion.
    pub fn warnings(&self) -> Array {
        self.warnings.iter().map(|w| JsValue::from_str(w)).collect()
    }

    /// Copy the preset into a plain JavaScript object.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_object(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.preset)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize preset: {}", e)))
    }

    /// Serialize the preset as JSON text.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self, pretty: bool) -> Result<String, JsValue> {
        self.preset
            .to_json(pretty)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Write every warning to the browser console.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmpreset_core::{ConversionWarning, FilterDescriptor, SourceError};

    fn conversion() -> Conversion {
        let mut preset = Preset::new("look.json");
        preset.info.name = Some("Look".to_string());
        preset.filters.push(FilterDescriptor::new("CIVibrance").scalar("inputAmount", 0.4));
        Conversion {
            preset,
            warnings: vec![ConversionWarning::UnreadableField {
                name: "Exposure2012".to_string(),
                reason: SourceError::malformed("Exposure2012", "bright", "a number"),
            }],
        }
    }

    #[test]
    fn test_from_conversion() {
        let js = JsPreset::from(conversion());
        assert_eq!(js.key(), "look.json");
        assert_eq!(js.name().as_deref(), Some("Look"));
        assert_eq!(js.group(), None);
        assert_eq!(js.filter_count(), 1);
        assert_eq!(js.warning_messages().len(), 1);
        assert!(js.warning_messages()[0].contains("Exposure2012"));
    }

    #[test]
    fn test_to_json() {
        let js = JsPreset::from(conversion());
        let json = js.to_json(false).unwrap();
        assert!(json.starts_with(r#"{"key":"look.json","info":{"name":"Look"}"#));
        assert!(json.contains("CIVibrance"));
    }
}
