//! Conversion bindings.
//!
//! # Example (TypeScript)
//! ```typescript
//! const xml = await file.text();
//! const preset = convert_xmp(xml, 'warm-film.json');
//! preset.log_warnings();
//! const json = preset.to_json(true);
//! preset.free();
//! ```

use crate::types::JsPreset;
use wasm_bindgen::prelude::*;
use xmpreset_core::ConvertOptions;

fn options(key: &str, language: Option<String>) -> ConvertOptions {
    let options = ConvertOptions::new(key);
    match language {
        Some(language) => options.with_language(language),
        None => options,
    }
}

fn run(xml: &str, key: &str, language: Option<String>) -> Result<JsPreset, String> {
    xmpreset_core::convert_xmp(xml, &options(key, language))
        .map(JsPreset::from)
        .map_err(|e| e.to_string())
}

/// Convert an XMP sidecar into a preset.
///
/// # Arguments
/// * `xml` - XMP packet text
/// * `key` - Identifier written into the preset
/// * `language` - Language for localized fields such as the preset name
///   (defaults to `en-US`)
///
/// # Errors
/// Returns error if the XML is malformed or a curve point cannot be read
#[wasm_bindgen]
pub fn convert_xmp(xml: &str, key: &str, language: Option<String>) -> Result<JsPreset, JsValue> {
    run(xml, key, language).map_err(|e| JsValue::from_str(&e))
}

/// Convert an XMP sidecar straight to preset JSON text.
///
/// Warnings are written to the browser console.
///
/// # Errors
/// Returns error if the XML is malformed or a curve point cannot be read
#[wasm_bindgen]
pub fn convert_xmp_to_json(xml: &str, key: &str, pretty: bool) -> Result<String, JsValue> {
    let preset = convert_xmp(xml, key, None)?;
    preset.log_warnings();
    preset.to_json(pretty)
}
