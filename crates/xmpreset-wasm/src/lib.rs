//! XMPreset WASM - WebAssembly bindings for XMPreset
//!
//! This crate exposes the xmpreset-core conversion to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `convert` - XMP sidecar to preset conversion
//! - `types` - WASM-compatible wrapper for converted presets
//!
//! # Usage
//!
//! ```typescript
//! import init, { convert_xmp } from '@xmpreset/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const preset = convert_xmp(await file.text(), 'look.json');
//! console.log(`${preset.name}: ${preset.filter_count} filters`);
//! ```

use wasm_bindgen::prelude::*;

mod convert;
mod types;

pub use convert::{convert_xmp, convert_xmp_to_json};
pub use types::JsPreset;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
