//! Reading sidecars and writing preset documents.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use xmpreset_core::Preset;

pub fn read_sidecar(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write the preset as JSON, creating missing parent directories.
pub fn write_preset(preset: &Preset, path: &Path, pretty: bool) -> Result<()> {
    let json = preset.to_json(pretty).context("Failed to serialize preset")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "preset written");
    Ok(())
}
