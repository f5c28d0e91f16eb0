//! Conversion entry points.
//!
//! A conversion creates a fresh [`ConversionContext`], runs every stage of
//! the pipeline over it in order, and packages the emitted filters as a
//! [`Preset`].

use crate::context::ConversionContext;
use crate::error::{ConversionWarning, ConvertResult};
use crate::features::PIPELINE;
use crate::preset::Preset;
use crate::source::ParameterSource;
use crate::xmp::XmpProperties;
use crate::ConvertOptions;
use tracing::info;

/// A converted preset together with the non-fatal warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub preset: Preset,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert develop settings into a preset, keeping the warnings.
///
/// # Errors
/// Fails on a malformed curve point or an unexpected source failure.
pub fn convert_with_report(
    source: &dyn ParameterSource,
    options: &ConvertOptions,
) -> ConvertResult<Conversion> {
    let mut ctx = ConversionContext::new(source);
    for stage in PIPELINE.iter() {
        stage.run(&mut ctx)?;
    }

    let (info, filters, warnings) = ctx.finish();
    info!(
        key = %options.key,
        filters = filters.len(),
        warnings = warnings.len(),
        "converted preset"
    );

    Ok(Conversion {
        preset: Preset {
            key: options.key.clone(),
            info,
            filters,
        },
        warnings,
    })
}

/// Convert develop settings into a preset.
pub fn convert(source: &dyn ParameterSource, options: &ConvertOptions) -> ConvertResult<Preset> {
    convert_with_report(source, options).map(|conversion| conversion.preset)
}

/// Parse an XMP packet and convert its camera-raw settings.
///
/// Localized text is resolved in `options.language`.
pub fn convert_xmp(xml: &str, options: &ConvertOptions) -> ConvertResult<Conversion> {
    let properties = XmpProperties::parse_with_language(xml, &options.language)?;
    convert_with_report(&properties, options)
}
