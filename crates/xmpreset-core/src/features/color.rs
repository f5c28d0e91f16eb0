//! Color: HSV bands, camera calibration, gray mixer, grayscale and split
//! toning.

use crate::bands::ColorBand;
use crate::context::ConversionContext;
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::range::{self, is_set, DEGREES, FIELD_EPSILON, POSITIVE_PERCENT, UNIT};
use tracing::debug;

/// Number of hue sectors; a hue edit of 100% shifts by one sector.
const BAND_COUNT: f64 = 8.0;

/// Hue shift for a percentage edit, as a fraction of the full hue circle.
pub fn hue_shift(percent: f64) -> f64 {
    (percent / 100.0) / BAND_COUNT
}

// ============================================================================
// HSV
// ============================================================================

/// Per-band hue, saturation and luminance edits.
///
/// Only edits outside the field epsilon touch a band. A band whose three
/// edits add up to less than the field epsilon is reset to the no-op triple.
pub fn hsv(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let mut changed = false;

    for band in ColorBand::ALL {
        let tag = band.tag();
        let h = set_value(ctx.float(&format!("HueAdjustment{tag}")));
        let s = set_value(ctx.float(&format!("SaturationAdjustment{tag}")));
        let v = set_value(ctx.float(&format!("LuminanceAdjustment{tag}")));

        let total = h.abs() + s.abs() + v.abs();
        if total < FIELD_EPSILON {
            ctx.bands.reset(band);
            continue;
        }
        let shift = ctx.bands.get_mut(band);
        shift.hue += hue_shift(h);
        shift.saturation += s / 100.0;
        shift.value += v / 100.0;
        changed = true;
    }

    if changed {
        debug!(bands = ?ctx.bands, "hsv");
        ctx.colors_changed = true;
    }
    Ok(())
}

/// The field value when it carries a detectable change, otherwise zero.
fn set_value(value: Option<f64>) -> f64 {
    value.filter(|&v| is_set(v)).unwrap_or(0.0)
}

// ============================================================================
// Calibration
// ============================================================================

const CALIBRATION_BANDS: [ColorBand; 3] = [ColorBand::Red, ColorBand::Green, ColorBand::Blue];

/// Camera calibration hue and saturation for the primaries.
pub fn calibration(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let mut changed = false;

    for band in CALIBRATION_BANDS {
        let tag = band.tag();
        let h = set_value(ctx.float(&format!("{tag}Hue")));
        let s = set_value(ctx.float(&format!("{tag}Saturation")));
        if h == 0.0 && s == 0.0 {
            continue;
        }
        let shift = ctx.bands.get_mut(band);
        shift.hue += hue_shift(h);
        shift.saturation += s / 100.0;
        changed = true;
    }

    if changed {
        debug!(bands = ?ctx.bands, "calibration");
        ctx.colors_changed = true;
    }
    Ok(())
}

// ============================================================================
// Gray mixer and grayscale
// ============================================================================

/// Gray mixer weights become per-band saturation edits. Any weight outside
/// the field epsilon implies a monochrome result.
pub fn gray_mixer(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let mut weighted = false;
    for band in ColorBand::ALL {
        let weight = set_value(ctx.float(&format!("GrayMixer{}", band.tag())));
        if weight != 0.0 {
            ctx.bands.get_mut(band).saturation += weight / 100.0;
            weighted = true;
        }
    }
    if weighted {
        debug!("gray mixer requests monochrome");
        ctx.convert_to_mono = true;
        ctx.colors_changed = true;
    }
    Ok(())
}

pub const SATURATION_FILTER: &str = "SaturationFilter";

/// Saturation left in a monochrome result when bands were edited, so the
/// band edits still show.
const RESIDUAL_SATURATION: f64 = 0.001;

pub fn grayscale(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let requested = ctx.bool("ConvertToGrayscale").unwrap_or(false);
    if !(requested || ctx.convert_to_mono) {
        return Ok(());
    }
    let saturation = if ctx.colors_changed {
        RESIDUAL_SATURATION
    } else {
        0.0
    };
    debug!(saturation, "grayscale");
    ctx.push(FilterDescriptor::new(SATURATION_FILTER).scalar("inputSaturation", saturation));
    Ok(())
}

// ============================================================================
// Split toning
// ============================================================================

pub const SPLIT_TONING_FILTER: &str = "SplitToningFilter";

/// Split toning settings on the filter's scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitToning {
    pub highlight_hue: f64,
    pub highlight_saturation: f64,
    pub shadow_hue: f64,
    pub shadow_saturation: f64,
}

impl Default for SplitToning {
    fn default() -> Self {
        Self {
            highlight_hue: 0.0,
            highlight_saturation: 0.5,
            shadow_hue: 0.1,
            shadow_saturation: 0.5,
        }
    }
}

impl SplitToning {
    fn to_filter(self) -> FilterDescriptor {
        FilterDescriptor::new(SPLIT_TONING_FILTER)
            .scalar("inputHighlightHue", self.highlight_hue)
            .scalar("inputHighlightSaturation", self.highlight_saturation)
            .scalar("inputShadowHue", self.shadow_hue)
            .scalar("inputShadowSaturation", self.shadow_saturation)
    }
}

/// Split toning; fields that are absent keep their defaults. Emitted when at
/// least one field is outside the field epsilon.
pub fn split_toning(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let raw = [
        ctx.float("SplitToningHighlightHue"),
        ctx.float("SplitToningHighlightSaturation"),
        ctx.float("SplitToningShadowHue"),
        ctx.float("SplitToningShadowSaturation"),
    ];
    if !raw.iter().flatten().any(|&v| is_set(v)) {
        return Ok(());
    }

    let hue = |v: f64| range::convert(v, DEGREES, UNIT, false);
    let saturation = |v: f64| range::convert(v, POSITIVE_PERCENT, UNIT, true);
    let [highlight_hue, highlight_saturation, shadow_hue, shadow_saturation] = raw;

    let defaults = SplitToning::default();
    let toning = SplitToning {
        highlight_hue: highlight_hue.map_or(defaults.highlight_hue, hue),
        highlight_saturation: highlight_saturation.map_or(defaults.highlight_saturation, saturation),
        shadow_hue: shadow_hue.map_or(defaults.shadow_hue, hue),
        shadow_saturation: shadow_saturation.map_or(defaults.shadow_saturation, saturation),
    };

    debug!(?toning, "split toning");
    ctx.push(toning.to_filter());
    Ok(())
}
