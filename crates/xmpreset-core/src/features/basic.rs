//! Basic panel: preset info, auto, white balance, exposure, contrast,
//! clarity, vibrance and saturation.

use super::{OutputGate, ScalarRule};
use crate::context::ConversionContext;
use crate::curve::{move_constrained, POINT_MARGIN};
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::range::{self, clamp, is_set, Range, PERCENT, POSITIVE_PERCENT, SIGNED_UNIT, UNIT};
use tracing::debug;

// ============================================================================
// Preset info and auto
// ============================================================================

/// Fields that request an automatic adjustment when present.
pub const AUTO_FIELDS: [&str; 4] = ["AutoBrightness", "AutoContrast", "AutoExposure", "AutoShadows"];

pub fn info(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    ctx.info.name = ctx.localized("Name");
    ctx.info.group = ctx.localized("Group");
    Ok(())
}

pub fn auto_adjust(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    if AUTO_FIELDS.iter().any(|name| ctx.exists(name)) {
        debug!("auto adjust requested");
        ctx.request_auto_adjust();
    }
    Ok(())
}

// ============================================================================
// White balance
// ============================================================================

pub const WHITE_BALANCE_FILTER: &str = "WhiteBalanceFilter";

/// Highest temperature the filter accepts, in kelvin.
pub const MAX_TEMPERATURE: f64 = 10000.0;

const DEFAULT_TEMPERATURE: f64 = 5500.0;
const TINT_RANGE: Range = PERCENT;

/// Named white balance presets as `(name, temperature, tint)`.
pub const WHITE_BALANCE_PRESETS: [(&str, f64, f64); 6] = [
    ("Daylight", 5500.0, 10.0),
    ("Cloudy", 6500.0, 10.0),
    ("Shade", 7500.0, 10.0),
    ("Tungsten", 2850.0, 0.0),
    ("Fluorescent", 3800.0, 21.0),
    ("Flash", 5500.0, 0.0),
];

/// Look up a named white balance preset.
pub fn white_balance_preset(name: &str) -> Option<(f64, f64)> {
    WHITE_BALANCE_PRESETS
        .iter()
        .find(|(preset, _, _)| *preset == name)
        .map(|&(_, temperature, tint)| (temperature, tint))
}

fn white_balance_filter(temperature: f64, tint: f64) -> FilterDescriptor {
    FilterDescriptor::new(WHITE_BALANCE_FILTER)
        .scalar("inputTemperature", temperature.min(MAX_TEMPERATURE))
        .scalar("inputTint", TINT_RANGE.clamp(tint))
}

fn custom_white_balance(ctx: &mut ConversionContext<'_>) -> FilterDescriptor {
    let temperature = ctx.float("Temperature").unwrap_or(DEFAULT_TEMPERATURE);
    let tint = ctx.float("Tint").unwrap_or(0.0);
    debug!(temperature, tint, "custom white balance");
    white_balance_filter(temperature, tint)
}

/// `WhiteBalance` names a preset, `Auto`, `Custom` or `As Shot`. A custom
/// balance reads `Temperature` and `Tint`; so does a sidecar that only carries
/// those two fields.
pub fn white_balance(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    match ctx.string("WhiteBalance").as_deref() {
        Some("Auto") => ctx.request_auto_adjust(),
        Some("Custom") => {
            let filter = custom_white_balance(ctx);
            ctx.push(filter);
        }
        Some(name) => match white_balance_preset(name) {
            Some((temperature, tint)) => {
                debug!(preset = name, temperature, tint, "white balance preset");
                ctx.push(white_balance_filter(temperature, tint));
            }
            None => debug!(preset = name, "white balance left as shot"),
        },
        None if ctx.exists("Temperature") || ctx.exists("Tint") => {
            let filter = custom_white_balance(ctx);
            ctx.push(filter);
        }
        None => {}
    }
    Ok(())
}

// ============================================================================
// Contrast
// ============================================================================

pub const CONTRAST_FILTER: &str = "ContrastFilter";

/// Output range of the contrast filter; 1.0 is neutral.
const CONTRAST_OUTPUT: Range = Range::new(1.0, 2.0);
const CONTRAST_MAX: f64 = 4.0;

/// Map a source contrast value to the contrast filter's input. Source values
/// are halved first since the filter is much stronger than the slider.
pub fn contrast_amount(raw: f64) -> f64 {
    let halved = raw / 2.0;
    let value = range::convert(halved, POSITIVE_PERCENT, CONTRAST_OUTPUT, false);
    clamp(value, CONTRAST_OUTPUT.lo, CONTRAST_MAX)
}

/// Positive contrast uses the contrast filter. The filter handles negative
/// contrast badly, so a negative value instead pulls the shadow point of the
/// tone curve down between its neighbours.
pub fn contrast(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let Some(raw) = ctx.first_float(&["Contrast", "Contrast2012"]) else {
        return Ok(());
    };
    if !is_set(raw) {
        return Ok(());
    }

    if raw > 0.0 {
        let value = contrast_amount(raw);
        debug!(raw, value, "contrast");
        ctx.push(FilterDescriptor::new(CONTRAST_FILTER).scalar("inputContrast", value));
    } else {
        let points = &mut ctx.tone_curve.points;
        let upper = points[2].y - POINT_MARGIN;
        let lower = points[0].y + POINT_MARGIN;
        points[1].y = move_constrained(points[1].y, raw / 2.0, upper, lower);
        debug!(raw, y = points[1].y, "negative contrast applied to tone curve");
        ctx.tone_curve_changed = true;
    }
    Ok(())
}

// ============================================================================
// Single-field adjustments
// ============================================================================

pub static EXPOSURE: ScalarRule = ScalarRule {
    fields: &["Exposure", "Exposure2012"],
    filter: "CIExposureAdjust",
    parameter: "inputEV",
    transform: |ev| ev,
    gate: OutputGate::Any,
};

/// Negative clarity is not supported by the filter.
pub static CLARITY: ScalarRule = ScalarRule {
    fields: &["Clarity", "Clarity2012"],
    filter: "ClarityFilter",
    parameter: "inputClarity",
    transform: |v| range::convert(v, POSITIVE_PERCENT, UNIT, true),
    gate: OutputGate::Positive,
};

pub static VIBRANCE: ScalarRule = ScalarRule {
    fields: &["Vibrance"],
    filter: "CIVibrance",
    parameter: "inputAmount",
    transform: |v| range::convert(v, PERCENT, SIGNED_UNIT, true),
    gate: OutputGate::AboveEpsilon,
};

pub static SATURATION: ScalarRule = ScalarRule {
    fields: &["Saturation"],
    filter: "SaturationFilter",
    parameter: "inputSaturation",
    transform: |v| range::convert(v, PERCENT, Range::new(0.0, 2.0), true),
    gate: OutputGate::Any,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmp::XmpProperties;

    fn run(props: &XmpProperties, step: crate::features::StepFn) -> ConversionContext<'_> {
        let mut ctx = ConversionContext::new(props);
        step(&mut ctx).unwrap();
        ctx
    }

    fn scalar(filter: &FilterDescriptor, key: &str) -> f64 {
        filter.param(key).and_then(|v| v.as_scalar()).unwrap()
    }

    #[test]
    fn test_info_reads_name_and_group() {
        let props = XmpProperties::new()
            .with_localized("Name", &[("x-default", "Warm Film")])
            .with_value("Group", "Film");
        let ctx = run(&props, info);
        assert_eq!(ctx.info.name.as_deref(), Some("Warm Film"));
        assert_eq!(ctx.info.group.as_deref(), Some("Film"));
    }

    #[test]
    fn test_auto_fields() {
        let props = XmpProperties::new().with_value("AutoShadows", "True");
        let ctx = run(&props, auto_adjust);
        assert_eq!(ctx.filters()[0].key, "AutoAdjustFilter");

        let empty = XmpProperties::new();
        let ctx = run(&empty, auto_adjust);
        assert!(ctx.filters().is_empty());
    }

    #[test]
    fn test_white_balance_cloudy() {
        let props = XmpProperties::new().with_value("WhiteBalance", "Cloudy");
        let ctx = run(&props, white_balance);
        let filter = &ctx.filters()[0];
        assert_eq!(filter.key, WHITE_BALANCE_FILTER);
        assert_eq!(scalar(filter, "inputTemperature"), 6500.0);
        assert_eq!(scalar(filter, "inputTint"), 10.0);
    }

    #[test]
    fn test_white_balance_as_shot_ignored() {
        let props = XmpProperties::new().with_value("WhiteBalance", "As Shot");
        assert!(run(&props, white_balance).filters().is_empty());
    }

    #[test]
    fn test_white_balance_auto_requests_auto_adjust() {
        let props = XmpProperties::new()
            .with_value("WhiteBalance", "Auto")
            .with_value("AutoExposure", "True");
        let mut ctx = ConversionContext::new(&props);
        auto_adjust(&mut ctx).unwrap();
        white_balance(&mut ctx).unwrap();
        assert_eq!(ctx.filters().len(), 1);
        assert_eq!(ctx.filters()[0].key, "AutoAdjustFilter");
    }

    #[test]
    fn test_white_balance_custom_clamps() {
        let props = XmpProperties::new()
            .with_value("WhiteBalance", "Custom")
            .with_value("Temperature", "25000")
            .with_value("Tint", "-150");
        let ctx = run(&props, white_balance);
        let filter = &ctx.filters()[0];
        assert_eq!(scalar(filter, "inputTemperature"), MAX_TEMPERATURE);
        assert_eq!(scalar(filter, "inputTint"), -100.0);
    }

    #[test]
    fn test_white_balance_custom_defaults() {
        let props = XmpProperties::new().with_value("WhiteBalance", "Custom");
        let ctx = run(&props, white_balance);
        let filter = &ctx.filters()[0];
        assert_eq!(scalar(filter, "inputTemperature"), 5500.0);
        assert_eq!(scalar(filter, "inputTint"), 0.0);
    }

    #[test]
    fn test_white_balance_temperature_without_mode() {
        let props = XmpProperties::new().with_value("Temperature", "4200");
        let ctx = run(&props, white_balance);
        assert_eq!(scalar(&ctx.filters()[0], "inputTemperature"), 4200.0);
    }

    #[test]
    fn test_positive_contrast_filter() {
        let props = XmpProperties::new().with_value("Contrast2012", "+50");
        let ctx = run(&props, contrast);
        let filter = &ctx.filters()[0];
        assert_eq!(filter.key, CONTRAST_FILTER);
        assert!((scalar(filter, "inputContrast") - 1.25).abs() < 1e-12);
        assert!(!ctx.tone_curve_changed);
    }

    #[test]
    fn test_contrast_amount_bounds() {
        assert!((contrast_amount(100.0) - 1.5).abs() < 1e-12);
        assert_eq!(contrast_amount(0.0), 1.0);
    }

    #[test]
    fn test_negative_contrast_edits_curve() {
        let props = XmpProperties::new().with_value("Contrast", "-40");
        let ctx = run(&props, contrast);
        assert!(ctx.filters().is_empty());
        assert!(ctx.tone_curve_changed);
        // -20% of the room between 25 and the lower bound 10
        assert!((ctx.tone_curve.points[1].y - 22.0).abs() < 1e-9);
        assert_eq!(ctx.tone_curve.points[1].x, 25.0);
    }

    #[test]
    fn test_contrast_within_epsilon_is_noop() {
        let props = XmpProperties::new().with_value("Contrast", "-0.01");
        let ctx = run(&props, contrast);
        assert!(ctx.filters().is_empty());
        assert!(!ctx.tone_curve_changed);
        assert!(ctx.tone_curve.is_linear());
    }

    #[test]
    fn test_clarity_negative_not_emitted() {
        assert_eq!(CLARITY.evaluate(-30.0), None);
        assert_eq!(CLARITY.evaluate(30.0), Some(0.3));
    }

    #[test]
    fn test_saturation_range() {
        assert_eq!(SATURATION.evaluate(-100.0), Some(0.0));
        assert_eq!(SATURATION.evaluate(50.0), Some(1.5));
        assert_eq!(SATURATION.evaluate(0.0), None);
    }

    #[test]
    fn test_vibrance_scale() {
        let v = VIBRANCE.evaluate(40.0).unwrap();
        assert!((v - 0.4).abs() < 1e-12);
    }
}
