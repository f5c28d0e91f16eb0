//! Detail panel: sharpening and noise reduction.

use super::{OutputGate, ScalarRule};
use crate::context::ConversionContext;
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::range::{self, approx_eq, is_set, Range, POSITIVE_PERCENT};
use tracing::debug;

pub static SHARPNESS: ScalarRule = ScalarRule {
    fields: &["Sharpness"],
    filter: "CISharpenLuminance",
    parameter: "inputSharpness",
    transform: |v| range::convert(v, POSITIVE_PERCENT, Range::new(0.0, 2.0), true),
    gate: OutputGate::AboveEpsilon,
};

pub const UNSHARP_MASK_FILTER: &str = "UnsharpMaskFilter";

const DEFAULT_UNSHARP_AMOUNT: f64 = 0.85;
const DEFAULT_UNSHARP_RADIUS: f64 = 1.0;
const DEFAULT_UNSHARP_THRESHOLD: f64 = 0.4;

/// Unsharp mask from `SharpenDetail`, `SharpenRadius` and `SharpenThreshold`.
///
/// The mask is only emitted when the detail amount is approximately zero.
// TODO: confirm whether the amount condition should be inverted; downstream
// presets with non-zero detail currently get no unsharp mask.
pub fn unsharp_mask(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let detail = ctx.float("SharpenDetail");
    let radius = ctx.float("SharpenRadius");
    let threshold = ctx.float("SharpenThreshold");
    if detail.is_none() && radius.is_none() && threshold.is_none() {
        return Ok(());
    }

    let amount = detail.map_or(DEFAULT_UNSHARP_AMOUNT, |d| d / 100.0);
    if !approx_eq(amount, 0.0) {
        return Ok(());
    }

    let radius = radius.unwrap_or(DEFAULT_UNSHARP_RADIUS);
    let threshold = threshold.unwrap_or(DEFAULT_UNSHARP_THRESHOLD);
    debug!(amount, radius, threshold, "unsharp mask");
    ctx.push(
        FilterDescriptor::new(UNSHARP_MASK_FILTER)
            .scalar("inputAmount", amount)
            .scalar("inputRadius", radius)
            .scalar("inputThreshold", threshold),
    );
    Ok(())
}

pub const NOISE_REDUCTION_FILTER: &str = "CINoiseReduction";

const NOISE_LEVEL: Range = Range::new(0.0, 0.1);
const NOISE_SHARPNESS: Range = Range::new(0.0, 0.2);

/// Color noise reduction. The detail field is only read alongside an amount.
pub fn noise_reduction(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let Some(amount) = ctx.float("ColorNoiseReduction") else {
        return Ok(());
    };
    if !is_set(amount) {
        return Ok(());
    }
    let detail = ctx.float("ColorNoiseReductionDetail").unwrap_or(0.0);

    let level = range::convert(amount, POSITIVE_PERCENT, NOISE_LEVEL, true);
    let sharpness = range::convert(detail, POSITIVE_PERCENT, NOISE_SHARPNESS, true);
    debug!(level, sharpness, "noise reduction");
    ctx.push(
        FilterDescriptor::new(NOISE_REDUCTION_FILTER)
            .scalar("inputNoiseLevel", level)
            .scalar("inputSharpness", sharpness),
    );
    Ok(())
}
