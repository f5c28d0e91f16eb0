//! Turns the accumulated curve state into filters.
//!
//! These run as pipeline stages after every stage that can edit the tone
//! curve or the color bands, and emit nothing unless an edit marked the state
//! as changed.

use crate::bands::ColorBands;
use crate::context::ConversionContext;
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::ToneCurve;

pub const MULTI_BAND_HSV_FILTER: &str = "MultiBandHSV";
pub const TONE_CURVE_FILTER: &str = "CIToneCurve";

/// One `Position3` parameter per band, in band order.
pub fn multi_band_filter(bands: &ColorBands) -> FilterDescriptor {
    bands
        .iter()
        .fold(FilterDescriptor::new(MULTI_BAND_HSV_FILTER), |filter, (band, shift)| {
            filter.position3(&band.parameter_key(), shift.to_array())
        })
}

/// Five `Offset` parameters with both coordinates scaled from 0-100 to 0-1.
pub fn tone_curve_filter(curve: &ToneCurve) -> FilterDescriptor {
    curve
        .points
        .iter()
        .enumerate()
        .fold(FilterDescriptor::new(TONE_CURVE_FILTER), |filter, (i, point)| {
            filter.offset(&format!("inputPoint{i}"), [point.x / 100.0, point.y / 100.0])
        })
}

pub fn color_bands(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    if ctx.colors_changed {
        let filter = multi_band_filter(&ctx.bands);
        ctx.push(filter);
    }
    Ok(())
}

pub fn tone_curve(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    if ctx.tone_curve_changed {
        let filter = tone_curve_filter(&ctx.tone_curve);
        ctx.push(filter);
    }
    Ok(())
}
