//! Tone: blacks/whites, shadows/highlights, the point tone curve and the
//! parametric tone curve.
//!
//! All of these edit the shared 0-100 tone curve in the context. Point edits
//! are constrained by the neighbouring points minus a fixed margin so that the
//! curve never folds over itself. An explicit point curve replaces whatever
//! earlier stages did to the curve; the parametric curve then edits on top of
//! it.

use crate::context::ConversionContext;
use crate::curve::{move_constrained, POINT_MARGIN};
use crate::error::{ConversionWarning, ConvertResult};
use crate::preset::FilterDescriptor;
use crate::range::{approx_eq, clamp, is_set, FIELD_EPSILON};
use crate::spline::{self, MIN_POINTS};
use crate::{ToneCurve, TONE_CURVE_ABSCISSAS};
use tracing::debug;

pub const HIGHLIGHT_SHADOW_FILTER: &str = "CIHighlightShadowAdjust";

/// Lowest highlight amount the filter accepts.
const MIN_HIGHLIGHT_AMOUNT: f64 = 0.3;

/// Scale of the source point curves.
const SOURCE_CURVE_MAX: f64 = 255.0;

/// Scale of the accumulated tone curve.
const TONE_CURVE_MAX: f64 = 100.0;

/// Build the highlight/shadow filter for source shadow and highlight values.
///
/// Shadows map to `[-1, 1]`. The filter can only reduce highlights, so
/// positive highlight values map to the neutral 1.0 and negative ones to
/// `[0.3, 1]`. Returns `None` when the result would be neutral.
pub fn highlight_shadow_filter(shadows: f64, highlights: f64) -> Option<FilterDescriptor> {
    let shadow_amount = clamp(shadows / 100.0, -1.0, 1.0);
    let highlight_amount = if highlights < 0.0 {
        clamp(1.0 + highlights / 100.0, MIN_HIGHLIGHT_AMOUNT, 1.0)
    } else {
        1.0
    };
    if approx_eq(shadow_amount, 0.0) && approx_eq(highlight_amount, 1.0) {
        return None;
    }
    Some(
        FilterDescriptor::new(HIGHLIGHT_SHADOW_FILTER)
            .scalar("inputShadowAmount", shadow_amount)
            .scalar("inputHighlightAmount", highlight_amount),
    )
}

fn push_highlight_shadow(ctx: &mut ConversionContext<'_>, shadows: f64, highlights: f64) {
    if !is_set(shadows) && !is_set(highlights) {
        return;
    }
    match highlight_shadow_filter(shadows, highlights) {
        Some(filter) => {
            debug!(shadows, highlights, "highlight/shadow adjust");
            ctx.push(filter);
        }
        None => debug!(shadows, highlights, "highlight/shadow adjust is neutral"),
    }
}

// ============================================================================
// Shadows/highlights
// ============================================================================

/// Blacks and whites move the end points of the tone curve along the input
/// axis. Shadows and highlights go to the dedicated highlight/shadow filter.
/// Both can fire for the same sidecar.
pub fn shadows_highlights(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    if let Some(blacks) = ctx.first_float(&["Blacks", "Blacks2012"]) {
        if is_set(blacks) {
            let points = &mut ctx.tone_curve.points;
            points[0].x = move_constrained(points[0].x, -blacks, points[1].x - POINT_MARGIN, 0.0);
            debug!(blacks, x = points[0].x, "blacks");
            ctx.tone_curve_changed = true;
        }
    }

    if let Some(whites) = ctx.first_float(&["Whites", "Whites2012"]) {
        if is_set(whites) {
            let points = &mut ctx.tone_curve.points;
            points[4].x = move_constrained(
                points[4].x,
                -whites,
                TONE_CURVE_MAX,
                points[3].x + POINT_MARGIN,
            );
            debug!(whites, x = points[4].x, "whites");
            ctx.tone_curve_changed = true;
        }
    }

    let shadows = ctx.first_float(&["Shadows", "Shadows2012"]).unwrap_or(0.0);
    let highlights = ctx
        .first_float(&["Highlights", "Highlights2012"])
        .unwrap_or(0.0);
    push_highlight_shadow(ctx, shadows, highlights);
    Ok(())
}

// ============================================================================
// Point tone curve
// ============================================================================

/// Output values of a named tone curve at the fixed abscissas.
pub fn named_tone_curve(name: &str) -> Option<[f64; 5]> {
    match name {
        "Linear" => Some(TONE_CURVE_ABSCISSAS),
        "Medium Contrast" => Some([0.0, 20.0, 50.0, 80.0, 100.0]),
        "Strong Contrast" => Some([0.0, 15.0, 50.0, 85.0, 100.0]),
        _ => None,
    }
}

/// Replace the tone curve with a named curve and/or an explicit point curve.
///
/// The point curve is given on a 0-255 scale; it is fitted and resampled at
/// the fixed abscissas on the 0-100 scale. A point curve with fewer than two
/// points, or one that cannot be fitted, leaves the curve as it was and is
/// reported as a warning.
pub fn tone_curve(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let prior = ctx.tone_curve;
    let mut curve = prior;
    let mut found = false;

    if let Some(name) = ctx.first_string(&["ToneCurveName", "ToneCurveName2012"]) {
        match named_tone_curve(&name) {
            Some(outputs) => {
                curve = ToneCurve::from_outputs(outputs);
                found = true;
            }
            None => debug!(%name, "tone curve name has no preset shape"),
        }
    }

    if let Some(field) = ctx.first_present(&["ToneCurve", "ToneCurvePV2012"]) {
        let points = ctx.points(field)?;
        if points.len() < MIN_POINTS {
            ctx.warn(ConversionWarning::InsufficientCurveData {
                curve: field.to_string(),
                count: points.len(),
            });
        } else {
            match spline::resample(&points, SOURCE_CURVE_MAX, TONE_CURVE_MAX, &TONE_CURVE_ABSCISSAS) {
                Ok(outputs) => {
                    let mut values = [0.0; 5];
                    values.copy_from_slice(&outputs);
                    curve = ToneCurve::from_outputs(values);
                    found = true;
                }
                Err(reason) => ctx.warn(ConversionWarning::UnfittableCurve {
                    curve: field.to_string(),
                    reason,
                }),
            }
        }
    }

    if found && (!curve.approx_eq(&prior) || !curve.is_linear()) {
        debug!(?curve, "tone curve");
        ctx.tone_curve = curve;
        ctx.tone_curve_changed = true;
    }
    Ok(())
}

// ============================================================================
// Parametric curve
// ============================================================================

/// Split fields and the tone curve point whose input coordinate they set.
const SPLITS: [(&str, usize); 3] = [
    ("ParametricShadowSplit", 1),
    ("ParametricMidtoneSplit", 2),
    ("ParametricHighlightSplit", 3),
];

/// Apply the parametric curve on top of the current tone curve.
///
/// Darks and lights move the output of the end points; the split fields set
/// the input coordinates of the inner points directly. Parametric shadows and
/// highlights feed the highlight/shadow filter.
pub fn parametric_curve(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let mut magnitude = 0.0;

    if let Some(darks) = ctx.float("ParametricDarks") {
        if is_set(darks) {
            let points = &mut ctx.tone_curve.points;
            points[0].y = move_constrained(points[0].y, darks, points[1].y - POINT_MARGIN, 0.0);
            magnitude += darks.abs();
        }
    }

    for (field, index) in SPLITS {
        if let Some(split) = ctx.float(field) {
            let current = ctx.tone_curve.points[index].x;
            let distance = (split - current).abs();
            if is_set(split) && distance > FIELD_EPSILON {
                ctx.tone_curve.points[index].x = split;
                magnitude += distance;
            }
        }
    }

    if let Some(lights) = ctx.float("ParametricLights") {
        if is_set(lights) {
            let points = &mut ctx.tone_curve.points;
            points[4].y = move_constrained(
                points[4].y,
                lights,
                TONE_CURVE_MAX,
                points[3].y + POINT_MARGIN,
            );
            magnitude += lights.abs();
        }
    }

    if magnitude > FIELD_EPSILON {
        debug!(curve = ?ctx.tone_curve, "parametric curve");
        ctx.tone_curve_changed = true;
    }

    let shadows = ctx.float("ParametricShadows").unwrap_or(0.0);
    let highlights = ctx.float("ParametricHighlights").unwrap_or(0.0);
    push_highlight_shadow(ctx, shadows, highlights);
    Ok(())
}
