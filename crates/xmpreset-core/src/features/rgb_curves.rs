//! Per-channel RGB tone curves.
//!
//! Each channel is built from scratch on the 0-1 scale and never accumulates
//! with the composite tone curve. A channel whose curve is absent or unusable
//! stays at the identity line.

use crate::context::ConversionContext;
use crate::error::{ConversionWarning, ConvertResult};
use crate::preset::FilterDescriptor;
use crate::range::{self, approx_eq, CURVE_8BIT, UNIT};
use crate::spline;
use crate::CurvePoint;
use tracing::debug;

pub const RGB_CURVE_FILTER: &str = "RGBChannelToneCurve";

/// Fixed abscissas of each channel curve.
pub const RGB_ABSCISSAS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Point count that maps one-to-one onto the fixed abscissas.
const DIRECT_POINTS: usize = 5;

/// Channel curves need more points than this to be used.
const MIN_CHANNEL_POINTS: usize = 2;

/// One color channel of the RGB curve filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn tag(self) -> &'static str {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        }
    }

    /// Source field variants for this channel, newest first.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Channel::Red => &["ToneCurvePV2012Red", "ToneCurvePVRed"],
            Channel::Green => &["ToneCurvePV2012Green", "ToneCurvePVGreen"],
            Channel::Blue => &["ToneCurvePV2012Blue", "ToneCurvePVBlue"],
        }
    }
}

/// Outcome of reading one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCurve {
    /// No curve in the source.
    Absent,
    /// A curve was present but could not be used.
    Skipped,
    /// Output values at [`RGB_ABSCISSAS`].
    Curve([f64; 5]),
}

/// Build one channel's output values from its source points (0-255 scale).
///
/// Exactly five points are taken as-is, their y values rescaled and their x
/// values assumed to sit on the fixed abscissas. Any other count of more than
/// two points is fitted and resampled.
pub fn channel_outputs(points: &[CurvePoint]) -> Result<[f64; 5], spline::CurveError> {
    let mut outputs = [0.0; 5];
    if points.len() == DIRECT_POINTS {
        for (out, point) in outputs.iter_mut().zip(points) {
            *out = range::convert(point.y, CURVE_8BIT, UNIT, true);
        }
    } else {
        let sampled = spline::resample(points, CURVE_8BIT.hi, UNIT.hi, &RGB_ABSCISSAS)?;
        outputs.copy_from_slice(&sampled);
    }
    Ok(outputs)
}

fn read_channel(ctx: &mut ConversionContext<'_>, channel: Channel) -> ConvertResult<ChannelCurve> {
    let Some(field) = ctx.first_present(channel.fields()) else {
        return Ok(ChannelCurve::Absent);
    };
    let points = ctx.points(field)?;
    if points.is_empty() {
        return Ok(ChannelCurve::Absent);
    }
    if points.len() <= MIN_CHANNEL_POINTS {
        ctx.warn(ConversionWarning::InsufficientCurveData {
            curve: field.to_string(),
            count: points.len(),
        });
        return Ok(ChannelCurve::Skipped);
    }
    match channel_outputs(&points) {
        Ok(outputs) => Ok(ChannelCurve::Curve(outputs)),
        Err(reason) => {
            ctx.warn(ConversionWarning::UnfittableCurve {
                curve: field.to_string(),
                reason,
            });
            Ok(ChannelCurve::Skipped)
        }
    }
}

fn is_identity(outputs: &[f64; 5]) -> bool {
    outputs
        .iter()
        .zip(RGB_ABSCISSAS.iter())
        .all(|(&y, &x)| approx_eq(x, y))
}

/// Emit the RGB curve filter when at least one channel yields a usable,
/// non-identity curve.
pub fn rgb_curves(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let mut curves = [RGB_ABSCISSAS; 3];
    let mut usable = 0;

    for (channel, curve) in Channel::ALL.into_iter().zip(curves.iter_mut()) {
        match read_channel(ctx, channel)? {
            ChannelCurve::Curve(outputs) => {
                debug!(channel = channel.tag(), ?outputs, "channel curve");
                *curve = outputs;
                usable += 1;
            }
            ChannelCurve::Skipped => debug!(channel = channel.tag(), "channel left linear"),
            ChannelCurve::Absent => {}
        }
    }

    if usable == 0 || curves.iter().all(is_identity) {
        return Ok(());
    }

    let mut filter = FilterDescriptor::new(RGB_CURVE_FILTER);
    for (channel, curve) in Channel::ALL.into_iter().zip(curves) {
        let tag = channel.tag();
        filter = filter
            .vector(&format!("input{tag}Xvalues"), RGB_ABSCISSAS.to_vec())
            .vector(&format!("input{tag}Yvalues"), curve.to_vec());
    }
    ctx.push(filter);
    Ok(())
}
