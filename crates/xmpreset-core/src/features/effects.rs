//! Effects panel: film grain and vignette.

use crate::context::ConversionContext;
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::range::{self, approx_eq, is_set, PERCENT, POSITIVE_PERCENT, SIGNED_UNIT, UNIT};
use tracing::debug;

pub const GRAIN_FILTER: &str = "FilmGrainFilter";

/// Film grain from `GrainAmount` and `GrainSize`, both percentages.
pub fn grain(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let amount = ctx.float("GrainAmount");
    let size = ctx.float("GrainSize");
    if amount.is_none() && size.is_none() {
        return Ok(());
    }

    let amount = range::convert(amount.unwrap_or(0.0), POSITIVE_PERCENT, UNIT, true);
    let size = range::convert(size.unwrap_or(0.0), POSITIVE_PERCENT, UNIT, true);
    if approx_eq(amount, 0.0) {
        return Ok(());
    }

    debug!(amount, size, "film grain");
    ctx.push(
        FilterDescriptor::new(GRAIN_FILTER)
            .scalar("inputAmount", amount)
            .scalar("inputSize", size),
    );
    Ok(())
}

pub const VIGNETTE_FILTER: &str = "CenteredVignetteFilter";

const DEFAULT_VIGNETTE_RADIUS: f64 = 0.5;
const DEFAULT_VIGNETTE_FALLOFF: f64 = 0.5;

/// Vignette settings on the filter's scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vignette {
    pub radius: f64,
    pub intensity: f64,
    pub falloff: f64,
}

impl Vignette {
    fn from_amount(amount: f64) -> Option<Self> {
        // darkening vignettes are negative in the source and positive here
        let intensity = range::convert(-amount, PERCENT, SIGNED_UNIT, true);
        is_set(intensity).then_some(Self {
            radius: DEFAULT_VIGNETTE_RADIUS,
            intensity,
            falloff: DEFAULT_VIGNETTE_FALLOFF,
        })
    }

    fn to_filter(self) -> FilterDescriptor {
        FilterDescriptor::new(VIGNETTE_FILTER)
            .scalar("inputRadius", self.radius)
            .scalar("inputIntensity", self.intensity)
            .scalar("inputFalloff", self.falloff)
    }
}

fn percent_to_unit(value: f64) -> f64 {
    range::convert(value, POSITIVE_PERCENT, UNIT, true)
}

/// Post-crop vignette settings, if the amount is set.
fn post_crop_vignette(ctx: &mut ConversionContext<'_>) -> Option<Vignette> {
    let mut vignette = Vignette::from_amount(ctx.float("PostCropVignetteAmount")?)?;
    if let Some(midpoint) = ctx.float("PostCropVignetteMidpoint") {
        vignette.radius = percent_to_unit(midpoint);
    }
    if let Some(feather) = ctx.float("PostCropVignetteFeather") {
        vignette.falloff = percent_to_unit(feather);
    }
    Some(vignette)
}

/// Lens-correction style vignette settings, if the amount is set.
fn lens_vignette(ctx: &mut ConversionContext<'_>) -> Option<Vignette> {
    let mut vignette = Vignette::from_amount(ctx.float("VignetteAmount")?)?;
    if let Some(radius) = ctx.float("Radius") {
        vignette.radius = percent_to_unit(radius);
    }
    Some(vignette)
}

/// Post-crop vignette settings take precedence over the older lens vignette
/// fields, which are only consulted when no post-crop amount is set.
pub fn vignette(ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
    let vignette = match post_crop_vignette(ctx) {
        Some(v) => Some(v),
        None => lens_vignette(ctx),
    };
    if let Some(vignette) = vignette {
        debug!(?vignette, "vignette");
        ctx.push(vignette.to_filter());
    }
    Ok(())
}
