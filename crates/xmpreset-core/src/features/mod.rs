//! Feature processors and the fixed conversion pipeline.
//!
//! Each stage reads zero or more develop settings and either appends a filter
//! or edits the shared curve state in the [`ConversionContext`]. Stages run in
//! the order of [`PIPELINE`]; that order is the order of the emitted filter
//! list, and it also decides precedence between stages that edit the same
//! tone curve points (an explicit tone curve runs after contrast and
//! blacks/whites, so it always wins).
//!
//! Single-field features whose whole behaviour is "read, remap, gate, emit"
//! are described declaratively as [`ScalarRule`]s.

pub mod basic;
pub mod color;
pub mod detail;
pub mod effects;
pub mod rgb_curves;
pub mod tone;

use crate::assemble;
use crate::context::ConversionContext;
use crate::error::ConvertResult;
use crate::preset::FilterDescriptor;
use crate::range::{is_set, FIELD_EPSILON};
use tracing::{debug, trace};

/// A pipeline step with custom logic.
pub type StepFn = for<'a, 'b> fn(&'a mut ConversionContext<'b>) -> ConvertResult<()>;

/// Extra emission condition checked on the converted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGate {
    /// Emit whenever the source value is set.
    Any,
    /// Emit only strictly positive results.
    Positive,
    /// Emit only results whose magnitude exceeds the field epsilon.
    AboveEpsilon,
}

impl OutputGate {
    fn passes(self, value: f64) -> bool {
        match self {
            OutputGate::Any => true,
            OutputGate::Positive => value > 0.0,
            OutputGate::AboveEpsilon => value.abs() > FIELD_EPSILON,
        }
    }
}

/// Declarative mapping of one source field to one single-parameter filter.
#[derive(Debug)]
pub struct ScalarRule {
    /// Field name variants; the first present one is read
    pub fields: &'static [&'static str],
    pub filter: &'static str,
    pub parameter: &'static str,
    pub transform: fn(f64) -> f64,
    pub gate: OutputGate,
}

impl ScalarRule {
    /// Map a raw source value to its filter value, or `None` if the value
    /// does not warrant a filter.
    pub fn evaluate(&self, raw: f64) -> Option<f64> {
        if !is_set(raw) {
            return None;
        }
        let value = (self.transform)(raw);
        self.gate.passes(value).then_some(value)
    }

    fn apply(&self, ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
        let Some(raw) = ctx.first_float(self.fields) else {
            return Ok(());
        };
        match self.evaluate(raw) {
            Some(value) => {
                debug!(filter = self.filter, raw, value, "scalar adjustment");
                ctx.push(FilterDescriptor::new(self.filter).scalar(self.parameter, value));
            }
            None => trace!(filter = self.filter, raw, "no detectable change"),
        }
        Ok(())
    }
}

/// What a pipeline stage does.
pub enum Stage {
    Rule(&'static ScalarRule),
    Step(StepFn),
}

/// A named pipeline stage.
pub struct PipelineStage {
    pub name: &'static str,
    pub stage: Stage,
}

impl PipelineStage {
    const fn rule(name: &'static str, rule: &'static ScalarRule) -> Self {
        Self {
            name,
            stage: Stage::Rule(rule),
        }
    }

    const fn step(name: &'static str, step: StepFn) -> Self {
        Self {
            name,
            stage: Stage::Step(step),
        }
    }

    pub fn run(&self, ctx: &mut ConversionContext<'_>) -> ConvertResult<()> {
        trace!(stage = self.name, "run");
        match &self.stage {
            Stage::Rule(rule) => rule.apply(ctx),
            Stage::Step(step) => step(ctx),
        }
    }
}

/// The conversion pipeline, in filter emission order.
pub static PIPELINE: [PipelineStage; 24] = [
    PipelineStage::step("info", basic::info),
    PipelineStage::step("auto", basic::auto_adjust),
    PipelineStage::step("white balance", basic::white_balance),
    PipelineStage::rule("exposure", &basic::EXPOSURE),
    PipelineStage::step("contrast", basic::contrast),
    PipelineStage::rule("clarity", &basic::CLARITY),
    PipelineStage::rule("vibrance", &basic::VIBRANCE),
    PipelineStage::rule("saturation", &basic::SATURATION),
    PipelineStage::rule("luminance sharpening", &detail::SHARPNESS),
    PipelineStage::step("unsharp mask", detail::unsharp_mask),
    PipelineStage::step("noise reduction", detail::noise_reduction),
    PipelineStage::step("grain", effects::grain),
    PipelineStage::step("shadows/highlights", tone::shadows_highlights),
    PipelineStage::step("hsv", color::hsv),
    PipelineStage::step("calibration", color::calibration),
    PipelineStage::step("gray mixer", color::gray_mixer),
    PipelineStage::step("rgb curves", rgb_curves::rgb_curves),
    PipelineStage::step("tone curve", tone::tone_curve),
    PipelineStage::step("parametric curve", tone::parametric_curve),
    PipelineStage::step("assemble color bands", assemble::color_bands),
    PipelineStage::step("assemble tone curve", assemble::tone_curve),
    PipelineStage::step("grayscale", color::grayscale),
    PipelineStage::step("split toning", color::split_toning),
    PipelineStage::step("vignette", effects::vignette),
];
