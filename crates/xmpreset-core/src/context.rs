//! Per-run conversion state.
//!
//! A [`ConversionContext`] is created fresh for every conversion and threaded
//! through each pipeline stage. It owns the shared curve accumulators, the
//! filters emitted so far and the warnings collected along the way, and wraps
//! the parameter source with lookups that turn unreadable fields into
//! warnings.

use crate::bands::ColorBands;
use crate::error::{ConversionWarning, ConvertError, ConvertResult};
use crate::preset::{FilterDescriptor, PresetInfo};
use crate::source::{parse_float, ParameterSource, SourceError};
use crate::{CurvePoint, ToneCurve};
use tracing::{debug, warn};

/// Filter emitted when any automatic adjustment is requested.
pub const AUTO_ADJUST_FILTER: &str = "AutoAdjustFilter";

/// Mutable state of one conversion run.
pub struct ConversionContext<'a> {
    source: &'a dyn ParameterSource,
    /// Accumulated tone curve on a 0-100 scale
    pub tone_curve: ToneCurve,
    pub tone_curve_changed: bool,
    /// Accumulated per-band HSV adjustments
    pub bands: ColorBands,
    pub colors_changed: bool,
    /// Set when an edit implies a monochrome result
    pub convert_to_mono: bool,
    pub info: PresetInfo,
    auto_adjust_added: bool,
    filters: Vec<FilterDescriptor>,
    warnings: Vec<ConversionWarning>,
}

impl<'a> ConversionContext<'a> {
    /// Create a context with identity curves and no-op color bands.
    pub fn new(source: &'a dyn ParameterSource) -> Self {
        Self {
            source,
            tone_curve: ToneCurve::default(),
            tone_curve_changed: false,
            bands: ColorBands::new(),
            colors_changed: false,
            convert_to_mono: false,
            info: PresetInfo::default(),
            auto_adjust_added: false,
            filters: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a dyn ParameterSource {
        self.source
    }

    pub fn exists(&self, name: &str) -> bool {
        self.source.exists(name)
    }

    /// First of `names` present in the source.
    pub fn first_present(&self, names: &[&'static str]) -> Option<&'static str> {
        names.iter().copied().find(|name| self.source.exists(name))
    }

    /// Read a numeric field. Absent fields are `None`; unreadable ones are
    /// `None` plus a warning.
    pub fn float(&mut self, name: &str) -> Option<f64> {
        if !self.source.exists(name) {
            return None;
        }
        let value = self.source.get_float(name);
        self.readable(name, value)
    }

    /// Read the first present of several field name variants.
    ///
    /// Later variants are not consulted once an earlier one is present, even
    /// if its value turns out to be unreadable.
    pub fn first_float(&mut self, names: &[&'static str]) -> Option<f64> {
        let name = self.first_present(names)?;
        self.float(name)
    }

    pub fn bool(&mut self, name: &str) -> Option<bool> {
        if !self.source.exists(name) {
            return None;
        }
        let value = self.source.get_bool(name);
        self.readable(name, value)
    }

    pub fn string(&mut self, name: &str) -> Option<String> {
        if !self.source.exists(name) {
            return None;
        }
        let value = self.source.get_string(name);
        self.readable(name, value)
    }

    pub fn first_string(&mut self, names: &[&'static str]) -> Option<String> {
        let name = self.first_present(names)?;
        self.string(name)
    }

    pub fn localized(&mut self, name: &str) -> Option<String> {
        if !self.source.exists(name) {
            return None;
        }
        let value = self.source.get_localized_text(name);
        self.readable(name, value)
    }

    /// Read an array of `"x, y"` points.
    ///
    /// # Errors
    /// Any item that is not exactly two comma-separated numbers fails the
    /// whole run with [`ConvertError::MalformedInput`].
    pub fn points(&self, name: &str) -> ConvertResult<Vec<CurvePoint>> {
        let count = self.source.count_array_items(name);
        let mut points = Vec::with_capacity(count);
        for index in 0..count {
            let item = self.source.get_array_item(name, index)?;
            let point = parse_point(&item).ok_or_else(|| ConvertError::MalformedInput {
                field: name.to_string(),
                index,
                item: item.clone(),
            })?;
            points.push(point);
        }
        Ok(points)
    }

    /// Record a non-fatal condition.
    pub fn warn(&mut self, warning: ConversionWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Append a filter to the output list.
    pub fn push(&mut self, filter: FilterDescriptor) {
        debug!(filter = %filter.key, parameters = filter.parameters.len(), "emit");
        self.filters.push(filter);
    }

    /// Emit the auto adjust filter unless it has already been emitted.
    pub fn request_auto_adjust(&mut self) {
        if !self.auto_adjust_added {
            self.auto_adjust_added = true;
            self.push(FilterDescriptor::new(AUTO_ADJUST_FILTER));
        }
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    /// Consume the context, returning the info, the filters in emission order
    /// and the warnings.
    pub fn finish(self) -> (PresetInfo, Vec<FilterDescriptor>, Vec<ConversionWarning>) {
        (self.info, self.filters, self.warnings)
    }

    fn readable<T>(&mut self, name: &str, value: Result<T, SourceError>) -> Option<T> {
        match value {
            Ok(v) => Some(v),
            Err(reason) => {
                self.warn(ConversionWarning::UnreadableField {
                    name: name.to_string(),
                    reason,
                });
                None
            }
        }
    }
}

/// Parse a `"x, y"` point item.
pub fn parse_point(item: &str) -> Option<CurvePoint> {
    let mut parts = item.split(',');
    let x = parse_float(parts.next()?)?;
    let y = parse_float(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(CurvePoint::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmp::XmpProperties;

    #[test]
    fn test_fresh_context_is_identity() {
        let props = XmpProperties::new();
        let ctx = ConversionContext::new(&props);
        assert!(ctx.tone_curve.is_linear());
        assert!(ctx.bands.is_noop());
        assert!(!ctx.tone_curve_changed);
        assert!(!ctx.colors_changed);
        assert!(ctx.filters().is_empty());
    }

    #[test]
    fn test_float_missing_is_silent() {
        let props = XmpProperties::new();
        let mut ctx = ConversionContext::new(&props);
        assert_eq!(ctx.float("Exposure2012"), None);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_float_malformed_warns() {
        let props = XmpProperties::new().with_value("Vibrance", "lots");
        let mut ctx = ConversionContext::new(&props);
        assert_eq!(ctx.float("Vibrance"), None);
        assert_eq!(ctx.warnings().len(), 1);
        assert!(matches!(
            &ctx.warnings()[0],
            ConversionWarning::UnreadableField { name, .. } if name == "Vibrance"
        ));
    }

    #[test]
    fn test_first_float_prefers_first_variant() {
        let props = XmpProperties::new()
            .with_value("Exposure", "1.0")
            .with_value("Exposure2012", "2.0");
        let mut ctx = ConversionContext::new(&props);
        assert_eq!(ctx.first_float(&["Exposure", "Exposure2012"]), Some(1.0));
        assert_eq!(ctx.first_float(&["Contrast", "Exposure2012"]), Some(2.0));
        assert_eq!(ctx.first_float(&["Contrast", "Contrast2012"]), None);
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("64, 56"), Some(CurvePoint::new(64.0, 56.0)));
        assert_eq!(parse_point("0,255"), Some(CurvePoint::new(0.0, 255.0)));
        assert_eq!(parse_point("64"), None);
        assert_eq!(parse_point("1, 2, 3"), None);
        assert_eq!(parse_point("a, 2"), None);
    }

    #[test]
    fn test_points_malformed_is_fatal() {
        let props = XmpProperties::new().with_array("ToneCurve", &["0, 0", "128, x"]);
        let ctx = ConversionContext::new(&props);
        let err = ctx.points("ToneCurve").unwrap_err();
        match err {
            ConvertError::MalformedInput { field, index, item } => {
                assert_eq!(field, "ToneCurve");
                assert_eq!(index, 1);
                assert_eq!(item, "128, x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_auto_adjust_emitted_once() {
        let props = XmpProperties::new();
        let mut ctx = ConversionContext::new(&props);
        ctx.request_auto_adjust();
        ctx.request_auto_adjust();
        assert_eq!(ctx.filters().len(), 1);
        assert_eq!(ctx.filters()[0].key, AUTO_ADJUST_FILTER);
    }
}
