//! Color band adjustment vectors.
//!
//! The multi-band HSV filter takes one `(hue shift, saturation multiplier,
//! value multiplier)` triple per hue sector. Several processors add into the
//! same triples, so the vectors live in the conversion context until they are
//! assembled into a single filter.

use serde::{Deserialize, Serialize};

/// One of the eight fixed hue sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Red,
    Orange,
    Yellow,
    Green,
    Aqua,
    Blue,
    Purple,
    Magenta,
}

impl ColorBand {
    /// All bands in filter parameter order.
    pub const ALL: [ColorBand; 8] = [
        ColorBand::Red,
        ColorBand::Orange,
        ColorBand::Yellow,
        ColorBand::Green,
        ColorBand::Aqua,
        ColorBand::Blue,
        ColorBand::Purple,
        ColorBand::Magenta,
    ];

    /// Capitalized name used as the suffix/prefix of sidecar field names,
    /// e.g. `HueAdjustmentOrange` or `RedHue`.
    pub fn tag(self) -> &'static str {
        match self {
            ColorBand::Red => "Red",
            ColorBand::Orange => "Orange",
            ColorBand::Yellow => "Yellow",
            ColorBand::Green => "Green",
            ColorBand::Aqua => "Aqua",
            ColorBand::Blue => "Blue",
            ColorBand::Purple => "Purple",
            ColorBand::Magenta => "Magenta",
        }
    }

    /// Filter parameter key for this band.
    pub fn parameter_key(self) -> String {
        format!("input{}Shift", self.tag())
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Hue/saturation/value adjustment for a single band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvShift {
    /// Hue shift as a fraction of the full hue circle
    pub hue: f64,
    /// Saturation multiplier
    pub saturation: f64,
    /// Value (brightness) multiplier
    pub value: f64,
}

impl HsvShift {
    /// The identity adjustment: no hue shift, unit multipliers.
    pub const NOOP: HsvShift = HsvShift {
        hue: 0.0,
        saturation: 1.0,
        value: 1.0,
    };

    /// Check if this shift leaves colors unchanged
    pub fn is_noop(&self) -> bool {
        *self == Self::NOOP
    }

    /// Components in filter order.
    pub fn to_array(self) -> [f64; 3] {
        [self.hue, self.saturation, self.value]
    }
}

impl Default for HsvShift {
    fn default() -> Self {
        Self::NOOP
    }
}

/// Adjustment vectors for all eight bands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorBands {
    shifts: [HsvShift; 8],
}

impl ColorBands {
    /// Create a set of no-op vectors
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, band: ColorBand) -> HsvShift {
        self.shifts[band.index()]
    }

    pub fn get_mut(&mut self, band: ColorBand) -> &mut HsvShift {
        &mut self.shifts[band.index()]
    }

    /// Put a band back to the no-op triple.
    pub fn reset(&mut self, band: ColorBand) {
        self.shifts[band.index()] = HsvShift::NOOP;
    }

    /// Check if every band is a no-op
    pub fn is_noop(&self) -> bool {
        self.shifts.iter().all(HsvShift::is_noop)
    }

    /// Iterate bands with their shifts in filter parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorBand, HsvShift)> + '_ {
        ColorBand::ALL.iter().map(move |&band| (band, self.get(band)))
    }
}
