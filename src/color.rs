use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            // Start at a blue hue so two-category charts read blue / orange.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Maps category values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its distinct values.
    pub fn new(column: &str, values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(values.len());
        ColorMap {
            column: column.to_string(),
            mapping: values.iter().cloned().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value; unknown values are grey.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scales for heatmaps
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f64, LinSrgb)>,
    pub min: f64,
    pub max: f64,
}

fn lin(r: u8, g: u8, b: u8) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

impl ColorScale {
    /// Red for positive, blue for negative, white at the midpoint.
    pub fn diverging(min: f64, max: f64) -> Self {
        ColorScale {
            stops: vec![
                (0.0, lin(5, 48, 97)),
                (0.25, lin(67, 147, 195)),
                (0.5, lin(247, 247, 247)),
                (0.75, lin(214, 96, 77)),
                (1.0, lin(103, 0, 31)),
            ],
            min,
            max,
        }
    }

    /// White to dark navy, for counts and missingness.
    pub fn sequential(min: f64, max: f64) -> Self {
        ColorScale {
            stops: vec![
                (0.0, lin(247, 251, 255)),
                (0.5, lin(107, 174, 214)),
                (1.0, lin(13, 59, 102)),
            ],
            min,
            max,
        }
    }

    /// Colour for `value`, clamped to the scale range. `NaN` maps to `None`.
    pub fn color_for(&self, value: f64) -> Option<Color32> {
        if value.is_nan() {
            return None;
        }
        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let upper = self
            .stops
            .iter()
            .position(|(s, _)| *s >= t)
            .unwrap_or(self.stops.len() - 1)
            .max(1);
        let (s0, c0) = self.stops[upper - 1];
        let (s1, c1) = self.stops[upper];
        let local = if s1 > s0 { (t - s0) / (s1 - s0) } else { 0.0 };
        let mixed = c0.mix(c1, local as f32);
        Some(to_color32(Srgb::from_linear(mixed)))
    }

    /// Dark text on light cells, light text on dark cells.
    pub fn text_color_for(&self, value: f64) -> Color32 {
        match self.color_for(value) {
            Some(c) => {
                let luma = 0.299 * c.r() as f32 + 0.587 * c.g() as f32 + 0.114 * c.b() as f32;
                if luma > 140.0 {
                    Color32::BLACK
                } else {
                    Color32::WHITE
                }
            }
            None => Color32::GRAY,
        }
    }
}
