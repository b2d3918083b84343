//! Hand-drawn ("rough") rendering inputs
//!
//! The sketch algorithm itself lives behind [`RoughRenderer`]. This module
//! only describes what a renderer is asked to draw: SVG path data plus a
//! [`RoughOptions`] bundle.

use motif_animation::Interpolate;
use motif_core::{Brush, Color, DrawContext};
use serde::{Deserialize, Serialize};

/// How the interior of a rough shape is filled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoughFillStyle {
    /// Parallel lines
    #[default]
    Hachure,
    Solid,
    Zigzag,
    CrossHatch,
    Dots,
    Dashed,
    ZigzagLine,
}

/// Appearance of the hand-drawn style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoughConfig {
    /// 0 draws a clean shape; typical values go up to 10
    pub roughness: f64,
    /// How far lines bend away from straight
    pub bowing: f64,
    /// Fixed random seed; shapes without one derive a stable seed
    pub seed: Option<u64>,
    pub fill_style: RoughFillStyle,
    pub fill_weight: Option<f64>,
    /// Hachure angle in degrees
    pub hachure_angle: f64,
    /// Hachure spacing; four times the stroke width when unset
    pub hachure_gap: Option<f64>,
    pub curve_step_count: Option<f64>,
    pub simplification: Option<f64>,
    pub disable_multi_stroke: bool,
    pub disable_multi_stroke_fill: bool,
}

impl Default for RoughConfig {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            bowing: 1.0,
            seed: None,
            fill_style: RoughFillStyle::Hachure,
            fill_weight: None,
            hachure_angle: -41.0,
            hachure_gap: None,
            curve_step_count: None,
            simplification: None,
            disable_multi_stroke: false,
            disable_multi_stroke_fill: false,
        }
    }
}

impl RoughConfig {
    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fill_style(mut self, fill_style: RoughFillStyle) -> Self {
        self.fill_style = fill_style;
        self
    }
}

fn lerp_option(from: Option<f64>, to: Option<f64>, t: f64) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        _ if t < 0.5 => from,
        _ => to,
    }
}

/// Numeric settings blend; styles, flags and seeds switch halfway
impl Interpolate for RoughConfig {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let discrete = if t < 0.5 { self } else { other };
        Self {
            roughness: self.roughness + (other.roughness - self.roughness) * t,
            bowing: self.bowing + (other.bowing - self.bowing) * t,
            seed: discrete.seed,
            fill_style: discrete.fill_style,
            fill_weight: lerp_option(self.fill_weight, other.fill_weight, t),
            hachure_angle: self.hachure_angle + (other.hachure_angle - self.hachure_angle) * t,
            hachure_gap: lerp_option(self.hachure_gap, other.hachure_gap, t),
            curve_step_count: lerp_option(self.curve_step_count, other.curve_step_count, t),
            simplification: lerp_option(self.simplification, other.simplification, t),
            disable_multi_stroke: discrete.disable_multi_stroke,
            disable_multi_stroke_fill: discrete.disable_multi_stroke_fill,
        }
    }
}

/// Everything a rough renderer needs for one shape
#[derive(Clone, Debug, PartialEq)]
pub struct RoughOptions {
    pub config: RoughConfig,
    /// Resolved seed
    pub seed: u64,
    /// Only solid brushes carry over; gradients and patterns become `None`
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl RoughOptions {
    pub fn new(
        config: RoughConfig,
        seed: u64,
        fill: Option<&Brush>,
        stroke: Option<&Brush>,
        stroke_width: f64,
    ) -> Self {
        Self {
            config,
            seed,
            fill: fill.and_then(Brush::as_solid),
            stroke: stroke.and_then(Brush::as_solid),
            stroke_width,
        }
    }

    pub fn hachure_gap(&self) -> f64 {
        self.config.hachure_gap.unwrap_or(self.stroke_width * 4.0)
    }
}

/// Draws sketchy shapes from SVG path data
pub trait RoughRenderer {
    fn draw_path(&mut self, ctx: &mut dyn DrawContext, path_data: &str, options: &RoughOptions);
}
