use clap::Parser;
use std::time::Duration;
use torus::{
    reference, ConfigError, Orientation, Palette, TorusConfig, TorusParams, DEFAULT_BLANK,
    DEFAULT_GLYPHS,
};

use crate::driver::Schedule;

/// `donut` - spins an ASCII torus in the terminal.
///
/// Every frame rotates the torus a little further and redraws it in place.
/// Defaults reproduce the reference animation: a 30x30 grid, 100 frames with
/// A advancing by 0.05 rad and B fixed at 1 rad.
#[derive(Parser, Debug, Clone)]
#[command(name = "donut", version, about, long_about = None)]
pub struct Config {
    /// Grid width in cells. Also sets the projection scale.
    #[arg(long, env = "DONUT_WIDTH", default_value_t = reference::WIDTH)]
    pub width: usize,

    /// Grid height in cells.
    #[arg(long, env = "DONUT_HEIGHT", default_value_t = reference::HEIGHT)]
    pub height: usize,

    /// Step around the tube cross-section (radians).
    #[arg(long, default_value_t = reference::THETA_SPACING)]
    pub theta_step: f64,

    /// Step around the revolution axis (radians).
    #[arg(long, default_value_t = reference::PHI_SPACING)]
    pub phi_step: f64,

    /// Tube radius.
    #[arg(long, default_value_t = reference::R1)]
    pub r1: f64,

    /// Revolution radius.
    #[arg(long, default_value_t = reference::R2)]
    pub r2: f64,

    /// Distance from the viewer to the torus center; must exceed r1 + r2.
    #[arg(long, default_value_t = reference::K2)]
    pub k2: f64,

    /// Whitespace-separated glyphs, dimmest first (at least 12).
    #[arg(long, env = "DONUT_PALETTE")]
    pub palette: Option<String>,

    /// Glyph for empty cells; every palette glyph must have its width.
    #[arg(long, default_value = DEFAULT_BLANK)]
    pub blank: String,

    /// Number of frames to render.
    #[arg(long, env = "DONUT_FRAMES", default_value_t = 100)]
    pub frames: u64,

    /// Initial A angle (radians).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub a_start: f64,

    /// A increment per frame (radians).
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub a_step: f64,

    /// Initial B angle (radians).
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub b: f64,

    /// B increment per frame (radians).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub b_step: f64,

    /// Pause between frames in milliseconds.
    #[arg(long, env = "DONUT_DELAY_MS", default_value_t = 1)]
    pub delay_ms: u64,

    /// Stop once this many seconds have elapsed, even if frames remain.
    #[arg(long)]
    pub max_seconds: Option<f64>,

    /// Rasterize θ bands on all cores.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Print frames one after another instead of redrawing in place.
    #[arg(long, default_value_t = false)]
    pub no_clear: bool,
}

impl Config {
    /// Builds the validated renderer constants.
    pub fn torus_config(&self) -> Result<TorusConfig, ConfigError> {
        let palette = match &self.palette {
            Some(glyphs) => Palette::parse(glyphs, &self.blank)?,
            None => Palette::new(DEFAULT_GLYPHS, &self.blank)?,
        };

        TorusParams {
            width: self.width,
            height: self.height,
            theta_spacing: self.theta_step,
            phi_spacing: self.phi_step,
            r1: self.r1,
            r2: self.r2,
            k2: self.k2,
            palette,
        }
        .validate()
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            frames: self.frames,
            start: Orientation::new(self.a_start, self.b),
            a_step: self.a_step,
            b_step: self.b_step,
            delay: Duration::from_millis(self.delay_ms),
            // Negative, NaN or overflowing budgets mean "no budget".
            budget: self
                .max_seconds
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}
