//! TORUS: rasterizes a rotating torus into a fixed-size grid of ASCII glyphs.
//!
//! Per frame, the pipeline is:
//!   1. sampler   : walk θ (around the tube) outer, φ (around the axis) inner
//!   2. transform : rotate by A and B, push the torus K2 units in front of the
//!                  viewer, perspective-project with scale K1
//!   3. shade     : luminance L = surface normal · light direction; L <= 0 is
//!                  a back face and is dropped
//!   4. depth     : per cell, keep the sample with the largest 1/z
//!
//! The renderer performs no I/O. Printing frames, pacing and the choice of
//! angles belong to the caller (see the `donut` binary).
//!
//! Grid layout: row-major, `(x, y)` with `x` in `[0, width)` growing right and
//! `y` in `[0, height)` growing down.

mod config;
mod frame;
mod palette;
mod render;

pub use config::{
    derive_k1, ConfigError, TorusConfig, TorusParams, MAX_CELLS, MAX_STEPS_PER_TURN,
};
pub use frame::Frame;
pub use palette::{Palette, DEFAULT_BLANK, DEFAULT_GLYPHS, LUMINANCE_SCALE, MIN_LEVELS};
pub use render::{FrameRenderer, Orientation, SurfaceSample};

/// Constants of the reference animation.
pub mod reference {
    /// Grid width in cells.
    pub const WIDTH: usize = 30;

    /// Grid height in cells.
    pub const HEIGHT: usize = 30;

    /// Step of θ around the tube cross-section (radians).
    pub const THETA_SPACING: f64 = 0.07;

    /// Step of φ around the revolution axis (radians).
    pub const PHI_SPACING: f64 = 0.02;

    /// Tube radius.
    pub const R1: f64 = 1.0;

    /// Distance from the revolution axis to the tube center.
    pub const R2: f64 = 2.0;

    /// Distance from the viewer to the torus center.
    pub const K2: f64 = 5.0;
}
