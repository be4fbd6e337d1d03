use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use log::{debug, trace};
use rayon::prelude::*;

use crate::config::TorusConfig;
use crate::frame::{DepthBuffer, Frame};

/// Rotation angles of one frame, in radians.
///
/// `a` turns the torus about its own axis, `b` about the viewing axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub a: f64,
    pub b: f64,
}

impl Orientation {
    #[inline]
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

/// Sines and cosines of A and B, shared by every sample of a frame.
#[derive(Debug, Clone, Copy)]
struct Rotation {
    cos_a: f64,
    sin_a: f64,
    cos_b: f64,
    sin_b: f64,
}

impl Rotation {
    fn new(orientation: Orientation) -> Self {
        let (sin_a, cos_a) = orientation.a.sin_cos();
        let (sin_b, cos_b) = orientation.b.sin_cos();

        Self {
            cos_a,
            sin_a,
            cos_b,
            sin_b,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Angle {
    value: f64,
    cos: f64,
    sin: f64,
}

/// Angles `0, step, 2·step, ...` below 2π, accumulated by repeated addition.
///
/// `step` is bounded below by `TorusParams::validate`.
fn sweep(step: f64) -> Vec<Angle> {
    let mut angles = Vec::with_capacity((TAU / step).ceil() as usize);
    let mut value = 0.0;

    while value < TAU {
        let (sin, cos) = value.sin_cos();
        angles.push(Angle { value, cos, sin });
        value += step;
    }

    angles
}

/// One point of the torus surface after rotation and projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub theta: f64,
    pub phi: f64,
    /// Viewer space; `z` includes the camera distance K2.
    pub point: DVec3,
    /// `1 / point.z`; larger is closer.
    pub ooz: f64,
    /// Projected position before truncation to a cell.
    pub screen: DVec2,
    pub xp: i64,
    pub yp: i64,
    /// Surface normal · light direction, in `[-√2, √2]`.
    pub luminance: f64,
}

impl SurfaceSample {
    #[inline]
    pub fn is_front_facing(&self) -> bool {
        self.luminance > 0.0
    }
}

/// Rasterizes the torus described by a [`TorusConfig`] at any orientation.
///
/// The θ and φ trig tables are built once here; `render` only allocates the
/// per-frame buffers.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: TorusConfig,
    thetas: Vec<Angle>,
    phis: Vec<Angle>,
}

impl FrameRenderer {
    pub fn new(config: TorusConfig) -> Self {
        let thetas = sweep(config.theta_spacing());
        let phis = sweep(config.phi_spacing());

        debug!(
            "Torus renderer: {}x{} grid, {} x {} samples per frame, k1={}",
            config.width(),
            config.height(),
            thetas.len(),
            phis.len(),
            config.k1()
        );

        Self {
            config,
            thetas,
            phis,
        }
    }

    #[inline]
    pub fn config(&self) -> &TorusConfig {
        &self.config
    }

    pub fn samples_per_frame(&self) -> usize {
        self.thetas.len() * self.phis.len()
    }

    /// Every surface sample of a frame in rasterization order (θ outer,
    /// φ inner), back faces included.
    pub fn samples(&self, orientation: Orientation) -> impl Iterator<Item = SurfaceSample> + '_ {
        let rotation = Rotation::new(orientation);

        self.thetas.iter().flat_map(move |theta| {
            self.phis
                .iter()
                .map(move |phi| self.sample(&rotation, theta, phi))
        })
    }

    #[inline]
    fn sample(&self, rotation: &Rotation, theta: &Angle, phi: &Angle) -> SurfaceSample {
        let c = &self.config;
        let Rotation {
            cos_a,
            sin_a,
            cos_b,
            sin_b,
        } = *rotation;

        // Tube cross-section, before revolving about the axis.
        let circle_x = c.r2() + c.r1() * theta.cos;
        let circle_y = c.r1() * theta.sin;

        let point = DVec3::new(
            circle_x * (cos_b * phi.cos + sin_a * sin_b * phi.sin) - circle_y * cos_a * sin_b,
            circle_x * (sin_b * phi.cos - sin_a * cos_b * phi.sin) + circle_y * cos_a * cos_b,
            c.k2() + cos_a * circle_x * phi.sin + circle_y * sin_a,
        );
        let ooz = point.z.recip();

        // Grid rows grow downwards, so y flips.
        let screen = DVec2::new(
            (c.width() / 2) as f64 + c.k1() * ooz * point.x,
            (c.height() / 2) as f64 - c.k1() * ooz * point.y,
        );

        let luminance = phi.cos * theta.cos * sin_b
            - cos_a * theta.cos * phi.sin
            - sin_a * theta.sin
            + cos_b * (cos_a * theta.sin - theta.cos * sin_a * phi.sin);

        SurfaceSample {
            theta: theta.value,
            phi: phi.value,
            point,
            ooz,
            screen,
            xp: screen.x as i64,
            yp: screen.y as i64,
            luminance,
        }
    }

    fn rasterize(&self, rotation: &Rotation, thetas: &[Angle], depth: &mut DepthBuffer) {
        let palette = self.config.palette();

        for theta in thetas {
            for phi in &self.phis {
                let sample = self.sample(rotation, theta, phi);
                if !sample.is_front_facing() {
                    continue;
                }

                depth.plot(
                    sample.xp,
                    sample.yp,
                    sample.ooz,
                    palette.level_for(sample.luminance),
                );
            }
        }
    }

    /// Renders one frame on the calling thread.
    pub fn render(&self, orientation: Orientation) -> Frame {
        let rotation = Rotation::new(orientation);
        let mut depth = DepthBuffer::new(self.config.width(), self.config.height());

        self.rasterize(&rotation, &self.thetas, &mut depth);

        let frame = depth.into_frame(self.config.palette().clone());
        trace!(
            "Rendered a={:.3} b={:.3}: {} cells filled",
            orientation.a,
            orientation.b,
            frame.filled_cells()
        );

        frame
    }

    /// Renders one frame with θ split into bands across the rayon pool.
    ///
    /// Bands are merged in θ order, so the result equals [`Self::render`].
    pub fn render_par(&self, orientation: Orientation) -> Frame {
        let rotation = Rotation::new(orientation);
        let (width, height) = (self.config.width(), self.config.height());
        let band = self
            .thetas
            .len()
            .div_ceil(rayon::current_num_threads())
            .max(1);

        let bands: Vec<DepthBuffer> = self
            .thetas
            .par_chunks(band)
            .map(|thetas| {
                let mut depth = DepthBuffer::new(width, height);
                self.rasterize(&rotation, thetas, &mut depth);
                depth
            })
            .collect();

        let mut merged = DepthBuffer::new(width, height);
        for depth in bands {
            merged.merge(depth);
        }

        let frame = merged.into_frame(self.config.palette().clone());
        trace!(
            "Rendered a={:.3} b={:.3} in parallel: {} cells filled",
            orientation.a,
            orientation.b,
            frame.filled_cells()
        );

        frame
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(TorusConfig::default())
    }
}
