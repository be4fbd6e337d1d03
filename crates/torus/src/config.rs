use std::f64::consts::TAU;

use thiserror::Error;

use crate::palette::Palette;
use crate::reference;

/// Largest grid, in cells, a config may describe.
pub const MAX_CELLS: usize = 1 << 24;

/// Most angles θ or φ may take per full turn.
pub const MAX_STEPS_PER_TURN: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("{name} must be finite and > 0, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{width}x{height} grid exceeds {max} cells")]
    GridTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("{name}={step} needs more than {max} samples per turn")]
    TooManySamples {
        name: &'static str,
        step: f64,
        max: usize,
    },

    #[error("camera distance k2={k2} must exceed r1 + r2 = {extent}")]
    CameraInsideTorus { k2: f64, extent: f64 },

    #[error("palette needs at least {min} glyphs, got {len}")]
    PaletteTooShort { len: usize, min: usize },

    #[error("blank glyph must not be empty")]
    EmptyBlank,

    #[error("glyph {glyph:?} at level {level} is not {width} characters wide")]
    RaggedGlyph {
        level: usize,
        glyph: String,
        width: usize,
    },
}

/// Unvalidated renderer constants. `Default` gives the reference animation.
#[derive(Debug, Clone, PartialEq)]
pub struct TorusParams {
    pub width: usize,
    pub height: usize,
    pub theta_spacing: f64,
    pub phi_spacing: f64,
    /// Tube radius.
    pub r1: f64,
    /// Revolution radius.
    pub r2: f64,
    /// Camera distance.
    pub k2: f64,
    pub palette: Palette,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            width: reference::WIDTH,
            height: reference::HEIGHT,
            theta_spacing: reference::THETA_SPACING,
            phi_spacing: reference::PHI_SPACING,
            r1: reference::R1,
            r2: reference::R2,
            k2: reference::K2,
            palette: Palette::default(),
        }
    }
}

impl TorusParams {
    /// Checks the constants once so that rendering never has to.
    ///
    /// Grid size and sample counts are capped so buffers and trig tables
    /// always fit in memory, and `k2 > r1 + r2` keeps every sample in front
    /// of the viewer, so `1/z` is always finite and positive.
    pub fn validate(self) -> Result<TorusConfig, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        if !matches!(self.width.checked_mul(self.height), Some(cells) if cells <= MAX_CELLS) {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_CELLS,
            });
        }

        for (name, value) in [
            ("theta_spacing", self.theta_spacing),
            ("phi_spacing", self.phi_spacing),
            ("r1", self.r1),
            ("r2", self.r2),
            ("k2", self.k2),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        for (name, step) in [
            ("theta_spacing", self.theta_spacing),
            ("phi_spacing", self.phi_spacing),
        ] {
            if TAU / step > MAX_STEPS_PER_TURN as f64 {
                return Err(ConfigError::TooManySamples {
                    name,
                    step,
                    max: MAX_STEPS_PER_TURN,
                });
            }
        }

        let extent = self.r1 + self.r2;
        if self.k2 <= extent {
            return Err(ConfigError::CameraInsideTorus { k2: self.k2, extent });
        }

        Ok(TorusConfig::from_valid(self))
    }
}

/// Projection scale that puts the outer rim `r1 + r2` at 3/8 of the grid
/// width from the center. Truncated to a whole number.
#[inline]
pub fn derive_k1(width: usize, r1: f64, r2: f64, k2: f64) -> f64 {
    (width as f64 * k2 * 3.0 / (8.0 * (r1 + r2))).trunc()
}

/// Validated, immutable renderer constants with the derived K1.
#[derive(Debug, Clone, PartialEq)]
pub struct TorusConfig {
    params: TorusParams,
    k1: f64,
}

impl TorusConfig {
    fn from_valid(params: TorusParams) -> Self {
        let k1 = derive_k1(params.width, params.r1, params.r2, params.k2);
        Self { params, k1 }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.params.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.params.height
    }

    #[inline]
    pub fn theta_spacing(&self) -> f64 {
        self.params.theta_spacing
    }

    #[inline]
    pub fn phi_spacing(&self) -> f64 {
        self.params.phi_spacing
    }

    #[inline]
    pub fn r1(&self) -> f64 {
        self.params.r1
    }

    #[inline]
    pub fn r2(&self) -> f64 {
        self.params.r2
    }

    #[inline]
    pub fn k2(&self) -> f64 {
        self.params.k2
    }

    #[inline]
    pub fn k1(&self) -> f64 {
        self.k1
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.params.palette
    }
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self::from_valid(TorusParams::default())
    }
}

impl TryFrom<TorusParams> for TorusConfig {
    type Error = ConfigError;

    fn try_from(params: TorusParams) -> Result<Self, Self::Error> {
        params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k1_for_reference_constants_is_18() {
        assert_eq!(derive_k1(30, 1.0, 2.0, 5.0), 18.0);
        assert_eq!(TorusConfig::default().k1(), 18.0);
    }

    #[test]
    fn k1_truncates() {
        // 80 * 5 * 3 / 24 = 50 exactly; 31 * 5 * 3 / 24 = 19.375
        assert_eq!(derive_k1(80, 1.0, 2.0, 5.0), 50.0);
        assert_eq!(derive_k1(31, 1.0, 2.0, 5.0), 19.0);
    }

    #[test]
    fn default_params_validate() {
        let config = TorusParams::default().validate().unwrap();
        assert_eq!(config, TorusConfig::default());
        assert_eq!(config.width(), 30);
        assert_eq!(config.height(), 30);
        assert_eq!(config.palette().levels(), 12);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let params = TorusParams {
            height: 0,
            ..TorusParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::EmptyGrid {
                width: 30,
                height: 0
            })
        );
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let params = TorusParams {
            phi_spacing: 0.0,
            ..TorusParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::NotPositive {
                name: "phi_spacing",
                value: 0.0
            })
        );

        let params = TorusParams {
            r1: f64::NAN,
            ..TorusParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotPositive { name: "r1", .. })
        ));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let params = TorusParams {
            width: usize::MAX / 2,
            height: 3,
            ..TorusParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::GridTooLarge { height: 3, .. })
        ));

        let params = TorusParams {
            width: MAX_CELLS,
            height: 2,
            ..TorusParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));

        let params = TorusParams {
            width: MAX_CELLS,
            height: 1,
            ..TorusParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn tiny_steps_are_rejected() {
        let params = TorusParams {
            theta_spacing: 1e-300,
            ..TorusParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::TooManySamples {
                name: "theta_spacing",
                step: 1e-300,
                max: MAX_STEPS_PER_TURN,
            })
        );

        let params = TorusParams {
            phi_spacing: 1e-5,
            ..TorusParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::TooManySamples { name: "phi_spacing", .. })
        ));
    }

    #[test]
    fn finest_accepted_step_renders() {
        let config = TorusParams {
            width: 4,
            height: 1,
            theta_spacing: TAU / MAX_STEPS_PER_TURN as f64 * 1.01,
            phi_spacing: 10.0,
            ..TorusParams::default()
        }
        .validate()
        .unwrap();

        let renderer = crate::FrameRenderer::new(config);
        assert!(renderer.samples_per_frame() <= MAX_STEPS_PER_TURN);
        let frame = renderer.render(crate::Orientation::new(0.4, 1.0));
        assert_eq!(frame.to_string().lines().count(), 1);
    }

    #[test]
    fn camera_inside_torus_is_rejected() {
        let params = TorusParams {
            k2: 3.0,
            ..TorusParams::default()
        };
        assert_eq!(
            TorusConfig::try_from(params),
            Err(ConfigError::CameraInsideTorus { k2: 3.0, extent: 3.0 })
        );
    }
}
