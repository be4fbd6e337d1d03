use std::sync::Arc;

use crate::config::ConfigError;

/// Reference glyphs, dimmest first. Doubled so a cell is roughly square.
pub const DEFAULT_GLYPHS: [&str; 12] = [
    "..", ",,", "--", "~~", "::", ";;", "==", "!!", "**", "##", "$$", "@@",
];

/// Glyph of a cell no front-facing sample landed in.
pub const DEFAULT_BLANK: &str = "  ";

/// Maps luminance in (0, √2] to a level; 8·√2 ≈ 11.3 truncates to 11.
pub const LUMINANCE_SCALE: f64 = 8.0;

/// Number of levels reachable through `LUMINANCE_SCALE`.
pub const MIN_LEVELS: usize = 12;

/// Ordered glyphs from least to most luminant, plus the blank glyph.
///
/// Every glyph has the same character width as the blank glyph so rows stay
/// aligned. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Arc<[String]>,
    blank: Arc<str>,
}

impl Palette {
    pub fn new<I, S>(glyphs: I, blank: &str) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs: Vec<String> = glyphs.into_iter().map(Into::into).collect();
        if glyphs.len() < MIN_LEVELS {
            return Err(ConfigError::PaletteTooShort {
                len: glyphs.len(),
                min: MIN_LEVELS,
            });
        }

        let width = blank.chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyBlank);
        }

        if let Some((level, glyph)) = glyphs
            .iter()
            .enumerate()
            .find(|(_, glyph)| glyph.chars().count() != width)
        {
            return Err(ConfigError::RaggedGlyph {
                level,
                glyph: glyph.clone(),
                width,
            });
        }

        Ok(Self {
            glyphs: glyphs.into(),
            blank: blank.into(),
        })
    }

    /// Parses whitespace-separated glyphs, e.g. `".. ,, -- ~~ ..."`.
    pub fn parse(glyphs: &str, blank: &str) -> Result<Self, ConfigError> {
        Self::new(glyphs.split_whitespace(), blank)
    }

    /// Number of brightness levels.
    #[inline]
    pub fn levels(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn blank(&self) -> &str {
        &self.blank
    }

    /// Characters per cell.
    #[inline]
    pub fn cell_width(&self) -> usize {
        self.blank.chars().count()
    }

    /// Glyph for `level`, clamped to the brightest glyph.
    #[inline]
    pub fn glyph(&self, level: usize) -> &str {
        &self.glyphs[level.min(self.glyphs.len() - 1)]
    }

    /// Level for a luminance value. Truncates toward zero; negative and NaN
    /// luminance map to level 0, anything past the end to the last level.
    #[inline]
    pub fn level_for(&self, luminance: f64) -> usize {
        ((luminance * LUMINANCE_SCALE) as usize).min(self.glyphs.len() - 1)
    }

    pub fn glyphs(&self) -> impl Iterator<Item = &str> + '_ {
        self.glyphs.iter().map(String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            glyphs: DEFAULT_GLYPHS.iter().map(|g| g.to_string()).collect(),
            blank: DEFAULT_BLANK.into(),
        }
    }
}
