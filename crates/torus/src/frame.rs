use std::fmt;

use crate::palette::Palette;

/// Depth of a cell nothing has been plotted into.
const NO_SAMPLE: f64 = f64::NEG_INFINITY;

/// One finished frame: a row-major grid of palette levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    levels: Vec<Option<usize>>,
    palette: Palette,
}

impl Frame {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Palette level at `(x, y)`; `None` for blank or out-of-range cells.
    pub fn level(&self, x: usize, y: usize) -> Option<usize> {
        self.index(x, y).and_then(|idx| self.levels[idx])
    }

    /// Glyph at `(x, y)`; `None` only when out of range.
    pub fn glyph(&self, x: usize, y: usize) -> Option<&str> {
        let idx = self.index(x, y)?;
        Some(match self.levels[idx] {
            Some(level) => self.palette.glyph(level),
            None => self.palette.blank(),
        })
    }

    #[inline]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.level(x, y).is_some()
    }

    pub fn filled_cells(&self) -> usize {
        self.levels.iter().filter(|level| level.is_some()).count()
    }

    /// Each row rendered as one string, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.levels.chunks(self.width.max(1)).map(move |row| {
            row.iter()
                .map(|level| match level {
                    Some(level) => self.palette.glyph(*level),
                    None => self.palette.blank(),
                })
                .collect()
        })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            f.write_str(&row)?;
            f.write_str("\n")?;
        }

        Ok(())
    }
}

/// Depth and level buffers of one render call (or one θ band of it).
///
/// Sizes come from a validated config, so `width * height` cannot overflow.
#[derive(Debug, Clone)]
pub(crate) struct DepthBuffer {
    width: usize,
    height: usize,
    ooz: Vec<f64>,
    levels: Vec<Option<usize>>,
}

impl DepthBuffer {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ooz: vec![NO_SAMPLE; width * height],
            levels: vec![None; width * height],
        }
    }

    /// Keeps the sample if it is strictly closer than what the cell holds.
    /// Cells outside the grid are skipped. Returns whether the cell changed.
    pub(crate) fn plot(&mut self, xp: i64, yp: i64, ooz: f64, level: usize) -> bool {
        if xp < 0 || yp < 0 || xp >= self.width as i64 || yp >= self.height as i64 {
            return false;
        }

        let idx = yp as usize * self.width + xp as usize;
        if ooz > self.ooz[idx] {
            self.ooz[idx] = ooz;
            self.levels[idx] = Some(level);
            true
        } else {
            false
        }
    }

    /// Folds in a buffer rasterized from samples that come later in
    /// iteration order. Same strict test as `plot`, so merging bands in order
    /// reproduces a single sequential pass.
    pub(crate) fn merge(&mut self, later: DepthBuffer) {
        debug_assert_eq!((self.width, self.height), (later.width, later.height));

        for (idx, ooz) in later.ooz.into_iter().enumerate() {
            if ooz > self.ooz[idx] {
                self.ooz[idx] = ooz;
                self.levels[idx] = later.levels[idx];
            }
        }
    }

    pub(crate) fn into_frame(self, palette: Palette) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            levels: self.levels,
            palette,
        }
    }
}
