//! Auto-sizing of glyphs to the canvas.

/// Maximum number of measure/adjust rounds.
pub const MAX_ITERATIONS: usize = 5;

/// Size adjustment applied per round, in pixels per em.
pub const SIZE_STEP: f32 = 5.0;

/// Smallest size ever returned.
pub const MIN_SIZE: f32 = 20.0;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const DEFAULT: Self = Self { width: 64, height: 64 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Starting size for the fitting loop.
    pub fn initial_size(&self) -> f32 {
        (self.height as f32 * 0.8).trunc()
    }

    /// Size used when the glyph cannot be measured at all.
    pub fn fallback_size(&self) -> f32 {
        (self.height as f32 * 0.6).trunc()
    }

    pub fn max_size(&self) -> f32 {
        self.height as f32 * 0.9
    }

    fn fit(&self, width: f64, height: f64) -> Fit {
        let (cw, ch) = (self.width as f64, self.height as f64);
        if width < cw * 0.3 || height < ch * 0.3 {
            Fit::TooSmall
        } else if width > cw * 0.9 || height > ch * 0.9 {
            Fit::TooLarge
        } else {
            Fit::Good
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    TooSmall,
    TooLarge,
    Good,
}

/// Pick a size at which the glyph fills 30-90% of the canvas.
///
/// `measure` returns the rendered bounding box `(width, height)` at a given
/// size, or `None` when the glyph cannot be drawn at that size. A failed
/// measurement short-circuits to [`Canvas::fallback_size`].
pub fn fit_font_size(canvas: Canvas, mut measure: impl FnMut(f32) -> Option<(f64, f64)>) -> f32 {
    let mut size = canvas.initial_size();

    for _ in 0..MAX_ITERATIONS {
        let Some((width, height)) = measure(size) else {
            return canvas.fallback_size();
        };
        match canvas.fit(width, height) {
            Fit::TooSmall => size += SIZE_STEP,
            Fit::TooLarge => size -= SIZE_STEP,
            Fit::Good => break,
        }
    }

    size.min(canvas.max_size()).max(MIN_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_sized_glyph_keeps_initial_size() {
        let size = fit_font_size(Canvas::DEFAULT, |s| Some((s as f64 * 0.5, s as f64 * 0.7)));
        assert_eq!(size, 51.0);
    }

    #[test]
    fn tiny_glyph_grows_for_five_rounds_then_clamps() {
        let mut calls = 0;
        let size = fit_font_size(Canvas::DEFAULT, |_| {
            calls += 1;
            Some((2.0, 2.0))
        });
        assert_eq!(calls, MAX_ITERATIONS);
        // 51 + 5 * 5 = 76, clamped to 0.9 * 64.
        assert!((size - 57.6).abs() < 1e-4);
    }

    #[test]
    fn oversized_glyph_shrinks_until_it_fits() {
        // Fits once the box is at most 0.9 * 64 = 57.6 px tall.
        let size = fit_font_size(Canvas::DEFAULT, |s| Some((30.0, s as f64 * 1.3)));
        assert_eq!(size, 41.0);
    }

    #[test]
    fn failed_measure_uses_fallback() {
        let size = fit_font_size(Canvas::DEFAULT, |_| None);
        assert_eq!(size, 38.0);
    }

    #[test]
    fn result_never_below_minimum() {
        let canvas = Canvas::new(16, 16);
        let size = fit_font_size(canvas, |_| Some((100.0, 100.0)));
        assert_eq!(size, MIN_SIZE);
    }
}
