//! Multi-line text layout
//!
//! Text space is in pixels with +Y up and the origin at the instance position.
//! Each line is positioned by its left baseline point.

use crate::renderable::{HAlign, TextAlign, VAlign};
use glam::Vec2;

/// Vertical font metrics in pixels at a given size. `descent` is positive below the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

impl FontMetrics {
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }

    /// Height from the first line's ascender to the last line's descender.
    pub fn block_height(&self, lines: usize) -> f32 {
        if lines == 0 {
            return 0.0;
        }
        self.ascent + self.descent + (lines - 1) as f32 * self.line_height()
    }
}

/// Split on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Baseline-left origin of line `index` of `count`, given that line's measured width.
pub fn line_origin(
    metrics: &FontMetrics,
    align: TextAlign,
    index: usize,
    count: usize,
    width: f32,
) -> Vec2 {
    let top = match align.vertical {
        VAlign::Top => 0.0,
        VAlign::Middle => metrics.block_height(count) * 0.5,
        VAlign::Bottom => metrics.block_height(count),
    };
    let x = match align.horizontal {
        HAlign::Left => 0.0,
        HAlign::Center => -width * 0.5,
        HAlign::Right => -width,
    };
    let y = top - metrics.ascent - index as f32 * metrics.line_height();
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const METRICS: FontMetrics = FontMetrics {
        ascent: 12.0,
        descent: 4.0,
        line_gap: 2.0,
    };

    #[test]
    fn splits_unix_and_windows_line_endings() {
        let lines: Vec<_> = split_lines("a\r\nbb\nccc").collect();
        assert_eq!(lines, vec!["a", "bb", "ccc"]);
        assert_eq!(split_lines("").count(), 1);
    }

    #[test]
    fn block_height_spans_all_lines() {
        assert_eq!(METRICS.block_height(0), 0.0);
        assert_eq!(METRICS.block_height(1), 16.0);
        assert_eq!(METRICS.block_height(3), 52.0);
    }

    #[test]
    fn vertical_alignment_moves_the_block() {
        let left = |v| TextAlign::new(HAlign::Left, v);
        assert_eq!(line_origin(&METRICS, left(VAlign::Top), 0, 2, 0.0), Vec2::new(0.0, -12.0));
        assert_eq!(line_origin(&METRICS, left(VAlign::Top), 1, 2, 0.0), Vec2::new(0.0, -30.0));

        // Two lines: 12 + 4 + 18 = 34 high.
        let middle = line_origin(&METRICS, left(VAlign::Middle), 0, 2, 0.0);
        assert_relative_eq!(middle.y, 17.0 - 12.0);
        let bottom = line_origin(&METRICS, left(VAlign::Bottom), 1, 2, 0.0);
        // Last descender sits on the origin.
        assert_relative_eq!(bottom.y - METRICS.descent, 0.0);
    }

    #[test]
    fn horizontal_alignment_uses_line_width() {
        let origin = |h| line_origin(&METRICS, TextAlign::new(h, VAlign::Top), 0, 1, 40.0).x;
        assert_eq!(origin(HAlign::Left), 0.0);
        assert_eq!(origin(HAlign::Center), -20.0);
        assert_eq!(origin(HAlign::Right), -40.0);
    }
}
