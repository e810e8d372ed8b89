//! Approximate text painter.
//!
//! Slide text is painted as simple glyph boxes at the correct position and
//! scale: upper-case letters and digits get full-height boxes, lower-case
//! letters x-height boxes, spaces only advance the pen. Real glyph outlines
//! would need a font resolution and shaping stack, which is out of scope
//! for a fixed-resolution preview export.

use slidepng_core::{Color, Shape, ShapeFrame, TextRun, EMU_PER_POINT};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::renderer::to_skia_color;

/// Fallback run size when no run in a paragraph declares one (18pt).
const DEFAULT_SIZE_CENTIPOINTS: u32 = 1800;

/// Vertical advance between paragraph lines, as a multiple of the line size.
const LINE_SPACING: f32 = 1.2;

/// Paint all paragraphs of a shape inside its frame.
///
/// Each paragraph takes one line; lines that would start below the frame
/// are dropped. No wrapping: overlong lines run past the right edge and
/// are clipped by the pixmap bounds.
pub(crate) fn paint_paragraphs(
    pixmap: &mut Pixmap,
    shape: &Shape,
    frame: ShapeFrame,
    sx: f32,
    sy: f32,
) {
    let origin_x = frame.x as f32 * sx;
    let frame_bottom = (frame.y + frame.cy) as f32 * sy;
    let mut line_top = frame.y as f32 * sy;

    for paragraph in &shape.paragraphs {
        let line_size = paragraph.max_run_size().unwrap_or(DEFAULT_SIZE_CENTIPOINTS);
        let line_height = centipoints_to_px(line_size, sy);

        if line_top >= frame_bottom {
            break;
        }

        let mut pen_x = origin_x;
        for run in &paragraph.runs {
            let run_height = centipoints_to_px(
                run.size_centipoints.unwrap_or(line_size),
                sy,
            );
            paint_run(pixmap, run, &mut pen_x, line_top, run_height);
        }

        line_top += line_height * LINE_SPACING;
    }
}

/// Convert a font size in hundredths of a point to pixels on the Y axis.
fn centipoints_to_px(centipoints: u32, sy: f32) -> f32 {
    (centipoints as f32 / 100.0) * EMU_PER_POINT as f32 * sy
}

/// Paint one run as a sequence of glyph boxes, advancing the pen.
fn paint_run(pixmap: &mut Pixmap, run: &TextRun, pen_x: &mut f32, line_top: f32, height: f32) {
    let color = run.color.unwrap_or(Color::BLACK);
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;

    let char_width = height * 0.6;
    // Bold runs get slightly heavier boxes.
    let box_width_factor = if run.bold { 0.85 } else { 0.75 };

    for ch in run.text.chars() {
        if ch.is_control() {
            continue;
        }
        if ch == ' ' {
            *pen_x += char_width;
            continue;
        }

        let (top_factor, bottom_factor) = glyph_box_extent(ch);
        let rect = Rect::from_ltrb(
            *pen_x,
            line_top + height * top_factor,
            *pen_x + char_width * box_width_factor,
            line_top + height * bottom_factor,
        );
        if let Some(rect) = rect {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }

        *pen_x += char_width;
    }
}

/// Vertical extent of a glyph box within the line, as (top, bottom)
/// fractions of the line height.
fn glyph_box_extent(ch: char) -> (f32, f32) {
    if ch.is_uppercase() || ch.is_ascii_digit() {
        (0.1, 0.9)
    } else if ch.is_lowercase() {
        (0.4, 0.9)
    } else {
        (0.25, 0.9)
    }
}
