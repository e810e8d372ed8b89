//! Slide renderer - converts parsed slides to raster images.

use slidepng_core::{Color, Error, Fill, Result, Slide, SlideSize};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::text;

/// Options for slide rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output image width in pixels.
    pub width: u32,
    /// Output image height in pixels.
    pub height: u32,
    /// Background color used when a slide declares no background fill.
    pub background: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: Color::WHITE,
        }
    }
}

impl RenderOptions {
    /// Create options with a custom output size.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Rendered image output.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// PNG-encoded image data.
    pub data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl RenderedImage {
    /// Save the image to a file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.data)?;
        Ok(())
    }

    /// Get the PNG data as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Renderer that converts parsed slides to PNG images.
pub struct SlideRenderer {
    options: RenderOptions,
}

impl SlideRenderer {
    /// Create a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render one slide of a deck with the given canvas size.
    ///
    /// The canvas is scaled to the requested pixel size with independent
    /// X and Y factors, so the output is always exactly `width`x`height`
    /// regardless of the slide's aspect ratio.
    pub fn render(&self, slide_size: SlideSize, slide: &Slide) -> Result<RenderedImage> {
        let width = self.options.width;
        let height = self.options.height;

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::RenderError(format!("Failed to create pixmap {}x{}", width, height))
        })?;

        let background = slide
            .background
            .map(|f| f.color())
            .unwrap_or(self.options.background);
        pixmap.fill(to_skia_color(background));

        // EMU -> pixel scale factors.
        let sx = width as f32 / slide_size.cx as f32;
        let sy = height as f32 / slide_size.cy as f32;

        for shape in &slide.shapes {
            let frame = match shape.frame {
                Some(frame) => frame,
                None => {
                    // Frame inherited from the layout; nothing to place.
                    if shape.has_text() {
                        log::debug!(
                            "slide {}: skipping text shape without explicit frame",
                            slide.number
                        );
                    }
                    continue;
                }
            };

            if let Some(Fill::Solid(color)) = shape.fill {
                self.fill_frame_rect(&mut pixmap, frame, sx, sy, color);
            }

            if shape.has_text() {
                text::paint_paragraphs(&mut pixmap, shape, frame, sx, sy);
            }
        }

        let data = pixmap
            .encode_png()
            .map_err(|e| Error::PngEncodeError(e.to_string()))?;

        Ok(RenderedImage {
            data,
            width,
            height,
        })
    }

    /// Fill a shape frame as a solid rectangle.
    fn fill_frame_rect(
        &self,
        pixmap: &mut Pixmap,
        frame: slidepng_core::ShapeFrame,
        sx: f32,
        sy: f32,
        color: Color,
    ) {
        let rect = Rect::from_xywh(
            frame.x as f32 * sx,
            frame.y as f32 * sy,
            frame.cx as f32 * sx,
            frame.cy as f32 * sy,
        );

        if let Some(rect) = rect {
            let mut paint = Paint::default();
            paint.set_color(to_skia_color(color));
            paint.anti_alias = true;
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
}

/// Convert a domain color to an opaque tiny-skia color.
pub(crate) fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, 255)
}
