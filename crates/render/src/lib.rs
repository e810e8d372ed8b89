//! Slide rasterizer for slide PNG export.
//!
//! Turns one parsed slide into a fixed-size RGBA pixmap using the pure-Rust
//! `tiny-skia` library and encodes it as PNG.
//!
//! The pipeline per slide:
//!
//! 1. Allocate a pixmap at the requested pixel size
//! 2. Fill the background (slide fill, or the default)
//! 3. Paint each shape's solid fill as a rectangle
//! 4. Paint text runs as approximate glyph boxes
//! 5. Encode the pixmap as PNG

mod renderer;
mod text;

pub use renderer::{RenderOptions, RenderedImage, SlideRenderer};
