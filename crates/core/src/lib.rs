//! Core domain types, geometry, and errors for exporting presentation
//! slides as PNG images.

pub mod error;
pub mod naming;
pub mod types;

pub use error::{Error, Result};
pub use naming::{slide_filename, slide_path};
pub use types::{
    Color, Fill, Paragraph, PresentationFormat, Shape, ShapeFrame, Slide, SlideDeck, SlideSize,
    TextRun, EMU_PER_INCH, EMU_PER_POINT,
};
