//! Error types for slide PNG export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting slides to PNG.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX file structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// ZIP archive error (the PPTX container).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error inside the PPTX container.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Failed to rasterize a slide.
    #[error("Render error: {0}")]
    RenderError(String),

    /// Failed to encode a rendered slide as PNG.
    #[error("PNG encoding error: {0}")]
    PngEncodeError(String),
}
