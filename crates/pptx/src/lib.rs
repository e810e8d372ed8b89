//! PPTX (Office Open XML) container parser for slide PNG export.
//!
//! Parses .pptx files, which are ZIP archives of XML documents, into the
//! renderable deck model from `slidepng-core`.

pub mod parser;

pub use parser::PptxParser;
