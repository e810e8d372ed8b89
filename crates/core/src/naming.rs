//! Output filename construction for exported slide images.

use std::path::{Path, PathBuf};

/// Build the output filename for a 1-based slide index: `slide_01.png`,
/// `slide_02.png`, ... Two-digit zero padding; indexes of 100 or more
/// widen naturally.
pub fn slide_filename(index: usize) -> String {
    format!("slide_{:02}.png", index)
}

/// Build the full output path for a slide inside the output directory.
pub fn slide_path(out_dir: &Path, index: usize) -> PathBuf {
    out_dir.join(slide_filename(index))
}
