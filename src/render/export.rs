// ============================================================================
// Image Export
// PNG encoding of a completed color buffer
// ============================================================================

use image::{ImageBuffer, Rgba};
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors surfaced by the export path. A failed save never touches the
/// in-memory buffers; callers may retry with the same frame.
#[derive(Debug)]
pub enum ExportError {
    /// Output directory could not be created
    OutputDir(std::io::Error),
    /// PNG encoding or file write failed
    Encode(image::ImageError),
    /// Buffer length does not match the stated dimensions
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::OutputDir(err) => write!(f, "cannot create output directory: {err}"),
            ExportError::Encode(err) => write!(f, "image encoding failed: {err}"),
            ExportError::DimensionMismatch { expected, actual } => write!(
                f,
                "color buffer length {actual} does not match dimensions (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::OutputDir(err) => Some(err),
            ExportError::Encode(err) => Some(err),
            ExportError::DimensionMismatch { .. } => None,
        }
    }
}

/// File name for a completed frame: `Render<w>x<h>.png`, with a `_NNNN`
/// suffix for zoom-sequence frames so every frame lands in its own file.
pub fn frame_file_name(name_width: u32, name_height: u32, frame: Option<usize>) -> String {
    match frame {
        Some(index) => format!("Render{name_width}x{name_height}_{index:04}.png"),
        None => format!("Render{name_width}x{name_height}.png"),
    }
}

/// Encode `colors` (packed ARGB, row-major, `width * height` entries) as a
/// PNG under `output_dir` and return the written path.
pub fn save_frame(
    output_dir: &Path,
    width: u32,
    height: u32,
    colors: &[u32],
    name_width: u32,
    name_height: u32,
    frame: Option<usize>,
) -> Result<PathBuf, ExportError> {
    let expected = (width as usize) * (height as usize);
    if colors.len() != expected {
        return Err(ExportError::DimensionMismatch {
            expected,
            actual: colors.len(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(ExportError::OutputDir)?;

    let mut rgba = Vec::with_capacity(expected * 4);
    for &argb in colors {
        rgba.push(((argb >> 16) & 0xff) as u8);
        rgba.push(((argb >> 8) & 0xff) as u8);
        rgba.push((argb & 0xff) as u8);
        rgba.push(((argb >> 24) & 0xff) as u8);
    }
    // length is expected * 4, so construction cannot fail
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, rgba).ok_or(ExportError::DimensionMismatch {
            expected,
            actual: colors.len(),
        })?;

    let path = output_dir.join(frame_file_name(name_width, name_height, frame));
    img.save(&path).map_err(ExportError::Encode)?;
    Ok(path)
}
