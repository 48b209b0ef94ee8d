//! Chart and table image rendering

pub mod charts;
pub mod table_image;
pub mod terminal_table;

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use tracing::info;

use crate::shared::errors::AnalysisError;
use crate::shared::types::ImageFormat;

pub use charts::{ExchangeRateChart, FrequencyChart, ReturnCurveChart};
pub use table_image::TableImage;

pub const FONT: &str = "sans-serif";

/// DejaVu Sans, drawn through plotters' `ab_glyph` backend so no system fonts are needed
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/DejaVuSans.ttf");

/// Register the bundled font once per process
fn ensure_font() -> Result<(), AnalysisError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_BYTES).is_ok());
    if ok {
        Ok(())
    } else {
        Err(AnalysisError::RenderError("bundled font could not be loaded".to_string()))
    }
}

/// Something that can be drawn on any plotters backend
pub trait Figure {
    /// Pixel size; `default` is the configured chart size
    fn size(&self, default: (u32, u32)) -> (u32, u32) {
        default
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>;
}

/// Draw `figure` into an image file at `path`
pub fn render<F: Figure>(
    figure: &F,
    path: &Path,
    format: ImageFormat,
    default_size: (u32, u32),
) -> Result<(), AnalysisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    ensure_font()?;
    let size = figure.size(default_size);

    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            figure
                .draw(&root)
                .and_then(|_| root.present())
                .map_err(|e| AnalysisError::RenderError(e.to_string()))?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            figure
                .draw(&root)
                .and_then(|_| root.present())
                .map_err(|e| AnalysisError::RenderError(e.to_string()))?;
        }
    }

    info!("Plot saved to {}", path.display());
    Ok(())
}
