use anyhow::Context;
use h1core::dataset::{DatasetStore, SurveyDataset};
use h1core::imaging::{GridAssembler, IntensityHistogram, SkyImage};
use serde_json::json;
use std::fmt::Write;
use std::path::Path;

pub const DEFAULT_HISTOGRAM_BINS: usize = 50;
const SHADES: &[u8] = b" .:-=+*#%@";

pub struct Assembly {
    pub dataset: SurveyDataset,
    pub image: SkyImage,
    pub histogram: Option<IntensityHistogram>,
}

/// Loads a saved survey and grids it, using the dataset's own spacing unless
/// `spacing` overrides it.
pub fn assemble_file(path: &Path, spacing: Option<f64>, bins: usize) -> anyhow::Result<Assembly> {
    let dataset = DatasetStore::load(path)
        .with_context(|| format!("loading survey {}", path.display()))?;
    let spacing = spacing.unwrap_or(dataset.grid_spacing);
    let image = GridAssembler::new(spacing)
        .and_then(|assembler| assembler.assemble(dataset.readings()))
        .with_context(|| format!("assembling {}", path.display()))?;
    let histogram = IntensityHistogram::from_readings(dataset.readings(), bins);
    Ok(Assembly {
        dataset,
        image,
        histogram,
    })
}

/// Shaded text rendering, highest declination on top; `?` marks empty cells.
pub fn render_image(image: &SkyImage) -> String {
    let mut out = String::new();
    let (low, high) = image.value_range().unwrap_or((0.0, 0.0));
    let span = high - low;
    for row in (0..image.height()).rev() {
        let _ = write!(out, "{:>8.2} |", image.dec_axis[row]);
        for col in 0..image.width() {
            let glyph = match image.value(row, col) {
                None => '?',
                Some(value) => {
                    let level = if span > 0.0 {
                        ((value - low) / span * (SHADES.len() - 1) as f64).round() as usize
                    } else {
                        SHADES.len() - 1
                    };
                    SHADES[level.min(SHADES.len() - 1)] as char
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    let (ra_low, ra_high) = image.ra_extent();
    let _ = writeln!(
        out,
        "RA {:.2} .. {:.2} deg, intensity {:.2} .. {:.2} dB",
        ra_low, ra_high, low, high
    );
    out
}

pub fn render_histogram(histogram: &IntensityHistogram) -> String {
    let mut out = String::new();
    let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
    for (idx, count) in histogram.counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let start = histogram.min_db + idx as f64 * histogram.bin_width();
        let bar = "#".repeat((count * 40).div_ceil(peak));
        let _ = writeln!(out, "{:>9.2} dB {:>4} {}", start, count, bar);
    }
    out
}

/// Machine-readable form of the assembled image.
pub fn image_json(image: &SkyImage) -> serde_json::Value {
    let rows: Vec<Vec<Option<f64>>> = image
        .grid
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect();
    json!({
        "ra_axis": image.ra_axis,
        "dec_axis": image.dec_axis,
        "intensity_db": rows,
    })
}
