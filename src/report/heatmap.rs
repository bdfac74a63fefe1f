//! Confusion matrix heatmaps.
//!
//! Two renderings share one colour scale: an annotated SVG document with
//! title, axis labels, class-name ticks and a "Count" colour bar, and a PNG
//! raster with the same cells, count digits and colour bar but no text labels.

use std::fs;
use std::path::PathBuf;

use image::{Rgb, RgbImage};
use tracing::info;

use crate::config::ReportConfig;
use crate::error::Result;
use crate::eval::confusion::ConfusionMatrix;

pub const TITLE: &str = "Confusion Matrix - Iris Classification (MLP)";
pub const SVG_FILE: &str = "confusion_matrix.svg";
pub const PNG_FILE: &str = "confusion_matrix.png";

// ---------------------------------------------------------------------------
// Colour scale
// ---------------------------------------------------------------------------

/// Sequential light-to-dark blue stops.
const BLUES: [[u8; 3]; 9] = [
    [0xf7, 0xfb, 0xff],
    [0xde, 0xeb, 0xf7],
    [0xc6, 0xdb, 0xef],
    [0x9e, 0xca, 0xe1],
    [0x6b, 0xae, 0xd6],
    [0x42, 0x92, 0xc6],
    [0x21, 0x71, 0xb5],
    [0x08, 0x51, 0x9c],
    [0x08, 0x30, 0x6b],
];

/// Maps `t` in [0, 1] onto the blue scale by linear interpolation.
pub fn blues(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (BLUES.len() - 1) as f64;
    let lo = (pos.floor() as usize).min(BLUES.len() - 2);
    let frac = pos - lo as f64;
    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let a = BLUES[lo][c] as f64;
        let b = BLUES[lo + 1][c] as f64;
        *o = (a + (b - a) * frac).round() as u8;
    }
    out
}

/// Cell intensity relative to the largest count; the scale starts at zero.
fn intensity(count: usize, max: usize) -> f64 {
    if max == 0 { 0.0 } else { count as f64 / max as f64 }
}

/// Dark cells get white annotations.
fn is_dark(t: f64) -> bool {
    t > 0.5
}

fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

const CELL: f64 = 90.0;
const PAD_L: f64 = 130.0;
const PAD_T: f64 = 60.0;
const PAD_B: f64 = 80.0;
const BAR_GAP: f64 = 30.0;
const BAR_W: f64 = 18.0;
const PAD_R: f64 = 80.0;

/// Annotated heatmap: rows are true classes, columns predicted classes.
pub fn render_svg(cm: &ConfusionMatrix, class_names: &[String]) -> String {
    let k = cm.num_classes();
    let max = cm.max_count();
    let grid = k as f64 * CELL;
    let w = PAD_L + grid + BAR_GAP + BAR_W + PAD_R;
    let h = PAD_T + grid + PAD_B;
    let dark_text = "#333";

    let name = |i: usize| escape(class_names.get(i).map(String::as_str).unwrap_or(""));

    let cells: String = cm
        .counts
        .iter()
        .enumerate()
        .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &v)| (r, c, v)))
        .map(|(r, c, v)| {
            let t = intensity(v, max);
            let x = PAD_L + c as f64 * CELL;
            let y = PAD_T + r as f64 * CELL;
            let text = if is_dark(t) { "#ffffff" } else { dark_text };
            format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n\
                 <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"18\">{}</text>",
                x, y, CELL, CELL, hex(blues(t)),
                x + CELL / 2.0, y + CELL / 2.0 + 6.0, text, v
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let x_ticks: String = (0..k)
        .map(|c| {
            format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"12\">{}</text>",
                PAD_L + (c as f64 + 0.5) * CELL, PAD_T + grid + 18.0, dark_text, name(c)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let y_ticks: String = (0..k)
        .map(|r| {
            format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"{}\" font-size=\"12\">{}</text>",
                PAD_L - 8.0, PAD_T + (r as f64 + 0.5) * CELL + 4.0, dark_text, name(r)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    // Colour bar: gradient from the top (max) down to zero.
    let bar_x = PAD_L + grid + BAR_GAP;
    let stops: String = BLUES
        .iter()
        .enumerate()
        .map(|(i, &rgb)| {
            let offset = 100.0 * (1.0 - i as f64 / (BLUES.len() - 1) as f64);
            format!("<stop offset=\"{:.1}%\" stop-color=\"{}\"/>", offset, hex(rgb))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let bar_ticks: String = (0..=4)
        .map(|g| {
            let frac = g as f64 / 4.0;
            let y = PAD_T + (1.0 - frac) * grid;
            format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n\
                 <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"10\">{:.1}</text>",
                bar_x + BAR_W, y, bar_x + BAR_W + 4.0, y, dark_text,
                bar_x + BAR_W + 7.0, y + 4.0, dark_text, max as f64 * frac
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let count_x = bar_x + BAR_W + 55.0;
    let count_y = PAD_T + grid / 2.0;
    let actual_y = PAD_T + grid / 2.0;

    format!(
        "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\" font-family=\"sans-serif\">\n\
         <defs><linearGradient id=\"blues\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">\n{stops}\n</linearGradient></defs>\n\
         <rect width=\"{w}\" height=\"{h}\" fill=\"#ffffff\"/>\n\
         <text x=\"{title_x:.1}\" y=\"30\" text-anchor=\"middle\" fill=\"{dark}\" font-size=\"16\" font-weight=\"bold\">{title}</text>\n\
         {cells}\n{x_ticks}\n{y_ticks}\n\
         <text x=\"{xl_x:.1}\" y=\"{xl_y:.1}\" text-anchor=\"middle\" fill=\"{dark}\" font-size=\"13\">Predicted Label</text>\n\
         <text x=\"24\" y=\"{actual_y:.1}\" text-anchor=\"middle\" fill=\"{dark}\" font-size=\"13\" \
         transform=\"rotate(-90 24 {actual_y:.1})\">Actual Label</text>\n\
         <!-- Colour bar -->\n\
         <rect x=\"{bar_x:.1}\" y=\"{pad_t:.1}\" width=\"{bar_w:.1}\" height=\"{grid:.1}\" fill=\"url(#blues)\" stroke=\"{dark}\" stroke-width=\"0.5\"/>\n\
         {bar_ticks}\n\
         <text x=\"{count_x:.1}\" y=\"{count_y:.1}\" text-anchor=\"middle\" fill=\"{dark}\" font-size=\"12\" \
         transform=\"rotate(-90 {count_x:.1} {count_y:.1})\">Count</text>\n\
         </svg>\n",
        w = w,
        h = h,
        stops = stops,
        title_x = w / 2.0,
        dark = dark_text,
        title = TITLE,
        cells = cells,
        x_ticks = x_ticks,
        y_ticks = y_ticks,
        xl_x = PAD_L + grid / 2.0,
        xl_y = PAD_T + grid + 50.0,
        actual_y = actual_y,
        bar_x = bar_x,
        pad_t = PAD_T,
        bar_w = BAR_W,
        grid = grid,
        bar_ticks = bar_ticks,
        count_x = count_x,
        count_y = count_y,
    )
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

const PX_MARGIN: u32 = 40;
const PX_CELL: u32 = 80;
const PX_BAR_GAP: u32 = 20;
const PX_BAR_W: u32 = 20;
const GLYPH_SCALE: u32 = 4;

/// 3x5 digit glyphs, one row per byte, most significant of the low 3 bits on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, rgb: [u8; 3]) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, Rgb(rgb));
        }
    }
}

/// Draws `value` centred on (cx, cy).
fn draw_number(img: &mut RgbImage, value: usize, cx: u32, cy: u32, rgb: [u8; 3]) {
    let text = value.to_string();
    let advance = 4 * GLYPH_SCALE;
    let width = text.len() as u32 * advance - GLYPH_SCALE;
    let height = 5 * GLYPH_SCALE;
    let mut x = cx.saturating_sub(width / 2);
    let y = cy.saturating_sub(height / 2);

    for ch in text.bytes() {
        let glyph = DIGITS[(ch - b'0') as usize];
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        img,
                        x + col * GLYPH_SCALE,
                        y + row as u32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        rgb,
                    );
                }
            }
        }
        x += advance;
    }
}

/// Raster heatmap: coloured cells with their counts, plus a vertical colour bar.
pub fn render_png(cm: &ConfusionMatrix) -> RgbImage {
    let k = cm.num_classes() as u32;
    let max = cm.max_count();
    let grid = k * PX_CELL;
    let width = PX_MARGIN + grid + PX_BAR_GAP + PX_BAR_W + PX_MARGIN;
    let height = 2 * PX_MARGIN + grid;

    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (r, row) in cm.counts.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            let t = intensity(v, max);
            let x0 = PX_MARGIN + c as u32 * PX_CELL;
            let y0 = PX_MARGIN + r as u32 * PX_CELL;
            fill_rect(&mut img, x0, y0, PX_CELL, PX_CELL, blues(t));
            let ink = if is_dark(t) { [255, 255, 255] } else { [0x33, 0x33, 0x33] };
            draw_number(&mut img, v, x0 + PX_CELL / 2, y0 + PX_CELL / 2, ink);
        }
    }

    let bar_x = PX_MARGIN + grid + PX_BAR_GAP;
    for dy in 0..grid {
        let t = 1.0 - dy as f64 / grid.max(1) as f64;
        fill_rect(&mut img, bar_x, PX_MARGIN + dy, PX_BAR_W, 1, blues(t));
    }

    img
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes the enabled renderings into `config.output_dir`, creating it if
/// needed. Returns the paths written, SVG first.
pub fn write_heatmaps(
    cm: &ConfusionMatrix,
    class_names: &[String],
    config: &ReportConfig,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !config.svg && !config.png {
        return Ok(written);
    }
    fs::create_dir_all(&config.output_dir)?;

    if config.svg {
        let path = config.output_dir.join(SVG_FILE);
        fs::write(&path, render_svg(cm, class_names))?;
        info!("Heatmap written to {}", path.display());
        written.push(path);
    }
    if config.png {
        let path = config.output_dir.join(PNG_FILE);
        render_png(cm).save(&path)?;
        info!("Heatmap written to {}", path.display());
        written.push(path);
    }
    Ok(written)
}
