pub mod heatmap;

pub use heatmap::{render_png, render_svg, write_heatmaps};
