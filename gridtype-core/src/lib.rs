//! Gridtype Core - Fixed-Width Text Layout Engine
//!
//! # The Four Laws (Non-Negotiable)
//! 1. Every Row Has The Declared Width
//! 2. One Rounding Rule (half-up, shared by renderer and QC)
//! 3. QC Reads Text Only
//! 4. Same Inputs, Same Bytes

pub mod rounding;
pub mod palette;
pub mod numbers;
pub mod labels;
pub mod series;
pub mod procgen;
pub mod layout;
pub mod table;
pub mod html;
pub mod qc;
pub mod validation;
pub mod governance;
pub mod hashing;
pub mod pipeline;

pub use rounding::round_half_up;
pub use numbers::{format_currency, is_numeric_like, normalize_number};
pub use series::Series;
pub use layout::{render_bar_chart, render_full_block_band, RenderError, RenderedBlock};
pub use table::{render_table, TableGrid};
pub use html::{html_to_text, HtmlOptions};
pub use procgen::{braid, density_field, procedural_border, sparkline};
pub use qc::{qc_block, qc_footer, QcResult};
pub use validation::{run_full_validation, validation_summary, CheckResult, ValidationConfig};
pub use governance::{Governors, Mode, QcPolicy};
pub use hashing::{canonical_json, compute_job_hash, compute_manifest_hash};
pub use pipeline::{PipelineError, RenderJob, RenderPipeline, RenderRequest, RenderedArtifact};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
