//! Render Pipeline - Single Entry Point
//!
//! CRITICAL: render MUST run QC internally. No bypass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::governance::{Governors, QcPolicy};
use crate::hashing::{compute_job_hash, compute_manifest_hash, sha256_hex};
use crate::html::{html_to_text_with, HtmlOptions};
use crate::layout::{BandSpec, BarChartSpec, RenderError};
use crate::procgen::{braid, density_field, procedural_border, sparkline, BorderStyle};
use crate::qc::{check_proportions, line_widths, qc_block, qc_footer, QcResult};
use crate::series::Series;
use crate::validation::{run_full_validation, validation_summary, ValidationConfig, ValidationSummary};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static QC_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_qc_call_count() -> u32 {
    QC_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_qc_call_count() {
    QC_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("QC rejected output: {0}")]
    QcRejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Seed for generators that always need one when neither the job nor the
/// governors supply it. Zero is the xorshift fixed point.
pub const DEFAULT_SEED: u32 = 42;

/// What to render. Generator seeds fall back to the governors' seed, then
/// [`DEFAULT_SEED`] where a seed is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderJob {
    BarChart(BarChartSpec),
    FullBlockBand(BandSpec),
    Html {
        html: String,
        #[serde(default)]
        options: HtmlOptions,
    },
    Sparkline {
        values: Vec<f64>,
        #[serde(default)]
        seed: Option<u32>,
    },
    Braid {
        width: usize,
        #[serde(default)]
        seed: Option<u32>,
    },
    DensityField {
        width: usize,
        height: usize,
        density: f64,
        #[serde(default)]
        seed: Option<u32>,
    },
    Border {
        width: usize,
        height: usize,
        #[serde(default)]
        style: BorderStyle,
        #[serde(default)]
        seed: Option<u32>,
    },
}

impl RenderJob {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BarChart(_) => "bar_chart",
            Self::FullBlockBand(_) => "full_block_band",
            Self::Html { .. } => "html",
            Self::Sparkline { .. } => "sparkline",
            Self::Braid { .. } => "braid",
            Self::DensityField { .. } => "density_field",
            Self::Border { .. } => "border",
        }
    }

    fn seed(&self) -> Option<u32> {
        match self {
            Self::Sparkline { seed, .. }
            | Self::Braid { seed, .. }
            | Self::DensityField { seed, .. }
            | Self::Border { seed, .. } => *seed,
            _ => None,
        }
    }

    /// Label order of the job's data, which canonical JSON would sort away.
    fn label_order(&self) -> Vec<&str> {
        match self {
            Self::BarChart(spec) => spec.series.labels(),
            Self::FullBlockBand(spec) => spec.labels.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub job: RenderJob,
    #[serde(default)]
    pub governors: Governors,
}

#[derive(Serialize)]
struct JobFingerprint<'a> {
    request: &'a RenderRequest,
    label_order: Vec<&'a str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedArtifact {
    pub id: String,
    pub kind: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub footer: Option<String>,
    pub qc: QcResult,
    pub job_hash: String,
    pub text_hash: String,
    pub manifest_hash: String,
}

impl RenderedArtifact {
    /// The block followed by its footer line, if any.
    pub fn display_text(&self) -> String {
        match &self.footer {
            Some(footer) => format!("{}\n{footer}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Payload of a standalone validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcRequest {
    pub text: String,
    #[serde(default)]
    pub data: Option<Series>,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub dom_text: Option<String>,
    #[serde(default)]
    pub cli_text: Option<String>,
    #[serde(default)]
    pub config: ValidationConfig,
}

struct Rendered {
    text: String,
    expected_width: usize,
    qc: QcResult,
    /// Seed actually used, for the footer.
    seed: Option<u32>,
}

/// The render pipeline - single entry point for producing blocks
#[derive(Debug, Default)]
pub struct RenderPipeline;

impl RenderPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Render a job, run QC and apply the QC policy.
    ///
    /// CRITICAL: QC always runs. Under `QcPolicy::Block` a failing block is
    /// never returned.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedArtifact, PipelineError> {
        let governors = &request.governors;
        let rendered = self.render_job(&request.job, governors)?;

        if !rendered.qc.all_ok() {
            let summary = format!(
                "{} block: width_ok={} math_ok={} borders_ok={}",
                request.job.kind(),
                rendered.qc.width_ok,
                rendered.qc.proportions_ok,
                rendered.qc.borders_ok
            );
            match governors.qc_policy {
                QcPolicy::Block => return Err(PipelineError::QcRejected(summary)),
                QcPolicy::Warn => log::warn!("QC failed, returning anyway: {summary}"),
                QcPolicy::Log => log::info!("QC failed: {summary}"),
            }
        }

        let footer = governors.qc_footer.then(|| {
            qc_footer(&rendered.qc, rendered.expected_width, &line_widths(&rendered.text), rendered.seed)
        });

        let job_hash = compute_job_hash(
            request.job.kind(),
            &JobFingerprint {
                request,
                label_order: request.job.label_order(),
            },
            ENGINE_VERSION,
        )?;

        let mut artifact = RenderedArtifact {
            id: Uuid::new_v4().to_string(),
            kind: request.job.kind().to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            text_hash: sha256_hex(rendered.text.as_bytes()),
            text: rendered.text,
            footer,
            qc: rendered.qc,
            job_hash,
            manifest_hash: String::new(), // Computed after
        };
        artifact.manifest_hash = compute_manifest_hash(&artifact)?;

        Ok(artifact)
    }

    fn render_job(&self, job: &RenderJob, governors: &Governors) -> Result<Rendered, PipelineError> {
        let ascii_only = governors.ascii_only();
        let seed = job.seed().or(governors.seed);

        let mut rendered = match job {
            RenderJob::BarChart(spec) => {
                let spec = BarChartSpec {
                    ascii_only: spec.ascii_only || ascii_only,
                    ..spec.clone()
                };
                let block = spec.render()?;
                let text = block.text();
                let qc = run_qc(&text, Some(&spec.series.values()), spec.width);
                Rendered {
                    expected_width: block.width().unwrap_or(0),
                    text,
                    qc,
                    seed: None,
                }
            }
            RenderJob::FullBlockBand(spec) => {
                let block = spec.render()?;
                let text = block.text();
                let bar_width = spec.layout().map(|l| l.bar_field_width).unwrap_or(0);
                let qc = run_qc(&text, Some(&spec.values), bar_width);
                Rendered {
                    text,
                    expected_width: spec.total_width,
                    qc,
                    seed: None,
                }
            }
            RenderJob::Html { html, options } => {
                let options = HtmlOptions {
                    ascii_only: options.ascii_only || ascii_only,
                    ..options.clone()
                };
                let text = html_to_text_with(html, &options);
                let qc = run_qc(&text, None, 0);
                Rendered {
                    text,
                    expected_width: options.effective_width(),
                    qc,
                    seed: None,
                }
            }
            RenderJob::Sparkline { values, .. } => {
                let text = sparkline(values, ascii_only, seed);
                generated(text, values.len())
            }
            RenderJob::Braid { width, .. } => generated(braid(*width, ascii_only, seed), *width),
            RenderJob::DensityField {
                width,
                height,
                density,
                ..
            } => {
                let seed = seed.unwrap_or(DEFAULT_SEED);
                let rows = density_field(*width, *height, *density, ascii_only, seed);
                Rendered {
                    seed: Some(seed),
                    ..generated(rows.join("\n"), *width)
                }
            }
            RenderJob::Border {
                width,
                height,
                style,
                ..
            } => {
                let seed = seed.unwrap_or(DEFAULT_SEED);
                let rows = procedural_border(*width, *height, *style, ascii_only, seed);
                Rendered {
                    seed: Some(seed),
                    ..generated(rows.join("\n"), *width)
                }
            }
        };
        rendered.seed = rendered.seed.or(seed);
        Ok(rendered)
    }

    /// Run the full validation suite over caller-supplied text.
    pub fn validate(&self, request: &QcRequest) -> ValidationSummary {
        let results = run_full_validation(
            &request.text,
            request.data.as_ref(),
            request.width,
            request.dom_text.as_deref(),
            request.cli_text.as_deref(),
            &request.config,
        );
        validation_summary(&results)
    }
}

fn generated(text: String, expected_width: usize) -> Rendered {
    let qc = run_qc(&text, None, 0);
    Rendered {
        text,
        expected_width,
        qc,
        seed: None,
    }
}

/// Mandatory QC. Proportions are checked against `values` when given.
fn run_qc(text: &str, values: Option<&[f64]>, bar_width: usize) -> QcResult {
    #[cfg(feature = "test-hooks")]
    QC_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    let mut qc = qc_block(text, None, None);
    if let Some(values) = values {
        let lines: Vec<&str> = text.lines().collect();
        qc.proportions_ok = check_proportions(&lines, values, bar_width).ok();
    }
    qc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::Mode;

    fn chart_request() -> RenderRequest {
        serde_json::from_str(
            r#"{
                "job": {"kind": "bar_chart", "title": "Perf", "width": 30,
                        "series": {"API": 40, "DB": 28, "CACHE": 10}},
                "governors": {"seed": 7}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_chart_with_footer() {
        let artifact = RenderPipeline::new().render(&chart_request()).unwrap();
        assert_eq!(artifact.kind, "bar_chart");
        assert!(artifact.qc.all_ok());
        let footer = artifact.footer.as_deref().unwrap();
        assert!(footer.starts_with("QC: width_ok=true"), "{footer}");
        assert!(footer.ends_with("seed=7"));
        assert_eq!(artifact.text_hash, sha256_hex(artifact.text.as_bytes()));
        assert_eq!(artifact.manifest_hash.len(), 64);
    }

    #[test]
    fn test_job_hash_stable_and_order_sensitive() {
        let pipeline = RenderPipeline::new();
        let a = pipeline.render(&chart_request()).unwrap();
        let b = pipeline.render(&chart_request()).unwrap();
        assert_eq!(a.job_hash, b.job_hash);
        assert_eq!(a.text, b.text);
        assert_ne!(a.id, b.id);

        let mut reordered = chart_request();
        if let RenderJob::BarChart(spec) = &mut reordered.job {
            spec.series = Series::from([("DB", 28.0), ("API", 40.0), ("CACHE", 10.0)]);
        }
        assert_ne!(pipeline.render(&reordered).unwrap().job_hash, a.job_hash);
    }

    #[test]
    fn test_execution_mode_renders_ascii() {
        let mut request = chart_request();
        request.governors.mode = Mode::Execution;
        request.governors.qc_footer = false;
        if let RenderJob::BarChart(spec) = &mut request.job {
            spec.style_pack = "bold_unicode".into();
        }
        let artifact = RenderPipeline::new().render(&request).unwrap();
        assert!(artifact.text.is_ascii(), "{}", artifact.text);
        assert!(artifact.footer.is_none());
    }

    #[test]
    fn test_render_errors_propagate() {
        let request = RenderRequest {
            job: RenderJob::FullBlockBand(BandSpec {
                title: "T".into(),
                labels: vec!["A".into()],
                values: vec![1.0, 2.0],
                total_width: 40,
                bar_width: None,
            }),
            governors: Governors::default(),
        };
        let err = RenderPipeline::new().render(&request).unwrap_err();
        assert!(matches!(err, PipelineError::Render(RenderError::LengthMismatch { .. })));
    }

    #[test]
    fn test_generators_use_governor_seed() {
        let job = RenderJob::Sparkline {
            values: vec![1.0, 3.0, 2.0, 5.0, 4.0],
            seed: None,
        };
        let governors = Governors {
            seed: Some(42),
            ..Governors::default()
        };
        let artifact = RenderPipeline::new()
            .render(&RenderRequest { job, governors })
            .unwrap();
        assert_eq!(artifact.text, sparkline(&[1.0, 3.0, 2.0, 5.0, 4.0], false, Some(42)));
        assert!(artifact.footer.unwrap().ends_with("seed=42"));
    }

    #[test]
    fn test_unseeded_density_field_uses_default_seed() {
        let request: RenderRequest = serde_json::from_str(
            r#"{"job": {"kind": "density_field", "width": 20, "height": 3, "density": 0.3}}"#,
        )
        .unwrap();
        let artifact = RenderPipeline::new().render(&request).unwrap();
        assert_eq!(artifact.text, density_field(20, 3, 0.3, false, DEFAULT_SEED).join("\n"));
        assert!(artifact.text.chars().any(|c| c == ' '), "{}", artifact.text);
        assert!(artifact.text.chars().any(|c| c != ' ' && c != '\n'), "{}", artifact.text);
        assert!(artifact.footer.unwrap().ends_with("seed=42"));
    }

    #[test]
    fn test_run_qc_checks_values_when_given() {
        assert!(!run_qc("[A] ==\n[B] =", Some(&[2.0]), 2).proportions_ok);
        assert!(run_qc("[A] ==\n[B] =", None, 0).proportions_ok);
        assert!(!run_qc("ab\nabc", None, 0).width_ok);
    }

    #[test]
    fn test_block_policy_rejects_and_warn_returns() {
        // frame without its closing corner
        let job = RenderJob::Html {
            html: "<pre>+----</pre>".into(),
            options: HtmlOptions::default(),
        };
        let blocked = RenderPipeline::new().render(&RenderRequest {
            job: job.clone(),
            governors: Governors::default(),
        });
        assert!(matches!(blocked, Err(PipelineError::QcRejected(_))));

        let warned = RenderPipeline::new()
            .render(&RenderRequest {
                job,
                governors: Governors {
                    qc_policy: QcPolicy::Warn,
                    ..Governors::default()
                },
            })
            .unwrap();
        assert!(!warned.qc.borders_ok);
        assert!(warned.footer.unwrap().contains("borders_ok=false"));
    }

    #[test]
    fn test_validate_request() {
        let request: QcRequest = serde_json::from_str(r#"{"text": "+--+\n|  |\n+--+"}"#).unwrap();
        let summary = RenderPipeline::new().validate(&request);
        assert!(summary.total_checks >= 4);
        assert!(summary.checks.iter().any(|c| c.name == "row_widths" && c.passed));
    }
}
