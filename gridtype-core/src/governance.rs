//! Render Governors
//!
//! Caller-owned switches that apply across a render: output mode, ASCII
//! forcing, the QC footer, the seed tag and what to do when QC fails.

use serde::{Deserialize, Serialize};

use crate::palette::{effective_style_pack, StylePack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Interactive output; Unicode allowed.
    #[default]
    Reasoning,
    /// Machine-consumed output; always ASCII.
    Execution,
}

/// Action taken when the mandatory QC pass reports a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcPolicy {
    /// Refuse the artifact.
    #[default]
    Block,
    /// Return the artifact, log a warning.
    Warn,
    /// Return the artifact, log at info.
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Governors {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub ascii_only: bool,
    #[serde(default = "default_qc_footer")]
    pub qc_footer: bool,
    /// Seed threaded to the procedural generators and shown in the footer.
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub qc_policy: QcPolicy,
}

fn default_qc_footer() -> bool {
    true
}

impl Default for Governors {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            ascii_only: false,
            qc_footer: default_qc_footer(),
            seed: None,
            qc_policy: QcPolicy::default(),
        }
    }
}

impl Governors {
    /// Execution mode implies ASCII.
    pub fn execution() -> Self {
        Self {
            mode: Mode::Execution,
            ascii_only: true,
            ..Self::default()
        }
    }

    pub fn ascii_only(&self) -> bool {
        self.ascii_only || self.mode == Mode::Execution
    }

    pub fn style_pack(&self, requested: &str) -> &'static StylePack {
        effective_style_pack(requested, self.ascii_only())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let g: Governors = serde_json::from_str("{}").unwrap();
        assert_eq!(g, Governors::default());
        assert!(g.qc_footer);
        assert_eq!(g.qc_policy, QcPolicy::Block);
    }

    #[test]
    fn test_execution_mode_forces_ascii() {
        let g: Governors = serde_json::from_str(r#"{"mode": "execution"}"#).unwrap();
        assert!(!g.ascii_only);
        assert!(g.ascii_only());
        assert_eq!(g.style_pack("double_frame").name, "minimal_ascii");
        assert_eq!(Governors::default().style_pack("double_frame").name, "double_frame");
    }
}
