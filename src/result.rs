//! The normalized result envelope returned to clients.

use serde::{Deserialize, Serialize};

/// Number of risk statements the upload widget renders.
pub const DISPLAYED_RISKS: usize = 3;

/// Risk scores are clamped into this range; 0 is reserved for non-contracts.
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

/// Interpretation shown for the canonical zero-form.
pub const NOT_APPLICABLE: &str = "Not applicable.";

/// Label for a risk score. Pure function of the score; the envelope never
/// carries a label that disagrees with its number.
///
/// | Score | Label |
/// |-------|-------|
/// | 0     | Not applicable |
/// | 1     | Excellent |
/// | 2–3   | Very Good |
/// | 4–5   | Decent |
/// | 6–7   | High Risk |
/// | 8–10  | Worse |
pub fn interpretation_for(score: u8) -> &'static str {
    match score {
        0 => NOT_APPLICABLE,
        1 => "Excellent. Minimal risk.",
        2..=3 => "Very Good. Low risk with minor points to review.",
        4..=5 => "Decent. Moderate risk; review recommended.",
        6..=7 => "High Risk. Significant issues need negotiation.",
        _ => "Worse. Needs urgent attention.",
    }
}

/// Result of analysing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_contract: bool,
    pub risk_score: u8,
    pub interpretation: String,
    pub risk_summary: String,
    pub key_risks: Vec<String>,
}

impl AnalysisResult {
    /// Envelope for a document that is not a contract.
    pub fn not_a_contract() -> Self {
        Self {
            is_contract: false,
            risk_score: 0,
            interpretation: NOT_APPLICABLE.to_string(),
            risk_summary: String::new(),
            key_risks: Vec::new(),
        }
    }

    /// Envelope for a scored contract. The score is clamped into
    /// [`MIN_SCORE`]..=[`MAX_SCORE`] and the interpretation derived from it.
    pub fn scored(score: u8, summary: impl Into<String>, risks: Vec<String>) -> Self {
        let risk_score = score.clamp(MIN_SCORE, MAX_SCORE);
        Self {
            is_contract: true,
            risk_score,
            interpretation: interpretation_for(risk_score).to_string(),
            risk_summary: summary.into(),
            key_risks: risks,
        }
    }

    /// The risk statements a client should display.
    pub fn displayed_risks(&self) -> &[String] {
        let n = self.key_risks.len().min(DISPLAYED_RISKS);
        &self.key_risks[..n]
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretation_boundaries() {
        let expected = [
            (1, "Excellent"),
            (2, "Very Good"),
            (3, "Very Good"),
            (4, "Decent"),
            (5, "Decent"),
            (6, "High Risk"),
            (7, "High Risk"),
            (8, "Worse"),
            (9, "Worse"),
            (10, "Worse"),
        ];
        for (score, label) in expected {
            assert!(
                interpretation_for(score).starts_with(label),
                "score {score}: {}",
                interpretation_for(score)
            );
        }
        assert_eq!(interpretation_for(10), "Worse. Needs urgent attention.");
    }

    #[test]
    fn zero_form_is_canonical() {
        let r = AnalysisResult::not_a_contract();
        assert!(!r.is_contract);
        assert_eq!(r.risk_score, 0);
        assert_eq!(r.interpretation, NOT_APPLICABLE);
        assert!(r.risk_summary.is_empty());
        assert!(r.key_risks.is_empty());
    }

    #[test]
    fn scored_clamps_and_relabels() {
        let r = AnalysisResult::scored(0, "s", vec![]);
        assert_eq!(r.risk_score, 1);
        assert_eq!(r.interpretation, interpretation_for(1));

        let r = AnalysisResult::scored(42, "s", vec![]);
        assert_eq!(r.risk_score, 10);
        assert!(r.is_contract);
    }

    #[test]
    fn displayed_risks_capped_at_three() {
        let risks: Vec<String> = (1..=5).map(|i| format!("risk {i}")).collect();
        let r = AnalysisResult::scored(6, "s", risks);
        assert_eq!(r.displayed_risks(), &["risk 1", "risk 2", "risk 3"]);

        let r = AnalysisResult::scored(6, "s", vec!["only".into()]);
        assert_eq!(r.displayed_risks().len(), 1);
    }

    #[test]
    fn serialises_with_wire_field_names() {
        let json = serde_json::to_value(AnalysisResult::scored(3, "ok", vec!["a".into()])).unwrap();
        for key in [
            "is_contract",
            "risk_score",
            "interpretation",
            "risk_summary",
            "key_risks",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
