//! Backward-compatible report shape for older consumers.
//!
//! The previous generation of the analysis endpoint spoke camelCase with
//! a derived `innovationScore` and a risk summary. Conversion only
//! applies to successful results: [`from_analysis`] returns `None` on
//! failure, and falling back to a simulated report is the caller's
//! explicit decision (see [`crate::simulation`]).

use partsight_core::{AnalysisResult, PatentRecord};
use serde::Serialize;

/// UI consumers display at most this many patents.
pub const DISPLAY_PATENT_LIMIT: usize = 8;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPatent {
    pub id: String,
    pub title: String,
    pub assignee: String,
    pub filing_date: String,
    pub similarity_score: f64,
    pub status: String,
    /// Percentage form of the similarity score.
    pub relevance_score: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySummary {
    pub risk_level: String,
    pub recommended_actions: Vec<String>,
    pub key_findings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyReport {
    pub patent_count: usize,
    pub innovation_score: u32,
    pub is_simulated: bool,
    pub patents: Vec<LegacyPatent>,
    pub summary: LegacySummary,
}

/// Convert a successful analysis into the legacy shape.
///
/// Returns `None` for unsuccessful results: synthetic data must never
/// silently stand in for a live failure.
pub fn from_analysis(result: &AnalysisResult) -> Option<LegacyReport> {
    if !result.success {
        return None;
    }

    let score = innovation_score(&result.patents);
    Some(LegacyReport {
        patent_count: result.patent_count,
        innovation_score: score,
        is_simulated: false,
        patents: result
            .patents
            .iter()
            .take(DISPLAY_PATENT_LIMIT)
            .map(to_legacy_patent)
            .collect(),
        summary: LegacySummary {
            risk_level: risk_level(score).to_string(),
            recommended_actions: recommended_actions(score),
            key_findings: key_findings(&result.patents),
        },
    })
}

fn to_legacy_patent(patent: &PatentRecord) -> LegacyPatent {
    LegacyPatent {
        id: patent.patent_number.clone(),
        title: patent.title.clone(),
        assignee: patent.applicant.clone(),
        filing_date: patent.publication_date.clone(),
        similarity_score: patent.relevance_score,
        status: "granted".to_string(),
        relevance_score: (patent.relevance_score * 100.0).round() as u32,
    }
}

/// `min(95, round(avg_relevance * 100 + (count / 10) * 10))`.
pub(crate) fn innovation_score(patents: &[PatentRecord]) -> u32 {
    let count = patents.len();
    let avg = if count == 0 {
        0.0
    } else {
        patents.iter().map(|p| p.relevance_score).sum::<f64>() / count as f64
    };
    let score = avg * 100.0 + (count as f64 / 10.0) * 10.0;
    (score.round() as u32).min(95)
}

pub(crate) fn risk_level(score: u32) -> &'static str {
    if score > 80 {
        "high"
    } else if score > 60 {
        "medium"
    } else {
        "low"
    }
}

pub(crate) fn recommended_actions(score: u32) -> Vec<String> {
    let actions: &[&str] = if score > 80 {
        &[
            "Consider patent filing for key innovations",
            "Conduct comprehensive freedom-to-operate analysis",
            "Monitor competitor patent activity closely",
        ]
    } else if score > 60 {
        &[
            "Review existing patent landscape thoroughly",
            "Identify potential innovation gaps",
            "Consider R&D investment priorities",
        ]
    } else {
        &[
            "Focus on incremental improvements",
            "Monitor industry trends",
            "Consider partnership opportunities",
        ]
    };
    actions.iter().map(|s| s.to_string()).collect()
}

fn key_findings(patents: &[PatentRecord]) -> Vec<String> {
    let count = patents.len();
    let mut findings = vec![if count > 30 {
        format!("High patent density ({count} patents) indicates active innovation area")
    } else if count > 15 {
        format!("Moderate patent activity ({count} patents) in this technology space")
    } else {
        format!("Limited patent activity ({count} patents) suggests opportunity for innovation")
    }];

    let mut holders: Vec<&str> = Vec::new();
    for patent in patents.iter().take(5) {
        if !holders.contains(&patent.applicant.as_str()) {
            holders.push(&patent.applicant);
        }
    }
    holders.truncate(3);
    if !holders.is_empty() {
        findings.push(format!("Key patent holders: {}", holders.join(", ")));
    }

    let highly_relevant = patents.iter().filter(|p| p.relevance_score > 0.8).count();
    if highly_relevant > 0 {
        findings.push(format!("{highly_relevant} highly relevant patents found"));
    }

    findings
}
