//! Synthetic patent reports for degraded mode.
//!
//! When the live path cannot produce a successful result, callers may
//! *explicitly* request a simulated report. Every report produced here
//! carries `isSimulated: true` so downstream UIs can disclose synthetic
//! data; nothing in this crate substitutes it automatically.

use chrono::{Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::legacy::{DISPLAY_PATENT_LIMIT, LegacyPatent, LegacyReport, LegacySummary};
use crate::legacy::{recommended_actions, risk_level};

/// Plausible automotive-supplier assignees for generated patents.
const ASSIGNEES: [&str; 6] = [
    "Robert Bosch GmbH",
    "Continental AG",
    "ZF Friedrichshafen AG",
    "Schaeffler Group",
    "Magna International",
    "Valeo SA",
];

/// Generate a bounded pseudo-random report for `part_name`.
///
/// The patent count is biased by category keywords (engines are a denser
/// patent space than generic parts) and jittered; the displayed list is
/// capped and sorted by similarity, matching the live adapter's shape.
pub fn simulated_report(part_name: &str) -> LegacyReport {
    let mut rng = rand::rng();
    let lowered = part_name.to_lowercase();

    let base_count: i32 = if lowered.contains("engine") {
        25
    } else if lowered.contains("transmission") {
        20
    } else if lowered.contains("brake") {
        18
    } else {
        15
    };
    let patent_count = (base_count + rng.random_range(-5..=15)).max(0) as usize;
    let innovation_score: u32 = rng.random_range(55..=95);

    let mut patents: Vec<LegacyPatent> = (0..patent_count.min(DISPLAY_PATENT_LIMIT))
        .map(|_| mock_patent(part_name, &mut rng))
        .collect();
    patents.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    LegacyReport {
        patent_count,
        innovation_score,
        is_simulated: true,
        patents,
        summary: LegacySummary {
            risk_level: risk_level(innovation_score).to_string(),
            recommended_actions: recommended_actions(innovation_score),
            key_findings: simulated_findings(patent_count, innovation_score),
        },
    }
}

fn mock_patent(part_name: &str, rng: &mut impl Rng) -> LegacyPatent {
    let filing_date = Utc::now() - Duration::days(rng.random_range(365..=2555));
    let prefix = if rng.random_bool(0.5) { "EP" } else { "US" };
    LegacyPatent {
        id: format!("{prefix}{}", rng.random_range(1_000_000..=9_999_999)),
        title: format!("Advanced {part_name} Technology"),
        assignee: ASSIGNEES
            .choose(rng)
            .expect("assignee pool is non-empty")
            .to_string(),
        filing_date: filing_date.format("%Y-%m-%d").to_string(),
        similarity_score: (rng.random_range(0.65..=0.95) * 100.0_f64).round() / 100.0,
        status: "granted".to_string(),
        relevance_score: rng.random_range(70..=95),
    }
}

fn simulated_findings(patent_count: usize, innovation_score: u32) -> Vec<String> {
    let density = if patent_count > 30 {
        format!("High patent density ({patent_count} patents) indicates active innovation area")
    } else if patent_count > 15 {
        format!("Moderate patent activity ({patent_count} patents) in this technology space")
    } else {
        format!("Limited patent activity ({patent_count} patents) suggests opportunity for innovation")
    };
    let potential = if innovation_score > 80 {
        "Strong innovation potential with multiple development opportunities"
    } else if innovation_score > 60 {
        "Good innovation potential with selective development focus"
    } else {
        "Focus on incremental improvements and cost optimization"
    };
    vec![density, potential.to_string()]
}
