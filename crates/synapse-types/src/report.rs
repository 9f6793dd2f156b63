use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::format_hms;

/// The six analytical questions asked of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportField {
    DominantAgents,
    AgreementClusters,
    Conflicts,
    InfluenceChains,
    TopicDrift,
    BehavioralStability,
}

impl ReportField {
    pub fn all() -> &'static [ReportField] {
        &[
            ReportField::DominantAgents,
            ReportField::AgreementClusters,
            ReportField::Conflicts,
            ReportField::InfluenceChains,
            ReportField::TopicDrift,
            ReportField::BehavioralStability,
        ]
    }

    pub fn key(&self) -> &str {
        match self {
            ReportField::DominantAgents => "dominantAgents",
            ReportField::AgreementClusters => "agreementClusters",
            ReportField::Conflicts => "conflicts",
            ReportField::InfluenceChains => "influenceChains",
            ReportField::TopicDrift => "topicDrift",
            ReportField::BehavioralStability => "behavioralStability",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ReportField::DominantAgents => "DOMINANT AGENTS",
            ReportField::AgreementClusters => "AGREEMENT CLUSTERS",
            ReportField::Conflicts => "CONFLICTS",
            ReportField::InfluenceChains => "INFLUENCE CHAINS",
            ReportField::TopicDrift => "TOPIC DRIFT",
            ReportField::BehavioralStability => "BEHAVIORAL STABILITY",
        }
    }

    pub fn question(&self) -> &str {
        match self {
            ReportField::DominantAgents => "Who dominated or guided the discussion and why?",
            ReportField::AgreementClusters => {
                "Which participants agreed and formed shared viewpoints?"
            }
            ReportField::Conflicts => "What disagreements or competing interpretations occurred?",
            ReportField::InfluenceChains => "Who influenced whose decisions over time?",
            ReportField::TopicDrift => "Did the discussion drift away from the original topic?",
            ReportField::BehavioralStability => "Did participants stay consistent with their roles?",
        }
    }
}

/// Six independently computed analytical fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub dominant_agents: String,
    pub agreement_clusters: String,
    pub conflicts: String,
    pub influence_chains: String,
    pub topic_drift: String,
    pub behavioral_stability: String,
    /// Kept for the document layout; never filled
    pub overall_conclusion: String,
}

impl ReportData {
    pub fn field(&self, field: ReportField) -> &str {
        match field {
            ReportField::DominantAgents => &self.dominant_agents,
            ReportField::AgreementClusters => &self.agreement_clusters,
            ReportField::Conflicts => &self.conflicts,
            ReportField::InfluenceChains => &self.influence_chains,
            ReportField::TopicDrift => &self.topic_drift,
            ReportField::BehavioralStability => &self.behavioral_stability,
        }
    }

    pub fn set_field(&mut self, field: ReportField, text: String) {
        let slot = match field {
            ReportField::DominantAgents => &mut self.dominant_agents,
            ReportField::AgreementClusters => &mut self.agreement_clusters,
            ReportField::Conflicts => &mut self.conflicts,
            ReportField::InfluenceChains => &mut self.influence_chains,
            ReportField::TopicDrift => &mut self.topic_drift,
            ReportField::BehavioralStability => &mut self.behavioral_stability,
        };
        *slot = text;
    }
}

/// One titled block of the rendered report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub content: String,
}

/// Report plus the metadata the document renderer prints in its header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentReport {
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub elapsed: u64,
    pub duration: u64,
    pub data: ReportData,
}

impl ExperimentReport {
    /// Numbered sections in document order
    pub fn sections(&self) -> Vec<ReportSection> {
        ReportField::all()
            .iter()
            .enumerate()
            .map(|(i, field)| ReportSection {
                title: format!("{}. {}", i + 1, field.title()),
                content: self.data.field(*field).to_string(),
            })
            .collect()
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::from("SYNAPSE RESEARCH REPORT\n\n");
        out.push_str(&format!("Topic: {}\n", self.topic));
        out.push_str(&format!("Generated: {}\n", self.generated_at.to_rfc3339()));
        out.push_str(&format!(
            "Duration: {} / {}\n",
            format_hms(self.elapsed),
            format_hms(self.duration)
        ));
        for section in self.sections() {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&section.content);
            out.push('\n');
        }
        out
    }

    /// Suggested file name, timestamped like `SYNAPSE_ANALYTICS_2024-01-01T10-00-00`
    pub fn file_stem(&self) -> String {
        format!(
            "SYNAPSE_ANALYTICS_{}",
            self.generated_at.format("%Y-%m-%dT%H-%M-%S")
        )
    }
}

/// Strip markdown markers so the text renders as plain prose.
///
/// Heading and bullet prefixes are dropped, and emphasis or code markers are
/// removed only when they wrap a span; a lone `*` as in `2*3` stays.
pub fn to_plain_text(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches('#').trim_start();
            let line = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line);
            ["**", "__", "*", "`"]
                .iter()
                .fold(line.to_string(), |text, marker| strip_paired(&text, marker))
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `marker` pairs that open at a word start and close at a word end.
fn strip_paired(line: &str, marker: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = opening_marker(rest, marker) {
        let inner = open + marker.len();
        let Some(close) = closing_marker(&rest[inner..], marker) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[inner..inner + close]);
        rest = &rest[inner + close + marker.len()..];
    }
    out.push_str(rest);
    out
}

fn opening_marker(text: &str, marker: &str) -> Option<usize> {
    text.match_indices(marker).map(|(i, _)| i).find(|&i| {
        let before = text[..i].chars().next_back();
        let after = text[i + marker.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && after.is_some_and(|c| !c.is_whitespace())
    })
}

fn closing_marker(text: &str, marker: &str) -> Option<usize> {
    text.match_indices(marker).map(|(i, _)| i).find(|&i| {
        let before = text[..i].chars().next_back();
        let after = text[i + marker.len()..].chars().next();
        before.is_some_and(|c| !c.is_whitespace()) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Keep at most `budget` whitespace-separated words.
pub fn clamp_words(text: &str, budget: usize) -> String {
    text.split_whitespace()
        .take(budget)
        .collect::<Vec<_>>()
        .join(" ")
}
