//! CV tailoring heuristics: keyword extraction, component suggestion and a
//! 0-100 tailoring score.

use errors::ValidationError;
use orion_core::types::{CvComponent, SuggestedComponent, TailoringScore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;
const MAX_SUGGESTION_LIMIT: usize = 50;

const MIN_KEYWORD_LEN: usize = 3;
const IDEAL_WORDS_MIN: usize = 30;
const IDEAL_WORDS_MAX: usize = 120;

const COVERAGE_WEIGHT: f32 = 60.0;
const LENGTH_WEIGHT: f32 = 25.0;
const IMPROVEMENT_WEIGHT: f32 = 15.0;

const STOP_WORDS: &[&str] = &[
    "about", "across", "all", "also", "and", "any", "are", "been", "being", "but", "can", "etc",
    "every", "for", "from", "has", "have", "how", "including", "into", "its", "job", "more",
    "must", "not", "off", "our", "out", "over", "own", "per", "role", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "type",
    "using", "very", "via", "was", "well", "were", "what", "when", "where", "which", "while",
    "who", "will", "with", "within", "would", "you", "your"
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    #[serde(default)]
    pub components: Vec<CvComponent>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub limit: Option<usize>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub tailored: String,
    #[serde(default)]
    pub job_description: String
}

/// Unique lowercase alphanumeric words of at least three characters, in
/// first-seen order, without stop words.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

fn job_keywords(job_description: &str) -> Result<Vec<String>, ValidationError> {
    if job_description.trim().is_empty() {
        return Err(ValidationError::missing("jobDescription"));
    }
    let keywords = extract_keywords(job_description);
    if keywords.is_empty() {
        return Err(ValidationError::invalid(
            "jobDescription",
            "contains no usable keywords"
        ));
    }
    Ok(keywords)
}

fn matched(keywords: &[String], text: &str) -> Vec<String> {
    let present: HashSet<String> = extract_keywords(text).into_iter().collect();
    keywords
        .iter()
        .filter(|keyword| present.contains(*keyword))
        .cloned()
        .collect()
}

/// Ranks components by how many job keywords they mention. Components
/// matching nothing are left out. Ties go to the shorter component.
pub fn suggest_components(request: &SuggestRequest) -> Result<Vec<SuggestedComponent>, ValidationError> {
    let keywords = job_keywords(&request.job_description)?;
    let limit = request
        .limit
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
        .clamp(1, MAX_SUGGESTION_LIMIT);

    let mut suggestions: Vec<SuggestedComponent> = request
        .components
        .iter()
        .filter_map(|component| {
            let text = match &component.title {
                Some(title) => format!("{title} {}", component.content),
                None => component.content.clone()
            };
            let matched_keywords = matched(&keywords, &text);
            if matched_keywords.is_empty() {
                return None;
            }
            Some(SuggestedComponent {
                score: matched_keywords.len() as f32 / keywords.len() as f32,
                matched_keywords,
                component: component.clone()
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.component.content.len().cmp(&b.component.content.len()))
            .then_with(|| a.component.id.cmp(&b.component.id))
    });
    suggestions.truncate(limit);
    Ok(suggestions)
}

/// Scores `tailored` against the job description: keyword coverage, fit to
/// the ideal word band, and coverage gained over `original`.
pub fn score_tailoring(request: &ScoreRequest) -> Result<TailoringScore, ValidationError> {
    if request.tailored.trim().is_empty() {
        return Err(ValidationError::missing("tailored"));
    }
    let keywords = job_keywords(&request.job_description)?;
    let total = keywords.len() as f32;

    let matched_keywords = matched(&keywords, &request.tailored);
    let coverage = matched_keywords.len() as f32 / total;
    let original_coverage = matched(&keywords, &request.original).len() as f32 / total;

    let word_count = request.tailored.split_whitespace().count();
    let length_fit = length_fit(word_count);

    let improvement = if original_coverage >= 1.0 {
        if coverage >= original_coverage { 1.0 } else { 0.0 }
    } else {
        ((coverage - original_coverage).max(0.0) / (1.0 - original_coverage)).min(1.0)
    };

    let raw = COVERAGE_WEIGHT * coverage + LENGTH_WEIGHT * length_fit + IMPROVEMENT_WEIGHT * improvement;
    let matched_set: HashSet<&String> = matched_keywords.iter().collect();
    let missing_keywords = keywords
        .iter()
        .filter(|keyword| !matched_set.contains(keyword))
        .cloned()
        .collect();

    Ok(TailoringScore {
        score: raw.round().clamp(0.0, 100.0) as u8,
        keyword_coverage: coverage,
        word_count,
        matched_keywords,
        missing_keywords
    })
}

fn length_fit(word_count: usize) -> f32 {
    if word_count < IDEAL_WORDS_MIN {
        word_count as f32 / IDEAL_WORDS_MIN as f32
    } else if word_count <= IDEAL_WORDS_MAX {
        1.0
    } else {
        let over = (word_count - IDEAL_WORDS_MAX) as f32;
        (1.0 - over / IDEAL_WORDS_MAX as f32).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: &str, content: &str) -> CvComponent {
        CvComponent {
            id: id.to_string(),
            component_type: "experience".to_string(),
            title: None,
            content: content.to_string()
        }
    }

    #[test]
    fn test_extract_keywords() {
        assert_eq!(
            extract_keywords("Senior Rust engineer, with Rust & Kubernetes (k8s) experience; AI"),
            vec!["senior", "rust", "engineer", "kubernetes", "k8s", "experience"]
        );
    }

    #[test]
    fn test_suggest_ranks_by_overlap() {
        let request = SuggestRequest {
            components: vec![
                component("a", "Built Rust services on Kubernetes"),
                component("b", "Led the Rust guild"),
                component("c", "Baked bread"),
                component("d", "Rust Kubernetes")
            ],
            job_description: "Rust engineer for Kubernetes platform".to_string(),
            limit: None
        };

        let suggestions = suggest_components(&request).unwrap();
        let ids: Vec<&str> = suggestions.iter().map(|s| s.component.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "b"]);
        assert_eq!(suggestions[0].matched_keywords, vec!["rust", "kubernetes"]);
        assert_eq!(suggestions[0].score, 0.5);
    }

    #[test]
    fn test_suggest_respects_limit() {
        let request = SuggestRequest {
            components: vec![
                component("a", "rust"),
                component("b", "rust"),
                component("c", "rust")
            ],
            job_description: "rust".to_string(),
            limit: Some(2)
        };
        assert_eq!(suggest_components(&request).unwrap().len(), 2);
    }

    #[test]
    fn test_suggest_requires_job_description() {
        let request = SuggestRequest {
            components: vec![component("a", "rust")],
            job_description: "  ".to_string(),
            limit: None
        };
        assert_eq!(
            suggest_components(&request).unwrap_err(),
            ValidationError::missing("jobDescription")
        );
    }

    #[test]
    fn test_score_rewards_coverage_and_improvement() {
        let filler = "delivered reliable outcomes consistently ".repeat(8);
        let request = ScoreRequest {
            original: "Wrote software".to_string(),
            tailored: format!("Rust engineer building Kubernetes platform tooling. {filler}"),
            job_description: "Rust engineer for Kubernetes platform".to_string()
        };

        let score = score_tailoring(&request).unwrap();
        assert_eq!(score.keyword_coverage, 1.0);
        assert!(score.missing_keywords.is_empty());
        assert!((IDEAL_WORDS_MIN..=IDEAL_WORDS_MAX).contains(&score.word_count));
        assert_eq!(score.score, 100);
    }

    #[test]
    fn test_score_short_text_without_keywords() {
        let request = ScoreRequest {
            original: "Rust".to_string(),
            tailored: "Baked bread".to_string(),
            job_description: "Rust engineer".to_string()
        };

        let score = score_tailoring(&request).unwrap();
        assert_eq!(score.keyword_coverage, 0.0);
        assert_eq!(score.missing_keywords, vec!["rust", "engineer"]);
        assert!(score.score < 10);
    }

    #[test]
    fn test_length_fit_band() {
        assert_eq!(length_fit(0), 0.0);
        assert_eq!(length_fit(15), 0.5);
        assert_eq!(length_fit(30), 1.0);
        assert_eq!(length_fit(120), 1.0);
        assert_eq!(length_fit(180), 0.5);
        assert_eq!(length_fit(500), 0.0);
    }
}
