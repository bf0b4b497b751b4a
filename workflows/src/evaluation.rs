//! Opportunity evaluation.
//!
//! Fetching the opportunity is the only fatal context step. Profile and
//! memory context are best-effort, and so is writing the evaluation back to
//! the opportunity record.

use crate::error::EvaluationError;
use crate::telemetry::{GenerationTimer, Telemetry};
use orion_core::traits::{EmbeddingService, GenerationService, RecordStore, VectorStore};
use orion_core::types::{
    GenerationRequest, MemoryQuery, Opportunity, OpportunityEvaluation, RequestType,
    ScoredMemoryPoint, UserProfile
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

const EVALUATION_TEMPERATURE: f32 = 0.3;
const EVALUATION_MAX_TOKENS: u32 = 1500;
const MEMORY_CONTEXT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    #[serde(default)]
    pub company_web_context: Option<String>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub success: bool,
    pub evaluation: OpportunityEvaluation,
    pub memory_results: Vec<ScoredMemoryPoint>,
    pub raw_content: String
}

pub struct OpportunityEvaluator {
    records: Arc<dyn RecordStore>,
    embeddings: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorStore>,
    generation: Arc<dyn GenerationService>,
    collection: String
}

impl OpportunityEvaluator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        embeddings: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorStore>,
        generation: Arc<dyn GenerationService>,
        collection: impl Into<String>
    ) -> Self {
        Self {
            records,
            embeddings,
            vectors,
            generation,
            collection: collection.into()
        }
    }

    pub async fn evaluate(
        &self,
        opportunity_id: &str,
        request: &EvaluationRequest
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let result = self.run(opportunity_id, request).await;
        Telemetry::record_evaluation(match &result {
            Ok(_) => "success",
            Err(EvaluationError::Parse { .. }) => "parse_failed",
            Err(_) => "failed"
        });
        result
    }

    async fn run(
        &self,
        opportunity_id: &str,
        request: &EvaluationRequest
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let opportunity = self
            .records
            .fetch_opportunity(opportunity_id)
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    EvaluationError::OpportunityNotFound {
                        id: opportunity_id.to_string()
                    }
                } else {
                    EvaluationError::OpportunityFetch { source }
                }
            })?;

        let profile = match self.records.fetch_profile().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Profile unavailable; evaluating without it");
                None
            }
        };

        let memory_results = self.related_memories(&opportunity).await;

        let prompt = build_prompt(
            &opportunity,
            profile.as_ref(),
            request.company_web_context.as_deref(),
            &memory_results
        );

        let timer = GenerationTimer::new(RequestType::OpportunityEvaluation);
        let generated = self
            .generation
            .generate(&GenerationRequest {
                request_type: RequestType::OpportunityEvaluation,
                primary_context: prompt,
                temperature: EVALUATION_TEMPERATURE,
                max_tokens: EVALUATION_MAX_TOKENS
            })
            .await;
        timer.finish();
        let raw_content = generated.map_err(|source| EvaluationError::Generation { source })?;

        let Some(evaluation) = parse_evaluation(&raw_content) else {
            tracing::warn!(
                opportunity_id,
                chars = raw_content.len(),
                "Evaluation response was not valid JSON"
            );
            return Err(EvaluationError::Parse { raw_content });
        };

        if let Err(e) = self
            .records
            .save_opportunity_evaluation(&opportunity.id, &evaluation)
            .await
        {
            tracing::warn!(error = %e, opportunity_id, "Failed to store evaluation on opportunity");
        }

        Ok(EvaluationOutcome {
            success: true,
            evaluation,
            memory_results,
            raw_content
        })
    }

    async fn related_memories(&self, opportunity: &Opportunity) -> Vec<ScoredMemoryPoint> {
        let query_text = [
            Some(opportunity.title.as_str()),
            Some(opportunity.company.as_str()),
            opportunity.description.as_deref()
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

        if query_text.is_empty() {
            return Vec::new();
        }

        let vector = match self.embeddings.embed(&query_text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(error = %e, "Memory context embedding failed");
                return Vec::new();
            }
        };

        let query = MemoryQuery {
            vector,
            filter: None,
            limit: MEMORY_CONTEXT_LIMIT
        };
        match self.vectors.search(&self.collection, &query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "Memory context search failed");
                Vec::new()
            }
        }
    }
}

fn build_prompt(
    opportunity: &Opportunity,
    profile: Option<&UserProfile>,
    company_web_context: Option<&str>,
    memories: &[ScoredMemoryPoint]
) -> String {
    let mut prompt = String::new();

    prompt.push_str("## Candidate profile\n");
    match profile {
        Some(profile) => {
            if let Some(name) = &profile.name {
                let _ = writeln!(prompt, "Name: {name}");
            }
            let _ = writeln!(prompt, "{}", profile.summary);
        }
        None => prompt.push_str("No profile available.\n")
    }

    prompt.push_str("\n## Opportunity\n");
    let _ = writeln!(prompt, "Title: {}", opportunity.title);
    let _ = writeln!(prompt, "Company: {}", opportunity.company);
    for (label, value) in [
        ("Location", &opportunity.location),
        ("Status", &opportunity.status),
        ("URL", &opportunity.url),
        ("Description", &opportunity.description)
    ] {
        if let Some(value) = value {
            let _ = writeln!(prompt, "{label}: {value}");
        }
    }

    if let Some(context) = company_web_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n## Company research\n");
        let _ = writeln!(prompt, "{}", context.trim());
    }

    if !memories.is_empty() {
        prompt.push_str("\n## Related notes from memory\n");
        for memory in memories {
            let _ = writeln!(prompt, "- {}", memory.payload.text.replace('\n', " "));
        }
    }

    prompt
}

/// Parses generation output as an evaluation, retrying once on the first
/// balanced `{...}` block when the whole text is not valid JSON.
pub fn parse_evaluation(raw: &str) -> Option<OpportunityEvaluation> {
    serde_json::from_str::<OpportunityEvaluation>(raw.trim())
        .ok()
        .or_else(|| {
            extract_json_object(raw)
                .and_then(|block| serde_json::from_str::<OpportunityEvaluation>(block).ok())
        })
        .map(|mut evaluation| {
            evaluation.fit_score_out_of_10 = evaluation.fit_score_out_of_10.clamp(0.0, 10.0);
            evaluation
        })
}

/// Returns the first balanced `{...}` block of `text`. Braces inside JSON
/// string literals are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
