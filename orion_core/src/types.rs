use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Formats a UTC instant the way every Orion timestamp is stored
/// (`2024-05-01T09:30:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    iso_timestamp(Utc::now())
}

// ============================================================================
// Journal
// ============================================================================

/// A journal entry as captured by one form submission.
///
/// Durable storage is owned by the record store; this struct only carries the
/// entry through a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub text: String,
    pub mood: Option<String>,
    pub tags: Vec<String>,
    pub entry_timestamp: String,
    pub source_id: Option<String>
}

/// Page contents handed to the record store when a journal entry is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalPage {
    pub title: String,
    pub date: String,
    pub content: String,
    pub mood: Option<String>,
    pub tags: Vec<String>
}

/// A journal entry read back from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryRecord {
    pub notion_page_id: String,
    pub title: String,
    pub date: Option<String>,
    pub content: String,
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>
}

// ============================================================================
// Memory
// ============================================================================

/// Kind of a stored memory. Points written by other tools into the same
/// collection keep their own type string in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    JournalEntry,
    JournalReflection,
    CareerMilestone,
    Opportunity,
    CvComponent,
    Note,
    #[serde(untagged)]
    Other(String)
}

impl MemoryType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::JournalEntry => "journal_entry",
            Self::JournalReflection => "journal_reflection",
            Self::CareerMilestone => "career_milestone",
            Self::Opportunity => "opportunity",
            Self::CvComponent => "cv_component",
            Self::Note => "note",
            Self::Other(kind) => kind
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload stored alongside every vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPayload {
    pub text: String,
    pub source_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub indexed_at: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_entry_id: Option<String>
}

/// A point sent to the vector store. `id` is always freshly generated and
/// unrelated to `payload.source_id`; a deserialized point without one gets a
/// new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPoint {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: MemoryPayload
}

impl MemoryPoint {
    pub fn new(vector: Vec<f32>, payload: MemoryPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            vector,
            payload
        }
    }
}

/// Identifier of a stored point; the vector store accepts UUIDs and
/// unsigned integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemoryPoint {
    pub id: PointId,
    pub score: f32,
    pub payload: MemoryPayload
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    Bool(bool),
    Integer(i64),
    Keyword(String)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchCondition {
    Value { value: MatchValue },
    Any { any: Vec<MatchValue> }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub key: String,
    #[serde(rename = "match")]
    pub matches: MatchCondition
}

/// Payload filter in the vector store's own `must`/`should`/`must_not` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FieldCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<FieldCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FieldCondition>
}

impl MemoryFilter {
    pub fn must_match(mut self, key: impl Into<String>, value: MatchValue) -> Self {
        self.must.push(FieldCondition {
            key: key.into(),
            matches: MatchCondition::Value { value }
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryQuery {
    pub vector: Vec<f32>,
    pub filter: Option<MemoryFilter>,
    pub limit: usize
}

// ============================================================================
// Generation
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestType {
    JournalReflection,
    OpportunityEvaluation
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub request_type: RequestType,
    pub primary_context: String,
    pub temperature: f32,
    pub max_tokens: u32
}

// ============================================================================
// Opportunities
// ============================================================================

/// A tracked job or programme opportunity. `company` is the single canonical
/// organisation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: Option<String>,
    pub summary: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityEvaluation {
    #[serde(rename = "fitScoreOutOf10")]
    pub fit_score_out_of_10: f32,
    pub recommendation: String,
    pub reasoning: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub suggested_next_steps: Vec<String>
}

// ============================================================================
// Career narrative
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneOrder {
    pub id: String,
    pub order: i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReorderDirection {
    Up,
    Down
}

// ============================================================================
// Habitica
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabiticaCredentials {
    pub user_id: String,
    pub api_token: String
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    #[default]
    Todos,
    Dailys
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreDirection {
    Up,
    Down
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabiticaTask {
    #[serde(alias = "_id")]
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<f32>,
    #[serde(default)]
    pub value: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f32>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub delta: f64,
    #[serde(default)]
    pub hp: Option<f64>,
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub gp: Option<f64>,
    #[serde(default)]
    pub lvl: Option<u32>
}

// ============================================================================
// CV tailoring
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvComponent {
    pub id: String,
    pub component_type: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedComponent {
    pub component: CvComponent,
    pub score: f32,
    pub matched_keywords: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoringScore {
    pub score: u8,
    pub keyword_coverage: f32,
    pub word_count: usize,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn test_memory_payload_wire_shape() {
        let payload = MemoryPayload {
            text: "Had a great day".to_string(),
            source_id: "page-1".to_string(),
            timestamp: "2024-05-01T09:30:00.000Z".to_string(),
            indexed_at: "2024-05-01T09:30:01.000Z".to_string(),
            memory_type: MemoryType::JournalEntry,
            tags: vec!["journal".to_string()],
            mood: None,
            original_entry_id: Some("page-1".to_string())
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "journal_entry");
        assert_eq!(json["source_id"], "page-1");
        assert_eq!(json["original_entry_id"], "page-1");
        assert!(json.get("mood").is_none());
    }

    #[test]
    fn test_foreign_memory_type_round_trips() {
        let payload: MemoryPayload = serde_json::from_value(serde_json::json!({
            "text": "Finish the report",
            "source_id": "task-9",
            "timestamp": "2024-05-01T09:30:00.000Z",
            "type": "habitica_task"
        }))
        .unwrap();
        assert_eq!(payload.memory_type, MemoryType::Other("habitica_task".to_string()));
        assert!(payload.indexed_at.is_empty());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "habitica_task");
        assert_eq!(payload.memory_type.to_string(), "habitica_task");

        let known: MemoryType = serde_json::from_value(serde_json::json!("cv_component")).unwrap();
        assert_eq!(known, MemoryType::CvComponent);
    }

    #[test]
    fn test_memory_points_get_distinct_ids() {
        let payload = MemoryPayload {
            text: "x".to_string(),
            source_id: "s".to_string(),
            timestamp: String::new(),
            indexed_at: String::new(),
            memory_type: MemoryType::Note,
            tags: Vec::new(),
            mood: None,
            original_entry_id: None
        };
        let a = MemoryPoint::new(vec![0.1], payload.clone());
        let b = MemoryPoint::new(vec![0.1], payload);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_filter_serializes_in_store_shape() {
        let filter = MemoryFilter::default()
            .must_match("type", MatchValue::Keyword("journal_entry".to_string()));
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "must": [{ "key": "type", "match": { "value": "journal_entry" } }]
            })
        );
    }

    #[test]
    fn test_filter_deserializes_any_condition() {
        let filter: MemoryFilter = serde_json::from_value(serde_json::json!({
            "should": [{ "key": "tags", "match": { "any": ["work", "health"] } }]
        }))
        .unwrap();
        assert_eq!(filter.should.len(), 1);
        assert!(matches!(
            filter.should[0].matches,
            MatchCondition::Any { ref any } if any.len() == 2
        ));
    }

    #[test]
    fn test_evaluation_field_names() {
        let evaluation: OpportunityEvaluation = serde_json::from_value(serde_json::json!({
            "fitScoreOutOf10": 7.5,
            "recommendation": "Apply",
            "reasoning": "Strong overlap",
            "missingSkills": ["Kubernetes"]
        }))
        .unwrap();
        assert_eq!(evaluation.fit_score_out_of_10, 7.5);
        assert_eq!(evaluation.missing_skills, vec!["Kubernetes".to_string()]);
        assert!(evaluation.pros.is_empty());
    }

    #[test]
    fn test_habitica_task_accepts_underscore_id() {
        let task: HabiticaTask = serde_json::from_value(serde_json::json!({
            "_id": "task-1",
            "text": "Write",
            "type": "todo"
        }))
        .unwrap();
        assert_eq!(task.id, "task-1");
        assert!(task.notes.is_empty());
    }

    #[test]
    fn test_point_id_variants() {
        let num: PointId = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(num, PointId::Num(42));
        let uuid: PointId =
            serde_json::from_value(serde_json::json!("5c56c793-69f3-4fbf-87e6-c4bf54c28c26"))
                .unwrap();
        assert!(matches!(uuid, PointId::Uuid(_)));
    }
}
