//! Notion-backed [`RecordStore`].
//!
//! Journal entries live in one database whose pages carry the properties
//! below. Opportunity, milestone and profile records are addressed directly
//! by page id.

use crate::http::{build_client, decode, join_url, send};
use async_trait::async_trait;
use config::NotionConfig;
use errors::{ProviderError, Service};
use orion_core::traits::{ProviderResult, RecordStore};
use orion_core::types::{
    JournalEntryRecord, NewJournalPage, Opportunity, OpportunityEvaluation, UserProfile
};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};

const ENTRY_DATE: &str = "Entry Date";
const MOOD: &str = "Mood";
const TAGS: &str = "Tags";
const CONTENT: &str = "Content";

const COMPANY: &str = "Company";
const LEGACY_COMPANY: &str = "Company or Institution";
const FIT_SCORE: &str = "Fit Score";
const RECOMMENDATION: &str = "Recommendation";
const EVALUATION: &str = "Evaluation";
const ORDER: &str = "Order";

/// Notion rejects rich text items longer than this.
const RICH_TEXT_LIMIT: usize = 2000;
/// Most rich text items one property or block may hold.
const RICH_TEXT_ITEMS: usize = 100;
/// Most child blocks one page creation may carry.
const CHILD_BLOCKS: usize = 100;
const PAGE_SIZE: u32 = 100;

pub struct NotionRecordStore {
    client: Client,
    config: NotionConfig
}

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>
}

impl NotionRecordStore {
    pub fn new(config: NotionConfig) -> Result<Self, ProviderError> {
        let client = build_client(Service::Notion, config.timeout_seconds)?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> ProviderResult<RequestBuilder> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::not_configured(Service::Notion, "notion.api_key"))?;

        Ok(self
            .client
            .request(method, join_url(&self.config.base_url, path))
            .bearer_auth(api_key)
            .header("Notion-Version", &self.config.version))
    }

    fn journal_database(&self) -> ProviderResult<&str> {
        self.config.journal_database_id.as_deref().ok_or_else(|| {
            ProviderError::not_configured(Service::Notion, "notion.journal_database_id")
        })
    }

    async fn get_page(&self, id: &str) -> ProviderResult<Page> {
        let request = self.request(Method::GET, &format!("pages/{}", urlencoding::encode(id)))?;
        match send(Service::Notion, request).await {
            Ok(response) => decode(Service::Notion, response).await,
            Err(e) if e.is_not_found() => Err(ProviderError::NotFound {
                service: Service::Notion,
                id: id.to_string()
            }),
            Err(e) => Err(e)
        }
    }

    async fn update_properties(&self, id: &str, properties: Value) -> ProviderResult<()> {
        let request = self
            .request(Method::PATCH, &format!("pages/{}", urlencoding::encode(id)))?
            .json(&json!({ "properties": properties }));
        send(Service::Notion, request).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for NotionRecordStore {
    async fn create_journal_entry(&self, page: &NewJournalPage) -> ProviderResult<String> {
        let database_id = self.journal_database()?;

        let mut properties = Map::new();
        properties.insert("Title".to_string(), json!({ "title": rich_text(&page.title) }));
        properties.insert(ENTRY_DATE.to_string(), json!({ "date": { "start": page.date } }));
        let (content, overflow) = rich_text_with_overflow(&page.content);
        properties.insert(CONTENT.to_string(), json!({ "rich_text": content }));
        properties.insert(
            TAGS.to_string(),
            json!({
                "multi_select": page
                    .tags
                    .iter()
                    .map(|tag| json!({ "name": tag.replace(',', " ") }))
                    .collect::<Vec<_>>()
            })
        );
        if let Some(mood) = &page.mood {
            properties.insert(MOOD.to_string(), json!({ "select": { "name": mood } }));
        }

        let mut body = json!({
            "parent": { "database_id": database_id },
            "properties": properties
        });
        if !overflow.is_empty() {
            tracing::debug!(blocks = overflow.len(), "Journal content overflows into page body");
            body["children"] = Value::Array(overflow);
        }

        let request = self.request(Method::POST, "pages")?.json(&body);
        let created: Page = decode(Service::Notion, send(Service::Notion, request).await?).await?;

        tracing::debug!(page_id = %created.id, "Created journal page");
        Ok(created.id)
    }

    async fn list_journal_entries(&self) -> ProviderResult<Vec<JournalEntryRecord>> {
        let database_id = self.journal_database()?;
        let path = format!("databases/{}/query", urlencoding::encode(database_id));

        let mut entries = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = json!({
                "page_size": PAGE_SIZE,
                "sorts": [{ "property": ENTRY_DATE, "direction": "descending" }]
            });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let request = self.request(Method::POST, &path)?.json(&body);
            let page: QueryResponse =
                decode(Service::Notion, send(Service::Notion, request).await?).await?;

            entries.extend(page.results.iter().map(journal_record));

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break
            }
        }

        Ok(entries)
    }

    async fn fetch_opportunity(&self, id: &str) -> ProviderResult<Opportunity> {
        let page = self.get_page(id).await?;
        Ok(Opportunity {
            id: page.id.clone(),
            title: page.title(),
            company: page
                .text(COMPANY)
                .or_else(|| page.text(LEGACY_COMPANY))
                .unwrap_or_default(),
            description: page.text("Description"),
            status: page.text("Status"),
            url: page.text("URL"),
            location: page.text("Location")
        })
    }

    async fn save_opportunity_evaluation(
        &self,
        id: &str,
        evaluation: &OpportunityEvaluation
    ) -> ProviderResult<()> {
        self.update_properties(
            id,
            json!({
                FIT_SCORE: { "number": evaluation.fit_score_out_of_10 },
                RECOMMENDATION: { "rich_text": rich_text(&evaluation.recommendation) },
                EVALUATION: { "rich_text": rich_text(&evaluation_summary(evaluation)) }
            })
        )
        .await
    }

    async fn fetch_profile(&self) -> ProviderResult<UserProfile> {
        let page_id = self.config.profile_page_id.as_deref().ok_or_else(|| {
            ProviderError::not_configured(Service::Notion, "notion.profile_page_id")
        })?;
        let page = self.get_page(page_id).await?;

        let name = Some(page.title()).filter(|title| !title.is_empty());
        let summary = page
            .properties
            .iter()
            .filter(|(_, value)| value["type"] != "title")
            .filter_map(|(key, value)| property_text(value).map(|text| format!("{key}: {text}")))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(UserProfile { name, summary })
    }

    async fn update_milestone_order(&self, id: &str, order: i64) -> ProviderResult<()> {
        self.update_properties(id, json!({ ORDER: { "number": order } }))
            .await
    }
}

impl Page {
    /// Text of the page's title property, whatever it is named.
    fn title(&self) -> String {
        self.properties
            .values()
            .find(|value| value["type"] == "title")
            .and_then(property_text)
            .unwrap_or_default()
    }

    fn text(&self, name: &str) -> Option<String> {
        self.properties.get(name).and_then(property_text)
    }

    fn multi_select(&self, name: &str) -> Vec<String> {
        self.properties
            .get(name)
            .and_then(|value| value["multi_select"].as_array())
            .map(|options| {
                options
                    .iter()
                    .filter_map(|option| option["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn journal_record(page: &Page) -> JournalEntryRecord {
    JournalEntryRecord {
        notion_page_id: page.id.clone(),
        title: page.title(),
        date: page.text(ENTRY_DATE),
        content: page.text(CONTENT).unwrap_or_default(),
        mood: page.text(MOOD),
        tags: page.multi_select(TAGS)
    }
}

/// Flattens a property value to text. Returns `None` for empty values and
/// property types that carry no text.
fn property_text(value: &Value) -> Option<String> {
    let kind = value["type"].as_str()?;
    let inner = &value[kind];
    let text = match kind {
        "title" | "rich_text" => inner
            .as_array()?
            .iter()
            .filter_map(|item| item["plain_text"].as_str().or(item["text"]["content"].as_str()))
            .collect::<String>(),
        "select" | "status" => inner["name"].as_str()?.to_string(),
        "multi_select" => inner
            .as_array()?
            .iter()
            .filter_map(|option| option["name"].as_str())
            .collect::<Vec<_>>()
            .join(", "),
        "date" => inner["start"].as_str()?.to_string(),
        "number" => inner.as_f64()?.to_string(),
        "url" | "email" | "phone_number" => inner.as_str()?.to_string(),
        _ => return None
    };
    Some(text).filter(|text| !text.trim().is_empty())
}

fn rich_text_items(content: &str) -> Vec<Value> {
    let chars: Vec<char> = content.chars().collect();
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| {
            json!({
                "type": "text",
                "text": { "content": chunk.iter().collect::<String>() }
            })
        })
        .collect()
}

/// Rich text for a single property, truncated to the item limit.
fn rich_text(content: &str) -> Vec<Value> {
    let mut items = rich_text_items(content);
    if items.len() > RICH_TEXT_ITEMS {
        tracing::warn!(items = items.len(), "Truncating rich text property");
        items.truncate(RICH_TEXT_ITEMS);
    }
    items
}

/// Splits `content` into the items that fit one property and paragraph
/// blocks holding the rest.
fn rich_text_with_overflow(content: &str) -> (Vec<Value>, Vec<Value>) {
    let mut items = rich_text_items(content);
    let rest = items.split_off(items.len().min(RICH_TEXT_ITEMS));

    let mut blocks: Vec<Value> = rest
        .chunks(RICH_TEXT_ITEMS)
        .map(|chunk| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": { "rich_text": chunk }
            })
        })
        .collect();
    if blocks.len() > CHILD_BLOCKS {
        tracing::warn!(blocks = blocks.len(), "Truncating journal page body");
        blocks.truncate(CHILD_BLOCKS);
    }
    (items, blocks)
}

fn evaluation_summary(evaluation: &OpportunityEvaluation) -> String {
    let mut summary = evaluation.reasoning.clone();
    for (heading, items) in [
        ("Pros", &evaluation.pros),
        ("Cons", &evaluation.cons),
        ("Missing skills", &evaluation.missing_skills),
        ("Next steps", &evaluation.suggested_next_steps)
    ] {
        if items.is_empty() {
            continue;
        }
        summary.push_str(&format!("\n\n{heading}:"));
        for item in items {
            summary.push_str(&format!("\n- {item}"));
        }
    }
    summary
}
