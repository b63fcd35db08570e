//! Enrichment processor: drives one constrained completion call per
//! article and coerces the response into a strict schema.
//!
//! The completion is treated as an untrusted string: it may be wrapped in
//! a markdown code fence, and every classification field is validated
//! against its closed set before anything is accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{LlmBackend, LlmError, LlmRequest, Message};

pub const SUBSPECIALTIES: &[&str] = &[
    "Oncology",
    "Vascular",
    "Spine",
    "Functional",
    "Trauma",
    "Pediatric",
    "Skull base",
    "General",
];

pub const ARTICLE_TYPES: &[&str] = &[
    "Clinical trial",
    "Case report",
    "Review",
    "Technical note",
    "Outcomes study",
    "Basic research",
];

pub const CLINICAL_RELEVANCE: &[&str] = &[
    "Practice-changing",
    "Important update",
    "Background knowledge",
    "Research only",
];

const SYSTEM_PROMPT: &str = "\
You are analyzing a scientific article. You must ONLY use information that is explicitly stated \
in the title and abstract provided.

CRITICAL RULES:
- If information is not explicitly mentioned, respond with 'Unknown'
- Do NOT infer, assume, or extrapolate beyond what is written
- Do NOT use your general medical knowledge to fill in gaps
- Do NOT make educated guesses
- For categories, if unclear choose the most conservative option
- For each field, if you cannot determine the answer with 100% confidence from the text provided, \
mark it as 'Unknown' or 'Not specified'

Always respond with valid JSON and nothing else.";

fn user_prompt(title: &str, journal: &str, abstract_text: &str) -> String {
    format!(
        "Analyze ONLY the title and abstract below. Do not use any outside knowledge.\n\
         \n\
         Title: {title}\n\
         Journal: {journal}\n\
         Abstract: {abstract_text}\n\
         \n\
         Based STRICTLY on the text above, generate the following in English:\n\
         \n\
         1. \"summary\": A short summary (2-3 sentences) using ONLY facts stated in the abstract. \
         Do not add context or background not present in the text.\n\
         2. \"importance\": Why is this important based on what the authors explicitly state? \
         (1-2 sentences). If the abstract does not state importance, write \"Not specified in abstract\".\n\
         3. \"news_value\": A score from 1-10 (integer). ONLY score highly (7+) if the abstract \
         explicitly reports significant/novel results. If the abstract is vague or results are unclear, \
         score conservatively (1-4). 10 = abstract explicitly describes paradigm-shifting results; \
         1 = routine/incremental or unclear findings.\n\
         4. \"subspecialty\": Choose exactly one from: \"Oncology\", \"Vascular\", \"Spine\", \
         \"Functional\", \"Trauma\", \"Pediatric\", \"Skull base\", \"General\". Choose \"General\" \
         if the subspecialty is not clearly identifiable from the title and abstract.\n\
         5. \"article_type\": Choose exactly one from: \"Clinical trial\", \"Case report\", \"Review\", \
         \"Technical note\", \"Outcomes study\", \"Basic research\". Choose based on what the abstract \
         explicitly describes (e.g. \"randomized trial\", \"case series\", \"systematic review\"). \
         If unclear, choose \"Outcomes study\" as default.\n\
         6. \"clinical_relevance\": Choose exactly one from: \"Practice-changing\", \"Important update\", \
         \"Background knowledge\", \"Research only\". Use \"Practice-changing\" ONLY if the abstract \
         explicitly states results that would change clinical practice. Default to \"Background knowledge\" \
         if uncertain.\n\
         \n\
         Respond ONLY with JSON in this exact format:\n\
         {{\"summary\": \"...\", \"importance\": \"...\", \"news_value\": N, \"subspecialty\": \"...\", \
         \"article_type\": \"...\", \"clinical_relevance\": \"...\"}}"
    )
}

// ── Error ─────────────────────────────────────────────────────────────────────

/// One per-record failure class; the orchestrator logs it and moves on.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("completion call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing field {0}")]
    MissingField(&'static str),

    #[error("{field} {value:?} is outside the allowed set")]
    OutOfSet { field: &'static str, value: String },

    #[error("news_value {0} is out of range 1-10")]
    NewsValueOutOfRange(i32),
}

// ── Output schema ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub summary: String,
    pub importance: String,
    pub news_value: i32,
    pub subspecialty: String,
    pub article_type: String,
    pub clinical_relevance: String,
}

// ── Processor ─────────────────────────────────────────────────────────────────

/// Run one enrichment completion for an article. The abstract must be
/// non-empty; the orchestrator's selection query guarantees that.
pub async fn enrich_article(
    backend: &dyn LlmBackend,
    title: &str,
    journal: &str,
    abstract_text: &str,
) -> Result<Enrichment, EnrichError> {
    let req = LlmRequest {
        messages: vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(user_prompt(title, journal, abstract_text)),
        ],
        model: None,
        max_tokens: Some(512),
        temperature: None,
    };
    let resp = backend.complete(req).await?;
    parse_enrichment(&resp.content)
}

/// Strip a leading markdown fence line (with optional language tag) and
/// any trailing fence, leaving the JSON body.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and validate a completion response against the target schema.
pub fn parse_enrichment(raw: &str) -> Result<Enrichment, EnrichError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))?;

    let news_value = value
        .get("news_value")
        .and_then(serde_json::Value::as_f64)
        .ok_or(EnrichError::MissingField("news_value"))?
        .round() as i32;
    if !(1..=10).contains(&news_value) {
        return Err(EnrichError::NewsValueOutOfRange(news_value));
    }

    Ok(Enrichment {
        summary: text_field(&value, "summary")?,
        importance: text_field(&value, "importance")?,
        news_value,
        subspecialty: closed_field(&value, "subspecialty", SUBSPECIALTIES)?,
        article_type: closed_field(&value, "article_type", ARTICLE_TYPES)?,
        clinical_relevance: closed_field(&value, "clinical_relevance", CLINICAL_RELEVANCE)?,
    })
}

fn text_field(value: &serde_json::Value, field: &'static str) -> Result<String, EnrichError> {
    value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or(EnrichError::MissingField(field))
}

fn closed_field(
    value: &serde_json::Value,
    field: &'static str,
    allowed: &[&str],
) -> Result<String, EnrichError> {
    let text = text_field(value, field)?;
    if !allowed.contains(&text.as_str()) {
        return Err(EnrichError::OutOfSet { field, value: text });
    }
    Ok(text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
