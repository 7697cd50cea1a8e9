//! Wire codec for the classification service.
//!
//! The service speaks JSON with Portuguese keys:
//!
//! ```text
//! {
//!   "hitl_required": true,
//!   "hitl_metadata": { "node_id", "pergunta", "depth", "entropia_local",
//!                      "children": [{ "id", "score", "prob", "justificativa" }] },
//!   "final": { "node_id", "log_prob", "historico": [...] },
//!   "resultado_formatado": { "classe", "tipo_ocorrencia", "justificativa_tecnica",
//!                            "confianca": { "nivel", "nivel_display" }, "resumo_tecnico" },
//!   "state": { ... }
//! }
//! ```
//!
//! Only the discriminator and the fields the client acts on are typed.
//! History entries are read leniently, and a formatted result that does not
//! fit the expected shape degrades to the legacy path instead of failing the
//! whole response.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tracing::warn;

use super::{
    Confidence, ConfidenceLevel, DecisionOption, DecisionRecord, FinalOutcome, FormattedResult,
    HitlMetadata, OpaqueState, ResponseEnvelope, ResultFormat,
};
use crate::error::ClassifyError;

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /predict`.
///
/// The key carrying the text is configurable because deployed services do
/// not agree on it.
pub fn predict_body(text_field: &str, event_text: &str) -> Value {
    let mut body = Map::with_capacity(1);
    body.insert(text_field.to_string(), Value::String(event_text.to_string()));
    Value::Object(body)
}

/// Body of `POST /hitl/continue`.
#[derive(Debug, Serialize)]
pub struct ContinueBody<'a> {
    pub state: &'a OpaqueState,
    pub selected_child: &'a str,
    pub justification: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw response shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    hitl_required: bool,
    #[serde(default)]
    hitl_metadata: Option<RawHitlMetadata>,
    #[serde(default, rename = "final")]
    final_outcome: Option<RawFinal>,
    #[serde(default)]
    resultado_formatado: Option<Value>,
    #[serde(default)]
    state: Option<Box<RawValue>>,
}

#[derive(Debug, Deserialize)]
struct RawHitlMetadata {
    node_id: String,
    #[serde(default)]
    pergunta: Option<String>,
    #[serde(default)]
    depth: Option<u32>,
    #[serde(default)]
    entropia_local: Option<f64>,
    #[serde(default)]
    children: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: String,
    #[serde(default)]
    score: f64,
    prob: f64,
    #[serde(default)]
    justificativa: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFinal {
    node_id: String,
    log_prob: f64,
    #[serde(default)]
    historico: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawFormatted {
    classe: String,
    #[serde(default)]
    tipo_ocorrencia: Option<String>,
    #[serde(default)]
    justificativa_tecnica: Option<String>,
    #[serde(default)]
    confianca: Option<RawConfidence>,
    #[serde(default)]
    resumo_tecnico: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfidence {
    nivel: String,
    #[serde(default)]
    nivel_display: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

fn malformed(details: impl Into<String>) -> ClassifyError {
    ClassifyError::MalformedResponse {
        details: details.into(),
    }
}

/// Parses a 2xx response body into an envelope.
///
/// # Errors
///
/// Returns `ClassifyError::MalformedResponse` if the body is not JSON, lacks
/// `state`, lacks the payload its discriminator promises, or carries
/// impossible values (negative entropy, probabilities outside `[0, 1]`,
/// duplicate or missing option ids).
pub fn parse_envelope(body: &[u8]) -> Result<ResponseEnvelope, ClassifyError> {
    let raw: RawEnvelope = serde_json::from_slice(body)
        .map_err(|e| malformed(format!("invalid envelope JSON: {e}")))?;
    ResponseEnvelope::try_from(raw)
}

impl TryFrom<RawEnvelope> for ResponseEnvelope {
    type Error = ClassifyError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        let state = match raw.state {
            Some(raw) if raw.get().trim() != "null" => OpaqueState::from_raw(raw),
            _ => return Err(malformed("missing 'state'")),
        };

        if raw.hitl_required {
            let metadata = raw
                .hitl_metadata
                .ok_or_else(|| malformed("'hitl_required' is true but 'hitl_metadata' is missing"))?;
            return Ok(Self::Escalation {
                metadata: convert_metadata(metadata)?,
                state,
            });
        }

        let outcome = raw
            .final_outcome
            .ok_or_else(|| malformed("'hitl_required' is false but 'final' is missing"))?;

        let format = match raw.resultado_formatado {
            None | Some(Value::Null) => ResultFormat::Legacy,
            Some(value) => match serde_json::from_value::<RawFormatted>(value) {
                Ok(formatted) => ResultFormat::Formatted(convert_formatted(formatted)),
                Err(e) => {
                    warn!(error = %e, "Ignoring unusable formatted result, using legacy view");
                    ResultFormat::Legacy
                }
            },
        };

        Ok(Self::Terminal {
            outcome: FinalOutcome {
                node_id: outcome.node_id,
                log_probability: outcome.log_prob,
                decision_history: outcome
                    .historico
                    .unwrap_or_default()
                    .into_iter()
                    .map(decision_record)
                    .collect(),
            },
            format,
            state,
        })
    }
}

fn convert_metadata(raw: RawHitlMetadata) -> Result<HitlMetadata, ClassifyError> {
    let local_entropy = raw.entropia_local.unwrap_or(0.0);
    if local_entropy < 0.0 {
        return Err(malformed(format!(
            "negative local entropy {local_entropy} at node '{}'",
            raw.node_id
        )));
    }

    if raw.children.is_empty() {
        return Err(malformed(format!(
            "escalation at node '{}' offers no options",
            raw.node_id
        )));
    }

    let mut seen = HashSet::with_capacity(raw.children.len());
    let mut children = Vec::with_capacity(raw.children.len());
    for child in raw.children {
        if child.id.is_empty() {
            return Err(malformed("option with empty id"));
        }
        if !(0.0..=1.0).contains(&child.prob) {
            return Err(malformed(format!(
                "probability {} of option '{}' is outside [0, 1]",
                child.prob, child.id
            )));
        }
        if !seen.insert(child.id.clone()) {
            return Err(malformed(format!("duplicate option id '{}'", child.id)));
        }
        children.push(DecisionOption {
            id: child.id,
            score: child.score,
            probability: child.prob,
            rationale: child.justificativa.unwrap_or_default(),
        });
    }

    Ok(HitlMetadata {
        node_id: raw.node_id,
        question: raw.pergunta.unwrap_or_default(),
        depth: raw.depth.unwrap_or(0),
        local_entropy,
        children,
    })
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn convert_formatted(raw: RawFormatted) -> FormattedResult {
    let confidence = raw.confianca.and_then(|c| match ConfidenceLevel::from_token(&c.nivel) {
        Some(level) => Some(Confidence {
            level,
            display_label: non_blank(c.nivel_display).unwrap_or(c.nivel),
        }),
        None => {
            warn!(level = %c.nivel, "Unrecognized confidence level, omitting confidence");
            None
        }
    });

    FormattedResult {
        class_name: raw.classe,
        occurrence_type: raw.tipo_ocorrencia.unwrap_or_default(),
        technical_justification: non_blank(raw.justificativa_tecnica),
        confidence,
        technical_summary: non_blank(raw.resumo_tecnico),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient history entries
// ─────────────────────────────────────────────────────────────────────────────

const RECORD_KEYS: &[&str] = &[
    "node_id",
    "pergunta",
    "depth",
    "children",
    "chosen_child",
    "chosen_score",
    "chosen_prob",
    "colapso_ontologico",
    "justificativa_humana",
];

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn f64_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// Reads one history entry. Wrongly typed fields are dropped, never fatal.
fn decision_record(value: Value) -> DecisionRecord {
    let Value::Object(obj) = value else {
        return DecisionRecord::default();
    };

    let children = obj
        .get("children")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|child| {
                    Some(DecisionOption {
                        id: str_field(child, "id")?,
                        score: f64_field(child, "score").unwrap_or(0.0),
                        probability: f64_field(child, "prob").unwrap_or(0.0),
                        rationale: str_field(child, "justificativa").unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    DecisionRecord {
        node_id: str_field(&obj, "node_id"),
        question: str_field(&obj, "pergunta"),
        depth: obj
            .get("depth")
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok()),
        children,
        chosen_child: str_field(&obj, "chosen_child"),
        chosen_score: f64_field(&obj, "chosen_score"),
        chosen_probability: f64_field(&obj, "chosen_prob"),
        deterministic: obj
            .get("colapso_ontologico")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        human_justification: non_blank(str_field(&obj, "justificativa_humana")),
        extra: obj
            .iter()
            .filter(|(k, _)| !RECORD_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}
