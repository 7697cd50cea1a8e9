//! Response envelope model.
//!
//! A classification response is a tagged union: either the service paused at
//! a high-entropy node and needs a human decision (`Escalation`), or it reached
//! a leaf (`Terminal`). Both branches carry the server-owned `state` blob that
//! must be echoed back untouched on the next continuation.
//!
//! The wire format (Portuguese keys, loosely typed history entries) lives in
//! [`wire`]; everything here is the validated, client-facing shape.

pub mod wire;

use std::fmt;

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

pub use wire::parse_envelope;

// ─────────────────────────────────────────────────────────────────────────────
// Opaque State
// ─────────────────────────────────────────────────────────────────────────────

/// Server-owned continuation state.
///
/// Kept as the exact bytes the service sent and echoed without re-encoding,
/// so numbers beyond `f64` precision survive the round trip. The client never
/// inspects, merges or partially updates it.
#[derive(Clone, Serialize)]
#[serde(transparent)]
pub struct OpaqueState(Box<RawValue>);

impl OpaqueState {
    /// Wraps the raw JSON text received from the service.
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        Self(raw)
    }

    /// Encodes a JSON value as state.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        serde_json::value::to_raw_value(value).map(Self)
    }

    /// Returns true if the service sent `null` (unusable for continuation).
    pub fn is_null(&self) -> bool {
        self.0.get().trim() == "null"
    }

    /// The state exactly as received.
    pub fn as_json(&self) -> &str {
        self.0.get()
    }

    /// Decodes the state into a JSON value. Lossy for out-of-range numbers.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::from_str(self.0.get())
    }
}

impl PartialEq for OpaqueState {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

impl fmt::Debug for OpaqueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never dump the blob into logs.
        let kind = match self.0.get().trim_start().as_bytes().first() {
            Some(b'n') => "null",
            Some(b't' | b'f') => "bool",
            Some(b'"') => "string",
            Some(b'[') => "array",
            Some(b'{') => "object",
            _ => "number",
        };
        f.debug_tuple("OpaqueState").field(&kind).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Escalation branch
// ─────────────────────────────────────────────────────────────────────────────

/// One ranked child of the node awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionOption {
    /// Child node identifier, unique within one option list.
    pub id: String,
    /// Raw model score.
    pub score: f64,
    /// Normalized probability in `[0, 1]`.
    pub probability: f64,
    /// Model rationale for this child.
    pub rationale: String,
}

/// Data describing an escalation point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitlMetadata {
    pub node_id: String,
    pub question: String,
    pub depth: u32,
    /// Local Shannon entropy reported by the service (never negative).
    pub local_entropy: f64,
    /// Children in server order. Index 0 is the recommended option.
    pub children: Vec<DecisionOption>,
}

impl HitlMetadata {
    /// Looks up an option by id.
    pub fn option(&self, id: &str) -> Option<&DecisionOption> {
        self.children.iter().find(|c| c.id == id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminal branch
// ─────────────────────────────────────────────────────────────────────────────

/// One step of the traversal as recorded by the service.
///
/// Every field is optional. History entries are informational and a
/// malformed one never fails envelope parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub node_id: Option<String>,
    pub question: Option<String>,
    pub depth: Option<u32>,
    pub children: Vec<DecisionOption>,
    pub chosen_child: Option<String>,
    pub chosen_score: Option<f64>,
    pub chosen_probability: Option<f64>,
    /// Set when the service collapsed the node deterministically (single
    /// plausible child) instead of scoring it.
    pub deterministic: bool,
    /// Justification typed by the human, when the step was escalated.
    pub human_justification: Option<String>,
    /// Fields the client does not interpret.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// The leaf reached by the traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalOutcome {
    pub node_id: String,
    pub log_probability: f64,
    pub decision_history: Vec<DecisionRecord>,
}

/// Server-reported confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    /// Parses the service's level token. Accepts the Portuguese tokens the
    /// service emits as well as their English equivalents.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "alta" | "high" => Some(Self::High),
            "moderada" | "moderate" | "media" | "medium" => Some(Self::Moderate),
            "baixa" | "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence block of a formatted result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confidence {
    pub level: ConfidenceLevel,
    /// Human-facing label chosen by the service (e.g. "Alta").
    pub display_label: String,
}

/// Presentation-ready result produced by the service.
///
/// Optional fields are independent: any subset may be present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedResult {
    pub class_name: String,
    pub occurrence_type: String,
    /// Multi-paragraph free text.
    pub technical_justification: Option<String>,
    pub confidence: Option<Confidence>,
    /// Lightly marked-up text, see [`crate::render::markup`].
    pub technical_summary: Option<String>,
}

/// Which result path a terminal envelope takes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    /// The service sent a formatted result; it takes precedence.
    Formatted(FormattedResult),
    /// No formatted result; the client falls back to the legacy view.
    Legacy,
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed classification response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseEnvelope {
    /// The service needs a human decision before it can continue.
    Escalation {
        metadata: HitlMetadata,
        state: OpaqueState,
    },
    /// The traversal reached a leaf.
    Terminal {
        outcome: FinalOutcome,
        format: ResultFormat,
        state: OpaqueState,
    },
}

impl ResponseEnvelope {
    /// The server state carried by either branch.
    pub fn state(&self) -> &OpaqueState {
        match self {
            Self::Escalation { state, .. } | Self::Terminal { state, .. } => state,
        }
    }

    pub fn is_escalation(&self) -> bool {
        matches!(self, Self::Escalation { .. })
    }

    pub fn hitl_metadata(&self) -> Option<&HitlMetadata> {
        match self {
            Self::Escalation { metadata, .. } => Some(metadata),
            Self::Terminal { .. } => None,
        }
    }

    pub fn final_outcome(&self) -> Option<&FinalOutcome> {
        match self {
            Self::Terminal { outcome, .. } => Some(outcome),
            Self::Escalation { .. } => None,
        }
    }

    /// Short branch name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Escalation { .. } => "escalation",
            Self::Terminal {
                format: ResultFormat::Formatted(_),
                ..
            } => "terminal_formatted",
            Self::Terminal {
                format: ResultFormat::Legacy,
                ..
            } => "terminal_legacy",
        }
    }
}
