use serde::Deserialize;
use serde_json::Value;

/// A decoded upstream event. Only text deltas carry consumable text; every
/// other tag is valid and lands in `Other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    ContentBlockDelta {
        delta: BlockDelta,
    },
    Error {
        #[serde(default)]
        error: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    TextDelta {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ProviderEvent {
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// The plain-text fragment this event contributes, if any.
    pub fn into_fragment(self) -> Option<String> {
        match self {
            ProviderEvent::ContentBlockDelta {
                delta: BlockDelta::TextDelta { text },
            } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Extracts the text fragment from one `data:` payload.
///
/// Err means the payload was not a well-formed event; callers log and skip it.
pub fn extract_fragment(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let event = ProviderEvent::parse(payload)?;
    if let ProviderEvent::Error { error } = &event {
        tracing::warn!(%error, "upstream reported an error event");
    }
    Ok(event.into_fragment())
}
