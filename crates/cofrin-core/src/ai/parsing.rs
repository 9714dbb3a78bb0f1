//! JSON parsing for AI insight responses
//!
//! Models rarely return the bare JSON array the prompt demands - responses
//! arrive with commentary, code fencing or truncation. This module extracts
//! the bracketed array, decodes it strictly, and degrades to a diagnostic
//! insight on any failure. It never raises past its own boundary.

use serde::Deserialize;
use tracing::warn;

use crate::insights::types::Insight;

/// Raw insight element as the model returns it
///
/// Unknown fields are ignored; missing required fields fail the element and,
/// with it, the whole array (the decode is all-or-nothing).
#[derive(Debug, Deserialize)]
struct RawInsight {
    title: String,
    description: String,
    #[serde(default)]
    recommendation: Option<String>,
}

impl From<RawInsight> for Insight {
    fn from(raw: RawInsight) -> Self {
        Insight {
            title: raw.title,
            description: raw.description,
            recommendation: raw.recommendation,
            category: Default::default(),
        }
    }
}

/// Parse a raw model response into insights
///
/// Locates the first `[` and last `]` (tolerating leading/trailing
/// commentary and ```json fencing) and decodes the bracketed substring as a
/// JSON array. The whole array fails together: one malformed element means
/// the fallback diagnostic insight, not a partial list.
///
/// Always returns at least one insight.
pub fn parse_insights(raw: Option<&str>) -> Vec<Insight> {
    let raw = match raw {
        Some(text) if !text.trim().is_empty() => text.trim(),
        _ => return vec![Insight::empty_response()],
    };

    let start = raw.find('[');
    let end = raw.rfind(']');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &raw[s..=e];
            match serde_json::from_str::<Vec<RawInsight>>(json_str) {
                Ok(items) if !items.is_empty() => items.into_iter().map(Into::into).collect(),
                Ok(_) => {
                    warn!("AI response decoded to an empty insight array");
                    vec![Insight::unparseable(raw)]
                }
                Err(e) => {
                    warn!(error = %e, "Invalid insight JSON from AI");
                    vec![Insight::unparseable(raw)]
                }
            }
        }
        _ => {
            warn!("No JSON array found in AI response");
            vec![Insight::unparseable(raw)]
        }
    }
}
