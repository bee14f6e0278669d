//! Indexer wire contract
//!
//! The response key is fixed as `docs` and every document carries a non-empty
//! `raw`; contract tests in the agent and the indexer both pin this shape.

use serde::{Deserialize, Serialize};

/// A normalized document: the original line under `raw` plus extracted fields
/// merged at the top level.
pub type Doc = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeRequest {
    pub profile: String,
    pub raw: RawLines,
}

/// A single string is split on newlines; each non-empty line produces one Doc.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLines {
    One(String),
    Many(Vec<String>),
}

impl RawLines {
    /// Flatten into the non-empty lines the indexer will normalize.
    pub fn into_lines(self) -> Vec<String> {
        let split = |s: String| {
            s.split('\n')
                .map(|line| line.trim_end_matches('\r').to_string())
                .filter(|line| !line.trim().is_empty())
                .collect::<Vec<_>>()
        };
        match self {
            RawLines::One(s) => split(s),
            RawLines::Many(items) => items.into_iter().flat_map(split).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeResponse {
    pub docs: Vec<Doc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_string_splits_on_newlines() {
        let raw = RawLines::One("a\nb\r\n\n  \nc".to_string());
        assert_eq!(raw.into_lines(), vec!["a", "b", "c"]);
    }

    #[test]
    fn array_input_keeps_one_line_per_entry() {
        let raw = RawLines::Many(vec!["a".into(), "".into(), "b".into()]);
        assert_eq!(raw.into_lines(), vec!["a", "b"]);
    }

    #[test]
    fn request_accepts_both_shapes() {
        let one: NormalizeRequest =
            serde_json::from_str(r#"{"profile":"json_auto","raw":"x"}"#).unwrap();
        assert!(matches!(one.raw, RawLines::One(_)));

        let many: NormalizeRequest =
            serde_json::from_str(r#"{"profile":"json_auto","raw":["x","y"]}"#).unwrap();
        assert!(matches!(many.raw, RawLines::Many(_)));
    }
}
