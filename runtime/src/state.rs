use serde::{Deserialize, Serialize};

/// Canonical container state, independent of the runtime's own vocabulary.
///
/// Always recomputed from a fresh inspection. `Error` is a valid answer,
/// not a failure: it means the runtime reported something we do not map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Running,
    Stopped,
    NotExists,
    Error,
}

impl State {
    /// Maps a raw `State` token, or the absence of any record, to a
    /// canonical state. Matching is case-sensitive.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => State::NotExists,
            Some("RUNNING") => State::Running,
            Some("STOPPED") => State::Stopped,
            Some(_) => State::Error,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Running => write!(f, "RUNNING"),
            State::Stopped => write!(f, "STOPPED"),
            State::NotExists => write!(f, "NOT_EXISTS"),
            State::Error => write!(f, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tokens() {
        assert_eq!(State::from_raw(Some("RUNNING")), State::Running);
        assert_eq!(State::from_raw(Some("STOPPED")), State::Stopped);
        assert_eq!(State::from_raw(None), State::NotExists);
    }

    #[test]
    fn test_unknown_tokens_are_error() {
        for raw in ["FROZEN", "STARTING", "running", "", "NOT_EXISTS"] {
            assert_eq!(State::from_raw(Some(raw)), State::Error, "token {raw:?}");
        }
    }

    #[test]
    fn test_serialized_form_matches_display() {
        let json = serde_json::to_string(&State::NotExists).unwrap();
        assert_eq!(json, "\"NOT_EXISTS\"");
        assert_eq!(State::NotExists.to_string(), "NOT_EXISTS");
    }
}
