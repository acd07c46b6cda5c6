//! Session types.

use super::source::SourceContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a session.
///
/// Any value outside these nine fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED")]
    Unspecified,
    Queued,
    Planning,
    AwaitingPlanApproval,
    AwaitingUserFeedback,
    InProgress,
    Paused,
    Failed,
    Completed,
}

impl SessionState {
    pub const ALL: [Self; 9] = [
        Self::Unspecified,
        Self::Queued,
        Self::Planning,
        Self::AwaitingPlanApproval,
        Self::AwaitingUserFeedback,
        Self::InProgress,
        Self::Paused,
        Self::Failed,
        Self::Completed,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "STATE_UNSPECIFIED",
            Self::Queued => "QUEUED",
            Self::Planning => "PLANNING",
            Self::AwaitingPlanApproval => "AWAITING_PLAN_APPROVAL",
            Self::AwaitingUserFeedback => "AWAITING_USER_FEEDBACK",
            Self::InProgress => "IN_PROGRESS",
            Self::Paused => "PAUSED",
            Self::Failed => "FAILED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Completed and failed sessions never change state again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
    fn is_unspecified(&self) -> bool {
        *self == Self::Unspecified
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous unit of work within the same context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Fully qualified resource name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_plan_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "SessionState::is_unspecified")]
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<SessionOutput>,
}

impl Session {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Creation time, when the server sent a valid RFC 3339 timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time.as_deref().and_then(parse_timestamp)
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_time.as_deref().and_then(parse_timestamp)
    }

    pub fn pull_requests(&self) -> impl Iterator<Item = &PullRequest> {
        self.outputs.iter().filter_map(|o| o.pull_request.as_ref())
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::source::GitHubRepoContext;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Session {
        Session {
            name: "projects/p/locations/l/sessions/s".into(),
            id: "s".into(),
            prompt: "fix bug".into(),
            source_context: Some(SourceContext {
                source: "sources/github/my-repo".into(),
                github_repo_context: Some(GitHubRepoContext {
                    starting_branch: "main".into(),
                }),
            }),
            title: "Fix the bug".into(),
            require_plan_approval: true,
            create_time: Some("2025-10-01T12:00:00Z".into()),
            update_time: Some("2025-10-01T12:30:00.5Z".into()),
            state: SessionState::InProgress,
            url: Some("https://jules.google.com/session/s".into()),
            outputs: vec![SessionOutput {
                pull_request: Some(PullRequest {
                    url: "https://github.com/owner/repo/pull/1".into(),
                    title: "Fix bug".into(),
                    description: String::new(),
                }),
            }],
        }
    }

    #[test]
    fn test_session_round_trip() {
        let session = sample();
        let data = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&data).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_session_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["sourceContext"]["githubRepoContext"]["startingBranch"], "main");
        assert_eq!(value["requirePlanApproval"], true);
        assert_eq!(value["state"], "IN_PROGRESS");
        assert_eq!(value["outputs"][0]["pullRequest"]["title"], "Fix bug");
        assert!(value["outputs"][0]["pullRequest"].get("description").is_none());
    }

    #[test]
    fn test_sparse_session_omits_defaults() {
        let session = Session {
            prompt: "p".into(),
            ..Session::default()
        };
        assert_eq!(serde_json::to_value(&session).unwrap(), json!({"prompt": "p"}));

        let decoded: Session = serde_json::from_value(json!({})).unwrap();
        assert_eq!(decoded.state, SessionState::Unspecified);
        assert!(decoded.outputs.is_empty());
    }

    #[test]
    fn test_state_wire_values() {
        for state in SessionState::ALL {
            let encoded = serde_json::to_value(state).unwrap();
            assert_eq!(encoded, json!(state.as_str()));
            let decoded: SessionState = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, state);
        }
    }

    #[test]
    fn test_unknown_state_rejected() {
        let result = serde_json::from_value::<Session>(json!({"state": "EXPLODED"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = SessionState::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![SessionState::Failed, SessionState::Completed]);
    }

    #[test]
    fn test_timestamps() {
        let session = sample();
        assert_eq!(
            session.created_at(),
            Some(Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap())
        );
        assert!(session.updated_at().is_some());

        let garbled = Session {
            create_time: Some("yesterday".into()),
            ..Session::default()
        };
        assert_eq!(garbled.created_at(), None);
    }

    #[test]
    fn test_pull_requests() {
        let mut session = sample();
        session.outputs.push(SessionOutput::default());
        let urls: Vec<_> = session.pull_requests().map(|pr| pr.url.as_str()).collect();
        assert_eq!(urls, vec!["https://github.com/owner/repo/pull/1"]);
    }
}
