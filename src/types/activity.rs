//! Activity, artifact and plan types.
//!
//! The API marks the kind of an activity (and of an artifact) by which
//! payload field is present rather than by an explicit tag. Both are decoded
//! into enums here; a value carrying more than one known kind is rejected.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Loosely typed event payload.
pub type Payload = Map<String, Value>;

/// A value carried more than one mutually exclusive kind field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{owner} carries multiple kinds: {}", .kinds.join(", "))]
pub struct AmbiguousKind {
    pub owner: &'static str,
    pub kinds: Vec<&'static str>,
}

/// Drop entries that would collide with declared wire fields when an
/// `Unknown` payload is flattened back out.
fn without_reserved(mut payload: Payload, reserved: &[&str]) -> Payload {
    payload.retain(|key, _| !reserved.contains(&key.as_str()));
    payload
}

/// A proposed sequence of steps for completing a session's task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PlanStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub index: u32,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPatch {
    /// Unified diff.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unidiff_patch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_commit_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suggested_commit_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_patch: Option<GitPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Base64 encoded content.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
}

impl Media {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BashOutput {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output: String,
    #[serde(default)]
    pub exit_code: i32,
}

/// A single unit of data produced by an activity step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArtifactWire", into = "ArtifactWire")]
pub enum Artifact {
    ChangeSet(ChangeSet),
    Media(Media),
    BashOutput(BashOutput),
    /// None of the known fields were present; holds whatever was.
    /// Keys naming a known kind are dropped on serialization.
    Unknown(Payload),
}

const ARTIFACT_KINDS: [&str; 3] = ["changeSet", "media", "bashOutput"];

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change_set: Option<ChangeSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bash_output: Option<BashOutput>,
    #[serde(flatten)]
    extra: Payload,
}

impl TryFrom<ArtifactWire> for Artifact {
    type Error = AmbiguousKind;

    fn try_from(wire: ArtifactWire) -> Result<Self, Self::Error> {
        let mut kinds = Vec::new();
        if wire.change_set.is_some() {
            kinds.push("changeSet");
        }
        if wire.media.is_some() {
            kinds.push("media");
        }
        if wire.bash_output.is_some() {
            kinds.push("bashOutput");
        }
        if kinds.len() > 1 {
            return Err(AmbiguousKind {
                owner: "artifact",
                kinds,
            });
        }

        Ok(match (wire.change_set, wire.media, wire.bash_output) {
            (Some(change_set), _, _) => Self::ChangeSet(change_set),
            (_, Some(media), _) => Self::Media(media),
            (_, _, Some(bash)) => Self::BashOutput(bash),
            (None, None, None) => Self::Unknown(wire.extra),
        })
    }
}

impl From<Artifact> for ArtifactWire {
    fn from(artifact: Artifact) -> Self {
        match artifact {
            Artifact::ChangeSet(change_set) => Self {
                change_set: Some(change_set),
                ..Self::default()
            },
            Artifact::Media(media) => Self {
                media: Some(media),
                ..Self::default()
            },
            Artifact::BashOutput(bash) => Self {
                bash_output: Some(bash),
                ..Self::default()
            },
            Artifact::Unknown(extra) => Self {
                extra: without_reserved(extra, &ARTIFACT_KINDS),
                ..Self::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// What happened in an activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    AgentMessaged(Payload),
    UserMessaged(Payload),
    PlanGenerated(Payload),
    PlanApproved(Payload),
    ProgressUpdated(Payload),
    SessionCompleted(Payload),
    SessionFailed(Payload),
    /// No known event field was present. Holds any unrecognized fields;
    /// keys that name an event kind or an activity field are dropped on
    /// serialization.
    Unknown(Payload),
}

impl Default for ActivityEvent {
    fn default() -> Self {
        Self::Unknown(Payload::new())
    }
}

impl ActivityEvent {
    /// Wire name of the event field, `unknown` for unrecognized events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentMessaged(_) => "agentMessaged",
            Self::UserMessaged(_) => "userMessaged",
            Self::PlanGenerated(_) => "planGenerated",
            Self::PlanApproved(_) => "planApproved",
            Self::ProgressUpdated(_) => "progressUpdated",
            Self::SessionCompleted(_) => "sessionCompleted",
            Self::SessionFailed(_) => "sessionFailed",
            Self::Unknown(_) => "unknown",
        }
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        match self {
            Self::AgentMessaged(p)
            | Self::UserMessaged(p)
            | Self::PlanGenerated(p)
            | Self::PlanApproved(p)
            | Self::ProgressUpdated(p)
            | Self::SessionCompleted(p)
            | Self::SessionFailed(p)
            | Self::Unknown(p) => p,
        }
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.payload().get(key).and_then(Value::as_str)
    }

    /// Message text of an agent or user message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::AgentMessaged(_) => self.text("agentMessage"),
            Self::UserMessaged(_) => self.text("userMessage"),
            _ => None,
        }
    }

    /// The generated plan, if the payload holds one in the expected shape.
    #[must_use]
    pub fn plan(&self) -> Option<Plan> {
        match self {
            Self::PlanGenerated(p) => p
                .get("plan")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            _ => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::SessionFailed(_) => self.text("reason"),
            _ => None,
        }
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::AgentMessaged(_) | Self::UserMessaged(_) => {
                self.message().unwrap_or_default().to_string()
            }
            Self::PlanGenerated(_) => match self.plan() {
                Some(plan) => format!("plan with {} steps", plan.steps.len()),
                None => "plan generated".to_string(),
            },
            Self::PlanApproved(_) => match self.text("planId") {
                Some(id) => format!("plan {id} approved"),
                None => "plan approved".to_string(),
            },
            Self::ProgressUpdated(_) => self.text("title").unwrap_or_default().to_string(),
            Self::SessionCompleted(_) => "session completed".to_string(),
            Self::SessionFailed(_) => match self.failure_reason() {
                Some(reason) => format!("session failed: {reason}"),
                None => "session failed".to_string(),
            },
            Self::Unknown(_) => String::new(),
        }
    }
}

/// A single unit of work within a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActivityWire", into = "ActivityWire")]
pub struct Activity {
    pub name: String,
    pub id: String,
    pub description: String,
    pub create_time: Option<String>,
    /// Who produced the activity, e.g. `agent` or `user`.
    pub originator: String,
    pub artifacts: Vec<Artifact>,
    pub event: ActivityEvent,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    create_time: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    originator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_messaged: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_messaged: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plan_generated: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plan_approved: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    progress_updated: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_completed: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_failed: Option<Payload>,
    #[serde(flatten)]
    extra: Payload,
}

type EventCtor = fn(Payload) -> ActivityEvent;

/// Declared `ActivityWire` keys that an `Unknown` payload must not shadow.
const ACTIVITY_KEYS: [&str; 13] = [
    "name",
    "id",
    "description",
    "createTime",
    "originator",
    "artifacts",
    "agentMessaged",
    "userMessaged",
    "planGenerated",
    "planApproved",
    "progressUpdated",
    "sessionCompleted",
    "sessionFailed",
];

impl TryFrom<ActivityWire> for Activity {
    type Error = AmbiguousKind;

    fn try_from(wire: ActivityWire) -> Result<Self, Self::Error> {
        let candidates: [(&'static str, Option<Payload>, EventCtor); 7] = [
            ("agentMessaged", wire.agent_messaged, ActivityEvent::AgentMessaged),
            ("userMessaged", wire.user_messaged, ActivityEvent::UserMessaged),
            ("planGenerated", wire.plan_generated, ActivityEvent::PlanGenerated),
            ("planApproved", wire.plan_approved, ActivityEvent::PlanApproved),
            ("progressUpdated", wire.progress_updated, ActivityEvent::ProgressUpdated),
            ("sessionCompleted", wire.session_completed, ActivityEvent::SessionCompleted),
            ("sessionFailed", wire.session_failed, ActivityEvent::SessionFailed),
        ];

        let mut present: Vec<_> = candidates
            .into_iter()
            .filter_map(|(kind, payload, ctor)| payload.map(|p| (kind, ctor(p))))
            .collect();

        let event = match present.len() {
            0 => ActivityEvent::Unknown(wire.extra),
            1 => {
                if !wire.extra.is_empty() {
                    tracing::debug!(
                        activity = %wire.id,
                        fields = ?wire.extra.keys().collect::<Vec<_>>(),
                        "ignoring unrecognized activity fields"
                    );
                }
                present.remove(0).1
            }
            _ => {
                return Err(AmbiguousKind {
                    owner: "activity",
                    kinds: present.into_iter().map(|(kind, _)| kind).collect(),
                });
            }
        };

        Ok(Self {
            name: wire.name,
            id: wire.id,
            description: wire.description,
            create_time: wire.create_time,
            originator: wire.originator,
            artifacts: wire.artifacts,
            event,
        })
    }
}

impl From<Activity> for ActivityWire {
    fn from(activity: Activity) -> Self {
        let mut wire = Self {
            name: activity.name,
            id: activity.id,
            description: activity.description,
            create_time: activity.create_time,
            originator: activity.originator,
            artifacts: activity.artifacts,
            ..Self::default()
        };
        match activity.event {
            ActivityEvent::AgentMessaged(p) => wire.agent_messaged = Some(p),
            ActivityEvent::UserMessaged(p) => wire.user_messaged = Some(p),
            ActivityEvent::PlanGenerated(p) => wire.plan_generated = Some(p),
            ActivityEvent::PlanApproved(p) => wire.plan_approved = Some(p),
            ActivityEvent::ProgressUpdated(p) => wire.progress_updated = Some(p),
            ActivityEvent::SessionCompleted(p) => wire.session_completed = Some(p),
            ActivityEvent::SessionFailed(p) => wire.session_failed = Some(p),
            ActivityEvent::Unknown(p) => wire.extra = without_reserved(p, &ACTIVITY_KEYS),
        }
        wire
    }
}
