//! Wire types mirroring the API's JSON schema.

mod activity;
mod session;
mod source;

pub use activity::{
    Activity, ActivityEvent, AmbiguousKind, Artifact, BashOutput, ChangeSet, GitPatch, Media,
    Payload, Plan, PlanStep,
};
pub use session::{PullRequest, Session, SessionOutput, SessionState};
pub use source::{GitHubBranch, GitHubRepo, GitHubRepoContext, Source, SourceContext};
