//! Session operations and completion polling.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::page::{Page, PageRequest, empty_as_none, paginate};
use crate::types::{GitHubRepoContext, Session, SourceContext};
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Poll interval used when the caller passes zero.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Simplified input for creating a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub prompt: String,
    /// Resource name of the source, e.g. `sources/github/owner/repo`.
    pub source: String,
    pub starting_branch: Option<String>,
}

impl CreateSessionRequest {
    pub fn new(prompt: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            source: source.into(),
            starting_branch: None,
        }
    }

    #[must_use]
    pub fn with_starting_branch(mut self, branch: impl Into<String>) -> Self {
        self.starting_branch = Some(branch.into());
        self
    }

    /// The session payload sent to the server.
    fn into_session(self) -> Session {
        let github_repo_context = self
            .starting_branch
            .filter(|b| !b.is_empty())
            .map(|starting_branch| GitHubRepoContext { starting_branch });

        Session {
            prompt: self.prompt,
            source_context: Some(SourceContext {
                source: self.source,
                github_repo_context,
            }),
            ..Session::default()
        }
    }
}

/// One page of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_page_token: Option<String>,
}

impl Page for SessionList {
    type Item = Session;

    fn into_parts(self) -> (Vec<Session>, Option<String>) {
        (self.sessions, self.next_page_token)
    }
}

#[derive(Serialize)]
struct ContinueBody<'a> {
    message: &'a str,
}

/// Session endpoints, borrowed from a [`Client`](crate::Client).
#[derive(Debug, Clone, Copy)]
pub struct Sessions<'a> {
    http: &'a HttpClient,
}

impl<'a> Sessions<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Start a new session. The returned session carries the server-assigned
    /// id and initial state.
    pub async fn create(&self, request: CreateSessionRequest) -> Result<Session> {
        let payload = request.into_session();
        let session: Session = self.http.post("/sessions", &payload).await?;
        info!(session = %session.id, state = %session.state, "created session");
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Result<Session> {
        self.http.get(&format!("/sessions/{id}")).await
    }

    pub async fn list(&self, page: &PageRequest) -> Result<SessionList> {
        self.http.get(&page.apply("/sessions")).await
    }

    /// Every session, following continuation tokens.
    pub fn stream(self, page_size: Option<u32>) -> impl Stream<Item = Result<Session>> + 'a {
        let http = self.http;
        paginate(page_size, move |page| async move {
            Sessions::new(http).list(&page).await
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Session>> {
        self.stream(None).try_collect().await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.http.delete(&format!("/sessions/{id}")).await
    }

    /// Send a user message to a session.
    pub async fn continue_session(&self, id: &str, message: &str) -> Result<()> {
        self.http
            .post_empty(&format!("/sessions/{id}:continue"), &ContinueBody { message })
            .await
    }

    /// Block until the session is completed or failed.
    ///
    /// The first fetch happens one interval after the call; a zero interval
    /// means [`DEFAULT_POLL_INTERVAL`]. Cancellation is honoured while waiting
    /// and while a fetch is in flight. Fetch errors end the wait.
    pub async fn wait_for_completion(
        &self,
        id: &str,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        let period = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                _ = ticker.tick() => {}
            }

            let session = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                result = self.get(id) => result?,
            };

            debug!(session = id, state = %session.state, "polled session");
            if session.is_terminal() {
                return Ok(session);
            }
        }
    }
}
