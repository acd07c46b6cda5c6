//! Activity listing.

use crate::error::Result;
use crate::http::HttpClient;
use crate::page::{Page, PageRequest, empty_as_none, paginate};
use crate::types::Activity;
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};

/// One page of a session's activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityList {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_page_token: Option<String>,
}

impl Page for ActivityList {
    type Item = Activity;

    fn into_parts(self) -> (Vec<Activity>, Option<String>) {
        (self.activities, self.next_page_token)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Activities<'a> {
    http: &'a HttpClient,
}

impl<'a> Activities<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, session_id: &str, page: &PageRequest) -> Result<ActivityList> {
        let base = format!("/sessions/{session_id}/activities");
        self.http.get(&page.apply(&base)).await
    }

    /// Every activity of a session in server order, following continuation tokens.
    pub fn stream(
        self,
        session_id: String,
        page_size: Option<u32>,
    ) -> impl Stream<Item = Result<Activity>> + 'a {
        let http = self.http;
        paginate(page_size, move |page| {
            let session_id = session_id.clone();
            async move { Activities::new(http).list(&session_id, &page).await }
        })
    }

    pub async fn list_all(&self, session_id: &str) -> Result<Vec<Activity>> {
        self.stream(session_id.to_string(), None)
            .try_collect()
            .await
    }
}
