//! Source listing.

use crate::error::Result;
use crate::http::HttpClient;
use crate::page::{Page, PageRequest, empty_as_none, paginate};
use crate::types::Source;
use futures::{Stream, TryStreamExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceList {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_page_token: Option<String>,
}

impl Page for SourceList {
    type Item = Source;

    fn into_parts(self) -> (Vec<Source>, Option<String>) {
        (self.sources, self.next_page_token)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    http: &'a HttpClient,
}

impl<'a> Sources<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, page: &PageRequest) -> Result<SourceList> {
        self.http.get(&page.apply("/sources")).await
    }

    pub fn stream(self, page_size: Option<u32>) -> impl Stream<Item = Result<Source>> + 'a {
        let http = self.http;
        paginate(page_size, move |page| async move {
            Sources::new(http).list(&page).await
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Source>> {
        self.stream(None).try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use crate::Client;
    use crate::page::PageRequest;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_sources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sources": [
                    {
                        "name": "sources/github/acme/widgets",
                        "id": "github/acme/widgets",
                        "githubRepo": {"owner": "acme", "repo": "widgets"}
                    },
                    {"name": "sources/github/acme/gadgets", "id": "github/acme/gadgets"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new("test-key").with_base_url(format!("{}/v1alpha", server.uri()));
        let page = client.sources().list(&PageRequest::default()).await.unwrap();

        assert_eq!(page.sources.len(), 2);
        assert_eq!(page.sources[0].full_name().as_deref(), Some("acme/widgets"));
        assert_eq!(page.sources[1].full_name(), None);
        assert!(page.next_page_token.is_none());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), None);
    }

    #[tokio::test]
    async fn test_list_sources_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .respond_with(ResponseTemplate::new(401).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = Client::new("bad").with_base_url(format!("{}/v1alpha", server.uri()));
        let err = client.sources().list_all().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("API key not valid"));
    }
}
