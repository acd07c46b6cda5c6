//! Page requests and token-following pagination.

use crate::error::{Error, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Deserializer};
use std::future::Future;

/// Paging parameters for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum items per page; `None` or zero lets the server decide.
    pub page_size: Option<u32>,
    /// Continuation token from a previous page.
    pub page_token: Option<String>,
}

impl PageRequest {
    pub fn new(page_size: Option<u32>, page_token: Option<String>) -> Self {
        Self {
            page_size,
            page_token,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Form-encoded query string, without the leading `?`.
    ///
    /// Empty when neither parameter carries a value.
    #[must_use]
    pub fn query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(size) = self.page_size.filter(|&s| s > 0) {
            query.append_pair("pageSize", &size.to_string());
        }
        if let Some(token) = self.page_token.as_deref().filter(|t| !t.is_empty()) {
            query.append_pair("pageToken", token);
        }
        query.finish()
    }

    /// `base` with the query string appended when there is one.
    #[must_use]
    pub fn apply(&self, base: &str) -> String {
        let query = self.query();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }
}

/// A decoded list response.
pub trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// Treat an empty continuation token the same as a missing one.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Stream every item across pages, following continuation tokens.
///
/// A failed page ends the stream with that error.
pub(crate) fn paginate<P, F, Fut>(
    page_size: Option<u32>,
    mut fetch: F,
) -> impl Stream<Item = Result<P::Item>>
where
    P: Page,
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    stream::try_unfold(Cursor::Start, move |cursor| {
        let pending = match cursor {
            Cursor::Start => Some(fetch(PageRequest::new(page_size, None))),
            Cursor::Next(token) => Some(fetch(PageRequest::new(page_size, Some(token)))),
            Cursor::Done => None,
        };
        async move {
            let Some(pending) = pending else {
                return Ok::<_, Error>(None);
            };
            let (items, token) = pending.await?.into_parts();
            let cursor = token.map_or(Cursor::Done, Cursor::Next);
            Ok(Some((items, cursor)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
}
