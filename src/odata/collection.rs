use std::collections::VecDeque;

use futures::Stream;
use reqwest::Method;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::odata::entity::TrackedEntity;
use crate::odata::page::{Page, parse_page, resolve_link};
use crate::odata::schema::EntitySchema;
use crate::odata::transport::Transport;

/// Forward-only, lazily paged view over a server collection.
///
/// Items already buffered are yielded without network access; the next
/// page is requested only once the buffer runs dry. To start over, call
/// the originating list operation again.
pub struct PagedCollection {
    transport: Transport,
    schema: &'static EntitySchema,
    buffer: VecDeque<Value>,
    /// URL of the page that produced `next_link`; relative links resolve against it.
    page_url: String,
    next_link: Option<String>,
    pages_fetched: usize,
}

impl PagedCollection {
    pub(crate) fn new(
        transport: Transport,
        schema: &'static EntitySchema,
        first_url: String,
        first: Page,
    ) -> Self {
        Self {
            transport,
            schema,
            buffer: first.items.into(),
            page_url: first_url,
            next_link: first.next_link,
            pages_fetched: 0,
        }
    }

    /// Next entity in server order, or `None` once the final page is drained.
    ///
    /// A failed page fetch is returned as `Some(Err(_))` and keeps the
    /// continuation link, so calling `next` again retries that page.
    pub async fn next(&mut self) -> Option<Result<TrackedEntity>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(TrackedEntity::from_wire(self.schema, &item));
            }

            let link = self.next_link.as_deref()?;
            let url = match resolve_link(&self.page_url, link) {
                Ok(url) => url,
                Err(e) => return Some(Err(e)),
            };
            match self.fetch(&url).await {
                Ok(page) => {
                    self.pages_fetched += 1;
                    self.page_url = url;
                    self.buffer = page.items.into();
                    self.next_link = page.next_link;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Page> {
        log::debug!("Following continuation link for {}", self.schema.name);
        let resp = self.transport.send(Method::GET, url, None).await?;
        let body = resp
            .body
            .ok_or_else(|| Error::Decode("collection page had an empty body".to_string()))?;
        parse_page(body)
    }

    /// Follow-up page requests issued so far (the first page is not counted).
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// `true` while buffered items or a continuation link remain.
    pub fn has_more(&self) -> bool {
        !self.buffer.is_empty() || self.next_link.is_some()
    }

    /// The same sequence as a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<TrackedEntity>> + Send {
        futures::stream::unfold(self, |mut collection| async move {
            collection.next().await.map(|item| (item, collection))
        })
    }

    /// Drain every remaining page, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<TrackedEntity>> {
        let mut entities = Vec::with_capacity(self.buffer.len());
        while let Some(item) = self.next().await {
            entities.push(item?);
        }
        log::debug!(
            "Collected {} {} entities across {} follow-up pages",
            entities.len(),
            self.schema.name,
            self.pages_fetched
        );
        Ok(entities)
    }
}
