use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::auth::token::CredentialProvider;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::odata::action::ActionResult;
use crate::odata::collection::PagedCollection;
use crate::odata::entity::TrackedEntity;
use crate::odata::page::parse_page;
use crate::odata::schema::EntitySchema;
use crate::odata::transport::Transport;

const PREFER_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Facade exposing list / create / read / update / delete / action calls
/// against entity collections.
///
/// Holds no entity state between calls; a single instance can be shared by
/// concurrent tasks.
#[derive(Clone)]
pub struct ServiceClient {
    transport: Transport,
}

impl ServiceClient {
    /// Create a new client for the configured service root.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config, credentials)?,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `collection/{id}` with the key percent-encoded.
    pub fn entity_path(collection_path: &str, id: &str) -> String {
        format!(
            "{}/{}",
            collection_path.trim_end_matches('/'),
            urlencoding::encode(id)
        )
    }

    /// Fetch the first page of a collection and return a lazy view over all pages.
    pub async fn list(
        &self,
        collection_path: &str,
        schema: &'static EntitySchema,
    ) -> Result<PagedCollection> {
        let url = self.transport.url_for(collection_path);
        let resp = self.transport.send(Method::GET, &url, None).await?;
        let body = resp.body.ok_or_else(|| {
            Error::Decode(format!("{collection_path} returned an empty collection body"))
        })?;
        let first = parse_page(body)?;
        Ok(PagedCollection::new(self.transport.clone(), schema, url, first))
    }

    /// POST the entity's dirty fields and merge the server representation
    /// (including the assigned key) back into it.
    ///
    /// On failure the entity, dirty set included, is left as it was.
    pub async fn create(&self, collection_path: &str, entity: &mut TrackedEntity) -> Result<()> {
        let payload = Value::Object(entity.serialize_partial());
        log::info!(
            "Creating {} in {} with fields {:?}",
            entity.schema().name,
            collection_path,
            entity.dirty_fields()
        );

        let resp = self
            .transport
            .send_with_headers(
                Method::POST,
                collection_path,
                Some(&payload),
                &[PREFER_REPRESENTATION],
            )
            .await?;

        let body = resp.body.ok_or_else(|| {
            Error::Decode(format!("create in {collection_path} returned no entity"))
        })?;
        let key_wire = entity.schema().key.wire;
        if entity.id().is_none() && body.get(key_wire).is_none_or(Value::is_null) {
            return Err(Error::Decode(format!(
                "create in {collection_path} returned no '{key_wire}'"
            )));
        }

        entity.merge_server(&body)?;
        log::info!(
            "Created {} {}",
            entity.schema().name,
            entity.id().unwrap_or_default()
        );
        Ok(())
    }

    /// GET a single entity. A 404 becomes [`Error::NotFound`].
    pub async fn get_by_key(
        &self,
        collection_path: &str,
        schema: &'static EntitySchema,
        id: &str,
    ) -> Result<TrackedEntity> {
        let path = Self::entity_path(collection_path, id);
        let resp = self
            .transport
            .send(Method::GET, &path, None)
            .await
            .map_err(|e| e.not_found_for(&path))?;
        let body = resp
            .body
            .ok_or_else(|| Error::Decode(format!("{path} returned an empty body")))?;
        TrackedEntity::from_wire(schema, &body)
    }

    /// PATCH the entity's dirty fields. Nothing is sent when none are dirty.
    pub async fn update(&self, entity_path: &str, entity: &mut TrackedEntity) -> Result<()> {
        if !entity.is_dirty() {
            log::debug!("{} has no changes, skipping update", entity_path);
            return Ok(());
        }

        let payload = Value::Object(entity.serialize_partial());
        let resp = self
            .transport
            .send(Method::PATCH, entity_path, Some(&payload))
            .await
            .map_err(|e| e.not_found_for(entity_path))?;

        match resp.body {
            Some(body) => entity.merge_server(&body)?,
            None => entity.mark_clean(),
        }
        Ok(())
    }

    /// DELETE a single entity. A 404 becomes [`Error::NotFound`].
    pub async fn delete(&self, entity_path: &str) -> Result<()> {
        self.transport
            .send(Method::DELETE, entity_path, None)
            .await
            .map_err(|e| e.not_found_for(entity_path))?;
        Ok(())
    }

    /// POST to `entity_path/action_name`.
    pub async fn invoke_action(
        &self,
        entity_path: &str,
        action_name: &str,
        body: Option<&Value>,
    ) -> Result<ActionResult> {
        let path = format!("{}/{}", entity_path.trim_end_matches('/'), action_name);
        log::info!("Invoking {}", path);
        let resp = self
            .transport
            .send(Method::POST, &path, body)
            .await
            .map_err(|e| e.not_found_for(&path))?;
        Ok(ActionResult::from_body(resp.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_path_encodes_the_key() {
        assert_eq!(
            ServiceClient::entity_path("solutions/bookingBusinesses/", "Contoso@contoso.com"),
            "solutions/bookingBusinesses/Contoso%40contoso.com"
        );
    }
}
