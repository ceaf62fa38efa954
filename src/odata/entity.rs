use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::odata::schema::EntitySchema;

/// An entity record that remembers which fields the caller assigned.
///
/// Only dirty fields are serialized for create/update, so a field set to
/// its zero value is sent while an untouched field is not. The dirty set
/// is cleared only after a successful save.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    schema: &'static EntitySchema,
    id: Option<String>,
    values: BTreeMap<&'static str, Value>,
    dirty: BTreeSet<&'static str>,
}

impl TrackedEntity {
    /// A new entity with every field unset.
    pub fn new_tracked(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            id: None,
            values: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// A clean entity populated from a server payload.
    pub fn from_wire(schema: &'static EntitySchema, json: &Value) -> Result<Self> {
        let mut entity = Self::new_tracked(schema);
        entity.merge_server(json)?;
        Ok(entity)
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Server-assigned key, once known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assigns `value` to `field` and marks it dirty.
    ///
    /// Fails with [`Error::Schema`] for unknown or read-only fields, leaving
    /// the entity untouched.
    pub fn set<T: Serialize>(&mut self, field: &str, value: T) -> Result<&mut Self> {
        let def = self.schema.settable(field).ok_or_else(|| Error::Schema {
            entity: self.schema.name,
            field: field.to_string(),
        })?;
        let value = serde_json::to_value(value).map_err(|e| {
            Error::Decode(format!("cannot serialize {}.{field}: {e}", self.schema.name))
        })?;
        self.values.insert(def.name, value);
        self.dirty.insert(def.name);
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Deserializes a field value. `Ok(None)` when the field is unset.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>> {
        match self.values.get(field) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::Decode(format!("{}.{field}: {e}", self.schema.name))),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty field names in schema order.
    pub fn dirty_fields(&self) -> Vec<&'static str> {
        self.schema
            .fields
            .iter()
            .filter(|def| self.dirty.contains(def.name))
            .map(|def| def.name)
            .collect()
    }

    /// Body for create/update: exactly the dirty fields, keyed by wire name.
    pub fn serialize_partial(&self) -> Map<String, Value> {
        let mut body = Map::new();
        for def in self.schema.fields {
            if !self.dirty.contains(def.name) {
                continue;
            }
            if let Some(value) = self.values.get(def.name) {
                body.insert(def.wire.to_string(), value.clone());
            }
        }
        body
    }

    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// Merges a server representation and clears the dirty set.
    ///
    /// Wire keys outside the schema (such as `@odata.*` annotations) are
    /// ignored. An already assigned key is never replaced.
    pub fn merge_server(&mut self, json: &Value) -> Result<()> {
        let record = json.as_object().ok_or_else(|| {
            Error::Decode(format!("expected a {} object, got {json}", self.schema.name))
        })?;

        if let Some(key) = record.get(self.schema.key.wire).and_then(key_to_string) {
            match &self.id {
                None => self.id = Some(key),
                Some(existing) if *existing != key => log::warn!(
                    "Ignoring server key {} for {} already identified as {}",
                    key,
                    self.schema.name,
                    existing
                ),
                Some(_) => {}
            }
        }

        for (wire, value) in record {
            if let Some(def) = self.schema.field_by_wire(wire) {
                self.values.insert(def.name, value.clone());
            }
        }

        self.mark_clean();
        Ok(())
    }
}

fn key_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
