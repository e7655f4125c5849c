//! Module: catalog
//! Responsibility: owned registry of entity descriptors.
//! Does not own: descriptor construction rules (see `model`).
//! Boundary: read-only after `CatalogBuilder::build`.

use crate::{db::query::QueryError, model::EntityDescriptor, traits::Entity};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;
use tracing::debug;

///
/// CatalogError
///
/// Registration-time failures. These are caller bugs in entity definitions,
/// reported once at startup.
///

#[remain::sorted]
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CatalogError {
    #[error("entity '{entity}' is registered twice")]
    DuplicateEntity { entity: String },

    #[error("entity '{entity}' declares '{member}' more than once")]
    DuplicateMember { entity: String, member: String },

    #[error("entity '{entity}': '{identifier}' is not a plain SQL identifier")]
    InvalidIdentifier { entity: String, identifier: String },

    #[error("entity '{entity}' has no primary key")]
    MissingPrimaryKey { entity: String },

    #[error("entity '{entity}': '{identifier}' is a reserved SQL keyword")]
    ReservedIdentifier { entity: String, identifier: String },

    #[error("relation '{entity}.{relation}' targets unregistered entity '{target}'")]
    UnknownRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },
}

///
/// Catalog
///
/// Entity registry consulted by the criteria builder. Descriptors are shared
/// by `Arc` so query trees can hold them without borrowing the catalog.
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entities: BTreeMap<String, Arc<EntityDescriptor>>,
}

impl Catalog {
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Look up an entity descriptor by name.
    pub fn describe(&self, entity: &str) -> Result<Arc<EntityDescriptor>, QueryError> {
        self.entities
            .get(entity)
            .cloned()
            .ok_or_else(|| QueryError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Registered entity names in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}

///
/// CatalogBuilder
///

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entities: BTreeMap<String, EntityDescriptor>,
}

impl CatalogBuilder {
    pub fn register(mut self, descriptor: EntityDescriptor) -> Result<Self, CatalogError> {
        let name = descriptor.name().to_string();
        if self.entities.contains_key(&name) {
            return Err(CatalogError::DuplicateEntity { entity: name });
        }

        self.entities.insert(name, descriptor);

        Ok(self)
    }

    pub fn register_entity<E: Entity>(self) -> Result<Self, CatalogError> {
        self.register(E::descriptor()?)
    }

    /// Freeze the registry; every relation target must be registered.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for entity in self.entities.values() {
            for relation in entity.relations() {
                if !self.entities.contains_key(&relation.target) {
                    return Err(CatalogError::UnknownRelationTarget {
                        entity: entity.name().to_string(),
                        relation: relation.name.clone(),
                        target: relation.target.clone(),
                    });
                }
            }
        }

        debug!(entities = self.entities.len(), "catalog built");

        Ok(Catalog {
            entities: self
                .entities
                .into_iter()
                .map(|(name, desc)| (name, Arc::new(desc)))
                .collect(),
        })
    }
}
