use crate::{
    error::InternalError,
    model::EntityDescriptor,
    value::{FromValue, Value},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// Link
///
/// State of one relation on a mapped record.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Link {
    /// Null foreign key, or a joined target row that was entirely null.
    Absent,
    /// Non-null foreign key whose target was not joined by the query.
    Deferred(Value),
    Loaded(Box<Record>),
}

impl Link {
    /// Key of the referenced entity, when one exists.
    #[must_use]
    pub fn key(&self) -> Option<&Value> {
        match self {
            Self::Absent => None,
            Self::Deferred(key) => Some(key),
            Self::Loaded(record) => record.id(),
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Loaded(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

///
/// Record
///
/// Dynamic, mapped row for one alias: scalar values by field name plus one
/// link per relation. Joined targets hang off their source as `Loaded` links.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    entity: Arc<EntityDescriptor>,
    values: BTreeMap<String, Value>,
    links: BTreeMap<String, Link>,
}

impl Record {
    pub(crate) const fn new(entity: Arc<EntityDescriptor>) -> Self {
        Self {
            entity,
            values: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    pub(crate) fn set_value(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    pub(crate) fn set_link(&mut self, relation: &str, link: Link) {
        self.links.insert(relation.to_string(), link);
    }

    #[must_use]
    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        self.entity.name()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.values
            .get(&self.entity.primary_key().name)
            .filter(|v| !v.is_null())
    }

    /// Typed read of a scalar field.
    pub fn get_as<T: FromValue>(&self, field: &str) -> Result<T, InternalError> {
        let value = self.values.get(field).ok_or_else(|| {
            InternalError::mapping_invariant(format!(
                "record for '{}' has no field '{field}'",
                self.entity.name()
            ))
        })?;

        T::from_value(value).ok_or_else(|| {
            InternalError::mapping_unsupported(format!(
                "field '{}.{field}' holds a {} value of the wrong type",
                self.entity.name(),
                value.kind_label()
            ))
        })
    }

    #[must_use]
    pub fn link(&self, relation: &str) -> Option<&Link> {
        self.links.get(relation)
    }

    /// Loaded target of a relation, if the query joined it and it was present.
    #[must_use]
    pub fn loaded(&self, relation: &str) -> Option<&Record> {
        self.links.get(relation).and_then(Link::record)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
