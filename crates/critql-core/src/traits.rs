use crate::{
    catalog::CatalogError, db::Record, error::InternalError, model::EntityDescriptor, value::Value,
};

///
/// Entity
///
/// Contract between a user type and the runtime.
///
/// ## Semantics
/// - `ENTITY_NAME` is the catalog key; it must equal `descriptor().name()`
/// - `values` yields one entry per member to persist, relations by their key;
///   a relation set to a target without an identity is an error, never a null
/// - `from_record` maps a loaded record (and any loaded links) back into `Self`
///

pub trait Entity: Sized {
    const ENTITY_NAME: &'static str;

    fn descriptor() -> Result<EntityDescriptor, CatalogError>;

    /// Store-assigned identity, once persisted.
    fn id(&self) -> Option<Value>;

    fn set_id(&mut self, id: Value) -> Result<(), InternalError>;

    /// Member values keyed by member name. A generated primary key may be
    /// omitted or `Value::Null` before the first persist.
    fn values(&self) -> Result<Vec<(&'static str, Value)>, InternalError>;

    fn from_record(record: &Record) -> Result<Self, InternalError>;
}
