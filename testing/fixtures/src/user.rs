use critql_core::{
    catalog::CatalogError,
    db::{Link, Record},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{EntityDescriptor, FieldDescriptor, RelationDescriptor, SqlType},
    traits::Entity,
    value::Value,
};
use time::OffsetDateTime;

///
/// User
///
/// Regression entity with a nullable self-referencing `manager`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    id: Option<i64>,
    firstname: String,
    lastname: String,
    email_address: String,
    age: i32,
    active: bool,
    created_at: OffsetDateTime,
    manager: Option<Box<User>>,
    manager_id: Option<i64>,
}

impl User {
    /// New active user, age 0, created now.
    #[must_use]
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            firstname: firstname.into(),
            lastname: lastname.into(),
            email_address: email_address.into(),
            age: 0,
            active: true,
            created_at: OffsetDateTime::now_utc(),
            manager: None,
            manager_id: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    #[must_use]
    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    #[must_use]
    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    #[must_use]
    pub const fn age(&self) -> i32 {
        self.age
    }

    pub const fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub const fn set_created_at(&mut self, created_at: OffsetDateTime) {
        self.created_at = created_at;
    }

    /// Loaded manager, when the query joined it.
    #[must_use]
    pub fn manager(&self) -> Option<&Self> {
        self.manager.as_deref()
    }

    #[must_use]
    pub const fn manager_id(&self) -> Option<i64> {
        self.manager_id
    }

    pub fn set_manager(&mut self, manager: Option<&Self>) {
        self.manager_id = manager.and_then(|m| m.id);
        self.manager = manager.map(|m| Box::new(m.clone()));
    }
}

impl Entity for User {
    const ENTITY_NAME: &'static str = "User";

    fn descriptor() -> Result<EntityDescriptor, CatalogError> {
        EntityDescriptor::builder(Self::ENTITY_NAME, "users")
            .primary_key(FieldDescriptor::new("id", SqlType::Integer).generated())
            .field(FieldDescriptor::new("firstname", SqlType::Text))
            .field(FieldDescriptor::new("lastname", SqlType::Text))
            .field(FieldDescriptor::new("emailAddress", SqlType::Text))
            .field(FieldDescriptor::new("age", SqlType::Integer))
            .field(FieldDescriptor::new("active", SqlType::Boolean))
            .field(FieldDescriptor::new("createdAt", SqlType::Timestamp))
            .relation(RelationDescriptor::many_to_one("manager", Self::ENTITY_NAME).nullable())
            .build()
    }

    fn id(&self) -> Option<Value> {
        self.id.map(Value::Int)
    }

    fn set_id(&mut self, id: Value) -> Result<(), InternalError> {
        let id = id.as_i64().ok_or_else(|| {
            InternalError::new(
                ErrorClass::Unsupported,
                ErrorOrigin::Mapping,
                format!("user identity must be an integer, got {id}"),
            )
        })?;
        self.id = Some(id);

        Ok(())
    }

    fn values(&self) -> Result<Vec<(&'static str, Value)>, InternalError> {
        let manager = match &self.manager {
            Some(manager) => Some(
                manager
                    .id
                    .ok_or_else(|| InternalError::unpersisted_link(Self::ENTITY_NAME, "manager"))?,
            ),
            None => self.manager_id,
        };

        Ok(vec![
            ("id", self.id.into()),
            ("firstname", self.firstname.clone().into()),
            ("lastname", self.lastname.clone().into()),
            ("emailAddress", self.email_address.clone().into()),
            ("age", self.age.into()),
            ("active", self.active.into()),
            ("createdAt", self.created_at.into()),
            ("manager", manager.into()),
        ])
    }

    fn from_record(record: &Record) -> Result<Self, InternalError> {
        let manager = record
            .loaded("manager")
            .map(Self::from_record)
            .transpose()?
            .map(Box::new);
        let manager_id = record
            .link("manager")
            .and_then(Link::key)
            .and_then(Value::as_i64);

        Ok(Self {
            id: Some(record.get_as("id")?),
            firstname: record.get_as("firstname")?,
            lastname: record.get_as("lastname")?,
            email_address: record.get_as("emailAddress")?,
            age: record.get_as("age")?,
            active: record.get_as("active")?,
            created_at: record.get_as("createdAt")?,
            manager,
            manager_id,
        })
    }
}
