use crate::{
    catalog::CatalogError,
    model::{FieldDescriptor, RelationDescriptor, SqlType, is_identifier, is_reserved_word},
};
use std::collections::BTreeSet;

///
/// EntityDescriptor
///
/// Runtime description of one entity: its table, scalar fields (primary key
/// first), and owning-side relations. Constructed through
/// [`EntityDescriptor::builder`], which enforces member uniqueness.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityDescriptor {
    name: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            name: name.into(),
            table: table.into(),
            primary_key: None,
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary key field (always the first field).
    #[must_use]
    pub fn primary_key(&self) -> &FieldDescriptor {
        &self.fields[0]
    }

    /// Ordered scalar fields, primary key first.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolve a field or relation by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        self.field(name)
            .map(Member::Field)
            .or_else(|| self.relation(name).map(Member::Relation))
    }

    /// Every member in projection order: scalar fields, then relation keys.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.fields
            .iter()
            .map(Member::Field)
            .chain(self.relations.iter().map(Member::Relation))
    }
}

///
/// Member
///
/// Borrowed view of a field or relation. Relations are addressed through
/// their foreign-key column on the owning table.
///

#[derive(Clone, Copy, Debug)]
pub enum Member<'a> {
    Field(&'a FieldDescriptor),
    Relation(&'a RelationDescriptor),
}

impl<'a> Member<'a> {
    #[must_use]
    pub fn name(self) -> &'a str {
        match self {
            Self::Field(f) => &f.name,
            Self::Relation(r) => &r.name,
        }
    }

    #[must_use]
    pub fn column(self) -> &'a str {
        match self {
            Self::Field(f) => &f.column,
            Self::Relation(r) => &r.fk_column,
        }
    }

    /// Declared SQL type; relation keys carry the target's key type, which
    /// the mapper reads without coercion.
    #[must_use]
    pub const fn sql_type(self) -> Option<SqlType> {
        match self {
            Self::Field(f) => Some(f.sql_type),
            Self::Relation(_) => None,
        }
    }

    #[must_use]
    pub const fn is_relation(self) -> bool {
        matches!(self, Self::Relation(_))
    }

    #[must_use]
    pub const fn is_nullable(self) -> bool {
        match self {
            Self::Field(f) => f.nullable,
            Self::Relation(r) => r.nullable,
        }
    }

    /// Store-assigned on insert; a null value leaves the column out.
    #[must_use]
    pub const fn is_generated(self) -> bool {
        matches!(self, Self::Field(f) if f.generated)
    }
}

///
/// EntityDescriptorBuilder
///

#[derive(Debug)]
pub struct EntityDescriptorBuilder {
    name: String,
    table: String,
    primary_key: Option<FieldDescriptor>,
    fields: Vec<FieldDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl EntityDescriptorBuilder {
    #[must_use]
    pub fn primary_key(mut self, field: FieldDescriptor) -> Self {
        self.primary_key = Some(field);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn build(self) -> Result<EntityDescriptor, CatalogError> {
        let Self {
            name,
            table,
            primary_key,
            fields,
            relations,
        } = self;

        let primary_key = primary_key.ok_or_else(|| CatalogError::MissingPrimaryKey {
            entity: name.clone(),
        })?;

        let mut all_fields = Vec::with_capacity(fields.len() + 1);
        all_fields.push(primary_key);
        all_fields.extend(fields);

        check_identifier(&name, &table)?;

        let mut members = BTreeSet::new();
        let mut columns = BTreeSet::new();
        let member_columns = all_fields
            .iter()
            .map(|f| (f.name.as_str(), f.column.as_str()))
            .chain(relations.iter().map(|r| (r.name.as_str(), r.fk_column.as_str())));

        for (member, column) in member_columns {
            if !members.insert(member) {
                return Err(CatalogError::DuplicateMember {
                    entity: name.clone(),
                    member: member.to_string(),
                });
            }
            check_identifier(&name, column)?;
            if !columns.insert(column) {
                return Err(CatalogError::DuplicateMember {
                    entity: name.clone(),
                    member: column.to_string(),
                });
            }
        }

        Ok(EntityDescriptor {
            name,
            table,
            fields: all_fields,
            relations,
        })
    }
}

fn check_identifier(entity: &str, ident: &str) -> Result<(), CatalogError> {
    if !is_identifier(ident) {
        return Err(CatalogError::InvalidIdentifier {
            entity: entity.to_string(),
            identifier: ident.to_string(),
        });
    }
    if is_reserved_word(ident) {
        return Err(CatalogError::ReservedIdentifier {
            entity: entity.to_string(),
            identifier: ident.to_string(),
        });
    }

    Ok(())
}
