use derive_more::Display;

///
/// SqlType
///
/// Column type surface understood by the translator and the row mapper.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum SqlType {
    #[display("INTEGER")]
    Integer,
    #[display("TEXT")]
    Text,
    #[display("BOOLEAN")]
    Boolean,
    #[display("TIMESTAMP")]
    Timestamp,
}

///
/// FieldDescriptor
/// Scalar field metadata used by the builder, translator, and mapper.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    /// Field name as used in criteria operations.
    pub name: String,
    /// Column name in the entity table.
    pub column: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    /// Value is assigned by the store on insert (identity columns).
    pub generated: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        let column = super::default_column(&name);

        Self {
            name,
            column,
            sql_type,
            nullable: false,
            generated: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    #[must_use]
    pub const fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}
