///
/// Cardinality
///
/// Owning-side relation shapes. Both are backed by a foreign-key column on
/// the source table, so joins, inserts and mapping treat them alike; the
/// shape is carried as descriptive metadata.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    ManyToOne,
    OneToOne,
}

///
/// RelationDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationDescriptor {
    pub name: String,
    /// Target entity name; resolved against the catalog at build time.
    pub target: String,
    pub cardinality: Cardinality,
    pub nullable: bool,
    /// Foreign-key column on the source table.
    pub fk_column: String,
}

impl RelationDescriptor {
    #[must_use]
    pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name.into(), target.into(), Cardinality::ManyToOne)
    }

    #[must_use]
    pub fn one_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name.into(), target.into(), Cardinality::OneToOne)
    }

    fn new(name: String, target: String, cardinality: Cardinality) -> Self {
        let fk_column = format!("{}_id", super::default_column(&name));

        Self {
            name,
            target,
            cardinality,
            nullable: false,
            fk_column,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn fk_column(mut self, column: impl Into<String>) -> Self {
        self.fk_column = column.into();
        self
    }
}
