use crate::{
    catalog::Catalog,
    model::{EntityDescriptor, FieldDescriptor, RelationDescriptor, SqlType},
};

/// `Person` (self-referential nullable `manager`, required `department`) and
/// `Department`.
pub(crate) fn catalog() -> Catalog {
    let department = EntityDescriptor::builder("Department", "departments")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer).generated())
        .field(FieldDescriptor::new("name", SqlType::Text))
        .build()
        .expect("department descriptor");

    let person = EntityDescriptor::builder("Person", "people")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer).generated())
        .field(FieldDescriptor::new("firstname", SqlType::Text))
        .field(FieldDescriptor::new("age", SqlType::Integer).nullable())
        .field(FieldDescriptor::new("active", SqlType::Boolean))
        .relation(RelationDescriptor::many_to_one("manager", "Person").nullable())
        .relation(RelationDescriptor::many_to_one("department", "Department"))
        .build()
        .expect("person descriptor");

    Catalog::builder()
        .register(department)
        .and_then(|b| b.register(person))
        .and_then(crate::catalog::CatalogBuilder::build)
        .expect("fixture catalog")
}
