use crate::{db::query::QueryId, value::Value};
use std::collections::BTreeMap;

///
/// Arity
///
/// How many values a parameter accepts at bind time.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    /// Exactly one value.
    Single,
    /// Zero or more values; the count is fixed only when bound.
    Variable,
}

///
/// ParameterHandle
///
/// Opaque reference to a parameter declared on one query.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ParameterHandle {
    pub(crate) query: QueryId,
    pub(crate) index: usize,
}

impl ParameterHandle {
    /// Positional label (`?1`, `?2`, ...) used in diagnostics.
    #[must_use]
    pub fn label(self) -> String {
        format!("?{}", self.index + 1)
    }
}

///
/// Parameter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    pub handle: ParameterHandle,
    pub name: Option<String>,
    pub arity: Arity,
}

impl Parameter {
    /// Diagnostic label: `:name` for named parameters, `?n` otherwise.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| self.handle.label(), |name| format!(":{name}"))
    }
}

///
/// Bindings
///
/// Values bound to parameter handles. A query carries its own bindings; a
/// separate `Bindings` may be supplied at execution time, in which case the
/// executor re-checks every count against the translated placeholders.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bindings {
    values: BTreeMap<ParameterHandle, Vec<Value>>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind values without arity checks; replaces any previous binding.
    pub fn bind<I, V>(&mut self, handle: ParameterHandle, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values
            .insert(handle, values.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn get(&self, handle: ParameterHandle) -> Option<&[Value]> {
        self.values.get(&handle).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, handle: ParameterHandle) -> bool {
        self.values.contains_key(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
