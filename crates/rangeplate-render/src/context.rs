//! Variables handed to the template engine.
//!
//! A [`Variables`] mapping is the fully merged view a template renders
//! against. Most entries are plain field values; computed functions sit next
//! to them so templates can call them like any other variable.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::Value;
use rangeplate_expand::FieldValue;

use crate::function::ComputedFunction;

/// One entry in a merged variable mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    /// A value taken from a scope, a record field or a sequence.
    Field(FieldValue),
    /// A callable computed function.
    Function(Arc<ComputedFunction>),
}

impl Variable {
    /// Converts the entry to a template value.
    pub fn to_value(&self) -> Value {
        match self {
            Variable::Field(FieldValue::Scalar(s)) => Value::from(s.as_str()),
            Variable::Field(FieldValue::List(items)) => Value::from(items.clone()),
            Variable::Field(FieldValue::Nested(json)) => Value::from_serialize(json),
            Variable::Function(func) => func.to_value(),
        }
    }

    /// Returns the scalar text, if this is a scalar field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variable::Field(field) => field.as_str(),
            Variable::Function(_) => None,
        }
    }
}

impl From<FieldValue> for Variable {
    fn from(value: FieldValue) -> Self {
        Variable::Field(value)
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable::Field(FieldValue::from(value))
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Variable::Field(FieldValue::Scalar(value))
    }
}

impl From<Arc<ComputedFunction>> for Variable {
    fn from(func: Arc<ComputedFunction>) -> Self {
        Variable::Function(func)
    }
}

/// Variable name to value, as seen by a template.
pub type Variables = BTreeMap<String, Variable>;

/// Builds the template context for a variable mapping.
pub fn to_context(variables: &Variables) -> Value {
    let map: BTreeMap<&str, Value> = variables
        .iter()
        .map(|(name, var)| (name.as_str(), var.to_value()))
        .collect();
    Value::from_serialize(&map)
}
