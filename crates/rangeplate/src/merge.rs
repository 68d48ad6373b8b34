//! Variable merging for one expanded record.
//!
//! The variables a record renders with are layered, each layer overriding
//! the previous one on name collisions:
//!
//! 1. wildcard scope (variables for every target)
//! 2. the record's target scope
//! 3. the record's own fields
//! 4. values drawn from sequences the template reads
//! 5. computed functions
//!
//! A sequence is only advanced when the template reads its name and no
//! computed function shadows it.

use std::collections::BTreeSet;

use rangeplate_expand::Record;
use rangeplate_render::{Variable, Variables};

use crate::error::Result;
use crate::scope::{FunctionTable, ScopeTable, ScopeVars};
use crate::sequence::SequenceBank;

/// Which field and scope keys drive the merge.
#[derive(Debug, Clone, Copy)]
pub struct MergeKeys<'a> {
    /// Scope whose variables apply to every target.
    pub wildcard_scope: &'a str,
    /// Record field naming the target scope.
    pub target_field: &'a str,
}

/// The merged variables of one record plus the template names left unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub variables: Variables,
    pub unresolved: BTreeSet<String>,
}

/// Merges all variable layers for one record.
///
/// # Errors
///
/// Propagates [`Error::ExhaustedSequence`](crate::Error::ExhaustedSequence)
/// from the sequence bank.
pub fn merge(
    record: &Record,
    keys: MergeKeys<'_>,
    scopes: &ScopeTable,
    sequences: &mut SequenceBank,
    computed: &FunctionTable,
    template_vars: &BTreeSet<String>,
) -> Result<Merged> {
    let mut variables = Variables::new();

    if let Some(vars) = scopes.get(keys.wildcard_scope) {
        overlay_scope(&mut variables, vars);
    }

    if let Some(target) = record.get(keys.target_field).and_then(|v| v.as_str()) {
        if let Some(vars) = scopes.get(target) {
            overlay_scope(&mut variables, vars);
        }
    }

    for (name, value) in record.iter() {
        variables.insert(name.to_string(), Variable::Field(value.clone()));
    }

    for name in template_vars {
        if sequences.contains(name) && !computed.contains_key(name) {
            let value = sequences.consume(name)?;
            variables.insert(name.clone(), Variable::from(value));
        }
    }

    for (name, func) in computed {
        variables.insert(name.clone(), Variable::Function(func.clone()));
    }

    let unresolved = template_vars
        .iter()
        .filter(|name| !variables.contains_key(name.as_str()))
        .cloned()
        .collect();

    Ok(Merged {
        variables,
        unresolved,
    })
}

fn overlay_scope(variables: &mut Variables, scope: &ScopeVars) {
    for (name, value) in scope {
        variables.insert(name.clone(), Variable::from(value.as_str()));
    }
}
