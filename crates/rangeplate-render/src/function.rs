//! Computed functions declared in input data.
//!
//! A function row in the global sheet carries a small definition:
//!
//! ```text
//! def vlan_name(id, site): "vlan-" ~ site ~ "-" ~ id
//! ```
//!
//! The body is an expression in the template engine's own expression
//! language, so it runs inside the engine's sandbox with access to its
//! filters and tests but nothing else. No code from the input is executed
//! by the host.
//!
//! At render time a [`ComputedFunction`] is exposed to templates as a
//! callable variable: `{{ vlan_name(vlan, "ams") }}`.

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{Environment, Error, ErrorKind, Value};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FunctionError;

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)\s*:\s*(.*)$")
        .expect("function definition pattern is valid")
});

// Shared by every function; bodies only read their own parameters.
static EXPRESSIONS: Lazy<Environment<'static>> = Lazy::new(Environment::new);

/// A named function compiled from a definition string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedFunction {
    name: String,
    declared_name: String,
    params: Vec<String>,
    body: String,
}

impl ComputedFunction {
    /// Parses and compiles a definition registered under `name`.
    ///
    /// The name written after `def` may differ from `name`; the function is
    /// still registered under `name` and [`name_mismatch`](Self::name_mismatch)
    /// reports the difference.
    pub fn parse(name: &str, definition: &str) -> Result<Self, FunctionError> {
        let caps = DEFINITION
            .captures(definition)
            .ok_or_else(|| FunctionError::MissingDefinition {
                name: name.to_string(),
            })?;

        let declared_name = caps[1].to_string();
        let params = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let mut body = caps[3].trim();
        if let Some(rest) = body.strip_prefix("return") {
            if rest.starts_with(char::is_whitespace) {
                body = rest.trim();
            }
        }
        if body.is_empty() {
            return Err(FunctionError::EmptyBody {
                name: name.to_string(),
            });
        }

        if let Err(err) = EXPRESSIONS.compile_expression(body) {
            return Err(FunctionError::InvalidExpression {
                name: name.to_string(),
                message: err.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            declared_name,
            params,
            body: body.to_string(),
        })
    }

    /// The name templates call the function by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name written after `def` in the definition.
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Returns the declared name when it differs from the registered one.
    pub fn name_mismatch(&self) -> Option<&str> {
        (self.declared_name != self.name).then_some(self.declared_name.as_str())
    }

    /// Parameter names in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Evaluates the body with `args` bound to the parameters.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        if args.len() > self.params.len() {
            return Err(Error::new(
                ErrorKind::TooManyArguments,
                format!(
                    "{}() takes {} arguments, got {}",
                    self.name,
                    self.params.len(),
                    args.len()
                ),
            ));
        }
        if args.len() < self.params.len() {
            return Err(Error::new(
                ErrorKind::MissingArgument,
                format!("{}() missing argument <{}>", self.name, self.params[args.len()]),
            ));
        }

        let scope: BTreeMap<&str, Value> = self
            .params
            .iter()
            .map(String::as_str)
            .zip(args.iter().cloned())
            .collect();

        let expr = EXPRESSIONS.compile_expression(&self.body)?;
        let value = expr.eval(scope)?;
        Ok(value)
    }

    /// Wraps the function as a template value that can be called.
    pub fn to_value(self: &Arc<Self>) -> Value {
        let func = Arc::clone(self);
        Value::from_function(move |args: Rest<Value>| func.call(&args))
    }
}
