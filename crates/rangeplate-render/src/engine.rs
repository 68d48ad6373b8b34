//! Template engine abstraction.
//!
//! The expansion pipeline only needs two things from a template engine: the
//! set of variables a template refers to, and a rendered string for a given
//! variable mapping. [`TemplateEngine`] captures that contract; the default
//! implementation is [`MiniJinjaEngine`].

use std::collections::BTreeSet;

use minijinja::Environment;

use crate::context::{to_context, Variables};
use crate::error::RenderError;

/// A template engine that can render templates with merged variables.
pub trait TemplateEngine {
    /// Returns the top-level names a template reads but does not define
    /// itself.
    ///
    /// For `{{ host }}{% for p in ports %}{{ p }}{% endfor %}` this is
    /// `{"host", "ports"}`.
    fn declared_variables(&self, template: &str) -> Result<BTreeSet<String>, RenderError>;

    /// Renders a template string with the given variables.
    ///
    /// Names the mapping does not provide render as the engine's undefined
    /// value (empty text for the default engine).
    fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError>;
}

/// MiniJinja-based template engine.
///
/// Templates use Jinja2 syntax: loops, conditionals, filters and calls to
/// computed functions that were merged into the variables.
///
/// # Example
///
/// ```rust
/// use rangeplate_render::{MiniJinjaEngine, TemplateEngine, Variables};
///
/// let engine = MiniJinjaEngine::new();
/// let mut vars = Variables::new();
/// vars.insert("host".into(), "leaf1".into());
///
/// let output = engine.render("hostname {{ host }}", &vars).unwrap();
/// assert_eq!(output, "hostname leaf1");
///
/// let names = engine.declared_variables("{{ host }} {{ port }}").unwrap();
/// assert!(names.contains("port"));
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates a new MiniJinja engine.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering extra filters or tweaking syntax settings.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn declared_variables(&self, template: &str) -> Result<BTreeSet<String>, RenderError> {
        let tmpl = self.env.template_from_str(template)?;
        Ok(tmpl.undeclared_variables(false).into_iter().collect())
    }

    fn render(&self, template: &str, variables: &Variables) -> Result<String, RenderError> {
        Ok(self.env.render_str(template, to_context(variables))?)
    }
}
