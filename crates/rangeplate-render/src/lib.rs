//! # Rangeplate Render - the template side of rangeplate
//!
//! This crate is the boundary between the expansion pipeline and the template
//! engine. The pipeline needs exactly two operations from a template:
//!
//! - [`TemplateEngine::declared_variables`]: which names the template reads
//! - [`TemplateEngine::render`]: text for one merged [`Variables`] mapping
//!
//! [`MiniJinjaEngine`] implements both with Jinja2 syntax.
//!
//! ## Computed Functions
//!
//! Input data can declare small functions that templates call. A
//! [`ComputedFunction`] is written as `def name(params): expression`, where
//! the expression uses the template engine's own expression language. It is
//! compiled when loaded and evaluated inside the engine, never executed as
//! host code.
//!
//! ```rust
//! use std::sync::Arc;
//! use rangeplate_render::{ComputedFunction, MiniJinjaEngine, TemplateEngine, Variable, Variables};
//!
//! let func = ComputedFunction::parse("vrf", "def vrf(id): 'ip-vrf-' ~ id").unwrap();
//! let mut vars = Variables::new();
//! vars.insert("vrf".into(), Variable::from(Arc::new(func)));
//!
//! let out = MiniJinjaEngine::new().render("{{ vrf(1001) }}", &vars).unwrap();
//! assert_eq!(out, "ip-vrf-1001");
//! ```
//!
//! ## Header and Footer Blocks
//!
//! [`Blocks::extract`] pulls `{#HEADER ... #}` and `{#FOOTER ... #}` comment
//! blocks out of a template; their raw text is written once per target.

mod blocks;
mod context;
mod engine;
mod error;
mod function;

pub use blocks::Blocks;
pub use context::{to_context, Variable, Variables};
pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use error::{FunctionError, RenderError};
pub use function::ComputedFunction;
