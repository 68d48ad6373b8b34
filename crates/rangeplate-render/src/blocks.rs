//! Header and footer blocks embedded in templates.
//!
//! A template may carry text that is written once per target before and
//! after its rendered records. The blocks are Jinja comments, so they never
//! show up in the per-record output:
//!
//! ```text
//! {#HEADER
//! ! generated config
//! #}
//! interface {{ iface }}
//! {#FOOTER
//! end
//! #}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{#HEADER\n(.*?)\n#\}").expect("header pattern is valid"));
static FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{#FOOTER\n(.*?)\n#\}").expect("footer pattern is valid"));

/// Raw header and footer text found in a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocks {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Blocks {
    /// Extracts the first header and footer block of a template.
    pub fn extract(template: &str) -> Self {
        Self {
            header: capture(&HEADER, template),
            footer: capture(&FOOTER, template),
        }
    }

    /// Header text as written to each target (followed by one newline).
    pub fn header_text(&self) -> Option<String> {
        self.header.as_ref().map(|h| format!("{}\n", h))
    }

    /// Footer text as written to each target (followed by a blank line).
    pub fn footer_text(&self) -> Option<String> {
        self.footer.as_ref().map(|f| format!("{}\n\n", f))
    }
}

fn capture(pattern: &Regex, template: &str) -> Option<String> {
    pattern
        .captures(template)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
