//! Decoding of nested-literal cells.
//!
//! Cells written as `[[...]]` carry a literal list of lists, typically authored
//! in Python-literal style with single quotes:
//!
//! ```text
//! [['eth1', 100], ['eth2', 200]]
//! ```
//!
//! The text is rewritten into JSON (single-quoted strings become double-quoted,
//! `True`/`False`/`None` become `true`/`false`/`null`, tuple parentheses become
//! brackets, trailing commas are dropped and numbers are written in JSON form)
//! and parsed with `serde_json`.

/// Decodes a nested literal, returning `None` when the text is not a valid
/// literal.
pub fn decode_nested(text: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    serde_json::from_str(&python_literal_to_json(text)?).ok()
}

fn python_literal_to_json(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                loop {
                    let next = chars.next()?;
                    match next {
                        '\\' => {
                            let escaped = chars.next()?;
                            if escaped == '\'' {
                                out.push('\'');
                            } else {
                                out.push('\\');
                                out.push(escaped);
                            }
                        }
                        '"' if c == '\'' => out.push_str("\\\""),
                        q if q == c => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '(' => out.push('['),
            ')' => out.push(']'),
            ',' => {
                // trailing commas are legal before a closing bracket
                let closes = chars
                    .clone()
                    .find(|n| !n.is_whitespace())
                    .is_some_and(|n| n == ']' || n == ')');
                if !closes {
                    out.push(',');
                }
            }
            c if c.is_ascii_digit() || (c == '.' && chars.peek().is_some_and(char::is_ascii_digit)) => {
                let mut number = String::from(c);
                let mut prev = c;
                while let Some(&next) = chars.peek() {
                    let continues = next.is_ascii_digit()
                        || matches!(next, '.' | 'e' | 'E')
                        || (matches!(next, '+' | '-') && matches!(prev, 'e' | 'E'));
                    if !continues {
                        break;
                    }
                    number.push(next);
                    prev = next;
                    chars.next();
                }
                push_number(&mut out, &number);
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "True" => out.push_str("true"),
                    "False" => out.push_str("false"),
                    "None" => out.push_str("null"),
                    _ => return None,
                }
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Writes a Python number as JSON: `2.` becomes `2.0` and `.5` becomes `0.5`.
fn push_number(out: &mut String, number: &str) {
    let mut prev: Option<char> = None;
    let mut chars = number.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '.' && !prev.is_some_and(|p| p.is_ascii_digit()) {
            out.push('0');
        }
        out.push(c);
        if c == '.' && !chars.peek().is_some_and(char::is_ascii_digit) {
            out.push('0');
        }
        prev = Some(c);
    }
}
