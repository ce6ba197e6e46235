//! `{}`-style message templates.
//!
//! Rendering is positional: each `{}` consumes the next argument. It never
//! fails. Extra arguments are dropped, placeholders without an argument
//! stay as literal `{}`, and `\{}` produces a literal `{}` without
//! consuming anything.

use std::fmt::{self, Write};

/// Text substituted for an argument whose `Display` impl reports an error.
pub const UNRENDERABLE: &str = "[unrenderable]";

/// Result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The final message text.
    pub message: String,
    /// Every argument rendered to text, in order, including unused ones.
    pub args: Vec<String>,
    /// Number of arguments whose `Display` impl returned `fmt::Error`.
    pub failed_args: usize,
}

/// Render `template` against `args`.
pub fn render(template: &str, args: &[&dyn fmt::Display]) -> Rendered {
    let mut failed_args = 0;
    let rendered_args: Vec<String> = args
        .iter()
        .map(|arg| {
            let mut out = String::new();
            match write!(out, "{}", arg) {
                Ok(()) => out,
                Err(_) => {
                    failed_args += 1;
                    UNRENDERABLE.to_string()
                }
            }
        })
        .collect();

    let message = substitute(template, &rendered_args);
    Rendered {
        message,
        args: rendered_args,
        failed_args,
    }
}

fn substitute(template: &str, args: &[String]) -> String {
    let capacity = template.len() + args.iter().map(String::len).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    let mut next_arg = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        let (before, after) = rest.split_at(pos);
        if let Some(literal) = before.strip_suffix('\\') {
            // escaped: keep the braces, drop the backslash
            out.push_str(literal);
            out.push_str("{}");
        } else {
            out.push_str(before);
            match next_arg.next() {
                Some(arg) => out.push_str(arg),
                None => out.push_str("{}"),
            }
        }
        rest = &after[2..];
    }
    out.push_str(rest);
    out
}
