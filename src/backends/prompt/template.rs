// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::errors::TemplateError;

/// Replace every `{{ path }}` in `template` with the value found at `path`
/// in `context`.
///
/// Paths are dot-separated object keys; numeric segments index arrays.
/// Strings are inserted as-is, anything else as compact JSON. A placeholder
/// that resolves to nothing (or to `null`) is an error rather than an empty
/// string, so a prompt is never sent with a silently missing section.
///
/// ```
/// use serde_json::json;
/// use the_tripwire::backends::prompt::render;
///
/// let context = json!({ "document": "Vendor: Acme", "extraction": { "total": 12.5 } });
/// let prompt = render("Total {{ extraction.total }} in:\n{{document}}", &context).unwrap();
/// assert_eq!(prompt, "Total 12.5 in:\nVendor: Acme");
/// ```
pub fn render(template: &str, context: &Value) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find("}}").ok_or(TemplateError::Unclosed {
            offset: consumed + start,
        })?;

        let path = after_open[..end].trim();
        if path.is_empty() {
            return Err(TemplateError::EmptyPlaceholder {
                offset: consumed + start,
            });
        }

        match lookup(context, path) {
            Some(Value::String(s)) => output.push_str(s),
            Some(value) if !value.is_null() => output.push_str(&value.to_string()),
            _ => {
                return Err(TemplateError::MissingField {
                    path: path.to_string(),
                })
            }
        }

        let advance = start + 2 + end + 2;
        consumed += advance;
        rest = &rest[advance..];
    }

    output.push_str(rest);
    Ok(output)
}

fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(context, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
