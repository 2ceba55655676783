//! Rendering of validator locations as dotted/bracketed paths.
//!
//! The validator reports locations as JSON pointers (`/data/users/0/email`).
//! Test reports show them the way the data reads: `data.users[0].email`, or
//! `root` for the top level. A segment is rendered as an index only when the
//! value it steps into is an array.

use serde_json::Value;

/// Label used for violations at the top level of the instance.
pub const ROOT: &str = "root";

/// Render `pointer` (a JSON pointer into `data`) as a readable path.
#[must_use]
pub fn render_path(pointer: &str, data: &Value) -> String {
    if pointer.is_empty() || pointer == "/" {
        return ROOT.to_string();
    }

    let mut rendered = String::new();
    let mut current = Some(data);

    for raw in pointer.split('/').skip(1) {
        let segment = unescape(raw);
        match current {
            Some(Value::Array(items)) if segment.parse::<usize>().is_ok() => {
                rendered.push('[');
                rendered.push_str(&segment);
                rendered.push(']');
                current = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            _ => {
                push_property(&mut rendered, &segment);
                current = current.and_then(|value| value.get(segment.as_str()));
            }
        }
    }

    rendered
}

fn push_property(rendered: &mut String, name: &str) {
    if is_plain(name) {
        if !rendered.is_empty() {
            rendered.push('.');
        }
        rendered.push_str(name);
    } else {
        rendered.push_str("[\"");
        rendered.push_str(&name.replace('"', "\\\""));
        rendered.push_str("\"]");
    }
}

fn is_plain(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '.' | '[' | ']' | '"'))
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
