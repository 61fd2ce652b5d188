use super::value::Value;

const INDENT: &str = "    ";

/// Render a value in the canonical indented form.
///
/// The output parses back to an equal value; entry order is written exactly
/// as held by the maps and lists.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.push('\n');
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Str(s) => out.push_str(&escape(s)),
        Value::Map(map) => {
            if map.is_empty() {
                out.push_str("map:{}");
                return;
            }
            out.push_str("map:{\n");
            for (key, entry) in map.iter() {
                push_indent(out, depth + 1);
                out.push_str("; ");
                out.push_str(&escape(key));
                out.push_str(" = ");
                write_value(out, entry, depth + 1);
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
        Value::List(items) => {
            if items.is_empty() {
                out.push_str("list:{}");
                return;
            }
            out.push_str("list:{\n");
            for item in items {
                push_indent(out, depth + 1);
                out.push_str("; ");
                write_value(out, item, depth + 1);
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | ';' | '=' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
