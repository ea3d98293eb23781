//! Log statement text.
//!
//! Builds `<call>(<quote><parts><quote>, <value>)<terminator>`. The selected
//! value is always passed as the live second argument.

use crate::config::Config;

/// Context for one message.
#[derive(Debug, Clone, Default)]
pub struct MessageInput<'a> {
    /// Expression being logged.
    pub value: &'a str,
    pub file_name: Option<&'a str>,
    /// 0-indexed line the statement will occupy.
    pub line: usize,
    pub class_name: Option<&'a str>,
    pub function_name: Option<&'a str>,
}

/// Message parts in order: prefix, class, function, file/line info, label.
pub fn message_parts(config: &Config, input: &MessageInput) -> Vec<String> {
    let mut parts = Vec::new();

    if !config.message_prefix.is_empty() {
        parts.push(config.message_prefix.clone());
    }
    if config.include_enclosing_class {
        if let Some(class) = input.class_name.filter(|c| !c.is_empty()) {
            parts.push(class.to_string());
        }
    }
    if config.include_enclosing_function {
        if let Some(function) = input.function_name.filter(|f| !f.is_empty()) {
            parts.push(function.to_string());
        }
    }

    let line = input.line + 1;
    match input.file_name.filter(|_| config.include_file_name) {
        Some(file) if config.include_line_number => parts.push(format!("file: {}:{}", file, line)),
        Some(file) => parts.push(format!("file: {}", file)),
        None if config.include_line_number => parts.push(format!("line: {}", line)),
        None => {}
    }

    parts.push(format!("{}{}", input.value, config.message_suffix));
    parts
}

/// Join parts with ` <delimiter> `.
///
/// A part that already ends with `<delimiter> ` is followed by a single
/// space instead of a second delimiter.
pub fn join_parts(parts: &[String], delimiter: &str) -> String {
    let trailing = format!("{} ", delimiter);
    let mut out = String::new();

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            if !delimiter.is_empty() && out.ends_with(&trailing) {
                let trimmed = out.trim_end().len();
                out.truncate(trimmed);
                out.push(' ');
            } else if delimiter.is_empty() {
                out.push(' ');
            } else {
                out.push(' ');
                out.push_str(delimiter);
                out.push(' ');
            }
        }
        out.push_str(part);
    }
    out
}

/// Quote character for a message about `value`.
pub fn select_quote(value: &str, default: char) -> char {
    if value.starts_with('{') || value.contains('"') {
        '`'
    } else if value.contains('\'') {
        '"'
    } else {
        default
    }
}

fn escape(content: &str, quote: char) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '$' if quote == '`' && chars.peek() == Some(&'{') => out.push_str("\\$"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// The full log statement, without indentation or line break.
pub fn build(config: &Config, input: &MessageInput) -> String {
    let quote = select_quote(input.value, config.quote);
    let content = join_parts(&message_parts(config, input), &config.delimiter);
    format!(
        "{call}({quote}{content}{quote}, {value}){term}",
        call = config.call_name,
        content = escape(&content, quote),
        value = input.value,
        term = config.terminator(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(value: &'a str) -> MessageInput<'a> {
        MessageInput {
            value,
            file_name: Some("app.ts"),
            line: 11,
            class_name: Some("Greeter"),
            function_name: Some("greet"),
        }
    }

    #[test]
    fn test_full_message() {
        let statement = build(&Config::default(), &input("name"));
        assert_eq!(
            statement,
            "console.log(\"🚀 ~ Greeter ~ greet ~ file: app.ts:12 ~ name:\", name);"
        );
    }

    #[test]
    fn test_flags_drop_parts() {
        let config = Config {
            include_file_name: false,
            include_enclosing_class: false,
            include_enclosing_function: false,
            add_semicolon: false,
            message_prefix: String::new(),
            ..Config::default()
        };
        assert_eq!(build(&config, &input("x")), "console.log(\"line: 12 ~ x:\", x)");
    }

    #[test]
    fn test_delimiter_never_doubles() {
        for prefix in ["🚀 ~ ", "debug ~ ", "~ "] {
            let parts = vec![prefix.to_string(), "value:".to_string()];
            let joined = join_parts(&parts, "~");
            assert!(!joined.contains("~ ~"), "{joined}");
            assert!(!joined.contains("~  "), "{joined}");
            assert!(joined.ends_with("~ value:"), "{joined}");
        }
    }

    #[test]
    fn test_quote_selection() {
        for default in ['"', '\'', '`'] {
            assert_eq!(select_quote("{ a, b }", default), '`');
            assert_eq!(select_quote("obj[\"key\"]", default), '`');
        }
        assert_eq!(select_quote("obj['key']", '\''), '"');
        assert_eq!(select_quote("value", '\''), '\'');
    }

    #[test]
    fn test_label_escaped_for_quote() {
        let config = Config {
            message_prefix: String::new(),
            include_line_number: false,
            ..Config::default()
        };
        let value = "{ a: `${b}` }";
        let statement = build(
            &config,
            &MessageInput {
                value,
                ..MessageInput::default()
            },
        );
        assert_eq!(statement, "console.log(`{ a: \\`\\${b}\\` }:`, { a: `${b}` });");
    }
}
