//! Response rendering for the terminal

use std::fmt::Write as _;
use std::str::FromStr;

use crossterm::style::{Color, Stylize};

use crate::error::{Error, Result};
use crate::models::Response;

/// How the response body is rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-print JSON responses, everything else verbatim
    #[default]
    Auto,
    /// Pretty-print whenever the body parses as JSON
    Json,
    Raw,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "" | "auto" => Ok(OutputFormat::Auto),
            "json" => Ok(OutputFormat::Json),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(Error::Validation(format!(
                "unknown output format: {s} (use json or raw)"
            ))),
        }
    }
}

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::Yellow,
    }
}

pub struct Formatter {
    color: bool,
    format: OutputFormat,
    pretty: bool,
}

impl Formatter {
    /// `color` enables ANSI styling; `pretty` allows JSON pretty-printing in
    /// [`OutputFormat::Auto`].
    pub fn new(color: bool, format: OutputFormat, pretty: bool) -> Self {
        Formatter {
            color,
            format,
            pretty,
        }
    }

    pub fn format_response(&self, resp: &Response, info: bool) -> String {
        let mut out = String::new();

        if self.color {
            let _ = writeln!(out, "{}", resp.status.as_str().with(status_color(resp.status_code)).bold());
        } else {
            let _ = writeln!(out, "{}", resp.status);
        }

        if info {
            out.push_str("\nHeaders:\n");
            for (name, values) in &resp.headers {
                for value in values {
                    if self.color {
                        let _ = writeln!(out, "  {}: {}", name.as_str().cyan(), value);
                    } else {
                        let _ = writeln!(out, "  {}: {}", name, value);
                    }
                }
            }
            let _ = writeln!(out, "\nTiming: {:?}", resp.duration);
            let _ = writeln!(out, "Size: {} bytes", resp.size);
        }

        if !resp.body.is_empty() {
            out.push('\n');
            out.push_str(&self.format_body(resp));
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }

    fn format_body(&self, resp: &Response) -> String {
        let raw = String::from_utf8_lossy(&resp.body);
        let pretty = match self.format {
            OutputFormat::Raw => None,
            OutputFormat::Json => pretty_json(&resp.body),
            OutputFormat::Auto => {
                let is_json = resp
                    .header("content-type")
                    .is_some_and(|ct| ct.contains("application/json"));
                if is_json && self.pretty {
                    pretty_json(&resp.body)
                } else {
                    None
                }
            }
        };

        match pretty {
            Some(json) if self.color => highlight_json(&json),
            Some(json) => json,
            None => raw.into_owned(),
        }
    }
}

/// Re-indent a JSON document, or `None` if the body is not JSON.
fn pretty_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// ANSI syntax coloring for pretty-printed JSON.
///
/// Keys cyan, strings green, numbers yellow, literals magenta.
pub fn highlight_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '"' => {
                let mut end = start + 1;
                let mut escaped = false;
                for (i, ch) in chars.by_ref() {
                    end = i + ch.len_utf8();
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '"' {
                        break;
                    }
                }
                let literal = &text[start..end];
                let is_key = text[end..].trim_start_matches(' ').starts_with(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                let _ = write!(out, "{}", literal.with(color));
            }
            '0'..='9' | '-' => {
                let mut end = start + 1;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-') {
                        end = i + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let _ = write!(out, "{}", text[start..end].yellow());
            }
            't' | 'f' | 'n' => {
                let literal = ["true", "false", "null"]
                    .into_iter()
                    .find(|lit| text[start..].starts_with(lit));
                match literal {
                    Some(lit) => {
                        for _ in 1..lit.len() {
                            chars.next();
                        }
                        let _ = write!(out, "{}", lit.magenta());
                    }
                    None => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn response(code: u16, status: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut headers = BTreeMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), vec![ct.to_string()]);
        }
        Response {
            status_code: code,
            status: status.to_string(),
            headers,
            body: body.as_bytes().to_vec(),
            duration: Duration::from_millis(12),
            size: body.len(),
        }
    }

    fn plain(format: OutputFormat) -> Formatter {
        Formatter::new(false, format, true)
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("RAW".parse::<OutputFormat>().unwrap(), OutputFormat::Raw);
        assert_eq!("auto".parse::<OutputFormat>().unwrap(), OutputFormat::Auto);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(200), Color::Green);
        assert_eq!(status_color(301), Color::Cyan);
        assert_eq!(status_color(404), Color::Red);
        assert_eq!(status_color(503), Color::Magenta);
        assert_eq!(status_color(101), Color::Yellow);
    }

    #[test]
    fn test_auto_pretty_prints_json() {
        let resp = response(200, "200 OK", Some("application/json; charset=utf-8"), r#"{"a":1}"#);
        let out = plain(OutputFormat::Auto).format_response(&resp, false);
        assert_eq!(out, "200 OK\n\n{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_auto_leaves_non_json_alone() {
        let resp = response(200, "200 OK", Some("text/plain"), r#"{"a":1}"#);
        let out = plain(OutputFormat::Auto).format_response(&resp, false);
        assert_eq!(out, "200 OK\n\n{\"a\":1}\n");
    }

    #[test]
    fn test_pretty_disabled() {
        let resp = response(200, "200 OK", Some("application/json"), r#"{"a":1}"#);
        let out = Formatter::new(false, OutputFormat::Auto, false).format_response(&resp, false);
        assert_eq!(out, "200 OK\n\n{\"a\":1}\n");
    }

    #[test]
    fn test_json_and_raw_formats() {
        let resp = response(200, "200 OK", Some("text/plain"), r#"[1,2]"#);
        let out = plain(OutputFormat::Json).format_response(&resp, false);
        assert_eq!(out, "200 OK\n\n[\n  1,\n  2\n]\n");

        let resp = response(200, "200 OK", Some("application/json"), r#"{"a":1}"#);
        let out = plain(OutputFormat::Raw).format_response(&resp, false);
        assert_eq!(out, "200 OK\n\n{\"a\":1}\n");
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        let resp = response(500, "500 Internal Server Error", Some("application/json"), "oops");
        let out = plain(OutputFormat::Auto).format_response(&resp, false);
        assert_eq!(out, "500 Internal Server Error\n\noops\n");
    }

    #[test]
    fn test_info_block() {
        let mut resp = response(204, "204 No Content", None, "");
        resp.headers.insert(
            "set-cookie".to_string(),
            vec!["a=1".to_string(), "b=2".to_string()],
        );
        let out = plain(OutputFormat::Auto).format_response(&resp, true);
        assert_eq!(
            out,
            "204 No Content\n\nHeaders:\n  set-cookie: a=1\n  set-cookie: b=2\n\nTiming: 12ms\nSize: 0 bytes\n"
        );
    }

    #[test]
    fn test_color_output_matches_plain_text() {
        let resp = response(200, "200 OK", Some("application/json"), r#"{"ok":true}"#);
        let colored = Formatter::new(true, OutputFormat::Auto, true).format_response(&resp, true);
        let uncolored = plain(OutputFormat::Auto).format_response(&resp, true);
        let re = regex::Regex::new("\u{1b}\\[[0-9;]*m").unwrap();
        assert_eq!(re.replace_all(&colored, ""), uncolored);
    }

    #[test]
    fn test_highlight_json_keeps_text() {
        let json = "{\n  \"name\": \"a \\\"b\\\"\",\n  \"n\": -1.5e3,\n  \"ok\": false,\n  \"x\": null\n}";
        let highlighted = highlight_json(json);
        // Strip ANSI sequences and the text must be unchanged
        let re = regex::Regex::new("\u{1b}\\[[0-9;]*m").unwrap();
        assert_eq!(re.replace_all(&highlighted, ""), json);
        assert!(highlighted.contains(&format!("{}", "\"name\"".cyan())));
        assert!(highlighted.contains(&format!("{}", "false".magenta())));
    }
}
