//! Path and environment variable templating
//!
//! Two placeholder kinds share one scanner:
//! - `${NAME}` environment variables, resolved from the workspace `.env` and
//!   config environments
//! - `{name}` path variables, resolved from CLI `key=value` tokens or prompts
//!
//! A match beginning with `$` is always an environment variable, so a
//! `${FOO}` span is never also reported as a path variable.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\$?)\{([^{}]+)\}").expect("placeholder regex is valid"))
}

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Env,
    Path,
}

/// Distinct names of one kind, in first-occurrence order.
fn extract(text: &str, kind: Kind) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut vars = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let is_env = !caps[1].is_empty();
        let matches_kind = match kind {
            Kind::Env => is_env,
            Kind::Path => !is_env,
        };
        if matches_kind && seen.insert(caps[2].to_string()) {
            vars.push(caps[2].to_string());
        }
    }
    vars
}

/// A string with placeholders plus the values used to fill them.
#[derive(Clone, Debug, Default)]
pub struct Template {
    text: String,
    path_vars: HashMap<String, String>,
    env_vars: HashMap<String, String>,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Template {
            text: text.into(),
            path_vars: HashMap::new(),
            env_vars: HashMap::new(),
        }
    }

    pub fn set_path_vars(&mut self, vars: HashMap<String, String>) {
        self.path_vars = vars;
    }

    pub fn set_env_vars(&mut self, vars: HashMap<String, String>) {
        self.env_vars = vars;
    }

    pub fn extract_path_vars(&self) -> Vec<String> {
        extract(&self.text, Kind::Path)
    }

    pub fn extract_env_vars(&self) -> Vec<String> {
        extract(&self.text, Kind::Env)
    }

    /// Substitutes env vars, then path vars.
    ///
    /// Env vars fail fast on the first missing name. Path vars are checked as
    /// a batch and the error lists every missing name.
    pub fn resolve(&self) -> Result<String> {
        if let Some(missing) = self
            .extract_env_vars()
            .into_iter()
            .find(|name| !self.env_vars.contains_key(name))
        {
            return Err(Error::MissingEnvVar(missing));
        }

        let path_vars = self.extract_path_vars();
        let unresolved: Vec<String> = path_vars
            .iter()
            .filter(|name| !self.path_vars.contains_key(*name))
            .cloned()
            .collect();
        if !unresolved.is_empty() {
            return Err(Error::MissingVariables(unresolved));
        }

        // Single pass over the original text so substituted values are
        // never rescanned for placeholders.
        let resolved = placeholder_regex().replace_all(&self.text, |caps: &regex::Captures| {
            let vars = if caps[1].is_empty() {
                &self.path_vars
            } else {
                &self.env_vars
            };
            vars[&caps[2]].clone()
        });
        tracing::debug!(template = %self.text, resolved = %resolved, "Resolved template");
        Ok(resolved.into_owned())
    }
}

/// Substitutes `${NAME}` patterns in text, leaving unknown names untouched.
///
/// Used for header values and bodies, where `{...}` is ordinary content
/// (JSON) rather than a path variable.
pub fn expand_env_vars(text: &str, vars: &HashMap<String, String>) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &regex::Captures| {
            if caps[1].is_empty() {
                return caps[0].to_string();
            }
            match vars.get(&caps[2]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_path_vars_dedups_in_order() {
        let tmpl = Template::new("/users/{userId}/posts/{postId}/{userId}");
        assert_eq!(tmpl.extract_path_vars(), vec!["userId", "postId"]);
    }

    #[test]
    fn test_extract_env_vars_dedups_in_order() {
        let tmpl = Template::new("${API_BASE}/api/${API_VERSION}/${API_BASE}");
        assert_eq!(tmpl.extract_env_vars(), vec!["API_BASE", "API_VERSION"]);
    }

    #[test]
    fn test_env_spans_are_not_path_vars() {
        let tmpl = Template::new("${API_BASE}/users/{id}");
        assert_eq!(tmpl.extract_path_vars(), vec!["id"]);
        assert_eq!(tmpl.extract_env_vars(), vec!["API_BASE"]);
    }

    #[test]
    fn test_resolve_path_vars_leaves_no_braces() {
        let mut tmpl = Template::new("https://api.example.com/users/{userId}/posts/{postId}");
        let names = tmpl.extract_path_vars();
        let provided: HashMap<String, String> =
            names.iter().map(|n| (n.clone(), "42".to_string())).collect();
        tmpl.set_path_vars(provided);

        let resolved = tmpl.resolve().unwrap();
        assert_eq!(resolved, "https://api.example.com/users/42/posts/42");
        assert!(!resolved.contains('{') && !resolved.contains('}'));
    }

    #[test]
    fn test_resolve_env_then_path() {
        let mut tmpl = Template::new("${API_BASE}/users/{userId}/posts/{postId}");
        tmpl.set_env_vars(vars(&[("API_BASE", "https://api.example.com")]));
        tmpl.set_path_vars(vars(&[("userId", "123"), ("postId", "456")]));
        assert_eq!(
            tmpl.resolve().unwrap(),
            "https://api.example.com/users/123/posts/456"
        );
    }

    #[test]
    fn test_missing_env_var_fails_before_path_vars() {
        let tmpl = Template::new("${API_BASE}/users/{userId}");
        match tmpl.resolve() {
            Err(Error::MissingEnvVar(name)) => assert_eq!(name, "API_BASE"),
            other => panic!("expected MissingEnvVar, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_path_vars_are_batched() {
        let mut tmpl = Template::new("/users/{userId}/posts/{postId}/c/{commentId}");
        tmpl.set_path_vars(vars(&[("postId", "1")]));
        match tmpl.resolve() {
            Err(Error::MissingVariables(names)) => {
                assert_eq!(names, vec!["userId", "commentId"])
            }
            other => panic!("expected MissingVariables, got {other:?}"),
        }
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut tmpl = Template::new("/a/{x}");
        tmpl.set_path_vars(vars(&[("x", "{y}")]));
        assert_eq!(tmpl.resolve().unwrap(), "/a/{y}");
    }

    #[test]
    fn test_no_placeholders_resolves_to_input() {
        let tmpl = Template::new("https://api.example.com/health");
        assert_eq!(tmpl.resolve().unwrap(), "https://api.example.com/health");
    }

    #[test]
    fn test_expand_env_vars_is_lenient() {
        let env = vars(&[("TOKEN", "abc")]);
        let body = r#"{"token":"${TOKEN}","other":"${UNKNOWN}","id":"{id}"}"#;
        assert_eq!(
            expand_env_vars(body, &env),
            r#"{"token":"abc","other":"${UNKNOWN}","id":"{id}"}"#
        );
    }
}
