//! Template interpolation for the settings file
//!
//! Handles `{{ env.NAME }}` interpolation so secrets (app secret, database
//! password) can stay out of the YAML file.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ root.name }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Environment variables
    pub env: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding the current process environment
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
        }
    }

    /// Set an environment value (tests, overrides)
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Get a value by path (e.g., "env.APP_SECRET")
    pub fn get(&self, path: &str) -> Option<&str> {
        let (root, name) = path.split_once('.')?;
        match root {
            "env" => self.env.get(name).map(String::as_str),
            _ => None,
        }
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut errors = Vec::new();

    let result = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) => value.to_string(),
            None => {
                errors.push(var_path.to_string());
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(result.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_substitution() {
        let mut ctx = TemplateContext::new();
        ctx.set_env("APP_SECRET", "s3cr3t");

        let result = render("secret: {{ env.APP_SECRET }}", &ctx).unwrap();
        assert_eq!(result, "secret: s3cr3t");
    }

    #[test]
    fn test_multiple_substitutions() {
        let mut ctx = TemplateContext::new();
        ctx.set_env("DB_USER", "reader").set_env("DB_PASS", "pw");

        let result = render("{{ env.DB_USER }}:{{ env.DB_PASS }}@db", &ctx).unwrap();
        assert_eq!(result, "reader:pw@db");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("{{ env.MISSING }} and {{ config.nope }}", &ctx);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("env.MISSING"));
        assert!(err.contains("config.nope"));
    }

    #[test]
    fn test_no_templates() {
        let ctx = TemplateContext::new();
        let result = render("plain: value", &ctx).unwrap();
        assert_eq!(result, "plain: value");
    }

    #[test]
    fn test_whitespace_in_template() {
        let mut ctx = TemplateContext::new();
        ctx.set_env("KEY", "value");

        assert_eq!(render("{{env.KEY}}", &ctx).unwrap(), "value");
        assert_eq!(render("{{ env.KEY }}", &ctx).unwrap(), "value");
        assert_eq!(render("{{  env.KEY  }}", &ctx).unwrap(), "value");
    }
}
