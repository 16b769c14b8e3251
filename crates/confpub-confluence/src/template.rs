//! Input templating.
//!
//! Input files are rendered with minijinja before conversion. Parameters are
//! available both as top-level variables and as the `parameters` map, and
//! referencing an undefined variable is an error.
//!
//! Variables use `${ name }` instead of `{{ name }}`, which is monospace in
//! wiki markup. Blocks (`{% if %}`) and comments (`{# #}`) keep the usual
//! delimiters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior, Value};

use crate::macros;

/// Error rendering an input file.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders an input file into document text.
pub trait TemplateRenderer {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to render.
    fn render(&self, path: &Path, parameters: &BTreeMap<String, String>)
    -> Result<String, TemplateError>;
}

/// minijinja-backed renderer with the macro helpers registered.
#[derive(Debug, Default)]
pub struct JinjaRenderer;

impl JinjaRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn environment() -> Result<Environment<'static>, minijinja::Error> {
        let syntax = SyntaxConfig::builder()
            .block_delimiters("{%", "%}")
            .variable_delimiters("${", "}")
            .comment_delimiters("{#", "#}")
            .build()?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_function("expand_macro", |title: String, body: String| {
            macros::expand_macro(&title, &body)
        });
        env.add_function("html_macro", |content: String| macros::html_macro(&content));
        Ok(env)
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(
        &self,
        path: &Path,
        parameters: &BTreeMap<String, String>,
    ) -> Result<String, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut context: BTreeMap<&str, Value> = parameters
            .iter()
            .map(|(key, value)| (key.as_str(), Value::from(value.as_str())))
            .collect();
        context.insert("parameters", Value::from_serialize(parameters));

        Self::environment()
            .and_then(|env| env.render_str(&source, context))
            .map_err(|source| TemplateError::Render {
                path: path.to_path_buf(),
                source,
            })
    }
}
