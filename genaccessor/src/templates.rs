//! The template environment used for methods and output units.
//!
//! Built once from a [`TagVocabulary`] and shared read-only by the pipeline.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::vocabulary::TagVocabulary;

const UNIT_TEMPLATE_NAME: &str = "unit";

/// Layout of a generated file: banner, package clause, imports and bodies.
pub const UNIT_TEMPLATE: &str = "\
// Code generated by {{ generator_name }}; DO NOT EDIT.

package {{ package_name }}

{{ imports }}

{{ body }}
";

fn method_template_name(key: &str) -> String {
    format!("method:{key}")
}

/// Compiled method and unit templates.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compiles one method template per vocabulary rule plus the unit
    /// template.
    ///
    /// # Errors
    ///
    /// Returns the [`minijinja::Error`] of the first template that fails to
    /// compile.
    pub fn new(vocabulary: &TagVocabulary) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_template_owned(UNIT_TEMPLATE_NAME, UNIT_TEMPLATE)?;
        for rule in vocabulary.rules() {
            env.add_template_owned(method_template_name(&rule.key), rule.template.clone())?;
        }
        Ok(Self { env })
    }

    /// Renders the method template registered for tag `key`.
    ///
    /// # Errors
    ///
    /// Fails if no template exists for `key` or rendering fails, for example
    /// on an undefined variable.
    pub fn render_method(
        &self,
        key: &str,
        context: &impl Serialize,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template(&method_template_name(key))?
            .render(context)
    }

    /// Renders the output unit template.
    ///
    /// # Errors
    ///
    /// Fails if rendering fails.
    pub fn render_unit(&self, context: &impl Serialize) -> Result<String, minijinja::Error> {
        self.env.get_template(UNIT_TEMPLATE_NAME)?.render(context)
    }
}
