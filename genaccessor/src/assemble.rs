//! Assembly of one output unit per package.

use serde::Serialize;
use thiserror::Error;

use crate::format::{FormatError, SourceFormatter};
use crate::imports::ImportSet;
use crate::templates::Templates;

/// A unit that could not be assembled.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssembleError {
    /// The unit template failed to render.
    #[error(transparent)]
    Template(#[from] minijinja::Error),
    /// The rendered unit failed to format.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Values substituted into the unit template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitContext<'a> {
    /// Name shown in the `Code generated by` banner.
    pub generator_name: &'a str,
    /// Package clause name.
    pub package_name: &'a str,
    /// Rendered import declaration, possibly empty.
    pub imports: String,
    /// Method declarations separated by blank lines.
    pub body: String,
}

impl<'a> UnitContext<'a> {
    /// Builds the context from a package's import set and methods in
    /// generation order.
    #[must_use]
    pub fn new(
        generator_name: &'a str,
        package_name: &'a str,
        imports: &ImportSet,
        methods: &[String],
    ) -> Self {
        Self {
            generator_name,
            package_name,
            imports: imports.render(),
            body: methods.join("\n"),
        }
    }
}

/// Renders and formats a unit. Returns `Ok(None)` when the body is empty,
/// in which case nothing should be written.
///
/// # Errors
///
/// Returns an [`AssembleError`] when the template or formatter fails.
pub fn assemble(
    templates: &Templates,
    formatter: &dyn SourceFormatter,
    context: &UnitContext<'_>,
) -> Result<Option<String>, AssembleError> {
    if context.body.trim().is_empty() {
        return Ok(None);
    }
    let source = templates.render_unit(context)?;
    Ok(Some(formatter.format(&source)?))
}

#[cfg(test)]
mod tests {
    //! Unit tests for unit assembly.

    use super::*;
    use crate::format::BuiltinFormatter;
    use crate::imports::ImportRef;
    use crate::vocabulary::TagVocabulary;
    use rstest::{fixture, rstest};

    #[fixture]
    fn templates() -> Templates {
        Templates::new(&TagVocabulary::standard()).expect("templates")
    }

    #[rstest]
    fn assembles_banner_package_imports_and_methods(templates: Templates) {
        let mut imports = ImportSet::new();
        imports
            .insert(ImportRef::new("time", "time"))
            .expect("import");
        let methods = vec![
            "func (m Event) At() time.Time {\n\treturn m.at\n}\n".to_owned(),
            "func (m *Event) SetAt(s time.Time) {\n\tm.at = s\n}\n".to_owned(),
        ];
        let context = UnitContext::new("go-genaccessor", "events", &imports, &methods);
        let unit = assemble(&templates, &BuiltinFormatter, &context)
            .expect("assemble")
            .expect("unit");
        assert_eq!(
            unit,
            concat!(
                "// Code generated by go-genaccessor; DO NOT EDIT.\n",
                "\n",
                "package events\n",
                "\n",
                "import (\n",
                "\t\"time\"\n",
                ")\n",
                "\n",
                "func (m Event) At() time.Time {\n",
                "\treturn m.at\n",
                "}\n",
                "\n",
                "func (m *Event) SetAt(s time.Time) {\n",
                "\tm.at = s\n",
                "}\n",
            )
        );
    }

    #[rstest]
    fn omits_empty_import_block(templates: Templates) {
        let methods = vec!["func (m T) A() int {\n\treturn m.a\n}\n".to_owned()];
        let context = UnitContext::new("gen", "demo", &ImportSet::new(), &methods);
        let unit = assemble(&templates, &BuiltinFormatter, &context)
            .expect("assemble")
            .expect("unit");
        assert_eq!(
            unit,
            "// Code generated by gen; DO NOT EDIT.\n\npackage demo\n\nfunc (m T) A() int {\n\treturn m.a\n}\n"
        );
    }

    #[rstest]
    fn empty_body_produces_no_unit(templates: Templates) {
        let context = UnitContext::new("gen", "demo", &ImportSet::new(), &[]);
        assert!(
            assemble(&templates, &BuiltinFormatter, &context)
                .expect("assemble")
                .is_none()
        );
    }

    #[rstest]
    fn malformed_methods_fail_formatting(templates: Templates) {
        let methods = vec!["func (m T) A() int {\n".to_owned()];
        let context = UnitContext::new("gen", "demo", &ImportSet::new(), &methods);
        let err = assemble(&templates, &BuiltinFormatter, &context).expect_err("format");
        assert!(matches!(err, AssembleError::Format(_)));
    }
}
