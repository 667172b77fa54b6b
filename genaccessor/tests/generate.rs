//! End-to-end generation runs against temporary Go packages.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;

use genaccessor::sink::{DirSink, MemorySink, UnitTarget, UnitWriter};
use genaccessor::tag::TagError;
use genaccessor::{
    FileFilter, GenerateError, GenerateOptions, GoEnvOptions, Generator, ResolverMode, RunSummary,
};
use rstest::rstest;
use test_helpers::gotree::GoTree;
use test_helpers::text::dedent;

fn options(resolver: ResolverMode, tree: Option<&GoTree>) -> GenerateOptions {
    GenerateOptions {
        resolver,
        go_env: GoEnvOptions {
            goroot: tree.map(|tree| tree.path().join("goroot")),
            explicit_only: true,
            ..GoEnvOptions::default()
        },
        ..GenerateOptions::default()
    }
}

fn generate(tree: &GoTree, dir: &str, options: GenerateOptions) -> Result<String, GenerateError> {
    let generator = Generator::new(options)?;
    let mut sink = MemorySink::new();
    generator.run(&tree.path().join(dir), None, &mut sink)?;
    let units = sink.into_units();
    assert_eq!(units.len(), 1, "expected exactly one unit");
    Ok(units
        .into_iter()
        .map(|unit| unit.contents)
        .next()
        .unwrap_or_default())
}

fn syntactic(tree: &GoTree) -> String {
    generate(tree, "models", options(ResolverMode::Syntactic, None)).expect("generate")
}

/// Fake toolchain and a module requiring a versioned library through a
/// local replacement.
fn toolchain() -> GoTree {
    GoTree::new()
        .file(
            "goroot/src/time/time.go",
            "package time\n\ntype Time struct{ wall uint64 }\ntype Duration int64\n",
        )
        .file(
            "app/go.mod",
            "module example.com/app\n\nrequire example.com/lib/v2 v2.0.0\n\nreplace example.com/lib/v2 => ../lib\n",
        )
        .file("lib/lib.go", "package lib\n\ntype Thing struct{}\n")
}

#[rstest]
fn generates_getter_and_setter() {
    let tree = GoTree::new().file(
        "models/user.go",
        &dedent(
            r#"
            package models

            type User struct {
                name string `getter:"" setter:""`
                age  int
            }
            "#,
        ),
    );
    assert_eq!(
        syntactic(&tree),
        dedent(
            "
            // Code generated by go-genaccessor; DO NOT EDIT.

            package models

            func (m User) Name() string {
            \treturn m.name
            }

            func (m *User) SetName(s string) {
            \tm.name = s
            }
            "
        )
    );
}

#[rstest]
fn imports_referenced_packages() {
    let tree = GoTree::new().file(
        "models/event.go",
        &dedent(
            r#"
            package models

            import "time"

            type Event struct {
                at time.Time `getter:""`
            }
            "#,
        ),
    );
    let unit = syntactic(&tree);
    assert!(unit.contains("import (\n\t\"time\"\n)\n"));
    assert!(unit.contains("func (m Event) At() time.Time {\n\treturn m.at\n}\n"));
}

#[rstest]
fn syntactic_resolution_keeps_aliases() {
    let tree = GoTree::new().file(
        "models/event.go",
        &dedent(
            r#"
            package models

            import tm "time"

            type Event struct {
                at tm.Time `getter:""`
            }
            "#,
        ),
    );
    let unit = syntactic(&tree);
    assert!(unit.contains("\ttm \"time\"\n"));
    assert!(unit.contains("func (m Event) At() tm.Time {"));
}

#[rstest]
fn semantic_resolution_uses_declared_package_names() {
    let tree = toolchain().file(
        "app/models/event.go",
        &dedent(
            r#"
            package models

            import (
                tm "time"

                "example.com/lib/v2"
            )

            type Event struct {
                at    tm.Time   `getter:""`
                thing lib.Thing `setter:""`
            }
            "#,
        ),
    );
    let unit = generate(&tree, "app/models", options(ResolverMode::Semantic, Some(&tree)))
        .expect("generate");
    assert!(unit.contains("import (\n\t\"time\"\n\n\tlib \"example.com/lib/v2\"\n)\n"));
    assert!(unit.contains("func (m Event) At() time.Time {"));
    assert!(unit.contains("func (m *Event) SetThing(s lib.Thing) {"));
}

#[rstest]
fn semantic_resolution_keeps_same_named_packages_apart() {
    let tree = toolchain()
        .file(
            "goroot/src/text/template/template.go",
            "package template\n\ntype Template struct{}\n",
        )
        .file(
            "goroot/src/html/template/template.go",
            "package template\n\ntype Template struct{}\n",
        )
        .file(
            "app/models/page.go",
            &dedent(
                r#"
                package models

                import (
                    h "html/template"
                    t "text/template"
                )

                type Page struct {
                    x *t.Template `getter:""`
                    y *h.Template `getter:""`
                }
                "#,
            ),
        );
    let unit = generate(&tree, "app/models", options(ResolverMode::Semantic, Some(&tree)))
        .expect("generate");
    assert!(unit.contains("import (\n\th \"html/template\"\n\t\"text/template\"\n)\n"));
    assert!(unit.contains("func (m Page) X() *template.Template {"));
    assert!(unit.contains("func (m Page) Y() *h.Template {"));
}

#[rstest]
fn semantic_resolution_reports_undefined_types() {
    let tree = toolchain().file(
        "app/models/event.go",
        "package models\n\ntype Event struct {\n\tat Missing `getter:\"\"`\n}\n",
    );
    let err = generate(&tree, "app/models", options(ResolverMode::Semantic, Some(&tree)))
        .expect_err("undefined type");
    assert!(
        matches!(&err, GenerateError::TypeCheck { package, file, .. }
            if package == "models" && file.as_str().ends_with("event.go")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn semantic_mode_requires_goroot() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"\"`\n}\n",
    );
    let err = generate(&tree, "models", options(ResolverMode::Semantic, None))
        .expect_err("no goroot");
    assert!(matches!(err, GenerateError::EnvironmentUnavailable));
}

#[rstest]
fn auto_mode_falls_back_without_goroot() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"\"`\n}\n",
    );
    let unit = generate(&tree, "models", options(ResolverMode::Auto, None)).expect("generate");
    assert!(unit.contains("func (m User) Name() string {"));
}

#[rstest]
fn untagged_packages_produce_no_unit() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `json:\"name\"`\n}\n",
    );
    let opened = Cell::new(0);
    let mut sink = |_: &UnitTarget<'_>| -> io::Result<Box<dyn UnitWriter>> {
        opened.set(opened.get() + 1);
        Err(io::Error::other("sink must not be opened"))
    };
    let summary = Generator::new(options(ResolverMode::Syntactic, None))
        .expect("generator")
        .run(&tree.path().join("models"), None, &mut sink)
        .expect("run");
    assert_eq!(opened.get(), 0);
    assert_eq!(
        summary,
        RunSummary {
            packages: 1,
            units: 0,
            methods: 0,
        }
    );
}

#[rstest]
fn explicit_names_each_produce_a_method() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"Name, FullName\" setter:\"Rename\"`\n}\n",
    );
    let unit = syntactic(&tree);
    let name = unit.find("func (m User) Name() string").expect("Name");
    let full = unit.find("func (m User) FullName() string").expect("FullName");
    assert!(name < full);
    assert!(unit.contains("func (m *User) Rename(s string) {"));
}

#[rstest]
#[case("id", "ID", "SetID")]
#[case("urlPath", "URLPath", "SetURLPath")]
#[case("identity", "Identity", "SetIdentity")]
fn default_names_capitalize_initialisms(
    #[case] field: &str,
    #[case] getter: &str,
    #[case] setter: &str,
) {
    let tree = GoTree::new().file(
        "models/user.go",
        &format!("package models\n\ntype User struct {{\n\t{field} string `getter:\"\" setter:\"\"`\n}}\n"),
    );
    let unit = syntactic(&tree);
    assert!(unit.contains(&format!("func (m User) {getter}() string {{")));
    assert!(unit.contains(&format!("func (m *User) {setter}(s string) {{")));
}

#[rstest]
fn generic_structs_use_instantiated_receivers() {
    let tree = GoTree::new().file(
        "models/box.go",
        "package models\n\ntype Box[K comparable, V any] struct {\n\titems map[K]V `getter:\"\" setter:\"\"`\n}\n",
    );
    let unit = syntactic(&tree);
    assert!(unit.contains("func (m Box[K, V]) Items() map[K]V {"));
    assert!(unit.contains("func (m *Box[K, V]) SetItems(s map[K]V) {"));
}

#[rstest]
fn duplicate_methods_are_rejected() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"Label\"`\n\ttitle string `getter:\"Label\"`\n}\n",
    );
    let err = generate(&tree, "models", options(ResolverMode::Syntactic, None))
        .expect_err("duplicate");
    assert!(matches!(err, GenerateError::DuplicateMethod { struct_name, method }
        if struct_name == "User" && method == "Label"));
}

#[rstest]
#[case("Name string `getter:\"\"`")]
#[case("name string `getter:\"Title\"`\n\tTitle string")]
fn methods_named_like_fields_are_rejected(#[case] fields: &str) {
    let tree = GoTree::new().file(
        "models/user.go",
        &format!("package models\n\ntype User struct {{\n\t{fields}\n}}\n"),
    );
    let err = generate(&tree, "models", options(ResolverMode::Syntactic, None))
        .expect_err("method shadows field");
    assert!(matches!(err, GenerateError::MethodNamesField { struct_name, .. }
        if struct_name == "User"));
}

#[rstest]
fn invalid_method_names_are_rejected() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `setter:\"1st\"`\n}\n",
    );
    let err = generate(&tree, "models", options(ResolverMode::Syntactic, None))
        .expect_err("invalid name");
    assert!(matches!(
        err,
        GenerateError::InvalidTag { struct_name, field, source: TagError::InvalidName { .. } }
            if struct_name == "User" && field == "name"
    ));
}

#[rstest]
fn rerunning_over_written_units_is_stable() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"\" setter:\"\"`\n}\n",
    );
    let dir = tree.path().join("models");
    let skip_generated: &FileFilter<'_> = &|file| !file.name.ends_with("_genaccessor.go");
    let generator = Generator::new(options(ResolverMode::Syntactic, None)).expect("generator");

    generator
        .run(&dir, Some(skip_generated), &mut DirSink::default())
        .expect("first run");
    let first = tree.read("models/models_genaccessor.go").expect("unit written");
    generator
        .run(&dir, Some(skip_generated), &mut DirSink::default())
        .expect("second run");
    assert_eq!(tree.read("models/models_genaccessor.go"), Some(first));
}

#[rstest]
fn structs_of_test_files_go_to_test_units() {
    let tree = GoTree::new()
        .file(
            "models/user.go",
            "package models\n\ntype User struct {\n\tname string `getter:\"\"`\n}\n",
        )
        .file(
            "models/user_test.go",
            "package models\n\ntype fixture struct {\n\tid int `getter:\"\"`\n}\n",
        )
        .file(
            "models/api_test.go",
            "package models_test\n\ntype client struct {\n\turl string `getter:\"\"`\n}\n",
        );
    let summary = Generator::new(options(ResolverMode::Syntactic, None))
        .expect("generator")
        .run(&tree.path().join("models"), None, &mut DirSink::default())
        .expect("run");
    assert_eq!(
        summary,
        RunSummary {
            packages: 2,
            units: 3,
            methods: 3,
        }
    );

    let unit = tree.read("models/models_genaccessor.go").expect("unit");
    assert!(unit.contains("func (m User) Name() string {"));
    assert!(!unit.contains("fixture"));
    let test_unit = tree.read("models/models_genaccessor_test.go").expect("test unit");
    assert!(test_unit.contains("package models\n"));
    assert!(test_unit.contains("func (m fixture) ID() int {"));
    let external = tree
        .read("models/models_test_genaccessor_test.go")
        .expect("external test unit");
    assert!(external.contains("package models_test\n"));
    assert!(external.contains("func (m client) URL() string {"));
    assert!(tree.read("models/models_test_genaccessor.go").is_none());
}

struct FailingWriter {
    closed: Rc<Cell<bool>>,
}

impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl UnitWriter for FailingWriter {
    fn close(self: Box<Self>) -> io::Result<()> {
        self.closed.set(true);
        Ok(())
    }
}

#[rstest]
fn writers_are_closed_when_writing_fails() {
    let tree = GoTree::new().file(
        "models/user.go",
        "package models\n\ntype User struct {\n\tname string `getter:\"\"`\n}\n",
    );
    let closed = Rc::new(Cell::new(false));
    let mut sink = |_: &UnitTarget<'_>| -> io::Result<Box<dyn UnitWriter>> {
        Ok(Box::new(FailingWriter {
            closed: Rc::clone(&closed),
        }))
    };
    let err = Generator::new(options(ResolverMode::Syntactic, None))
        .expect("generator")
        .run(&tree.path().join("models"), None, &mut sink)
        .expect_err("write failure");
    assert!(closed.get());
    assert!(matches!(err, GenerateError::Sink { package, .. } if package == "models"));
}
