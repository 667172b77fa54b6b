//! Destinations for generated units.
//!
//! The pipeline asks a [`UnitSink`] for one [`UnitWriter`] per unit with
//! content, writes the formatted unit once and always closes the writer. A
//! package has up to two units: one for structs of ordinary files and one
//! for structs of `_test.go` files.

use std::io::{self, Write};

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File, OpenOptions};

use crate::loader::Package;

/// Output file name used by [`DirSink::default`].
pub const DEFAULT_OUTPUT_PATTERN: &str = "{package}_genaccessor.go";

/// A writer for one generated unit.
pub trait UnitWriter: Write {
    /// Finishes the unit. Called exactly once, after the write, whether or
    /// not the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while flushing or persisting the unit.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// The unit a writer is opened for.
#[derive(Debug, Clone, Copy)]
pub struct UnitTarget<'a> {
    /// Package the unit belongs to.
    pub package: &'a Package,
    /// Set when the unit holds accessors of structs declared in `_test.go`
    /// files. Such a unit must itself be a `_test.go` file.
    pub test: bool,
}

/// Opens writers for units.
pub trait UnitSink {
    /// Opens the writer for `target`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating the destination.
    fn open<'s>(&'s mut self, target: &UnitTarget<'_>) -> io::Result<Box<dyn UnitWriter + 's>>;
}

impl<F> UnitSink for F
where
    F: FnMut(&UnitTarget<'_>) -> io::Result<Box<dyn UnitWriter>>,
{
    fn open<'s>(&'s mut self, target: &UnitTarget<'_>) -> io::Result<Box<dyn UnitWriter + 's>> {
        self(target)
    }
}

/// `name` with `_test` inserted before its `.go` extension.
///
/// ```
/// use genaccessor::sink::test_file_name;
///
/// assert_eq!(test_file_name("models_genaccessor.go"), "models_genaccessor_test.go");
/// ```
#[must_use]
pub fn test_file_name(name: &str) -> String {
    let stem = name.strip_suffix(".go").unwrap_or(name);
    format!("{stem}_test.go")
}

/// Writes each unit into its package directory.
///
/// A unit is written to a hidden staging file and renamed over the
/// destination when its writer closes, so a failed write leaves any previous
/// unit in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSink {
    pattern: String,
}

impl DirSink {
    /// Names output files after `pattern`, with `{package}` replaced by the
    /// package name.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// File name the unit of `package_name` is written to; test units get
    /// the [`test_file_name`] of it.
    #[must_use]
    pub fn file_name(&self, package_name: &str, test: bool) -> String {
        let name = self.pattern.replace("{package}", package_name);
        if test { test_file_name(&name) } else { name }
    }
}

impl Default for DirSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATTERN)
    }
}

/// A unit file being staged by a [`DirSink`].
#[derive(Debug)]
struct FileWriter {
    dir: Dir,
    file: File,
    staging: String,
    destination: String,
    failed: bool,
}

impl FileWriter {
    fn create(dir: Dir, destination: String) -> io::Result<Self> {
        let staging = format!(".{destination}.tmp");
        let file = dir.open_with(
            &staging,
            OpenOptions::new().write(true).create(true).truncate(true),
        )?;
        Ok(Self {
            dir,
            file,
            staging,
            destination,
            failed: false,
        })
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf).inspect_err(|_| self.failed = true)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush().inspect_err(|_| self.failed = true)
    }
}

impl UnitWriter for FileWriter {
    fn close(self: Box<Self>) -> io::Result<()> {
        let Self {
            dir,
            mut file,
            staging,
            destination,
            failed,
        } = *self;
        let synced = file.flush().and_then(|()| file.sync_all());
        drop(file);
        if failed || synced.is_err() {
            return synced.and(dir.remove_file(&staging));
        }
        dir.rename(&staging, &dir, &destination)
    }
}

impl UnitSink for DirSink {
    fn open<'s>(&'s mut self, target: &UnitTarget<'_>) -> io::Result<Box<dyn UnitWriter + 's>> {
        let dir = Dir::open_ambient_dir(&target.package.dir, ambient_authority())?;
        let destination = self.file_name(&target.package.name, target.test);
        Ok(Box::new(FileWriter::create(dir, destination)?))
    }
}

/// A unit captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Package name.
    pub package: String,
    /// Package directory.
    pub dir: Utf8PathBuf,
    /// Whether this is the package's test unit.
    pub test: bool,
    /// Unit text.
    pub contents: String,
}

/// Keeps closed units in memory, in the order they were written.
#[derive(Debug, Default)]
pub struct MemorySink {
    units: Vec<GeneratedUnit>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Units closed so far.
    #[must_use]
    pub fn units(&self) -> &[GeneratedUnit] {
        &self.units
    }

    /// Consumes the sink, returning its units.
    #[must_use]
    pub fn into_units(self) -> Vec<GeneratedUnit> {
        self.units
    }
}

struct MemoryWriter<'s> {
    units: &'s mut Vec<GeneratedUnit>,
    package: String,
    dir: Utf8PathBuf,
    test: bool,
    buf: Vec<u8>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl UnitWriter for MemoryWriter<'_> {
    fn close(self: Box<Self>) -> io::Result<()> {
        let Self {
            units,
            package,
            dir,
            test,
            buf,
        } = *self;
        let contents =
            String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        units.push(GeneratedUnit {
            package,
            dir,
            test,
            contents,
        });
        Ok(())
    }
}

impl UnitSink for MemorySink {
    fn open<'s>(&'s mut self, target: &UnitTarget<'_>) -> io::Result<Box<dyn UnitWriter + 's>> {
        Ok(Box::new(MemoryWriter {
            units: &mut self.units,
            package: target.package.name.clone(),
            dir: target.package.dir.clone(),
            test: target.test,
            buf: Vec::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for unit sinks.

    use super::*;
    use rstest::rstest;
    use test_helpers::gotree::GoTree;

    fn package(dir: Utf8PathBuf) -> Package {
        Package {
            name: "models".to_owned(),
            dir,
            files: Vec::new(),
        }
    }

    const fn target(package: &Package, test: bool) -> UnitTarget<'_> {
        UnitTarget { package, test }
    }

    fn entries(tree: &GoTree, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(tree.path().join(dir))
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[rstest]
    fn dir_sink_writes_next_to_sources() {
        let tree = GoTree::new().file("models/user.go", "package models\n");
        let pkg = package(tree.path().join("models"));
        let mut sink = DirSink::default();
        let mut writer = sink.open(&target(&pkg, false)).expect("open");
        writer.write_all(b"package models\n").expect("write");
        writer.close().expect("close");
        assert_eq!(
            tree.read("models/models_genaccessor.go").as_deref(),
            Some("package models\n")
        );
        assert_eq!(entries(&tree, "models"), vec!["models_genaccessor.go", "user.go"]);
    }

    #[rstest]
    #[case("{package}_genaccessor.go", false, "models_genaccessor.go")]
    #[case("{package}_genaccessor.go", true, "models_genaccessor_test.go")]
    #[case("accessors.go", true, "accessors_test.go")]
    #[case("{package}_accessors", true, "models_accessors_test.go")]
    fn test_units_get_test_file_names(
        #[case] pattern: &str,
        #[case] test: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(DirSink::new(pattern).file_name("models", test), expected);
    }

    #[rstest]
    fn dir_sink_replaces_previous_output_on_close() {
        let tree = GoTree::new().file("m/m_gen.go", "stale content that is longer\n");
        let pkg = Package {
            name: "m".to_owned(),
            dir: tree.path().join("m"),
            files: Vec::new(),
        };
        let mut sink = DirSink::new("{package}_gen.go");
        let mut writer = sink.open(&target(&pkg, false)).expect("open");
        writer.write_all(b"fresh\n").expect("write");
        assert_eq!(
            tree.read("m/m_gen.go").as_deref(),
            Some("stale content that is longer\n")
        );
        writer.close().expect("close");
        assert_eq!(tree.read("m/m_gen.go").as_deref(), Some("fresh\n"));
        assert_eq!(entries(&tree, "m"), vec!["m_gen.go"]);
    }

    #[rstest]
    fn failed_writes_keep_previous_output() {
        let tree = GoTree::new().file("m/m_gen.go", "previous\n");
        let dir = Dir::open_ambient_dir(tree.path().join("m"), ambient_authority()).expect("dir");
        let mut writer = FileWriter::create(dir, "m_gen.go".to_owned()).expect("create");
        writer.write_all(b"partial").expect("write");
        writer.failed = true;
        Box::new(writer).close().expect("close");
        assert_eq!(tree.read("m/m_gen.go").as_deref(), Some("previous\n"));
        assert_eq!(entries(&tree, "m"), vec!["m_gen.go"]);
    }

    #[rstest]
    fn memory_sink_records_closed_units() {
        let pkg = package("pkg".into());
        let mut sink = MemorySink::new();
        let mut writer = sink.open(&target(&pkg, true)).expect("open");
        writer.write_all(b"package models\n").expect("write");
        writer.close().expect("close");
        assert_eq!(
            sink.into_units(),
            vec![GeneratedUnit {
                package: "models".to_owned(),
                dir: "pkg".into(),
                test: true,
                contents: "package models\n".to_owned(),
            }]
        );
    }

    #[rstest]
    fn closures_act_as_sinks() {
        struct Discard;
        impl Write for Discard {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl UnitWriter for Discard {
            fn close(self: Box<Self>) -> io::Result<()> {
                Ok(())
            }
        }

        let pkg = package("pkg".into());
        let mut opened = Vec::new();
        let mut sink = |target: &UnitTarget<'_>| -> io::Result<Box<dyn UnitWriter>> {
            opened.push((target.package.name.clone(), target.test));
            Ok(Box::new(Discard))
        };
        let writer = UnitSink::open(&mut sink, &target(&pkg, false)).expect("open");
        writer.close().expect("close");
        assert_eq!(opened, vec![("models".to_owned(), false)]);
    }

    #[rstest]
    fn missing_directory_fails_to_open() {
        let tree = GoTree::new();
        let pkg = package(tree.path().join("absent"));
        let mut sink = DirSink::default();
        assert!(sink.open(&target(&pkg, false)).is_err());
    }
}
