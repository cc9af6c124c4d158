//! Loading and post-processing generated files.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Placeholder substituted for the generated header's self-include.
pub const HEADER_PLACEHOLDER: &str = "{{ header_path }}";

/// The kinds of file the tools generate for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    NanopbHeader,
    NanopbSource,
    CppHeader,
    CppSource,
    PythonModule,
}

impl ArtifactKind {
    /// File name pattern locating this kind in a workspace.
    ///
    /// The C++ patterns are loose: for a dotted schema name such as
    /// `foo.config.proto`, `*.c*` also matches `foo.config.pb.h`, and protoc
    /// writes the Python module to `foo/config_pb2.py`. Such schemas end in
    /// `AmbiguousArtifact` / `ArtifactNotFound` rather than a guessed file.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::NanopbHeader => "*.h",
            Self::NanopbSource => "*.c",
            Self::CppHeader => "*.h*",
            Self::CppSource => "*.c*",
            Self::PythonModule => "*.py",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NanopbHeader => write!(f, "nanopb header"),
            Self::NanopbSource => write!(f, "nanopb source"),
            Self::CppHeader => write!(f, "C++ header"),
            Self::CppSource => write!(f, "C++ source"),
            Self::PythonModule => write!(f, "Python module"),
        }
    }
}

/// A generated file read back from a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the workspace.
    pub name: String,
    pub content: String,
}

/// One generated file, tagged with what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub kind: ArtifactKind,
    pub content: String,
}

/// Regular files directly inside `dir` whose names match `pattern`, sorted.
pub fn files_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&escaped).join(pattern);
    let mut files = Vec::new();
    for entry in glob::glob(&full.to_string_lossy())? {
        let path = entry.map_err(io::Error::from)?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every file in `dir` matching `pattern`, in name order.
///
/// Zero matches is an error: a tool that exited cleanly must have produced
/// something, so an empty match means it failed without saying so.
pub fn load_generated_files(dir: &Path, pattern: &str) -> Result<Vec<GeneratedFile>> {
    let paths = files_matching(dir, pattern)?;
    if paths.is_empty() {
        return Err(Error::ArtifactNotFound {
            pattern: pattern.to_string(),
            dir: dir.to_path_buf(),
        });
    }

    paths
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::debug!("loaded {} ({} bytes)", name, content.len());
            Ok(GeneratedFile { name, content })
        })
        .collect()
}

/// Load the files for `kind` from `dir`.
pub fn load_artifacts(dir: &Path, kind: ArtifactKind) -> Result<Vec<GeneratedFile>> {
    load_generated_files(dir, kind.pattern())
}

/// Replace every `<base_name>.pb.h` in `source` with [`HEADER_PLACEHOLDER`].
///
/// Fails if the generated source never mentions that header, which means
/// the generator named its output differently than we predicted.
pub fn replace_self_include(source: &str, base_name: &str) -> Result<String> {
    let include = format!("{}.pb.h", base_name);
    if !source.contains(&include) {
        return Err(Error::SelfIncludeMissing { include });
    }
    Ok(source.replace(&include, HEADER_PLACEHOLDER))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    const SOURCE: &str = "/* Automatically generated nanopb constant definitions */\n\
        #include \"sensor.pb.h\"\n\
        PB_BIND(Reading, Reading, AUTO)\n";

    fn workspace_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), format!("// {}\n", name)).unwrap();
        }
        dir
    }

    #[test]
    fn test_substitution() {
        let out = replace_self_include(SOURCE, "sensor").unwrap();
        assert!(out.contains("#include \"{{ header_path }}\""));
        assert!(!out.contains("sensor.pb.h"));
        assert!(out.contains("PB_BIND(Reading, Reading, AUTO)"));
    }

    #[test]
    fn test_substitution_is_literal() {
        // `.` must not act as a wildcard.
        let source = "#include \"sensorXpbXh\"\n#include \"sensor.pb.h\"\n";
        let out = replace_self_include(source, "sensor").unwrap();
        assert_eq!(out, "#include \"sensorXpbXh\"\n#include \"{{ header_path }}\"\n");
    }

    #[test]
    fn test_missing_self_include() {
        let err = replace_self_include(SOURCE, "reading").unwrap_err();
        match err {
            Error::SelfIncludeMissing { include } => assert_eq!(include, "reading.pb.h"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_by_pattern() {
        let dir = workspace_with(&["sensor.pb", "sensor.pb.h", "sensor.pb.c"]);

        let headers = load_artifacts(dir.path(), ArtifactKind::NanopbHeader).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].name, "sensor.pb.h");
        assert_eq!(headers[0].content, "// sensor.pb.h\n");

        let sources = load_artifacts(dir.path(), ArtifactKind::NanopbSource).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "sensor.pb.c");
    }

    #[test]
    fn test_cpp_patterns() {
        let dir = workspace_with(&["sensor.pb.h", "sensor.pb.cc", "sensor_pb2.py"]);
        let headers = load_artifacts(dir.path(), ArtifactKind::CppHeader).unwrap();
        let sources = load_artifacts(dir.path(), ArtifactKind::CppSource).unwrap();
        let python = load_artifacts(dir.path(), ArtifactKind::PythonModule).unwrap();
        assert_eq!(headers[0].name, "sensor.pb.h");
        assert_eq!(sources[0].name, "sensor.pb.cc");
        assert_eq!(python[0].name, "sensor_pb2.py");
    }

    #[test]
    fn test_no_match_is_not_found() {
        let dir = workspace_with(&["sensor.pb"]);
        let err = load_artifacts(dir.path(), ArtifactKind::NanopbSource).unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound { ref pattern, .. } if pattern == "*.c"));
    }

    #[test]
    fn test_results_are_sorted_and_skip_directories() {
        let dir = workspace_with(&["b.pb.h", "a.pb.h"]);
        std::fs::create_dir(dir.path().join("dir.h")).unwrap();
        let names: Vec<_> = load_artifacts(dir.path(), ArtifactKind::NanopbHeader)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["a.pb.h", "b.pb.h"]);
    }

    #[test]
    fn test_dotted_schema_name_matches_loosely() {
        let dir = workspace_with(&["foo.config.pb.h", "foo.config.pb.cc"]);
        let names: Vec<_> = load_artifacts(dir.path(), ArtifactKind::CppSource)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["foo.config.pb.cc", "foo.config.pb.h"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_workspace_path_with_glob_characters() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("odd[1]*dir");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("x.py"), "").unwrap();
        assert_eq!(files_matching(&dir, "*.py").unwrap(), [dir.join("x.py")]);
    }

    #[test]
    fn proptest_substitution_leaves_other_text_alone() {
        fn test(prefix: String, suffix: String) {
            let source = format!("{}sensor.pb.h{}", prefix, suffix);
            let out = replace_self_include(&source, "sensor").unwrap();
            assert_eq!(out, format!("{}{}{}", prefix, HEADER_PLACEHOLDER, suffix));
        }

        // Stay clear of anything that could itself spell the include.
        let text = "[A-Za-z0-9 #\"<>(){};_\n]{0,40}";
        proptest!(|((prefix, suffix) in (text, text))| test(prefix, suffix))
    }
}
