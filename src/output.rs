//! Target-shaped compilation results.

use std::path::Path;

use crate::artifact::{ArtifactKind, CompiledArtifact, GeneratedFile, HEADER_PLACEHOLDER};
use crate::error::{Error, Result};

/// Output of a nanopb compilation.
///
/// `source` includes its header through [`HEADER_PLACEHOLDER`] instead of a
/// concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NanopbOutput {
    pub header: String,
    pub source: String,
}

impl NanopbOutput {
    pub fn assemble(header: CompiledArtifact, source: CompiledArtifact) -> Self {
        debug_assert_eq!(header.kind, ArtifactKind::NanopbHeader);
        debug_assert_eq!(source.kind, ArtifactKind::NanopbSource);
        Self {
            header: header.content,
            source: source.content,
        }
    }

    /// The source with its header included from `header_path`.
    pub fn render_source(&self, header_path: &str) -> String {
        self.source.replace(HEADER_PLACEHOLDER, header_path)
    }
}

/// A C++ header/source pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppOutput {
    pub header: String,
    pub source: String,
}

/// Output of a Google protobuf compilation: Python plus C++.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbOutput {
    pub python: String,
    pub cpp: CppOutput,
}

impl PbOutput {
    pub fn assemble(
        python: CompiledArtifact,
        header: CompiledArtifact,
        source: CompiledArtifact,
    ) -> Self {
        debug_assert_eq!(python.kind, ArtifactKind::PythonModule);
        debug_assert_eq!(header.kind, ArtifactKind::CppHeader);
        debug_assert_eq!(source.kind, ArtifactKind::CppSource);
        Self {
            python: python.content,
            cpp: CppOutput {
                header: header.content,
                source: source.content,
            },
        }
    }
}

/// Take the single file loaded for `kind`.
///
/// The schema name only hints at what the tools will call their output, so
/// more than one match is reported rather than guessed between.
pub fn single(
    dir: &Path,
    kind: ArtifactKind,
    mut files: Vec<GeneratedFile>,
) -> Result<CompiledArtifact> {
    match files.len() {
        1 => {
            let file = files.remove(0);
            Ok(CompiledArtifact {
                kind,
                content: file.content,
            })
        }
        0 => Err(Error::ArtifactNotFound {
            pattern: kind.pattern().to_string(),
            dir: dir.to_path_buf(),
        }),
        _ => Err(Error::AmbiguousArtifact {
            pattern: kind.pattern().to_string(),
            candidates: files.into_iter().map(|file| file.name).collect(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn file(name: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_single() {
        let artifact = single(
            Path::new("/ws"),
            ArtifactKind::NanopbHeader,
            vec![file("sensor.pb.h", "#define PB_SENSOR")],
        )
        .unwrap();
        assert_eq!(artifact.kind, ArtifactKind::NanopbHeader);
        assert_eq!(artifact.content, "#define PB_SENSOR");
    }

    #[test]
    fn test_ambiguous() {
        let err = single(
            Path::new("/ws"),
            ArtifactKind::CppHeader,
            vec![file("a.pb.h", ""), file("b.pb.h", "")],
        )
        .unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"expected one file matching `*.h*`, found: a.pb.h, b.pb.h");
    }

    #[test]
    fn test_empty_is_not_found() {
        let err = single(Path::new("/ws"), ArtifactKind::PythonModule, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_render_source() {
        let output = NanopbOutput::assemble(
            CompiledArtifact {
                kind: ArtifactKind::NanopbHeader,
                content: "/* header */".into(),
            },
            CompiledArtifact {
                kind: ArtifactKind::NanopbSource,
                content: "#include \"{{ header_path }}\"\n".into(),
            },
        );
        assert_eq!(
            output.render_source("proto/sensor.pb.h"),
            "#include \"proto/sensor.pb.h\"\n"
        );
        assert_eq!(output.header, "/* header */");
    }

    #[test]
    fn test_pb_shape() {
        let artifact = |kind, content: &str| CompiledArtifact {
            kind,
            content: content.into(),
        };
        let output = PbOutput::assemble(
            artifact(ArtifactKind::PythonModule, "DESCRIPTOR = None"),
            artifact(ArtifactKind::CppHeader, "class Reading;"),
            artifact(ArtifactKind::CppSource, "Reading::Reading() {}"),
        );
        assert_eq!(output.python, "DESCRIPTOR = None");
        assert_eq!(output.cpp.header, "class Reading;");
        assert_eq!(output.cpp.source, "Reading::Reading() {}");
    }
}
