//! Protoc and nanopb generator invocation utilities.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::{Error, Failure, Result, Tool};
use crate::platform::PlatformProfile;
use crate::process;
use crate::request::CompilationRequest;
use crate::workspace::Workspace;

/// Environment variable overriding the protoc executable.
pub const PROTOC_ENV: &str = "PROTOC";

/// Environment variable overriding the nanopb generator executable.
pub const GENERATOR_ENV: &str = "NANOPB_GENERATOR";

/// Python module name of the nanopb generator.
const GENERATOR_MODULE: &str = "nanopb_generator";

/// How the nanopb code generator is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    /// An executable or launcher script, e.g. `nanopb_generator.bat`.
    Script(PathBuf),
    /// `<interpreter> -m nanopb_generator`.
    PythonModule { interpreter: PathBuf },
}

impl Generator {
    fn command(&self, workspace: &Workspace) -> Command {
        match self {
            Self::Script(path) => workspace.command(path),
            Self::PythonModule { interpreter } => {
                let mut cmd = workspace.command(interpreter);
                cmd.arg("-m").arg(GENERATOR_MODULE);
                cmd
            }
        }
    }
}

/// Where protoc should put its output.
#[derive(Debug, Clone, Copy)]
pub enum SchemaOutput<'a> {
    /// A serialized `FileDescriptorSet` for the nanopb generator (`-o`).
    Descriptor(&'a Path),
    /// Google C++ and Python sources written into a directory.
    Google(&'a Path),
}

fn not_found(tool: Tool, name: &str) -> Error {
    Error::Compiler {
        tool,
        argv: vec![name.to_string()],
        failure: Failure::NotFound,
    }
}

/// Find the protoc executable.
///
/// An explicit path wins, then [`PROTOC_ENV`], then a `PATH` lookup of the
/// platform's executable name.
pub fn find_protoc(explicit: Option<&Path>, profile: &PlatformProfile) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(PROTOC_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        log::warn!("ignoring {}={}: no such file", PROTOC_ENV, path.display());
    }

    let name = profile.protoc_name();
    which::which(&name).map_err(|_| not_found(Tool::Protoc, &name))
}

/// Find the nanopb generator, with the same precedence as [`find_protoc`].
pub fn find_generator(
    explicit: Option<&Generator>,
    profile: &PlatformProfile,
) -> Result<Generator> {
    if let Some(generator) = explicit {
        return Ok(generator.clone());
    }

    if let Some(path) = std::env::var_os(GENERATOR_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Generator::Script(path));
        }
        log::warn!("ignoring {}={}: no such file", GENERATOR_ENV, path.display());
    }

    let name = profile.generator_name();
    which::which(&name)
        .map(Generator::Script)
        .map_err(|_| not_found(Tool::NanopbGenerator, &name))
}

/// `prefix` immediately followed by `path`, as a single argument.
fn joined_arg(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path);
    arg
}

/// Build `protoc -I<include> <schema> <output flags>`.
pub fn schema_compiler_command(
    workspace: &Workspace,
    protoc: &Path,
    schema: &Path,
    include_dir: &Path,
    output: SchemaOutput<'_>,
) -> Command {
    let mut cmd = workspace.command(protoc);
    cmd.arg(joined_arg("-I", include_dir)).arg(schema);
    match output {
        SchemaOutput::Descriptor(path) => {
            cmd.arg(joined_arg("-o", path));
        }
        SchemaOutput::Google(dir) => {
            cmd.arg(joined_arg("--python_out=", dir))
                .arg(joined_arg("--cpp_out=", dir));
        }
    }
    cmd
}

/// Build the generator invocation for a compiled descriptor.
pub fn code_generator_command(
    workspace: &Workspace,
    generator: &Generator,
    compiled_schema: &Path,
    options_file: Option<&Path>,
) -> Command {
    let mut cmd = generator.command(workspace);
    cmd.arg(compiled_schema);
    if let Some(options) = options_file {
        cmd.arg(joined_arg("-f", options));
    }
    cmd
}

/// Run protoc on the request's schema, resolving imports relative to the
/// schema's own directory.
pub fn invoke_schema_compiler(
    workspace: &Workspace,
    protoc: &Path,
    request: &CompilationRequest,
    output: SchemaOutput<'_>,
    timeout: Duration,
) -> Result<()> {
    let mut cmd = schema_compiler_command(
        workspace,
        protoc,
        request.schema_path(),
        request.include_dir(),
        output,
    );
    let out = process::run(Tool::Protoc, &mut cmd, timeout)?;
    if !out.is_empty() {
        log::debug!("protoc: {}", out.trim_end());
    }
    Ok(())
}

pub fn invoke_code_generator(
    workspace: &Workspace,
    generator: &Generator,
    compiled_schema: &Path,
    options_file: Option<&Path>,
    timeout: Duration,
) -> Result<()> {
    let mut cmd = code_generator_command(workspace, generator, compiled_schema, options_file);
    let out = process::run(Tool::NanopbGenerator, &mut cmd, timeout)?;
    if !out.is_empty() {
        log::debug!("nanopb_generator: {}", out.trim_end());
    }
    Ok(())
}
