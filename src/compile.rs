//! The compilation pipelines: resolve tools, run them in a scratch
//! workspace, and read their output back into memory.

use crate::artifact::{self, ArtifactKind, CompiledArtifact};
use crate::config::Config;
use crate::output::{self, NanopbOutput, PbOutput};
use crate::protoc::{self, SchemaOutput};
use crate::request::CompilationRequest;
use crate::workspace::{with_scoped_workspace, Workspace};
use crate::Result;

/// Name prefix for the temporary workspaces.
const WORKSPACE_PREFIX: &str = "nanopb";

fn load(workspace: &Workspace, kind: ArtifactKind) -> Result<CompiledArtifact> {
    let files = artifact::load_artifacts(workspace.path(), kind)?;
    output::single(workspace.path(), kind, files)
}

/// schema -> descriptor (protoc) -> C (nanopb generator).
pub fn compile_nanopb(config: &Config, request: &CompilationRequest) -> Result<NanopbOutput> {
    let profile = config.profile()?;
    let protoc = protoc::find_protoc(config.protoc_path.as_deref(), &profile)?;
    let generator = protoc::find_generator(config.generator.as_ref(), &profile)?;

    log::info!("compiling {} for nanopb", request.schema_path().display());
    let output = with_scoped_workspace(WORKSPACE_PREFIX, |workspace| {
        let descriptor = workspace
            .path()
            .join(format!("{}.pb", request.base_name()));
        protoc::invoke_schema_compiler(
            workspace,
            &protoc,
            request,
            SchemaOutput::Descriptor(&descriptor),
            config.timeout,
        )?;
        protoc::invoke_code_generator(
            workspace,
            &generator,
            &descriptor,
            request.options_file(),
            config.timeout,
        )?;

        let header = load(workspace, ArtifactKind::NanopbHeader)?;
        let mut source = load(workspace, ArtifactKind::NanopbSource)?;
        source.content = artifact::replace_self_include(&source.content, request.base_name())?;
        Ok(NanopbOutput::assemble(header, source))
    })?;
    log::info!("compiled {}", request.schema_path().display());
    Ok(output)
}

/// schema -> C++ and Python (protoc alone).
pub fn compile_pb(config: &Config, request: &CompilationRequest) -> Result<PbOutput> {
    let profile = config.profile()?;
    let protoc = protoc::find_protoc(config.protoc_path.as_deref(), &profile)?;

    log::info!("compiling {} for C++/Python", request.schema_path().display());
    let output = with_scoped_workspace(WORKSPACE_PREFIX, |workspace| {
        protoc::invoke_schema_compiler(
            workspace,
            &protoc,
            request,
            SchemaOutput::Google(workspace.path()),
            config.timeout,
        )?;

        let python = load(workspace, ArtifactKind::PythonModule)?;
        let header = load(workspace, ArtifactKind::CppHeader)?;
        let source = load(workspace, ArtifactKind::CppSource)?;
        Ok(PbOutput::assemble(python, header, source))
    })?;
    log::info!("compiled {}", request.schema_path().display());
    Ok(output)
}
