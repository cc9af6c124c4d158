//! Configuration for driving protoc and the nanopb generator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::{NanopbOutput, PbOutput};
use crate::platform::PlatformProfile;
use crate::protoc::Generator;
use crate::request::CompilationRequest;

/// Default limit on how long a single tool invocation may run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a compilation.
///
/// Anything left unset is discovered from the environment when a
/// compilation runs: the host platform, then `PROTOC` / `NANOPB_GENERATOR`,
/// then a `PATH` lookup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the protoc executable.
    pub(crate) protoc_path: Option<PathBuf>,

    /// How to launch the nanopb generator.
    pub(crate) generator: Option<Generator>,

    /// Per-invocation timeout.
    pub(crate) timeout: Duration,

    /// Platform override; detected from the host when unset.
    pub(crate) platform: Option<PlatformProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protoc_path: None,
            generator: None,
            timeout: DEFAULT_TIMEOUT,
            platform: None,
        }
    }
}

impl Config {
    /// Create a new Config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set path to the protoc executable.
    pub fn protoc_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.protoc_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set how the nanopb generator is launched.
    pub fn generator(&mut self, generator: Generator) -> &mut Self {
        self.generator = Some(generator);
        self
    }

    /// Kill any tool that runs longer than `timeout`.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Use `profile` instead of detecting the host platform.
    pub fn platform(&mut self, profile: PlatformProfile) -> &mut Self {
        self.platform = Some(profile);
        self
    }

    pub(crate) fn profile(&self) -> crate::Result<PlatformProfile> {
        match &self.platform {
            Some(profile) => Ok(profile.clone()),
            None => PlatformProfile::detect(),
        }
    }

    /// Compile a schema to nanopb "plain C" code.
    pub fn compile_nanopb(&self, request: &CompilationRequest) -> crate::Result<NanopbOutput> {
        crate::compile::compile_nanopb(self, request)
    }

    /// Compile a schema to Google protobuf C++ and Python code.
    pub fn compile_pb(&self, request: &CompilationRequest) -> crate::Result<PbOutput> {
        crate::compile::compile_pb(self, request)
    }
}
