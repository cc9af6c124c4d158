//! `nanopb-helpers` drives `protoc` and the nanopb code generator to turn
//! `.proto` schemas into nanopb C, Google C++ and Python sources.
//!
//! Every compilation runs in its own temporary directory that is removed
//! before the call returns. Generated code comes back as strings; nothing is
//! written anywhere the caller can see.
//!
//! # Example
//!
//! ```rust,no_run
//! fn main() -> Result<(), nanopb_helpers::Error> {
//!     let output = nanopb_helpers::compile_nanopb("proto/sensor.proto", None::<&str>)?;
//!     std::fs::write("sensor.pb.h", &output.header)?;
//!     std::fs::write("sensor.pb.c", output.render_source("sensor.pb.h"))?;
//!     Ok(())
//! }
//! ```
//!
//! # Header placeholder
//!
//! The nanopb source includes its own header. That include is replaced with
//! the literal token `{{ header_path }}` so the header can live anywhere in
//! the consuming build; use [`NanopbOutput::render_source`] to fill it in.
//!
//! # Advanced Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use nanopb_helpers::{CompilationRequest, Config, Generator};
//!
//! fn main() -> Result<(), nanopb_helpers::Error> {
//!     let request = CompilationRequest::new("proto/sensor.proto")?
//!         .with_options_file("proto/sensor.options")?;
//!     let output = Config::new()
//!         .protoc_path("/opt/protobuf/bin/protoc")
//!         .generator(Generator::PythonModule { interpreter: "python3".into() })
//!         .timeout(Duration::from_secs(30))
//!         .compile_nanopb(&request)?;
//!     println!("{}", output.header);
//!     Ok(())
//! }
//! ```

mod asserts;
pub mod artifact;
mod compile;
mod config;
mod error;
pub mod output;
pub mod platform;
mod process;
pub mod protoc;
mod request;
pub mod workspace;

pub use artifact::{ArtifactKind, CompiledArtifact, HEADER_PLACEHOLDER};
pub use config::{Config, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorCategory, Failure, Result, Tool};
pub use output::{CppOutput, NanopbOutput, PbOutput};
pub use platform::{Platform, PlatformProfile};
pub use protoc::Generator;
pub use request::CompilationRequest;

use std::path::Path;

/// Compile a schema to nanopb code with default settings.
///
/// # Arguments
/// * `schema` - Path to the `.proto` file
/// * `options_file` - Optional nanopb generator options file
pub fn compile_nanopb(
    schema: impl AsRef<Path>,
    options_file: Option<impl AsRef<Path>>,
) -> Result<NanopbOutput> {
    let mut request = CompilationRequest::new(schema)?;
    if let Some(options) = options_file {
        request = request.with_options_file(options)?;
    }
    Config::new().compile_nanopb(&request)
}

/// Compile a schema to Google protobuf C++ and Python with default settings.
pub fn compile_pb(schema: impl AsRef<Path>) -> Result<PbOutput> {
    Config::new().compile_pb(&CompilationRequest::new(schema)?)
}
