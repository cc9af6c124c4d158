//! Command-line front end: compile a schema and write the generated files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nanopb_helpers::platform::{self, PREFIX_ENV};
use nanopb_helpers::{CompilationRequest, Config, DEFAULT_TIMEOUT, Generator, PlatformProfile};

#[derive(Debug, Parser)]
#[command(version, about = "Compile .proto schemas with protoc and nanopb")]
struct Cli {
    /// protoc executable (default: $PROTOC, then PATH)
    #[arg(long, global = true)]
    protoc: Option<PathBuf>,

    /// nanopb generator executable or script (default: $NANOPB_GENERATOR, then PATH)
    #[arg(long, global = true, conflicts_with = "python")]
    generator: Option<PathBuf>,

    /// Run the generator as `<PYTHON> -m nanopb_generator` instead
    #[arg(long, global = true)]
    python: Option<PathBuf>,

    /// Kill a tool that runs longer than this
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Log each tool invocation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate nanopb `<name>.pb.h` and `<name>.pb.c`
    Nanopb {
        schema: PathBuf,
        /// nanopb options file
        #[arg(long)]
        options: Option<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        /// Include path written into the source in place of the placeholder
        #[arg(long)]
        header_path: Option<String>,
    },
    /// Generate Google C++ (`.pb.h`, `.pb.cc`) and Python (`_pb2.py`) code
    Pb {
        schema: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Show the platform profile and bundled nanopb sources
    Paths {
        /// Installation prefix (default: $CONDA_PREFIX)
        #[arg(long)]
        prefix: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new();
        config.timeout(Duration::from_secs(self.timeout_secs));
        if let Some(protoc) = &self.protoc {
            config.protoc_path(protoc);
        }
        if let Some(generator) = &self.generator {
            config.generator(Generator::Script(generator.clone()));
        }
        if let Some(interpreter) = &self.python {
            config.generator(Generator::PythonModule {
                interpreter: interpreter.clone(),
            });
        }
        config
    }
}

fn write(dir: &Path, name: &str, content: &str) -> nanopb_helpers::Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn run(cli: &Cli) -> nanopb_helpers::Result<()> {
    match &cli.command {
        Command::Nanopb {
            schema,
            options,
            out_dir,
            header_path,
        } => {
            let mut request = CompilationRequest::new(schema)?;
            if let Some(options) = options {
                request = request.with_options_file(options)?;
            }
            let output = cli.config().compile_nanopb(&request)?;

            let base = request.base_name();
            let source = match header_path {
                Some(header_path) => output.render_source(header_path),
                None => output.source.clone(),
            };
            std::fs::create_dir_all(out_dir)?;
            write(out_dir, &format!("{}.pb.h", base), &output.header)?;
            write(out_dir, &format!("{}.pb.c", base), &source)?;
        }
        Command::Pb { schema, out_dir } => {
            let request = CompilationRequest::new(schema)?;
            let output = cli.config().compile_pb(&request)?;

            let base = request.base_name();
            std::fs::create_dir_all(out_dir)?;
            write(out_dir, &format!("{}.pb.h", base), &output.cpp.header)?;
            write(out_dir, &format!("{}.pb.cc", base), &output.cpp.source)?;
            write(out_dir, &format!("{}_pb2.py", base), &output.python)?;
        }
        Command::Paths { prefix } => {
            let mut profile = PlatformProfile::detect()?;
            if let Some(prefix) = prefix {
                profile = PlatformProfile::for_platform(profile.platform, Some(prefix.as_path()));
            }
            println!("platform:     {}", profile.platform);
            println!("protoc:       {}", profile.protoc_name());
            println!("generator:    {}", profile.generator_name());
            match &profile.include_root {
                Some(root) => {
                    println!("nanopb root:  {}", root.display());
                    for source in platform::nanopb_sources(root)? {
                        println!("  {}", source.display());
                    }
                }
                None => println!("nanopb root:  (set {} or pass --prefix)", PREFIX_ENV),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error ({}): {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}
