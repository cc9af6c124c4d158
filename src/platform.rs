//! Platform-specific naming and install layout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable naming the installation prefix.
pub const PREFIX_ENV: &str = "CONDA_PREFIX";

/// Operating systems we know how to drive the compilers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Result<Self> {
        match std::env::consts::OS {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Suffix appended to native executable names (`protoc`).
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "",
            Self::Windows => ".exe",
        }
    }

    /// Suffix appended to launcher script names (`nanopb_generator`).
    pub fn script_suffix(self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "",
            Self::Windows => ".bat",
        }
    }

    /// Directory holding the bundled nanopb headers and sources under `prefix`.
    pub fn nanopb_root(self, prefix: &Path) -> PathBuf {
        match self {
            Self::Linux | Self::Darwin => prefix.join("include").join("Arduino").join("nanopb"),
            Self::Windows => prefix
                .join("Library")
                .join("include")
                .join("Arduino")
                .join("nanopb"),
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    /// Parses an OS identifier as reported by `uname -s` style APIs.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Linux" => Ok(Self::Linux),
            "Darwin" => Ok(Self::Darwin),
            "Windows" => Ok(Self::Windows),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::Darwin => write!(f, "Darwin"),
            Self::Windows => write!(f, "Windows"),
        }
    }
}

pub fn resolve_executable_suffix(os: &str) -> Result<&'static str> {
    Ok(os.parse::<Platform>()?.executable_suffix())
}

pub fn resolve_script_suffix(os: &str) -> Result<&'static str> {
    Ok(os.parse::<Platform>()?.script_suffix())
}

pub fn resolve_include_root(prefix: impl AsRef<Path>, os: &str) -> Result<PathBuf> {
    Ok(os.parse::<Platform>()?.nanopb_root(prefix.as_ref()))
}

/// Everything platform-dependent needed to build an invocation.
///
/// Computed on demand and never cached, so tests can inject any identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub executable_suffix: &'static str,
    pub script_suffix: &'static str,
    /// Bundled nanopb directory, when an installation prefix is known.
    pub include_root: Option<PathBuf>,
}

impl PlatformProfile {
    /// Resolve the profile for an OS identifier and optional install prefix.
    pub fn resolve(os: &str, prefix: Option<&Path>) -> Result<Self> {
        Ok(Self::for_platform(os.parse()?, prefix))
    }

    pub fn for_platform(platform: Platform, prefix: Option<&Path>) -> Self {
        Self {
            platform,
            executable_suffix: platform.executable_suffix(),
            script_suffix: platform.script_suffix(),
            include_root: prefix.map(|prefix| platform.nanopb_root(prefix)),
        }
    }

    /// Resolve the profile of the running host, taking the prefix from
    /// [`PREFIX_ENV`].
    pub fn detect() -> Result<Self> {
        let prefix = std::env::var_os(PREFIX_ENV).map(PathBuf::from);
        Ok(Self::for_platform(Platform::current()?, prefix.as_deref()))
    }

    /// Name of the schema compiler executable, e.g. `protoc.exe`.
    pub fn protoc_name(&self) -> String {
        format!("protoc{}", self.executable_suffix)
    }

    /// Name of the generator launcher, e.g. `nanopb_generator.bat`.
    pub fn generator_name(&self) -> String {
        format!("nanopb_generator{}", self.script_suffix)
    }
}

/// Bundled nanopb C sources (`*.c*`) directly inside `root`, sorted.
pub fn nanopb_sources(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    crate::artifact::files_matching(root.as_ref(), "*.c*")
}
