//! Runtime environment inspection.
//!
//! Conditions need the version of the runtime the tests will execute on.
//! [`JavaRuntime`] asks the `java` launcher; [`FixedRuntime`] returns a
//! configured value and is what `runtime.version` in `quarry.toml` maps to.

use std::process::Command;
use std::sync::OnceLock;

use tracing::debug;

/// Errors raised while inspecting the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not report a runtime version")]
    NotReported { command: String },
}

/// Source of the current runtime version string.
pub trait RuntimeEnvironment: Send + Sync {
    /// The raw version string, e.g. `"11.0.2"` or `"1.8.0_292"`.
    fn current_version(&self) -> Result<String, RuntimeError>;
}

impl<T: RuntimeEnvironment + ?Sized> RuntimeEnvironment for &T {
    fn current_version(&self) -> Result<String, RuntimeError> {
        (**self).current_version()
    }
}

impl<T: RuntimeEnvironment + ?Sized> RuntimeEnvironment for Box<T> {
    fn current_version(&self) -> Result<String, RuntimeError> {
        (**self).current_version()
    }
}

/// A runtime whose version is known up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRuntime {
    version: String,
}

impl FixedRuntime {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl RuntimeEnvironment for FixedRuntime {
    fn current_version(&self) -> Result<String, RuntimeError> {
        Ok(self.version.clone())
    }
}

/// Detects the version reported by a `java` launcher.
///
/// The launcher is run at most once successfully; the result is cached for
/// the lifetime of this value.
#[derive(Debug)]
pub struct JavaRuntime {
    command: String,
    detected: OnceLock<String>,
}

impl JavaRuntime {
    /// Use the given launcher command (e.g. `"java"` or a full path).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            detected: OnceLock::new(),
        }
    }

    fn detect(&self) -> Result<String, RuntimeError> {
        let output = Command::new(&self.command)
            .arg("-XshowSettings:properties")
            .arg("-version")
            .output()
            .map_err(|source| RuntimeError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // The launcher prints settings and the banner on stderr.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let version = parse_version_output(&stderr).ok_or_else(|| RuntimeError::NotReported {
            command: self.command.clone(),
        })?;
        debug!(command = %self.command, %version, "Detected runtime version");
        Ok(version)
    }
}

impl RuntimeEnvironment for JavaRuntime {
    fn current_version(&self) -> Result<String, RuntimeError> {
        if let Some(version) = self.detected.get() {
            return Ok(version.clone());
        }
        let version = self.detect()?;
        Ok(self.detected.get_or_init(|| version).clone())
    }
}

/// Pull the version out of `java -XshowSettings:properties -version` output.
///
/// Prefers the `java.version = ...` property line and falls back to the
/// quoted version in the banner (`openjdk version "11.0.2" 2019-01-15`).
pub fn parse_version_output(output: &str) -> Option<String> {
    let from_property = output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("java.version = ")
            .map(|v| v.trim().to_string())
    });
    if from_property.as_deref().is_some_and(|v| !v.is_empty()) {
        return from_property;
    }

    output.lines().find_map(|line| {
        if !line.contains(" version \"") {
            return None;
        }
        let start = line.find('"')? + 1;
        let end = start + line[start..].find('"')?;
        let version = line[start..end].trim();
        (!version.is_empty()).then(|| version.to_string())
    })
}
