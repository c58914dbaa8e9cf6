//! ConfigEnv trait for testable I/O.
//!
//! This module provides the `ConfigEnv` trait that abstracts file reads and
//! environment variable lookups, so passes and sources can be driven by an
//! in-memory [`MockEnv`] in tests instead of the real process environment.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Environment trait for configuration I/O operations.
///
/// # Example
///
/// ```ignore
/// // Production
/// stratum::load_all("config.toml", &mut config)?;  // Uses RealEnv
///
/// // Testing
/// let env = MockEnv::new()
///     .with_file("config.toml", "[server]\nport = 8080")
///     .with_env("APP_PORT", "9090");
/// stratum::load_all_with_env("config.toml", &mut config, &env)?;
/// ```
pub trait ConfigEnv: Send + Sync {
    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if:
    /// - File does not exist (`ErrorKind::NotFound`)
    /// - File is not valid UTF-8
    /// - Permission denied
    /// - Other I/O errors
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Get an environment variable by name.
    ///
    /// Returns `None` if the variable is not set.
    fn get_env(&self, name: &str) -> Option<String>;
}

/// Production environment using standard library I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl ConfigEnv for RealEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment variable view used by the environment pass.
///
/// Applies a name prefix and treats an empty value exactly like an unset
/// variable.
#[derive(Clone, Copy)]
pub struct EnvScope<'a> {
    env: &'a dyn ConfigEnv,
    prefix: &'a str,
}

impl<'a> EnvScope<'a> {
    /// Create a scope that looks names up verbatim.
    pub fn new(env: &'a dyn ConfigEnv) -> Self {
        Self { env, prefix: "" }
    }

    /// Create a scope that prepends `prefix` to every looked-up name.
    pub fn with_prefix(env: &'a dyn ConfigEnv, prefix: &'a str) -> Self {
        Self { env, prefix }
    }

    /// Full variable name for an `env` annotation.
    pub fn variable(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Look up a variable, returning `None` when it is unset or empty.
    pub fn lookup(&self, variable: &str) -> Option<String> {
        self.env.get_env(variable).filter(|value| !value.is_empty())
    }
}

/// Mock file state for testing.
#[derive(Debug, Clone)]
enum MockFile {
    Content(String),
    NotFound,
    PermissionDenied,
}

/// Mock environment for testing configuration loading.
///
/// # Example
///
/// ```
/// use stratum::env::MockEnv;
///
/// let env = MockEnv::new()
///     .with_file("config.toml", r#"
///         [database]
///         host = "localhost"
///         port = 5432
///     "#)
///     .with_env("APP_DATABASE_HOST", "prod-db.example.com")
///     .with_env("APP_LOG_LEVEL", "debug");
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    files: RwLock<HashMap<PathBuf, MockFile>>,
    env_vars: RwLock<HashMap<String, String>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a file that will return "not found" error.
    pub fn with_missing_file(self, path: impl Into<PathBuf>) -> Self {
        self.files_mut().insert(path.into(), MockFile::NotFound);
        self
    }

    /// Add a file that will return "permission denied" error.
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>) -> Self {
        self.files_mut()
            .insert(path.into(), MockFile::PermissionDenied);
        self
    }

    /// Set an environment variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        {
            let mut env_vars = self.env_vars_mut();
            for (k, v) in vars {
                env_vars.insert(k.into(), v.into());
            }
        }
        self
    }

    /// Replace a file's content after creation.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files_mut()
            .insert(path.into(), MockFile::Content(content.into()));
    }

    /// Remove a file from the mock environment.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files_mut().remove(path.as_ref());
    }

    /// Update an environment variable.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env_vars_mut().insert(name.into(), value.into());
    }

    /// Remove an environment variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars_mut().remove(name);
    }

    fn files_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<PathBuf, MockFile>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn env_vars_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        self.env_vars.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigEnv for MockEnv {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        match files.get(path) {
            Some(MockFile::Content(content)) => Ok(content.clone()),
            Some(MockFile::NotFound) | None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock file not found: {}", path.display()),
            )),
            Some(MockFile::PermissionDenied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            )),
        }
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_env_reads_manifest() {
        let env = RealEnv::new();
        // Cargo.toml should exist in the project root
        let content = env.read_file(Path::new("Cargo.toml")).unwrap();
        assert!(content.contains("[package]"));

        let err = env.read_file(Path::new("nonexistent.toml")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_env_files() {
        let env = MockEnv::new()
            .with_file("config.toml", "host = \"localhost\"")
            .with_file("other.toml", "port = 8080");

        let content = env.read_file(Path::new("config.toml")).unwrap();
        assert_eq!(content, "host = \"localhost\"");
        assert!(env.read_file(Path::new("other.toml")).is_ok());
    }

    #[test]
    fn test_mock_env_missing_file() {
        let env = MockEnv::new().with_missing_file("gone.toml");

        let result = env.read_file(Path::new("gone.toml"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);

        let result = env.read_file(Path::new("never-registered.toml"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_env_permission_denied() {
        let env = MockEnv::new().with_unreadable_file("secret.toml");

        let result = env.read_file(Path::new("secret.toml"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_mock_env_vars() {
        let env = MockEnv::new()
            .with_env("APP_HOST", "localhost")
            .with_envs([("APP_PORT", "8080"), ("OTHER_VAR", "value")]);

        assert_eq!(env.get_env("APP_HOST"), Some("localhost".to_string()));
        assert_eq!(env.get_env("APP_PORT"), Some("8080".to_string()));
        assert_eq!(env.get_env("OTHER_VAR"), Some("value".to_string()));
        assert_eq!(env.get_env("MISSING"), None);
    }

    #[test]
    fn test_mock_env_mutations() {
        let env = MockEnv::new()
            .with_file("config.toml", "original")
            .with_env("VAR", "original");

        env.set_file("config.toml", "modified");
        assert_eq!(env.read_file(Path::new("config.toml")).unwrap(), "modified");

        env.set_env("VAR", "modified");
        assert_eq!(env.get_env("VAR"), Some("modified".to_string()));

        env.remove_file("config.toml");
        assert!(env.read_file(Path::new("config.toml")).is_err());

        env.remove_env("VAR");
        assert_eq!(env.get_env("VAR"), None);
    }

    #[test]
    fn test_scope_treats_empty_as_unset() {
        let env = MockEnv::new().with_env("EMPTY", "").with_env("SET", "1");
        let scope = EnvScope::new(&env);

        assert_eq!(scope.lookup("EMPTY"), None);
        assert_eq!(scope.lookup("MISSING"), None);
        assert_eq!(scope.lookup("SET"), Some("1".to_string()));
    }

    #[test]
    fn test_scope_prefix() {
        let env = MockEnv::new().with_env("APP_PORT", "8080");
        let scope = EnvScope::with_prefix(&env, "APP_");

        let variable = scope.variable("PORT");
        assert_eq!(variable, "APP_PORT");
        assert_eq!(scope.lookup(&variable), Some("8080".to_string()));
    }
}
