//! Compiler configuration.
//!
//! One immutable [`Config`] is built by the front end and handed to the bundle,
//! which passes it to every pass. Nothing in the compiler reads process-wide
//! settings.

use std::collections::BTreeMap;
use std::fmt;

/// Environment the output is meant to run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    #[default]
    Browser,
    NodeJs,
    Worker,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Browser => "browser",
            Target::NodeJs => "nodejs",
            Target::Worker => "worker",
        };
        f.write_str(name)
    }
}

/// Settings observed throughout the pipeline.
///
/// # Example
///
/// ```
/// use wtscript_core::{Config, Target};
///
/// let config = Config::new()
///     .compact(true)
///     .with_target(Target::NodeJs)
///     .with_define("DEBUG", "false");
///
/// assert!(config.compact);
/// assert_eq!(config.defines.get("DEBUG").map(String::as_str), Some("false"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Minified identifiers and whitespace-free output.
    pub compact: bool,
    pub target: Target,
    /// Run unused-declaration detection during the usage pass.
    pub check_unused: bool,
    /// Command line defines, emitted as string constants in key order.
    pub defines: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compact: false,
            target: Target::default(),
            check_unused: true,
            defines: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn check_unused(mut self, check: bool) -> Self {
        self.check_unused = check;
        self
    }

    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    /// Newline used by the emitter.
    pub fn newline(&self) -> &'static str {
        if self.compact { "" } else { "\n" }
    }

    /// One level of indentation used by the emitter.
    pub fn indent(&self) -> &'static str {
        if self.compact { "" } else { "  " }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(!config.compact);
        assert!(config.check_unused);
        assert_eq!(config.target, Target::Browser);
        assert!(config.defines.is_empty());
    }

    #[test]
    fn defines_are_ordered() {
        let config = Config::new().with_define("b", "2").with_define("a", "1");
        let keys: Vec<_> = config.defines.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn whitespace_follows_compact() {
        assert_eq!(Config::new().newline(), "\n");
        assert_eq!(Config::new().compact(true).newline(), "");
        assert_eq!(Config::new().compact(true).indent(), "");
    }

    #[test]
    fn target_display() {
        assert_eq!(Target::NodeJs.to_string(), "nodejs");
    }
}
