//! Error types for the analyzer.

use std::path::PathBuf;

/// Errors surfaced by the analyzer.
///
/// Resolution misses are not errors: lookups return `None` and the affected field
/// stays unresolved.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// A plugin hook failed; the whole run is aborted.
    #[error("plugin \"{plugin}\" failed: {source:#}")]
    PluginExecution {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// A class inherits from itself, directly or transitively.
    #[error("cyclic inheritance for class `{class}`: {}", .chain.join(" -> "))]
    CyclicInheritance { class: String, chain: Vec<String> },

    /// The syntax tree for a source file could not be produced.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Wrap a hook error with the name of the plugin that raised it.
    pub fn plugin(name: &str, source: anyhow::Error) -> Self {
        AnalyzerError::PluginExecution {
            plugin: name.to_string(),
            source,
        }
    }

    /// The plugin name, for plugin execution errors.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            AnalyzerError::PluginExecution { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
