//! cem-analyzer - custom elements manifest analyzer.
//!
//! Walks JavaScript and TypeScript syntax trees, extracts metadata about
//! classes, custom elements and exports, resolves references across modules
//! and packages, applies inheritance and emits a custom elements manifest
//! (schema `1.0.0`).
//!
//! # Architecture
//!
//! - `parser`: tree-sitter parsing and lowering into the arena [`Ast`]
//! - `analysis`: the syntax tree model and its walker
//! - `jsdoc`: comment tokenizing and attachment
//! - `resolve`: import resolution and declaration lookup
//! - `pipeline`: the plugin contract and the [`Generator`]
//! - `plugins`: built-in analysis and post-processing plugins
//! - `inheritance`, `bundle`: whole-document algorithms
//! - `manifest`: the output document model
//! - `config`, `cli`, `report`: the `cem` command
//!
//! # Example
//!
//! ```no_run
//! use cem_analyzer::{generate, GeneratorOptions, SourceFile};
//!
//! let file = SourceFile::parse(
//!     "src/my-el.js",
//!     "export class MyEl extends HTMLElement {}\ncustomElements.define('my-el', MyEl);",
//! )?;
//! let package = generate(&[file], GeneratorOptions::default())?;
//! println!("{}", package.to_json_pretty()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod bundle;
pub mod cli;
pub mod collate;
pub mod config;
pub mod error;
pub mod inheritance;
pub mod jsdoc;
pub mod manifest;
pub mod parser;
pub mod pipeline;
pub mod plugins;
pub mod report;
pub mod resolve;

pub use analysis::Ast;
pub use bundle::{bundle, merge_custom_elements_manifests, PackageSources};
pub use config::Config;
pub use error::{AnalyzerError, Result};
pub use inheritance::apply_inheritance;
pub use manifest::Package;
pub use parser::SourceFile;
pub use pipeline::{generate, Generator, GeneratorOptions, Plugin};
pub use plugins::{create_class, default_plugins, Framework};
