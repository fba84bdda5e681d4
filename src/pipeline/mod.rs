//! Plugin pipeline.
//!
//! ```text
//! initialize ─▶ for each file: collect ─▶ analyze ─▶ module-link ─▶ package-link
//! ```
//!
//! Collect and analyze hooks run during a module-scope walk of each file; all
//! collect hooks finish before any analyze hook sees the same file. Module-link
//! hooks run once per file after analysis, package-link hooks once at the end.
//! Within a phase, plugins run in registration order.

mod context;
mod generator;
mod plugin;

pub use context::{FileContext, InitializeContext, ModuleLinkContext, PackageLinkContext};
pub use generator::{generate, Generator, GeneratorOptions};
pub use plugin::{Phase, Plugin};
