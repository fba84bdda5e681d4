//! Command-line interface for the custom elements manifest analyzer.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::{debug, info};

use crate::bundle::{bundle, merge_custom_elements_manifests, PackageSources};
use crate::config::{self, Config, CONFIG_FILE_NAMES};
use crate::manifest::Package;
use crate::parser;
use crate::pipeline::{Generator, GeneratorOptions};
use crate::plugins::Framework;
use crate::report::{self, Summary};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Custom elements manifest analyzer.
///
/// Extracts custom element metadata (tag names, attributes, properties,
/// events, slots, CSS parts and custom properties) from JavaScript and
/// TypeScript sources and writes a `custom-elements.json` manifest.
#[derive(Parser)]
#[command(name = "cem")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging of intermediate analysis state
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a package and write custom-elements.json
    Analyze(AnalyzeArgs),
    /// Analyze several packages and fold them into one manifest
    Bundle(BundleArgs),
    /// Merge two finished manifests
    Merge(MergeArgs),
    /// Create a configuration file from a template
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Package directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Globs of source files to analyze (overrides the config file)
    #[arg(long, num_args = 1..)]
    pub globs: Vec<String>,

    /// Globs of files to skip (added to the config file's)
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Output directory, relative to the package directory
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable the Lit plugins
    #[arg(long)]
    pub litelement: bool,

    /// Set the customElements field of package.json
    #[arg(long)]
    pub packagejson: bool,

    /// Print the manifest instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of file configuration.
    fn apply(&self, config: &mut Config, dev: bool) {
        if !self.globs.is_empty() {
            config.globs = self.globs.clone();
        }
        config.exclude.extend(self.exclude.iter().cloned());
        if let Some(outdir) = &self.outdir {
            config.outdir = Some(outdir.clone());
        }
        config.dev |= dev;
        config.litelement |= self.litelement;
        config.packagejson |= self.packagejson;
    }
}

/// A package to bundle: `NAME=DIR[:ENTRY]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArg {
    pub name: String,
    pub dir: PathBuf,
    pub entrypoint: Option<String>,
}

pub fn parse_package_arg(s: &str) -> Result<PackageArg, String> {
    let (name, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DIR[:ENTRY], got {s:?}"))?;
    if name.is_empty() {
        return Err("package name must not be empty".to_string());
    }
    let (dir, entrypoint) = match rest.split_once(':') {
        Some((dir, entry)) if !entry.is_empty() => (dir, Some(entry.to_string())),
        Some((dir, _)) => (dir, None),
        None => (rest, None),
    };
    if dir.is_empty() {
        return Err(format!("package {name:?} has no directory"));
    }
    Ok(PackageArg {
        name: name.to_string(),
        dir: PathBuf::from(dir),
        entrypoint,
    })
}

/// Arguments for the bundle command.
#[derive(Parser)]
pub struct BundleArgs {
    /// Package to include, as NAME=DIR[:ENTRY]; repeat for each package
    #[arg(long = "package", value_parser = parse_package_arg, required = true)]
    pub packages: Vec<PackageArg>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Enable the Lit plugins
    #[arg(long)]
    pub litelement: bool,
}

/// Arguments for the merge command.
#[derive(Parser)]
pub struct MergeArgs {
    /// First manifest
    pub first: PathBuf,

    /// Second manifest; its modules win on path collisions
    pub second: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = CONFIG_FILE_NAMES[0])]
    pub output: PathBuf,
}

const CONFIG_TEMPLATE: &str = include_str!("templates/config.yaml");

fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::discover(root),
    };
    match path {
        Some(path) => {
            debug!(config = %path.display(), "loading configuration");
            Ok(Config::parse_file(&path)?)
        }
        None => Ok(Config::default()),
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs, dev: bool) -> anyhow::Result<i32> {
    let root = &args.path;
    if !root.is_dir() {
        eprintln!("Error: not a directory: {}", root.display());
        return Ok(EXIT_ERROR);
    }

    let mut config = load_config(root, args.config.as_deref())?;
    args.apply(&mut config, dev);
    config::validate(&config)?;

    let files = config.discover_files(root)?;
    if files.is_empty() {
        eprintln!("Warning: no source files matched");
    }
    let sources = parser::parse_files(root, &files)?;
    let package = Generator::new(config.generator_options(root)).generate(&sources)?;

    if args.stdout {
        print!("{}", report::to_json(&package)?);
        return Ok(EXIT_SUCCESS);
    }

    let outdir = match &config.outdir {
        Some(outdir) => root.join(outdir),
        None => root.clone(),
    };
    let written = report::write_manifest(&outdir, &package)?;
    if config.packagejson {
        let relative = parser::module_path(root, &written);
        if report::update_package_json(root, &relative)? {
            info!(manifest = %relative, "updated package.json");
        }
    }

    report::write_pretty(
        &root.display().to_string(),
        &Summary::of(&package),
        Some(&written),
    );
    Ok(EXIT_SUCCESS)
}

/// Run the bundle command.
pub fn run_bundle(args: &BundleArgs, dev: bool) -> anyhow::Result<i32> {
    let mut packages = Vec::with_capacity(args.packages.len());
    for arg in &args.packages {
        let config = load_config(&arg.dir, None)?;
        let files = config.discover_files(&arg.dir)?;
        let sources = parser::parse_files(&arg.dir, &files)?;
        let mut package = PackageSources::new(arg.name.clone(), sources);
        if let Some(entrypoint) = &arg.entrypoint {
            package = package.with_entrypoint(entrypoint.clone());
        }
        packages.push(package);
    }

    let options = GeneratorOptions {
        dev,
        framework: if args.litelement {
            Framework::Lit
        } else {
            Framework::Vanilla
        },
        ..GeneratorOptions::default()
    };
    let bundled = bundle(&packages, &options)?;
    write_output(args.outfile.as_deref(), &bundled)
}

/// Run the merge command.
pub fn run_merge(args: &MergeArgs) -> anyhow::Result<i32> {
    let first = read_manifest(&args.first)?;
    let second = read_manifest(&args.second)?;
    let merged = merge_custom_elements_manifests(&first, &second)?;
    write_output(args.outfile.as_deref(), &merged)
}

fn read_manifest(path: &Path) -> anyhow::Result<Package> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Package::from_json(&text).with_context(|| format!("invalid manifest {}", path.display()))
}

fn write_output(outfile: Option<&Path>, package: &Package) -> anyhow::Result<i32> {
    let json = report::to_json(package)?;
    match outfile {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            println!("{} {}", "✓ Wrote".green(), path.display());
        }
        None => print!("{json}"),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&args.output, CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: cem analyze");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_arg() {
        assert_eq!(
            parse_package_arg("my-lib=packages/lib:src/index.js").unwrap(),
            PackageArg {
                name: "my-lib".into(),
                dir: PathBuf::from("packages/lib"),
                entrypoint: Some("src/index.js".into()),
            }
        );
        assert_eq!(parse_package_arg("a=dir").unwrap().entrypoint, None);
        assert!(parse_package_arg("no-equals").is_err());
        assert!(parse_package_arg("=dir").is_err());
        assert!(parse_package_arg("a=").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "cem",
            "analyze",
            "pkg",
            "--globs",
            "src/**/*.js",
            "--litelement",
            "--dev",
        ])
        .unwrap();
        assert!(cli.dev);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.path, PathBuf::from("pkg"));
        assert_eq!(args.globs, vec!["src/**/*.js"]);
        assert!(args.litelement);

        let cli = Cli::try_parse_from(["cem", "bundle", "--package", "a=x", "--package", "b=y:i.js"])
            .unwrap();
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle");
        };
        assert_eq!(args.packages.len(), 2);

        assert!(Cli::try_parse_from(["cem", "bundle"]).is_err());
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let args = AnalyzeArgs {
            path: PathBuf::from("."),
            globs: Vec::new(),
            exclude: vec!["extra/**".into()],
            outdir: Some(PathBuf::from("out")),
            config: None,
            litelement: true,
            packagejson: false,
            stdout: false,
        };
        let mut config = Config {
            globs: vec!["src/**/*.ts".into()],
            exclude: vec!["src/gen/**".into()],
            packagejson: true,
            ..Config::default()
        };
        args.apply(&mut config, true);
        assert_eq!(config.globs, vec!["src/**/*.ts"]);
        assert_eq!(config.exclude, vec!["src/gen/**", "extra/**"]);
        assert_eq!(config.outdir, Some(PathBuf::from("out")));
        assert!(config.dev && config.litelement && config.packagejson);
    }
}
