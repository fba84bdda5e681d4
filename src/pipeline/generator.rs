//! The analysis run: initialize, per-file collect/analyze/module-link, then
//! package-link.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, info};

use super::context::{
    FileContext, InitializeContext, ModuleLinkContext, PackageLinkContext, Shared,
};
use super::plugin::{Phase, Plugin};
use crate::analysis::{walk, WalkOptions};
use crate::error::{AnalyzerError, Result};
use crate::manifest::{Module, Package};
use crate::parser::SourceFile;
use crate::plugins::{default_plugins, Framework};
use crate::resolve::{DeclarationIndex, ImportTable, ManifestSlot, Manifests, ResolveFn, Resolver};

#[derive(Clone, Default)]
pub struct GeneratorOptions {
    /// Verbose logging of intermediate state.
    pub dev: bool,
    pub framework: Framework,
    /// Custom import resolution, consulted before the built-in rules.
    pub resolve: Option<Arc<ResolveFn>>,
    /// Already-built manifests of dependencies, searched after the package itself.
    pub third_party: Vec<Package>,
}

impl fmt::Debug for GeneratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorOptions")
            .field("dev", &self.dev)
            .field("framework", &self.framework)
            .field("resolve", &self.resolve.is_some())
            .field("third_party", &self.third_party.len())
            .finish()
    }
}

/// Runs plugins over a set of parsed files to produce one package document.
#[derive(Debug)]
pub struct Generator {
    plugins: Vec<Plugin>,
    options: GeneratorOptions,
}

impl Generator {
    /// A generator with the default plugin set for `options.framework`.
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            plugins: default_plugins(options.framework),
            options,
        }
    }

    /// A generator with no plugins at all.
    pub fn empty(options: GeneratorOptions) -> Self {
        Self {
            plugins: Vec::new(),
            options,
        }
    }

    /// Append a plugin; it runs after every plugin already registered.
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Analyze `files` in order.
    pub fn generate(&mut self, files: &[SourceFile]) -> Result<Package> {
        let dev = self.options.dev;
        let mut package = Package::new();
        let resolver = Resolver::new(
            files.iter().map(|f| f.path.clone()),
            self.options.resolve.clone(),
        );

        for plugin in self.plugins.iter_mut() {
            if let Some(hook) = plugin.initialize.as_mut() {
                let mut ctx = InitializeContext {
                    manifest: &mut package,
                    options: &self.options,
                };
                hook(&mut ctx).map_err(|e| AnalyzerError::plugin(&plugin.name, e))?;
            }
        }

        let third_party = self.options.third_party.as_slice();
        let mut index = DeclarationIndex::default();
        for (i, manifest) in third_party.iter().enumerate() {
            index.insert_package(ManifestSlot::ThirdParty(i), manifest);
        }

        let mut imports = ImportTable::default();
        for file in files {
            debug!(path = %file.path, "analyzing module");
            imports.reset();
            let mut module_doc = Module::new(&file.path);
            {
                let shared = Shared {
                    resolver: &resolver,
                    manifests: Manifests::new(&package, third_party),
                    index: &index,
                    dev,
                };
                for phase in [Phase::Collect, Phase::Analyze] {
                    run_node_phase(
                        &mut self.plugins,
                        phase,
                        file,
                        &shared,
                        &mut module_doc,
                        &mut imports,
                    )?;
                }
            }

            package.modules.push(module_doc);
            let module_idx = package.modules.len() - 1;
            index.insert_module(ManifestSlot::Primary, module_idx, &package.modules[module_idx]);

            for plugin in self.plugins.iter_mut() {
                if let Some(hook) = plugin.module_link_phase.as_mut() {
                    let mut ctx = ModuleLinkContext::new(
                        &mut package.modules[module_idx],
                        file,
                        &resolver,
                        dev,
                    );
                    hook(&mut ctx).map_err(|e| AnalyzerError::plugin(&plugin.name, e))?;
                }
            }
            if dev {
                debug!(
                    path = %file.path,
                    declarations = package.modules[module_idx].declarations.len(),
                    exports = package.modules[module_idx].exports.len(),
                    "module linked"
                );
            }
        }

        for plugin in self.plugins.iter_mut() {
            if let Some(hook) = plugin.package_link_phase.as_mut() {
                let mut ctx = PackageLinkContext::new(&mut package, third_party, dev);
                hook(&mut ctx).map_err(|e| AnalyzerError::plugin(&plugin.name, e))?;
            }
        }

        info!(modules = package.modules.len(), "manifest generated");
        Ok(package)
    }
}

/// Walk the module scope of `file` once, calling every plugin's hook for
/// `phase` on each node.
fn run_node_phase(
    plugins: &mut [Plugin],
    phase: Phase,
    file: &SourceFile,
    shared: &Shared<'_>,
    module_doc: &mut Module,
    imports: &mut ImportTable,
) -> Result<()> {
    if !plugins.iter().any(|p| p.has_phase(phase)) {
        return Ok(());
    }

    let ast = &file.ast;
    let flow = walk(ast, ast.root(), WalkOptions::module_scope(), |node| {
        for plugin in plugins.iter_mut() {
            let hook = match phase {
                Phase::Collect => plugin.collect_phase.as_mut(),
                Phase::Analyze => plugin.analyze_phase.as_mut(),
                _ => None,
            };
            let Some(hook) = hook else {
                continue;
            };
            let mut ctx = FileContext::new(file, node, shared, &mut *module_doc, &mut *imports);
            if let Err(err) = hook(&mut ctx) {
                return ControlFlow::Break(AnalyzerError::plugin(&plugin.name, err));
            }
        }
        ControlFlow::Continue(())
    });

    match flow {
        ControlFlow::Break(err) => Err(err),
        ControlFlow::Continue(()) => Ok(()),
    }
}

/// Analyze `files` with the default plugins for `options`.
pub fn generate(files: &[SourceFile], options: GeneratorOptions) -> Result<Package> {
    Generator::new(options).generate(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc as StdArc, Mutex};

    fn files(sources: &[(&str, &str)]) -> Vec<SourceFile> {
        sources
            .iter()
            .map(|(path, src)| SourceFile::parse(*path, *src).unwrap())
            .collect()
    }

    #[test]
    fn test_phase_order() {
        let log = StdArc::new(Mutex::new(Vec::<String>::new()));
        let record = |log: &StdArc<Mutex<Vec<String>>>, entry: &'static str| {
            let log = log.clone();
            move || log.lock().unwrap().push(entry.to_string())
        };

        let init = record(&log, "initialize");
        let collect = record(&log, "collect");
        let analyze = record(&log, "analyze");
        let module_link = record(&log, "module-link");
        let package_link = record(&log, "package-link");
        let plugin = Plugin::new("recorder")
            .on_initialize(move |_| {
                init();
                Ok(())
            })
            .on_collect(move |ctx| {
                if ctx.node() == ctx.ast().root() {
                    collect();
                }
                Ok(())
            })
            .on_analyze(move |ctx| {
                if ctx.node() == ctx.ast().root() {
                    analyze();
                }
                Ok(())
            })
            .on_module_link(move |_| {
                module_link();
                Ok(())
            })
            .on_package_link(move |_| {
                package_link();
                Ok(())
            });

        let mut generator = Generator::empty(GeneratorOptions::default()).with_plugin(plugin);
        generator
            .generate(&files(&[("a.js", "1;"), ("b.js", "2;")]))
            .unwrap();

        let log = log.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                "initialize",
                "collect",
                "analyze",
                "module-link",
                "collect",
                "analyze",
                "module-link",
                "package-link"
            ]
        );
    }

    #[test]
    fn test_plugin_error_aborts_with_plugin_name() {
        let plugin = Plugin::new("exploding").on_analyze(|_| Err(anyhow::anyhow!("kaboom")));
        let mut generator = Generator::empty(GeneratorOptions::default()).with_plugin(plugin);
        let err = generator.generate(&files(&[("a.js", "1;")])).unwrap_err();
        assert_eq!(err.plugin_name(), Some("exploding"));
        assert!(err.to_string().contains("kaboom"));
    }

    #[test]
    fn test_earlier_modules_visible_to_later_files() {
        let seen = StdArc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let plugin = Plugin::new("peek")
            .on_analyze(move |ctx| {
                if ctx.node() == ctx.ast().root() {
                    let found = ctx
                        .resolve_declaration("A", None, "a.js")
                        .is_some();
                    sink.lock().unwrap().push(found);
                }
                Ok(())
            });
        let mut generator = Generator::new(GeneratorOptions::default()).with_plugin(plugin);
        generator
            .generate(&files(&[("a.js", "export class A {}"), ("b.js", "1;")]))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn test_empty_input_produces_empty_package() {
        let package = generate(&[], GeneratorOptions::default()).unwrap();
        assert!(package.modules.is_empty());
        assert_eq!(package.schema_version, "1.0.0");
    }
}
