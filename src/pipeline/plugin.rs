//! Plugin capability records.
//!
//! A plugin is a name plus up to five optional phase hooks. Hooks are boxed
//! closures so plugins can keep state between calls (e.g. a counter for
//! anonymous classes) without a trait object per plugin.

use std::fmt;

use super::context::{FileContext, InitializeContext, ModuleLinkContext, PackageLinkContext};

pub type InitializeHook = Box<dyn FnMut(&mut InitializeContext<'_>) -> anyhow::Result<()> + Send>;
pub type NodeHook = Box<dyn FnMut(&mut FileContext<'_>) -> anyhow::Result<()> + Send>;
pub type ModuleLinkHook = Box<dyn FnMut(&mut ModuleLinkContext<'_>) -> anyhow::Result<()> + Send>;
pub type PackageLinkHook = Box<dyn FnMut(&mut PackageLinkContext<'_>) -> anyhow::Result<()> + Send>;

/// Pipeline phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Collect,
    Analyze,
    ModuleLink,
    PackageLink,
}

pub struct Plugin {
    pub name: String,
    pub(crate) initialize: Option<InitializeHook>,
    pub(crate) collect_phase: Option<NodeHook>,
    pub(crate) analyze_phase: Option<NodeHook>,
    pub(crate) module_link_phase: Option<ModuleLinkHook>,
    pub(crate) package_link_phase: Option<PackageLinkHook>,
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("phases", &self.phases())
            .finish()
    }
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialize: None,
            collect_phase: None,
            analyze_phase: None,
            module_link_phase: None,
            package_link_phase: None,
        }
    }

    pub fn on_initialize(
        mut self,
        hook: impl FnMut(&mut InitializeContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.initialize = Some(Box::new(hook));
        self
    }

    /// Called for every module-scope node, before any analyze hook sees the file.
    pub fn on_collect(
        mut self,
        hook: impl FnMut(&mut FileContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.collect_phase = Some(Box::new(hook));
        self
    }

    pub fn on_analyze(
        mut self,
        hook: impl FnMut(&mut FileContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.analyze_phase = Some(Box::new(hook));
        self
    }

    pub fn on_module_link(
        mut self,
        hook: impl FnMut(&mut ModuleLinkContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.module_link_phase = Some(Box::new(hook));
        self
    }

    pub fn on_package_link(
        mut self,
        hook: impl FnMut(&mut PackageLinkContext<'_>) -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        self.package_link_phase = Some(Box::new(hook));
        self
    }

    /// Phases this plugin participates in.
    pub fn phases(&self) -> Vec<Phase> {
        [
            (Phase::Initialize, self.initialize.is_some()),
            (Phase::Collect, self.collect_phase.is_some()),
            (Phase::Analyze, self.analyze_phase.is_some()),
            (Phase::ModuleLink, self.module_link_phase.is_some()),
            (Phase::PackageLink, self.package_link_phase.is_some()),
        ]
        .into_iter()
        .filter_map(|(phase, present)| present.then_some(phase))
        .collect()
    }

    pub fn has_phase(&self, phase: Phase) -> bool {
        self.phases().contains(&phase)
    }
}
