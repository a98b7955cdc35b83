//! Lifecycle plugin chain.
//!
//! Phases execute in a fixed global order; plugins within a phase execute in
//! declaration order because later plugins may depend on earlier plugins'
//! output. Modeling the hooks as an explicit phase enum plus an ordered list
//! of polymorphic plugins keeps the ordering auditable and testable without
//! the bundling engine.

use crate::context::BuildContext;
use crate::Result;

/// Build phases, in execution order. Module-graph construction happens
/// between `PreBuild` and `ContentGeneration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    /// Cleaning the output tree and pre-bundle source preparation. Must
    /// complete fully before any artifact is staged.
    PreBuild,
    /// Artifact production from the module graph: extraction, vendor
    /// copies, template rendering.
    ContentGeneration,
    /// After the output tree is written: manifest emission, reporting.
    PostEmit,
}

impl LifecyclePhase {
    /// All phases, in execution order.
    pub const ORDER: [LifecyclePhase; 3] = [
        LifecyclePhase::PreBuild,
        LifecyclePhase::ContentGeneration,
        LifecyclePhase::PostEmit,
    ];
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecyclePhase::PreBuild => write!(f, "pre-build"),
            LifecyclePhase::ContentGeneration => write!(f, "content-generation"),
            LifecyclePhase::PostEmit => write!(f, "post-emit"),
        }
    }
}

/// A build-phase hook contributing to or reshaping the artifact set.
pub trait LifecyclePlugin {
    fn name(&self) -> &'static str;

    /// The phase this plugin acts in.
    fn phase(&self) -> LifecyclePhase;

    /// Called when the plugin's phase executes.
    fn on(&self, phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()>;
}

/// Ordered chain of lifecycle plugins.
///
/// Declaration order is preserved; `run_phase` dispatches only to plugins
/// registered for that phase.
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<Box<dyn LifecyclePlugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: LifecyclePlugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Box::new(plugin));
    }

    pub fn add_boxed(&mut self, plugin: Box<dyn LifecyclePlugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names registered for a phase, in execution order.
    pub fn names_for(&self, phase: LifecyclePhase) -> Vec<&'static str> {
        self.plugins
            .iter()
            .filter(|p| p.phase() == phase)
            .map(|p| p.name())
            .collect()
    }

    /// Run every plugin registered for `phase`, in declaration order,
    /// stopping at the first failure.
    pub fn run_phase(&self, phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        for plugin in self.plugins.iter().filter(|p| p.phase() == phase) {
            tracing::debug!(plugin = plugin.name(), %phase, "running lifecycle plugin");
            plugin.on(phase, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::bindings::ExternalBindings;
    use crate::bundler::BundleJob;
    use crate::manifest::Manifest;
    use crate::mode::BuildMode;
    use crate::output::{OutputLayout, OutputPlanner};
    use crate::version::VersionTag;

    fn test_context() -> BuildContext {
        let tag = VersionTag::new("abc1234").unwrap();
        let planner = OutputPlanner::new(
            BuildMode::Development,
            tag.clone(),
            OutputLayout::new("/tmp/out", "/static"),
        );
        let job = BundleJob {
            mode: BuildMode::Development,
            context_dir: "/tmp/src".into(),
            entries: Vec::new(),
            externals: ExternalBindings::new(),
        };
        let manifest = Manifest::new(BuildMode::Development, tag);
        BuildContext::new(planner, job, manifest)
    }

    struct Recorder {
        name: &'static str,
        phase: LifecyclePhase,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl LifecyclePlugin for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn phase(&self) -> LifecyclePhase {
            self.phase
        }

        fn on(&self, _phase: LifecyclePhase, _ctx: &mut BuildContext) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    #[test]
    fn phases_are_ordered() {
        assert!(LifecyclePhase::PreBuild < LifecyclePhase::ContentGeneration);
        assert!(LifecyclePhase::ContentGeneration < LifecyclePhase::PostEmit);
        assert_eq!(LifecyclePhase::ORDER.len(), 3);
    }

    #[test]
    fn run_phase_respects_declaration_order_and_phase() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = PluginChain::new();
        chain.add(Recorder { name: "clean", phase: LifecyclePhase::PreBuild, log: log.clone() });
        chain.add(Recorder {
            name: "extract",
            phase: LifecyclePhase::ContentGeneration,
            log: log.clone(),
        });
        chain.add(Recorder {
            name: "template",
            phase: LifecyclePhase::ContentGeneration,
            log: log.clone(),
        });

        let mut ctx = test_context();
        for phase in LifecyclePhase::ORDER {
            chain.run_phase(phase, &mut ctx).unwrap();
        }
        assert_eq!(*log.lock().unwrap(), ["clean", "extract", "template"]);
        assert_eq!(chain.names_for(LifecyclePhase::ContentGeneration), ["extract", "template"]);
    }

    #[test]
    fn failure_stops_the_phase() {
        struct Failing;
        impl LifecyclePlugin for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn phase(&self) -> LifecyclePhase {
                LifecyclePhase::PreBuild
            }
            fn on(&self, _: LifecyclePhase, _: &mut BuildContext) -> Result<()> {
                Err(crate::Error::InvalidConfig("boom".into()))
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = PluginChain::new();
        chain.add(Failing);
        chain.add(Recorder { name: "after", phase: LifecyclePhase::PreBuild, log: log.clone() });

        let mut ctx = test_context();
        assert!(chain.run_phase(LifecyclePhase::PreBuild, &mut ctx).is_err());
        assert!(log.lock().unwrap().is_empty());
    }
}
