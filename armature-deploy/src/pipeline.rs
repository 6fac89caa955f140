//! The ordered processor pipeline.

use crate::processors::{
    ComponentClassLoadingProcessor, ComponentInstallProcessor, DeploymentUnitProcessor,
    InterceptorInstallProcessor, LifecycleAnnotationParsingProcessor,
    ResourceInjectionInstallProcessor,
};
use crate::unit::{DeploymentPhaseContext, DeploymentUnit};
use armature_core::{DeploymentSettings, Result, ServiceTarget};

/// Runs the stages in order over one deployment unit.
///
/// Stages run sequentially and synchronously; the first error aborts the
/// unit with no rollback. Components within the unit are processed in list
/// order by every stage, so side effects into the shared service target have
/// a consistent order.
pub struct ProcessorPipeline {
    processors: Vec<Box<dyn DeploymentUnitProcessor>>,
    settings: DeploymentSettings,
}

impl ProcessorPipeline {
    /// The standard five-stage pipeline with default settings.
    pub fn new() -> Self {
        Self::with_settings(DeploymentSettings::default())
    }

    pub fn with_settings(settings: DeploymentSettings) -> Self {
        Self {
            processors: vec![
                Box::new(ComponentClassLoadingProcessor),
                Box::new(LifecycleAnnotationParsingProcessor),
                Box::new(ResourceInjectionInstallProcessor::default()),
                Box::new(InterceptorInstallProcessor),
                Box::new(ComponentInstallProcessor::default()),
            ],
            settings,
        }
    }

    /// A pipeline with explicit stages, for embedding custom processors.
    pub fn from_processors(
        processors: Vec<Box<dyn DeploymentUnitProcessor>>,
        settings: DeploymentSettings,
    ) -> Self {
        Self {
            processors,
            settings,
        }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn run(&self, unit: &mut DeploymentUnit, target: &ServiceTarget) -> Result<()> {
        tracing::info!(
            "Deploying unit '{}' through {} stage(s)",
            unit.name(),
            self.processors.len()
        );
        for processor in &self.processors {
            let span = tracing::debug_span!("deploy", stage = processor.name());
            let _enter = span.enter();
            tracing::debug!("Running '{}'", processor.name());
            let mut ctx = DeploymentPhaseContext::new(unit, target);
            if let Err(e) = processor.deploy(&mut ctx) {
                tracing::error!(
                    "Deployment of unit '{}' failed in stage '{}': {}",
                    unit.name(),
                    processor.name(),
                    e
                );
                return Err(e);
            }
        }

        if self.settings.eager_validation {
            target.validate()?;
        }
        tracing::info!(
            "Deployment of unit '{}' complete, {} service(s) installed",
            unit.name(),
            target.len()
        );
        Ok(())
    }
}

impl Default for ProcessorPipeline {
    fn default() -> Self {
        Self::new()
    }
}
