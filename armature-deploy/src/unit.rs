//! Deployment unit, typed attachments, and the per-phase context.
//!
//! Attachments are put-new-only: writing a key twice is a deployment error.
//! A later stage may read what an earlier stage produced but never replaces
//! it.

use armature_core::{
    ComponentConfiguration, DeployError, Result, ServiceTarget, TypeRegistry,
};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed key into a unit's attachment map.
pub struct AttachmentKey<T: 'static> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> AttachmentKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The type registry for the unit's module, attached before the pipeline runs.
pub const TYPE_REGISTRY: AttachmentKey<Arc<TypeRegistry>> = AttachmentKey::new("type registry");

/// The component configurations produced by the discovery phase.
pub const COMPONENTS: AttachmentKey<Vec<ComponentConfiguration>> =
    AttachmentKey::new("component configurations");

/// Put-new-only typed map.
#[derive(Default)]
pub struct Attachments {
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under the key; fails if the key is already occupied.
    pub fn attach<T: Any + Send + Sync>(&mut self, key: &AttachmentKey<T>, value: T) -> Result<()> {
        if self.values.contains_key(key.name) {
            return Err(DeployError::AttachmentAlreadySet(key.name));
        }
        self.values.insert(key.name, Box::new(value));
        Ok(())
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &AttachmentKey<T>) -> Option<&T> {
        self.values.get(key.name).and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self, key: &AttachmentKey<T>) -> Option<&mut T> {
        self.values.get_mut(key.name).and_then(|v| v.downcast_mut())
    }

    pub fn expect<T: Any + Send + Sync>(&self, key: &AttachmentKey<T>) -> Result<&T> {
        self.get(key).ok_or(DeployError::AttachmentMissing(key.name))
    }

    pub fn expect_mut<T: Any + Send + Sync>(&mut self, key: &AttachmentKey<T>) -> Result<&mut T> {
        self.get_mut(key)
            .ok_or(DeployError::AttachmentMissing(key.name))
    }

    pub fn contains<T: Any + Send + Sync>(&self, key: &AttachmentKey<T>) -> bool {
        self.values.contains_key(key.name)
    }
}

/// One deployable unit moving through the pipeline.
pub struct DeploymentUnit {
    name: String,
    attachments: Attachments,
}

impl DeploymentUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Attachments::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Convenience: attach directly on the unit.
    pub fn attach<T: Any + Send + Sync>(&mut self, key: &AttachmentKey<T>, value: T) -> Result<()> {
        self.attachments.attach(key, value)
    }

    /// The component list, for post-run inspection.
    pub fn components(&self) -> Result<&Vec<ComponentConfiguration>> {
        self.attachments.expect(&COMPONENTS)
    }
}

/// What one processor sees: the unit plus the shared service target.
pub struct DeploymentPhaseContext<'a> {
    unit: &'a mut DeploymentUnit,
    service_target: &'a ServiceTarget,
}

impl<'a> DeploymentPhaseContext<'a> {
    pub fn new(unit: &'a mut DeploymentUnit, service_target: &'a ServiceTarget) -> Self {
        Self {
            unit,
            service_target,
        }
    }

    pub fn unit(&self) -> &DeploymentUnit {
        self.unit
    }

    /// The target lives as long as the whole run, not this borrow.
    pub fn service_target(&self) -> &'a ServiceTarget {
        self.service_target
    }

    pub fn type_registry(&self) -> Result<Arc<TypeRegistry>> {
        self.unit
            .attachments
            .expect(&TYPE_REGISTRY)
            .map(Arc::clone)
    }

    pub fn components_mut(&mut self) -> Result<&mut Vec<ComponentConfiguration>> {
        self.unit.attachments.expect_mut(&COMPONENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: AttachmentKey<u32> = AttachmentKey::new("marker");

    #[test]
    fn test_attach_is_put_new_only() {
        let mut attachments = Attachments::new();
        attachments.attach(&MARKER, 7).unwrap();
        assert_eq!(attachments.get(&MARKER), Some(&7));

        let err = attachments.attach(&MARKER, 8).unwrap_err();
        assert!(matches!(err, DeployError::AttachmentAlreadySet("marker")));
        // original value untouched
        assert_eq!(attachments.get(&MARKER), Some(&7));
    }

    #[test]
    fn test_expect_missing() {
        let attachments = Attachments::new();
        assert!(matches!(
            attachments.expect(&MARKER),
            Err(DeployError::AttachmentMissing("marker"))
        ));
    }

    #[test]
    fn test_get_mut() {
        let mut attachments = Attachments::new();
        attachments.attach(&MARKER, 1).unwrap();
        *attachments.expect_mut(&MARKER).unwrap() += 1;
        assert_eq!(attachments.get(&MARKER), Some(&2));
    }
}
