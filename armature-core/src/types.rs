//! The build-time type registry.
//!
//! Dynamic class loading by string name has no equivalent in an
//! ahead-of-time-compiled program, so component classes are described up
//! front as [`ComponentType`] records keyed by fully qualified name. Types
//! are registered either programmatically through [`TypeRegistry::register`]
//! or at link time through [`inventory`] submissions of [`TypeRegistration`].
//!
//! The registry is immutable once built and is scoped to one deployment
//! unit; pipeline stages receive it explicitly through the three lookup
//! traits ([`TypeResolver`], [`MethodIndex`], [`AnnotationIndex`]) rather
//! than through ambient global state.

use crate::error::{DeployError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Annotation markers carried by methods in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Lifecycle callback invoked after construction and injection.
    PostConstruct,
    /// Lifecycle callback invoked before the component is discarded.
    PreDestroy,
    /// The designated interceptor method (single invocation-context argument).
    AroundInvoke,
}

/// A method declared on a registered type.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub param_count: usize,
    pub annotations: Vec<AnnotationKind>,
}

impl MethodDescriptor {
    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotations.contains(&kind)
    }
}

/// An owned reference to a method: declaring class plus signature facts.
///
/// The analog of a reflective method identifier; interceptor chains are
/// keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,
    pub param_count: usize,
}

/// A registered component or interceptor class.
#[derive(Debug, Clone)]
pub struct ComponentType {
    name: String,
    super_name: Option<String>,
    methods: Vec<MethodDescriptor>,
    injection_targets: HashSet<String>,
}

impl ComponentType {
    pub fn builder(name: impl Into<String>) -> ComponentTypeBuilder {
        ComponentTypeBuilder {
            name: name.into(),
            super_name: None,
            methods: Vec::new(),
            injection_targets: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Methods declared directly on this type (not inherited).
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Every declared method with the given name; overloads differing in
    /// parameter count are distinct methods.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Whether the type declares a settable member with the given name.
    pub fn has_injection_target(&self, member: &str) -> bool {
        self.injection_targets.contains(member)
    }

    pub fn method_ref(&self, method: &MethodDescriptor) -> MethodRef {
        MethodRef {
            declaring_type: self.name.clone(),
            name: method.name.clone(),
            param_count: method.param_count,
        }
    }
}

/// Builder for [`ComponentType`] records.
pub struct ComponentTypeBuilder {
    name: String,
    super_name: Option<String>,
    methods: Vec<MethodDescriptor>,
    injection_targets: HashSet<String>,
}

impl ComponentTypeBuilder {
    pub fn extends(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, param_count: usize) -> Self {
        self.methods.push(MethodDescriptor {
            name: name.into(),
            param_count,
            annotations: Vec::new(),
        });
        self
    }

    pub fn annotated_method(
        mut self,
        name: impl Into<String>,
        param_count: usize,
        annotation: AnnotationKind,
    ) -> Self {
        self.methods.push(MethodDescriptor {
            name: name.into(),
            param_count,
            annotations: vec![annotation],
        });
        self
    }

    pub fn injection_target(mut self, member: impl Into<String>) -> Self {
        self.injection_targets.insert(member.into());
        self
    }

    pub fn build(self) -> ComponentType {
        ComponentType {
            name: self.name,
            super_name: self.super_name,
            methods: self.methods,
            injection_targets: self.injection_targets,
        }
    }
}

/// Resolves a fully qualified class name to its registered type.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, class_name: &str) -> Result<Arc<ComponentType>>;
}

/// Enumerates and looks up methods declared on a single class.
pub trait MethodIndex: Send + Sync {
    fn declared_methods(&self, class_name: &str) -> Result<Vec<MethodRef>>;

    /// Every declared method with the given name, one entry per overload.
    fn named_methods(&self, class_name: &str, method_name: &str) -> Result<Vec<MethodRef>>;
}

/// Looks up annotated methods declared on a single class.
///
/// No hierarchy walk happens here; callers that need inherited annotations
/// walk the hierarchy themselves and query each class in turn.
pub trait AnnotationIndex: Send + Sync {
    fn annotated_methods(&self, class_name: &str, kind: AnnotationKind)
        -> Result<Vec<MethodRef>>;
}

/// A link-time type submission, collected through `inventory`.
pub struct TypeRegistration {
    pub name: &'static str,
    pub builder: fn() -> ComponentType,
}

inventory::collect!(TypeRegistration);

/// Immutable per-deployment-unit map of registered types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<ComponentType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any previous registration with the
    /// same name.
    pub fn register(&mut self, ty: ComponentType) {
        tracing::trace!("Registering type '{}'", ty.name());
        self.types.insert(ty.name().to_string(), Arc::new(ty));
    }

    /// Gathers every [`TypeRegistration`] submitted through `inventory`.
    pub fn from_submissions() -> Self {
        let mut registry = Self::new();
        let mut count = 0usize;
        for registration in inventory::iter::<TypeRegistration> {
            registry.register((registration.builder)());
            count += 1;
        }
        tracing::debug!("Loaded {} type registration(s)", count);
        registry
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.types.contains_key(class_name)
    }

    /// The class and its ancestors, most-derived first.
    ///
    /// Fails if any supertype in the chain is unregistered.
    pub fn hierarchy(&self, class_name: &str) -> Result<Vec<Arc<ComponentType>>> {
        let mut chain = Vec::new();
        let mut current = Some(class_name.to_string());
        while let Some(name) = current {
            let ty = self.resolve(&name)?;
            current = ty.super_name().map(str::to_string);
            chain.push(ty);
        }
        Ok(chain)
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, class_name: &str) -> Result<Arc<ComponentType>> {
        self.types
            .get(class_name)
            .cloned()
            .ok_or_else(|| DeployError::ClassNotFound(class_name.to_string()))
    }
}

impl MethodIndex for TypeRegistry {
    fn declared_methods(&self, class_name: &str) -> Result<Vec<MethodRef>> {
        let ty = self.resolve(class_name)?;
        Ok(ty.methods().iter().map(|m| ty.method_ref(m)).collect())
    }

    fn named_methods(&self, class_name: &str, method_name: &str) -> Result<Vec<MethodRef>> {
        let ty = self.resolve(class_name)?;
        Ok(ty
            .methods_named(method_name)
            .map(|m| ty.method_ref(m))
            .collect())
    }
}

impl AnnotationIndex for TypeRegistry {
    fn annotated_methods(
        &self,
        class_name: &str,
        kind: AnnotationKind,
    ) -> Result<Vec<MethodRef>> {
        let ty = self.resolve(class_name)?;
        Ok(ty
            .methods()
            .iter()
            .filter(|m| m.has_annotation(kind))
            .map(|m| ty.method_ref(m))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    inventory::submit! {
        TypeRegistration {
            name: "com.acme.Submitted",
            builder: || ComponentType::builder("com.acme.Submitted").build(),
        }
    }

    #[test]
    fn test_from_submissions() {
        let registry = TypeRegistry::from_submissions();
        assert!(registry.contains("com.acme.Submitted"));
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(
            ComponentType::builder("com.acme.Base")
                .method("close", 0)
                .annotated_method("cleanup", 0, AnnotationKind::PreDestroy)
                .build(),
        );
        registry.register(
            ComponentType::builder("com.acme.Foo")
                .extends("com.acme.Base")
                .annotated_method("init", 0, AnnotationKind::PostConstruct)
                .method("place_order", 1)
                .injection_target("data_source")
                .build(),
        );
        registry
    }

    #[test]
    fn test_resolve_and_missing() {
        let registry = registry();
        assert_eq!(registry.resolve("com.acme.Foo").unwrap().name(), "com.acme.Foo");

        let err = registry.resolve("com.acme.DoesNotExist").unwrap_err();
        assert!(matches!(err, DeployError::ClassNotFound(name) if name == "com.acme.DoesNotExist"));
    }

    #[test]
    fn test_hierarchy_most_derived_first() {
        let registry = registry();
        let chain = registry.hierarchy("com.acme.Foo").unwrap();
        let names: Vec<_> = chain.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["com.acme.Foo", "com.acme.Base"]);
    }

    #[test]
    fn test_hierarchy_fails_on_missing_supertype() {
        let mut registry = TypeRegistry::new();
        registry.register(
            ComponentType::builder("com.acme.Orphan")
                .extends("com.acme.Gone")
                .build(),
        );
        assert!(registry.hierarchy("com.acme.Orphan").is_err());
    }

    #[test]
    fn test_annotation_index_is_per_class() {
        let registry = registry();
        // cleanup is declared on Base, not Foo: the index does not walk up.
        let on_foo = registry
            .annotated_methods("com.acme.Foo", AnnotationKind::PreDestroy)
            .unwrap();
        assert!(on_foo.is_empty());

        let on_base = registry
            .annotated_methods("com.acme.Base", AnnotationKind::PreDestroy)
            .unwrap();
        assert_eq!(on_base.len(), 1);
        assert_eq!(on_base[0].name, "cleanup");
        assert_eq!(on_base[0].declaring_type, "com.acme.Base");
    }

    #[test]
    fn test_method_index() {
        let registry = registry();
        let methods = registry.declared_methods("com.acme.Foo").unwrap();
        assert_eq!(methods.len(), 2);

        let found = registry.named_methods("com.acme.Foo", "place_order").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].param_count, 1);
        assert!(registry.named_methods("com.acme.Foo", "nope").unwrap().is_empty());
    }

    #[test]
    fn test_named_methods_returns_every_overload() {
        let mut registry = TypeRegistry::new();
        registry.register(
            ComponentType::builder("com.acme.Repo")
                .method("save", 0)
                .method("save", 1)
                .build(),
        );
        let overloads = registry.named_methods("com.acme.Repo", "save").unwrap();
        let params: Vec<usize> = overloads.iter().map(|m| m.param_count).collect();
        assert_eq!(params, [0, 1]);
    }
}
