//! Interceptor configuration and per-method chain model.
//!
//! Chains are built in three fixed passes (class scope, method scope,
//! component scope) and then sealed: every method ends with exactly one
//! invoking link, the actual method call, as the innermost element.

use crate::error::{DeployError, Result};
use crate::filter::MethodFilter;
use crate::injection::ResourceInjectionConfiguration;
use crate::types::MethodRef;
use std::collections::BTreeMap;

/// One declared interceptor binding.
#[derive(Debug, Clone)]
pub struct InterceptorConfiguration {
    /// Fully qualified interceptor class name.
    pub interceptor_class: String,

    /// Designated interceptor method name. When absent, the build stage
    /// discovers it through the around-invoke annotation.
    pub method_name: Option<String>,

    /// Which component methods this interceptor wraps.
    pub filter: MethodFilter,

    /// The interceptor's own resource injections.
    pub injections: Vec<ResourceInjectionConfiguration>,
}

impl InterceptorConfiguration {
    pub fn new(interceptor_class: impl Into<String>, filter: MethodFilter) -> Self {
        Self {
            interceptor_class: interceptor_class.into(),
            method_name: None,
            filter,
            injections: Vec::new(),
        }
    }

    pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    pub fn with_injection(mut self, injection: ResourceInjectionConfiguration) -> Self {
        self.injections.push(injection);
        self
    }
}

/// How an interceptor instance is obtained at runtime.
#[derive(Debug, Clone)]
pub enum InstanceStrategy {
    /// The interceptor class is the component class itself: reuse the
    /// component's own instance factory, never construct a second instance.
    SelfInstance,

    /// Constructed fresh, then decorated with its own resource injections.
    InjectingConstructed(Vec<ResourceInjectionConfiguration>),

    /// Constructed fresh with no injections.
    PlainConstructed,
}

/// A built interceptor: resolved designated method plus instance strategy.
#[derive(Debug, Clone)]
pub struct InterceptorFactory {
    pub interceptor_class: String,
    pub method: MethodRef,
    pub strategy: InstanceStrategy,
}

/// One link in a method's chain.
#[derive(Debug, Clone)]
pub enum ChainLink {
    /// Wraps the rest of the chain.
    Around(InterceptorFactory),
    /// The terminal link: invokes the target method itself.
    Invoke(MethodRef),
}

impl ChainLink {
    pub fn is_invoke(&self) -> bool {
        matches!(self, ChainLink::Invoke(_))
    }
}

/// The ordered per-method interceptor chains of one component.
#[derive(Debug, Default)]
pub struct ComponentInterceptorChains {
    chains: BTreeMap<MethodRef, Vec<ChainLink>>,
    sealed: bool,
    component: String,
}

impl ComponentInterceptorChains {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            chains: BTreeMap::new(),
            sealed: false,
            component: component.into(),
        }
    }

    /// Ensures a chain exists for the method, so that methods with no
    /// matching interceptors still receive their invoking link at seal time.
    pub fn register_method(&mut self, method: MethodRef) -> Result<()> {
        self.ensure_open()?;
        self.chains.entry(method).or_default();
        Ok(())
    }

    /// Appends an interceptor factory to one method's chain.
    pub fn append(&mut self, method: &MethodRef, factory: InterceptorFactory) -> Result<()> {
        self.ensure_open()?;
        self.chains
            .entry(method.clone())
            .or_default()
            .push(ChainLink::Around(factory));
        Ok(())
    }

    /// Seals every chain with its invoking link. May be called once.
    pub fn seal(&mut self) -> Result<()> {
        self.ensure_open()?;
        for (method, chain) in self.chains.iter_mut() {
            chain.push(ChainLink::Invoke(method.clone()));
        }
        self.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn chain(&self, method: &MethodRef) -> Option<&[ChainLink]> {
        self.chains.get(method).map(Vec::as_slice)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodRef> {
        self.chains.keys()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.sealed {
            return Err(DeployError::ChainsSealed(self.component.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str) -> MethodRef {
        MethodRef {
            declaring_type: "com.acme.Foo".to_string(),
            name: name.to_string(),
            param_count: 0,
        }
    }

    fn factory(class: &str) -> InterceptorFactory {
        InterceptorFactory {
            interceptor_class: class.to_string(),
            method: MethodRef {
                declaring_type: class.to_string(),
                name: "around".to_string(),
                param_count: 1,
            },
            strategy: InstanceStrategy::PlainConstructed,
        }
    }

    #[test]
    fn test_seal_appends_exactly_one_invoke_per_method() {
        let mut chains = ComponentInterceptorChains::new("Foo");
        chains.register_method(method("save")).unwrap();
        chains.register_method(method("load")).unwrap();
        chains.append(&method("save"), factory("com.acme.Audit")).unwrap();
        chains.seal().unwrap();

        let save = chains.chain(&method("save")).unwrap();
        assert_eq!(save.len(), 2);
        assert!(!save[0].is_invoke());
        assert!(save[1].is_invoke());

        // an untouched method still gets the invoking link
        let load = chains.chain(&method("load")).unwrap();
        assert_eq!(load.len(), 1);
        assert!(load[0].is_invoke());
    }

    #[test]
    fn test_sealed_chains_reject_mutation() {
        let mut chains = ComponentInterceptorChains::new("Foo");
        chains.register_method(method("save")).unwrap();
        chains.seal().unwrap();

        assert!(matches!(
            chains.append(&method("save"), factory("com.acme.Audit")),
            Err(DeployError::ChainsSealed(_))
        ));
        assert!(matches!(chains.seal(), Err(DeployError::ChainsSealed(_))));
        assert!(chains.is_sealed());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut chains = ComponentInterceptorChains::new("Foo");
        chains.append(&method("save"), factory("com.acme.First")).unwrap();
        chains.append(&method("save"), factory("com.acme.Second")).unwrap();
        chains.seal().unwrap();

        let save = chains.chain(&method("save")).unwrap();
        let classes: Vec<_> = save
            .iter()
            .filter_map(|link| match link {
                ChainLink::Around(f) => Some(f.interceptor_class.as_str()),
                ChainLink::Invoke(_) => None,
            })
            .collect();
        assert_eq!(classes, ["com.acme.First", "com.acme.Second"]);
    }
}
