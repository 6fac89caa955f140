//! Method filter predicates for interceptor bindings.
//!
//! An interceptor configuration carries one of these; the interceptor build
//! stage evaluates it against every component method to decide which chains
//! the interceptor joins.

use crate::types::MethodRef;
use regex::Regex;
use std::sync::Arc;

/// Predicate over component methods.
#[derive(Clone)]
pub enum MethodFilter {
    /// Matches every method.
    All,

    /// Matches one method by exact name.
    Named(String),

    /// Matches method names against a `*` wildcard pattern,
    /// e.g. `get_*` or `*_order`.
    Pattern(String),

    /// Custom predicate.
    Custom(Arc<dyn Fn(&MethodRef) -> bool + Send + Sync>),

    And(Box<MethodFilter>, Box<MethodFilter>),
    Or(Box<MethodFilter>, Box<MethodFilter>),
    Not(Box<MethodFilter>),
}

impl MethodFilter {
    pub fn matches(&self, method: &MethodRef) -> bool {
        match self {
            MethodFilter::All => true,
            MethodFilter::Named(name) => name == &method.name,
            MethodFilter::Pattern(pattern) => Self::pattern_matches(pattern, &method.name),
            MethodFilter::Custom(pred) => pred(method),
            MethodFilter::And(left, right) => left.matches(method) && right.matches(method),
            MethodFilter::Or(left, right) => left.matches(method) || right.matches(method),
            MethodFilter::Not(inner) => !inner.matches(method),
        }
    }

    /// Simple `*` wildcard matching compiled through a regex.
    fn pattern_matches(pattern: &str, target: &str) -> bool {
        if pattern == "*" {
            return true;
        }
        if !pattern.contains('*') {
            return pattern == target;
        }
        let regex_pattern = format!("^{}$", regex::escape(pattern).replace("\\*", ".*"));
        match Regex::new(&regex_pattern) {
            Ok(regex) => regex.is_match(target),
            Err(_) => false,
        }
    }

    pub fn and(self, other: MethodFilter) -> Self {
        MethodFilter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: MethodFilter) -> Self {
        MethodFilter::Or(Box::new(self), Box::new(other))
    }

    pub fn not(self) -> Self {
        MethodFilter::Not(Box::new(self))
    }
}

impl std::fmt::Debug for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodFilter::All => write!(f, "All"),
            MethodFilter::Named(n) => write!(f, "Named({})", n),
            MethodFilter::Pattern(p) => write!(f, "Pattern({})", p),
            MethodFilter::Custom(_) => write!(f, "Custom(...)"),
            MethodFilter::And(l, r) => write!(f, "And({:?}, {:?})", l, r),
            MethodFilter::Or(l, r) => write!(f, "Or({:?}, {:?})", l, r),
            MethodFilter::Not(e) => write!(f, "Not({:?})", e),
        }
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

    #[test]
    fn test_named_and_all() {
        assert!(MethodFilter::All.matches(&method("anything")));
        assert!(MethodFilter::Named("save".into()).matches(&method("save")));
        assert!(!MethodFilter::Named("save".into()).matches(&method("load")));
    }

    #[test]
    fn test_pattern() {
        let filter = MethodFilter::Pattern("get_*".into());
        assert!(filter.matches(&method("get_user")));
        assert!(!filter.matches(&method("set_user")));
        assert!(MethodFilter::Pattern("*".into()).matches(&method("anything")));
        // no wildcard degenerates to exact match
        assert!(!MethodFilter::Pattern("get".into()).matches(&method("get_user")));
    }

    #[test]
    fn test_combinators() {
        let filter = MethodFilter::Pattern("get_*".into())
            .and(MethodFilter::Named("get_user".into()).not());
        assert!(filter.matches(&method("get_order")));
        assert!(!filter.matches(&method("get_user")));

        let either =
            MethodFilter::Named("save".into()).or(MethodFilter::Named("load".into()));
        assert!(either.matches(&method("load")));
    }

    #[test]
    fn test_custom() {
        let filter = MethodFilter::Custom(Arc::new(|m| m.param_count == 0));
        assert!(filter.matches(&method("save")));
        let mut with_args = method("save");
        with_args.param_count = 2;
        assert!(!filter.matches(&with_args));
    }
}
