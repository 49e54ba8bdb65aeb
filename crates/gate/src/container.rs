//! Resolution of handler instances by type name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handler::Handler;
use crate::{Error, Result};

/// Produces handler instances for type names.
///
/// The gate uses a resolver to build policies and `Type@method` targets.
/// How instances are constructed is up to the implementation.
pub trait Resolver: Send + Sync {
    /// Build an instance of `name`.
    fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>>;

    /// Whether `name` can be resolved at all.
    fn resolvable(&self, name: &str) -> bool;
}

type Factory = Arc<dyn Fn() -> Arc<dyn Handler> + Send + Sync>;

/// A resolver backed by named factories.
///
/// `bind` registers a factory called on every resolution, `singleton` a
/// shared instance handed out as-is.
#[derive(Clone, Default)]
pub struct Container {
    factories: Arc<RwLock<HashMap<String, Factory>>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a factory producing a fresh instance per resolution.
    pub fn bind<H, F>(&self, name: impl Into<String>, factory: F) -> &Self
    where
        H: Handler + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Arc::new(factory()) as Arc<dyn Handler>);
        self.factories.write().insert(name.into(), factory);
        self
    }

    /// Bind `name` to a single shared instance.
    pub fn singleton<H>(&self, name: impl Into<String>, instance: H) -> &Self
    where
        H: Handler + 'static,
    {
        let instance: Arc<dyn Handler> = Arc::new(instance);
        let factory: Factory = Arc::new(move || instance.clone());
        self.factories.write().insert(name.into(), factory);
        self
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }
}

impl Resolver for Container {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>> {
        let factory = self.factories.read().get(name).cloned();
        match factory {
            Some(factory) => Ok(factory()),
            None => Err(Error::Resolution {
                name: name.to_string(),
                reason: "no binding registered".to_string(),
            }),
        }
    }

    fn resolvable(&self, name: &str) -> bool {
        self.is_bound(name)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("Container").field("bindings", &names).finish()
    }
}
