//! Ability definitions and their resolution into callables.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::container::Resolver;
use crate::handler::Handler;
use crate::value::{Arguments, Value};
use crate::verdict::Outcome;
use crate::{Error, Result};

/// Separator between type and method in a string reference.
pub const REFERENCE_SEPARATOR: char = '@';

/// A callback answering an ability check.
pub type Callback = Arc<dyn Fn(Option<&Value>, &Arguments) -> bool + Send + Sync>;

/// How an ability is answered.
#[derive(Clone)]
pub enum Definition {
    /// A closure called with the actor and the check arguments.
    Callback(Callback),
    /// A `Type@method` reference, resolved at check time.
    Reference(String),
}

impl Definition {
    /// Define an ability with a closure.
    ///
    /// The closure may return anything implementing [`Outcome`], e.g. `bool`
    /// or `Option<bool>`.
    pub fn callback<F, R>(callback: F) -> Self
    where
        F: Fn(Option<&Value>, &Arguments) -> R + Send + Sync + 'static,
        R: Outcome,
    {
        Definition::Callback(Arc::new(move |actor: Option<&Value>, args: &Arguments| {
            callback(actor, args).allowed()
        }))
    }

    /// Define an ability with a `Type@method` reference.
    pub fn reference(reference: impl Into<String>) -> Self {
        Definition::Reference(reference.into())
    }
}

impl From<&str> for Definition {
    fn from(reference: &str) -> Self {
        Definition::reference(reference)
    }
}

impl From<String> for Definition {
    fn from(reference: String) -> Self {
        Definition::Reference(reference)
    }
}

impl From<Callback> for Definition {
    fn from(callback: Callback) -> Self {
        Definition::Callback(callback)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Callback(_) => f.write_str("Callback(..)"),
            Definition::Reference(reference) => f.debug_tuple("Reference").field(reference).finish(),
        }
    }
}

/// Split a `Type@method` reference into its parts.
pub fn parse_reference(reference: &str) -> Result<(&str, &str)> {
    match reference.split_once(REFERENCE_SEPARATOR) {
        Some((class, method))
            if !class.is_empty() && !method.is_empty() && !method.contains(REFERENCE_SEPARATOR) =>
        {
            Ok((class, method))
        }
        _ => Err(Error::InvalidDefinition(format!(
            "'{reference}' is not a callback or a Type{REFERENCE_SEPARATOR}method reference"
        ))),
    }
}

/// Check a definition before it is registered.
///
/// References must be well formed and name a type the resolver can build.
pub(crate) fn validate(definition: &Definition, resolver: &dyn Resolver) -> Result<()> {
    let Definition::Reference(reference) = definition else {
        return Ok(());
    };
    let (class, _) = parse_reference(reference)?;
    if !resolver.resolvable(class) {
        return Err(Error::Unresolvable(class.to_string()));
    }
    Ok(())
}

/// A definition ready to be called.
pub(crate) enum Invocable {
    Callback(Callback),
    Bound {
        handler: Arc<dyn Handler>,
        class: String,
        method: String,
    },
}

impl Invocable {
    pub(crate) fn invoke(&self, actor: Option<&Value>, args: &Arguments) -> Result<bool> {
        match self {
            Invocable::Callback(callback) => Ok(callback(actor, args)),
            Invocable::Bound {
                handler,
                class,
                method,
            } => {
                let call = handler.method(method).ok_or_else(|| Error::UndefinedMethod {
                    handler: class.clone(),
                    method: method.clone(),
                })?;
                Ok(call(actor, args))
            }
        }
    }
}

/// Turn a definition into something callable.
///
/// Closures are returned as-is; references get a freshly resolved instance.
pub(crate) fn resolve(definition: &Definition, resolver: &dyn Resolver) -> Result<Invocable> {
    match definition {
        Definition::Callback(callback) => Ok(Invocable::Callback(callback.clone())),
        Definition::Reference(reference) => {
            let (class, method) = parse_reference(reference)?;
            let handler = resolver.resolve(class)?;
            Ok(Invocable::Bound {
                handler,
                class: class.to_string(),
                method: method.to_string(),
            })
        }
    }
}

/// Ability name to definition.
#[derive(Debug, Clone, Default)]
pub(crate) struct AbilityRegistry {
    abilities: HashMap<String, Definition>,
}

impl AbilityRegistry {
    /// Register `definition`, replacing any previous one under `name`.
    pub(crate) fn insert(&mut self, name: String, definition: Definition) -> Option<Definition> {
        self.abilities.insert(name, definition)
    }

    pub(crate) fn get(&self, name: &str) -> Option<Definition> {
        self.abilities.get(name).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.abilities.contains_key(name)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.abilities.keys().cloned().collect();
        names.sort();
        names
    }
}
