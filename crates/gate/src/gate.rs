//! The gate: ability registration and the check dispatch algorithm.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::ability::{self, AbilityRegistry, Definition};
use crate::config::GateConfig;
use crate::container::Resolver;
use crate::handler::Handler;
use crate::hook::{self, AfterHook, BeforeHook, HookChain};
use crate::policy::PolicyRegistry;
use crate::value::{Arguments, Value};
use crate::{Error, Result};

/// Deferred lookup of the current actor.
pub type ActorProvider = Arc<dyn Fn() -> Option<Value> + Send + Sync>;

/// Registrations shared by a gate and every view derived from it.
#[derive(Default)]
struct Registry {
    abilities: AbilityRegistry,
    policies: PolicyRegistry,
    hooks: HookChain,
}

/// Which step of the check produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path {
    Hook,
    PolicyBefore,
    PolicyMethod,
    Ability,
    Undefined,
}

/// Authorization gate.
///
/// Answers whether the current actor may perform an ability, optionally
/// against one or more subjects. Cloning a gate, or deriving one with
/// [`Gate::for_user`], shares its registrations.
#[derive(Clone)]
pub struct Gate {
    registry: Arc<RwLock<Registry>>,
    resolver: Arc<dyn Resolver>,
    user: ActorProvider,
}

impl Gate {
    /// Create a gate resolving handlers through `resolver` and reading the
    /// current actor from `user`.
    pub fn new<R, U>(resolver: R, user: U) -> Self
    where
        R: Resolver + 'static,
        U: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            resolver: Arc::new(resolver),
            user: Arc::new(user),
        }
    }

    /// Create a gate seeded from configuration.
    pub fn from_config<R, U>(resolver: R, user: U, config: &GateConfig) -> Result<Self>
    where
        R: Resolver + 'static,
        U: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        let gate = Self::new(resolver, user);
        gate.apply(config)?;
        Ok(gate)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Define an ability.
    ///
    /// Redefining a name replaces the previous definition. String references
    /// must have the `Type@method` shape and name a resolvable type.
    pub fn define(&self, name: impl Into<String>, definition: impl Into<Definition>) -> Result<()> {
        let name = name.into();
        let definition = definition.into();
        if name.is_empty() {
            return Err(Error::InvalidDefinition("ability name is empty".to_string()));
        }
        ability::validate(&definition, self.resolver.as_ref())?;

        debug!(ability = %name, ?definition, "defining ability");
        if self.registry.write().abilities.insert(name.clone(), definition).is_some() {
            debug!(ability = %name, "ability redefined");
        }
        Ok(())
    }

    /// Register the policy answering checks on subjects of type `S`.
    pub fn policy<S: Any>(&self, policy: impl Into<String>) -> &Self {
        self.policy_for_type(TypeId::of::<S>(), policy)
    }

    /// Register a policy for a subject type known only by its `TypeId`.
    pub fn policy_for_type(&self, subject: TypeId, policy: impl Into<String>) -> &Self {
        let policy = policy.into();
        debug!(?subject, %policy, "registering policy");
        self.registry.write().policies.insert_for_type(subject, policy);
        self
    }

    /// Register a hook run before every check.
    ///
    /// Returning `Some` decides the check; `None` leaves it to the rest of
    /// the chain and normal resolution.
    pub fn before<F>(&self, hook: F) -> &Self
    where
        F: Fn(Option<&Value>, &str, &Arguments) -> Option<bool> + Send + Sync + 'static,
    {
        let hook: BeforeHook = Arc::new(hook);
        self.registry.write().hooks.push_before(hook);
        self
    }

    /// Register a hook observing the result of every check.
    pub fn after<F>(&self, hook: F) -> &Self
    where
        F: Fn(Option<&Value>, &str, bool, &Arguments) + Send + Sync + 'static,
    {
        let hook: AfterHook = Arc::new(hook);
        self.registry.write().hooks.push_after(hook);
        self
    }

    /// Define every ability listed in `config`.
    pub fn apply(&self, config: &GateConfig) -> Result<()> {
        for (name, reference) in &config.abilities {
            self.define(name.as_str(), reference.as_str())?;
        }
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Whether an ability is defined.
    pub fn has(&self, name: &str) -> bool {
        self.registry.read().abilities.contains(name)
    }

    /// Names of all defined abilities, sorted.
    pub fn abilities(&self) -> Vec<String> {
        self.registry.read().abilities.names()
    }

    /// The policy instance for `subject`, if its type has one.
    pub fn policy_for(&self, subject: &Value) -> Result<Option<Arc<dyn Handler>>> {
        let policy = self.registry.read().policies.lookup(subject);
        policy.map(|name| self.resolve(&name)).transpose()
    }

    /// The currently bound actor.
    pub fn actor(&self) -> Option<Value> {
        (self.user)()
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Determine whether the current actor may perform `ability`.
    ///
    /// Global before hooks run first and the last one with an opinion
    /// decides. Otherwise a policy registered for the type of the first
    /// argument answers, falling back to the ability registry when the
    /// policy neither decides in `before` nor has a method named `ability`.
    /// Unknown abilities are denied.
    pub fn check(&self, ability: &str, args: impl Into<Arguments>) -> Result<bool> {
        let args = args.into();
        let actor = self.actor();
        let actor = actor.as_ref();

        let (allowed, path) = self.decide(actor, ability, &args)?;
        debug!(ability, allowed, ?path, "gate check");

        let after = self.registry.read().hooks.after();
        hook::run_after(&after, actor, ability, allowed, &args);

        Ok(allowed)
    }

    /// Alias of [`Gate::check`].
    pub fn allows(&self, ability: &str, args: impl Into<Arguments>) -> Result<bool> {
        self.check(ability, args)
    }

    /// Negation of [`Gate::check`].
    pub fn denies(&self, ability: &str, args: impl Into<Arguments>) -> Result<bool> {
        self.check(ability, args).map(|allowed| !allowed)
    }

    /// Whether any of `abilities` is granted for the same arguments.
    pub fn any<'a>(
        &self,
        abilities: impl IntoIterator<Item = &'a str>,
        args: impl Into<Arguments>,
    ) -> Result<bool> {
        let args = args.into();
        for ability in abilities {
            if self.check(ability, &args)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether none of `abilities` is granted for the same arguments.
    pub fn none<'a>(
        &self,
        abilities: impl IntoIterator<Item = &'a str>,
        args: impl Into<Arguments>,
    ) -> Result<bool> {
        self.any(abilities, args).map(|granted| !granted)
    }

    /// Like [`Gate::check`], but a denial is an [`Error::Unauthorized`].
    pub fn authorize(&self, ability: &str, args: impl Into<Arguments>) -> Result<()> {
        if self.check(ability, args)? {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                ability: ability.to_string(),
            })
        }
    }

    // =========================================================================
    // Actor binding
    // =========================================================================

    /// A gate sharing these registrations, bound to `user`.
    pub fn for_user(&self, user: impl Into<Option<Value>>) -> Gate {
        let user = user.into();
        self.for_user_with(move || user.clone())
    }

    /// A gate sharing these registrations, reading the actor from `provider`.
    pub fn for_user_with<U>(&self, provider: U) -> Gate
    where
        U: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        Gate {
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
            user: Arc::new(provider),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn decide(&self, actor: Option<&Value>, ability: &str, args: &Arguments) -> Result<(bool, Path)> {
        let before = self.registry.read().hooks.before();
        if let Some(allowed) = hook::run_before(&before, actor, ability, args).decision() {
            return Ok((allowed, Path::Hook));
        }

        if let Some(subject) = args.first() {
            if let Some(decided) = self.check_policy(subject, actor, ability, args)? {
                return Ok(decided);
            }
        }

        let definition = self.registry.read().abilities.get(ability);
        let Some(definition) = definition else {
            return Ok((false, Path::Undefined));
        };
        let allowed = ability::resolve(&definition, self.resolver.as_ref())?.invoke(actor, args)?;
        Ok((allowed, Path::Ability))
    }

    /// `None` when no policy applies and the check should fall through.
    fn check_policy(
        &self,
        subject: &Value,
        actor: Option<&Value>,
        ability: &str,
        args: &Arguments,
    ) -> Result<Option<(bool, Path)>> {
        let name = self.registry.read().policies.lookup(subject);
        let Some(name) = name else {
            return Ok(None);
        };
        let policy = self.resolve(&name)?;

        if let Some(allowed) = policy.before(actor, ability) {
            return Ok(Some((allowed, Path::PolicyBefore)));
        }

        match policy.method(ability) {
            Some(method) => Ok(Some((method(actor, args), Path::PolicyMethod))),
            None => {
                debug!(ability, policy = %name, "policy has no method, falling through");
                Ok(None)
            }
        }
    }

    fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>> {
        self.resolver.resolve(name).inspect_err(|e| {
            warn!(name, error = %e, "failed to resolve handler");
        })
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("abilities", &self.abilities())
            .finish_non_exhaustive()
    }
}
