//! In-process authorization gate.
//!
//! A [`Gate`] answers one question: may the current actor perform a named
//! ability, optionally against one or more subjects?
//!
//! # Overview
//!
//! Abilities are answered in one of three ways:
//!
//! 1. **Before hooks** — global interceptors registered with
//!    [`Gate::before`]. Every hook is consulted in order and the last one
//!    returning `Some` decides the check outright.
//!
//! 2. **Policies** — [`Handler`]s registered for a subject type with
//!    [`Gate::policy`]. When the first check argument has a policy, the
//!    policy's `before` method and then its method named after the ability
//!    answer. A policy always wins over a closure of the same name.
//!
//! 3. **Abilities** — closures or `Type@method` references registered with
//!    [`Gate::define`]. An ability that was never defined is denied.
//!
//! Policies and `Type@method` targets are built by a [`Resolver`]. The
//! [`Container`] is a factory-backed resolver suitable for most applications.
//!
//! # Example
//!
//! ```
//! use gate::{Arguments, Container, Definition, Gate, Handler, Method, Value};
//!
//! struct User {
//!     id: u64,
//! }
//!
//! struct Post {
//!     author: u64,
//! }
//!
//! struct PostPolicy;
//!
//! impl Handler for PostPolicy {
//!     fn method(&self, name: &str) -> Option<Method<'_>> {
//!         match name {
//!             "update" => Some(Box::new(|user: Option<&Value>, args: &Arguments| {
//!                 let user = user.and_then(|u| u.downcast_ref::<User>());
//!                 let post = args.downcast::<Post>(0);
//!                 matches!((user, post), (Some(u), Some(p)) if u.id == p.author)
//!             })),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let container = Container::new();
//! container.bind("PostPolicy", || PostPolicy);
//!
//! let gate = Gate::new(container, || Some(Value::new(User { id: 1 })));
//! gate.policy::<Post>("PostPolicy");
//! gate.define("admin", Definition::callback(|_, _| false))?;
//!
//! assert!(gate.check("update", Value::new(Post { author: 1 }))?);
//! assert!(gate.denies("update", Value::new(Post { author: 2 }))?);
//! assert!(!gate.check("admin", ())?);
//!
//! // Same registrations, different actor.
//! let other = gate.for_user(Value::new(User { id: 2 }));
//! assert!(other.check("update", Value::new(Post { author: 2 }))?);
//! # Ok::<(), gate::Error>(())
//! ```
//!
//! # Re-exports
//!
//! - [`Gate`], [`ActorProvider`] — the facade
//! - [`Definition`], [`Callback`] — ability definitions
//! - [`Handler`], [`Method`] — policies and `Type@method` targets
//! - [`Resolver`], [`Container`] — handler construction
//! - [`Value`], [`Arguments`] — actors, subjects and check arguments
//! - [`Verdict`], [`Outcome`] — tri-state opinions and result coercion
//! - [`GateConfig`] — TOML configuration
//! - [`Error`], [`Result`] — error handling

mod ability;
mod config;
mod container;
mod error;
mod gate;
mod handler;
mod hook;
mod policy;
mod value;
mod verdict;

pub use ability::{Callback, Definition, REFERENCE_SEPARATOR, parse_reference};
pub use config::GateConfig;
pub use container::{Container, Resolver};
pub use error::{Error, Result};
pub use gate::{ActorProvider, Gate};
pub use handler::{Handler, Method};
pub use hook::{AfterHook, BeforeHook};
pub use value::{Arguments, Value};
pub use verdict::{Outcome, Verdict};
