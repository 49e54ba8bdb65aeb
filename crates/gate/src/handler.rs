//! Objects the gate dispatches ability checks to by name.

use crate::value::{Arguments, Value};

/// A method exposed by a [`Handler`].
///
/// Called with the current actor and the check arguments. For policies the
/// subject is the first argument.
pub type Method<'a> = Box<dyn Fn(Option<&Value>, &Arguments) -> bool + 'a>;

/// A policy or `Type@method` target.
///
/// Handlers declare which names they answer through [`Handler::method`]; the
/// gate never looks anything up outside this table.
///
/// ```
/// use gate::{Arguments, Handler, Method, Value};
///
/// struct PostPolicy;
///
/// impl PostPolicy {
///     fn update(&self, user: Option<&Value>, _args: &Arguments) -> bool {
///         user.is_some()
///     }
/// }
///
/// impl Handler for PostPolicy {
///     fn method(&self, name: &str) -> Option<Method<'_>> {
///         match name {
///             "update" => Some(Box::new(|user: Option<&Value>, args: &Arguments| {
///                 self.update(user, args)
///             })),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Runs ahead of every policy method.
    ///
    /// `Some` decides the check outright; `None` lets the named method run.
    fn before(&self, _actor: Option<&Value>, _ability: &str) -> Option<bool> {
        None
    }

    /// Look up the method answering `name`.
    fn method(&self, name: &str) -> Option<Method<'_>>;

    fn responds_to(&self, name: &str) -> bool {
        self.method(name).is_some()
    }
}
