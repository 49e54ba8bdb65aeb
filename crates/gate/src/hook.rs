//! Global interceptors run around every check.

use std::sync::Arc;

use tracing::trace;

use crate::value::{Arguments, Value};
use crate::verdict::Verdict;

/// Runs before any ability or policy logic.
///
/// `Some` forces the result, `None` expresses no opinion.
pub type BeforeHook = Arc<dyn Fn(Option<&Value>, &str, &Arguments) -> Option<bool> + Send + Sync>;

/// Observes the final result of a check.
pub type AfterHook = Arc<dyn Fn(Option<&Value>, &str, bool, &Arguments) + Send + Sync>;

/// Ordered before and after hooks.
#[derive(Clone, Default)]
pub(crate) struct HookChain {
    before: Vec<BeforeHook>,
    after: Vec<AfterHook>,
}

impl HookChain {
    pub(crate) fn push_before(&mut self, hook: BeforeHook) {
        self.before.push(hook);
    }

    pub(crate) fn push_after(&mut self, hook: AfterHook) {
        self.after.push(hook);
    }

    pub(crate) fn before(&self) -> Vec<BeforeHook> {
        self.before.clone()
    }

    pub(crate) fn after(&self) -> Vec<AfterHook> {
        self.after.clone()
    }
}

/// Consult every hook in order. The last decided opinion wins.
pub(crate) fn run_before(
    hooks: &[BeforeHook],
    actor: Option<&Value>,
    ability: &str,
    args: &Arguments,
) -> Verdict {
    hooks
        .iter()
        .enumerate()
        .fold(Verdict::Undecided, |verdict, (index, hook)| {
            let opinion = Verdict::from(hook(actor, ability, args));
            trace!(ability, index, ?opinion, "before hook");
            verdict.then(opinion)
        })
}

pub(crate) fn run_after(
    hooks: &[AfterHook],
    actor: Option<&Value>,
    ability: &str,
    result: bool,
    args: &Arguments,
) {
    for hook in hooks {
        hook(actor, ability, result, args);
    }
}
