//! Policy registration and lookup by subject type.

use std::any::TypeId;
use std::collections::HashMap;

use crate::value::Value;

/// Subject type to policy type name.
#[derive(Debug, Clone, Default)]
pub(crate) struct PolicyRegistry {
    policies: HashMap<TypeId, String>,
}

impl PolicyRegistry {
    /// Register the policy for a subject type, replacing any previous one.
    pub(crate) fn insert_for_type(
        &mut self,
        subject: TypeId,
        policy: impl Into<String>,
    ) -> Option<String> {
        self.policies.insert(subject, policy.into())
    }

    /// The policy registered for the concrete type of `subject`.
    ///
    /// `None` means the check falls through to the ability registry.
    pub(crate) fn lookup(&self, subject: &Value) -> Option<String> {
        self.policies.get(&subject.type_id()).cloned()
    }
}
