//! Tri-state verdicts and result coercion.

/// The opinion of a hook or a policy `before` method.
///
/// `Undecided` means "no opinion, continue" and is distinct from `Deny`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Undecided,
    Allow,
    Deny,
}

impl Verdict {
    pub fn is_decided(self) -> bool {
        !matches!(self, Verdict::Undecided)
    }

    /// The decision, if one was made.
    pub fn decision(self) -> Option<bool> {
        match self {
            Verdict::Undecided => None,
            Verdict::Allow => Some(true),
            Verdict::Deny => Some(false),
        }
    }

    /// Fold a later opinion over this one: the last decided verdict wins.
    pub fn then(self, later: Verdict) -> Verdict {
        if later.is_decided() { later } else { self }
    }
}

impl From<bool> for Verdict {
    fn from(allowed: bool) -> Self {
        if allowed { Verdict::Allow } else { Verdict::Deny }
    }
}

impl From<Option<bool>> for Verdict {
    fn from(opinion: Option<bool>) -> Self {
        opinion.map_or(Verdict::Undecided, Verdict::from)
    }
}

/// A callback result that can be coerced to a permit/deny decision.
///
/// `None` and `Verdict::Undecided` are falsy here. Only hooks and policy
/// `before` methods treat an absent result as "no opinion".
pub trait Outcome {
    fn allowed(self) -> bool;
}

impl Outcome for bool {
    fn allowed(self) -> bool {
        self
    }
}

impl<T: Outcome> Outcome for Option<T> {
    fn allowed(self) -> bool {
        self.is_some_and(Outcome::allowed)
    }
}

impl Outcome for Verdict {
    fn allowed(self) -> bool {
        matches!(self, Verdict::Allow)
    }
}
