//! Rule storage and specificity-ordered matching

use crate::action::Action;
use crate::key::{ObjectKey, ObjectSelector, ResourceType, RuleKey};
use crate::scheme::GVK;
use crate::Error;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Table of injected errors keyed by rule
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: RwLock<HashMap<RuleKey, Error>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing any error stored under the same key
    pub fn set(&self, key: RuleKey, err: Error) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, err);
    }

    /// Error of the first candidate present in the table
    pub fn lookup(&self, candidates: &[RuleKey]) -> Option<Error> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        candidates.iter().find_map(|key| rules.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Candidate keys for a concrete call, most specific first
///
/// Within a tier the identity wildcard is tried before the action wildcard,
/// which is tried before the type wildcard.
pub fn candidate_keys(action: Action, kind: &GVK, key: &ObjectKey) -> [RuleKey; 8] {
    debug_assert!(!action.is_wildcard(), "calls carry a concrete action");

    let kind = ResourceType::Kind(kind.clone());
    let object = ObjectSelector::Key(key.clone());
    let any_kind = ResourceType::Any;
    let any_object = ObjectSelector::Any;

    [
        RuleKey::new(action, kind.clone(), object.clone()),
        RuleKey::new(action, kind.clone(), any_object.clone()),
        RuleKey::new(Action::Any, kind.clone(), object.clone()),
        RuleKey::new(action, any_kind.clone(), object.clone()),
        RuleKey::new(Action::Any, kind, any_object.clone()),
        RuleKey::new(action, any_kind.clone(), any_object.clone()),
        RuleKey::new(Action::Any, any_kind.clone(), object),
        RuleKey::new(Action::Any, any_kind, any_object),
    ]
}

/// Best matching rule for a call, if any
pub fn find(table: &RuleTable, action: Action, kind: &GVK, key: &ObjectKey) -> Option<Error> {
    table.lookup(&candidate_keys(action, kind, key))
}
