//! Client actions that rules can be registered against

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The semantic action of a client call
///
/// `Any` only has meaning inside a registered rule, where it matches every
/// concrete action. A real call always carries one of the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "get")]
    Get,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "patch")]
    Patch,
    #[serde(rename = "*")]
    Any,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Update => "update",
            Action::Patch => "patch",
            Action::Any => "*",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Action::Any)
    }

    /// Whether `verb` names one of the six registrable actions
    ///
    /// ```
    /// use kube_error_injector::Action;
    ///
    /// assert!(Action::is_valid("patch"));
    /// assert!(Action::is_valid("*"));
    /// assert!(!Action::is_valid("list"));
    /// assert!(!Action::is_valid(""));
    /// ```
    pub fn is_valid(verb: &str) -> bool {
        verb.parse::<Action>().is_ok()
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Action::Get),
            "create" => Ok(Action::Create),
            "delete" => Ok(Action::Delete),
            "update" => Ok(Action::Update),
            "patch" => Ok(Action::Patch),
            "*" => Ok(Action::Any),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
