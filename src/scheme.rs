//! Type registry for resolving objects to their group, version and kind
//!
//! Every object that flows through a client has to be known to the scheme.
//! Typed resources are registered through their `Resource` implementation,
//! untyped or custom kinds by their GVK.

use crate::client::Object;
use crate::client_utils::extract_gvk;
use crate::{Error, Result};
use kube::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::{PoisonError, RwLock};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GVK {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GVK {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// GVK of a statically typed resource
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self::new(K::group(&()), K::version(&()), K::kind(&()))
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Registry of resource types known to a client
#[derive(Debug, Default)]
pub struct Scheme {
    kinds: RwLock<HashSet<GVK>>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed resource using its `Resource` implementation
    pub fn register<K: Resource<DynamicType = ()>>(&self) {
        self.register_gvk(GVK::of::<K>());
    }

    /// Register a kind by GVK, for untyped objects and custom resources
    pub fn register_gvk(&self, gvk: GVK) {
        self.kinds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(gvk);
    }

    pub fn recognizes(&self, gvk: &GVK) -> bool {
        self.kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(gvk)
    }

    /// Resolve an object instance to its registered GVK
    ///
    /// Fails with `InvalidRequest` when the object carries no apiVersion/kind
    /// and with `NotRegistered` when its kind was never added to the scheme.
    pub fn gvk_for<K: Object>(&self, obj: &K) -> Result<GVK> {
        let value = serde_json::to_value(obj)?;
        self.gvk_for_value(&value)
    }

    pub fn gvk_for_value(&self, value: &Value) -> Result<GVK> {
        let gvk = extract_gvk(value)?;
        self.ensure_registered(gvk)
    }

    pub(crate) fn ensure_registered(&self, gvk: GVK) -> Result<GVK> {
        if self.recognizes(&gvk) {
            Ok(gvk)
        } else {
            Err(Error::NotRegistered {
                group: gvk.group,
                version: gvk.version,
                kind: gvk.kind,
            })
        }
    }
}

impl Clone for Scheme {
    fn clone(&self) -> Self {
        let kinds = self
            .kinds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            kinds: RwLock::new(kinds),
        }
    }
}
