//! Object identities, wildcard markers and rule keys

use crate::action::Action;
use crate::client::Object;
use crate::client_utils::extract_gvk;
use crate::scheme::GVK;
use crate::Result;
use kube::Resource;
use std::fmt;

/// Namespace and name of an object
///
/// Cluster-scoped objects have an empty namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key for a cluster-scoped object
    pub fn cluster(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    pub fn from_object<K: Resource>(obj: &K) -> Self {
        let meta = obj.meta();
        Self {
            namespace: meta.namespace.clone().unwrap_or_default(),
            name: meta.name.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// Wildcard marker matching any object identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnyObject;

/// Wildcard marker matching any resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnyKind;

/// Object identity half of a rule key
///
/// `Key` with an empty namespace and name is a real identity and only matches
/// an object with exactly that key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectSelector {
    Any,
    Key(ObjectKey),
}

impl From<ObjectKey> for ObjectSelector {
    fn from(key: ObjectKey) -> Self {
        ObjectSelector::Key(key)
    }
}

impl From<&ObjectKey> for ObjectSelector {
    fn from(key: &ObjectKey) -> Self {
        ObjectSelector::Key(key.clone())
    }
}

impl From<AnyObject> for ObjectSelector {
    fn from(_: AnyObject) -> Self {
        ObjectSelector::Any
    }
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectSelector::Any => f.write_str("*"),
            ObjectSelector::Key(key) => fmt::Display::fmt(key, f),
        }
    }
}

/// Resource type half of a rule key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Any,
    Kind(GVK),
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Any => f.write_str("*"),
            ResourceType::Kind(gvk) => fmt::Display::fmt(gvk, f),
        }
    }
}

/// Something that names the resource type of a rule
///
/// Implemented for [`AnyKind`], for references to objects (the type is taken
/// from the object's apiVersion and kind), for [`GVK`] and for
/// [`ResourceType`]. Registration checks concrete types against the scheme.
pub trait KindTarget {
    fn resource_type(&self) -> Result<ResourceType>;
}

impl KindTarget for AnyKind {
    fn resource_type(&self) -> Result<ResourceType> {
        Ok(ResourceType::Any)
    }
}

impl<K: Object> KindTarget for &K {
    fn resource_type(&self) -> Result<ResourceType> {
        let value = serde_json::to_value(*self)?;
        Ok(ResourceType::Kind(extract_gvk(&value)?))
    }
}

impl KindTarget for GVK {
    fn resource_type(&self) -> Result<ResourceType> {
        Ok(ResourceType::Kind(self.clone()))
    }
}

impl KindTarget for ResourceType {
    fn resource_type(&self) -> Result<ResourceType> {
        Ok(self.clone())
    }
}

/// The (action, resource type, object identity) triple rules are stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub action: Action,
    pub kind: ResourceType,
    pub object: ObjectSelector,
}

impl RuleKey {
    pub fn new(action: Action, kind: ResourceType, object: ObjectSelector) -> Self {
        Self {
            action,
            kind,
            object,
        }
    }

    /// Number of wildcard components in this key
    pub fn wildcards(&self) -> usize {
        usize::from(self.action.is_wildcard())
            + usize::from(self.kind == ResourceType::Any)
            + usize::from(self.object == ObjectSelector::Any)
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.action, self.kind, self.object)
    }
}
