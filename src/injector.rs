//! Error injection for client calls
//!
//! [`ErrorInjector`] wraps any [`Client`] and returns registered errors for
//! matching calls instead of forwarding them. Rules are keyed by action,
//! resource type and object identity; each part may be a wildcard.
//!
//! # Example
//!
//! ```rust
//! use kube_error_injector::{Action, AnyObject, Client, ClientBuilder, Error, ObjectKey};
//! use k8s_openapi::api::apps::v1::Deployment;
//! use kube::api::PostParams;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClientBuilder::new()
//!     .with_type::<Deployment>()
//!     .build_with_injector()?;
//!
//! client.inject_error(
//!     Action::Create,
//!     &Deployment::default(),
//!     AnyObject,
//!     Error::Internal("etcd unavailable".into()),
//! )?;
//!
//! let mut dep = Deployment::default();
//! dep.metadata.name = Some("web".to_string());
//! dep.metadata.namespace = Some("default".to_string());
//!
//! let err = client.create(&mut dep, &PostParams::default()).await.unwrap_err();
//! assert!(matches!(err, Error::Internal(_)));
//!
//! let mut stored = Deployment::default();
//! let missing = client.get(&ObjectKey::new("default", "web"), &mut stored).await;
//! assert!(matches!(missing, Err(Error::NotFound { .. })));
//! # Ok(())
//! # }
//! ```

use crate::action::Action;
use crate::client::{Client, Object};
use crate::key::{KindTarget, ObjectKey, ObjectSelector, ResourceType, RuleKey};
use crate::rules::{self, RuleTable};
use crate::scheme::{Scheme, GVK};
use crate::{Error, Result};
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use serde_json::Value;
use tracing::{debug, error, warn};

/// Client decorator returning injected errors for matching calls
///
/// Get, Create, Update, Delete and Patch consult the rule table first. On a
/// match the registered error is returned and the delegate is not called;
/// otherwise the call is forwarded unchanged. List, DeleteAllOf and the status
/// writer are not supported and always fail with [`Error::Unsupported`].
pub struct ErrorInjector<C> {
    delegate: C,
    rules: RuleTable,
}

impl<C: Client> ErrorInjector<C> {
    pub fn new(delegate: C) -> Self {
        Self {
            delegate,
            rules: RuleTable::new(),
        }
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    pub fn into_inner(self) -> C {
        self.delegate
    }

    /// Number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Return `err` for calls matching (action, kind, object)
    ///
    /// Pass [`Action::Any`], [`AnyKind`](crate::AnyKind) or
    /// [`AnyObject`](crate::AnyObject) to match any value in that position.
    /// Registering the same key again replaces the previous error.
    ///
    /// Fails without registering anything if `kind` names a type unknown to
    /// the delegate's scheme.
    pub fn inject_error(
        &self,
        action: Action,
        kind: impl KindTarget,
        object: impl Into<ObjectSelector>,
        err: Error,
    ) -> Result<()> {
        let kind = self.resolve_kind(&kind)?;
        let key = RuleKey::new(action, kind, object.into());
        debug!("Injecting error for {}: {}", key, err);
        self.rules.set(key, err);
        Ok(())
    }

    /// Like [`inject_error`](Self::inject_error) with the action given as a verb
    ///
    /// Returns `Ok(false)` and registers nothing when `verb` is not one of
    /// `get`, `create`, `delete`, `update`, `patch` or `*`.
    pub fn inject_error_verb(
        &self,
        verb: &str,
        kind: impl KindTarget,
        object: impl Into<ObjectSelector>,
        err: Error,
    ) -> Result<bool> {
        let Ok(action) = verb.parse::<Action>() else {
            warn!("Ignoring injected error for invalid action {:?}", verb);
            return Ok(false);
        };
        self.inject_error(action, kind, object, err)?;
        Ok(true)
    }

    pub(crate) fn resolve_kind(&self, kind: &impl KindTarget) -> Result<ResourceType> {
        match kind.resource_type()? {
            ResourceType::Kind(gvk) => Ok(ResourceType::Kind(self.scheme().ensure_registered(gvk)?)),
            ResourceType::Any => Ok(ResourceType::Any),
        }
    }

    fn resolve_gvk<K: Object>(&self, obj: &K) -> Result<GVK> {
        self.scheme().gvk_for(obj).inspect_err(|e| {
            error!("Cannot resolve resource type for injected error lookup: {}", e);
        })
    }

    /// Fail with the injected error for this call, if one matches
    fn check<K: Object>(&self, action: Action, obj: &K, key: &ObjectKey) -> Result<()> {
        let gvk = self.resolve_gvk(obj)?;
        match rules::find(&self.rules, action, &gvk, key) {
            Some(err) => {
                debug!("Returning injected error for {} {} {}: {}", action, gvk, key, err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<C: Client> Client for ErrorInjector<C> {
    type Status<'a>
        = C::Status<'a>
    where
        Self: 'a;

    fn scheme(&self) -> &Scheme {
        self.delegate.scheme()
    }

    async fn get<K: Object>(&self, key: &ObjectKey, obj: &mut K) -> Result<()> {
        self.check(Action::Get, &*obj, key)?;
        self.delegate.get(key, obj).await
    }

    async fn list<K: Object>(
        &self,
        _kind: &K,
        _namespace: Option<&str>,
        _params: &ListParams,
    ) -> Result<Vec<K>> {
        Err(Error::Unsupported { operation: "list" })
    }

    async fn create<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()> {
        self.check(Action::Create, &*obj, &ObjectKey::from_object(&*obj))?;
        self.delegate.create(obj, params).await
    }

    async fn update<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()> {
        self.check(Action::Update, &*obj, &ObjectKey::from_object(&*obj))?;
        self.delegate.update(obj, params).await
    }

    async fn delete<K: Object>(&self, obj: &K, params: &DeleteParams) -> Result<()> {
        self.check(Action::Delete, obj, &ObjectKey::from_object(obj))?;
        self.delegate.delete(obj, params).await
    }

    async fn patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<()> {
        self.check(Action::Patch, &*obj, &ObjectKey::from_object(&*obj))?;
        self.delegate.patch(obj, patch, params).await
    }

    async fn delete_all_of<K: Object>(
        &self,
        _kind: &K,
        _namespace: Option<&str>,
        _dp: &DeleteParams,
        _lp: &ListParams,
    ) -> Result<()> {
        Err(Error::Unsupported {
            operation: "delete_all_of",
        })
    }

    fn status(&self) -> Result<Self::Status<'_>> {
        Err(Error::Unsupported { operation: "status" })
    }
}
