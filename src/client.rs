//! Client capability shared by real delegates and the error injector

use crate::key::ObjectKey;
use crate::scheme::Scheme;
use crate::Result;
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Any resource a client can act on
///
/// Covers k8s-openapi types, derived custom resources and
/// `kube::core::DynamicObject`.
pub trait Object: Resource + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Object for T where T: Resource + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Resource operations on a cluster-like backend
///
/// Mutating calls take the caller's object by `&mut` and overwrite it with the
/// stored result on success, so server-populated fields (resourceVersion, uid,
/// generated names) are visible to the caller. A failed call leaves the object
/// untouched.
#[async_trait]
pub trait Client: Send + Sync {
    type Status<'a>: StatusWriter
    where
        Self: 'a;

    /// Types this client can resolve
    fn scheme(&self) -> &Scheme;

    /// Fetch the object stored under `key` into `obj`
    ///
    /// The type is taken from `obj`, which only needs its apiVersion and kind.
    async fn get<K: Object>(&self, key: &ObjectKey, obj: &mut K) -> Result<()>;

    /// List objects of the same type as `kind`
    async fn list<K: Object>(
        &self,
        kind: &K,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<K>>;

    async fn create<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()>;

    async fn update<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()>;

    async fn delete<K: Object>(&self, obj: &K, params: &DeleteParams) -> Result<()>;

    async fn patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<()>;

    /// Delete every object of the same type as `kind` matching the filters
    async fn delete_all_of<K: Object>(
        &self,
        kind: &K,
        namespace: Option<&str>,
        dp: &DeleteParams,
        lp: &ListParams,
    ) -> Result<()>;

    /// Writer for the status subresource
    fn status(&self) -> Result<Self::Status<'_>>;
}

/// Status subresource operations
#[async_trait]
pub trait StatusWriter: Send + Sync {
    async fn update<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()>;

    async fn patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<()>;
}
