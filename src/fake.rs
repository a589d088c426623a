//! Fake Kubernetes client for in-memory testing

use crate::client::{Client, Object, StatusWriter};
use crate::client_utils::{extract_name, extract_namespace};
use crate::key::ObjectKey;
use crate::label_selector::parse_label_selector;
use crate::scheme::{Scheme, GVK};
use crate::tracker::{extract_metadata, ObjectTracker};
use crate::utils::{allows_create_on_update, allows_unconditional_update, generate_name};
use crate::{Error, Result};
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::core::SelectorExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Fake Kubernetes client backed by an [`ObjectTracker`]
///
/// Cloning is cheap and clones share storage.
#[derive(Clone)]
pub struct FakeClient {
    pub(crate) tracker: Arc<ObjectTracker>,
    pub(crate) scheme: Arc<Scheme>,
}

impl FakeClient {
    /// Create a fake client with an empty store resolving types through `scheme`
    pub fn new(scheme: Scheme) -> Self {
        Self {
            tracker: Arc::new(ObjectTracker::new()),
            scheme: Arc::new(scheme),
        }
    }

    /// Get the object tracker
    pub fn tracker(&self) -> &Arc<ObjectTracker> {
        &self.tracker
    }

    fn name_required(gvk: &GVK) -> Error {
        Error::Invalid {
            kind: gvk.kind.clone(),
            name: String::new(),
            message: "metadata.name: Required value: name is required".to_string(),
        }
    }

    /// Serialize an object and resolve its registered GVK
    fn to_value<K: Object>(&self, obj: &K) -> Result<(GVK, Value)> {
        let value = serde_json::to_value(obj)?;
        let gvk = self.scheme.gvk_for_value(&value)?;
        Ok((gvk, value))
    }

    fn select<K: Object>(
        &self,
        kind: &K,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<Value>> {
        let (gvk, _) = self.to_value(kind)?;
        let selector = parse_label_selector(params.label_selector.as_deref().unwrap_or(""))?;

        let mut selected = Vec::new();
        for value in self.tracker.list(&gvk, namespace) {
            let labels = extract_metadata(&value)?.labels.unwrap_or_default();
            if selector.matches(&labels) {
                selected.push(value);
            }
        }
        Ok(selected)
    }

    fn write_update<K: Object>(
        &self,
        obj: &mut K,
        is_status: bool,
        params: &PostParams,
    ) -> Result<()> {
        let (gvk, value) = self.to_value(&*obj)?;
        let meta = extract_metadata(&value)?;
        let name = meta.name.clone().unwrap_or_default();
        if name.is_empty() {
            return Err(Self::name_required(&gvk));
        }
        let namespace = meta.namespace.clone().unwrap_or_default();

        let existing = match self.tracker.get(&gvk, &namespace, &name) {
            Ok(existing) => existing,
            Err(Error::NotFound { .. }) if !is_status && allows_create_on_update(&gvk) => {
                debug!("Creating {} {}/{} on update", gvk.kind, namespace, name);
                let created = self.tracker.create(&gvk, value, params.dry_run)?;
                if !params.dry_run {
                    *obj = serde_json::from_value(created)?;
                }
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if meta.resource_version.as_ref().is_none_or(|rv| rv.is_empty())
            && !allows_unconditional_update(&gvk)
        {
            return Err(Error::Invalid {
                kind: gvk.kind.clone(),
                name,
                message: "metadata.resourceVersion: Invalid value: 0x0: must be specified for an update"
                    .to_string(),
            });
        }

        let mut value = value;
        if meta.resource_version.as_ref().is_none_or(|rv| rv.is_empty()) {
            value["metadata"]["resourceVersion"] = existing["metadata"]["resourceVersion"].clone();
        }

        let updated = self.tracker.update(&gvk, value, is_status, params.dry_run)?;
        if !params.dry_run {
            *obj = serde_json::from_value(updated)?;
        }
        Ok(())
    }

    fn write_patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        is_status: bool,
        params: &PatchParams,
    ) -> Result<()> {
        let (gvk, _) = self.to_value(&*obj)?;
        let key = ObjectKey::from_object(&*obj);

        let existing = self.tracker.get(&gvk, &key.namespace, &key.name)?;
        let mut patched = existing.clone();
        apply_patch(&mut patched, patch)?;

        let (patched_namespace, patched_name) =
            (extract_namespace(&patched), extract_name(&patched));
        if patched_name != key.name || patched_namespace != key.namespace {
            return Err(Error::InvalidRequest(format!(
                "patch cannot change the identity of {} {}: got {}/{}",
                gvk.kind, key, patched_namespace, patched_name
            )));
        }

        // Patches are unconditional unless they carry their own resourceVersion.
        if patched["metadata"]["resourceVersion"].is_null() {
            patched["metadata"]["resourceVersion"] = existing["metadata"]["resourceVersion"].clone();
        }

        let updated = self.tracker.update(&gvk, patched, is_status, params.dry_run)?;
        if !params.dry_run {
            *obj = serde_json::from_value(updated)?;
        }
        Ok(())
    }
}

/// Apply a patch document to a stored object
///
/// Strategic merge and server-side apply are approximated with a JSON merge
/// patch since both need schema knowledge the fake does not have.
fn apply_patch(target: &mut Value, patch: &Patch<Value>) -> Result<()> {
    match patch {
        Patch::Json(operations) => json_patch::patch(target, operations)?,
        Patch::Merge(doc) | Patch::Strategic(doc) | Patch::Apply(doc) => {
            json_patch::merge(target, doc)
        }
        #[allow(unreachable_patterns)]
        _ => return Err(Error::InvalidRequest("unsupported patch type".to_string())),
    }
    Ok(())
}

#[async_trait]
impl Client for FakeClient {
    type Status<'a>
        = FakeStatusWriter<'a>
    where
        Self: 'a;

    fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    async fn get<K: Object>(&self, key: &ObjectKey, obj: &mut K) -> Result<()> {
        let (gvk, _) = self.to_value(&*obj)?;
        let value = self.tracker.get(&gvk, &key.namespace, &key.name)?;
        *obj = serde_json::from_value(value)?;
        Ok(())
    }

    async fn list<K: Object>(
        &self,
        kind: &K,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Vec<K>> {
        let values = self.select(kind, namespace, params)?;
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(Error::from))
            .collect()
    }

    async fn create<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()> {
        let (gvk, mut value) = self.to_value(&*obj)?;
        let meta = extract_metadata(&value)?;

        if meta.name.as_ref().is_none_or(|n| n.is_empty()) {
            match meta.generate_name.as_deref() {
                Some(prefix) if !prefix.is_empty() => {
                    value["metadata"]["name"] = Value::String(generate_name(prefix));
                }
                _ => return Err(Self::name_required(&gvk)),
            }
        }

        let created = self.tracker.create(&gvk, value, params.dry_run)?;
        if !params.dry_run {
            *obj = serde_json::from_value(created)?;
        }
        Ok(())
    }

    async fn update<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()> {
        self.write_update(obj, false, params)
    }

    async fn delete<K: Object>(&self, obj: &K, params: &DeleteParams) -> Result<()> {
        let (gvk, _) = self.to_value(obj)?;
        let key = ObjectKey::from_object(obj);

        let existing = self.tracker.get(&gvk, &key.namespace, &key.name)?;
        if params.dry_run {
            return Ok(());
        }

        let has_finalizers = extract_metadata(&existing)?
            .finalizers
            .is_some_and(|f| !f.is_empty());
        if has_finalizers {
            self.tracker.mark_deleted(&gvk, &key.namespace, &key.name)?;
        } else {
            self.tracker.delete(&gvk, &key.namespace, &key.name)?;
        }
        Ok(())
    }

    async fn patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<()> {
        self.write_patch(obj, patch, false, params)
    }

    async fn delete_all_of<K: Object>(
        &self,
        kind: &K,
        namespace: Option<&str>,
        dp: &DeleteParams,
        lp: &ListParams,
    ) -> Result<()> {
        let values = self.select(kind, namespace, lp)?;
        for value in values {
            let obj: K = serde_json::from_value(value)?;
            self.delete(&obj, dp).await?;
        }
        Ok(())
    }

    fn status(&self) -> Result<Self::Status<'_>> {
        Ok(FakeStatusWriter { client: self })
    }
}

/// Status subresource writer of a [`FakeClient`]
pub struct FakeStatusWriter<'a> {
    client: &'a FakeClient,
}

#[async_trait]
impl StatusWriter for FakeStatusWriter<'_> {
    async fn update<K: Object>(&self, obj: &mut K, params: &PostParams) -> Result<()> {
        self.client.write_update(obj, true, params)
    }

    async fn patch<K: Object>(
        &self,
        obj: &mut K,
        patch: &Patch<Value>,
        params: &PatchParams,
    ) -> Result<()> {
        self.client.write_patch(obj, patch, true, params)
    }
}
