use crate::scheme::GVK;
use crate::utils::{
    deletion_timestamp_equal, ensure_metadata, increment_resource_version, should_be_deleted,
};
use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Resource version given to objects seeded through `add` without one
pub(crate) const SEED_RESOURCE_VERSION: &str = "999";

type ObjectsByName = BTreeMap<String, Value>;
type ObjectsByNamespace = BTreeMap<String, ObjectsByName>;
type ObjectStorage = HashMap<GVK, ObjectsByNamespace>;
type StoredKey = (GVK, String, String);

fn stored_key(gvk: &GVK, namespace: &str, name: &str) -> StoredKey {
    (gvk.clone(), namespace.to_string(), name.to_string())
}

/// In-memory object storage keyed by kind, namespace and name
pub struct ObjectTracker {
    objects: RwLock<ObjectStorage>,
    with_status_subresource: RwLock<HashSet<GVK>>,
    // Objects still at the seed version; their first write yields "1".
    seeded: RwLock<HashSet<StoredKey>>,
}

fn not_found(gvk: &GVK, namespace: &str, name: &str) -> Error {
    Error::NotFound {
        kind: gvk.kind.clone(),
        name: name.to_string(),
        namespace: namespace.to_string(),
    }
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            with_status_subresource: RwLock::new(HashSet::new()),
            seeded: RwLock::new(HashSet::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ObjectStorage> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ObjectStorage> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn seeded(&self) -> RwLockWriteGuard<'_, HashSet<StoredKey>> {
        self.seeded.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Version following `current` for the stored object
    fn next_resource_version(
        &self,
        gvk: &GVK,
        namespace: &str,
        name: &str,
        current: &str,
    ) -> Result<String> {
        if self.seeded().contains(&stored_key(gvk, namespace, name)) {
            return Ok("1".to_string());
        }
        increment_resource_version(current)
    }

    pub fn add_status_subresource(&self, gvk: GVK) {
        self.with_status_subresource
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(gvk);
    }

    pub fn has_status_subresource(&self, gvk: &GVK) -> bool {
        self.with_status_subresource
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(gvk)
    }

    /// Seed an object, bypassing create validation
    pub fn add(&self, gvk: &GVK, mut object: Value) -> Result<Value> {
        let mut meta = extract_metadata(&object)?;
        let namespace = meta.namespace.clone().unwrap_or_default();
        trace!("Adding object: {} in namespace: {}", gvk, namespace);

        let name = meta
            .name
            .clone()
            .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))?;

        if meta.deletion_timestamp.is_some()
            && meta.finalizers.as_ref().is_none_or(|f| f.is_empty())
        {
            return Err(Error::InvalidRequest(format!(
                "refusing to add object {} with metadata.deletionTimestamp but no finalizers",
                name
            )));
        }

        let seeded = meta.resource_version.as_ref().is_none_or(|rv| rv.is_empty());
        if seeded {
            meta.resource_version = Some(SEED_RESOURCE_VERSION.to_string());
        }

        ensure_metadata(&mut meta, &namespace);
        object["metadata"] = serde_json::to_value(&meta)?;

        self.write()
            .entry(gvk.clone())
            .or_default()
            .entry(namespace.clone())
            .or_default()
            .insert(name.clone(), object.clone());

        let key = stored_key(gvk, &namespace, &name);
        if seeded {
            self.seeded().insert(key);
        } else {
            self.seeded().remove(&key);
        }

        debug!("Added object: {}/{}", namespace, name);
        Ok(object)
    }

    pub fn create(&self, gvk: &GVK, mut object: Value, dry_run: bool) -> Result<Value> {
        let mut meta = extract_metadata(&object)?;
        let namespace = meta.namespace.clone().unwrap_or_default();
        trace!("Creating object: {} in namespace: {}", gvk, namespace);

        let name = meta
            .name
            .clone()
            .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))?;

        if meta
            .resource_version
            .as_ref()
            .is_some_and(|rv| !rv.is_empty())
        {
            return Err(Error::InvalidRequest(
                "resourceVersion can not be set for Create requests".to_string(),
            ));
        }

        if self.get(gvk, &namespace, &name).is_ok() {
            return Err(Error::AlreadyExists {
                kind: gvk.kind.clone(),
                name,
                namespace,
            });
        }

        meta.resource_version = Some("1".to_string());
        meta.deletion_timestamp = None;
        ensure_metadata(&mut meta, &namespace);
        object["metadata"] = serde_json::to_value(&meta)?;

        if dry_run {
            return Ok(object);
        }

        self.write()
            .entry(gvk.clone())
            .or_default()
            .entry(namespace.clone())
            .or_default()
            .insert(name.clone(), object.clone());

        debug!("Created object: {}/{}", namespace, name);
        Ok(object)
    }

    pub fn get(&self, gvk: &GVK, namespace: &str, name: &str) -> Result<Value> {
        trace!("Getting object: {} {}/{}", gvk, namespace, name);

        self.read()
            .get(gvk)
            .and_then(|by_ns| by_ns.get(namespace))
            .and_then(|by_name| by_name.get(name))
            .cloned()
            .ok_or_else(|| not_found(gvk, namespace, name))
    }

    /// Replace a stored object
    ///
    /// A non-empty resourceVersion on `object` must match the stored one. With
    /// a status subresource enabled for the kind, a status write keeps the
    /// stored spec and a regular write keeps the stored status.
    pub fn update(
        &self,
        gvk: &GVK,
        mut object: Value,
        is_status: bool,
        dry_run: bool,
    ) -> Result<Value> {
        let meta = extract_metadata(&object)?;
        let namespace = meta.namespace.clone().unwrap_or_default();
        trace!("Updating object: {} in namespace: {}", gvk, namespace);

        let name = meta
            .name
            .clone()
            .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))?;

        let existing = self.get(gvk, &namespace, &name)?;
        let existing_meta = extract_metadata(&existing)?;

        if let (Some(provided_rv), Some(current_rv)) =
            (&meta.resource_version, &existing_meta.resource_version)
        {
            if !provided_rv.is_empty() && provided_rv != current_rv {
                return Err(Error::Conflict(format!(
                    "Resource version mismatch: expected {}, got {}",
                    current_rv, provided_rv
                )));
            }
        }

        if self.has_status_subresource(gvk) {
            let kept = if is_status { "spec" } else { "status" };
            match existing.get(kept) {
                Some(value) => object[kept] = value.clone(),
                None => {
                    if let Some(map) = object.as_object_mut() {
                        map.remove(kept);
                    }
                }
            }
        }

        let new_rv = self.next_resource_version(
            gvk,
            &namespace,
            &name,
            existing_meta.resource_version.as_deref().unwrap_or(""),
        )?;

        let mut new_meta = meta;
        new_meta.resource_version = Some(new_rv);
        new_meta.uid = existing_meta.uid;
        new_meta.creation_timestamp = existing_meta.creation_timestamp;

        if !deletion_timestamp_equal(
            &new_meta.deletion_timestamp,
            &existing_meta.deletion_timestamp,
        ) {
            return Err(Error::InvalidRequest(
                "metadata.deletionTimestamp field is immutable".to_string(),
            ));
        }

        object["metadata"] = serde_json::to_value(&new_meta)?;

        if dry_run {
            return Ok(object);
        }

        if should_be_deleted(&new_meta) {
            return self.delete(gvk, &namespace, &name);
        }

        self.write()
            .get_mut(gvk)
            .and_then(|by_ns| by_ns.get_mut(&namespace))
            .ok_or_else(|| not_found(gvk, &namespace, &name))?
            .insert(name.clone(), object.clone());
        self.seeded().remove(&stored_key(gvk, &namespace, &name));

        debug!("Updated object: {}/{}", namespace, name);
        Ok(object)
    }

    /// Set the deletion timestamp of an object held by finalizers
    pub fn mark_deleted(&self, gvk: &GVK, namespace: &str, name: &str) -> Result<Value> {
        let key = stored_key(gvk, namespace, name);
        let mut storage = self.write();
        let stored = storage
            .get_mut(gvk)
            .and_then(|by_ns| by_ns.get_mut(namespace))
            .and_then(|by_name| by_name.get_mut(name))
            .ok_or_else(|| not_found(gvk, namespace, name))?;

        let mut meta = extract_metadata(stored)?;
        if meta.deletion_timestamp.is_none() {
            meta.deletion_timestamp = Some(Time(chrono::Utc::now()));
            let next = if self.seeded().remove(&key) {
                "1".to_string()
            } else {
                increment_resource_version(meta.resource_version.as_deref().unwrap_or(""))?
            };
            meta.resource_version = Some(next);
            stored["metadata"] = serde_json::to_value(&meta)?;
        }

        debug!("Marked object for deletion: {}/{}", namespace, name);
        Ok(stored.clone())
    }

    pub fn delete(&self, gvk: &GVK, namespace: &str, name: &str) -> Result<Value> {
        trace!("Deleting object: {} {}/{}", gvk, namespace, name);

        let removed = self
            .write()
            .get_mut(gvk)
            .and_then(|by_ns| by_ns.get_mut(namespace))
            .and_then(|by_name| by_name.remove(name))
            .ok_or_else(|| not_found(gvk, namespace, name))?;
        self.seeded().remove(&stored_key(gvk, namespace, name));

        debug!("Deleted object: {}/{}", namespace, name);
        Ok(removed)
    }

    /// Objects of a kind, ordered by namespace then name
    pub fn list(&self, gvk: &GVK, namespace: Option<&str>) -> Vec<Value> {
        trace!("Listing objects: {} in namespace: {:?}", gvk, namespace);

        let storage = self.read();
        let Some(by_ns) = storage.get(gvk) else {
            return Vec::new();
        };

        match namespace {
            Some(ns) => by_ns
                .get(ns)
                .map(|by_name| by_name.values().cloned().collect())
                .unwrap_or_default(),
            None => by_ns
                .values()
                .flat_map(|by_name| by_name.values().cloned())
                .collect(),
        }
    }
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn extract_metadata(object: &Value) -> Result<ObjectMeta> {
    let meta_value = object
        .get("metadata")
        .ok_or_else(|| Error::MetadataError("Object missing metadata field".to_string()))?;

    serde_json::from_value(meta_value.clone())
        .map_err(|e| Error::MetadataError(format!("Failed to parse metadata: {}", e)))
}
