//! Builder for constructing fake clients with various options

use crate::action::Action;
use crate::client_utils::{extract_gvk, extract_name, extract_namespace};
use crate::fake::FakeClient;
use crate::injector::ErrorInjector;
use crate::key::{KindTarget, ObjectSelector, ResourceType};
use crate::scheme::{Scheme, GVK};
use crate::tracker::ObjectTracker;
use crate::{Error, Result};
use kube::Resource;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// A rule registered on the builder, resolved against the scheme at build time
struct PendingRule {
    action: Action,
    kind: Result<ResourceType>,
    object: ObjectSelector,
    err: Error,
}

/// Builder for creating fake clients
///
/// Provides a fluent API for constructing fake clients with:
/// - A scheme and extra registered types
/// - Initial objects, inline or from YAML fixtures
/// - Status subresources
/// - Injected errors (see [`build_with_injector`](Self::build_with_injector))
///
/// The kinds of all initial objects are registered in the scheme.
///
/// # Example
///
/// ```rust
/// use kube_error_injector::{Client, ClientBuilder, ObjectKey};
/// use k8s_openapi::api::core::v1::ConfigMap;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut cm = ConfigMap::default();
/// cm.metadata.name = Some("test-cm".to_string());
/// cm.metadata.namespace = Some("ns2".to_string());
///
/// let client = ClientBuilder::new().with_object(cm).build()?;
///
/// let mut fetched = ConfigMap::default();
/// client.get(&ObjectKey::new("ns2", "test-cm"), &mut fetched).await?;
/// assert_eq!(fetched.metadata.resource_version.as_deref(), Some("999"));
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    scheme: Option<Scheme>,
    types: Vec<GVK>,
    initial_objects: Vec<Value>,
    with_status_subresource: Vec<GVK>,
    fixture_dir: Option<PathBuf>,
    injected: Vec<PendingRule>,
    seed_errors: Vec<Error>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            scheme: None,
            types: Vec::new(),
            initial_objects: Vec::new(),
            with_status_subresource: Vec::new(),
            fixture_dir: None,
            injected: Vec::new(),
            seed_errors: Vec::new(),
        }
    }

    /// Use `scheme` as the base set of known types
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Register a typed resource without adding any objects of it
    pub fn with_type<K: Resource<DynamicType = ()>>(mut self) -> Self {
        self.types.push(GVK::of::<K>());
        self
    }

    /// Register an untyped or custom kind
    pub fn with_gvk(mut self, gvk: GVK) -> Self {
        self.types.push(gvk);
        self
    }

    /// Add an initial object
    ///
    /// Initial objects are stored as-is when the client is built. Objects
    /// without a resourceVersion get "999". An object that fails to serialize
    /// makes the build fail.
    pub fn with_object<K>(mut self, obj: K) -> Self
    where
        K: Resource + Serialize,
    {
        match serde_json::to_value(&obj) {
            Ok(value) => self.initial_objects.push(value),
            Err(e) => {
                warn!(
                    "Failed to serialize initial object {:?}: {}",
                    obj.meta().name, e
                );
                self.seed_errors.push(e.into());
            }
        }
        self
    }

    /// Add multiple initial objects
    pub fn with_objects<K>(mut self, objects: Vec<K>) -> Self
    where
        K: Resource + Serialize,
    {
        for obj in objects {
            self = self.with_object(obj);
        }
        self
    }

    /// Add initial objects from JSON values
    pub fn with_runtime_objects(mut self, objects: Vec<Value>) -> Self {
        self.initial_objects.extend(objects);
        self
    }

    /// Enable the status subresource for a resource type
    ///
    /// With the status subresource enabled, regular updates keep the stored
    /// status and status updates keep the stored spec.
    pub fn with_status_subresource<K: Resource<DynamicType = ()>>(mut self) -> Self {
        self.with_status_subresource.push(GVK::of::<K>());
        self
    }

    /// Register an injected error; requires [`build_with_injector`](Self::build_with_injector)
    ///
    /// # Example
    ///
    /// ```rust
    /// use kube_error_injector::{Action, Client, ClientBuilder, Error, ObjectKey};
    /// use k8s_openapi::api::core::v1::ConfigMap;
    /// use kube::api::PostParams;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ClientBuilder::new()
    ///     .with_type::<ConfigMap>()
    ///     .with_injected_error(
    ///         Action::Create,
    ///         &ConfigMap::default(),
    ///         ObjectKey::new("ns2", "test-cm1"),
    ///         Error::InvalidRequest("test error".into()),
    ///     )
    ///     .build_with_injector()?;
    ///
    /// let mut cm = ConfigMap::default();
    /// cm.metadata.name = Some("test-cm1".to_string());
    /// cm.metadata.namespace = Some("ns2".to_string());
    /// let err = client.create(&mut cm, &PostParams::default()).await.unwrap_err();
    /// assert_eq!(err.to_string(), "Invalid request: test error");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_injected_error(
        mut self,
        action: Action,
        kind: impl KindTarget,
        object: impl Into<ObjectSelector>,
        err: Error,
    ) -> Self {
        self.injected.push(PendingRule {
            action,
            kind: kind.resource_type(),
            object: object.into(),
            err,
        });
        self
    }

    /// Set the fixture directory for loading YAML fixtures
    ///
    /// This directory will be used as the base path for `load_fixture` calls.
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Load objects from a YAML fixture file
    ///
    /// Supports both single-document and multi-document YAML files (separated by `---`).
    /// Objects without a namespace are placed in "default".
    ///
    /// If a fixture directory was set with `with_fixture_dir`, the path is relative to that directory.
    /// Otherwise, the path is relative to the current working directory.
    pub fn load_fixture(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let fixture_path = match &self.fixture_dir {
            Some(dir) => dir.join(path),
            None => path.as_ref().to_path_buf(),
        };

        let content = std::fs::read_to_string(&fixture_path).map_err(|e| {
            Error::Internal(format!(
                "Failed to read fixture file {:?}: {}",
                fixture_path, e
            ))
        })?;

        use serde::Deserialize;
        for document in serde_yaml::Deserializer::from_str(&content) {
            let mut value = Value::deserialize(document).map_err(|e| {
                Error::Internal(format!("Failed to parse YAML in {:?}: {}", fixture_path, e))
            })?;
            if value.is_null() {
                continue;
            }

            if let Some(metadata) = value.get_mut("metadata").and_then(|m| m.as_object_mut()) {
                metadata
                    .entry("namespace")
                    .or_insert_with(|| Value::String("default".to_string()));
            }

            self.initial_objects.push(value);
        }

        Ok(self)
    }

    /// Load objects from multiple YAML fixture files, in order
    pub fn load_fixtures<P>(mut self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        for path in paths {
            self = self.load_fixture(path)?;
        }
        Ok(self)
    }

    /// Load objects from a YAML fixture file, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if the fixture file cannot be loaded or parsed.
    pub fn load_fixture_or_panic(self, path: impl AsRef<Path>) -> Self {
        self.load_fixture(path).expect("Failed to load fixture")
    }

    /// Load objects from multiple YAML fixture files, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if any fixture file cannot be loaded or parsed.
    pub fn load_fixtures_or_panic<P>(self, paths: impl IntoIterator<Item = P>) -> Self
    where
        P: AsRef<Path>,
    {
        self.load_fixtures(paths).expect("Failed to load fixtures")
    }

    /// Build the fake client
    ///
    /// # Errors
    ///
    /// Returns an error if any initial object cannot be serialized or added, or
    /// if injected errors were registered (use `build_with_injector` for those).
    pub fn build(self) -> Result<FakeClient> {
        if !self.injected.is_empty() {
            return Err(Error::InvalidRequest(
                "injected errors require build_with_injector".to_string(),
            ));
        }
        self.build_fake()
    }

    /// Build the fake client wrapped in an [`ErrorInjector`] holding the
    /// registered injected errors
    ///
    /// # Errors
    ///
    /// Returns an error if any initial object cannot be added or any injected
    /// error names a type unknown to the scheme.
    pub fn build_with_injector(mut self) -> Result<ErrorInjector<FakeClient>> {
        let injected = std::mem::take(&mut self.injected);
        let injector = ErrorInjector::new(self.build_fake()?);
        for rule in injected {
            injector.inject_error(rule.action, rule.kind?, rule.object, rule.err)?;
        }
        Ok(injector)
    }

    fn build_fake(self) -> Result<FakeClient> {
        if let Some(err) = self.seed_errors.into_iter().next() {
            return Err(err);
        }

        let scheme = self.scheme.unwrap_or_default();
        for gvk in self.types {
            scheme.register_gvk(gvk);
        }

        let tracker = ObjectTracker::new();
        for gvk in self.with_status_subresource {
            scheme.register_gvk(gvk.clone());
            tracker.add_status_subresource(gvk);
        }

        // Seeded objects go through add(), not create(), so their
        // resourceVersion starts at "999".
        for obj in self.initial_objects {
            let gvk = extract_gvk(&obj)?;
            let namespace = extract_namespace(&obj);
            let name = extract_name(&obj);
            scheme.register_gvk(gvk.clone());
            tracker.add(&gvk, obj).map_err(|e| {
                Error::Internal(format!(
                    "Failed to add initial {} {}/{}: {}",
                    gvk.kind, namespace, name, e
                ))
            })?;
        }

        Ok(FakeClient {
            tracker: Arc::new(tracker),
            scheme: Arc::new(scheme),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
