#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::client_utils::extract_gvk;
    use crate::key::{AnyObject, ObjectKey};
    use crate::scheme::{Scheme, GVK};
    use crate::{Action, ClientBuilder, Error};
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::{ConfigMap, Pod};
    use kube::api::{ListParams, PostParams};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::NamespaceResourceScope;
    use serde::{Serialize, Serializer};
    use serde_json::json;
    use std::borrow::Cow;

    #[tokio::test]
    async fn test_builder_with_objects() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("test-pod".to_string());
        pod.metadata.namespace = Some("default".to_string());

        let client = ClientBuilder::new().with_object(pod).build().unwrap();

        let mut fetched = Pod::default();
        client
            .get(&ObjectKey::new("default", "test-pod"), &mut fetched)
            .await
            .unwrap();
        assert_eq!(fetched.metadata.name, Some("test-pod".to_string()));
        assert!(client.scheme().recognizes(&GVK::of::<Pod>()));
    }

    #[tokio::test]
    async fn test_builder_with_runtime_objects() {
        let client = ClientBuilder::new()
            .with_runtime_objects(vec![json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": {"name": "raw", "namespace": "default"},
                "data": {"k": "v"}
            })])
            .build()
            .unwrap();

        let mut cm = ConfigMap::default();
        client
            .get(&ObjectKey::new("default", "raw"), &mut cm)
            .await
            .unwrap();
        assert_eq!(cm.data.unwrap().get("k").map(String::as_str), Some("v"));
    }

    #[test]
    fn test_builder_rejects_runtime_object_without_kind() {
        let result = ClientBuilder::new()
            .with_runtime_objects(vec![json!({"metadata": {"name": "raw"}})])
            .build();
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    /// Resource whose serialization always fails
    struct Unserializable {
        metadata: ObjectMeta,
    }

    impl kube::Resource for Unserializable {
        type DynamicType = ();
        type Scope = NamespaceResourceScope;

        fn kind(_: &()) -> Cow<'_, str> {
            "Unserializable".into()
        }
        fn group(_: &()) -> Cow<'_, str> {
            "example.com".into()
        }
        fn version(_: &()) -> Cow<'_, str> {
            "v1".into()
        }
        fn plural(_: &()) -> Cow<'_, str> {
            "unserializables".into()
        }
        fn meta(&self) -> &ObjectMeta {
            &self.metadata
        }
        fn meta_mut(&mut self) -> &mut ObjectMeta {
            &mut self.metadata
        }
    }

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_builder_fails_on_unserializable_object() {
        let mut obj = Unserializable {
            metadata: ObjectMeta::default(),
        };
        obj.metadata.name = Some("broken".to_string());

        let result = ClientBuilder::new()
            .with_object(obj)
            .with_object(ConfigMap::default())
            .build();
        assert!(matches!(result, Err(Error::SerializationError(_))));
    }

    #[test]
    fn test_builder_with_status_subresource() {
        let client = ClientBuilder::new()
            .with_status_subresource::<Pod>()
            .build()
            .unwrap();
        assert!(client.tracker().has_status_subresource(&GVK::of::<Pod>()));
        assert!(client.scheme().recognizes(&GVK::of::<Pod>()));
    }

    #[test]
    fn test_builder_with_scheme() {
        let scheme = Scheme::new();
        scheme.register::<ConfigMap>();

        let client = ClientBuilder::new()
            .with_scheme(scheme)
            .with_type::<Deployment>()
            .build()
            .unwrap();
        assert!(client.scheme().recognizes(&GVK::of::<ConfigMap>()));
        assert!(client.scheme().recognizes(&GVK::of::<Deployment>()));
        assert!(!client.scheme().recognizes(&GVK::of::<Pod>()));
    }

    #[test]
    fn test_build_refuses_injected_errors() {
        let result = ClientBuilder::new()
            .with_type::<Pod>()
            .with_injected_error(
                Action::Get,
                &Pod::default(),
                AnyObject,
                Error::Internal("x".into()),
            )
            .build();
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn test_build_with_injector_registers_rules() {
        let client = ClientBuilder::new()
            .with_type::<Pod>()
            .with_injected_error(
                Action::Get,
                &Pod::default(),
                AnyObject,
                Error::Internal("x".into()),
            )
            .with_injected_error(
                Action::Delete,
                &Pod::default(),
                ObjectKey::new("default", "p"),
                Error::Internal("y".into()),
            )
            .build_with_injector()
            .unwrap();
        assert_eq!(client.rule_count(), 2);
    }

    #[test]
    fn test_extract_gvk() {
        let obj = json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": { "name": "test" }
        });

        let gvk = extract_gvk(&obj).unwrap();
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");
    }

    #[tokio::test]
    async fn test_load_fixture_single_document() {
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixture("configmap.yaml")
            .unwrap()
            .build()
            .unwrap();

        // ConfigMap should be loaded with default namespace
        let mut cm = ConfigMap::default();
        client
            .get(&ObjectKey::new("default", "app-config"), &mut cm)
            .await
            .unwrap();

        assert_eq!(
            cm.data.as_ref().unwrap().get("database.url").unwrap(),
            "postgres://localhost:5432/mydb"
        );
    }

    #[tokio::test]
    async fn test_load_fixture_multi_document() {
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixture("pods.yaml")
            .unwrap()
            .build()
            .unwrap();

        // First pod should be in default namespace (set automatically)
        let mut pod1 = Pod::default();
        client
            .get(&ObjectKey::new("default", "nginx-pod"), &mut pod1)
            .await
            .unwrap();
        assert_eq!(
            pod1.metadata.labels.as_ref().unwrap().get("app").unwrap(),
            "nginx"
        );

        // Second pod should be in cache namespace (from YAML)
        let mut pod2 = Pod::default();
        client
            .get(&ObjectKey::new("cache", "redis-pod"), &mut pod2)
            .await
            .unwrap();
        assert_eq!(
            pod2.metadata.labels.as_ref().unwrap().get("app").unwrap(),
            "redis"
        );
    }

    #[tokio::test]
    async fn test_load_fixture_or_panic() {
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixture_or_panic("deployment.yaml")
            .build()
            .unwrap();

        let mut deployment = Deployment::default();
        client
            .get(&ObjectKey::new("production", "web-deployment"), &mut deployment)
            .await
            .unwrap();
        assert_eq!(deployment.spec.as_ref().unwrap().replicas, Some(3));
    }

    #[test]
    #[should_panic(expected = "Failed to load fixture")]
    fn test_load_fixture_or_panic_missing_file() {
        ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixture_or_panic("nonexistent.yaml");
    }

    #[tokio::test]
    async fn test_load_fixtures() {
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixtures(["configmap.yaml", "pods.yaml", "deployment.yaml"])
            .unwrap()
            .build()
            .unwrap();

        let pods = client
            .list(&Pod::default(), None, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(pods.len(), 2);

        let mut cm = ConfigMap::default();
        client
            .get(&ObjectKey::new("default", "app-config"), &mut cm)
            .await
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "Failed to load fixtures")]
    fn test_load_fixtures_or_panic_missing_file() {
        ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixtures_or_panic(["configmap.yaml", "nonexistent.yaml"]);
    }

    #[test]
    fn test_load_fixtures_empty_list() {
        let empty: Vec<&str> = Vec::new();
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixtures(empty)
            .unwrap()
            .build()
            .unwrap();
        assert!(!client.scheme().recognizes(&GVK::of::<Pod>()));
    }

    #[test]
    fn test_load_fixtures_error_stops_on_first_failure() {
        let result = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixtures(["nonexistent.yaml", "pods.yaml"]);
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_fixture_objects_can_carry_injected_errors() {
        let client = ClientBuilder::new()
            .with_fixture_dir("fixtures")
            .load_fixture_or_panic("deployment.yaml")
            .with_injected_error(
                Action::Update,
                &Deployment::default(),
                ObjectKey::new("production", "web-deployment"),
                Error::Conflict("test error".into()),
            )
            .build_with_injector()
            .unwrap();

        let mut deployment = Deployment::default();
        let key = ObjectKey::new("production", "web-deployment");
        client.get(&key, &mut deployment).await.unwrap();

        let err = client
            .update(&mut deployment, &PostParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    /// Custom resources must be registered before use
    #[tokio::test]
    async fn test_custom_resource_registration() {
        use kube::CustomResource;
        use schemars::JsonSchema;
        use serde::{Deserialize, Serialize};

        #[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
        #[kube(
            group = "example.com",
            version = "v1",
            kind = "MyApp",
            plural = "myapps",
            namespaced
        )]
        struct MyAppSpec {
            replicas: i32,
            image: String,
        }

        let mut my_app = MyApp::new(
            "test-app",
            MyAppSpec {
                replicas: 3,
                image: "nginx:latest".to_string(),
            },
        );
        my_app.metadata.namespace = Some("default".to_string());

        let unregistered = ClientBuilder::new().build().unwrap();
        let err = unregistered
            .create(&mut my_app.clone(), &PostParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotRegistered { ref kind, .. } if kind == "MyApp"));

        let client = ClientBuilder::new()
            .with_type::<MyApp>()
            .build_with_injector()
            .unwrap();
        client
            .inject_error(
                Action::Delete,
                &my_app,
                AnyObject,
                Error::Internal("test error".into()),
            )
            .unwrap();

        client
            .create(&mut my_app, &PostParams::default())
            .await
            .unwrap();
        assert_eq!(my_app.metadata.resource_version.as_deref(), Some("1"));

        let mut retrieved = MyApp::new(
            "",
            MyAppSpec {
                replicas: 0,
                image: String::new(),
            },
        );
        client
            .get(&ObjectKey::new("default", "test-app"), &mut retrieved)
            .await
            .unwrap();
        assert_eq!(retrieved.spec.replicas, 3);
        assert_eq!(retrieved.spec.image, "nginx:latest");

        assert!(client
            .delete(&retrieved, &kube::api::DeleteParams::default())
            .await
            .is_err());
    }
}
