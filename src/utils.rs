use crate::scheme::GVK;
use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use rand::Rng;

/// Characters used for generated name suffixes (no vowels, no confusable digits)
const NAME_SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const NAME_SUFFIX_LEN: usize = 5;

pub fn increment_resource_version(current: &str) -> Result<String> {
    match current {
        "" => Ok("1".to_string()),
        v => {
            let num: u64 = v
                .parse()
                .map_err(|_| Error::Internal(format!("Invalid resource version: {}", v)))?;
            Ok((num + 1).to_string())
        }
    }
}

pub fn should_be_deleted(meta: &ObjectMeta) -> bool {
    meta.deletion_timestamp.is_some() && meta.finalizers.as_ref().is_none_or(Vec::is_empty)
}

pub fn ensure_metadata(meta: &mut ObjectMeta, namespace: &str) {
    if namespace.is_empty() {
        meta.namespace = None;
    } else if meta.namespace.is_none() {
        meta.namespace = Some(namespace.to_string());
    }
    if meta.creation_timestamp.is_none() {
        meta.creation_timestamp = Some(Time(chrono::Utc::now()));
    }
    if meta.uid.is_none() {
        meta.uid = Some(uuid::Uuid::new_v4().to_string());
    }
}

pub fn deletion_timestamp_equal(a: &Option<Time>, b: &Option<Time>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.0 == b.0,
        (None, None) => true,
        _ => false,
    }
}

/// `prefix` followed by a short random suffix
pub fn generate_name(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..NAME_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..NAME_SUFFIX_ALPHABET.len());
            NAME_SUFFIX_ALPHABET[idx] as char
        })
        .collect();
    format!("{}{}", prefix, suffix)
}

/// Whether an update of a missing object of this kind creates it
pub fn allows_create_on_update(gvk: &GVK) -> bool {
    match gvk.group.as_str() {
        "coordination.k8s.io" => gvk.kind == "Lease",
        "rbac.authorization.k8s.io" => matches!(
            gvk.kind.as_str(),
            "ClusterRole" | "ClusterRoleBinding" | "Role" | "RoleBinding"
        ),
        "" => matches!(gvk.kind.as_str(), "Endpoints" | "Event" | "LimitRange"),
        _ => false,
    }
}

/// Whether this kind accepts updates without a resourceVersion
pub fn allows_unconditional_update(gvk: &GVK) -> bool {
    let kind = gvk.kind.as_str();
    match gvk.group.as_str() {
        "apps" => matches!(
            kind,
            "ControllerRevision" | "DaemonSet" | "Deployment" | "ReplicaSet" | "StatefulSet"
        ),
        "autoscaling" => kind == "HorizontalPodAutoscaler",
        "batch" => matches!(kind, "CronJob" | "Job"),
        "certificates.k8s.io" => kind == "CertificateSigningRequest",
        "flowcontrol.apiserver.k8s.io" => {
            matches!(kind, "FlowSchema" | "PriorityLevelConfiguration")
        }
        "networking.k8s.io" => matches!(kind, "Ingress" | "IngressClass" | "NetworkPolicy"),
        "rbac.authorization.k8s.io" => matches!(
            kind,
            "ClusterRole" | "ClusterRoleBinding" | "Role" | "RoleBinding"
        ),
        "scheduling.k8s.io" => kind == "PriorityClass",
        "storage.k8s.io" => kind == "StorageClass",
        "discovery.k8s.io" => kind == "EndpointSlice",
        "" => matches!(
            kind,
            "ConfigMap"
                | "Endpoints"
                | "Event"
                | "LimitRange"
                | "Namespace"
                | "Node"
                | "PersistentVolume"
                | "PersistentVolumeClaim"
                | "Pod"
                | "PodTemplate"
                | "ReplicationController"
                | "ResourceQuota"
                | "Secret"
                | "Service"
                | "ServiceAccount"
        ),
        _ => false,
    }
}
