use crate::scheme::GVK;
use crate::{Error, Result};
use serde_json::Value;

pub fn extract_gvk(value: &Value) -> Result<GVK> {
    let api_version = value
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Missing apiVersion".to_string()))?;

    let kind = value
        .get("kind")
        .and_then(|v| v.as_str())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Missing kind".to_string()))?;

    let (group, version) = match api_version.split_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), api_version.to_string()),
    };

    Ok(GVK::new(group, version, kind))
}

fn metadata_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get("metadata")
        .and_then(|m| m.get(field))
        .and_then(|f| f.as_str())
}

pub fn extract_namespace(value: &Value) -> String {
    metadata_str(value, "namespace").unwrap_or_default().to_string()
}

pub fn extract_name(value: &Value) -> String {
    metadata_str(value, "name").unwrap_or_default().to_string()
}
