//! Batch Bundle construction from a page of NDJSON lines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LoaderError, Result};

/// Type tag carried by every [`ProcessedResource`] produced by the loader.
pub const BUNDLE_RESOURCE_TYPE: &str = "Bundle";

const BATCH_TYPE: &str = "batch";

/// HTTP verb of a batch entry request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Put,
    Post,
}

/// Request part of a batch entry.
///
/// `url` stays a JSON value: a record without `id` uses its `resourceType`
/// value verbatim, which is `null` when the field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub method: HttpVerb,
    pub url: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub resource: Map<String, Value>,
    pub request: BundleRequest,
}

/// `{"resourceType": "Bundle", "type": "batch", "entry": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchBundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "type")]
    pub bundle_type: String,
    pub entry: Vec<BundleEntry>,
}

impl BatchBundle {
    pub fn new(entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: BUNDLE_RESOURCE_TYPE.to_string(),
            bundle_type: BATCH_TYPE.to_string(),
            entry,
        }
    }

    /// Wrap resources into entries, deriving each request with [`request_for`].
    pub fn from_resources(resources: impl IntoIterator<Item = Map<String, Value>>) -> Self {
        let entry = resources
            .into_iter()
            .map(|resource| {
                let request = request_for(&resource);
                BundleEntry { resource, request }
            })
            .collect();
        Self::new(entry)
    }
}

/// One converted page, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResource {
    pub resource_text: String,
    pub resource_count: usize,
    pub resource_file_name: String,
    pub resource_type: String,
}

/// Derive the batch request for a resource.
///
/// A resource with an `id` field (whatever its value) is updated in place
/// with `PUT {resourceType}/{id}`; anything else is created with
/// `POST {resourceType}`. `resourceType` is not validated.
pub fn request_for(resource: &Map<String, Value>) -> BundleRequest {
    match resource.get("id") {
        Some(id) => BundleRequest {
            method: HttpVerb::Put,
            url: Value::String(format!(
                "{}/{}",
                field_text(resource.get("resourceType")),
                field_text(Some(id))
            )),
        },
        None => BundleRequest {
            method: HttpVerb::Post,
            url: resource.get("resourceType").cloned().unwrap_or(Value::Null),
        },
    }
}

// Absent and null fields render as an empty string.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Convert one page of retained NDJSON lines into a batch Bundle.
///
/// Any line that fails to parse as a JSON object fails the whole page.
pub fn build_bundle<S: AsRef<str>>(page: &[S], file_name: &str) -> Result<ProcessedResource> {
    let resources = page
        .iter()
        .map(|line| serde_json::from_str::<Map<String, Value>>(line.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| LoaderError::conversion(file_name, e))?;

    let bundle = BatchBundle::from_resources(resources);
    let resource_count = bundle.entry.len();
    let resource_text =
        serde_json::to_string_pretty(&bundle).map_err(|e| LoaderError::conversion(file_name, e))?;

    Ok(ProcessedResource {
        resource_text,
        resource_count,
        resource_file_name: file_name.to_string(),
        resource_type: BUNDLE_RESOURCE_TYPE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_request_with_id_is_put() {
        let request = request_for(&object(json!({"resourceType": "Patient", "id": "1"})));
        assert_eq!(request.method, HttpVerb::Put);
        assert_eq!(request.url, json!("Patient/1"));
    }

    #[test]
    fn test_request_without_id_is_post() {
        let request = request_for(&object(json!({"resourceType": "Observation"})));
        assert_eq!(request.method, HttpVerb::Post);
        assert_eq!(request.url, json!("Observation"));
    }

    #[test]
    fn test_numeric_id_renders_without_quotes() {
        let request = request_for(&object(json!({"resourceType": "Patient", "id": 42})));
        assert_eq!(request.url, json!("Patient/42"));
    }

    #[test]
    fn test_null_id_still_selects_put() {
        let request = request_for(&object(json!({"resourceType": "Patient", "id": null})));
        assert_eq!(request.method, HttpVerb::Put);
        assert_eq!(request.url, json!("Patient/"));
    }

    #[test]
    fn test_missing_resource_type_is_not_fixed_up() {
        let with_id = request_for(&object(json!({"id": "7"})));
        assert_eq!(with_id.url, json!("/7"));

        let without_id = request_for(&object(json!({"name": "x"})));
        assert_eq!(without_id.method, HttpVerb::Post);
        assert_eq!(without_id.url, Value::Null);
    }

    #[test]
    fn test_http_verb_serialization() {
        assert_eq!(serde_json::to_value(HttpVerb::Put).unwrap(), json!("PUT"));
        assert_eq!(serde_json::to_value(HttpVerb::Post).unwrap(), json!("POST"));
    }

    #[test]
    fn test_build_bundle_counts_entries() {
        let page = vec![
            r#"{"resourceType":"Patient","id":"1"}"#.to_string(),
            r#"{"resourceType":"Patient"}"#.to_string(),
        ];
        let processed = build_bundle(&page, "Patient.ndjson").unwrap();
        assert_eq!(processed.resource_count, 2);
        assert_eq!(processed.resource_file_name, "Patient.ndjson");
        assert_eq!(processed.resource_type, "Bundle");
    }

    #[test]
    fn test_build_bundle_empty_page() {
        let page: Vec<String> = Vec::new();
        let processed = build_bundle(&page, "empty.ndjson").unwrap();
        assert_eq!(processed.resource_count, 0);

        let doc: Value = serde_json::from_str(&processed.resource_text).unwrap();
        assert_eq!(
            doc,
            json!({"resourceType": "Bundle", "type": "batch", "entry": []})
        );
    }

    #[test]
    fn test_build_bundle_output_is_indented_in_field_order() {
        let page = [r#"{"resourceType":"Patient","id":"1","active":true}"#];
        let processed = build_bundle(&page, "p.ndjson").unwrap();
        let text = &processed.resource_text;

        assert!(text.starts_with("{\n  \"resourceType\": \"Bundle\",\n  \"type\": \"batch\","));
        let resource_type = text.find("\"resourceType\": \"Patient\"").unwrap();
        let id = text.find("\"id\": \"1\"").unwrap();
        let active = text.find("\"active\": true").unwrap();
        assert!(resource_type < id && id < active);
        assert!(text.find("\"resource\"").unwrap() < text.find("\"request\"").unwrap());
    }

    #[test]
    fn test_build_bundle_malformed_line_fails_page() {
        let page = [r#"{"resourceType":"Patient"}"#, r#"{"resourceType": "#];
        let err = build_bundle(&page, "broken.ndjson").unwrap_err();
        assert!(err.is_conversion_error());
        assert_eq!(err.file_name(), Some("broken.ndjson"));
    }

    #[test]
    fn test_processed_resource_serializes_camel_case() {
        let processed = build_bundle(&[r#"{"resourceType":"Patient"}"#], "a.ndjson").unwrap();
        let value = serde_json::to_value(&processed).unwrap();
        assert_eq!(value["resourceCount"], json!(1));
        assert_eq!(value["resourceFileName"], json!("a.ndjson"));
        assert_eq!(value["resourceType"], json!("Bundle"));
        assert!(value["resourceText"].is_string());
    }
}
