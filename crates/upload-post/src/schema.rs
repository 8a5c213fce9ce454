//! Declarative parameter schema.
//!
//! Hosts use this to render the node's inputs and to apply declared defaults
//! before the resolver runs. Platform parameters come straight from the rule
//! table.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Operation, Platform};
use crate::rules::{DefaultValue, FieldKind, Presence, RULES};

/// Input widget type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    String,
    Boolean,
    Number,
    /// Comma-separated list.
    List,
    /// One of `options`.
    Options,
    /// Any subset of `options`.
    MultiOptions,
    /// URL or binary reference; `multiple` for photos.
    Media { multiple: bool },
}

/// One node parameter as a host should present it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub kind: ParameterKind,
    pub required: bool,
    pub default: Value,
    /// Operations that show this parameter.
    pub operations: Vec<Operation>,
    /// Platforms that show this parameter; empty means "always".
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<&'static str>,
}

fn common(name: &'static str, kind: ParameterKind, operations: &[Operation]) -> ParameterDescriptor {
    ParameterDescriptor {
        name,
        kind,
        required: false,
        default: Value::String(String::new()),
        operations: operations.to_vec(),
        platforms: Vec::new(),
        options: Vec::new(),
    }
}

fn common_parameters() -> Vec<ParameterDescriptor> {
    use Operation::*;

    let operation_names: Vec<&'static str> = vec!["uploadPhotos", "uploadVideo", "uploadText"];
    let platform_names: Vec<&'static str> = Platform::ALL.iter().map(|p| p.as_str()).collect();

    vec![
        ParameterDescriptor {
            default: Value::String(UploadPhotos.to_string()),
            required: true,
            options: operation_names,
            ..common("operation", ParameterKind::Options, &Operation::ALL)
        },
        ParameterDescriptor { required: true, ..common("user", ParameterKind::String, &Operation::ALL) },
        ParameterDescriptor {
            required: true,
            default: Value::Array(Vec::new()),
            options: platform_names,
            ..common("platform", ParameterKind::MultiOptions, &Operation::ALL)
        },
        ParameterDescriptor { required: true, ..common("title", ParameterKind::String, &Operation::ALL) },
        ParameterDescriptor {
            required: true,
            default: Value::Array(Vec::new()),
            ..common("photos", ParameterKind::Media { multiple: true }, &[UploadPhotos])
        },
        common("caption", ParameterKind::String, &[UploadPhotos, UploadVideo]),
        ParameterDescriptor {
            required: true,
            ..common("video", ParameterKind::Media { multiple: false }, &[UploadVideo])
        },
    ]
}

fn default_json(default: DefaultValue) -> Value {
    match default {
        DefaultValue::Empty => Value::String(String::new()),
        DefaultValue::Text(s) => Value::String(s.to_owned()),
        DefaultValue::Flag(b) => Value::Bool(b),
        DefaultValue::Integer(n) => Value::from(n),
    }
}

/// Every node parameter: the common ones first, then one entry per
/// platform parameter in rule-table order. Rules sharing a parameter name
/// are merged.
pub fn describe() -> Vec<ParameterDescriptor> {
    let mut out = common_parameters();

    for rule in RULES {
        let (kind, options): (ParameterKind, &[&'static str]) = match rule.kind {
            FieldKind::Text => (ParameterKind::String, &[]),
            FieldKind::Flag => (ParameterKind::Boolean, &[]),
            FieldKind::Integer { .. } => (ParameterKind::Number, &[]),
            FieldKind::List => (ParameterKind::List, &[]),
            FieldKind::Choice(allowed) => (ParameterKind::Options, allowed),
        };

        if let Some(existing) = out.iter_mut().find(|d| d.name == rule.parameter) {
            for &op in rule.operations {
                if !existing.operations.contains(&op) {
                    existing.operations.push(op);
                }
            }
            for &option in options {
                if !existing.options.contains(&option) {
                    existing.options.push(option);
                }
            }
            if !options.is_empty() {
                existing.kind = ParameterKind::Options;
            }
            continue;
        }

        out.push(ParameterDescriptor {
            name: rule.parameter,
            kind,
            required: rule.presence == Presence::Required,
            default: default_json(rule.default),
            operations: rule.operations.to_vec(),
            platforms: vec![rule.platform],
            options: options.to_vec(),
        });
    }

    out
}

/// Declared default for `name` when it is shown for `operation`. Empty text
/// defaults are reported as `None`.
pub fn default_for(name: &str, operation: Operation) -> Option<Value> {
    describe()
        .into_iter()
        .find(|d| d.name == name && d.operations.contains(&operation))
        .map(|d| d.default)
        .filter(|v| !matches!(v, Value::String(s) if s.is_empty()))
}

/// All non-empty defaults for parameters shown with `operation`.
pub fn defaults(operation: Operation) -> Map<String, Value> {
    describe()
        .into_iter()
        .filter(|d| d.operations.contains(&operation))
        .filter(|d| !matches!(&d.default, Value::String(s) if s.is_empty()))
        .filter(|d| !matches!(&d.default, Value::Array(a) if a.is_empty()))
        .map(|d| (d.name.to_owned(), d.default))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameter_names_are_unique() {
        let all = describe();
        for (i, d) in all.iter().enumerate() {
            assert!(
                all.iter().skip(i + 1).all(|other| other.name != d.name),
                "{} listed twice",
                d.name
            );
        }
    }

    #[test]
    fn linkedin_visibility_is_merged_across_operations() {
        let all = describe();
        let visibility = all.iter().find(|d| d.name == "linkedinVisibility").unwrap();
        assert_eq!(visibility.operations, vec![Operation::UploadPhotos, Operation::UploadVideo]);
        assert_eq!(visibility.kind, ParameterKind::Options);
        assert!(visibility.options.contains(&"CONTAINER"));
        assert_eq!(visibility.default, json!("PUBLIC"));
    }

    #[test]
    fn declared_defaults() {
        assert_eq!(default_for("youtubePrivacyStatus", Operation::UploadVideo), Some(json!("public")));
        assert_eq!(default_for("youtubePrivacyStatus", Operation::UploadPhotos), None);
        assert_eq!(default_for("tiktokCoverTimestamp", Operation::UploadVideo), Some(json!(1000)));
        assert_eq!(default_for("instagramShareToFeed", Operation::UploadVideo), Some(json!(true)));
        assert_eq!(default_for("youtubeCategoryId", Operation::UploadVideo), Some(json!("22")));
        assert_eq!(default_for("operation", Operation::UploadText), Some(json!("uploadPhotos")));
        assert_eq!(default_for("youtubeDescription", Operation::UploadVideo), None);
    }

    #[test]
    fn facebook_page_id_is_required() {
        let all = describe();
        let page = all.iter().find(|d| d.name == "facebookPageId").unwrap();
        assert!(page.required);
        assert_eq!(page.platforms, vec![Platform::Facebook]);
    }

    #[test]
    fn defaults_skip_empty_values() {
        let text = defaults(Operation::UploadText);
        assert_eq!(text.get("xReplySettings"), Some(&json!("following")));
        assert!(!text.contains_key("xPostUrlText"));
        assert!(!text.contains_key("platform"));
        assert!(!text.contains_key("tiktokIsAigc"));
    }

    #[test]
    fn schema_serializes_with_camel_case_kinds() {
        let all = describe();
        let photos = all.iter().find(|d| d.name == "photos").unwrap();
        let json = serde_json::to_value(photos).unwrap();
        assert_eq!(json["kind"], json!({ "media": { "multiple": true } }));
        assert_eq!(json["operations"], json!(["uploadPhotos"]));
    }
}
