//! Field resolution: turn one item's parameters into a request.
//!
//! Pure: no I/O, no host calls. Binary media stay as
//! [`MediaReference::Binary`] until the node materializes them.
//!
//! Rules enforced:
//! 1. `user` and `title` are required and non-blank.
//! 2. `platform[]` is the selection filtered to the operation's platforms;
//!    an empty result is an error.
//! 3. Photo and video operations need media.
//! 4. Platform fields come only from [`crate::rules::RULES`] entries whose
//!    platform is selected and whose operations include this one, visited
//!    in table order.

use serde_json::{Number, Value};
use tracing::warn;

use crate::models::{
    filter_platforms, MediaReference, Operation, PayloadValue, Platform, RequestPayload,
    ResolvedRequest,
};
use crate::params::ParameterBag;
use crate::rules::{rules_for, FieldKind, FieldRule, Presence};
use crate::UploadPostError;

/// Parameters read for every operation, in addition to the rule table.
pub const COMMON_PARAMETERS: &[&str] = &["operation", "user", "platform", "title", "photos", "caption", "video"];

/// Resolve a request, reading the operation and the platform selection from
/// the bag itself.
pub fn resolve_parameters(params: &ParameterBag) -> Result<ResolvedRequest, UploadPostError> {
    let operation = read_operation(params)?;
    let platforms = read_platforms(params)?;
    resolve(operation, &platforms, params)
}

/// Resolve a request for an explicit operation and platform selection.
///
/// # Errors
/// Returns a configuration error for missing or invalid input; nothing here
/// touches the network.
pub fn resolve(
    operation: Operation,
    platforms: &[Platform],
    params: &ParameterBag,
) -> Result<ResolvedRequest, UploadPostError> {
    let mut payload = RequestPayload::new();

    // -----------------------------------------------------------------------
    // Common fields
    // -----------------------------------------------------------------------
    let user = params
        .text("user")?
        .ok_or(UploadPostError::MissingParameter { parameter: "user", platform: None })?;
    payload.insert("user", PayloadValue::Text(user));

    let title = params
        .text("title")?
        .ok_or(UploadPostError::MissingParameter { parameter: "title", platform: None })?;
    payload.insert("title", PayloadValue::Text(title));

    if platforms.is_empty() {
        return Err(UploadPostError::MissingParameter { parameter: "platform", platform: None });
    }
    let selected = filter_platforms(operation, platforms);
    if selected.is_empty() {
        return Err(UploadPostError::NoSupportedPlatforms { operation });
    }
    payload.insert(
        "platform[]",
        PayloadValue::list(selected.iter().map(|p| p.as_str())),
    );

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------
    match operation {
        Operation::UploadPhotos => {
            let photos: Vec<MediaReference> = params
                .entries("photos")?
                .iter()
                .filter_map(|raw| MediaReference::parse(raw))
                .collect();
            if photos.is_empty() {
                return Err(UploadPostError::MissingMedia { operation, parameter: "photos" });
            }
            for (index, photo) in photos.into_iter().enumerate() {
                payload.insert(format!("photos[{index}]"), PayloadValue::Media(photo));
            }
        }
        Operation::UploadVideo => {
            let video = params
                .entries("video")?
                .iter()
                .find_map(|raw| MediaReference::parse(raw))
                .ok_or(UploadPostError::MissingMedia { operation, parameter: "video" })?;
            payload.insert("video", PayloadValue::Media(video));
        }
        Operation::UploadText => {}
    }

    if operation != Operation::UploadText {
        if let Some(caption) = params.text("caption")? {
            payload.insert("caption", PayloadValue::Text(caption));
        }
    }

    // -----------------------------------------------------------------------
    // Platform-specific fields
    // -----------------------------------------------------------------------
    for rule in rules_for(operation, &selected) {
        if let Some(value) = evaluate(rule, params)? {
            insert_platform_field(&mut payload, rule, value);
        }
    }

    Ok(ResolvedRequest {
        operation,
        endpoint: operation.endpoint(),
        method: operation.method(),
        payload,
    })
}

/// Read and parse the `operation` parameter.
pub fn read_operation(params: &ParameterBag) -> Result<Operation, UploadPostError> {
    params
        .text("operation")?
        .ok_or(UploadPostError::MissingParameter { parameter: "operation", platform: None })?
        .trim()
        .parse()
}

/// Read and parse the `platform` selection. A single string is accepted as a
/// comma-separated list.
pub fn read_platforms(params: &ParameterBag) -> Result<Vec<Platform>, UploadPostError> {
    params
        .list("platform")?
        .unwrap_or_default()
        .iter()
        .map(|name| name.parse())
        .collect()
}

/// Coerce one rule's parameter and apply its presence policy.
fn evaluate(rule: &FieldRule, params: &ParameterBag) -> Result<Option<PayloadValue>, UploadPostError> {
    let name = rule.parameter;

    let value = match rule.kind {
        FieldKind::Text => params.text(name)?.map(PayloadValue::Text),
        FieldKind::Flag => params.flag(name)?.map(PayloadValue::Flag),
        FieldKind::Integer { min } => match params.integer(name)? {
            Some(n) if n < min => {
                return Err(UploadPostError::invalid(name, format!("must be at least {min}, got {n}")))
            }
            Some(n) => Some(PayloadValue::Number(Number::from(n))),
            None => None,
        },
        FieldKind::List => params.list(name)?.map(PayloadValue::List),
        FieldKind::Choice(allowed) => match params.text(name)? {
            Some(v) if allowed.contains(&v.trim()) => Some(PayloadValue::Text(v.trim().to_owned())),
            Some(v) => {
                return Err(UploadPostError::invalid(
                    name,
                    format!("'{v}' is not one of {}", allowed.join(", ")),
                ))
            }
            None => None,
        },
    };

    Ok(match rule.presence {
        Presence::Optional => value,
        Presence::Required => Some(value.ok_or(UploadPostError::MissingParameter {
            parameter: name,
            platform: Some(rule.platform),
        })?),
        Presence::Always { fallback } => Some(value.unwrap_or_else(|| PayloadValue::text(fallback))),
        Presence::OnlyIf(expected) => {
            value.filter(|v| matches!(v, PayloadValue::Text(t) if t.trim() == expected))
        }
    })
}

/// Insert a platform field. When another selected platform already filled
/// the same API key, the first value wins.
fn insert_platform_field(payload: &mut RequestPayload, rule: &FieldRule, value: PayloadValue) {
    if !payload.contains_key(rule.key) {
        payload.insert(rule.key, value);
        return;
    }

    if payload.get(rule.key) != Some(&value) {
        warn!(
            "dropping '{}' for {}: '{}' already set by another platform",
            rule.parameter, rule.platform, rule.key
        );
    }
}

/// Render a resolved payload as JSON for logs and dry runs. Binary
/// references are shown by property name.
pub fn payload_preview(payload: &RequestPayload) -> Value {
    let mut out = serde_json::Map::new();
    for (key, value) in payload.iter() {
        let json = match value {
            PayloadValue::Text(s) => Value::String(s.clone()),
            PayloadValue::Number(n) => Value::Number(n.clone()),
            PayloadValue::Flag(b) => Value::Bool(*b),
            PayloadValue::List(items) => Value::from(items.clone()),
            PayloadValue::Media(MediaReference::Url { url }) => Value::String(url.clone()),
            PayloadValue::Media(MediaReference::Binary { property }) => {
                Value::String(format!("{{{{ $binary.{property} }}}}"))
            }
            PayloadValue::File(bin) => Value::String(format!(
                "<{} bytes{}>",
                bin.data.len(),
                bin.file_name.as_deref().map(|n| format!(" {n}")).unwrap_or_default()
            )),
        };
        out.insert(key.to_owned(), json);
    }
    Value::Object(out)
}
