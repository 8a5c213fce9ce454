//! Tests for field resolution.
//!
//! Everything here is pure: parameters in, `ResolvedRequest` or error out.

use serde_json::{json, Value};

use crate::error::ErrorKind;
use crate::models::{MediaReference, Operation, PayloadValue, Platform};
use crate::params::ParameterBag;
use crate::resolver::{payload_preview, resolve, resolve_parameters};
use crate::UploadPostError;

fn bag(value: Value) -> ParameterBag {
    ParameterBag::from_json(value)
}

fn keys(request: &crate::ResolvedRequest) -> Vec<&str> {
    request.payload.keys().collect()
}

// ============================================================
// Platform filtering
// ============================================================

#[test]
fn text_keeps_only_platforms_that_accept_text() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "facebookPageId": "123",
    }));

    let req = resolve(Operation::UploadText, &[Platform::Facebook, Platform::YouTube], &params).unwrap();

    assert_eq!(req.endpoint, "/upload_text");
    assert_eq!(req.payload.get("platform[]"), Some(&PayloadValue::list(["facebook"])));
    assert_eq!(req.payload.get("facebook_page_id"), Some(&PayloadValue::text("123")));
}

#[test]
fn selection_without_supported_platform_is_rejected() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "photos": "https://a/1.jpg" }));

    let err = resolve(Operation::UploadPhotos, &[Platform::YouTube], &params).unwrap_err();
    assert!(matches!(err, UploadPostError::NoSupportedPlatforms { operation: Operation::UploadPhotos }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn empty_selection_is_a_missing_parameter() {
    let params = bag(json!({ "user": "alice", "title": "Hello" }));
    let err = resolve(Operation::UploadText, &[], &params).unwrap_err();
    assert!(matches!(err, UploadPostError::MissingParameter { parameter: "platform", .. }));
}

#[test]
fn duplicate_platforms_collapse() {
    let params = bag(json!({ "user": "alice", "title": "Hello" }));
    let req = resolve(Operation::UploadText, &[Platform::X, Platform::Threads, Platform::X], &params).unwrap();
    assert_eq!(req.payload.get("platform[]"), Some(&PayloadValue::list(["x", "threads"])));
}

// ============================================================
// Common fields and media
// ============================================================

#[test]
fn tiktok_photo_with_empty_description_sends_only_common_fields() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "photos": ["https://cdn.example/a.jpg"],
        "tiktokPhotoDescription": "",
    }));

    let req = resolve(Operation::UploadPhotos, &[Platform::TikTok], &params).unwrap();

    assert_eq!(keys(&req), vec!["user", "title", "platform[]", "photos[0]"]);
    assert_eq!(
        req.payload.get("photos[0]"),
        Some(&PayloadValue::Media(MediaReference::url("https://cdn.example/a.jpg")))
    );
}

#[test]
fn user_and_title_are_required() {
    let err = resolve(Operation::UploadText, &[Platform::X], &bag(json!({ "title": "t" }))).unwrap_err();
    assert!(matches!(err, UploadPostError::MissingParameter { parameter: "user", platform: None }));

    let err = resolve(Operation::UploadText, &[Platform::X], &bag(json!({ "user": "u", "title": "  " })))
        .unwrap_err();
    assert!(matches!(err, UploadPostError::MissingParameter { parameter: "title", platform: None }));
}

#[test]
fn photos_keep_order_and_skip_blanks() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "photos": ["https://a/1.jpg", "", "{{ $binary.img }}", "  "],
    }));

    let req = resolve(Operation::UploadPhotos, &[Platform::Facebook, Platform::TikTok], &params);
    // Facebook needs a page ID.
    assert!(req.is_err());

    let req = resolve(Operation::UploadPhotos, &[Platform::TikTok], &params).unwrap();
    assert_eq!(
        req.payload.get("photos[0]"),
        Some(&PayloadValue::Media(MediaReference::url("https://a/1.jpg")))
    );
    assert_eq!(
        req.payload.get("photos[1]"),
        Some(&PayloadValue::Media(MediaReference::binary("img")))
    );
    assert!(!req.payload.contains_key("photos[2]"));
}

#[test]
fn photo_and_video_operations_need_media() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "photos": ["", " "] }));
    let err = resolve(Operation::UploadPhotos, &[Platform::TikTok], &params).unwrap_err();
    assert!(matches!(err, UploadPostError::MissingMedia { parameter: "photos", .. }));

    let params = bag(json!({ "user": "alice", "title": "Hello" }));
    let err = resolve(Operation::UploadVideo, &[Platform::YouTube], &params).unwrap_err();
    assert!(matches!(err, UploadPostError::MissingMedia { parameter: "video", .. }));
}

#[test]
fn video_accepts_bare_binary_name_and_caption() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "data",
        "caption": "watch this",
    }));

    let req = resolve(Operation::UploadVideo, &[Platform::TikTok], &params).unwrap();
    assert_eq!(req.endpoint, "/upload");
    assert_eq!(req.payload.get("video"), Some(&PayloadValue::Media(MediaReference::binary("data"))));
    assert_eq!(req.payload.get("caption"), Some(&PayloadValue::text("watch this")));
}

#[test]
fn caption_is_ignored_for_text() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "caption": "nope" }));
    let req = resolve(Operation::UploadText, &[Platform::X], &params).unwrap();
    assert!(!req.payload.contains_key("caption"));
}

// ============================================================
// Platform-specific fields
// ============================================================

#[test]
fn youtube_tags_are_split() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "youtubeTags": "a,b",
    }));

    let req = resolve(Operation::UploadVideo, &[Platform::YouTube], &params).unwrap();
    assert_eq!(req.payload.get("tags"), Some(&PayloadValue::list(["a", "b"])));
}

#[test]
fn empty_optional_fields_are_absent() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "youtubeDescription": "   ",
        "youtubeTags": " , ",
        "youtubeCategoryId": "",
        "youtubeMadeForKids": null,
    }));

    let req = resolve(Operation::UploadVideo, &[Platform::YouTube], &params).unwrap();
    for key in ["description", "tags", "categoryId", "madeForKids"] {
        assert!(!req.payload.contains_key(key), "{key} should be absent");
    }
}

#[test]
fn facebook_without_page_id_is_rejected() {
    let params = bag(json!({ "user": "alice", "title": "Hello" }));

    let err = resolve(Operation::UploadText, &[Platform::Facebook], &params).unwrap_err();

    assert!(matches!(
        err,
        UploadPostError::MissingParameter { parameter: "facebookPageId", platform: Some(Platform::Facebook) }
    ));
    assert!(err.is_configuration());
}

#[test]
fn coercions_apply_per_field_kind() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "tiktokDisableDuet": "true",
        "tiktokCoverTimestamp": "500",
        "tiktokPrivacyLevel": "SELF_ONLY",
        "xTaggedUserIds": [" 1 ", "2"],
    }));

    let req = resolve(Operation::UploadVideo, &[Platform::TikTok, Platform::X], &params).unwrap();
    assert_eq!(req.payload.get("disable_duet"), Some(&PayloadValue::Flag(true)));
    assert_eq!(req.payload.get("cover_timestamp"), Some(&PayloadValue::Number(500.into())));
    assert_eq!(req.payload.get("privacy_level"), Some(&PayloadValue::text("SELF_ONLY")));
    assert_eq!(req.payload.get("tagged_user_ids"), Some(&PayloadValue::list(["1", "2"])));
}

#[test]
fn invalid_choice_is_rejected() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "youtubePrivacyStatus": "secret",
    }));

    let err = resolve(Operation::UploadVideo, &[Platform::YouTube], &params).unwrap_err();
    match err {
        UploadPostError::InvalidParameter { parameter, message } => {
            assert_eq!(parameter, "youtubePrivacyStatus");
            assert!(message.contains("public, unlisted, private"));
        }
        other => panic!("expected an invalid parameter, got {other:?}"),
    }
}

#[test]
fn negative_cover_index_is_rejected() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "photos": "https://a/1.jpg",
        "tiktokPhotoCoverIndex": -1,
    }));

    let err = resolve(Operation::UploadPhotos, &[Platform::TikTok], &params).unwrap_err();
    assert!(matches!(err, UploadPostError::InvalidParameter { ref parameter, .. } if parameter == "tiktokPhotoCoverIndex"));
}

#[test]
fn shared_description_follows_table_order() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "linkedinDescription": "from linkedin",
        "youtubeDescription": "from youtube",
    }));

    // LinkedIn precedes YouTube in the rule table regardless of selection order.
    let req = resolve(Operation::UploadVideo, &[Platform::YouTube, Platform::LinkedIn], &params).unwrap();
    assert_eq!(req.payload.get("description"), Some(&PayloadValue::text("from linkedin")));
}

#[test]
fn later_description_fills_in_when_earlier_is_blank() {
    let params = bag(json!({
        "user": "alice",
        "title": "Hello",
        "video": "https://cdn.example/v.mp4",
        "linkedinDescription": "",
        "youtubeDescription": "from youtube",
    }));

    let req = resolve(Operation::UploadVideo, &[Platform::LinkedIn, Platform::YouTube], &params).unwrap();
    assert_eq!(req.payload.get("description"), Some(&PayloadValue::text("from youtube")));
}

#[test]
fn linkedin_photo_visibility_is_sent_only_when_public() {
    let base = json!({ "user": "alice", "title": "Hello", "photos": "https://a/1.jpg" });

    let public = bag(base.clone()).with("linkedinVisibility", json!("PUBLIC"));
    let req = resolve(Operation::UploadPhotos, &[Platform::LinkedIn], &public).unwrap();
    assert_eq!(req.payload.get("visibility"), Some(&PayloadValue::text("PUBLIC")));

    let connections = bag(base).with("linkedinVisibility", json!("CONNECTIONS"));
    let req = resolve(Operation::UploadPhotos, &[Platform::LinkedIn], &connections).unwrap();
    assert!(!req.payload.contains_key("visibility"));
}

#[test]
fn always_fields_fall_back_when_unset() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "video": "https://a/v.mp4" }));

    let req = resolve(Operation::UploadVideo, &[Platform::LinkedIn, Platform::Instagram], &params).unwrap();
    assert_eq!(req.payload.get("visibility"), Some(&PayloadValue::text("PUBLIC")));
    assert_eq!(req.payload.get("media_type"), Some(&PayloadValue::text("REELS")));

    let params = bag(json!({ "user": "alice", "title": "Hello", "photos": "https://a/1.jpg" }));
    let req = resolve(Operation::UploadPhotos, &[Platform::Instagram], &params).unwrap();
    assert_eq!(req.payload.get("media_type"), Some(&PayloadValue::text("IMAGE")));
}

#[test]
fn linkedin_visibility_is_omitted_for_text() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "linkedinVisibility": "PUBLIC" }));
    let req = resolve(Operation::UploadText, &[Platform::LinkedIn], &params).unwrap();
    assert!(!req.payload.contains_key("visibility"));
}

// ============================================================
// Reading operation and platforms from the bag
// ============================================================

#[test]
fn resolve_parameters_reads_operation_and_platforms() {
    let params = bag(json!({
        "operation": "uploadText",
        "platform": "x, threads",
        "user": "alice",
        "title": "Hello",
        "xPostUrlText": "https://example.com",
    }));

    let req = resolve_parameters(&params).unwrap();
    assert_eq!(req.operation, Operation::UploadText);
    assert_eq!(req.payload.get("platform[]"), Some(&PayloadValue::list(["x", "threads"])));
    assert_eq!(req.payload.get("post_url"), Some(&PayloadValue::text("https://example.com")));
}

#[test]
fn unknown_names_are_configuration_errors() {
    let err = resolve_parameters(&bag(json!({ "operation": "uploadAudio" }))).unwrap_err();
    assert!(matches!(err, UploadPostError::UnknownOperation(ref op) if op == "uploadAudio"));

    let err = resolve_parameters(&bag(json!({ "operation": "uploadText", "platform": ["myspace"] })))
        .unwrap_err();
    assert!(matches!(err, UploadPostError::UnknownPlatform(ref p) if p == "myspace"));
    assert!(err.is_configuration());
}

#[test]
fn preview_shows_binary_references_by_name() {
    let params = bag(json!({ "user": "alice", "title": "Hello", "video": "$binary.clip" }));
    let req = resolve(Operation::UploadVideo, &[Platform::YouTube], &params).unwrap();

    let preview = payload_preview(&req.payload);
    assert_eq!(preview["video"], json!("{{ $binary.clip }}"));
    assert_eq!(preview["platform[]"], json!(["youtube"]));
}
