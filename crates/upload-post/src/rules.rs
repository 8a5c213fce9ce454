//! Per-platform field rules.
//!
//! One static table describes every platform-specific parameter: which
//! platform and operations it applies to, which API key it is sent under,
//! how its value is coerced and what the host should default it to. The
//! resolver evaluates this table and the parameter schema is generated from
//! it, so the two can never disagree.

use crate::models::{Operation, Platform};

/// How a parameter value is read and coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; blank is unset.
    Text,
    /// Boolean.
    Flag,
    /// Whole number, at least `min`.
    Integer { min: i64 },
    /// Comma-separated list sent as an array.
    List,
    /// Text restricted to a fixed set of values.
    Choice(&'static [&'static str]),
}

/// When a resolved value ends up in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Sent only when set.
    Optional,
    /// Must be set whenever the platform is selected.
    Required,
    /// Always sent; `fallback` is used when unset.
    Always { fallback: &'static str },
    /// Sent only when the value equals the given text.
    OnlyIf(&'static str),
}

/// Default a host applies before the node sees the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Empty,
    Text(&'static str),
    Flag(bool),
    Integer(i64),
}

/// One platform-specific parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub platform: Platform,
    pub operations: &'static [Operation],
    /// Node parameter name, as the host exposes it.
    pub parameter: &'static str,
    /// API field name.
    pub key: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub default: DefaultValue,
}

impl FieldRule {
    const fn new(
        platform: Platform,
        operations: &'static [Operation],
        parameter: &'static str,
        key: &'static str,
        kind: FieldKind,
    ) -> Self {
        let default = match kind {
            FieldKind::Flag => DefaultValue::Flag(false),
            _ => DefaultValue::Empty,
        };
        Self {
            platform,
            operations,
            parameter,
            key,
            kind,
            presence: Presence::Optional,
            default,
        }
    }

    const fn presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    const fn default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub fn applies_to(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}

// ---------------------------------------------------------------------------
// The table
// ---------------------------------------------------------------------------

use self::DefaultValue as D;
use self::FieldKind::{Choice, Flag, Integer, List, Text};
use crate::models::Operation::{UploadPhotos, UploadText, UploadVideo};
use crate::models::Platform::{Facebook, Instagram, LinkedIn, Threads, TikTok, X, YouTube};

const PHOTOS: &[Operation] = &[UploadPhotos];
const VIDEO: &[Operation] = &[UploadVideo];
const TEXT: &[Operation] = &[UploadText];
const PHOTOS_VIDEO: &[Operation] = &[UploadPhotos, UploadVideo];
const VIDEO_TEXT: &[Operation] = &[UploadVideo, UploadText];
const ALL_OPERATIONS: &[Operation] = &[UploadPhotos, UploadVideo, UploadText];

const LINKEDIN_VISIBILITY: &[&str] = &["PUBLIC", "CONNECTIONS", "LOGGED_IN", "CONTAINER"];
const FACEBOOK_VIDEO_STATE: &[&str] = &["PUBLISHED", "DRAFT", "SCHEDULED"];
const TIKTOK_PRIVACY: &[&str] = &[
    "PUBLIC_TO_EVERYONE",
    "MUTUAL_FOLLOW_FRIENDS",
    "FOLLOWER_OF_CREATOR",
    "SELF_ONLY",
];
const INSTAGRAM_PHOTO_MEDIA: &[&str] = &["IMAGE", "STORIES"];
const INSTAGRAM_VIDEO_MEDIA: &[&str] = &["REELS", "STORIES"];
const YOUTUBE_PRIVACY: &[&str] = &["public", "unlisted", "private"];
const YOUTUBE_LICENSE: &[&str] = &["youtube", "creativeCommon"];
const X_REPLY_SETTINGS: &[&str] = &["following", "mentionedUsers", "everyone"];

/// Every platform-specific parameter. Where several rules share an API key
/// (`description`), earlier rules take precedence.
pub static RULES: &[FieldRule] = &[
    // ----- LinkedIn -----
    FieldRule::new(LinkedIn, ALL_OPERATIONS, "targetLinkedinPageId", "target_linkedin_page_id", Text),
    // Photo posts only accept PUBLIC; anything else is left to the API default.
    FieldRule::new(LinkedIn, PHOTOS, "linkedinVisibility", "visibility", Text)
        .presence(Presence::OnlyIf("PUBLIC"))
        .default(D::Text("PUBLIC")),
    FieldRule::new(LinkedIn, VIDEO, "linkedinVisibility", "visibility", Choice(LINKEDIN_VISIBILITY))
        .presence(Presence::Always { fallback: "PUBLIC" })
        .default(D::Text("PUBLIC")),
    FieldRule::new(LinkedIn, VIDEO, "linkedinDescription", "description", Text),
    // ----- Facebook -----
    FieldRule::new(Facebook, ALL_OPERATIONS, "facebookPageId", "facebook_page_id", Text)
        .presence(Presence::Required),
    FieldRule::new(Facebook, VIDEO, "facebookVideoDescription", "description", Text),
    FieldRule::new(Facebook, VIDEO, "facebookVideoState", "video_state", Choice(FACEBOOK_VIDEO_STATE))
        .default(D::Text("PUBLISHED")),
    // ----- TikTok -----
    FieldRule::new(TikTok, PHOTOS, "tiktokAutoAddMusic", "auto_add_music", Flag),
    FieldRule::new(TikTok, PHOTOS_VIDEO, "tiktokDisableComment", "disable_comment", Flag),
    FieldRule::new(TikTok, PHOTOS, "tiktokBrandedContentPhoto", "branded_content", Flag),
    FieldRule::new(TikTok, PHOTOS, "tiktokDiscloseCommercialPhoto", "disclose_commercial", Flag),
    FieldRule::new(TikTok, PHOTOS, "tiktokPhotoCoverIndex", "photo_cover_index", Integer { min: 0 })
        .default(D::Integer(0)),
    FieldRule::new(TikTok, PHOTOS, "tiktokPhotoDescription", "description", Text),
    FieldRule::new(TikTok, VIDEO, "tiktokPrivacyLevel", "privacy_level", Choice(TIKTOK_PRIVACY))
        .default(D::Text("PUBLIC_TO_EVERYONE")),
    FieldRule::new(TikTok, VIDEO, "tiktokDisableDuet", "disable_duet", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokDisableStitch", "disable_stitch", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokCoverTimestamp", "cover_timestamp", Integer { min: 0 })
        .default(D::Integer(1000)),
    FieldRule::new(TikTok, VIDEO, "tiktokBrandContentToggle", "brand_content_toggle", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokBrandOrganic", "brand_organic", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokBrandedContentVideo", "branded_content", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokBrandOrganicToggle", "brand_organic_toggle", Flag),
    FieldRule::new(TikTok, VIDEO, "tiktokIsAigc", "is_aigc", Flag),
    // ----- Instagram -----
    FieldRule::new(Instagram, PHOTOS, "instagramPhotoMediaType", "media_type", Choice(INSTAGRAM_PHOTO_MEDIA))
        .presence(Presence::Always { fallback: "IMAGE" })
        .default(D::Text("IMAGE")),
    FieldRule::new(Instagram, VIDEO, "instagramVideoMediaType", "media_type", Choice(INSTAGRAM_VIDEO_MEDIA))
        .presence(Presence::Always { fallback: "REELS" })
        .default(D::Text("REELS")),
    FieldRule::new(Instagram, VIDEO, "instagramShareToFeed", "share_to_feed", Flag)
        .default(D::Flag(true)),
    FieldRule::new(Instagram, VIDEO, "instagramCollaborators", "collaborators", List),
    FieldRule::new(Instagram, VIDEO, "instagramCoverUrl", "cover_url", Text),
    FieldRule::new(Instagram, VIDEO, "instagramAudioName", "audio_name", Text),
    FieldRule::new(Instagram, VIDEO, "instagramUserTags", "user_tags", List),
    FieldRule::new(Instagram, VIDEO, "instagramLocationId", "location_id", Text),
    FieldRule::new(Instagram, VIDEO, "instagramThumbOffset", "thumb_offset", Text),
    // ----- YouTube -----
    FieldRule::new(YouTube, VIDEO, "youtubeDescription", "description", Text),
    FieldRule::new(YouTube, VIDEO, "youtubeTags", "tags", List),
    FieldRule::new(YouTube, VIDEO, "youtubeCategoryId", "categoryId", Text).default(D::Text("22")),
    FieldRule::new(YouTube, VIDEO, "youtubePrivacyStatus", "privacyStatus", Choice(YOUTUBE_PRIVACY))
        .default(D::Text("public")),
    FieldRule::new(YouTube, VIDEO, "youtubeEmbeddable", "embeddable", Flag).default(D::Flag(true)),
    FieldRule::new(YouTube, VIDEO, "youtubeLicense", "license", Choice(YOUTUBE_LICENSE))
        .default(D::Text("youtube")),
    FieldRule::new(YouTube, VIDEO, "youtubePublicStatsViewable", "publicStatsViewable", Flag)
        .default(D::Flag(true)),
    FieldRule::new(YouTube, VIDEO, "youtubeMadeForKids", "madeForKids", Flag),
    // ----- Threads -----
    FieldRule::new(Threads, VIDEO_TEXT, "threadsDescription", "description", Text),
    // ----- X -----
    FieldRule::new(X, VIDEO_TEXT, "xTaggedUserIds", "tagged_user_ids", List),
    FieldRule::new(X, VIDEO_TEXT, "xReplySettings", "reply_settings", Choice(X_REPLY_SETTINGS))
        .default(D::Text("following")),
    FieldRule::new(X, VIDEO, "xNullcastVideo", "nullcast", Flag),
    FieldRule::new(X, VIDEO, "xPlaceIdVideo", "place_id", Text),
    FieldRule::new(X, VIDEO, "xPollDurationVideo", "poll_duration", Integer { min: 0 })
        .default(D::Integer(1440)),
    FieldRule::new(X, VIDEO, "xPollOptionsVideo", "poll_options", List),
    FieldRule::new(X, VIDEO, "xPollReplySettingsVideo", "poll_reply_settings", Choice(X_REPLY_SETTINGS))
        .default(D::Text("following")),
    FieldRule::new(X, TEXT, "xPostUrlText", "post_url", Text),
];

/// Rules for any of `platforms` when publishing `operation`, in table order.
pub fn rules_for(
    operation: Operation,
    platforms: &[Platform],
) -> impl Iterator<Item = &'static FieldRule> + '_ {
    RULES
        .iter()
        .filter(move |r| platforms.contains(&r.platform) && r.applies_to(operation))
}

/// Every platform-specific parameter name that may be read for `operation`.
pub fn parameter_names(operation: Operation) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for rule in RULES.iter().filter(|r| r.applies_to(operation)) {
        if !names.contains(&rule.parameter) {
            names.push(rule.parameter);
        }
    }
    names
}
