//! Application constants
//!
//! Storage schema keys, timer defaults and input limits shared by the
//! background, page and UI contexts.

// Durable scope
pub const AUTH_STATE_KEY: &str = "authState";

// Ephemeral scope
pub const ACTIVE_JOB_KEY: &str = "activeJob";
pub const SIDEBAR_SESSION_ID_KEY: &str = "sidebarSessionId";

// Poll loop
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

// Auth relay cadence
pub const RELAY_FAST_INTERVAL_MS: u64 = 1_000;
pub const RELAY_WARMUP_TICKS: u32 = 15;
pub const RELAY_SLOW_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "calrelay-auth-token";

// Submission limits (mirrors the processing service)
pub const MAX_TEXT_INPUT_LENGTH: usize = 50_000;
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const ALLOWED_UPLOAD_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/webm",
    "audio/ogg",
    "audio/m4a",
    "audio/x-m4a",
    "audio/mp4",
    "audio/flac",
    "application/pdf",
    "text/plain",
    "text/markdown",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "message/rfc822",
    "application/vnd.ms-outlook",
];

// Toolbar badge
pub const BADGE_POLLING_TEXT: &str = "…";
pub const BADGE_ERROR_TEXT: &str = "!";
pub const BADGE_POLLING_COLOR: &str = "#6366F1";
pub const BADGE_PROCESSED_COLOR: &str = "#16A34A";
pub const BADGE_ERROR_COLOR: &str = "#DC2626";
