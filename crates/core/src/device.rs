// crates/core/src/device.rs
//! User-agent classification via substring matching.
//!
//! Deliberately coarse: dashboard breakdowns need "Chrome on Windows,
//! desktop", not a full UA parse. Unrecognized agents classify as
//! Unknown/desktop rather than failing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Coarse device category derived from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }

    /// Parse a stored device type. Unknown values fall back to desktop.
    pub fn parse(value: &str) -> Self {
        match value {
            "mobile" => DeviceType::Mobile,
            "tablet" => DeviceType::Tablet,
            _ => DeviceType::Desktop,
        }
    }
}

/// Device classification for a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_type: DeviceType,
    pub os: String,
    pub browser: String,
}

/// Classify a raw user-agent string into device type, OS, and browser.
///
/// Match order matters: Edge, Opera, and Samsung Internet all embed
/// "Chrome", and Chrome embeds "Safari", so the more specific tokens are
/// checked first. Same for Android (embeds "Linux") and iOS (embeds
/// "like Mac OS X").
pub fn classify_user_agent(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let browser = if ua.contains("edg/") || ua.contains("edga/") || ua.contains("edgios/") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("samsungbrowser") {
        "Samsung Internet"
    } else if ua.contains("firefox/") || ua.contains("fxios/") {
        "Firefox"
    } else if ua.contains("chrome/") || ua.contains("crios/") {
        "Chrome"
    } else if ua.contains("safari/") {
        "Safari"
    } else if ua.contains("msie") || ua.contains("trident/") {
        "Internet Explorer"
    } else {
        "Unknown"
    };

    let os = if ua.contains("windows nt") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("mac os x") {
        "macOS"
    } else if ua.contains("cros ") {
        "ChromeOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    };

    let device_type = if ua.contains("ipad") || (ua.contains("android") && !ua.contains("mobile")) {
        DeviceType::Tablet
    } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("ipod") {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    };

    DeviceInfo {
        device_type,
        os: os.to_string(),
        browser: browser.to_string(),
    }
}
