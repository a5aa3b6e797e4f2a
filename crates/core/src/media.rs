//! Media kinds and the rendering path chosen for each gallery item.
//!
//! An item that carries a video URL renders as a video; everything else
//! renders as a plain image. YouTube links are turned into privacy-enhanced
//! embed URLs sized by the item's aspect ratio.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::layout::effective_aspect_ratio;

/// Host used for YouTube embeds.
const YOUTUBE_EMBED_BASE: &str = "https://www.youtube-nocookie.com/embed";

/// Matches the 11-character video id in the common YouTube URL shapes:
/// `watch?v=`, `youtu.be/`, `embed/`, `shorts/`, `live/` and `v/`.
static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?:https?://)?(?:www\.|m\.|music\.)?
        (?:
            youtu\.be/
          | youtube(?:-nocookie)?\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/|v/)
        )
        ([A-Za-z0-9_-]{11})
        (?:[?&\#/].*)?$",
    )
    .expect("YouTube id pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Parse the stored `media_type` column.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" | "photo" => Ok(MediaKind::Image),
            "video" | "youtube" => Ok(MediaKind::Video),
            other => Err(CoreError::Validation(format!(
                "Unknown media type '{other}'"
            ))),
        }
    }

    /// The kind an item renders as: a video URL always wins.
    pub fn resolve(declared: Option<MediaKind>, video_url: Option<&str>) -> Self {
        match video_url {
            Some(url) if !url.trim().is_empty() => MediaKind::Video,
            _ => declared.unwrap_or(MediaKind::Image),
        }
    }
}

/// How an item is drawn in the grid and the lightbox.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderPath {
    Image {
        url: String,
    },
    YouTube {
        video_id: String,
        embed_url: String,
        /// Used to size the embed frame.
        aspect_ratio: f64,
    },
    /// A video hosted somewhere we cannot embed; rendered as a link over the
    /// poster image.
    ExternalVideo {
        url: String,
        poster_url: String,
        aspect_ratio: f64,
    },
}

/// Extract the YouTube video id from a URL, if it is one.
pub fn youtube_video_id(url: &str) -> Option<String> {
    YOUTUBE_ID
        .captures(url.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Embed URL for a YouTube video id.
pub fn youtube_embed_url(video_id: &str) -> String {
    format!("{YOUTUBE_EMBED_BASE}/{video_id}?rel=0")
}

/// Choose the rendering path for an item.
pub fn render_path(
    image_url: &str,
    video_url: Option<&str>,
    aspect_ratio: Option<f64>,
) -> RenderPath {
    let ratio = effective_aspect_ratio(aspect_ratio);
    match video_url.map(str::trim).filter(|u| !u.is_empty()) {
        None => RenderPath::Image {
            url: image_url.to_string(),
        },
        Some(url) => match youtube_video_id(url) {
            Some(video_id) => RenderPath::YouTube {
                embed_url: youtube_embed_url(&video_id),
                video_id,
                aspect_ratio: ratio,
            },
            None => RenderPath::ExternalVideo {
                url: url.to_string(),
                poster_url: image_url.to_string(),
                aspect_ratio: ratio,
            },
        },
    }
}
