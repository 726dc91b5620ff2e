//! Balloon textures
//!
//! Balloons wear attendee thumbnails. With an API key configured they come
//! from the event's RSVP list; without one the built-in list is used.
//! Image decoding is the renderer's business; the core only needs a source
//! and a size per texture.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BALLOON_SIZE;

/// A balloon image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    /// URL or asset path
    pub source: String,
    pub size: Vec2,
}

impl Texture {
    /// Thumbnail-sized texture
    pub fn thumbnail(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            size: Vec2::splat(BALLOON_SIZE),
        }
    }
}

/// Why textures could not be obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    Network(String),
    Parse(String),
    /// Source answered but had no usable image
    Empty,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Parse(msg) => write!(f, "unreadable RSVP list: {msg}"),
            Self::Empty => write!(f, "no attendee photos available"),
        }
    }
}

impl std::error::Error for ContentError {}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Supplies the ordered, non-empty texture set a session plays with
pub trait ContentProvider {
    fn fetch_entity_textures(&mut self) -> Result<Vec<Texture>, ContentError>;
}

/// Minimal blocking HTTP GET, supplied by the platform layer
pub trait HttpGet {
    fn get_string(&self, url: &str) -> Result<String, ContentError>;
}

/// Transport for builds without networking; every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl HttpGet for Offline {
    fn get_string(&self, url: &str) -> Result<String, ContentError> {
        Err(ContentError::Network(format!("no HTTP transport available for {url}")))
    }
}

/// Where the RSVP list lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Empty means "use the built-in list"
    pub api_key: String,
    pub event_id: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            event_id: "214508992".to_string(),
        }
    }
}

impl ContentConfig {
    pub fn rsvp_url(&self) -> String {
        format!(
            "https://api.meetup.com/2/rsvps?&sign=true&photo-host=public&event_id={}&page=100&key={}",
            self.event_id, self.api_key
        )
    }
}

/// Built-in attendee thumbnails
pub const FALLBACK_THUMBNAILS: &[&str] = &[
    "http://photos1.meetupstatic.com/photos/member/b/2/7/c/thumb_226365692.jpeg",
    "http://photos1.meetupstatic.com/photos/member/6/d/b/2/thumb_109108082.jpeg",
    "http://photos4.meetupstatic.com/photos/member/b/9/b/6/thumb_144407542.jpeg",
    "http://photos2.meetupstatic.com/photos/member/4/0/3/a/thumb_209476442.jpeg",
    "http://photos2.meetupstatic.com/photos/member/d/f/4/7/thumb_241977159.jpeg",
    "http://photos4.meetupstatic.com/photos/member/b/6/1/e/thumb_230986622.jpeg",
    "http://photos4.meetupstatic.com/photos/member/d/2/3/4/thumb_42653812.jpeg",
    "http://photos3.meetupstatic.com/photos/member/3/1/1/1/thumb_12192561.jpeg",
    "http://photos1.meetupstatic.com/photos/member/3/4/9/6/thumb_212473462.jpeg",
    "http://photos3.meetupstatic.com/photos/member/4/8/c/8/thumb_214578632.jpeg",
    "http://photos2.meetupstatic.com/photos/member/4/a/1/2/thumb_41718962.jpeg",
    "http://photos1.meetupstatic.com/photos/member/a/e/b/4/thumb_242084724.jpeg",
    "http://photos4.meetupstatic.com/photos/member/9/7/7/4/thumb_213218772.jpeg",
    "http://photos4.meetupstatic.com/photos/member/6/a/7/4/thumb_189867252.jpeg",
    "http://photos2.meetupstatic.com/photos/member/4/4/b/8/thumb_234917592.jpeg",
    "http://photos2.meetupstatic.com/photos/member/c/c/e/4/thumb_211552452.jpeg",
    "http://photos1.meetupstatic.com/photos/member/c/4/f/6/thumb_148850422.jpeg",
    "http://photos2.meetupstatic.com/photos/member/3/4/f/a/thumb_189133562.jpeg",
    "http://photos3.meetupstatic.com/photos/member/7/5/1/b/thumb_241589979.jpeg",
    "http://photos2.meetupstatic.com/photos/member/5/e/2/1/thumb_241824097.jpeg",
    "http://photos2.meetupstatic.com/photos/member/6/5/6/thumb_68941622.jpeg",
    "http://photos1.meetupstatic.com/photos/member/5/a/0/2/thumb_212723042.jpeg",
];

#[derive(Debug, Deserialize)]
struct RsvpResponse {
    #[serde(default)]
    results: Vec<Rsvp>,
}

#[derive(Debug, Deserialize)]
struct Rsvp {
    #[serde(default)]
    member_photo: Option<MemberPhoto>,
}

#[derive(Debug, Deserialize)]
struct MemberPhoto {
    #[serde(default)]
    thumb_link: Option<String>,
}

/// Thumbnail links of every RSVP that has one, in list order
pub fn parse_rsvp_thumbnails(json: &str) -> Result<Vec<String>, ContentError> {
    let response: RsvpResponse = serde_json::from_str(json)?;
    Ok(response
        .results
        .into_iter()
        .filter_map(|rsvp| rsvp.member_photo.and_then(|photo| photo.thumb_link))
        .filter(|link| !link.is_empty())
        .collect())
}

/// RSVP-backed texture source with a built-in fallback
#[derive(Debug, Clone)]
pub struct MeetupContent<H: HttpGet = Offline> {
    config: ContentConfig,
    http: H,
}

impl<H: HttpGet> MeetupContent<H> {
    pub fn new(config: ContentConfig, http: H) -> Self {
        Self { config, http }
    }

    fn thumbnail_links(&self) -> Result<Vec<String>, ContentError> {
        if self.config.api_key.is_empty() {
            log::info!("No API key configured, using built-in attendee list");
            return Ok(FALLBACK_THUMBNAILS.iter().map(|s| s.to_string()).collect());
        }
        let body = self.http.get_string(&self.config.rsvp_url())?;
        parse_rsvp_thumbnails(&body)
    }
}

impl<H: HttpGet> ContentProvider for MeetupContent<H> {
    fn fetch_entity_textures(&mut self) -> Result<Vec<Texture>, ContentError> {
        let links = self.thumbnail_links()?;
        if links.is_empty() {
            return Err(ContentError::Empty);
        }
        log::info!("Loaded {} balloon textures", links.len());
        Ok(links.into_iter().map(Texture::thumbnail).collect())
    }
}

/// Fixed texture set, handy for tests and offline demos
#[derive(Debug, Clone, Default)]
pub struct StaticContent(pub Vec<Texture>);

impl ContentProvider for StaticContent {
    fn fetch_entity_textures(&mut self) -> Result<Vec<Texture>, ContentError> {
        if self.0.is_empty() {
            Err(ContentError::Empty)
        } else {
            Ok(self.0.clone())
        }
    }
}
