/// Track and playlist domain types
use super::ids::TrackId;
use serde::{Deserialize, Deserializer, Serialize};

/// A track as shown in playlists and search results
///
/// Tracks are immutable once fetched; identity is the external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// External track id
    #[serde(alias = "spotify_id")]
    pub id: TrackId,

    /// Track title
    pub name: String,

    /// Performing artists, in credit order
    #[serde(deserialize_with = "deserialize_artists")]
    pub artists: Vec<String>,

    /// Album title
    #[serde(default)]
    pub album_name: String,

    /// Album artwork URL
    #[serde(default)]
    pub album_image: Option<String>,
}

impl Track {
    /// Create a track with no artist or album information
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
            album_name: String::new(),
            album_image: None,
        }
    }

    /// Set the artist credits
    #[must_use]
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    /// Set the album title
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album_name = album.into();
        self
    }

    /// Artists joined for display ("A, B")
    pub fn artists_display(&self) -> String {
        self.artists.join(", ")
    }
}

/// The server sends artists either as a list or already joined with ", ".
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtistsWire {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_artists<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ArtistsWire::deserialize(deserializer)? {
        ArtistsWire::List(list) => list,
        ArtistsWire::Joined(joined) => joined
            .split(", ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Another user's playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPlaylist {
    /// Playlist id
    pub id: i64,

    /// Playlist name
    pub name: String,

    /// Tracks in playlist order
    pub tracks: Vec<Track>,
}

/// Result of a recommendation query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The track the recommendations were computed from
    #[serde(rename = "reference_track")]
    pub reference: Track,

    /// Recommended tracks
    pub tracks: Vec<Track>,
}
