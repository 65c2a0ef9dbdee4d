use serde::{Deserialize, Serialize};

/// Descriptive fields of a catalog row. Ranking never looks at these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub genre: String,
}

impl TrackMetadata {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artists: impl Into<String>,
        album: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: artists.into(),
            album: album.into(),
            genre: genre.into(),
        }
    }
}
