//! Clients of the external collaborators: the recommendation service and the music platform
//! lookup. Both are traits so the pipelines can run against in-memory fakes.

mod error;
mod lookup;
mod recommender;

pub use error::ServiceError;
pub use lookup::{parse_search_response, search_query, SpotifyLookupClient, TrackLookup};
pub use recommender::{
    extract_track_id, parse_audio_features, parse_recommendations, ReccoBeatsClient,
    RecommendationRequest, RecommendationService, RecommendedTrack,
};
