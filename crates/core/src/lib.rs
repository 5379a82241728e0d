pub mod error;
pub mod gemini;
pub mod location;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod render;
pub mod traits;

pub use error::{SearchError, GENERIC_FAILURE_MESSAGE, TEMPORARY_CONNECTIVITY_MESSAGE};
pub use gemini::{
    GeminiClient, GeminiConfig, GroundingChunk, GroundingMetadata, MapsReference, RawCandidate,
    RawModelResponse, DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
pub use location::{EnvLocation, FixedLocation, CURRENT_LOCATION_QUERY, LOCATION_FAILED_MESSAGE};
pub use models::{CategoryTag, GeoLocation, PlaceReference, Radius, SearchFilters, SearchResult};
pub use normalize::{normalize, NO_RESULTS_TEXT};
pub use orchestrator::{PlaceSearch, RequestToken, SearchSession, SessionState};
pub use prompt::{build_prompt, category_clause, distance_clause, PromptPlan, Tool, ToolConfig};
pub use render::{classify_place, format_answer, place_cards, PlaceCard, PlaceKind, Span, TextBlock};
pub use traits::{LocationProvider, PlaceModel};
