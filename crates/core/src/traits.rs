use crate::gemini::RawModelResponse;
use crate::models::GeoLocation;
use crate::prompt::PromptPlan;
use crate::SearchError;
use async_trait::async_trait;

#[async_trait]
pub trait PlaceModel {
    /// One outbound call per search. No retry, no streaming.
    async fn generate(&self, plan: &PromptPlan) -> Result<RawModelResponse, SearchError>;
}

pub trait LocationProvider {
    fn current_location(&self) -> Result<GeoLocation, SearchError>;
}
