use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Feedback;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostFeedbackRequest {
    #[schema(example = "Works great")]
    pub comment: String,
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: f64,
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FeedbackList {
    #[schema(value_type = Vec<Feedback>)]
    pub items: Vec<Feedback>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    pub rating: f64,
}
