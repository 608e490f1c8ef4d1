use uuid::Uuid;

use crate::{
    dto::feedback::{FeedbackList, PostFeedbackRequest, RatingResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Feedback, NewFeedback},
    response::ApiResponse,
    state::AppState,
};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Arithmetic mean of `ratings`, `None` for an empty slice.
pub fn mean_rating(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

pub async fn post_feedback(
    state: &AppState,
    user: &AuthUser,
    payload: PostFeedbackRequest,
) -> AppResult<ApiResponse<Feedback>> {
    if !payload.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&payload.rating) {
        return Err(AppError::BadRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    if state.products.find_by_id(payload.product_id).await?.is_none() {
        return Err(AppError::BadRequest("product not found".into()));
    }

    let feedback = state
        .feedbacks
        .create(NewFeedback {
            product_id: payload.product_id,
            user_id: Some(user.user_id),
            rating: payload.rating,
            comment: payload.comment,
        })
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %feedback.product_id,
        rating = feedback.rating,
        "feedback created"
    );
    Ok(ApiResponse::success(
        "feedback created successfully",
        feedback,
    ))
}

pub async fn list_feedbacks(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<FeedbackList> {
    let items = state.feedbacks.list_for_product(product_id).await?;
    Ok(FeedbackList { items })
}

pub async fn get_rating(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<RatingResponse> {
    let rating = state
        .feedbacks
        .average_rating(product_id)
        .await?
        .unwrap_or(0.0);
    Ok(RatingResponse { rating })
}

pub async fn get_user_feedback(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<Feedback> {
    state
        .feedbacks
        .latest_for_user(user.user_id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("feedback not found".into()))
}

#[cfg(test)]
mod tests {
    use super::mean_rating;

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean_rating(&[]), None);
    }

    #[test]
    fn mean_of_ratings() {
        assert_eq!(mean_rating(&[5.0, 3.0, 4.0]), Some(4.0));
        assert_eq!(mean_rating(&[4.5]), Some(4.5));
    }
}
