use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::feedback::{FeedbackList, PostFeedbackRequest, RatingResponse},
    error::{AppResult, ErrorBody},
    extract::{AppJson, AppQuery},
    middleware::auth::AuthUser,
    models::Feedback,
    response::ApiResponse,
    routes::params::ProductIdQuery,
    services::feedback_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post", post(post_feedback))
        .route("/get_all", get(get_feedbacks))
        .route("/get_rating", get(get_rating))
        .route("/get_feedback", get(get_user_feedback))
}

#[utoipa::path(
    post,
    path = "/api/feedback/post",
    request_body = PostFeedbackRequest,
    responses(
        (status = 200, description = "Feedback stored", body = ApiResponse<Feedback>),
        (status = 400, description = "Invalid rating or unknown product", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn post_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<PostFeedbackRequest>,
) -> AppResult<Json<ApiResponse<Feedback>>> {
    let resp = feedback_service::post_feedback(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/feedback/get_all",
    params(ProductIdQuery),
    responses(
        (status = 200, description = "All feedback for the product", body = FeedbackList),
        (status = 400, description = "Missing or malformed product_id", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(()),
    tag = "Feedback"
)]
pub async fn get_feedbacks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductIdQuery>,
) -> AppResult<Json<FeedbackList>> {
    let resp = feedback_service::list_feedbacks(&state, query.product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/feedback/get_rating",
    params(ProductIdQuery),
    responses(
        (status = 200, description = "Average rating, 0 without feedback", body = RatingResponse),
        (status = 400, description = "Missing or malformed product_id", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(()),
    tag = "Feedback"
)]
pub async fn get_rating(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductIdQuery>,
) -> AppResult<Json<RatingResponse>> {
    let resp = feedback_service::get_rating(&state, query.product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/feedback/get_feedback",
    params(ProductIdQuery),
    responses(
        (status = 200, description = "Caller's latest feedback on the product", body = Feedback),
        (status = 400, description = "Missing or malformed product_id", body = ErrorBody),
        (status = 404, description = "No feedback yet", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn get_user_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<ProductIdQuery>,
) -> AppResult<Json<Feedback>> {
    let resp = feedback_service::get_user_feedback(&state, &user, query.product_id).await?;
    Ok(Json(resp))
}
