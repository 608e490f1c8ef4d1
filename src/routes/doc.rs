use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, ProfileResponse, SignupRequest, TokenResponse},
        cart::{AddToCartRequest, RemoveFromCartRequest},
        feedback::{FeedbackList, PostFeedbackRequest, RatingResponse},
        products::{CreateProductRequest, ProductList},
    },
    error::ErrorBody,
    models::{Cart, CartItem, Feedback, Product},
    response::{ApiResponse, MessageResponse},
    routes::{auth, cart, feedback, health, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront API", description = "Catalog, cart and feedback endpoints"),
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::profile,
        cart::add_to_cart,
        cart::get_cart,
        cart::remove_from_cart,
        cart::clean_cart,
        products::create_product,
        products::list_products,
        feedback::post_feedback,
        feedback::get_feedbacks,
        feedback::get_rating,
        feedback::get_user_feedback
    ),
    components(
        schemas(
            Product,
            Cart,
            CartItem,
            Feedback,
            SignupRequest,
            LoginRequest,
            TokenResponse,
            ProfileResponse,
            AddToCartRequest,
            RemoveFromCartRequest,
            CreateProductRequest,
            ProductList,
            PostFeedbackRequest,
            FeedbackList,
            RatingResponse,
            params::ProductIdQuery,
            ErrorBody,
            MessageResponse,
            health::HealthData,
            ApiResponse<Product>,
            ApiResponse<Feedback>,
            ApiResponse<TokenResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup, login and profile"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Per-user cart endpoints"),
        (name = "Feedback", description = "Feedback and rating endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
