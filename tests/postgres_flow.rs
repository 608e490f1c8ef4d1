mod common;

use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, RemoveFromCartRequest},
        feedback::PostFeedbackRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, feedback_service},
    state::AppState,
};
use uuid::Uuid;

use common::{create_product, create_user};

// These run against a real database and skip when none is configured.
// Each test works on its own user so they can share one database in parallel.

#[tokio::test]
async fn cart_and_feedback_against_postgres() -> anyhow::Result<()> {
    let Some(state) = setup_state(5).await? else {
        return Ok(());
    };

    let user = create_user(&state, &unique_email("flow")).await;
    let product = create_product(&state, "Test Widget", 1000).await;

    let empty = cart_service::get_cart(&state, &user).await?;
    assert!(empty.items.is_empty());
    assert_eq!(empty.total, 0);

    for quantity in [2, 3] {
        cart_service::add_to_cart(
            &state,
            &user,
            AddToCartRequest {
                product_id: product.id,
                quantity,
            },
        )
        .await?;
    }

    let cart = cart_service::get_cart(&state, &user).await?;
    assert_eq!(cart.id, empty.id);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.total, 5000);

    cart_service::remove_from_cart(
        &state,
        &user,
        RemoveFromCartRequest {
            product_id: product.id,
        },
    )
    .await?;
    let cart = cart_service::get_cart(&state, &user).await?;
    assert_eq!(cart.items[0].quantity, 4);

    cart_service::clear_cart(&state, &user).await?;
    let fresh = cart_service::get_cart(&state, &user).await?;
    assert_ne!(fresh.id, cart.id);
    assert!(fresh.items.is_empty());

    for rating in [5.0, 3.0, 4.0] {
        feedback_service::post_feedback(
            &state,
            &user,
            PostFeedbackRequest {
                comment: "ok".into(),
                rating,
                product_id: product.id,
            },
        )
        .await?;
    }
    let rating = feedback_service::get_rating(&state, product.id).await?;
    assert_eq!(rating.rating, 4.0);

    Ok(())
}

#[tokio::test]
async fn concurrent_adds_on_postgres_keep_every_unit() -> anyhow::Result<()> {
    const ADDS: i32 = 16;

    let Some(state) = setup_state(8).await? else {
        return Ok(());
    };
    let user = create_user(&state, &unique_email("race")).await;
    let product_id = create_product(&state, "Race Widget", 250).await.id;

    // No cart exists yet, so the first adds also race on creating it.
    let mut handles = Vec::new();
    for _ in 0..ADDS {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            cart_service::add_to_cart(
                &state,
                &user,
                AddToCartRequest {
                    product_id,
                    quantity: 1,
                },
            )
            .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let cart = cart_service::get_cart(&state, &user).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, ADDS);
    assert_eq!(cart.total, 250 * i64::from(ADDS));

    // Concurrent removals walk the line down without skipping a unit.
    let mut handles = Vec::new();
    for _ in 0..ADDS - 1 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            cart_service::remove_from_cart(&state, &user, RemoveFromCartRequest { product_id })
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let cart = cart_service::get_cart(&state, &user).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);

    Ok(())
}

#[tokio::test]
async fn concurrent_first_reads_share_one_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state(8).await? else {
        return Ok(());
    };
    let user = create_user(&state, &unique_email("first-read")).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            cart_service::get_cart(&state, &user).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??.id);
    }
    assert!(ids.iter().all(|id| *id == ids[0]));

    Ok(())
}

#[tokio::test]
async fn overflowing_add_on_postgres_rolls_back() -> anyhow::Result<()> {
    let Some(state) = setup_state(2).await? else {
        return Ok(());
    };
    let user: AuthUser = create_user(&state, &unique_email("overflow")).await;
    let product_id = create_product(&state, "Overflow Widget", 1).await.id;

    let add = |quantity| AddToCartRequest {
        product_id,
        quantity,
    };
    cart_service::add_to_cart(&state, &user, add(i32::MAX)).await?;
    let err = cart_service::add_to_cart(&state, &user, add(5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let cart = cart_service::get_cart(&state, &user).await?;
    assert_eq!(cart.items[0].quantity, i32::MAX);

    Ok(())
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

async fn setup_state(max_connections: u32) -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run Postgres flow tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(Some(AppState::postgres(
        create_orm_conn(pool),
        common::gateway(),
    )))
}
