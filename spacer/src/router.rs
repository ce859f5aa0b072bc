//! Route table.

use crate::environment::SpacerEnvironment;
use crate::handlers::{admin, auth, catalog, checkout, listing, pages, profile, review};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use spacer_web::handlers::health_check;
use spacer_web::request_tracing;

/// Largest accepted request body (listing images, avatars)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the front-end router.
///
/// Every page route is wrapped in request tracing; `/health` is included.
pub fn router(env: SpacerEnvironment) -> Router {
    let pages = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        // Catalog and booking
        .route("/spaces", get(catalog::list))
        .route("/spaces/:id", get(catalog::detail))
        .route("/spaces/:id/check", post(catalog::check_dates))
        .route("/spaces/:id/book", post(checkout::book))
        .route("/checkout/return", get(checkout::payment_return))
        // Listing
        .route("/listings/new", get(listing::new_listing))
        .route("/listings", post(listing::create))
        // Profile and reviews
        .route("/profile", get(profile::show).post(profile::update))
        .route("/bookings/:id/review", get(review::show).post(review::submit))
        .route("/bookings/:id/review/check", post(review::check))
        // Back-office
        .route("/admin", get(admin::dashboard))
        .route("/admin/spaces", post(admin::create_space))
        .route("/admin/spaces/:id", post(admin::update_space))
        .route("/admin/spaces/:id/delete", post(admin::delete_space))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/users/:id", post(admin::update_user))
        .route("/admin/users/:id/delete", post(admin::delete_user))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    request_tracing(pages.route("/health", get(health_check))).with_state(env)
}
