use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{city, destination, health, image};
use crate::AppState;

/// All API routes. Transport layers (tracing, CORS, rate limiting) are added
/// by the caller.
pub fn create_router(state: AppState) -> Router {
    let city_routes = Router::new()
        .route("/", get(city::list_cities).post(city::create_city))
        .route("/simple", get(city::list_cities_simple))
        .route("/popular", get(city::popular_cities))
        .route("/search", get(city::search_cities))
        .route("/nearby", get(city::nearby_cities))
        .route("/regions", get(city::list_regions))
        .route("/name/{name}", get(city::get_city_by_name))
        .route("/region/{region}", get(city::cities_by_region))
        .route(
            "/{id}",
            get(city::get_city)
                .put(city::update_city)
                .delete(city::delete_city),
        );

    let destination_routes = Router::new()
        .route(
            "/",
            get(destination::list_destinations).post(destination::create_destination),
        )
        .route("/search", post(destination::search_destinations))
        .route("/popular", get(destination::popular_destinations))
        .route("/nearby", get(destination::nearby_destinations))
        .route("/types", get(destination::destination_types))
        .route("/city/{city_id}", get(destination::destinations_by_city))
        .route("/type/{category}", get(destination::destinations_by_type))
        .route(
            "/{id}",
            get(destination::get_destination)
                .put(destination::update_destination)
                .delete(destination::delete_destination),
        )
        // Image metadata, addressed through the owning destination
        .route(
            "/{id}/images",
            get(image::list_images).post(image::attach_image),
        )
        .route("/{id}/images/{image_id}", delete(image::delete_image))
        .route("/{id}/images/{image_id}/reorder", put(image::reorder_image))
        .route("/{id}/images/{image_id}/caption", put(image::update_caption));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/cities", city_routes)
        .nest("/api/destinations", destination_routes)
        .with_state(state)
}
