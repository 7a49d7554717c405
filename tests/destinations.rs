mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{names, spawn_app, TestApp};

struct Catalog {
    marrakech: i64,
    fes: i64,
    qarawiyyin: i64,
}

async fn catalog(app: &TestApp) -> Catalog {
    let marrakech = app.create_city("Marrakech", "Marrakech-Safi", 31.6295, -7.9811).await;
    let fes = app.create_city("Fès", "Fès-Meknès", 34.0181, -5.0078).await;

    app.create_destination(
        marrakech,
        json!({
            "name": "Bahia Palace",
            "type": "HISTORICAL",
            "price": 70,
            "latitude": 31.6214,
            "longitude": -7.9844,
            "tags": ["palace", "architecture", "historical"],
        }),
    )
    .await;
    app.create_destination(
        marrakech,
        json!({
            "name": "Majorelle Garden",
            "type": "NATURE",
            "price": 150,
            "latitude": 31.6307,
            "longitude": -8.0034,
            "tags": ["garden", "nature"],
        }),
    )
    .await;
    app.create_destination(
        marrakech,
        json!({
            "name": "Jemaa el-Fnaa",
            "type": "CULTURAL",
            "latitude": 31.6258,
            "longitude": -7.9890,
            "tags": ["square", "food"],
        }),
    )
    .await;
    app.create_destination(
        fes,
        json!({
            "name": "Fès el-Bali",
            "type": "HISTORICAL",
            "price": 0,
            "latitude": 34.0608,
            "longitude": -4.9972,
            "tags": ["medina", "unesco", "historical"],
        }),
    )
    .await;
    let qarawiyyin = app.create_destination(
        fes,
        json!({
            "name": "Al Qarawiyyin",
            "type": "EDUCATIONAL",
            "price": 50,
            "latitude": 34.0642,
            "longitude": -4.9978,
            "active": false,
        }),
    )
    .await;

    Catalog {
        marrakech,
        fes,
        qarawiyyin: qarawiyyin["id"].as_i64().unwrap(),
    }
}

fn price(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::String(s) => s.parse().ok(),
        other => other.as_f64(),
    }
}

#[tokio::test]
async fn test_create_destination_returns_full_record() {
    let app = spawn_app().await;
    let city = app.create_city("Chefchaouen", "Tanger-Tétouan-Al Hoceïma", 35.1681, -5.2636).await;

    let created = app
        .create_destination(
            city,
            json!({
                "name": "Blue Pearl Medina",
                "type": "CULTURAL",
                "latitude": 35.1681,
                "longitude": -5.2636,
                "tags": [" blue ", "medina", "blue", ""],
                "imageUrls": ["https://example.com/a.jpg", "https://example.com/b.jpg"],
            }),
        )
        .await;

    assert_eq!(created["type"], "CULTURAL");
    assert_eq!(created["city"]["name"], "Chefchaouen");
    assert_eq!(created["active"], true);
    assert_eq!(created["price"], Value::Null);
    assert_eq!(created["version"], 0);
    assert_eq!(created["tags"], json!(["blue", "medina"]));
    assert_eq!(
        created["imageUrls"],
        json!(["https://example.com/a.jpg", "https://example.com/b.jpg"])
    );
}

#[tokio::test]
async fn test_create_destination_for_unknown_city() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/destinations",
            json!({
                "name": "Nowhere",
                "type": "BEACH",
                "cityId": 404,
                "latitude": 10.0,
                "longitude": 10.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "City not found with id: 404");
}

#[tokio::test]
async fn test_unknown_type_in_body_is_bad_request() {
    let app = spawn_app().await;
    let city = app.create_city("Agadir", "Souss-Massa", 30.4278, -9.5981).await;

    let (status, body) = app
        .post(
            "/api/destinations",
            json!({
                "name": "Agadir Beach",
                "type": "VOLCANO",
                "cityId": city,
                "latitude": 30.4202,
                "longitude": -9.5982,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_listing_hides_inactive_but_get_does_not() {
    let app = spawn_app().await;
    let cities = catalog(&app).await;

    let (status, body) = app.get("/api/destinations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalElements"], 4);
    assert!(!names(&body["data"]["content"]).contains(&"Al Qarawiyyin".to_string()));

    let (status, body) = app
        .post("/api/destinations/search", json!({ "name": "qarawiyyin" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalElements"], 0);

    let (status, body) = app
        .get(&format!("/api/destinations/{}", cities.qarawiyyin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Al Qarawiyyin");
    assert_eq!(body["data"]["active"], false);
}

#[tokio::test]
async fn test_sort_by_price_puts_unpriced_first() {
    let app = spawn_app().await;
    catalog(&app).await;

    let (_, body) = app.get("/api/destinations?sortBy=price").await;
    assert_eq!(
        names(&body["data"]["content"]),
        vec!["Jemaa el-Fnaa", "Fès el-Bali", "Bahia Palace", "Majorelle Garden"]
    );

    let (_, body) = app.get("/api/destinations?sortBy=price&sortDir=DESC").await;
    assert_eq!(
        names(&body["data"]["content"]),
        vec!["Majorelle Garden", "Bahia Palace", "Fès el-Bali", "Jemaa el-Fnaa"]
    );
}

#[tokio::test]
async fn test_search_combines_criteria() {
    let app = spawn_app().await;
    let cities = catalog(&app).await;

    let (status, body) = app
        .post(
            "/api/destinations/search",
            json!({ "type": "HISTORICAL", "minPrice": 0, "maxPrice": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&body["data"]["content"]),
        vec!["Bahia Palace", "Fès el-Bali"]
    );
    for destination in body["data"]["content"].as_array().unwrap() {
        let p = price(&destination["price"]).unwrap();
        assert!((0.0..=100.0).contains(&p));
        assert_eq!(destination["type"], "HISTORICAL");
    }

    let (_, body) = app
        .post(
            "/api/destinations/search",
            json!({ "tags": ["food", "unesco"], "sortBy": "name", "sortDirection": "desc" }),
        )
        .await;
    assert_eq!(
        names(&body["data"]["content"]),
        vec!["Jemaa el-Fnaa", "Fès el-Bali"]
    );

    let (_, body) = app
        .post(
            "/api/destinations/search",
            json!({ "cityId": cities.marrakech, "tags": ["historical"] }),
        )
        .await;
    assert_eq!(names(&body["data"]["content"]), vec!["Bahia Palace"]);

    let (_, body) = app
        .post(
            "/api/destinations/search",
            json!({ "latitude": 31.6295, "longitude": -7.9811, "radiusKm": 5 }),
        )
        .await;
    assert_eq!(body["data"]["totalElements"], 3);

    let (_, body) = app.post("/api/destinations/search", json!({})).await;
    assert_eq!(body["data"]["totalElements"], 4);
}

#[tokio::test]
async fn test_search_reports_invalid_criteria_together() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/destinations/search",
            json!({
                "minPrice": 100,
                "maxPrice": 10,
                "minRating": 6,
                "latitude": 31.6,
                "size": 0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["minPrice", "minRating", "longitude", "radiusKm", "size"] {
        assert!(body["errors"][field].is_string(), "missing {field}: {body}");
    }
}

#[tokio::test]
async fn test_pagination_edges() {
    let app = spawn_app().await;
    catalog(&app).await;

    let (_, body) = app.get("/api/destinations?page=1&size=3").await;
    let page = &body["data"];
    assert_eq!(page["numberOfElements"], 1);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["last"], true);
    assert_eq!(page["hasNext"], false);

    let (_, body) = app.get("/api/destinations?page=9&size=3").await;
    assert_eq!(body["data"]["content"], json!([]));
    assert_eq!(body["data"]["totalElements"], 4);

    let (status, _) = app.get("/api/destinations?size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/destinations?sortBy=latitude").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_by_city_and_by_type() {
    let app = spawn_app().await;
    let cities = catalog(&app).await;

    let (status, body) = app
        .get(&format!("/api/destinations/city/{}", cities.fes))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]["content"]), vec!["Fès el-Bali"]);

    let (status, _) = app.get("/api/destinations/city/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/destinations/type/historical?size=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]["content"]), vec!["Bahia Palace"]);
    assert_eq!(body["data"]["totalElements"], 2);

    let (status, body) = app.get("/api/destinations/type/VOLCANO").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown destination type: VOLCANO");
}

#[tokio::test]
async fn test_types_lists_every_category() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/destinations/types").await;
    assert_eq!(status, StatusCode::OK);
    let types = body["data"].as_array().unwrap();
    assert_eq!(types.len(), 12);
    assert!(types.contains(&json!("MUSEUM")));
}

#[tokio::test]
async fn test_popular_orders_by_rating_then_reviews() {
    let app = spawn_app().await;
    let city = app.create_city("Rabat", "Rabat-Salé-Kénitra", 34.0209, -6.8416).await;

    for name in ["Hassan Tower", "Kasbah of the Udayas", "Chellah", "Closed Museum"] {
        app.create_destination(city, json!({ "name": name })).await;
    }
    // Ratings come from reviews, which this service does not take; set them
    // directly in the store.
    set_rating(&app, "Hassan Tower", 4.5, 10).await;
    set_rating(&app, "Kasbah of the Udayas", 4.5, 40).await;
    set_rating(&app, "Chellah", 4.8, 5).await;
    set_rating(&app, "Closed Museum", 5.0, 500).await;
    set_inactive(&app, "Closed Museum").await;

    let (status, body) = app.get("/api/destinations/popular?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]), vec!["Chellah", "Kasbah of the Udayas"]);

    let (_, body) = app.get("/api/destinations/popular").await;
    assert_eq!(
        names(&body["data"]),
        vec!["Chellah", "Kasbah of the Udayas", "Hassan Tower"]
    );

    let (status, _) = app.get("/api/destinations/popular?limit=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn set_rating(app: &TestApp, name: &str, rating: f64, reviews: i64) {
    use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
    use ziyara_catalog::entities::destination;

    let model = destination::Entity::find()
        .filter(destination::Column::Name.eq(name))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: destination::ActiveModel = model.into();
    active.average_rating = Set(rating);
    active.review_count = Set(reviews);
    active.update(&app.db).await.unwrap();
}

async fn set_inactive(app: &TestApp, name: &str) {
    let (_, body) = app.post("/api/destinations/search", json!({ "name": name })).await;
    let id = body["data"]["content"][0]["id"].as_i64().unwrap();
    let (status, _) = app
        .put(&format!("/api/destinations/{id}"), json!({ "active": false }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_nearby_blue_pearl_scenario() {
    let app = spawn_app().await;
    let chefchaouen = app
        .create_city("Chefchaouen", "Tanger-Tétouan-Al Hoceïma", 35.1681, -5.2636)
        .await;
    app.create_city("Marrakech", "Marrakech-Safi", 31.6295, -7.9811).await;
    app.create_destination(
        chefchaouen,
        json!({ "name": "Blue Pearl Medina", "latitude": 35.1681, "longitude": -5.2636 }),
    )
    .await;
    app.create_destination(
        chefchaouen,
        json!({ "name": "Akchour Waterfalls", "type": "NATURE", "latitude": 35.2386, "longitude": -5.1764 }),
    )
    .await;

    let (status, body) = app
        .get("/api/destinations/nearby?latitude=35.1681&longitude=-5.2636&radiusKm=1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]), vec!["Blue Pearl Medina"]);
    assert!(body["data"][0]["distanceKm"].as_f64().unwrap() < 0.01);

    let (_, body) = app
        .get("/api/destinations/nearby?latitude=31.6295&longitude=-7.9811&radiusKm=1")
        .await;
    assert_eq!(body["data"], json!([]));

    // Default radius of 50 km reaches the waterfalls, closest first.
    let (_, body) = app
        .get("/api/destinations/nearby?latitude=35.1681&longitude=-5.2636")
        .await;
    assert_eq!(
        names(&body["data"]),
        vec!["Blue Pearl Medina", "Akchour Waterfalls"]
    );

    let (status, _) = app
        .get("/api/destinations/nearby?latitude=35.1681&longitude=-5.2636&radiusKm=201")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .get("/api/destinations/nearby?latitude=35.1681&longitude=-5.2636&radiusKm=0")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/destinations/nearby?latitude=35.1681").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partial_update_semantics() {
    let app = spawn_app().await;
    let city = app.create_city("Essaouira", "Marrakech-Safi", 31.5125, -9.7749).await;
    let other = app.create_city("Agadir", "Souss-Massa", 30.4278, -9.5981).await;
    let created = app
        .create_destination(
            city,
            json!({
                "name": "Essaouira Medina",
                "type": "HISTORICAL",
                "price": 25,
                "phone": "+212 524 78 35 32",
                "website": "https://example.com/medina",
                "tags": ["medina", "unesco"],
                "imageUrls": ["https://example.com/m1.jpg"],
            }),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/destinations/{id}"),
            json!({
                "name": null,
                "price": null,
                "phone": null,
                "tags": ["coastal"],
                "version": 0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let updated = &body["data"];
    assert_eq!(updated["name"], "Essaouira Medina");
    assert_eq!(updated["price"], Value::Null);
    assert_eq!(updated["phone"], Value::Null);
    assert_eq!(updated["website"], "https://example.com/medina");
    assert_eq!(updated["tags"], json!(["coastal"]));
    assert_eq!(updated["imageUrls"], json!(["https://example.com/m1.jpg"]));
    assert_eq!(updated["version"], 1);

    let (status, body) = app
        .put(
            &format!("/api/destinations/{id}"),
            json!({ "cityId": other, "imageUrls": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"]["name"], "Agadir");
    assert_eq!(body["data"]["imageUrls"], json!([]));

    let (status, _) = app
        .put(&format!("/api/destinations/{id}"), json!({ "cityId": 999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(&format!("/api/destinations/{id}"), json!({ "price": -5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["price"].is_string());
}

#[tokio::test]
async fn test_stale_version_conflicts() {
    let app = spawn_app().await;
    let city = app.create_city("Tangier", "Tanger-Tétouan-Al Hoceïma", 35.7595, -5.8340).await;
    let id = app
        .create_destination(city, json!({ "name": "Cap Spartel" }))
        .await["id"]
        .as_i64()
        .unwrap();

    let (status, _) = app
        .put(&format!("/api/destinations/{id}"), json!({ "name": "Cape Spartel", "version": 0 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&format!("/api/destinations/{id}"), json!({ "name": "Cap Spartel", "version": 0 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = app.get(&format!("/api/destinations/{id}")).await;
    assert_eq!(body["data"]["name"], "Cape Spartel");
}

#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let app = spawn_app().await;
    let city = app.create_city("Oujda", "Oriental", 34.6814, -1.9086).await;
    let id = app
        .create_destination(city, json!({ "name": "Sidi Yahya Oasis", "tags": ["oasis"] }))
        .await["id"]
        .as_i64()
        .unwrap();

    let (status, body) = app.delete(&format!("/api/destinations/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.delete(&format!("/api/destinations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/api/destinations/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_type_in_body_ignores_case() {
    let app = spawn_app().await;
    let city = app.create_city("Agadir", "Souss-Massa", 30.4278, -9.5981).await;
    let created = app
        .create_destination(city, json!({ "name": "Agadir Beach", "type": "beach" }))
        .await;
    assert_eq!(created["type"], "BEACH");

    let (status, body) = app
        .post("/api/destinations/search", json!({ "type": "Beach" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]["content"]), vec!["Agadir Beach"]);
}

#[tokio::test]
async fn test_price_beyond_stored_precision_is_rejected() {
    let app = spawn_app().await;
    let city = app.create_city("Ifrane", "Fès-Meknès", 33.5228, -5.1106).await;

    for price in [json!(1_000_000_000), json!("12.345")] {
        let (status, body) = app
            .post(
                "/api/destinations",
                json!({
                    "name": "Michlifen",
                    "type": "NATURE",
                    "cityId": city,
                    "latitude": 33.4000,
                    "longitude": -5.1000,
                    "price": price,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["errors"]["price"].is_string(), "{body}");
    }
}
