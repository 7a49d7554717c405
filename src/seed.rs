//! Demo catalog of Moroccan cities and destinations, loaded into an empty
//! database on startup.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use crate::entities::destination::Category;
use crate::entities::{city, destination};
use crate::error::{AppError, AppResult};
use crate::store;

struct SeedCity {
    name: &'static str,
    arabic_name: &'static str,
    region: &'static str,
    latitude: f64,
    longitude: f64,
    description: &'static str,
    popular: bool,
}

struct SeedDestination {
    name: &'static str,
    description: &'static str,
    category: Category,
    city: &'static str,
    price: i64,
    latitude: f64,
    longitude: f64,
    rating: f64,
    reviews: i64,
    tags: &'static [&'static str],
    images: &'static [&'static str],
}

const CITIES: &[SeedCity] = &[
    SeedCity {
        name: "Casablanca",
        arabic_name: "الدار البيضاء",
        region: "Casablanca-Settat",
        latitude: 33.5731,
        longitude: -7.5898,
        description: "Economic capital of Morocco",
        popular: true,
    },
    SeedCity {
        name: "Marrakech",
        arabic_name: "مراكش",
        region: "Marrakech-Safi",
        latitude: 31.6295,
        longitude: -7.9811,
        description: "The Red City, famous for its historic medina",
        popular: true,
    },
    SeedCity {
        name: "Fès",
        arabic_name: "فاس",
        region: "Fès-Meknès",
        latitude: 34.0181,
        longitude: -5.0078,
        description: "Cultural capital with the world's oldest university",
        popular: true,
    },
    SeedCity {
        name: "Rabat",
        arabic_name: "الرباط",
        region: "Rabat-Salé-Kénitra",
        latitude: 34.0209,
        longitude: -6.8416,
        description: "Political capital and royal city",
        popular: true,
    },
    SeedCity {
        name: "Tangier",
        arabic_name: "طنجة",
        region: "Tanger-Tétouan-Al Hoceïma",
        latitude: 35.7595,
        longitude: -5.8340,
        description: "Gateway between Africa and Europe",
        popular: true,
    },
    SeedCity {
        name: "Agadir",
        arabic_name: "أكادير",
        region: "Souss-Massa",
        latitude: 30.4278,
        longitude: -9.5981,
        description: "Popular beach resort destination",
        popular: true,
    },
    SeedCity {
        name: "Meknes",
        arabic_name: "مكناس",
        region: "Fès-Meknès",
        latitude: 33.8935,
        longitude: -5.5473,
        description: "Imperial city with beautiful architecture",
        popular: false,
    },
    SeedCity {
        name: "Oujda",
        arabic_name: "وجدة",
        region: "Oriental",
        latitude: 34.6814,
        longitude: -1.9086,
        description: "Eastern gateway with nearby oases",
        popular: false,
    },
    SeedCity {
        name: "Tetouan",
        arabic_name: "تطوان",
        region: "Tanger-Tétouan-Al Hoceïma",
        latitude: 35.5889,
        longitude: -5.3626,
        description: "Andalusian influenced white city",
        popular: false,
    },
    SeedCity {
        name: "Essaouira",
        arabic_name: "الصويرة",
        region: "Marrakech-Safi",
        latitude: 31.5125,
        longitude: -9.7749,
        description: "Coastal city famous for windsurfing",
        popular: true,
    },
    SeedCity {
        name: "Ouarzazate",
        arabic_name: "ورزازات",
        region: "Drâa-Tafilalet",
        latitude: 30.9335,
        longitude: -6.9370,
        description: "Gateway to the Sahara Desert",
        popular: false,
    },
    SeedCity {
        name: "Chefchaouen",
        arabic_name: "شفشاون",
        region: "Tanger-Tétouan-Al Hoceïma",
        latitude: 35.1681,
        longitude: -5.2636,
        description: "The Blue Pearl of Morocco",
        popular: true,
    },
];

const DESTINATIONS: &[SeedDestination] = &[
    SeedDestination {
        name: "Hassan II Mosque",
        description: "One of the largest mosques in the world with a stunning oceanfront location",
        category: Category::Religious,
        city: "Casablanca",
        price: 120,
        latitude: 33.6084,
        longitude: -7.6325,
        rating: 4.8,
        reviews: 96,
        tags: &["mosque", "religious", "architecture", "ocean"],
        images: &[
            "https://example.com/hassan-ii-1.jpg",
            "https://example.com/hassan-ii-2.jpg",
        ],
    },
    SeedDestination {
        name: "Old Medina of Casablanca",
        description: "Historic quarter with traditional souks and authentic Moroccan atmosphere",
        category: Category::Historical,
        city: "Casablanca",
        price: 0,
        latitude: 33.5950,
        longitude: -7.6187,
        rating: 4.1,
        reviews: 34,
        tags: &["medina", "historical", "shopping", "traditional"],
        images: &["https://example.com/medina-casa-1.jpg"],
    },
    SeedDestination {
        name: "Morocco Mall",
        description: "Largest shopping center in Africa with modern amenities",
        category: Category::Shopping,
        city: "Casablanca",
        price: 0,
        latitude: 33.5426,
        longitude: -7.6792,
        rating: 4.2,
        reviews: 58,
        tags: &["shopping", "modern", "family", "entertainment"],
        images: &["https://example.com/morocco-mall-1.jpg"],
    },
    SeedDestination {
        name: "Jemaa el-Fnaa",
        description: "Famous main square and marketplace at the heart of Marrakech",
        category: Category::Cultural,
        city: "Marrakech",
        price: 0,
        latitude: 31.6258,
        longitude: -7.9890,
        rating: 4.6,
        reviews: 104,
        tags: &["square", "cultural", "entertainment", "food"],
        images: &[
            "https://example.com/jemaa-1.jpg",
            "https://example.com/jemaa-2.jpg",
        ],
    },
    SeedDestination {
        name: "Bahia Palace",
        description: "Beautiful 19th century palace with stunning architecture",
        category: Category::Historical,
        city: "Marrakech",
        price: 70,
        latitude: 31.6214,
        longitude: -7.9844,
        rating: 4.5,
        reviews: 77,
        tags: &["palace", "architecture", "historical", "garden"],
        images: &["https://example.com/bahia-1.jpg"],
    },
    SeedDestination {
        name: "Majorelle Garden",
        description: "Exotic garden with a vibrant blue villa and cactus collection",
        category: Category::Nature,
        city: "Marrakech",
        price: 150,
        latitude: 31.6307,
        longitude: -8.0034,
        rating: 4.7,
        reviews: 88,
        tags: &["garden", "nature", "photography", "art"],
        images: &[
            "https://example.com/majorelle-1.jpg",
            "https://example.com/majorelle-2.jpg",
        ],
    },
    SeedDestination {
        name: "Fès el-Bali",
        description: "UNESCO World Heritage medina and largest car-free urban area",
        category: Category::Historical,
        city: "Fès",
        price: 0,
        latitude: 34.0608,
        longitude: -4.9972,
        rating: 4.7,
        reviews: 65,
        tags: &["medina", "unesco", "historical", "maze"],
        images: &["https://example.com/fes-medina-1.jpg"],
    },
    SeedDestination {
        name: "University of Al Qarawiyyin",
        description: "World's oldest continuously operating university",
        category: Category::Educational,
        city: "Fès",
        price: 50,
        latitude: 34.0642,
        longitude: -4.9978,
        rating: 4.4,
        reviews: 23,
        tags: &["university", "historical", "education", "library"],
        images: &["https://example.com/qarawiyyin-1.jpg"],
    },
    SeedDestination {
        name: "Kasbah of the Udayas",
        description: "Historic fortress overlooking the Atlantic Ocean",
        category: Category::Historical,
        city: "Rabat",
        price: 20,
        latitude: 34.0375,
        longitude: -6.8359,
        rating: 4.5,
        reviews: 41,
        tags: &["kasbah", "historical", "ocean", "fortress"],
        images: &["https://example.com/udayas-1.jpg"],
    },
    SeedDestination {
        name: "Hassan Tower",
        description: "Minaret of an incomplete 12th century mosque",
        category: Category::Historical,
        city: "Rabat",
        price: 0,
        latitude: 34.0244,
        longitude: -6.8214,
        rating: 4.3,
        reviews: 37,
        tags: &["tower", "historical", "architecture", "landmark"],
        images: &["https://example.com/hassan-tower-1.jpg"],
    },
    SeedDestination {
        name: "Essaouira Beach",
        description: "Atlantic coast beach suited to water sports",
        category: Category::Beach,
        city: "Essaouira",
        price: 0,
        latitude: 31.5084,
        longitude: -9.7595,
        rating: 4.4,
        reviews: 52,
        tags: &["beach", "ocean", "windsurfing", "relaxation"],
        images: &["https://example.com/essaouira-beach-1.jpg"],
    },
    SeedDestination {
        name: "Essaouira Medina",
        description: "UNESCO World Heritage coastal medina with Portuguese influence",
        category: Category::Historical,
        city: "Essaouira",
        price: 0,
        latitude: 31.5125,
        longitude: -9.7699,
        rating: 4.6,
        reviews: 46,
        tags: &["medina", "unesco", "coastal", "artisan"],
        images: &["https://example.com/essaouira-medina-1.jpg"],
    },
    SeedDestination {
        name: "Blue Pearl Medina",
        description: "Famous blue-painted streets and buildings",
        category: Category::Cultural,
        city: "Chefchaouen",
        price: 0,
        latitude: 35.1681,
        longitude: -5.2636,
        rating: 4.9,
        reviews: 72,
        tags: &["blue", "photography", "medina", "mountain"],
        images: &["https://example.com/chefchaouen-blue-1.jpg"],
    },
    SeedDestination {
        name: "Agadir Beach",
        description: "Modern beach resort with golden sand and surfing",
        category: Category::Beach,
        city: "Agadir",
        price: 0,
        latitude: 30.4202,
        longitude: -9.5982,
        rating: 4.2,
        reviews: 61,
        tags: &["beach", "resort", "surfing", "modern"],
        images: &["https://example.com/agadir-beach-1.jpg"],
    },
];

/// Loads the demo catalog when both catalog tables are empty. Returns whether
/// anything was inserted.
pub async fn seed_demo_data(db: &DatabaseConnection) -> AppResult<bool> {
    let cities = city::Entity::find().count(db).await?;
    let destinations = destination::Entity::find().count(db).await?;
    if cities > 0 || destinations > 0 {
        tracing::info!(cities, destinations, "Catalog already populated, skipping seeding");
        return Ok(false);
    }

    let mut city_ids: HashMap<&'static str, i32> = HashMap::new();
    for seed in CITIES {
        let created = store::cities::create(
            db,
            city::ActiveModel {
                name: Set(seed.name.to_string()),
                arabic_name: Set(Some(seed.arabic_name.to_string())),
                region: Set(seed.region.to_string()),
                latitude: Set(seed.latitude),
                longitude: Set(seed.longitude),
                description: Set(Some(seed.description.to_string())),
                image_url: Set(None),
                is_popular: Set(seed.popular),
                ..Default::default()
            },
        )
        .await?;
        city_ids.insert(seed.name, created.id);
    }
    tracing::info!(count = CITIES.len(), "Seeded cities");

    for seed in DESTINATIONS {
        let city_id = *city_ids
            .get(seed.city)
            .ok_or_else(|| AppError::Internal(format!("Seed city not found: {}", seed.city)))?;

        store::destinations::create(
            db,
            destination::ActiveModel {
                name: Set(seed.name.to_string()),
                description: Set(Some(seed.description.to_string())),
                category: Set(seed.category),
                city_id: Set(city_id),
                price: Set(Some(Decimal::from(seed.price))),
                latitude: Set(seed.latitude),
                longitude: Set(seed.longitude),
                address: Set(None),
                phone: Set(None),
                website: Set(None),
                opening_hours: Set(None),
                active: Set(true),
                average_rating: Set(seed.rating),
                review_count: Set(seed.reviews),
                ..Default::default()
            },
            seed.tags.iter().map(|tag| tag.to_string()).collect(),
            seed.images.iter().map(|url| url.to_string()).collect(),
        )
        .await?;
    }
    tracing::info!(count = DESTINATIONS.len(), "Seeded destinations");

    Ok(true)
}
