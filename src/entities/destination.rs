use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Kind of point of interest a destination represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Category {
    #[sea_orm(string_value = "HISTORICAL")]
    Historical,
    #[sea_orm(string_value = "CULTURAL")]
    Cultural,
    #[sea_orm(string_value = "RELIGIOUS")]
    Religious,
    #[sea_orm(string_value = "NATURE")]
    Nature,
    #[sea_orm(string_value = "BEACH")]
    Beach,
    #[sea_orm(string_value = "SHOPPING")]
    Shopping,
    #[sea_orm(string_value = "RESTAURANT")]
    Restaurant,
    #[sea_orm(string_value = "HOTEL")]
    Hotel,
    #[sea_orm(string_value = "ADVENTURE")]
    Adventure,
    #[sea_orm(string_value = "ENTERTAINMENT")]
    Entertainment,
    #[sea_orm(string_value = "EDUCATIONAL")]
    Educational,
    #[sea_orm(string_value = "MUSEUM")]
    Museum,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Historical => "HISTORICAL",
            Category::Cultural => "CULTURAL",
            Category::Religious => "RELIGIOUS",
            Category::Nature => "NATURE",
            Category::Beach => "BEACH",
            Category::Shopping => "SHOPPING",
            Category::Restaurant => "RESTAURANT",
            Category::Hotel => "HOTEL",
            Category::Adventure => "ADVENTURE",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Educational => "EDUCATIONAL",
            Category::Museum => "MUSEUM",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive, so `beach` and `BEACH` are the same category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown destination type: {}", s))
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "destination")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub city_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub active: bool,
    pub average_rating: f64,
    pub review_count: i64,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::city::Entity",
        from = "Column::CityId",
        to = "super::city::Column::Id"
    )]
    City,
    #[sea_orm(has_many = "super::destination_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::destination_tag::Entity")]
    Tags,
}

impl Related<super::city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::City.def()
    }
}

impl Related<super::destination_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::destination_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
