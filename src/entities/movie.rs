use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    /// `title` lowercased with full Unicode rules. Title matching and ordering run against it.
    pub title_folded: String,
    pub overview: String,
    /// ISO `YYYY-MM-DD`, so lexical order is chronological order.
    pub release_date: String,
    pub popularity: f64,
    pub vote_count: i64,
    pub vote_average: f64,
    pub original_language: String,
    #[sea_orm(column_type = "Json")]
    pub genres: StringList,
    #[sea_orm(column_type = "Json")]
    pub actors: StringList,
    pub poster_url: String,
}

/// A JSON array column. Membership is queried with SQLite's `json_each`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
