use std::path::Path;

use anyhow::Context;
use jiff::civil::Date;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    entities::movie::{self, StringList},
    error::AppResult,
};

// Keeps each INSERT well under SQLite's bound-parameter limit.
const INSERT_BATCH: usize = 500;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    pub overview: String,
    pub release_date: Date,
    pub popularity: f64,
    pub vote_count: u32,
    pub vote_average: f64,
    pub original_language: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    pub poster_url: String,
}

impl NewMovie {
    fn into_active_model(self) -> movie::ActiveModel {
        movie::ActiveModel {
            id: Default::default(),
            title_folded: Set(self.title.to_lowercase()),
            title: Set(self.title),
            overview: Set(self.overview),
            release_date: Set(self.release_date.to_string()),
            popularity: Set(self.popularity),
            vote_count: Set(i64::from(self.vote_count)),
            vote_average: Set(self.vote_average),
            original_language: Set(self.original_language),
            genres: Set(StringList(self.genres)),
            actors: Set(StringList(self.actors)),
            poster_url: Set(self.poster_url),
        }
    }
}

pub async fn insert_movies(db: &DatabaseConnection, movies: Vec<NewMovie>) -> AppResult<u64> {
    if movies.is_empty() {
        return Ok(0);
    }

    let total = movies.len() as u64;
    let models: Vec<movie::ActiveModel> =
        movies.into_iter().map(NewMovie::into_active_model).collect();

    let txn = db.begin().await?;
    for batch in models.chunks(INSERT_BATCH) {
        movie::Entity::insert_many(batch.to_vec()).exec(&txn).await?;
    }
    txn.commit().await?;

    Ok(total)
}

/// Loads `path` into the catalog when the movies table is empty.
pub async fn seed_if_empty(db: &DatabaseConnection, path: &Path) -> anyhow::Result<u64> {
    let existing = movie::Entity::find().count(db).await?;
    if existing > 0 {
        debug!(existing, "catalog already populated, skipping seed");
        return Ok(0);
    }

    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "seed file not found, starting with an empty catalog");
            return Ok(0);
        },
        Err(err) => {
            return Err(err).with_context(|| format!("reading seed file {}", path.display()));
        },
    };

    let movies: Vec<NewMovie> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;

    let inserted = insert_movies(db, movies).await?;
    info!(inserted, path = %path.display(), "seeded movie catalog");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{empty_db, fixture_movies};

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let db = empty_db().await;
        let inserted = insert_movies(&db, fixture_movies()).await.unwrap();
        assert_eq!(inserted, 10);

        let rows = movie::Entity::find().all(&db).await.unwrap();
        let mut ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);

        let amelie = rows.iter().find(|m| m.title == "Amélie").unwrap();
        assert_eq!(amelie.release_date, "2023-03-17");
        assert_eq!(amelie.genres, StringList(vec!["Comedy".into(), "Romance".into()]));
        assert_eq!(amelie.title_folded, "amélie");
    }

    #[tokio::test]
    async fn folded_title_lowercases_beyond_ascii() {
        let db = empty_db().await;
        let new = crate::test_support::movie("ÉCOLE de la Vie", &["Drama"]);
        insert_movies(&db, vec![new]).await.unwrap();

        let row = movie::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(row.title, "ÉCOLE de la Vie");
        assert_eq!(row.title_folded, "école de la vie");
    }

    #[tokio::test]
    async fn seeding_skips_populated_catalog() {
        let db = empty_db().await;
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/movies.json"));

        assert_eq!(seed_if_empty(&db, path).await.unwrap(), 10);
        assert_eq!(seed_if_empty(&db, path).await.unwrap(), 0);
        assert_eq!(movie::Entity::find().count(&db).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn missing_seed_file_is_not_fatal() {
        let db = empty_db().await;
        let inserted = seed_if_empty(&db, Path::new("does/not/exist.json")).await.unwrap();
        assert_eq!(inserted, 0);
    }
}
