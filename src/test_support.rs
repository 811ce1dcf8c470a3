use sea_orm::DatabaseConnection;

use crate::{
    db,
    search::MovieCatalog,
    seed::{self, NewMovie},
};

const FIXTURE: &str = include_str!("../data/movies.json");

pub fn fixture_movies() -> Vec<NewMovie> {
    serde_json::from_str(FIXTURE).expect("fixture movies parse")
}

pub fn movie(title: &str, genres: &[&str]) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        overview: format!("{title} overview"),
        release_date: jiff::civil::date(2000, 1, 1),
        popularity: 10.0,
        vote_count: 100,
        vote_average: 6.0,
        original_language: "en".to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        actors: Vec::new(),
        poster_url: String::new(),
    }
}

pub async fn empty_db() -> DatabaseConnection {
    db::connect_and_migrate("sqlite::memory:").await.expect("in-memory database")
}

/// A catalog holding the ten fixture movies.
pub async fn catalog() -> MovieCatalog {
    let db = empty_db().await;
    seed::insert_movies(&db, fixture_movies()).await.expect("seed fixture");
    MovieCatalog::new(db)
}
