use std::str::FromStr;

use jiff::civil::Date;
use serde::Serialize;

use crate::entities::movie;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MovieOrderBy {
    #[default]
    ReleaseDate,
    Title,
    Popularity,
    VoteCount,
    VoteAverage,
}

impl MovieOrderBy {
    pub const ALL: [MovieOrderBy; 5] = [
        MovieOrderBy::ReleaseDate,
        MovieOrderBy::Title,
        MovieOrderBy::Popularity,
        MovieOrderBy::VoteCount,
        MovieOrderBy::VoteAverage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MovieOrderBy::ReleaseDate => "ReleaseDate",
            MovieOrderBy::Title => "Title",
            MovieOrderBy::Popularity => "Popularity",
            MovieOrderBy::VoteCount => "VoteCount",
            MovieOrderBy::VoteAverage => "VoteAverage",
        }
    }
}

impl FromStr for MovieOrderBy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "Ascending",
            SortDirection::Descending => "Descending",
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [SortDirection::Ascending, SortDirection::Descending]
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

/// A validated search request. Every filter is optional; absent filters match everything.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieSearchInput {
    pub query: Option<String>,
    pub language: Option<String>,
    /// A movie must carry every listed genre.
    pub genres: Vec<String>,
    /// A movie must credit every listed actor.
    pub actors: Vec<String>,
    pub min_popularity: Option<f64>,
    pub max_popularity: Option<f64>,
    pub min_vote_count: Option<i64>,
    pub max_vote_count: Option<i64>,
    pub min_vote_average: Option<f64>,
    pub max_vote_average: Option<f64>,
    pub order_by: MovieOrderBy,
    pub direction: SortDirection,
    pub cursor: u64,
    pub limit: u64,
}

impl MovieSearchInput {
    pub const DEFAULT_LIMIT: u64 = 20;

    pub fn normalized_query(&self) -> Option<String> {
        self.query.as_deref().map(str::to_lowercase).filter(|q| !q.is_empty())
    }

    pub fn normalized_language(&self) -> Option<String> {
        self.language.as_deref().map(str::to_lowercase).filter(|l| !l.is_empty())
    }
}

impl Default for MovieSearchInput {
    fn default() -> Self {
        Self {
            query: None,
            language: None,
            genres: Vec::new(),
            actors: Vec::new(),
            min_popularity: None,
            max_popularity: None,
            min_vote_count: None,
            max_vote_count: None,
            min_vote_average: None,
            max_vote_average: None,
            order_by: MovieOrderBy::default(),
            direction: SortDirection::default(),
            cursor: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: i32,
    pub title: String,
    pub overview: String,
    pub release_date: Date,
    pub popularity: f64,
    pub vote_count: i64,
    pub vote_average: f64,
    pub original_language: String,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
    pub poster_url: String,
}

impl TryFrom<movie::Model> for MovieDto {
    type Error = jiff::Error;

    fn try_from(model: movie::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            title: model.title,
            overview: model.overview,
            release_date: model.release_date.parse()?,
            popularity: model.popularity,
            vote_count: model.vote_count,
            vote_average: model.vote_average,
            original_language: model.original_language,
            genres: model.genres.0,
            actors: model.actors.0,
            poster_url: model.poster_url,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub results: Vec<T>,
    pub total_results_count: u64,
    /// Offset of the next page, absent once the last page has been returned.
    pub next_cursor: Option<u64>,
}
