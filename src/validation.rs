use std::{borrow::Cow, collections::BTreeMap, str::FromStr};

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{MovieOrderBy, MovieSearchInput, SortDirection};

/// Body of `POST /api/v1/movies/search` as it arrives on the wire.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchMoviesRequest {
    #[validate(length(max = 256, message = "Query must be less than 256 characters"))]
    pub query: Option<String>,
    #[validate(length(
        max = 2,
        message = "Languages are specified as a two character code, e.g. en, es, fr, etc."
    ))]
    pub language: Option<String>,
    pub genres: Option<Vec<String>>,
    pub actors: Option<Vec<String>>,
    #[validate(range(min = 0.0, message = "Minimum popularity must be greater than or equal to 0"))]
    pub min_popularity: Option<f64>,
    #[validate(range(min = 0.0, message = "Maximum popularity must be greater than or equal to 0"))]
    pub max_popularity: Option<f64>,
    #[validate(range(min = 0, message = "Minimum vote count must be greater than or equal to 0"))]
    pub min_vote_count: Option<i64>,
    #[validate(range(min = 0, message = "Maximum vote count must be greater than or equal to 0"))]
    pub max_vote_count: Option<i64>,
    #[validate(range(
        min = 0.0,
        message = "Minimum vote average must be greater than or equal to 0"
    ))]
    pub min_vote_average: Option<f64>,
    #[validate(range(
        min = 0.0,
        message = "Maximum vote average must be greater than or equal to 0"
    ))]
    pub max_vote_average: Option<f64>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
    #[validate(range(min = 0, message = "Cursor must be greater than or equal to 0"))]
    pub cursor: Option<i64>,
    #[validate(range(min = 0, message = "Limit must be greater than or equal to 0"))]
    pub limit: Option<i64>,
}

impl TryFrom<SearchMoviesRequest> for MovieSearchInput {
    type Error = ValidationErrors;

    fn try_from(req: SearchMoviesRequest) -> Result<Self, Self::Error> {
        let mut errors = req.validate().err().unwrap_or_else(ValidationErrors::new);

        let order_by = parse_choice::<MovieOrderBy>(
            req.order_by.as_deref(),
            "order_by",
            "Order by must be one of ReleaseDate, Title, Popularity, VoteCount, VoteAverage",
            &mut errors,
        );
        let direction = parse_choice::<SortDirection>(
            req.direction.as_deref(),
            "direction",
            "Direction must be either Ascending or Descending",
            &mut errors,
        );

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(Self {
            query: req.query,
            language: req.language,
            genres: req.genres.unwrap_or_default(),
            actors: req.actors.unwrap_or_default(),
            min_popularity: req.min_popularity,
            max_popularity: req.max_popularity,
            min_vote_count: req.min_vote_count,
            max_vote_count: req.max_vote_count,
            min_vote_average: req.min_vote_average,
            max_vote_average: req.max_vote_average,
            order_by,
            direction,
            cursor: req.cursor.map_or(0, |c| u64::try_from(c).unwrap_or_default()),
            limit: req
                .limit
                .map_or(MovieSearchInput::DEFAULT_LIMIT, |l| u64::try_from(l).unwrap_or_default()),
        })
    }
}

fn parse_choice<T: FromStr + Default>(
    raw: Option<&str>,
    field: &'static str,
    message: &'static str,
    errors: &mut ValidationErrors,
) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            let mut err = ValidationError::new("not_in_enum");
            err.message = Some(Cow::Borrowed(message));
            errors.add(field, err);
            T::default()
        },
    }
}

/// Flattens validation errors into `{ "camelCaseField": ["message", ...] }`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
                .collect();
            (camel_case(&field), messages)
        })
        .collect()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: serde_json::Value) -> Result<MovieSearchInput, ValidationErrors> {
        let req: SearchMoviesRequest = serde_json::from_value(body).unwrap();
        MovieSearchInput::try_from(req)
    }

    #[test]
    fn empty_body_uses_defaults() {
        let input = parse(serde_json::json!({})).unwrap();
        assert_eq!(input, MovieSearchInput::default());
        assert_eq!(input.cursor, 0);
        assert_eq!(input.limit, 20);
        assert_eq!(input.order_by, MovieOrderBy::ReleaseDate);
        assert_eq!(input.direction, SortDirection::Ascending);
    }

    #[test]
    fn null_collections_mean_no_filter() {
        let input = parse(serde_json::json!({ "genres": null, "actors": [] })).unwrap();
        assert!(input.genres.is_empty());
        assert!(input.actors.is_empty());
    }

    #[test]
    fn accepts_full_request() {
        let input = parse(serde_json::json!({
            "query": "Dune",
            "language": "en",
            "genres": ["Sci-Fi"],
            "actors": ["Zendaya"],
            "minPopularity": 10.5,
            "maxVoteCount": 9000,
            "minVoteAverage": 8,
            "orderBy": "VoteAverage",
            "direction": "Descending",
            "cursor": 40,
            "limit": 0
        }))
        .unwrap();

        assert_eq!(input.query.as_deref(), Some("Dune"));
        assert_eq!(input.genres, vec!["Sci-Fi"]);
        assert_eq!(input.min_popularity, Some(10.5));
        assert_eq!(input.max_vote_count, Some(9000));
        assert_eq!(input.min_vote_average, Some(8.0));
        assert_eq!(input.order_by, MovieOrderBy::VoteAverage);
        assert_eq!(input.direction, SortDirection::Descending);
        assert_eq!(input.cursor, 40);
        assert_eq!(input.limit, 0);
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = parse(serde_json::json!({
            "query": "x".repeat(257),
            "language": "eng",
            "limit": -1,
            "cursor": -5,
            "minPopularity": -0.1,
            "maxVoteAverage": -2,
            "orderBy": "Rating",
            "direction": "Sideways"
        }))
        .unwrap_err();

        let messages = field_messages(&errors);
        let fields: Vec<&str> = messages.keys().map(String::as_str).collect();
        assert_eq!(
            fields,
            vec![
                "cursor",
                "direction",
                "language",
                "limit",
                "maxVoteAverage",
                "minPopularity",
                "orderBy",
                "query"
            ]
        );
        assert_eq!(messages["query"], vec!["Query must be less than 256 characters"]);
        assert_eq!(messages["limit"], vec!["Limit must be greater than or equal to 0"]);
    }

    #[test]
    fn query_of_exactly_256_chars_is_allowed() {
        assert!(parse(serde_json::json!({ "query": "a".repeat(256) })).is_ok());
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("min_vote_average"), "minVoteAverage");
        assert_eq!(camel_case("query"), "query");
    }
}
