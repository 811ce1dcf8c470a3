use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityName, EntityTrait, IdenStatic, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{MovieDto, MovieOrderBy, MovieSearchInput, PagedResult, SortDirection},
};

#[derive(Clone)]
pub struct MovieCatalog {
    db: DatabaseConnection,
}

impl MovieCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Runs one search. If `cancel` fires first the in-flight query is dropped, which rolls
    /// back its read transaction and returns the connection to the pool.
    pub async fn search(
        &self,
        input: &MovieSearchInput,
        cancel: &CancellationToken,
    ) -> AppResult<PagedResult<MovieDto>> {
        until_cancelled(cancel, self.run(input)).await
    }

    async fn run(&self, input: &MovieSearchInput) -> AppResult<PagedResult<MovieDto>> {
        debug!(
            query = ?input.query,
            language = ?input.language,
            genres = ?input.genres,
            actors = ?input.actors,
            order_by = input.order_by.as_str(),
            direction = input.direction.as_str(),
            cursor = input.cursor,
            limit = input.limit,
            "searching movies"
        );

        let condition = filter_condition(input);

        // count and page read from the same snapshot
        let txn = self.db.begin().await?;

        let total = movie::Entity::find().filter(condition.clone()).count(&txn).await?;

        let rows = movie::Entity::find()
            .filter(condition)
            .order_by(sort_key(input.order_by), input.direction.into())
            .order_by_asc(movie::Column::Id)
            .offset(input.cursor)
            .limit(input.limit)
            .all(&txn)
            .await?;

        txn.commit().await?;

        let results = rows.into_iter().map(MovieDto::try_from).collect::<Result<Vec<_>, _>>()?;
        let next_cursor = next_cursor(input.cursor, results.len() as u64, total);

        debug!(total = total, returned = results.len(), next_cursor = ?next_cursor, "search completed");

        Ok(PagedResult { results, total_results_count: total, next_cursor })
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = work => result,
    }
}

/// ANDs together the predicate of every filter present on `input`.
pub fn filter_condition(input: &MovieSearchInput) -> Condition {
    Condition::all()
        .add_option(input.normalized_query().map(|q| title_contains(&q)))
        .add_option(
            input.normalized_language().map(|l| lower(movie::Column::OriginalLanguage).eq(l)),
        )
        .add_option(contains_all(movie::Column::Genres, &input.genres))
        .add_option(contains_all(movie::Column::Actors, &input.actors))
        .add_option(input.min_popularity.map(|v| movie::Column::Popularity.gte(v)))
        .add_option(input.max_popularity.map(|v| movie::Column::Popularity.lte(v)))
        .add_option(input.min_vote_count.map(|v| movie::Column::VoteCount.gte(v)))
        .add_option(input.max_vote_count.map(|v| movie::Column::VoteCount.lte(v)))
        .add_option(input.min_vote_average.map(|v| movie::Column::VoteAverage.gte(v)))
        .add_option(input.max_vote_average.map(|v| movie::Column::VoteAverage.lte(v)))
}

/// Offset of the page after the one just returned, or `None` when nothing is left.
pub fn next_cursor(cursor: u64, returned: u64, total: u64) -> Option<u64> {
    let next = cursor.saturating_add(returned);
    (next < total).then_some(next)
}

fn sort_key(order_by: MovieOrderBy) -> SimpleExpr {
    match order_by {
        MovieOrderBy::ReleaseDate => Expr::col(movie::Column::ReleaseDate).into(),
        MovieOrderBy::Title => Expr::col(movie::Column::TitleFolded).into(),
        MovieOrderBy::Popularity => Expr::col(movie::Column::Popularity).into(),
        MovieOrderBy::VoteCount => Expr::col(movie::Column::VoteCount).into(),
        MovieOrderBy::VoteAverage => Expr::col(movie::Column::VoteAverage).into(),
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => Order::Asc,
            SortDirection::Descending => Order::Desc,
        }
    }
}

const LIKE_ESCAPE: char = '!';

fn lower(column: movie::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

fn title_contains(query: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(query));
    movie::Column::TitleFolded.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Every value must appear in the JSON array held by `column`.
fn contains_all(column: movie::Column, values: &[String]) -> Option<Condition> {
    if values.is_empty() {
        return None;
    }

    let sql = format!(
        r#"EXISTS (SELECT 1 FROM json_each("{}"."{}") WHERE json_each.value = ?)"#,
        movie::Entity.table_name(),
        column.as_str()
    );

    Some(values.iter().fold(Condition::all(), |all, value| {
        all.add(Expr::cust_with_values(sql.as_str(), [value.as_str()]))
    }))
}
