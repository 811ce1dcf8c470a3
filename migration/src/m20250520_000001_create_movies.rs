use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string_len(Movies::Title, 256))
                    .col(string_len(Movies::TitleFolded, 256))
                    .col(string_len(Movies::Overview, 2048))
                    .col(string_len(Movies::ReleaseDate, 10))
                    .col(double(Movies::Popularity))
                    .col(big_integer(Movies::VoteCount))
                    .col(double(Movies::VoteAverage))
                    .col(string_len(Movies::OriginalLanguage, 2))
                    .col(json(Movies::Genres))
                    .col(json(Movies::Actors))
                    .col(string_len(Movies::PosterUrl, 128))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_movies_title_folded", Movies::TitleFolded),
            ("idx_movies_release_date", Movies::ReleaseDate),
            ("idx_movies_popularity", Movies::Popularity),
            ("idx_movies_vote_count", Movies::VoteCount),
            ("idx_movies_vote_average", Movies::VoteAverage),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Movies::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    TitleFolded,
    Overview,
    ReleaseDate,
    Popularity,
    VoteCount,
    VoteAverage,
    OriginalLanguage,
    Genres,
    Actors,
    PosterUrl,
}
