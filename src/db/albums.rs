use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;

use super::BindValue;
use crate::models;
use crate::pagination::Cursor;

#[derive(Debug, FromRow)]
pub struct Album {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
    pub user_id: String,
    pub title: String,
}

#[async_trait::async_trait]
pub trait AlbumProvider {
    async fn get_paginated_albums(
        &mut self,
        limit: i64,
        cursor: Option<Cursor>,
        user_id: Option<&str>,
    ) -> Result<Vec<models::albums::Album>, sqlx::Error>;

    async fn get_album_by_id(
        &mut self,
        album_id: i64,
    ) -> Result<Option<models::albums::Album>, sqlx::Error>;

    async fn album_exists(&mut self, album_id: i64) -> Result<bool, sqlx::Error>;

    async fn insert_album(
        &mut self,
        album: &models::albums::Album,
    ) -> Result<models::albums::Album, sqlx::Error>;

    async fn update_album(
        &mut self,
        album: &models::albums::Album,
    ) -> Result<Option<models::albums::Album>, sqlx::Error>;

    async fn soft_delete_album(&mut self, album_id: i64) -> Result<bool, sqlx::Error>;
}

#[async_trait::async_trait]
impl AlbumProvider for PgConnection {
    async fn get_paginated_albums(
        &mut self,
        limit: i64,
        cursor: Option<Cursor>,
        user_id: Option<&str>,
    ) -> Result<Vec<models::albums::Album>, sqlx::Error> {
        let mut bind_count = 1;
        let mut bind_values = Vec::new();
        let mut query = r#"
            SELECT
                id, created_at, updated_at, deleted_at, user_id, title
            FROM
                albums album
            WHERE
                album.deleted_at IS NULL
        "#
        .to_string();

        if let Some(cursor) = cursor {
            query.push_str(&format!("    AND album.id <= ${}\n", bind_count));
            bind_count += 1;
            bind_values.push(BindValue::I64(cursor.db_id()));
        }

        if let Some(user_id) = user_id {
            query.push_str(&format!("    AND album.user_id = ${}\n", bind_count));
            bind_count += 1;
            bind_values.push(BindValue::Str(user_id));
        }

        query.push_str(&format!(
            r#"
                ORDER BY
                    id DESC
                LIMIT ${}
            "#,
            bind_count,
        ));
        bind_values.push(BindValue::I64(limit));

        let mut query = sqlx::query_as(&query);

        for value in bind_values {
            query = match value {
                BindValue::I64(v) => query.bind(v),
                BindValue::Str(v) => query.bind(v),
            };
        }
        let res: Vec<Album> = query.fetch_all(self).await?;

        Ok(res.into_iter().map(models::albums::Album::from).collect())
    }


    async fn get_album_by_id(
        &mut self,
        album_id: i64,
    ) -> Result<Option<models::albums::Album>, sqlx::Error> {
        let res: Option<Album> = sqlx::query_as(
            r#"
                SELECT
                    id, created_at, updated_at, deleted_at, user_id, title
                FROM
                    albums
                WHERE
                    id = $1
                    AND deleted_at IS NULL
            "#,
        )
        .bind(album_id)
        .fetch_optional(self)
        .await?;

        Ok(res.map(Into::into))
    }


    async fn album_exists(&mut self, album_id: i64) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM albums WHERE id = $1 AND deleted_at IS NULL
                )
            "#,
        )
        .bind(album_id)
        .fetch_one(self)
        .await?;

        Ok(exists)
    }


    async fn insert_album(
        &mut self,
        album: &models::albums::Album,
    ) -> Result<models::albums::Album, sqlx::Error> {
        let res: Album = sqlx::query_as(
            r#"
                INSERT INTO albums
                    (user_id, title)
                VALUES
                    ($1, $2)
                RETURNING
                    id, created_at, updated_at, deleted_at, user_id, title
            "#,
        )
        .bind(&album.user_id)
        .bind(&album.title)
        .fetch_one(self)
        .await?;

        Ok(res.into())
    }


    async fn update_album(
        &mut self,
        album: &models::albums::Album,
    ) -> Result<Option<models::albums::Album>, sqlx::Error> {
        let res: Option<Album> = sqlx::query_as(
            r#"
                UPDATE
                    albums
                SET
                    user_id = $2,
                    title = $3,
                    updated_at = now()
                WHERE
                    id = $1
                    AND deleted_at IS NULL
                RETURNING
                    id, created_at, updated_at, deleted_at, user_id, title
            "#,
        )
        .bind(album.id() as i64)
        .bind(&album.user_id)
        .bind(&album.title)
        .fetch_optional(self)
        .await?;

        Ok(res.map(Into::into))
    }


    async fn soft_delete_album(&mut self, album_id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            r#"
                UPDATE
                    albums
                SET
                    deleted_at = now()
                WHERE
                    id = $1
                    AND deleted_at IS NULL
            "#,
        )
        .bind(album_id)
        .execute(self)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}
