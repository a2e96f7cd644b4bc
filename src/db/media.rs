use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;

use super::BindValue;
use crate::models;
use crate::pagination::Cursor;

#[derive(Debug, FromRow)]
pub struct Media {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
    pub album_id: Option<i64>,
    pub user_id: String,
    pub url: String,
    pub width: i64,
    pub height: i64,
    pub media_type: String,
    pub tags: Vec<String>,
}

/// Filters applied when listing media.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MediaFilter<'a> {
    pub user_id: Option<&'a str>,
    pub tag: Option<&'a str>,
}

#[async_trait::async_trait]
pub trait MediaProvider {
    async fn get_paginated_media(
        &mut self,
        limit: i64,
        cursor: Option<Cursor>,
        filter: MediaFilter<'_>,
    ) -> Result<Vec<models::media::Media>, sqlx::Error>;

    async fn get_media_by_id(
        &mut self,
        media_id: i64,
    ) -> Result<Option<models::media::Media>, sqlx::Error>;

    async fn get_media_tags(&mut self) -> Result<Vec<String>, sqlx::Error>;

    async fn insert_media(
        &mut self,
        media: &models::media::Media,
    ) -> Result<models::media::Media, sqlx::Error>;

    async fn update_media(
        &mut self,
        media: &models::media::Media,
    ) -> Result<Option<models::media::Media>, sqlx::Error>;

    async fn soft_delete_media(&mut self, media_id: i64) -> Result<bool, sqlx::Error>;
}

#[async_trait::async_trait]
impl MediaProvider for PgConnection {
    async fn get_paginated_media(
        &mut self,
        limit: i64,
        cursor: Option<Cursor>,
        filter: MediaFilter<'_>,
    ) -> Result<Vec<models::media::Media>, sqlx::Error> {
        let mut bind_count = 1;
        let mut bind_values = Vec::new();
        let mut query = r#"
            SELECT
                id, created_at, updated_at, deleted_at,
                album_id, user_id, url, width, height, media_type, tags
            FROM
                medias media
            WHERE
                media.deleted_at IS NULL
        "#
        .to_string();

        if let Some(cursor) = cursor {
            query.push_str(&format!("    AND media.id <= ${}\n", bind_count));
            bind_count += 1;
            bind_values.push(BindValue::I64(cursor.db_id()));
        }

        if let Some(user_id) = filter.user_id {
            query.push_str(&format!("    AND media.user_id = ${}\n", bind_count));
            bind_count += 1;
            bind_values.push(BindValue::Str(user_id));
        }

        if let Some(tag) = filter.tag {
            query.push_str(&format!("    AND ${} = ANY(media.tags)\n", bind_count));
            bind_count += 1;
            bind_values.push(BindValue::Str(tag));
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
        let res: Vec<Media> = query.fetch_all(self).await?;

        Ok(res.into_iter().map(models::media::Media::from).collect())
    }


    async fn get_media_by_id(
        &mut self,
        media_id: i64,
    ) -> Result<Option<models::media::Media>, sqlx::Error> {
        let res: Option<Media> = sqlx::query_as(
            r#"
                SELECT
                    id, created_at, updated_at, deleted_at,
                    album_id, user_id, url, width, height, media_type, tags
                FROM
                    medias
                WHERE
                    id = $1
                    AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .fetch_optional(self)
        .await?;

        Ok(res.map(Into::into))
    }


    async fn get_media_tags(&mut self) -> Result<Vec<String>, sqlx::Error> {
        let tags: Vec<(String,)> = sqlx::query_as(
            r#"
                SELECT DISTINCT
                    tag
                FROM
                    medias media,
                    UNNEST(media.tags) AS tag
                WHERE
                    media.deleted_at IS NULL
                ORDER BY
                    tag
            "#,
        )
        .fetch_all(self)
        .await?;

        Ok(tags.into_iter().map(|(tag,)| tag).collect())
    }


    async fn insert_media(
        &mut self,
        media: &models::media::Media,
    ) -> Result<models::media::Media, sqlx::Error> {
        let res: Media = sqlx::query_as(
            r#"
                INSERT INTO medias
                    (album_id, user_id, url, width, height, media_type, tags)
                VALUES
                    ($1, $2, $3, $4, $5, $6, $7)
                RETURNING
                    id, created_at, updated_at, deleted_at,
                    album_id, user_id, url, width, height, media_type, tags
            "#,
        )
        .bind(media.album().map(|id| id as i64))
        .bind(&media.user_id)
        .bind(&media.url)
        .bind(i64::from(media.width))
        .bind(i64::from(media.height))
        .bind(&media.media_type)
        .bind(&media.tags[..])
        .fetch_one(self)
        .await?;

        Ok(res.into())
    }


    async fn update_media(
        &mut self,
        media: &models::media::Media,
    ) -> Result<Option<models::media::Media>, sqlx::Error> {
        let res: Option<Media> = sqlx::query_as(
            r#"
                UPDATE
                    medias
                SET
                    album_id = $2,
                    user_id = $3,
                    url = $4,
                    width = $5,
                    height = $6,
                    media_type = $7,
                    tags = $8,
                    updated_at = now()
                WHERE
                    id = $1
                    AND deleted_at IS NULL
                RETURNING
                    id, created_at, updated_at, deleted_at,
                    album_id, user_id, url, width, height, media_type, tags
            "#,
        )
        .bind(media.id() as i64)
        .bind(media.album().map(|id| id as i64))
        .bind(&media.user_id)
        .bind(&media.url)
        .bind(i64::from(media.width))
        .bind(i64::from(media.height))
        .bind(&media.media_type)
        .bind(&media.tags[..])
        .fetch_optional(self)
        .await?;

        Ok(res.map(Into::into))
    }


    async fn soft_delete_media(&mut self, media_id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query(
            r#"
                UPDATE
                    medias
                SET
                    deleted_at = now()
                WHERE
                    id = $1
                    AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .execute(self)
        .await?;

        Ok(res.rows_affected() > 0)
    }
}
