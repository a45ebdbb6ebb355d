use std::collections::HashMap;

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
	AuthorRepository, CommentRepository, Error, PostRepository, Result, TagRepository,
};
use crate::{
	model::{Author, Comment, NewComment, NewPost, Post, Tag},
	query::{year_bounds, PostOrder, PostQuery, TagOrder, TagQuery},
	Database,
};

const POST_COLUMNS: &str = "p.id, p.title, p.text, p.slug, p.image, p.published_at, p.author_id";

/// Maps constraint violations onto store errors, `field` naming the unique
/// column the statement could collide on.
fn map_error(error: sqlx::Error, field: &'static str) -> Error {
	match &error {
		sqlx::Error::Database(database) if database.is_unique_violation() => Error::Conflict(field),
		sqlx::Error::Database(database) if database.is_foreign_key_violation() => {
			Error::MissingReference
		}
		_ => Error::Database(error),
	}
}

/// Repositories backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresStore {
	database: Database,
}

impl PostgresStore {
	pub fn new(database: Database) -> Self {
		Self { database }
	}
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
	post_id: Uuid,
	#[sqlx(flatten)]
	tag: Tag,
}

#[axum::async_trait]
impl PostRepository for PostgresStore {
	async fn fetch(&self, query: &PostQuery) -> Result<Vec<Post>> {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
		builder.push(POST_COLUMNS);

		if query.counts_likes() {
			builder.push(
				", COUNT(DISTINCT l.user_id) AS likes_count
				FROM post p LEFT JOIN post_like l ON l.post_id = p.id",
			);
		} else {
			builder.push(" FROM post p");
		}

		builder.push(" WHERE TRUE");

		if let Some(slug) = &query.slug {
			builder.push(" AND p.slug = ").push_bind(slug.clone());
		}

		if let Some(tag_id) = query.tag_id {
			builder
				.push(" AND EXISTS (SELECT 1 FROM post_tag pt WHERE pt.post_id = p.id AND pt.tag_id = ")
				.push_bind(tag_id)
				.push(")");
		}

		if let Some(year) = query.year {
			let Some((start, end)) = year_bounds(year) else {
				return Ok(Vec::new());
			};

			builder
				.push(" AND p.published_at >= ")
				.push_bind(start)
				.push(" AND p.published_at < ")
				.push_bind(end);
		}

		if query.counts_likes() {
			builder.push(" GROUP BY p.id");
		}

		builder.push(match query.order {
			PostOrder::Newest => " ORDER BY p.published_at DESC, p.id",
			PostOrder::Oldest => " ORDER BY p.published_at ASC, p.id",
			PostOrder::Popular => " ORDER BY likes_count DESC, p.published_at DESC, p.id",
		});

		if let Some(limit) = query.limit {
			builder.push(" LIMIT ").push_bind(limit);
		}

		let posts = builder
			.build_query_as::<Post>()
			.fetch_all(&self.database)
			.await?;

		Ok(posts)
	}

	async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
		let count = sqlx::query_scalar::<_, i64>(
			r#"
				SELECT COUNT(*) FROM post_like
				WHERE post_id = $1
			"#,
		)
		.bind(post_id)
		.fetch_one(&self.database)
		.await?;

		Ok(count)
	}

	async fn create(&self, input: NewPost) -> Result<Post> {
		let mut transaction = self.database.begin().await?;

		let post = sqlx::query_as::<_, Post>(
			r#"
				INSERT INTO post (id, title, text, slug, image, published_at, author_id)
				VALUES ($1, $2, $3, $4, $5, $6, $7)
				RETURNING id, title, text, slug, image, published_at, author_id
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(input.title)
		.bind(input.text)
		.bind(input.slug)
		.bind(input.image)
		.bind(input.published_at)
		.bind(input.author_id)
		.fetch_one(&mut *transaction)
		.await
		.map_err(|error| map_error(error, "slug"))?;

		sqlx::query(
			r#"
				INSERT INTO post_tag (post_id, tag_id)
				SELECT $1, UNNEST($2::uuid[])
			"#,
		)
		.bind(post.id)
		.bind(&input.tag_ids)
		.execute(&mut *transaction)
		.await
		.map_err(|error| map_error(error, "tags"))?;

		transaction.commit().await?;

		Ok(post)
	}

	async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
		sqlx::query(
			r#"
				INSERT INTO post_like (post_id, user_id)
				VALUES ($1, $2)
				ON CONFLICT DO NOTHING
			"#,
		)
		.bind(post_id)
		.bind(user_id)
		.execute(&self.database)
		.await
		.map_err(|error| map_error(error, "like"))?;

		Ok(())
	}

	async fn delete(&self, post_id: Uuid) -> Result<bool> {
		let result = sqlx::query(
			r#"
				DELETE FROM post
				WHERE id = $1
			"#,
		)
		.bind(post_id)
		.execute(&self.database)
		.await?;

		Ok(result.rows_affected() > 0)
	}
}

#[axum::async_trait]
impl TagRepository for PostgresStore {
	async fn fetch(&self, query: &TagQuery) -> Result<Vec<Tag>> {
		let mut builder = QueryBuilder::<Postgres>::new(
			"SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
			FROM tag t LEFT JOIN post_tag pt ON pt.tag_id = t.id",
		);

		if let Some(titles) = &query.titles {
			builder.push(" WHERE t.title = ANY(").push_bind(titles.clone()).push(")");
		}

		builder.push(" GROUP BY t.id");
		builder.push(match query.order {
			TagOrder::Title => " ORDER BY t.title",
			TagOrder::Popular => " ORDER BY posts_count DESC, t.title",
		});

		if let Some(limit) = query.limit {
			builder.push(" LIMIT ").push_bind(limit);
		}

		let tags = builder
			.build_query_as::<Tag>()
			.fetch_all(&self.database)
			.await?;

		Ok(tags)
	}

	async fn for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>> {
		let rows = sqlx::query_as::<_, PostTagRow>(
			r#"
				SELECT pt.post_id, t.id, t.title, (
					SELECT COUNT(*) FROM post_tag c WHERE c.tag_id = t.id
				) AS posts_count
				FROM post_tag pt
				JOIN tag t ON t.id = pt.tag_id
				WHERE pt.post_id = ANY($1)
				ORDER BY t.title
			"#,
		)
		.bind(post_ids)
		.fetch_all(&self.database)
		.await?;

		let mut tags_for_post = HashMap::<Uuid, Vec<Tag>>::new();

		for row in rows {
			tags_for_post.entry(row.post_id).or_default().push(row.tag);
		}

		Ok(tags_for_post)
	}

	async fn create(&self, title: String) -> Result<Tag> {
		let tag = sqlx::query_as::<_, Tag>(
			r#"
				INSERT INTO tag (id, title)
				VALUES ($1, $2)
				RETURNING id, title, 0::BIGINT AS posts_count
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(title)
		.fetch_one(&self.database)
		.await
		.map_err(|error| map_error(error, "title"))?;

		Ok(tag)
	}
}

#[axum::async_trait]
impl CommentRepository for PostgresStore {
	async fn count_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
		let rows = sqlx::query_as::<_, (Uuid, i64)>(
			r#"
				SELECT p.id, COUNT(c.id)
				FROM post p
				LEFT JOIN comment c ON c.post_id = p.id
				WHERE p.id = ANY($1)
				GROUP BY p.id
			"#,
		)
		.bind(post_ids)
		.fetch_all(&self.database)
		.await?;

		Ok(rows.into_iter().collect())
	}

	async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
		let comments = sqlx::query_as::<_, Comment>(
			r#"
				SELECT id, post_id, author_id, text, published_at
				FROM comment
				WHERE post_id = $1
				ORDER BY published_at, id
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.database)
		.await?;

		Ok(comments)
	}

	async fn create(&self, input: NewComment) -> Result<Comment> {
		let comment = sqlx::query_as::<_, Comment>(
			r#"
				INSERT INTO comment (id, post_id, author_id, text, published_at)
				VALUES ($1, $2, $3, $4, $5)
				RETURNING id, post_id, author_id, text, published_at
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(input.post_id)
		.bind(input.author_id)
		.bind(input.text)
		.bind(input.published_at)
		.fetch_one(&self.database)
		.await
		.map_err(|error| map_error(error, "comment"))?;

		Ok(comment)
	}
}

#[axum::async_trait]
impl AuthorRepository for PostgresStore {
	async fn by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Author>> {
		let authors = sqlx::query_as::<_, Author>(
			r#"
				SELECT id, username, is_staff FROM "user"
				WHERE id = ANY($1)
			"#,
		)
		.bind(ids)
		.fetch_all(&self.database)
		.await?;

		Ok(authors
			.into_iter()
			.map(|author| (author.id, author))
			.collect())
	}
}
