use std::collections::BTreeSet;

use aide::transform::TransformOperation;
use axum::extract::State;
use chrono::Utc;

use crate::{
	extract::{Json, Path},
	model::{NewComment, NewPost, Post, Tag},
	openapi::tag,
	query::{self, PostQuery, TagQuery},
	serialize::{serialize_comment, serialize_post, CommentCard, PostCard},
	store::{self, Store},
};

use super::{model, Error, RouteError};

async fn find_post(store: &Store, slug: &str) -> Result<Post, RouteError> {
	store
		.posts
		.fetch(&PostQuery::slug(slug))
		.await?
		.into_iter()
		.next()
		.ok_or_else(|| Error::UnknownPost(slug.into()).into())
}

pub fn create_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create post")
		.description("Creates a post written by a staff member and filed under at least one existing tag.")
		.tag(tag::POST)
}

/// Creates a new post.
pub async fn create_post(
	State(store): State<Store>,
	Json(input): Json<model::CreatePostInput>,
) -> Result<Json<PostCard>, RouteError> {
	let titles = input
		.tags
		.iter()
		.map(|title| Tag::normalize_title(title))
		.collect::<BTreeSet<_>>();
	let tags = store.tags.fetch(&TagQuery::titled(titles.iter().cloned())).await?;

	if let Some(missing) = titles
		.iter()
		.find(|title| !tags.iter().any(|tag| &tag.title == *title))
	{
		return Err(Error::UnknownTag(missing.clone()).into());
	}

	let author = store
		.authors
		.by_ids(&[input.author_id])
		.await?
		.remove(&input.author_id)
		.ok_or(Error::UnknownUser(input.author_id))?;

	if !author.is_staff {
		return Err(Error::NotStaff(author.id).into());
	}

	let slug = input.slug.clone();
	let post = store
		.posts
		.create(NewPost {
			title: input.title,
			text: input.text,
			slug: input.slug,
			image: input.image,
			published_at: input.published_at.unwrap_or_else(Utc::now),
			author_id: author.id,
			tag_ids: tags.iter().map(|tag| tag.id).collect(),
		})
		.await
		.map_err(|error| match error {
			store::Error::Conflict("slug") => Error::SlugTaken(slug).into(),
			error => RouteError::from(error),
		})?;

	tracing::info!(slug = %post.slug, author = %author.username, "created post");

	let posts = query::fetch_with_comments_count(&store, &PostQuery::slug(&post.slug)).await?;
	let post = posts
		.first()
		.ok_or_else(|| Error::UnknownPost(post.slug.clone()))?;

	Ok(Json(serialize_post(post)?))
}

pub fn delete_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Delete post")
		.description("Deletes a post along with its comments and likes.")
		.tag(tag::POST)
}

/// Deletes a post.
pub async fn delete_post(
	State(store): State<Store>,
	Path(model::SlugInput { slug }): Path<model::SlugInput>,
) -> Result<(), RouteError> {
	let post = find_post(&store, &slug).await?;

	if !store.posts.delete(post.id).await? {
		return Err(Error::UnknownPost(slug).into());
	}

	tracing::info!(%slug, "deleted post");

	Ok(())
}

pub fn like_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Like post")
		.description("Adds a user to the likes of a post. Liking a post twice has no effect.")
		.tag(tag::POST)
}

/// Likes a post on behalf of a user.
pub async fn like_post(
	State(store): State<Store>,
	Path(model::SlugInput { slug }): Path<model::SlugInput>,
	Json(input): Json<model::LikeInput>,
) -> Result<Json<model::LikeOutput>, RouteError> {
	let post = find_post(&store, &slug).await?;

	store
		.posts
		.like(post.id, input.user_id)
		.await
		.map_err(|error| match error {
			store::Error::MissingReference => Error::UnknownUser(input.user_id).into(),
			error => RouteError::from(error),
		})?;

	Ok(Json(model::LikeOutput {
		likes_amount: store.posts.count_likes(post.id).await?,
	}))
}

pub fn comment_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Comment on post")
		.description("Adds a comment under a post.")
		.tag(tag::POST)
}

/// Comments on a post on behalf of a user.
pub async fn comment_post(
	State(store): State<Store>,
	Path(model::SlugInput { slug }): Path<model::SlugInput>,
	Json(input): Json<model::CreateCommentInput>,
) -> Result<Json<CommentCard>, RouteError> {
	let post = find_post(&store, &slug).await?;
	let authors = store.authors.by_ids(&[input.author_id]).await?;

	if !authors.contains_key(&input.author_id) {
		return Err(Error::UnknownUser(input.author_id).into());
	}

	let comment = store
		.comments
		.create(NewComment {
			post_id: post.id,
			author_id: input.author_id,
			text: input.text,
			published_at: Utc::now(),
		})
		.await?;

	Ok(Json(serialize_comment(&comment, &authors)?))
}
