//! Flat, display-ready records built from annotated entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	error::ContractError,
	model::{Author, Comment, Post, Tag},
};

/// Number of characters of the body shown in a teaser.
pub const TEASER_LENGTH: usize = 200;

/// A post as shown in listings.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostCard {
	pub title: String,
	/// The first 200 characters of the body.
	pub teaser_text: String,
	/// The author's username.
	pub author: String,
	pub comments_amount: i64,
	pub image_url: Option<String>,
	pub published_at: DateTime<Utc>,
	pub slug: String,
	pub tags: Vec<TagCard>,
	pub first_tag_title: String,
}

/// A tag along with how many posts carry it.
#[derive(Debug, Serialize, JsonSchema, PartialEq, Eq)]
pub struct TagCard {
	pub title: String,
	pub posts_with_tag: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentCard {
	pub text: String,
	pub published_at: DateTime<Utc>,
	/// The author's username.
	pub author: String,
}

/// A post as shown on its own page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetail {
	pub title: String,
	pub text: String,
	pub author: String,
	pub comments: Vec<CommentCard>,
	pub likes_amount: i64,
	pub image_url: Option<String>,
	pub published_at: DateTime<Utc>,
	pub slug: String,
	pub tags: Vec<TagCard>,
}

/// Cuts `text` down to [`TEASER_LENGTH`] characters.
pub fn teaser(text: &str) -> &str {
	match text.char_indices().nth(TEASER_LENGTH) {
		Some((end, _)) => &text[..end],
		None => text,
	}
}

fn image_url(post: &Post) -> Option<String> {
	post.image.clone().filter(|image| !image.is_empty())
}

fn serialize_tags(tags: &[Tag]) -> Result<Vec<TagCard>, ContractError> {
	tags.iter().map(serialize_tag).collect()
}

/// Serializes a post with its tags and author prefetched and its
/// `comments_count` attached.
pub fn serialize_post(post: &Post) -> Result<PostCard, ContractError> {
	Ok(PostCard {
		title: post.title.clone(),
		teaser_text: teaser(&post.text).to_owned(),
		author: post.author()?.username.clone(),
		comments_amount: post.comments_count()?,
		image_url: image_url(post),
		published_at: post.published_at,
		slug: post.slug.clone(),
		tags: serialize_tags(post.tags()?)?,
		first_tag_title: post.first_tag()?.title.clone(),
	})
}

pub fn serialize_posts(posts: &[Post]) -> Result<Vec<PostCard>, ContractError> {
	posts.iter().map(serialize_post).collect()
}

/// Serializes a tag annotated with its `posts_count`.
pub fn serialize_tag(tag: &Tag) -> Result<TagCard, ContractError> {
	Ok(TagCard {
		title: tag.title.clone(),
		posts_with_tag: tag.posts_count()?,
	})
}

pub fn serialize_comment(
	comment: &Comment,
	authors: &HashMap<Uuid, Author>,
) -> Result<CommentCard, ContractError> {
	let author = authors
		.get(&comment.author_id)
		.ok_or(ContractError::NotPrefetched {
			entity: "comment",
			relation: "author",
		})?;

	Ok(CommentCard {
		text: comment.text.clone(),
		published_at: comment.published_at,
		author: author.username.clone(),
	})
}

/// Serializes the full view of a post with its tags and author prefetched.
pub fn serialize_post_detail(
	post: &Post,
	likes_amount: i64,
	comments: Vec<CommentCard>,
) -> Result<PostDetail, ContractError> {
	Ok(PostDetail {
		title: post.title.clone(),
		text: post.text.clone(),
		author: post.author()?.username.clone(),
		comments,
		likes_amount,
		image_url: image_url(post),
		published_at: post.published_at,
		slug: post.slug.clone(),
		tags: serialize_tags(post.tags()?)?,
	})
}
