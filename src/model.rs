use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ContractError;

/// A user that writes posts and comments, and likes posts.
///
/// Authors are owned by the account system, this service only reads them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Author {
	pub id: Uuid,
	pub username: String,
	/// Only staff members can author posts.
	pub is_staff: bool,
}

/// A tag that posts can be filed under.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
	pub id: Uuid,
	/// Unique and always lowercase.
	pub title: String,
	/// Number of posts carrying the tag, set only by queries that count them.
	#[sqlx(default)]
	pub posts_count: Option<i64>,
}

impl Tag {
	/// Normalizes a tag title the way it is stored.
	pub fn normalize_title(title: &str) -> String {
		title.trim().to_lowercase()
	}

	pub fn posts_count(&self) -> Result<i64, ContractError> {
		self.posts_count.ok_or(ContractError::MissingAnnotation {
			entity: "tag",
			field: "posts_count",
		})
	}
}

/// A single blog post.
///
/// The `Option` fields past `author_id` are not columns of the post itself.
/// They are filled by the query layer and stay `None` until then.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
	pub id: Uuid,
	pub title: String,
	pub text: String,
	pub slug: String,
	/// Public URL of the cover image.
	pub image: Option<String>,
	pub published_at: DateTime<Utc>,
	pub author_id: Uuid,
	#[sqlx(default)]
	pub likes_count: Option<i64>,
	#[sqlx(skip)]
	pub comments_count: Option<i64>,
	/// Tags in title order, once prefetched.
	#[sqlx(skip)]
	pub tags: Option<Vec<Tag>>,
	#[sqlx(skip)]
	pub author: Option<Author>,
}

impl Post {
	pub fn comments_count(&self) -> Result<i64, ContractError> {
		self.comments_count.ok_or(ContractError::MissingAnnotation {
			entity: "post",
			field: "comments_count",
		})
	}

	pub fn tags(&self) -> Result<&[Tag], ContractError> {
		self.tags
			.as_deref()
			.ok_or(ContractError::NotPrefetched {
				entity: "post",
				relation: "tags",
			})
	}

	/// The first tag in title order.
	///
	/// Every post is created with at least one tag, so an empty list means
	/// the data was changed behind the service's back.
	pub fn first_tag(&self) -> Result<&Tag, ContractError> {
		self.tags()?
			.first()
			.ok_or_else(|| ContractError::Untagged(self.slug.clone()))
	}

	pub fn author(&self) -> Result<&Author, ContractError> {
		self.author.as_ref().ok_or(ContractError::NotPrefetched {
			entity: "post",
			relation: "author",
		})
	}
}

/// A comment left under a post.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub post_id: Uuid,
	pub author_id: Uuid,
	pub text: String,
	pub published_at: DateTime<Utc>,
}

/// The fields needed to store a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
	pub title: String,
	pub text: String,
	pub slug: String,
	pub image: Option<String>,
	pub published_at: DateTime<Utc>,
	pub author_id: Uuid,
	pub tag_ids: Vec<Uuid>,
}

/// The fields needed to store a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
	pub post_id: Uuid,
	pub author_id: Uuid,
	pub text: String,
	pub published_at: DateTime<Utc>,
}
