use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use crate::route::model::SlugInput;
use crate::route::model::validate_slug;

/// A new post, written by a staff member.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreatePostInput {
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// The body of the post.
	#[validate(length(min = 1))]
	pub text: String,
	/// The URL identifier of the post, unique across posts.
	#[validate(length(min = 1, max = 200), custom(function = "validate_slug"))]
	pub slug: String,
	/// Public URL of the cover image.
	#[validate(length(max = 2048))]
	pub image: Option<String>,
	/// Defaults to the time of the request.
	pub published_at: Option<DateTime<Utc>>,
	/// The staff member writing the post.
	pub author_id: Uuid,
	/// Titles of existing tags. Every post needs at least one.
	#[validate(length(min = 1, max = 20))]
	pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct LikeInput {
	/// The user liking the post.
	pub user_id: Uuid,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LikeOutput {
	/// Number of users that liked the post.
	pub likes_amount: i64,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateCommentInput {
	pub author_id: Uuid,
	#[validate(length(min = 1, max = 10000))]
	pub text: String,
}
