use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

/// Any slug is accepted, one that matches no post is simply not found.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostSlugInput {
	pub slug: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct TagTitleInput {
	/// The title of a tag, matched case-insensitively.
	pub title: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct YearInput {
	#[validate(range(min = 1, max = 9999))]
	pub year: i32,
}
