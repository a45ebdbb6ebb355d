use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::model::Tag;

fn validate_title(title: &str) -> Result<(), ValidationError> {
	let length = Tag::normalize_title(title).chars().count();

	if length == 0 || length > 20 {
		return Err(ValidationError::new("title must be 1 to 20 characters"));
	}

	Ok(())
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct CreateTagInput {
	/// The tag's title, stored in lowercase.
	#[validate(custom(function = "validate_title"))]
	pub title: String,
}
