use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Slugs are lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
	if slug
		.chars()
		.any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'))
	{
		return Err(ValidationError::new("invalid_slug"));
	}

	Ok(())
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SlugInput {
	/// The URL identifier of a post.
	#[validate(length(min = 1, max = 200), custom(function = "validate_slug"))]
	pub slug: String,
}
