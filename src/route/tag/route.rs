use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::Json,
	model::Tag,
	openapi::tag,
	serialize::{serialize_tag, TagCard},
	store::{self, Store},
};

use super::{model, Error, RouteError};

pub fn create_tag_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create tag")
		.description("Creates a new tag. Titles are unique and stored in lowercase.")
		.tag(tag::TAG)
}

/// Creates a new tag.
pub async fn create_tag(
	State(store): State<Store>,
	Json(input): Json<model::CreateTagInput>,
) -> Result<Json<TagCard>, RouteError> {
	let title = Tag::normalize_title(&input.title);
	let tag = store
		.tags
		.create(title.clone())
		.await
		.map_err(|error| match error {
			store::Error::Conflict(..) => Error::TagTaken(title).into(),
			error => RouteError::from(error),
		})?;

	Ok(Json(serialize_tag(&tag)?))
}
