use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Json, Path},
	openapi::tag,
	page,
	store::Store,
};

use super::{model, RouteError};

pub fn home_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Home page")
		.description("Returns the most popular posts, the newest posts and the most popular tags.")
		.tag(tag::BLOG)
}

/// Returns the context of the home page.
pub async fn home(State(store): State<Store>) -> Result<Json<page::HomeContext>, RouteError> {
	Ok(Json(page::home(&store).await?))
}

pub fn post_detail_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Post page")
		.description("Returns a post with its comments and like count, next to the most popular posts and tags.")
		.tag(tag::BLOG)
}

/// Returns the context of a post's page.
pub async fn post_detail(
	State(store): State<Store>,
	Path(model::PostSlugInput { slug }): Path<model::PostSlugInput>,
) -> Result<Json<page::PostDetailContext>, RouteError> {
	Ok(Json(page::post_detail(&store, &slug).await?))
}

pub fn tag_filter_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Tag page")
		.description("Returns the newest posts carrying a tag, next to the most popular posts and tags.")
		.tag(tag::BLOG)
}

/// Returns the context of a tag's page.
pub async fn tag_filter(
	State(store): State<Store>,
	Path(model::TagTitleInput { title }): Path<model::TagTitleInput>,
) -> Result<Json<page::TagFilterContext>, RouteError> {
	Ok(Json(page::tag_filter(&store, &title).await?))
}

pub fn archive_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Yearly archive")
		.description("Returns the posts published during a year, oldest first.")
		.tag(tag::BLOG)
}

pub async fn archive(
	State(store): State<Store>,
	Path(model::YearInput { year }): Path<model::YearInput>,
) -> Result<Json<page::ArchiveContext>, RouteError> {
	Ok(Json(page::archive(&store, year).await?))
}
