use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, page, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("unknown tag {0}")]
	UnknownTag(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(home, home_docs))
		.api_route("/post/:slug", get_with(post_detail, post_detail_docs))
		.api_route("/tag/:title", get_with(tag_filter, tag_filter_docs))
		.api_route("/archive/:year", get_with(archive, archive_docs))
}

impl From<page::Error> for RouteError {
	fn from(error: page::Error) -> Self {
		match error {
			page::Error::UnknownPost(slug) => Self::Route(Error::UnknownPost(slug)),
			page::Error::UnknownTag(title) => Self::Route(Error::UnknownTag(title)),
			page::Error::Query(error) => error.into(),
		}
	}
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownTag(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(slug) => error::Message::new("unknown_post")
				.detail("slug", slug.as_str())
				.into_vec(),
			Self::UnknownTag(title) => error::Message::new("unknown_tag")
				.detail("title", title.as_str())
				.into_vec(),
		}
	}
}
