use aide::axum::{
	routing::{delete_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("unknown tag {0}")]
	UnknownTag(String),
	#[error("unknown user {0}")]
	UnknownUser(Uuid),
	#[error("user {0} is not a staff member")]
	NotStaff(Uuid),
	#[error("slug {0} is already taken")]
	SlugTaken(String),
}

pub type RouteError = error::RouteError<Error>;

impl From<Error> for RouteError {
	fn from(error: Error) -> Self {
		Self::Route(error)
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", post_with(create_post, create_post_docs))
		.api_route("/:slug", delete_with(delete_post, delete_post_docs))
		.api_route("/:slug/likes", post_with(like_post, like_post_docs))
		.api_route("/:slug/comments", post_with(comment_post, comment_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownTag(..) | Self::UnknownUser(..) => {
				StatusCode::NOT_FOUND
			}
			Self::NotStaff(..) => StatusCode::FORBIDDEN,
			Self::SlugTaken(..) => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = match self {
			Self::UnknownPost(slug) => error::Message::new("unknown_post").detail("slug", slug.as_str()),
			Self::UnknownTag(title) => error::Message::new("unknown_tag")
				.field("tags")
				.detail("title", title.as_str()),
			Self::UnknownUser(user) => error::Message::new("unknown_user").detail("user", user.to_string()),
			Self::NotStaff(user) => error::Message::new("not_staff")
				.field("author_id")
				.detail("user", user.to_string()),
			Self::SlugTaken(slug) => error::Message::new("slug_taken")
				.field("slug")
				.detail("slug", slug.as_str()),
		};

		message.into_vec()
	}
}
