use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use axum_jsonschema::JsonSchemaRejection;
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{query, store};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Extra values describing the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// Describes how an error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>>;
}

/// A broken precondition inside the service.
///
/// These are programming errors, never caused by client input, so they are
/// reported as internal errors instead of being papered over.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
	#[error("{entity}.{field} was read before it was annotated")]
	MissingAnnotation {
		entity: &'static str,
		field: &'static str,
	},
	#[error("{entity}.{relation} was read before it was prefetched")]
	NotPrefetched {
		entity: &'static str,
		relation: &'static str,
	},
	#[error("no comment count was returned for post {0}")]
	MissingCount(Uuid),
	#[error("post {0} has no tags")]
	Untagged(String),
}

/// Error type shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("invalid json body")]
	Json(JsonSchemaRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("store error: {0}")]
	Store(#[from] store::Error),
	#[error("contract violation: {0}")]
	Contract(#[from] ContractError),
}

impl From<JsonSchemaRejection> for AppError {
	fn from(rejection: JsonSchemaRejection) -> Self {
		Self::Json(rejection)
	}
}

impl From<query::Error> for AppError {
	fn from(error: query::Error) -> Self {
		match error {
			query::Error::Store(error) => Self::Store(error),
			query::Error::Contract(error) => Self::Contract(error),
		}
	}
}

impl ErrorShape for AppError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::Store(store::Error::Conflict(..)) => StatusCode::CONFLICT,
			Self::Store(store::Error::MissingReference) => StatusCode::NOT_FOUND,
			Self::Store(..) | Self::Contract(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let content = error
							.message
							.clone()
							.unwrap_or_else(|| error.code.clone());

						Message::new(content).field(field.to_string())
					})
				})
				.collect(),
			Self::Json(rejection) => json_errors(rejection),
			Self::Path(error) => Message::new(error.body_text()).into_vec(),
			Self::Store(store::Error::Conflict(field)) => Message::new("already_exists")
				.field(*field)
				.into_vec(),
			Self::Store(store::Error::MissingReference) => {
				Message::new("unknown_reference").into_vec()
			}
			// Internal details stay in the logs.
			Self::Store(..) | Self::Contract(..) => Message::new("internal_error").into_vec(),
		}
	}
}

/// One message per problem with a JSON body, pointing at the offending
/// field when the body could be parsed far enough to know it.
fn json_errors(rejection: &JsonSchemaRejection) -> Vec<Message<'static>> {
	match rejection {
		JsonSchemaRejection::Json(error) => Message::new("invalid_json")
			.detail("reason", error.body_text())
			.into_vec(),
		JsonSchemaRejection::Serde(error) => {
			let message = Message::new("invalid_json").detail("reason", error.inner().to_string());
			let message = match error.path().to_string().as_str() {
				"." => message,
				path => message.field(path.to_owned()),
			};

			message.into_vec()
		}
		JsonSchemaRejection::Schema(units) => units
			.iter()
			.map(|unit| {
				let message = Message::new("invalid_value")
					.detail("reason", unit.error_description().to_string());
				let location = unit.instance_location().to_string();

				match location.trim_start_matches('/') {
					"" => message,
					field => message.field(field.replace('/', ".")),
				}
			})
			.collect(),
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		respond(&self)
	}
}

fn respond<E: ErrorShape>(error: &E) -> Response<Body> {
	let status = error.status();

	if status.is_server_error() {
		tracing::error!(%error, "request failed");
	}

	(status, Json(error.errors())).into_response()
}

/// The error returned from a route, either a shared [`AppError`] or one
/// specific to the route's module.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<store::Error> for RouteError<T> {
	fn from(error: store::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<ContractError> for RouteError<T> {
	fn from(error: ContractError) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<query::Error> for RouteError<T> {
	fn from(error: query::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(error.into())
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => respond(&error),
		}
	}
}

impl<T> aide::OperationOutput for RouteError<T> {
	type Inner = Vec<Message<'static>>;
}
