use std::sync::Arc;

use aide::{
	axum::{
		routing::{get, get_with},
		ApiRouter, IntoApiResponse,
	},
	openapi::OpenApi,
	scalar::Scalar,
};
use axum::{response::IntoResponse, Extension};

use crate::extract::Json;

/// Where the generated document is served, relative to `/docs`.
const OPENAPI_PATH: &str = "/private/api.json";

pub fn routes() -> ApiRouter {
	let reference = Scalar::new(format!("/docs{OPENAPI_PATH}"))
		.with_title("Blog API reference")
		.axum_handler();

	ApiRouter::new()
		.api_route(
			"/",
			get_with(reference, |op| {
				op.summary("API reference")
					.description("Interactive reference of every page and write endpoint.")
			}),
		)
		.route(OPENAPI_PATH, get(openapi_document))
}

async fn openapi_document(Extension(document): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(document).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_openapi_document_lists_routes() {
		let fixture = Fixture::new();
		let app = app(&fixture);

		let response = app.get("/docs/private/api.json").await;

		assert_eq!(response.status_code(), 200);

		let document = response.json::<serde_json::Value>();

		assert!(document["paths"]["/post/{slug}"]["get"].is_object());
		assert!(document["paths"]["/posts/{slug}/likes"]["post"].is_object());
	}
}
