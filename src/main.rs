#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod page;
mod query;
mod route;
mod serialize;
mod store;
#[cfg(test)]
mod test;
mod trace;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::Extension;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{
	config::Config,
	store::{postgres::PostgresStore, Store},
};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers only see the store, so the same router serves a PostgreSQL
/// backend in production and an in-memory one in tests.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: Store,
}

/// Builds the full application, documentation included.
pub fn router(state: State) -> axum::Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.merge(route::blog::routes())
		.nest("/posts", route::post::routes())
		.nest("/tags", route::tag::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	router
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_env()?;

	trace::init_tracing_subscriber(config.log_level);

	let database = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.connect(&config.database_url)
		.await?;

	sqlx::migrate!().run(&database).await?;

	let state = State {
		store: Store::from_backend(Arc::new(PostgresStore::new(database))),
	};

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(host = %config.host, port = config.port, "listening");

	axum::serve(listener, router(state)).await?;

	Ok(())
}
