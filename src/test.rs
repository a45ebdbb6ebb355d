//! Shared helpers for route tests.

pub use axum_test::TestServer;
pub use serde_json::json;

pub use crate::store::memory::Fixture;
use crate::{router, State};

/// Serves the whole application on top of the fixture's in-memory store.
pub fn app(fixture: &Fixture) -> TestServer {
	TestServer::new(router(State {
		store: fixture.store(),
	}))
	.unwrap()
}
