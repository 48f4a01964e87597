use crate::{
	journal::JournalResource, schema, userlogin::UserLoginResource,
	CustomModule, ModuleResources,
};
use chrono::Utc;
use frunk::Hlist;
use std::sync::Arc;
use warp::{filters::BoxedFilter, Filter, Rejection, Reply};

pub struct Health {}

impl CustomModule for Health {
	type Resources =
		Hlist!(Arc<UserLoginResource>, Arc<JournalResource>);

	fn create_filter<S: ModuleResources<Self>>(
		server: std::sync::Arc<S>,
	) -> BoxedFilter<(Box<dyn Reply>,)> {
		let (users, remaining): (Arc<UserLoginResource>, _) =
			server.get_server_resources().pluck();
		let (journals, _) = remaining.pluck();

		warp::path!("api" / "health")
			.and(warp::get())
			.and(warp::any().map(move || users.clone()))
			.and(warp::any().map({
				let journals: Arc<JournalResource> = journals;
				move || journals.clone()
			}))
			.and_then(health_filter_fn)
			.map(|reply| -> Box<dyn Reply> { Box::new(reply) })
			.boxed()
	}
}

async fn health_filter_fn(
	users: Arc<UserLoginResource>,
	journals: Arc<JournalResource>,
) -> Result<impl Reply, Rejection> {
	let response = schema::HealthResponse {
		status: String::from("ok"),
		message: String::from("mood journal backend is running"),
		timestamp: Utc::now(),
		stats: schema::HealthStats {
			users: users.user_count().await,
			journals: journals.entry_count().await,
			sessions: users.session_count().await,
		},
	};

	Ok(warp::reply::json(&response))
}
