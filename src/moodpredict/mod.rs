//! Proxy to the external mood prediction service.
//!
//! The service is a black box reached over plain HTTP on a fixed
//! local address. Its failures surface as upstream errors carrying
//! the service's own JSON `detail`. There is deliberately no timeout
//! or retry, a stalled prediction stalls only its own request.

use crate::{
	error::{Error, Result},
	rejection, schema, CustomModule, ModuleResources,
};
use frunk::Hlist;
use std::sync::Arc;
use tracing::instrument;
use warp::{
	filters::BoxedFilter,
	hyper::{
		body, header::CONTENT_TYPE, Body, Client, Method, Request,
	},
	Filter, Rejection, Reply,
};

pub const DEFAULT_PREDICT_URL: &str =
	"http://127.0.0.1:8001/predict";

pub struct MoodPredict {}

pub struct MoodPredictResource {
	url: String,
}

impl MoodPredictResource {
	#[must_use]
	pub fn new(url: String) -> Self {
		Self { url }
	}

	/// # Errors
	/// `Validation` on empty input, `Upstream` on any network or
	/// service failure
	#[instrument(skip(self, text))]
	pub async fn predict(
		&self,
		text: &str,
	) -> Result<serde_json::Value> {
		let text = text.trim();

		if text.is_empty() {
			return Err(Error::validation("text must not be empty"));
		}

		let payload =
			serde_json::to_vec(&serde_json::json!({ "text": text }))?;

		let request = Request::builder()
			.method(Method::POST)
			.uri(self.url.as_str())
			.header(CONTENT_TYPE, "application/json")
			.body(Body::from(payload))
			.map_err(|err| Error::Upstream(err.to_string()))?;

		let response = Client::new()
			.request(request)
			.await
			.map_err(|err| Error::Upstream(err.to_string()))?;

		let status = response.status();
		let bytes = body::to_bytes(response.into_body())
			.await
			.map_err(|err| Error::Upstream(err.to_string()))?;

		let value: serde_json::Value =
			serde_json::from_slice(&bytes).unwrap_or_else(|_| {
				serde_json::json!({
					"detail": String::from_utf8_lossy(&bytes),
				})
			});

		if !status.is_success() {
			tracing::error!(
				target: "predict",
				status = %status,
				"prediction service returned an error"
			);

			return Err(Error::Upstream(upstream_detail(&value)));
		}

		Ok(value)
	}
}

/// the service replies FastAPI style, errors carry a `detail` field
fn upstream_detail(value: &serde_json::Value) -> String {
	value.get("detail").map_or_else(
		|| value.to_string(),
		|detail| {
			detail
				.as_str()
				.map_or_else(|| detail.to_string(), str::to_string)
		},
	)
}

impl CustomModule for MoodPredict {
	type Resources = Hlist![Arc<MoodPredictResource>];

	fn create_filter<S: ModuleResources<Self>>(
		server: std::sync::Arc<S>,
	) -> BoxedFilter<(Box<dyn Reply>,)> {
		let (resource, _) = server.get_server_resources().pluck();
		let with_resource =
			warp::any().map(move || resource.clone());

		warp::path!("api" / "predict-mood")
			.and(warp::post())
			.and(warp::body::json())
			.and(with_resource)
			.and_then(predict_filter_fn)
			.map(|reply| -> Box<dyn Reply> { Box::new(reply) })
			.boxed()
	}
}

async fn predict_filter_fn(
	request: schema::PredictRequest,
	resource: Arc<MoodPredictResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.predict(&request.text).await {
		Ok(result) => Ok(warp::reply::json(&result).into_response()),
		Err(err) => {
			tracing::error!("mood prediction failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}
