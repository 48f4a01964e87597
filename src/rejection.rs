use crate::{error::Error, schema::ErrorResponse};
use std::convert::Infallible;
use warp::{
	hyper::StatusCode, reject::Reject, reply::Response, Rejection,
	Reply,
};

#[derive(Debug)]
pub enum SessionFailure {
	SessionNotFound,
}

impl Reject for SessionFailure {}

/// turns an access layer error into the JSON reply mandated by the
/// error taxonomy, handlers call this instead of letting faults
/// escape into warp rejections
#[must_use]
pub fn error_reply(err: &Error) -> Response {
	warp::reply::with_status(
		warp::reply::json(&ErrorResponse {
			error: err.public_message(),
		}),
		err.status(),
	)
	.into_response()
}

#[allow(clippy::missing_errors_doc)]
pub async fn handle_rejection(
	err: Rejection,
) -> Result<impl Reply, Infallible> {
	if let Some(SessionFailure::SessionNotFound) =
		err.find::<SessionFailure>()
	{
		return Ok(error_reply(&Error::Authentication));
	}

	if err.is_not_found() {
		return Ok(error_reply(&Error::NotFound));
	}

	if let Some(body_err) =
		err.find::<warp::filters::body::BodyDeserializeError>()
	{
		return Ok(error_reply(&Error::validation(format!(
			"invalid request body: {}",
			body_err
		))));
	}

	if err.find::<warp::reject::MethodNotAllowed>().is_some() {
		return Ok(warp::reply::with_status(
			warp::reply::json(&ErrorResponse {
				error: String::from("method not allowed"),
			}),
			StatusCode::METHOD_NOT_ALLOWED,
		)
		.into_response());
	}

	tracing::error!("unhandled rejection {:?}", err);

	Ok(error_reply(&Error::Custom(String::from(
		"unhandled rejection",
	))))
}
