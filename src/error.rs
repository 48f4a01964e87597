use thiserror::Error;
use warp::hyper::StatusCode;

#[derive(Error, Debug)]
pub enum Error {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("{0}")]
	Validation(String),

	/// carries no detail on purpose, a failed login and an unknown
	/// session must be indistinguishable to the caller
	#[error("invalid credentials or session")]
	Authentication,

	/// carries no detail on purpose, a foreign-owned record and an
	/// absent record must be indistinguishable to the caller
	#[error("resource not found")]
	NotFound,

	#[error("{0}")]
	Conflict(String),

	#[error("prediction service error: {0}")]
	Upstream(String),

	#[error("password hashing error: {0}")]
	Hash(String),

	#[error("custom error: {0}")]
	Custom(String),
}

impl Error {
	#[must_use]
	pub fn validation(msg: impl Into<String>) -> Self {
		Self::Validation(msg.into())
	}

	#[must_use]
	pub fn conflict(msg: impl Into<String>) -> Self {
		Self::Conflict(msg.into())
	}

	/// status code a handler answers with when an operation failed
	/// with this error
	#[must_use]
	pub const fn status(&self) -> StatusCode {
		match self {
			Self::Validation(_) | Self::Conflict(_) => {
				StatusCode::BAD_REQUEST
			}
			Self::Authentication => StatusCode::UNAUTHORIZED,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::Io(_)
			| Self::Json(_)
			| Self::Upstream(_)
			| Self::Hash(_)
			| Self::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// message that is safe to expose to the caller, internal faults
	/// collapse into a generic one
	#[must_use]
	pub fn public_message(&self) -> String {
		match self {
			Self::Validation(msg) | Self::Conflict(msg) => msg.clone(),
			Self::Authentication
			| Self::NotFound
			| Self::Upstream(_) => self.to_string(),
			Self::Io(_)
			| Self::Json(_)
			| Self::Hash(_)
			| Self::Custom(_) => String::from("internal server error"),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
