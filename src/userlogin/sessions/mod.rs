mod in_memory;

pub use in_memory::InMemorySessionDB;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Authenticated context behind a session token.
///
/// Sessions are never persisted, a restart invalidates all of them by
/// design.
#[derive(Debug, Clone)]
pub struct Session {
	pub user_id: String,
	/// email snapshot taken at login time
	pub email: String,
	pub created_at: DateTime<Utc>,
}

impl Session {
	#[must_use]
	pub fn new(user_id: &str, email: &str) -> Self {
		Self {
			user_id: user_id.to_string(),
			email: email.to_string(),
			created_at: Utc::now(),
		}
	}

	/// opaque bearer token, high entropy and unguessable but not
	/// signed
	fn new_key() -> String {
		uuid::Uuid::new_v4().to_string()
	}
}

#[async_trait]
pub trait SessionDB: Send + Sync {
	async fn create(&self, session: Session) -> Result<String>;
	async fn get(&self, key: &str) -> Option<Session>;
	/// removing an unknown key is not an error, logout is idempotent
	async fn destroy(&self, key: &str);
	async fn count(&self) -> usize;
}
