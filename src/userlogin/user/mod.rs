pub mod in_memory;
pub mod json_file;

use crate::{error::Result, store::Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored user record. The `password` field holds the argon2 digest,
/// plaintext never reaches the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: String,
	pub name: String,
	pub email: String,
	pub password: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	#[must_use]
	pub fn new(
		id: String,
		name: String,
		email: String,
		password_digest: String,
	) -> Self {
		let now = Utc::now();

		Self {
			id,
			name,
			email,
			password: password_digest,
			created_at: now,
			updated_at: now,
		}
	}
}

impl Record for User {
	fn id(&self) -> &str {
		&self.id
	}

	fn touch(&mut self, now: DateTime<Utc>) {
		self.updated_at = now;
	}
}

/// fields a profile or password mutation may replace, absent fields
/// stay untouched
#[derive(Debug, Default, Clone)]
pub struct UserPatch {
	pub name: Option<String>,
	pub password: Option<String>,
}

#[async_trait]
pub trait UserDB: Send + Sync {
	async fn get_user(&self, id: &str) -> Option<User>;
	/// linear scan, emails are unique among users only
	async fn find_by_email(&self, email: &str) -> Option<User>;
	async fn create_user(&self, user: User) -> Result<()>;
	async fn update_user(
		&self,
		id: &str,
		patch: UserPatch,
	) -> Result<User>;
	async fn count(&self) -> usize;
}

pub(crate) fn apply_patch(user: &mut User, patch: UserPatch) {
	if let Some(name) = patch.name {
		user.name = name;
	}
	if let Some(password) = patch.password {
		user.password = password;
	}
}
