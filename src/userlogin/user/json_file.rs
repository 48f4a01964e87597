use super::{apply_patch, User, UserDB, UserPatch};
use crate::{
	error::Result,
	store::JsonCollection,
};
use async_trait::async_trait;
use std::path::PathBuf;

/// user store mirrored to a JSON array file under the data directory
pub struct JsonFileUserDB {
	collection: JsonCollection<User>,
}

impl JsonFileUserDB {
	/// # Errors
	/// fails when the backing file exists but cannot be parsed
	pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
		Ok(Self {
			collection: JsonCollection::load(path)?,
		})
	}

	/// identifiers currently held, used to seed the id generator
	pub async fn ids(&self) -> Vec<String> {
		self.collection.ids().await
	}
}

#[async_trait]
impl UserDB for JsonFileUserDB {
	async fn get_user(&self, id: &str) -> Option<User> {
		self.collection.get(id).await
	}

	async fn find_by_email(&self, email: &str) -> Option<User> {
		self.collection
			.all()
			.await
			.into_iter()
			.find(|user| user.email.eq_ignore_ascii_case(email))
	}

	async fn create_user(&self, user: User) -> Result<()> {
		self.collection.insert(user).await;

		Ok(())
	}

	async fn update_user(
		&self,
		id: &str,
		patch: UserPatch,
	) -> Result<User> {
		self.collection
			.update(id, |user| apply_patch(user, patch))
			.await
	}

	async fn count(&self) -> usize {
		self.collection.len().await
	}
}
