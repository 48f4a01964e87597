use super::{apply_patch, User, UserDB, UserPatch};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryUserDB {
	pub db: Arc<Mutex<HashMap<String, User>>>,
}

#[async_trait]
impl UserDB for InMemoryUserDB {
	async fn get_user(&self, id: &str) -> Option<User> {
		self.db.lock().await.get(id).cloned()
	}

	async fn find_by_email(&self, email: &str) -> Option<User> {
		self.db
			.lock()
			.await
			.values()
			.find(|user| user.email.eq_ignore_ascii_case(email))
			.cloned()
	}

	async fn create_user(&self, user: User) -> Result<()> {
		self.db.lock().await.insert(user.id.clone(), user);

		Ok(())
	}

	async fn update_user(
		&self,
		id: &str,
		patch: UserPatch,
	) -> Result<User> {
		let mut db = self.db.lock().await;

		let user = db.get_mut(id).ok_or(Error::NotFound)?;
		apply_patch(user, patch);
		user.updated_at = Utc::now();

		Ok(user.clone())
	}

	async fn count(&self) -> usize {
		self.db.lock().await.len()
	}
}
