use super::{Session, SessionDB};
use crate::error::Result;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemorySessionDB {
	pub db: Arc<Mutex<HashMap<String, Session>>>,
}

#[async_trait]
impl SessionDB for InMemorySessionDB {
	async fn create(&self, session: Session) -> Result<String> {
		let key = Session::new_key();

		self.db.lock().await.insert(key.clone(), session);

		Ok(key)
	}

	async fn get(&self, key: &str) -> Option<Session> {
		self.db.lock().await.get(key).cloned()
	}

	async fn destroy(&self, key: &str) {
		self.db.lock().await.remove(key);
	}

	async fn count(&self) -> usize {
		self.db.lock().await.len()
	}
}
