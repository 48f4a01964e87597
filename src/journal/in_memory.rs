use super::entry::{
	apply_patch, sort_newest_first, JournalDB, JournalEntry,
	JournalPatch,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// volatile journal store, a `Vec` so listing keeps insertion order
/// like the file backed one
#[derive(Default)]
pub struct InMemoryJournalDB {
	pub db: Arc<Mutex<Vec<JournalEntry>>>,
}

#[async_trait]
impl JournalDB for InMemoryJournalDB {
	async fn create(&self, entry: JournalEntry) -> Result<()> {
		self.db.lock().await.push(entry);

		Ok(())
	}

	async fn get(&self, id: &str) -> Option<JournalEntry> {
		self.db
			.lock()
			.await
			.iter()
			.find(|entry| entry.id == id)
			.cloned()
	}

	async fn list_for_user(
		&self,
		user_id: &str,
	) -> Vec<JournalEntry> {
		let mut entries: Vec<JournalEntry> = self
			.db
			.lock()
			.await
			.iter()
			.filter(|entry| entry.user_id == user_id)
			.cloned()
			.collect();

		sort_newest_first(&mut entries);

		entries
	}

	async fn update(
		&self,
		id: &str,
		patch: JournalPatch,
	) -> Result<JournalEntry> {
		let mut db = self.db.lock().await;

		let entry = db
			.iter_mut()
			.find(|entry| entry.id == id)
			.ok_or(Error::NotFound)?;

		apply_patch(entry, patch);
		entry.updated_at = Utc::now();

		Ok(entry.clone())
	}

	async fn remove(&self, id: &str) -> Result<JournalEntry> {
		let mut db = self.db.lock().await;

		let index = db
			.iter()
			.position(|entry| entry.id == id)
			.ok_or(Error::NotFound)?;

		Ok(db.remove(index))
	}

	async fn count(&self) -> usize {
		self.db.lock().await.len()
	}
}
