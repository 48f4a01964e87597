use super::entry::{
	apply_patch, sort_newest_first, JournalDB, JournalEntry,
	JournalPatch,
};
use crate::{error::Result, store::JsonCollection};
use async_trait::async_trait;
use std::path::PathBuf;

/// journal store mirrored to a JSON array file under the data
/// directory
pub struct JsonFileJournalDB {
	collection: JsonCollection<JournalEntry>,
}

impl JsonFileJournalDB {
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
impl JournalDB for JsonFileJournalDB {
	async fn create(&self, entry: JournalEntry) -> Result<()> {
		self.collection.insert(entry).await;

		Ok(())
	}

	async fn get(&self, id: &str) -> Option<JournalEntry> {
		self.collection.get(id).await
	}

	async fn list_for_user(
		&self,
		user_id: &str,
	) -> Vec<JournalEntry> {
		let mut entries: Vec<JournalEntry> = self
			.collection
			.all()
			.await
			.into_iter()
			.filter(|entry| entry.user_id == user_id)
			.collect();

		sort_newest_first(&mut entries);

		entries
	}

	async fn update(
		&self,
		id: &str,
		patch: JournalPatch,
	) -> Result<JournalEntry> {
		self.collection
			.update(id, |entry| apply_patch(entry, patch))
			.await
	}

	async fn remove(&self, id: &str) -> Result<JournalEntry> {
		self.collection.remove(id).await
	}

	async fn count(&self) -> usize {
		self.collection.len().await
	}
}
