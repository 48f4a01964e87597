use crate::{error::Result, store::Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored journal entry. Wire field names are the indonesian ones the
/// client speaks, the backing file uses the same shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
	pub id: String,
	/// owning user, set at creation and never reassigned
	pub user_id: String,
	#[serde(rename = "catatan")]
	pub note: String,
	pub mood: String,
	#[serde(rename = "aktivitas", default)]
	pub activities: Vec<String>,
	#[serde(rename = "detailAktivitas", default)]
	pub activity_details: HashMap<String, String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
	#[must_use]
	pub fn new(
		id: String,
		user_id: String,
		note: String,
		mood: String,
		activities: Vec<String>,
		activity_details: HashMap<String, String>,
	) -> Self {
		let now = Utc::now();

		Self {
			id,
			user_id,
			note,
			mood,
			activities,
			activity_details,
			created_at: now,
			updated_at: now,
		}
	}
}

impl Record for JournalEntry {
	fn id(&self) -> &str {
		&self.id
	}

	fn touch(&mut self, now: DateTime<Utc>) {
		self.updated_at = now;
	}
}

/// fields an update may replace, absent fields stay untouched
#[derive(Debug, Default, Clone)]
pub struct JournalPatch {
	pub note: Option<String>,
	pub mood: Option<String>,
	pub activities: Option<Vec<String>>,
	pub activity_details: Option<HashMap<String, String>>,
}

#[async_trait]
pub trait JournalDB: Send + Sync {
	async fn create(&self, entry: JournalEntry) -> Result<()>;
	async fn get(&self, id: &str) -> Option<JournalEntry>;
	/// the owner's entries, newest first, ties keep insertion order
	async fn list_for_user(&self, user_id: &str)
		-> Vec<JournalEntry>;
	async fn update(
		&self,
		id: &str,
		patch: JournalPatch,
	) -> Result<JournalEntry>;
	async fn remove(&self, id: &str) -> Result<JournalEntry>;
	async fn count(&self) -> usize;
}

pub(crate) fn apply_patch(
	entry: &mut JournalEntry,
	patch: JournalPatch,
) {
	if let Some(note) = patch.note {
		entry.note = note;
	}
	if let Some(mood) = patch.mood {
		entry.mood = mood;
	}
	if let Some(activities) = patch.activities {
		entry.activities = activities;
	}
	if let Some(details) = patch.activity_details {
		entry.activity_details = details;
	}
}

/// newest first, the sort is stable so same-instant entries keep
/// their insertion order
pub(crate) fn sort_newest_first(entries: &mut [JournalEntry]) {
	entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
