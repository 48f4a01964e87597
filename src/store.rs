//! File backed persistent collections.
//!
//! A [`JsonCollection`] keeps an insertion ordered `Vec` of records in
//! memory and mirrors it to a single JSON array file. Every mutation
//! rewrites the whole file before the lock is released, so the scan,
//! mutate, persist sequence of one request can never interleave with
//! another's.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tokio::sync::Mutex;

/// a storable record with a unique, immutable identifier
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
	fn id(&self) -> &str;

	/// stamp the record's update timestamp
	fn touch(&mut self, now: DateTime<Utc>);
}

pub struct JsonCollection<T: Record> {
	path: PathBuf,
	records: Mutex<Vec<T>>,
}

impl<T: Record> JsonCollection<T> {
	/// Load the collection from its backing file.
	///
	/// A missing file bootstraps an empty collection and writes it out
	/// immediately. An unreadable or unparsable file is a fatal error,
	/// the caller must not start with data it cannot trust.
	///
	/// # Errors
	/// fails when the backing file exists but cannot be read or parsed
	pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();

		let records: Vec<T> = if path.exists() {
			let bytes = fs::read(&path)?;
			serde_json::from_slice(&bytes)?
		} else {
			write_file(&path, &Vec::<T>::new())?;
			Vec::new()
		};

		tracing::info!(
			target: "store",
			path = %path.display(),
			records = records.len(),
			"collection loaded"
		);

		Ok(Self {
			path,
			records: Mutex::new(records),
		})
	}

	/// read-only snapshot in insertion order
	pub async fn all(&self) -> Vec<T> {
		self.records.lock().await.clone()
	}

	pub async fn get(&self, id: &str) -> Option<T> {
		self.records
			.lock()
			.await
			.iter()
			.find(|record| record.id() == id)
			.cloned()
	}

	/// append a record, the caller is responsible for having minted a
	/// unique id beforehand
	pub async fn insert(&self, record: T) {
		let mut records = self.records.lock().await;

		records.push(record);
		self.persist(&records);
	}

	/// Locate a record by id, apply `patch` to it and stamp its update
	/// timestamp.
	///
	/// # Errors
	/// `Error::NotFound` when no record carries `id`
	pub async fn update<F>(&self, id: &str, patch: F) -> Result<T>
	where
		F: FnOnce(&mut T) + Send,
	{
		let mut records = self.records.lock().await;

		let record = records
			.iter_mut()
			.find(|record| record.id() == id)
			.ok_or(Error::NotFound)?;

		patch(record);
		record.touch(Utc::now());
		let updated = record.clone();

		self.persist(&records);

		Ok(updated)
	}

	/// # Errors
	/// `Error::NotFound` when no record carries `id`
	pub async fn remove(&self, id: &str) -> Result<T> {
		let mut records = self.records.lock().await;

		let index = records
			.iter()
			.position(|record| record.id() == id)
			.ok_or(Error::NotFound)?;

		let removed = records.remove(index);
		self.persist(&records);

		Ok(removed)
	}

	pub async fn len(&self) -> usize {
		self.records.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.records.lock().await.is_empty()
	}

	pub async fn ids(&self) -> Vec<String> {
		self.records
			.lock()
			.await
			.iter()
			.map(|record| record.id().to_string())
			.collect()
	}

	/// Rewrite the backing file from the in-memory state.
	///
	/// A write failure is logged and the in-memory mutation stands,
	/// the caller's operation still counts as succeeded. The stance
	/// favors availability over strict durability.
	fn persist(&self, records: &[T]) {
		if let Err(err) = write_file(&self.path, records) {
			tracing::error!(
				target: "store",
				path = %self.path.display(),
				"failed to persist collection: {}",
				err
			);
		}
	}
}

fn write_file<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
	let bytes = serde_json::to_vec_pretty(records)?;

	// write to a sibling temp file first so a crash mid-write cannot
	// truncate the live file
	let tmp = path.with_extension("json.tmp");
	fs::write(&tmp, &bytes)?;
	fs::rename(&tmp, path)?;

	Ok(())
}
