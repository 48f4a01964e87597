use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates record identifiers of the form `id_<millis>_<ordinal>`.
///
/// The ordinal alone guarantees uniqueness: it is seeded at startup to
/// one past the highest ordinal found across every record already on
/// disk, so identifiers minted after a restart can never collide with
/// persisted ones even when the clock component repeats.
pub struct IdGenerator {
	next_ordinal: AtomicU64,
}

impl IdGenerator {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			next_ordinal: AtomicU64::new(1),
		}
	}

	/// seed from the identifiers currently held by all collections
	pub fn seeded<I, S>(ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let max = ids
			.into_iter()
			.map(|id| Self::ordinal_of(id.as_ref()))
			.max()
			.unwrap_or(0);

		Self {
			next_ordinal: AtomicU64::new(max + 1),
		}
	}

	pub fn next(&self) -> String {
		let ordinal =
			self.next_ordinal.fetch_add(1, Ordering::SeqCst);

		format!("id_{}_{}", Utc::now().timestamp_millis(), ordinal)
	}

	/// ordinal suffix of an `id_<millis>_<ordinal>` identifier,
	/// malformed or foreign identifiers count as 0 so they never
	/// poison the seed
	fn ordinal_of(id: &str) -> u64 {
		let mut parts = id.splitn(3, '_');

		if parts.next() != Some("id") {
			return 0;
		}

		if parts
			.next()
			.map_or(true, |ts| ts.parse::<i64>().is_err())
		{
			return 0;
		}

		parts
			.next()
			.and_then(|ordinal| ordinal.parse::<u64>().ok())
			.unwrap_or(0)
	}
}

impl Default for IdGenerator {
	fn default() -> Self {
		Self::new()
	}
}
