pub mod entry;
pub mod in_memory;
pub mod json_file;

use crate::{
	error::{Error, Result},
	ident::IdGenerator,
	rejection, schema,
	userlogin::{self, UserId, UserLoginResource},
	CustomModule, ModuleResources,
};
use entry::{JournalDB, JournalEntry, JournalPatch};
use frunk::Hlist;
use std::sync::Arc;
use tracing::instrument;
use warp::{filters::BoxedFilter, Filter, Rejection, Reply};

pub struct Journal {}

pub struct JournalResource {
	entries: Arc<dyn JournalDB>,
	ids: Arc<IdGenerator>,
}

impl JournalResource {
	#[must_use]
	pub fn new(
		entries: Arc<dyn JournalDB>,
		ids: Arc<IdGenerator>,
	) -> Self {
		Self { entries, ids }
	}

	pub async fn entry_count(&self) -> usize {
		self.entries.count().await
	}

	#[instrument(skip(self, request))]
	async fn create_entry(
		&self,
		user_id: &str,
		request: schema::JournalCreateRequest,
	) -> Result<JournalEntry> {
		let note = validate_text(&request.note, "catatan")?;
		let mood = validate_text(&request.mood, "mood")?;

		let entry = JournalEntry::new(
			self.ids.next(),
			user_id.to_string(),
			note,
			mood,
			request.activities.unwrap_or_default(),
			request.activity_details.unwrap_or_default(),
		);

		self.entries.create(entry.clone()).await?;

		tracing::info!("journal entry created: {}", &entry.id);

		Ok(entry)
	}

	async fn list_entries(
		&self,
		user_id: &str,
	) -> Vec<JournalEntry> {
		self.entries.list_for_user(user_id).await
	}

	/// Resolve an entry for its owner.
	///
	/// An entry owned by someone else yields the same `NotFound` as an
	/// absent one, existence must not leak across users.
	async fn entry_of(
		&self,
		user_id: &str,
		id: &str,
	) -> Result<JournalEntry> {
		match self.entries.get(id).await {
			Some(entry) if entry.user_id == user_id => Ok(entry),
			_ => Err(Error::NotFound),
		}
	}

	#[instrument(skip(self, request))]
	async fn update_entry(
		&self,
		user_id: &str,
		id: &str,
		request: schema::JournalUpdateRequest,
	) -> Result<JournalEntry> {
		self.entry_of(user_id, id).await?;

		let patch = JournalPatch {
			note: request
				.note
				.map(|note| validate_text(&note, "catatan"))
				.transpose()?,
			mood: request
				.mood
				.map(|mood| validate_text(&mood, "mood"))
				.transpose()?,
			activities: request.activities,
			activity_details: request.activity_details,
		};

		self.entries.update(id, patch).await
	}

	#[instrument(skip(self))]
	async fn delete_entry(
		&self,
		user_id: &str,
		id: &str,
	) -> Result<schema::MessageResponse> {
		self.entry_of(user_id, id).await?;

		self.entries.remove(id).await?;

		tracing::info!("journal entry removed: {}", id);

		Ok(schema::MessageResponse {
			message: String::from("journal entry deleted"),
		})
	}
}

impl CustomModule for Journal {
	type Resources =
		Hlist!(Arc<UserLoginResource>, Arc<JournalResource>);

	fn create_filter<S: ModuleResources<Self>>(
		server: std::sync::Arc<S>,
	) -> BoxedFilter<(Box<dyn Reply>,)> {
		let (user_resource, remaining): (Arc<UserLoginResource>, _) =
			server.get_server_resources().pluck();
		let (journal_resource, _) = remaining.pluck();

		let with_resource = warp::any().map({
			let resource: Arc<JournalResource> = journal_resource;
			move || resource.clone()
		});

		let create = warp::path!("api" / "journal")
			.and(warp::post())
			.and(userlogin::session_filter(user_resource.clone()))
			.and(warp::body::json())
			.and(with_resource.clone())
			.and_then(create_filter_fn);

		let list = warp::path!("api" / "journal")
			.and(warp::get())
			.and(userlogin::session_filter(user_resource.clone()))
			.and(with_resource.clone())
			.and_then(list_filter_fn);

		let get = warp::path!("api" / "journal" / String)
			.and(warp::get())
			.and(userlogin::session_filter(user_resource.clone()))
			.and(with_resource.clone())
			.and_then(get_filter_fn);

		let update = warp::path!("api" / "journal" / String)
			.and(warp::put())
			.and(userlogin::session_filter(user_resource.clone()))
			.and(warp::body::json())
			.and(with_resource.clone())
			.and_then(update_filter_fn);

		let delete = warp::path!("api" / "journal" / String)
			.and(warp::delete())
			.and(userlogin::session_filter(user_resource))
			.and(with_resource)
			.and_then(delete_filter_fn);

		create
			.or(list)
			.or(get)
			.or(update)
			.or(delete)
			.map(|reply| -> Box<dyn Reply> { Box::new(reply) })
			.boxed()
	}
}

async fn create_filter_fn(
	user_id: UserId,
	request: schema::JournalCreateRequest,
	resource: Arc<JournalResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.create_entry(&user_id, request).await {
		Ok(entry) => Ok(warp::reply::json(&entry).into_response()),
		Err(err) => {
			tracing::error!("journal create failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn list_filter_fn(
	user_id: UserId,
	resource: Arc<JournalResource>,
) -> std::result::Result<impl Reply, Rejection> {
	let journals = resource.list_entries(&user_id).await;

	Ok(warp::reply::json(&schema::JournalListResponse {
		journals,
	})
	.into_response())
}

async fn get_filter_fn(
	id: String,
	user_id: UserId,
	resource: Arc<JournalResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.entry_of(&user_id, &id).await {
		Ok(entry) => Ok(warp::reply::json(&entry).into_response()),
		Err(err) => Ok(rejection::error_reply(&err)),
	}
}

async fn update_filter_fn(
	id: String,
	user_id: UserId,
	request: schema::JournalUpdateRequest,
	resource: Arc<JournalResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.update_entry(&user_id, &id, request).await {
		Ok(entry) => Ok(warp::reply::json(&entry).into_response()),
		Err(err) => {
			tracing::error!("journal update failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn delete_filter_fn(
	id: String,
	user_id: UserId,
	resource: Arc<JournalResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.delete_entry(&user_id, &id).await {
		Ok(response) => {
			Ok(warp::reply::json(&response).into_response())
		}
		Err(err) => Ok(rejection::error_reply(&err)),
	}
}

fn validate_text(value: &str, field: &str) -> Result<String> {
	let value = value.trim();

	if value.is_empty() {
		return Err(Error::validation(format!(
			"{} must not be empty",
			field
		)));
	}

	Ok(value.to_string())
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use crate::{
		hlist,
		ident::IdGenerator,
		journal::{
			entry::{JournalDB, JournalEntry},
			in_memory::InMemoryJournalDB,
			Journal, JournalResource,
		},
		rejection::handle_rejection,
		schema,
		userlogin::{
			sessions::{InMemorySessionDB, Session},
			user::in_memory::InMemoryUserDB,
			UserLogin, UserLoginResource, HEADER_SESSION,
		},
		CustomModule, CustomServer, Hlist, Module, ModuleResources,
	};
	use chrono::{Duration, Utc};
	use pretty_assertions::assert_eq;
	use std::{collections::HashMap, sync::Arc};
	use tokio::sync::Mutex;
	use warp::{hyper::StatusCode, Filter};

	pub struct InMemoryServer {
		resources: <Self as CustomServer>::Resources,
	}

	impl CustomServer for InMemoryServer {
		type Resources =
			Hlist!(Arc<UserLoginResource>, Arc<JournalResource>);

		const MODULES: &'static [Module<Self>] = &[Module {
			name: "journal",
			call: Journal::create_filter,
		}];

		fn get_resources(&self) -> &Self::Resources {
			&self.resources
		}
	}

	impl ModuleResources<Journal> for InMemoryServer {
		fn get_server_resources(
			&self,
		) -> <Journal as CustomModule>::Resources {
			let (reshaped, _) = self.get_resources().clone().sculpt();
			reshaped
		}
	}

	impl ModuleResources<UserLogin> for InMemoryServer {
		fn get_server_resources(
			&self,
		) -> <UserLogin as CustomModule>::Resources {
			let (reshaped, _) = self.get_resources().clone().sculpt();
			reshaped
		}
	}

	fn sessions_with_tokens(
		tokens: &[(&str, &str)],
	) -> Arc<InMemorySessionDB> {
		let mut hashmap = HashMap::new();
		for (token, user_id) in tokens {
			hashmap.insert(
				(*token).to_string(),
				Session::new(
					user_id,
					&format!("{}@example.com", user_id),
				),
			);
		}
		Arc::new(InMemorySessionDB {
			db: Arc::new(Mutex::new(hashmap)),
		})
	}

	fn test_server(
		sessions: Arc<InMemorySessionDB>,
		journals: Arc<InMemoryJournalDB>,
	) -> Arc<InMemoryServer> {
		let ids = Arc::new(IdGenerator::new());

		Arc::new(InMemoryServer {
			resources: hlist![
				Arc::new(UserLoginResource::new(
					sessions,
					Arc::new(InMemoryUserDB::default()),
					ids.clone(),
				)),
				Arc::new(JournalResource::new(journals, ids)),
			],
		})
	}

	#[tokio::test]
	async fn test_create_and_get() {
		let sessions = sessions_with_tokens(&[("sid", "uid")]);
		let journals = Arc::new(InMemoryJournalDB::default());
		let server = test_server(sessions, journals);
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let reply = warp::test::request()
			.method("POST")
			.path("/api/journal")
			.header(HEADER_SESSION, "sid")
			.json(&serde_json::json!({
				"catatan": "felt okay",
				"mood": "neutral",
			}))
			.reply(&filter)
			.await;

		assert_eq!(reply.status(), 200);
		let entry: JournalEntry =
			serde_json::from_slice(reply.body()).unwrap();
		assert_eq!(entry.note, "felt okay");
		assert_eq!(entry.mood, "neutral");
		assert_eq!(entry.user_id, "uid");
		assert!(entry.activities.is_empty());
		assert!(entry.activity_details.is_empty());

		let reply = warp::test::request()
			.method("GET")
			.path(&format!("/api/journal/{}", entry.id))
			.header(HEADER_SESSION, "sid")
			.reply(&filter)
			.await;

		assert_eq!(reply.status(), 200);
		let fetched: JournalEntry =
			serde_json::from_slice(reply.body()).unwrap();
		assert_eq!(fetched, entry);
	}

	#[tokio::test]
	async fn test_create_requires_note_and_mood() {
		let sessions = sessions_with_tokens(&[("sid", "uid")]);
		let journals = Arc::new(InMemoryJournalDB::default());
		let server = test_server(sessions, journals);
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let reply = warp::test::request()
			.method("POST")
			.path("/api/journal")
			.header(HEADER_SESSION, "sid")
			.json(&serde_json::json!({
				"catatan": "   ",
				"mood": "neutral",
			}))
			.reply(&filter)
			.await;
		assert_eq!(reply.status(), StatusCode::BAD_REQUEST);

		let reply = warp::test::request()
			.method("POST")
			.path("/api/journal")
			.header(HEADER_SESSION, "sid")
			.json(&serde_json::json!({
				"catatan": "fine",
				"mood": "",
			}))
			.reply(&filter)
			.await;
		assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_listing_is_newest_first() {
		let sessions = sessions_with_tokens(&[("sid", "uid")]);
		let journals = Arc::new(InMemoryJournalDB::default());

		let base = Utc::now();
		for (offset, note) in
			vec![(0, "first"), (1, "second"), (2, "third")]
		{
			let mut entry = JournalEntry::new(
				format!("id_1_{}", offset),
				"uid".to_string(),
				note.to_string(),
				"neutral".to_string(),
				Vec::new(),
				HashMap::new(),
			);
			entry.created_at = base + Duration::seconds(offset);
			journals.create(entry).await.unwrap();
		}

		let server = test_server(sessions, journals);
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let reply = warp::test::request()
			.method("GET")
			.path("/api/journal")
			.header(HEADER_SESSION, "sid")
			.reply(&filter)
			.await;

		assert_eq!(reply.status(), 200);
		let response: schema::JournalListResponse =
			serde_json::from_slice(reply.body()).unwrap();
		let notes: Vec<&str> = response
			.journals
			.iter()
			.map(|entry| entry.note.as_str())
			.collect();
		assert_eq!(notes, vec!["third", "second", "first"]);
	}

	#[tokio::test]
	async fn test_foreign_entry_is_indistinguishable_from_absent() {
		let sessions = sessions_with_tokens(&[
			("sid-a", "user-a"),
			("sid-b", "user-b"),
		]);
		let journals = Arc::new(InMemoryJournalDB::default());
		journals
			.create(JournalEntry::new(
				"id_1_1".to_string(),
				"user-b".to_string(),
				"private".to_string(),
				"calm".to_string(),
				Vec::new(),
				HashMap::new(),
			))
			.await
			.unwrap();

		let server = test_server(sessions, journals.clone());
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let foreign = warp::test::request()
			.method("GET")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid-a")
			.reply(&filter)
			.await;
		let absent = warp::test::request()
			.method("GET")
			.path("/api/journal/id_9_9")
			.header(HEADER_SESSION, "sid-a")
			.reply(&filter)
			.await;

		assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
		assert_eq!(absent.status(), StatusCode::NOT_FOUND);
		assert_eq!(foreign.body(), absent.body());

		// update and delete behave the same way
		let update = warp::test::request()
			.method("PUT")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid-a")
			.json(&serde_json::json!({ "mood": "hijacked" }))
			.reply(&filter)
			.await;
		assert_eq!(update.status(), StatusCode::NOT_FOUND);

		let delete = warp::test::request()
			.method("DELETE")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid-a")
			.reply(&filter)
			.await;
		assert_eq!(delete.status(), StatusCode::NOT_FOUND);

		// the owner still sees the untouched entry
		let owned = warp::test::request()
			.method("GET")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid-b")
			.reply(&filter)
			.await;
		assert_eq!(owned.status(), 200);
		let entry: JournalEntry =
			serde_json::from_slice(owned.body()).unwrap();
		assert_eq!(entry.mood, "calm");
	}

	#[tokio::test]
	async fn test_update_patches_present_fields_only() {
		let sessions = sessions_with_tokens(&[("sid", "uid")]);
		let journals = Arc::new(InMemoryJournalDB::default());
		journals
			.create(JournalEntry::new(
				"id_1_1".to_string(),
				"uid".to_string(),
				"long day".to_string(),
				"tired".to_string(),
				vec!["work".to_string()],
				HashMap::new(),
			))
			.await
			.unwrap();

		let server = test_server(sessions, journals);
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let reply = warp::test::request()
			.method("PUT")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid")
			.json(&serde_json::json!({ "mood": "recovered" }))
			.reply(&filter)
			.await;

		assert_eq!(reply.status(), 200);
		let entry: JournalEntry =
			serde_json::from_slice(reply.body()).unwrap();
		assert_eq!(entry.mood, "recovered");
		assert_eq!(entry.note, "long day");
		assert_eq!(entry.activities, vec!["work".to_string()]);
		assert!(entry.updated_at >= entry.created_at);

		// a present but empty field is still rejected
		let reply = warp::test::request()
			.method("PUT")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid")
			.json(&serde_json::json!({ "catatan": "  " }))
			.reply(&filter)
			.await;
		assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_delete_entry() {
		let sessions = sessions_with_tokens(&[("sid", "uid")]);
		let journals = Arc::new(InMemoryJournalDB::default());
		journals
			.create(JournalEntry::new(
				"id_1_1".to_string(),
				"uid".to_string(),
				"obsolete".to_string(),
				"meh".to_string(),
				Vec::new(),
				HashMap::new(),
			))
			.await
			.unwrap();

		let server = test_server(sessions, journals.clone());
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let reply = warp::test::request()
			.method("DELETE")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid")
			.reply(&filter)
			.await;
		assert_eq!(reply.status(), 200);
		assert_eq!(journals.count().await, 0);

		let reply = warp::test::request()
			.method("GET")
			.path("/api/journal/id_1_1")
			.header(HEADER_SESSION, "sid")
			.reply(&filter)
			.await;
		assert_eq!(reply.status(), StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_all_routes_need_a_session() {
		let sessions = sessions_with_tokens(&[]);
		let journals = Arc::new(InMemoryJournalDB::default());
		let server = test_server(sessions, journals);
		let filter = Journal::create_filter(server)
			.recover(handle_rejection);

		let list = warp::test::request()
			.method("GET")
			.path("/api/journal")
			.reply(&filter)
			.await;
		assert_eq!(list.status(), StatusCode::UNAUTHORIZED);

		let create = warp::test::request()
			.method("POST")
			.path("/api/journal")
			.header(HEADER_SESSION, "stale-token")
			.json(&serde_json::json!({
				"catatan": "x",
				"mood": "y",
			}))
			.reply(&filter)
			.await;
		assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
	}
}
