//! Request and response bodies of the JSON API.
//!
//! Field names follow the wire format the mobile client already
//! speaks, journal fields keep their indonesian names.

use crate::{journal::entry::JournalEntry, userlogin::user::User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
	pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
	pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
	pub name: String,
	pub email: String,
	pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

/// public view of a user, the password digest never leaves the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	pub id: String,
	pub name: String,
	pub email: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.clone(),
			name: user.name.clone(),
			email: user.email.clone(),
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	pub session_id: String,
	pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateRequest {
	pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
	pub current_password: String,
	pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalCreateRequest {
	#[serde(rename = "catatan")]
	pub note: String,
	pub mood: String,
	#[serde(rename = "aktivitas")]
	pub activities: Option<Vec<String>>,
	#[serde(rename = "detailAktivitas")]
	pub activity_details: Option<HashMap<String, String>>,
}

/// absent fields leave the stored entry untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalUpdateRequest {
	#[serde(rename = "catatan")]
	pub note: Option<String>,
	pub mood: Option<String>,
	#[serde(rename = "aktivitas")]
	pub activities: Option<Vec<String>>,
	#[serde(rename = "detailAktivitas")]
	pub activity_details: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalListResponse {
	pub journals: Vec<JournalEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
	pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStats {
	pub users: usize,
	pub journals: usize,
	pub sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	pub message: String,
	pub timestamp: DateTime<Utc>,
	pub stats: HealthStats,
}
