pub mod password;
pub mod sessions;
pub mod user;

use crate::{
	error::{Error, Result},
	ident::IdGenerator,
	rejection::{self, SessionFailure},
	schema, CustomModule, ModuleResources,
};
use async_trait::async_trait;
use frunk::Hlist;
use sessions::Session;
use std::sync::Arc;
use tracing::instrument;
use user::{User, UserDB, UserPatch};
use warp::{
	filters::BoxedFilter, Filter, Rejection, Reply,
};

pub const HEADER_SESSION: &str = "X-Session-ID";

pub type UserId = String;

/// session validation responses
pub enum SessionValidationResult {
	/// returns `user_id` belonging to the session
	Ok { user_id: UserId },
	/// unknown token, missing header or logged out session
	Unknown,
}

pub struct UserLogin {}

/// hooks for the using crate to observe auth events
#[async_trait]
pub trait UserLoginEvents: Send + Sync {
	async fn on_login(&self, _user: &User) -> Result<()>;
	async fn on_register(&self, _user: &User) -> Result<()>;
}

pub struct UserLoginResource {
	sessions: Arc<dyn sessions::SessionDB>,
	users: Arc<dyn UserDB>,
	ids: Arc<IdGenerator>,
	events: Option<Arc<dyn UserLoginEvents>>,
}

impl UserLoginResource {
	#[must_use]
	pub fn new(
		sessions: Arc<dyn sessions::SessionDB>,
		users: Arc<dyn UserDB>,
		ids: Arc<IdGenerator>,
	) -> Self {
		Self {
			sessions,
			users,
			ids,
			events: None,
		}
	}

	pub fn set_events(&mut self, events: Arc<dyn UserLoginEvents>) {
		self.events = Some(events);
	}

	pub async fn validate_session(
		&self,
		token: &str,
	) -> SessionValidationResult {
		match self.sessions.get(token).await {
			Some(session) => SessionValidationResult::Ok {
				user_id: session.user_id,
			},
			None => SessionValidationResult::Unknown,
		}
	}

	pub async fn user_count(&self) -> usize {
		self.users.count().await
	}

	pub async fn session_count(&self) -> usize {
		self.sessions.count().await
	}

	#[instrument(skip(self, request))]
	async fn user_register(
		&self,
		request: schema::RegisterRequest,
	) -> Result<schema::UserResponse> {
		let name = validate_name(&request.name)?;
		let email = validate_email(&request.email)?;
		validate_password(&request.password)?;

		if self.users.find_by_email(&email).await.is_some() {
			return Err(Error::conflict("email already registered"));
		}

		let digest = password::hash(&request.password)?;
		let user = User::new(self.ids.next(), name, email, digest);

		self.users.create_user(user.clone()).await?;

		if let Some(events) = self.events.as_ref() {
			events.on_register(&user).await?;
		}

		tracing::info!("registered user: {}", &user.id);

		Ok(schema::UserResponse::from(&user))
	}

	/// An unknown email and a failed digest verification collapse into
	/// the same authorization failure so the endpoint cannot be used
	/// to enumerate accounts.
	#[instrument(skip(self, request))]
	async fn user_login(
		&self,
		request: schema::LoginRequest,
	) -> Result<(schema::LoginResponse, String)> {
		let user = self
			.users
			.find_by_email(request.email.trim())
			.await
			.ok_or(Error::Authentication)?;

		if !password::verify(&request.password, &user.password) {
			return Err(Error::Authentication);
		}

		let session_id = self
			.sessions
			.create(Session::new(&user.id, &user.email))
			.await?;

		if let Some(events) = self.events.as_ref() {
			events.on_login(&user).await?;
		}

		tracing::info!("user succesfully logged in");

		Ok((
			schema::LoginResponse {
				session_id: session_id.clone(),
				user: schema::UserResponse::from(&user),
			},
			session_id,
		))
	}

	async fn logout(&self, token: &str) -> schema::MessageResponse {
		self.sessions.destroy(token).await;

		schema::MessageResponse {
			message: String::from("logged out"),
		}
	}

	async fn profile(
		&self,
		user_id: &str,
	) -> Result<schema::UserResponse> {
		self.users
			.get_user(user_id)
			.await
			.as_ref()
			.map(schema::UserResponse::from)
			.ok_or(Error::NotFound)
	}

	#[instrument(skip(self, request))]
	async fn update_profile(
		&self,
		user_id: &str,
		request: schema::ProfileUpdateRequest,
	) -> Result<schema::UserResponse> {
		let name = validate_name(&request.name)?;

		let user = self
			.users
			.update_user(
				user_id,
				UserPatch {
					name: Some(name),
					..UserPatch::default()
				},
			)
			.await?;

		Ok(schema::UserResponse::from(&user))
	}

	#[instrument(skip(self, request))]
	async fn change_password(
		&self,
		user_id: &str,
		request: schema::PasswordChangeRequest,
	) -> Result<schema::MessageResponse> {
		let user = self
			.users
			.get_user(user_id)
			.await
			.ok_or(Error::NotFound)?;

		if !password::verify(&request.current_password, &user.password)
		{
			return Err(Error::validation(
				"current password is incorrect",
			));
		}

		if password::verify(&request.new_password, &user.password) {
			return Err(Error::validation(
				"new password must differ from the current password",
			));
		}

		validate_password(&request.new_password)?;

		let digest = password::hash(&request.new_password)?;
		self.users
			.update_user(
				user_id,
				UserPatch {
					password: Some(digest),
					..UserPatch::default()
				},
			)
			.await?;

		tracing::info!("password changed for user: {}", user_id);

		Ok(schema::MessageResponse {
			message: String::from("password updated"),
		})
	}
}

impl CustomModule for UserLogin {
	type Resources = Hlist![Arc<UserLoginResource>];

	fn create_filter<S: ModuleResources<Self>>(
		server: std::sync::Arc<S>,
	) -> BoxedFilter<(Box<dyn Reply>,)> {
		let (resource, _) = server.get_server_resources().pluck();
		let with_resource = warp::any().map({
			let resource = resource.clone();
			move || resource.clone()
		});

		let register = warp::path!("api" / "auth" / "register")
			.and(warp::post())
			.and(warp::body::json())
			.and(with_resource.clone())
			.and_then(register_filter_fn);

		let login = warp::path!("api" / "auth" / "login")
			.and(warp::post())
			.and(warp::body::json())
			.and(with_resource.clone())
			.and_then(login_filter_fn);

		let logout = warp::path!("api" / "auth" / "logout")
			.and(warp::post())
			.and(warp::header::optional::<String>(HEADER_SESSION))
			.and(with_resource.clone())
			.and_then(logout_filter_fn);

		let profile_get = warp::path!("api" / "auth" / "profile")
			.and(warp::get())
			.and(session_filter(resource.clone()))
			.and(with_resource.clone())
			.and_then(profile_filter_fn);

		let profile_update = warp::path!("api" / "auth" / "profile")
			.and(warp::put())
			.and(session_filter(resource.clone()))
			.and(warp::body::json())
			.and(with_resource.clone())
			.and_then(profile_update_filter_fn);

		let change_password =
			warp::path!("api" / "auth" / "change-password")
				.and(warp::put())
				.and(session_filter(resource))
				.and(warp::body::json())
				.and(with_resource)
				.and_then(change_password_filter_fn);

		register
			.or(login)
			.or(logout)
			.or(profile_get)
			.or(profile_update)
			.or(change_password)
			.map(|reply| -> Box<dyn Reply> { Box::new(reply) })
			.boxed()
	}
}

async fn register_filter_fn(
	request: schema::RegisterRequest,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.user_register(request).await {
		Ok(response) => {
			Ok(warp::reply::json(&response).into_response())
		}
		Err(err) => {
			tracing::error!("register failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn login_filter_fn(
	request: schema::LoginRequest,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.user_login(request).await {
		Ok((response, session_id)) => {
			Ok(warp::reply::with_header(
				warp::reply::with_header(
					warp::reply::json(&response),
					"Access-Control-Expose-Headers",
					HEADER_SESSION,
				),
				HEADER_SESSION,
				session_id,
			)
			.into_response())
		}
		Err(err) => {
			tracing::error!("login failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn logout_filter_fn(
	token: Option<String>,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match token {
		Some(token) => {
			let response = resource.logout(&token).await;
			Ok(warp::reply::json(&response).into_response())
		}
		None => Ok(rejection::error_reply(&Error::Authentication)),
	}
}

async fn profile_filter_fn(
	user_id: UserId,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.profile(&user_id).await {
		Ok(response) => {
			Ok(warp::reply::json(&response).into_response())
		}
		Err(err) => {
			tracing::error!("profile lookup failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn profile_update_filter_fn(
	user_id: UserId,
	request: schema::ProfileUpdateRequest,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.update_profile(&user_id, request).await {
		Ok(response) => {
			Ok(warp::reply::json(&response).into_response())
		}
		Err(err) => {
			tracing::error!("profile update failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

async fn change_password_filter_fn(
	user_id: UserId,
	request: schema::PasswordChangeRequest,
	resource: Arc<UserLoginResource>,
) -> std::result::Result<impl Reply, Rejection> {
	match resource.change_password(&user_id, request).await {
		Ok(response) => {
			Ok(warp::reply::json(&response).into_response())
		}
		Err(err) => {
			tracing::error!("password change failed: {}", err);
			Ok(rejection::error_reply(&err))
		}
	}
}

/// Returns filter that resolves the `X-Session-ID` header to the
/// session's user id, rejecting with the uniform authorization
/// failure when the header is missing or the token unknown.
///
/// Intended to be used for composing warp filters.
pub fn session_filter(
	resource: Arc<UserLoginResource>,
) -> impl Filter<Extract = (UserId,), Error = Rejection> + Clone {
	warp::any()
		.map(move || resource.clone())
		.and(warp::header::optional::<String>(HEADER_SESSION))
		.and_then(handle_session)
}

async fn handle_session(
	resource: Arc<UserLoginResource>,
	token: Option<String>,
) -> std::result::Result<UserId, Rejection> {
	match resource
		.validate_session(&token.unwrap_or_default())
		.await
	{
		SessionValidationResult::Ok { user_id } => Ok(user_id),
		SessionValidationResult::Unknown => {
			Err(warp::reject::custom(SessionFailure::SessionNotFound))
		}
	}
}

fn validate_name(name: &str) -> Result<String> {
	let name = name.trim();

	if name.is_empty() {
		return Err(Error::validation("name must not be empty"));
	}
	if name.chars().count() < 2 {
		return Err(Error::validation(
			"name must be at least 2 characters",
		));
	}
	if name.chars().count() > 50 {
		return Err(Error::validation(
			"name must be at most 50 characters",
		));
	}

	Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String> {
	let email = email.trim();

	if email.is_empty() || !email.contains('@') {
		return Err(Error::validation(
			"email must be a valid address",
		));
	}

	Ok(email.to_string())
}

fn validate_password(password: &str) -> Result<()> {
	let len = password.chars().count();

	if len < 6 || len > 100 {
		return Err(Error::validation(
			"password must be between 6 and 100 characters",
		));
	}

	Ok(())
}
