use moodjournal::{
	health::Health,
	hlist,
	ident::IdGenerator,
	journal::{
		json_file::JsonFileJournalDB, Journal, JournalResource,
	},
	moodpredict::{
		MoodPredict, MoodPredictResource, DEFAULT_PREDICT_URL,
	},
	userlogin::{
		sessions::InMemorySessionDB,
		user::json_file::JsonFileUserDB, UserLogin,
		UserLoginResource,
	},
	CustomModule, CustomServer, Hlist, Module, ModuleResources,
};
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

struct MoodJournalServer {
	resources: <Self as CustomServer>::Resources,
}

impl CustomServer for MoodJournalServer {
	type Resources = Hlist!(
		Arc<UserLoginResource>,
		Arc<JournalResource>,
		Arc<MoodPredictResource>
	);

	const MODULES: &'static [Module<Self>] = &[
		Module {
			name: "health",
			call: Health::create_filter,
		},
		Module {
			name: "userlogin",
			call: UserLogin::create_filter,
		},
		Module {
			name: "journal",
			call: Journal::create_filter,
		},
		Module {
			name: "moodpredict",
			call: MoodPredict::create_filter,
		},
	];

	fn get_resources(&self) -> &Self::Resources {
		&self.resources
	}
}

impl ModuleResources<UserLogin> for MoodJournalServer {
	fn get_server_resources(
		&self,
	) -> <UserLogin as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

impl ModuleResources<Journal> for MoodJournalServer {
	fn get_server_resources(
		&self,
	) -> <Journal as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

impl ModuleResources<MoodPredict> for MoodJournalServer {
	fn get_server_resources(
		&self,
	) -> <MoodPredict as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

impl ModuleResources<Health> for MoodJournalServer {
	fn get_server_resources(
		&self,
	) -> <Health as CustomModule>::Resources {
		let (reshaped, _) = self.get_resources().clone().sculpt();
		reshaped
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| {
					tracing_subscriber::EnvFilter::new("info")
				}),
		)
		.init();

	let data_dir = PathBuf::from(
		env::var("MOODJOURNAL_DATA_DIR")
			.unwrap_or_else(|_| String::from("data")),
	);
	std::fs::create_dir_all(&data_dir)?;

	// a corrupt store file is fatal on purpose, the process must not
	// start over an empty collection it cannot trust
	let users = JsonFileUserDB::load(data_dir.join("users.json"))?;
	let journals =
		JsonFileJournalDB::load(data_dir.join("journals.json"))?;

	let mut seen = users.ids().await;
	seen.extend(journals.ids().await);
	let ids = Arc::new(IdGenerator::seeded(seen));

	let predict_url = env::var("MOODJOURNAL_PREDICT_URL")
		.unwrap_or_else(|_| String::from(DEFAULT_PREDICT_URL));

	let addr: SocketAddr = env::var("MOODJOURNAL_ADDR")
		.unwrap_or_else(|_| String::from("0.0.0.0:8080"))
		.parse()?;

	let server = Arc::new(MoodJournalServer {
		resources: hlist![
			Arc::new(UserLoginResource::new(
				Arc::new(InMemorySessionDB::default()),
				Arc::new(users),
				ids.clone(),
			)),
			Arc::new(JournalResource::new(Arc::new(journals), ids)),
			Arc::new(MoodPredictResource::new(predict_url)),
		],
	});

	tracing::info!("listening on {}", addr);

	moodjournal::initialize_server(server, addr).await;

	Ok(())
}
