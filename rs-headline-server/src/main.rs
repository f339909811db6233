use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{delete, get, middleware, post, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use rs_headline_core::io::{list_files, normalize_folder, CORPUS_EXTENSION};
use rs_headline_core::model::config::{GenerationConfig, TrainingConfig};
use rs_headline_core::model::corpus::Corpus;
use rs_headline_core::model::generator::Generator;
use rs_headline_core::model::ngram_model::NGramModel;
use rs_headline_core::model::trainer::TrainingSession;
use rs_headline_core::model::validator::{HeadlinePolicy, Validator};

/// HTTP front-end for the headline generator.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Directory holding `.txt` corpus files (one headline per line)
	#[arg(long, default_value = "./data")]
	data: String,

	/// Initial model order
	#[arg(long, default_value_t = 2)]
	order: usize,
}

/// Upper bound on headlines generated by one request.
const MAX_COUNT: usize = 1000;

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize, Debug, Default)]
struct GenerateParams {
	count: Option<usize>,
	seed: Option<u64>,
	min_words: Option<usize>,
	max_words: Option<usize>,
	contains: Option<String>, // "none" removes the phrase rule
	max_failures: Option<usize>, // consecutive rejected candidates before giving up
}

#[derive(Deserialize)]
struct TrainQuery {
	order: Option<usize>,
	files: Option<String>, // comma separated, all files if missing
}

#[derive(Deserialize)]
struct HeadlineQuery {
	title: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CorpusInfo {
	headlines: usize,
	added: usize,
	order: usize,
	sources: Vec<String>,
}

struct SharedData {
	data_dir: String,
	session: TrainingSession,
	model: Option<Arc<NGramModel>>,
	/// Default policy with the current corpus excluded.
	policy: HeadlinePolicy,
}

impl SharedData {
	fn new(data_dir: String, session: TrainingSession) -> Self {
		let mut shared = Self { data_dir, session, model: None, policy: HeadlinePolicy::default() };
		shared.refresh();
		shared
	}

	/// Rebuilds the model and policy from the current session.
	fn refresh(&mut self) {
		let model = match self.session.model() {
			Ok(model) => Some(Arc::new(model)),
			Err(e) => {
				warn!("no model available: {e}");
				None
			}
		};
		self.set_model(model);
	}

	/// Installs an already trained session.
	fn replace(&mut self, session: TrainingSession, model: NGramModel) {
		self.session = session;
		self.set_model(Some(Arc::new(model)));
	}

	fn set_model(&mut self, model: Option<Arc<NGramModel>>) {
		self.model = model;
		self.policy = HeadlinePolicy::default();
		self.policy.exclude_corpus(self.session.corpus());
	}
}

impl GenerateParams {
	/// Builds the acceptance policy for this request on top of `base`.
	fn policy(&self, base: &HeadlinePolicy) -> Result<HeadlinePolicy, String> {
		let mut policy = base.clone();
		let min_words = self.min_words.unwrap_or(policy.min_words());
		let max_words = self.max_words.unwrap_or(policy.max_words());
		policy.set_word_bounds(min_words, max_words).map_err(|e| e.to_string())?;

		match &self.contains {
			None => (),
			Some(s) if s.trim().eq_ignore_ascii_case("none") => policy.set_required_phrase(None),
			Some(s) => policy.set_required_phrase(Some(s.as_str())),
		}
		Ok(policy)
	}

	fn generator(&self) -> Generator {
		let mut config = GenerationConfig::default();
		if let Some(max_failures) = self.max_failures {
			config.consecutive_invalid_limit = max_failures;
		}
		Generator::new(config)
	}

	fn count(&self) -> usize {
		self.count.unwrap_or(1).min(MAX_COUNT)
	}

	fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_rng(&mut rand::rng()),
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` distinct headlines (default 1, at most `MAX_COUNT`), one per line.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let (model, base_policy) = {
		let shared_data = match data.lock() {
			Ok(m) => m,
			Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
		};
		match &shared_data.model {
			Some(model) => (model.clone(), shared_data.policy.clone()),
			None => return HttpResponse::ServiceUnavailable().body("No model trained"),
		}
	};

	let policy = match query.policy(&base_policy) {
		Ok(p) => p,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let count = query.count();
	let batch = query.generator().generate_batch(&model, count, &policy, &mut query.rng());
	if batch.headlines.is_empty() && count > 0 {
		return HttpResponse::InternalServerError().body(format!(
			"Failed to construct headline after {} attempts. Try decreasing n or adding more training data.",
			batch.attempts
		));
	}

	HttpResponse::Ok().body(batch.headlines.join("\n"))
}

/// HTTP GET endpoint `/v1/model`: the normalized model as JSON.
#[get("/v1/model")]
async fn get_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let model = match data.lock() {
		Ok(m) => m.model.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match model {
		Some(model) => HttpResponse::Ok().json(model.dump()),
		None => HttpResponse::ServiceUnavailable().body("No model trained"),
	}
}

#[get("/v1/corpus")]
async fn get_corpus(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let corpus = shared_data.session.corpus();
	HttpResponse::Ok().json(CorpusInfo {
		headlines: corpus.len(),
		added: shared_data.session.added().len(),
		order: shared_data.session.order(),
		sources: corpus.sources().to_vec(),
	})
}

#[get("/v1/files")]
async fn get_files(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(normalize_folder(&data_dir), CORPUS_EXTENSION) {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpus files"),
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Reloads the corpus from the given files (all files if none) and retrains
/// with the given order (current order if none). Only files listed by
/// `/v1/files` are accepted. On any failure the current model is kept.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let order = query.order.unwrap_or(shared_data.session.order());
	let config = match TrainingConfig::new(order) {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let folder = normalize_folder(&shared_data.data_dir);
	let available = match list_files(&folder, CORPUS_EXTENSION) {
		Ok(files) => files,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to list corpus files: {e}")),
	};
	let files = match &query.files {
		Some(s) if !s.trim().is_empty() => {
			let mut files = Vec::new();
			for name in s.split(',').map(str::trim).filter(|f| !f.is_empty()) {
				let name = if name.ends_with(".txt") { name.to_owned() } else { format!("{name}.txt") };
				if !available.contains(&name) {
					return HttpResponse::BadRequest().body(format!("Unknown corpus file: {name}"));
				}
				files.push(name);
			}
			files
		}
		_ => available,
	};

	let corpus = match Corpus::load_files(&folder, &files) {
		Ok(c) => c,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
	};
	let trained = TrainingSession::new(config, corpus).and_then(|session| {
		let model = session.model()?;
		Ok((session, model))
	});

	match trained {
		Ok((session, model)) => {
			shared_data.replace(session, model);
			HttpResponse::Ok().body("Model trained successfully")
		}
		Err(e) => {
			warn!("training rejected, keeping the current model: {e}");
			HttpResponse::BadRequest().body(format!("Failed to train model: {e}"))
		}
	}
}

/// HTTP POST endpoint `/v1/headlines`: adds one headline to the corpus.
///
/// The headline must pass the default policy (5 to 20 words, contains
/// "florida man").
#[post("/v1/headlines")]
async fn post_headline(data: web::Data<Mutex<SharedData>>, query: web::Query<HeadlineQuery>) -> impl Responder {
	let title = match &query.title {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty title"),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	if shared_data.session.corpus().contains(title) {
		return HttpResponse::Conflict().body("Headline already in corpus");
	}
	if !shared_data.policy.is_valid(title) {
		return HttpResponse::BadRequest().body("Headline must be 5 to 20 words long and contain \"florida man\"");
	}
	if !shared_data.session.add_headline(title) {
		return HttpResponse::Conflict().body("Headline already in corpus");
	}
	shared_data.refresh();
	info!("added headline, corpus size {}", shared_data.session.corpus().len());

	HttpResponse::Ok().body("Headline added")
}

/// HTTP DELETE endpoint `/v1/headlines`: drops every added headline and retrains.
#[delete("/v1/headlines")]
async fn delete_headlines(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match shared_data.session.clear_added() {
		Ok(removed) => {
			shared_data.refresh();
			HttpResponse::Ok().body(format!("Removed {removed} headlines"))
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to retrain: {e}")),
	}
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_model)
		.service(get_corpus)
		.service(get_files)
		.service(put_train)
		.service(post_headline)
		.service(delete_headlines);
}

/// Main entry point for the server.
///
/// Loads the corpus directory, trains the initial model, wraps the shared
/// state in a `Mutex` and starts an Actix-web HTTP server.
/// A missing or empty corpus directory is not fatal: `/v1/train` and
/// `/v1/headlines` can populate it later.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let config = TrainingConfig::new(args.order).map_err(std::io::Error::other)?;
	let corpus = Corpus::load_dir(&args.data).unwrap_or_else(|e| {
		warn!("could not load {}: {e}", args.data);
		Corpus::new()
	});
	let session = TrainingSession::new(config, corpus).map_err(std::io::Error::other)?;
	let shared_model = web::Data::new(Mutex::new(SharedData::new(args.data.clone(), session)));

	info!("listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(configure)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test as actix_test;
	use std::fs;

	fn shared(headlines: &[&str]) -> web::Data<Mutex<SharedData>> {
		let session = TrainingSession::new(TrainingConfig::new(1).unwrap(), Corpus::from_headlines(headlines)).unwrap();
		web::Data::new(Mutex::new(SharedData::new("./data".to_owned(), session)))
	}

	/// `root/secret.txt` sits next to the data folder `root/data`.
	fn data_dir() -> tempfile::TempDir {
		let root = tempfile::tempdir().unwrap();
		let data = root.path().join("data");
		fs::create_dir(&data).unwrap();
		fs::write(data.join("local.txt"), "Florida man arrested\nFlorida man escapes\n").unwrap();
		fs::write(data.join("user.txt"), "Gator bites florida man\n").unwrap();
		fs::write(data.join("blank.txt"), "\n   \n").unwrap();
		fs::write(data.join("notes.md"), "ignored\n").unwrap();
		fs::write(root.path().join("secret.txt"), "top secret token\n").unwrap();
		root
	}

	fn shared_from(dir: &tempfile::TempDir) -> web::Data<Mutex<SharedData>> {
		let data = dir.path().join("data").to_string_lossy().to_string();
		let session = TrainingSession::new(TrainingConfig::default(), Corpus::load_dir(&data).unwrap()).unwrap();
		web::Data::new(Mutex::new(SharedData::new(data, session)))
	}

	#[test]
	fn request_policy() {
		let params = GenerateParams { min_words: Some(9), max_words: Some(2), ..Default::default() };
		assert!(params.policy(&HeadlinePolicy::default()).is_err());

		let params = GenerateParams { contains: Some("None".to_owned()), ..Default::default() };
		assert_eq!(params.policy(&HeadlinePolicy::default()).unwrap().required_phrase(), None);
	}

	#[test]
	fn request_count_is_bounded() {
		assert_eq!(GenerateParams::default().count(), 1);
		let params = GenerateParams { count: Some(usize::MAX), ..Default::default() };
		assert_eq!(params.count(), MAX_COUNT);
	}

	#[actix_web::test]
	async fn generate_skips_corpus_headlines() {
		let app = actix_test::init_service(
			App::new()
				.app_data(shared(&["florida man arrested", "gator bites florida man"]))
				.configure(configure),
		)
			.await;

		let req = actix_test::TestRequest::get()
			.uri("/v1/generate?seed=3&min_words=1&count=2")
			.to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let body = actix_test::read_body(resp).await;
		let mut lines: Vec<String> = String::from_utf8(body.to_vec()).unwrap().lines().map(str::to_owned).collect();
		lines.sort();
		assert_eq!(lines, vec!["florida man".to_owned(), "gator bites florida man arrested".to_owned()]);
	}

	#[actix_web::test]
	async fn max_failures_bounds_the_search() {
		let app = actix_test::init_service(App::new().app_data(shared(&["florida man arrested"])).configure(configure)).await;

		let req = actix_test::TestRequest::get()
			.uri("/v1/generate?min_words=1&contains=gator&max_failures=3")
			.to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
		let body = actix_test::read_body(resp).await;
		assert!(String::from_utf8(body.to_vec()).unwrap().contains("after 4 attempts"));
	}

	#[actix_web::test]
	async fn add_and_clear_headlines() {
		let app = actix_test::init_service(App::new().app_data(shared(&[])).configure(configure)).await;

		let req = actix_test::TestRequest::get().uri("/v1/generate").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);

		for title in ["x", "Florida%20man%20bites%20dog", "Florida%20woman%20bites%20a%20dog"] {
			let req = actix_test::TestRequest::post().uri(&format!("/v1/headlines?title={title}")).to_request();
			assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{title}");
		}

		let req = actix_test::TestRequest::post().uri("/v1/headlines?title=Florida%20man%20bites%20a%20dog").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = actix_test::TestRequest::post().uri("/v1/headlines?title=florida%20man%20bites%20a%20dog").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

		let req = actix_test::TestRequest::get().uri("/v1/model").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = actix_test::TestRequest::delete().uri("/v1/headlines").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(actix_test::read_body(resp).await, web::Bytes::from_static(b"Removed 1 headlines"));

		let req = actix_test::TestRequest::get().uri("/v1/model").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);
	}

	#[actix_web::test]
	async fn files_and_corpus_info() {
		let dir = data_dir();
		let app = actix_test::init_service(App::new().app_data(shared_from(&dir)).configure(configure)).await;

		let req = actix_test::TestRequest::get().uri("/v1/files").to_request();
		let resp = actix_test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
		assert_eq!(actix_test::read_body(resp).await, web::Bytes::from_static(b"blank.txt\nlocal.txt\nuser.txt"));

		let req = actix_test::TestRequest::get().uri("/v1/corpus").to_request();
		let info: CorpusInfo = actix_test::call_and_read_body_json(&app, req).await;
		assert_eq!(
			info,
			CorpusInfo {
				headlines: 3,
				added: 0,
				order: 2,
				sources: vec!["blank.txt".to_owned(), "local.txt".to_owned(), "user.txt".to_owned()],
			}
		);
	}

	#[actix_web::test]
	async fn train_on_subset_with_new_order() {
		let dir = data_dir();
		let app = actix_test::init_service(App::new().app_data(shared_from(&dir)).configure(configure)).await;

		let req = actix_test::TestRequest::put().uri("/v1/train?order=1&files=local").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = actix_test::TestRequest::get().uri("/v1/corpus").to_request();
		let info: CorpusInfo = actix_test::call_and_read_body_json(&app, req).await;
		assert_eq!((info.headlines, info.order), (2, 1));
		assert_eq!(info.sources, vec!["local.txt".to_owned()]);
	}

	#[actix_web::test]
	async fn failed_training_keeps_the_model() {
		let dir = data_dir();
		let app = actix_test::init_service(App::new().app_data(shared_from(&dir)).configure(configure)).await;

		for uri in [
			"/v1/train?order=0",
			"/v1/train?files=,,",
			"/v1/train?files=blank",
			"/v1/train?files=../secret",
			"/v1/train?files=local,missing",
		] {
			let req = actix_test::TestRequest::put().uri(uri).to_request();
			assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{uri}");
		}

		let req = actix_test::TestRequest::get().uri("/v1/corpus").to_request();
		let info: CorpusInfo = actix_test::call_and_read_body_json(&app, req).await;
		assert_eq!((info.headlines, info.order), (3, 2));

		let req = actix_test::TestRequest::get().uri("/v1/generate?min_words=1&contains=none").to_request();
		assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

		let req = actix_test::TestRequest::get().uri("/v1/model").to_request();
		let body = actix_test::read_body(actix_test::call_service(&app, req).await).await;
		assert!(!String::from_utf8(body.to_vec()).unwrap().contains("secret"));
	}
}
