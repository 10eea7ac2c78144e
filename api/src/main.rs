use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use lectio_lib::canon::{self, Translation};
use lectio_lib::{
    highlight_checked, AppState, Config, LectioError, PopularTopic, SearchHits, SearchSession, Segment,
    Topic, Verse, VerseRef, WordEntry,
};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

/// Live search sessions kept per client id
const MAX_CLIENT_SESSIONS: usize = 1024;

struct ApiState {
    app: AppState,
    sessions: Mutex<LruCache<String, Arc<SearchSession>>>,
}

impl ApiState {
    fn new(app: AppState) -> Self {
        let capacity = NonZeroUsize::new(MAX_CLIENT_SESSIONS).unwrap_or(NonZeroUsize::MIN);
        Self { app, sessions: Mutex::new(LruCache::new(capacity)) }
    }

    /// The search session of one client; its newer queries supersede older ones.
    fn session(&self, client: &str) -> Arc<SearchSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get(client) {
            return Arc::clone(session);
        }
        let session = Arc::new(self.app.session());
        sessions.put(client.to_string(), Arc::clone(&session));
        session
    }
}

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    limit: Option<usize>,
    offset: Option<usize>,
    /// Client id for search-as-you-type; a newer query from the same client
    /// makes the older one answer 409
    client: Option<String>,
}

#[derive(Deserialize)]
struct HighlightQuery {
    text: String,
    #[serde(default)]
    term: String,
}

#[derive(Deserialize)]
struct ChapterQuery {
    book: String,
    chapter: u32,
}

#[derive(Deserialize)]
struct VerseQuery {
    #[serde(rename = "ref")]
    reference: String,
}

#[derive(Deserialize)]
struct LookupQuery {
    word: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    translation: String,
    verses: usize,
}

#[derive(Serialize)]
struct ChapterResponse {
    book: String,
    chapter: u32,
    translation: String,
    has_previous: bool,
    has_next: bool,
    verses: Vec<Verse>,
}

#[derive(Serialize)]
struct BookInfo {
    name: String,
    chapters: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(e: LectioError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        e if e.is_boundary() => StatusCode::BAD_REQUEST,
        LectioError::NotFound(_) => StatusCode::NOT_FOUND,
        LectioError::Superseded => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// === Handlers ===

async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        translation: state.app.corpus.translation().to_string(),
        verses: state.app.corpus.len(),
    })
}

async fn search(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchHits> {
    let limit = params.limit.unwrap_or(50).min(100);
    let offset = params.offset.unwrap_or(0);

    let session = match params.client.as_deref().map(str::trim) {
        Some(client) if !client.is_empty() => state.session(client),
        _ => Arc::new(state.app.session()),
    };

    session
        .submit_page(params.q, limit, offset)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn highlight_text(Query(params): Query<HighlightQuery>) -> ApiResult<Vec<Segment>> {
    highlight_checked(&params.text, &params.term)
        .map(Json)
        .map_err(error_response)
}

async fn get_chapter(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ChapterQuery>,
) -> ApiResult<ChapterResponse> {
    let corpus = &state.app.corpus;
    let verses: Vec<Verse> = corpus.chapter(&params.book, params.chapter).into_iter().cloned().collect();
    if verses.is_empty() {
        return Err(error_response(LectioError::NotFound(format!(
            "{} {}",
            params.book.trim(),
            params.chapter
        ))));
    }
    let last = corpus.chapter_count(&params.book).unwrap_or(params.chapter);

    Ok(Json(ChapterResponse {
        book: verses[0].book.clone(),
        chapter: params.chapter,
        translation: corpus.translation().to_string(),
        has_previous: params.chapter > 1,
        has_next: params.chapter < last,
        verses,
    }))
}

async fn get_verse(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<VerseQuery>,
) -> ApiResult<Verse> {
    let reference: VerseRef = params.reference.parse().map_err(error_response)?;
    state
        .app
        .corpus
        .get(&reference)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(LectioError::NotFound(reference.to_string())))
}

async fn get_books(State(state): State<Arc<ApiState>>) -> Json<Vec<BookInfo>> {
    let corpus = &state.app.corpus;
    let books = corpus
        .books()
        .into_iter()
        .map(|name| BookInfo {
            chapters: corpus.chapter_count(&name).unwrap_or(0),
            name,
        })
        .collect();
    Json(books)
}

async fn get_translations() -> Json<Vec<Translation>> {
    Json(canon::TRANSLATIONS.to_vec())
}

async fn get_popular_topics(State(state): State<Arc<ApiState>>) -> Json<Vec<PopularTopic>> {
    Json(state.app.topics.popular().to_vec())
}

async fn get_topic(State(state): State<Arc<ApiState>>, Path(name): Path<String>) -> ApiResult<Topic> {
    state
        .app
        .topics
        .lookup(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(LectioError::NotFound(format!("topic '{}'", name.trim()))))
}

async fn lookup_word(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<LookupQuery>,
) -> ApiResult<WordEntry> {
    state
        .app
        .lexicon
        .lookup(&params.word)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(LectioError::NotFound(format!("word '{}'", params.word.trim()))))
}

fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/highlight", get(highlight_text))
        .route("/chapter", get(get_chapter))
        .route("/verse", get(get_verse))
        .route("/books", get(get_books))
        .route("/translations", get(get_translations))
        .route("/topics", get(get_popular_topics))
        .route("/topics/:name", get(get_topic))
        .route("/lookup", get(lookup_word))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let addr = config.addr.clone();
    let app = AppState::new(config)?;
    tracing::info!(
        translation = app.corpus.translation(),
        verses = app.corpus.len(),
        "corpus ready"
    );

    let state = Arc::new(ApiState::new(app));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let dir = std::env::temp_dir().join("lectio-api-tests-empty");
        let config = Config { data_dir: dir, ..Config::default() };
        router(Arc::new(ApiState::new(AppState::new(config).unwrap())))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_corpus() {
        let (status, body) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["translation"], "NIV");
    }

    #[tokio::test]
    async fn search_returns_highlighted_hits() {
        let (status, body) = get_json(app(), "/search?q=beginning").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["results"][0]["reference"], "Genesis 1:1");
        assert_eq!(body["results"][0]["segments"][1]["text"], "beginning");
        assert_eq!(body["results"][0]["segments"][1]["is_match"], true);
    }

    #[tokio::test]
    async fn search_blank_and_unknown_are_empty() {
        let (status, body) = get_json(app(), "/search?q=%20%20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let (status, body) = get_json(app(), "/search?q=Xyzzy&client=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn search_limit_is_capped() {
        let (_, body) = get_json(app(), "/search?q=the&limit=1&offset=1").await;
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert!(body["total"].as_u64().unwrap() > 1);
    }

    #[tokio::test]
    async fn overlong_query_is_bad_request() {
        let uri = format!("/search?q={}", "a".repeat(300));
        let (status, body) = get_json(app(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
    }

    #[tokio::test]
    async fn highlight_escapes_pattern_syntax() {
        let (status, body) = get_json(app(), "/highlight?text=a%20(b)%20c&term=(b)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[1]["text"], "(b)");
        assert_eq!(body[1]["is_match"], true);

        let (_, body) = get_json(app(), "/highlight?text=plain").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["is_match"], false);
    }

    #[tokio::test]
    async fn highlight_rejects_oversized_input() {
        let uri = format!("/highlight?text={}&term={}", "a".repeat(600), "a".repeat(300));
        let (status, body) = get_json(app(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query: term"));

        let uri = format!("/highlight?text={}&term=a", "a".repeat(9000));
        let (status, _) = get_json(app(), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chapter_and_verse() {
        let (status, body) = get_json(app(), "/chapter?book=genesis&chapter=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verses"].as_array().unwrap().len(), 10);
        assert_eq!(body["has_previous"], false);
        assert_eq!(body["has_next"], true);

        let (status, _) = get_json(app(), "/chapter?book=Exodus&chapter=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get_json(app(), "/verse?ref=Psalm%2023:1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["book"], "Psalms");

        let (status, _) = get_json(app(), "/verse?ref=Psalm").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn topics_and_lookup() {
        let (_, body) = get_json(app(), "/topics").await;
        assert_eq!(body[0]["name"], "Faith");

        let (status, body) = get_json(app(), "/topics/faith").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verses"].as_array().unwrap().len(), 4);

        let (status, _) = get_json(app(), "/topics/Astrology").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get_json(app(), "/lookup?word=Love").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["original_languages"][0]["strongs"], "G26");

        let (status, _) = get_json(app(), "/lookup?word=covenant").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn books_and_translations() {
        let (_, body) = get_json(app(), "/books").await;
        assert_eq!(body[0]["name"], "Genesis");
        assert_eq!(body[0]["chapters"], 2);

        let (_, body) = get_json(app(), "/translations").await;
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn client_session_is_reused() {
        let state = Arc::new(ApiState::new(
            AppState::new(Config {
                data_dir: std::env::temp_dir().join("lectio-api-tests-empty"),
                ..Config::default()
            })
            .unwrap(),
        ));
        let a = state.session("client-1");
        let b = state.session("client-1");
        let c = state.session("client-2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let stale = a.submit("light");
        let fresh = b.submit("darkness");
        assert!(matches!(stale.await, Err(LectioError::Superseded)));
        assert!(fresh.await.unwrap().total > 0);
    }
}
