// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake judge backend for integration tests.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use judge_client::config::Config;
use judge_client::models::{Difficulty, LeaderboardEntry, Problem, ProblemId, UserSnapshot};
use judge_client::services::SessionCache;
use judge_client::error::AppError;
use judge_client::storage::{MemoryStore, SessionStore};
use judge_client::ClientContext;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Token the fake backend accepts.
#[allow(dead_code)]
pub const VALID_TOKEN: &str = "valid-token";

/// Scriptable backend state shared with the handlers.
pub struct FakeState {
    pub user: Mutex<UserSnapshot>,
    /// Statuses returned (in order) by `GET /api/user/{uid}` before normal service
    pub user_statuses: Mutex<VecDeque<u16>>,
    pub user_delay_ms: AtomicU64,
    pub user_hits: AtomicUsize,
    pub total_hits: AtomicUsize,
    pub submit_result: Mutex<serde_json::Value>,
    /// Every authenticated endpoint answers 401 while set
    pub reject_all: Mutex<bool>,
    pub last_delete_phrase: Mutex<Option<String>>,
    pub last_picture_field: Mutex<Option<String>>,
}

/// Running fake backend bound to an ephemeral port.
pub struct FakeBackend {
    pub url: String,
    pub state: Arc<FakeState>,
    _server: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
pub fn test_user() -> UserSnapshot {
    UserSnapshot::new("u1", "Ada", "ada@example.com")
}

#[allow(dead_code)]
pub fn test_problems() -> Vec<Problem> {
    vec![
        problem(1, "two-sum", "Two Sum", Difficulty::Easy),
        problem(2, "lru-cache", "LRU Cache", Difficulty::Medium),
        problem(3, "median-of-streams", "Median of Streams", Difficulty::Hard),
    ]
}

fn problem(id: u64, slug: &str, title: &str, difficulty: Difficulty) -> Problem {
    Problem {
        id: ProblemId::from(id),
        slug: slug.to_string(),
        title: title.to_string(),
        description: format!("Solve {}", title),
        difficulty,
        points: 10,
        boilerplate_code: None,
        hints: vec![],
    }
}

impl FakeBackend {
    #[allow(dead_code)]
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            user: Mutex::new(test_user()),
            user_statuses: Mutex::new(VecDeque::new()),
            user_delay_ms: AtomicU64::new(0),
            user_hits: AtomicUsize::new(0),
            total_hits: AtomicUsize::new(0),
            submit_result: Mutex::new(json!({
                "all_passed": true,
                "total_points": 10,
                "verdict": "Accepted",
                "results": [{"status": "Accepted", "passed": true}]
            })),
            reject_all: Mutex::new(false),
            last_delete_phrase: Mutex::new(None),
            last_picture_field: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/auth/verify", post(verify))
            .route("/api/oauth-config", get(oauth_config))
            .route("/api/user/{uid}", get(get_user))
            .route("/api/user/{uid}/update-name", put(update_name))
            .route("/api/user/{uid}/upload-picture", post(upload_picture))
            .route("/api/user/{uid}/export-data", get(export_data))
            .route("/api/user/{uid}/delete", delete(delete_account))
            .route("/api/profile/{uid}", get(public_profile))
            .route("/api/problems", get(problems))
            .route("/api/problem/{slug}", get(get_problem))
            .route("/api/problem/{slug}/run", post(run_code))
            .route("/api/problem/{slug}/submit", post(submit))
            .route("/api/leaderboard", get(leaderboard))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self {
            url: format!("http://{}", addr),
            state,
            _server: server,
        }
    }

    #[allow(dead_code)]
    pub fn config(&self) -> Config {
        Config::for_api(&self.url)
    }

    /// Client context over an in-memory store.
    #[allow(dead_code)]
    pub fn context(&self, store: Arc<MemoryStore>) -> ClientContext {
        ClientContext::new(self.config(), store).expect("client context")
    }

    #[allow(dead_code)]
    pub fn user_hits(&self) -> usize {
        self.state.user_hits.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn total_hits(&self) -> usize {
        self.state.total_hits.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn script_user_statuses(&self, statuses: &[u16]) {
        self.state.user_statuses.lock().extend(statuses.iter().copied());
    }
}

/// A config whose backend port is closed.
#[allow(dead_code)]
pub fn unreachable_config() -> Config {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    Config::for_api(format!("http://{}", addr))
}

/// Memory store already holding a session for [`test_user`].
#[allow(dead_code)]
pub fn seeded_store(token: &str, user: &UserSnapshot) -> Arc<MemoryStore> {
    let profile = serde_json::to_string(user).expect("encode user");
    Arc::new(MemoryStore::with_entries([
        (judge_client::storage::keys::TOKEN, token),
        (judge_client::storage::keys::PROFILE, profile.as_str()),
    ]))
}

/// Memory store with switchable faults: failing removals and slow reads.
#[allow(dead_code)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_removes: AtomicBool,
    pub read_delay_ms: AtomicU64,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn seeded(token: &str, user: &UserSnapshot) -> Arc<Self> {
        let profile = serde_json::to_string(user).expect("encode user");
        Arc::new(Self {
            inner: MemoryStore::with_entries([
                (judge_client::storage::keys::TOKEN, token),
                (judge_client::storage::keys::PROFILE, profile.as_str()),
            ]),
            fail_removes: AtomicBool::new(false),
            read_delay_ms: AtomicU64::new(0),
        })
    }
}

impl SessionStore for FlakyStore {
    fn get_all(&self, keys: &[&str]) -> judge_client::error::Result<Vec<Option<String>>> {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        self.inner.get_all(keys)
    }

    fn put_all(&self, entries: &[(&str, &str)]) -> judge_client::error::Result<()> {
        self.inner.put_all(entries)
    }

    fn remove_all(&self, keys: &[&str]) -> judge_client::error::Result<bool> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".to_string()));
        }
        self.inner.remove_all(keys)
    }
}

#[allow(dead_code)]
pub fn stored_profile(cache: &SessionCache) -> UserSnapshot {
    cache.profile().expect("cached profile")
}

// ─── Handlers ────────────────────────────────────────────────────

type Shared = State<Arc<FakeState>>;

fn authorize(state: &FakeState, headers: &HeaderMap) -> Result<(), Response> {
    state.total_hits.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if *state.reject_all.lock() || token != Some(VALID_TOKEN) {
        return Err((StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response());
    }
    Ok(())
}

async fn verify(State(state): Shared, Json(body): Json<serde_json::Value>) -> Response {
    state.total_hits.fetch_add(1, Ordering::SeqCst);
    if body["idToken"] != VALID_TOKEN {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid token"}))).into_response();
    }
    let user = state.user.lock().clone();
    Json(json!({ "user": user })).into_response()
}

async fn oauth_config(State(state): Shared) -> Response {
    state.total_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "hackclub": {
            "client_id": "hc-client",
            "redirect_uri": "http://localhost:5000/auth/hackclub/callback",
            "authorize_url": "https://auth.hackclub.com/oauth/authorize",
            "scopes": "openid profile email"
        },
        "github": null
    }))
    .into_response()
}

async fn get_user(State(state): Shared, headers: HeaderMap, Path(uid): Path<String>) -> Response {
    state.user_hits.fetch_add(1, Ordering::SeqCst);

    let delay = state.user_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let scripted = state.user_statuses.lock().pop_front();
    if let Some(code) = scripted {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if !status.is_success() {
            return (status, Json(json!({"error": "scripted failure"}))).into_response();
        }
    }

    let user = state.user.lock().clone();
    if user.uid != uid {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"}))).into_response();
    }
    Json(user).into_response()
}

async fn update_name(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    state.user.lock().name = name.clone();
    Json(json!({ "message": "Name updated", "name": name })).into_response()
}

async fn upload_picture(State(state): Shared, headers: HeaderMap, mut form: Multipart) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    while let Ok(Some(field)) = form.next_field().await {
        *state.last_picture_field.lock() = field.name().map(str::to_string);
    }
    Json(json!({ "picture_url": "https://cdn.example.com/u1.png" })).into_response()
}

async fn export_data(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let user = state.user.lock().clone();
    Json(json!({ "user": user, "submissions": [] })).into_response()
}

async fn delete_account(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    *state.last_delete_phrase.lock() = body["confirmation_phrase"].as_str().map(str::to_string);
    Json(json!({ "message": "Account deleted" })).into_response()
}

async fn public_profile(State(state): Shared, Path(uid): Path<String>) -> Response {
    state.total_hits.fetch_add(1, Ordering::SeqCst);
    let user = state.user.lock().clone();
    if user.uid != uid {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "nope"}))).into_response();
    }
    Json(json!({
        "uid": user.uid,
        "name": user.name,
        "points": user.points,
        "problems_solved": user.problems_solved,
        "solved_problems": user.solved_problems,
    }))
    .into_response()
}

async fn problems(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(test_problems()).into_response()
}

async fn get_problem(State(state): Shared, headers: HeaderMap, Path(slug): Path<String>) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    match test_problems().into_iter().find(|p| p.slug == slug) {
        Some(p) => Json(p).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Problem not found"}))).into_response(),
    }
}

async fn run_code(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "all_passed": true,
        "results": [{"status": "Accepted", "passed": true, "output": "[0,1]", "expected": [0, 1]}]
    }))
    .into_response()
}

async fn submit(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let result = state.submit_result.lock().clone();
    Json(result).into_response()
}

async fn leaderboard(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let user = state.user.lock().clone();
    let entries = vec![
        LeaderboardEntry {
            uid: "top".to_string(),
            name: "Grace".to_string(),
            picture: None,
            points: 500,
            problems_solved: 40,
        },
        LeaderboardEntry {
            uid: user.uid.clone(),
            name: user.name.clone(),
            picture: None,
            points: user.points,
            problems_solved: user.problems_solved,
        },
        LeaderboardEntry {
            uid: "new".to_string(),
            name: "Linus".to_string(),
            picture: None,
            points: 0,
            problems_solved: 0,
        },
        LeaderboardEntry {
            uid: "newer".to_string(),
            name: "Ken".to_string(),
            picture: None,
            points: 0,
            problems_solved: 0,
        },
    ];
    Json(entries).into_response()
}
