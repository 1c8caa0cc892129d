//! Request routing: path and method to core operation, error kind to status.

use crate::api::{status_for, ErrorBody, FolderBody, FolderDeleted, SessionBody};
use crate::session;
use bytes::Bytes;
use hoax_core::game::{AnswerEvaluator, RoundGenerator, StatsAggregator, Submission};
use hoax_core::{FolderFilter, GameError, NewStory, SessionId, Store};
use hyper::{Method, StatusCode};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Transport-neutral request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Bytes,
    pub cookie: Option<String>,
}

impl ApiRequest {
    /// Build from a method and a `path?query` target.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method,
            path: path.to_string(),
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            body: Bytes::new(),
            cookie: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn folder_filter(&self) -> Result<FolderFilter, GameError> {
        FolderFilter::parse(self.param("folder"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl ApiResponse {
    fn ok<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, Reject> {
        let body = serde_json::to_value(value)
            .map_err(|e| GameError::Storage(format!("failed to encode response: {e}")))?;
        Ok(Self {
            status,
            body,
            set_cookie: None,
        })
    }

    fn error(status: StatusCode, error: &str, message: String) -> Self {
        Self {
            status,
            body: json!({ "error": error, "message": message }),
            set_cookie: None,
        }
    }
}

enum Reject {
    Game(GameError),
    BadJson(String),
    NoRoute,
    Method,
}

impl From<GameError> for Reject {
    fn from(e: GameError) -> Self {
        Reject::Game(e)
    }
}

/// Maps requests onto a [`Store`]. Cheap to clone.
#[derive(Clone)]
pub struct Router {
    store: Store,
    cookie_name: String,
    round_ttl: Option<Duration>,
}

impl Router {
    pub fn new(store: Store, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
            round_ttl: None,
        }
    }

    /// Expire unanswered rounds older than `ttl` whenever a round is issued.
    pub fn with_round_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.round_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn handle(&self, req: &ApiRequest) -> ApiResponse {
        match self.route(req) {
            Ok(resp) => resp,
            Err(Reject::Game(e)) => {
                let status = status_for(e.kind());
                if status.is_server_error() {
                    tracing::warn!(path = %req.path, error = %e, "request failed");
                } else {
                    tracing::debug!(path = %req.path, error = %e, "request rejected");
                }
                let body = ErrorBody::from(&e);
                ApiResponse::error(status, &body.error, body.message)
            }
            Err(Reject::BadJson(msg)) => {
                ApiResponse::error(StatusCode::BAD_REQUEST, "validation", msg)
            }
            Err(Reject::NoRoute) => ApiResponse::error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no route for {}", req.path),
            ),
            Err(Reject::Method) => ApiResponse::error(
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                format!("{} not allowed on {}", req.method, req.path),
            ),
        }
    }

    fn route(&self, req: &ApiRequest) -> Result<ApiResponse, Reject> {
        let decoded: Vec<String> = req
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
        let m = &req.method;

        match segments.as_slice() {
            ["healthz"] => match *m {
                Method::GET => ApiResponse::ok(StatusCode::OK, &json!({ "status": "ok" })),
                _ => Err(Reject::Method),
            },
            ["api", "session"] => match *m {
                Method::GET => self.session(req),
                _ => Err(Reject::Method),
            },
            ["api", "round"] => match *m {
                Method::GET => {
                    let view = RoundGenerator::new(&self.store)
                        .with_round_ttl(self.round_ttl)
                        .generate(req.folder_filter()?)?;
                    ApiResponse::ok(StatusCode::OK, &view)
                }
                _ => Err(Reject::Method),
            },
            ["api", "submit"] => match *m {
                Method::POST => self.submit(req),
                _ => Err(Reject::Method),
            },
            ["api", "stats", "session", id] => match *m {
                Method::GET => {
                    let session = SessionId::new(*id)?;
                    let stats = StatsAggregator::new(&self.store)
                        .session_stats(&session, req.folder_filter()?)?;
                    ApiResponse::ok(StatusCode::OK, &stats)
                }
                _ => Err(Reject::Method),
            },
            ["api", "stats", "stories"] => match *m {
                Method::GET => {
                    let stats =
                        StatsAggregator::new(&self.store).story_stats(req.folder_filter()?)?;
                    ApiResponse::ok(StatusCode::OK, &stats)
                }
                _ => Err(Reject::Method),
            },
            ["api", "stories"] => match *m {
                Method::GET => {
                    let stories = self.store.list_stories(req.folder_filter()?)?;
                    ApiResponse::ok(StatusCode::OK, &stories)
                }
                Method::POST => {
                    let story = self.store.create_story(parse_body::<NewStory>(req)?)?;
                    ApiResponse::ok(StatusCode::CREATED, &story)
                }
                _ => Err(Reject::Method),
            },
            ["api", "stories", id] => match *m {
                Method::GET => {
                    let story = self.store.get_story(id)?.ok_or_else(|| {
                        GameError::StoryNotFound {
                            story_id: id.to_string(),
                        }
                    })?;
                    ApiResponse::ok(StatusCode::OK, &story)
                }
                Method::PUT => {
                    let story = self.store.update_story(id, parse_body::<NewStory>(req)?)?;
                    ApiResponse::ok(StatusCode::OK, &story)
                }
                Method::DELETE => {
                    let cascade = flag(req.param("cascade"), "cascade")?;
                    let deleted = self.store.delete_story(id, cascade)?;
                    ApiResponse::ok(StatusCode::OK, &deleted)
                }
                _ => Err(Reject::Method),
            },
            ["api", "folders"] => match *m {
                Method::GET => {
                    let folders = match req.param("search") {
                        Some(q) => self.store.search_folders(q)?,
                        None => self.store.list_folders()?,
                    };
                    ApiResponse::ok(StatusCode::OK, &folders)
                }
                Method::POST => {
                    let body = parse_body::<FolderBody>(req)?;
                    let folder = self.store.create_folder(&body.name)?;
                    ApiResponse::ok(StatusCode::CREATED, &folder)
                }
                _ => Err(Reject::Method),
            },
            ["api", "folders", id] => match *m {
                Method::GET => {
                    let folder_id = folder_id(id)?;
                    let folder = self
                        .store
                        .get_folder(folder_id)?
                        .ok_or(GameError::FolderNotFound { folder_id })?;
                    ApiResponse::ok(StatusCode::OK, &folder)
                }
                Method::PUT => {
                    let folder_id = folder_id(id)?;
                    let body = parse_body::<FolderBody>(req)?;
                    let folder = self.store.rename_folder(folder_id, &body.name)?;
                    ApiResponse::ok(StatusCode::OK, &folder)
                }
                Method::DELETE => {
                    let folder_id = folder_id(id)?;
                    let stories_moved = self.store.delete_folder(folder_id)?;
                    ApiResponse::ok(
                        StatusCode::OK,
                        &FolderDeleted {
                            folder_id,
                            stories_moved,
                        },
                    )
                }
                _ => Err(Reject::Method),
            },
            _ => Err(Reject::NoRoute),
        }
    }

    /// Echo the cookie session, or mint one and set the cookie.
    fn session(&self, req: &ApiRequest) -> Result<ApiResponse, Reject> {
        let existing = session::read_cookie(req.cookie.as_deref(), &self.cookie_name);
        let minted = existing.is_none();
        let session = existing.unwrap_or_else(SessionId::mint);
        let mut resp = ApiResponse::ok(
            StatusCode::OK,
            &SessionBody {
                session_id: session.to_string(),
            },
        )?;
        if minted {
            tracing::debug!(session_id = %session, "minted session");
            resp.set_cookie = Some(session::set_cookie(&self.cookie_name, &session));
        }
        Ok(resp)
    }

    fn submit(&self, req: &ApiRequest) -> Result<ApiResponse, Reject> {
        let mut sub = parse_body::<Submission>(req)?;
        let body_session = sub.session_id.as_deref().map(str::trim).unwrap_or_default();
        if body_session.is_empty() {
            sub.session_id = session::read_cookie(req.cookie.as_deref(), &self.cookie_name)
                .map(|s| s.to_string());
        }
        let outcome = AnswerEvaluator::new(&self.store).evaluate(&sub)?;
        ApiResponse::ok(StatusCode::OK, &outcome)
    }
}

fn parse_body<T: DeserializeOwned>(req: &ApiRequest) -> Result<T, Reject> {
    serde_json::from_slice(&req.body).map_err(|e| Reject::BadJson(format!("invalid JSON: {e}")))
}

fn folder_id(raw: &str) -> Result<i64, GameError> {
    raw.parse::<i64>()
        .map_err(|_| GameError::invalid_field("folder_id", format!("{raw:?} is not a number")))
}

fn flag(raw: Option<&str>, name: &str) -> Result<bool, GameError> {
    match raw.map(str::trim) {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(GameError::invalid_field(
            name,
            format!("{other:?} is not a boolean"),
        )),
    }
}
