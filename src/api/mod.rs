//! HTTP client for the users REST resource.
//!
//! Wraps the five calls the TUI needs (list, get, create, update, delete).
//! Every call is a fresh round trip; failures are rewrapped into a
//! [`RequestError`] naming the operation and, for per-record calls, the id.
//!
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Context, RequestError, RequestResult};

/// Base resource used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/users";

/// A user record as stored by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body of a create request: the editable fields of a [`User`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Body of an update request. Only the fields that are set are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&User> for UserPayload {
    fn from(u: &User) -> Self {
        Self {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
        }
    }
}

impl From<UserPayload> for UserPatch {
    fn from(p: UserPayload) -> Self {
        Self {
            first_name: Some(p.first_name),
            last_name: Some(p.last_name),
            email: Some(p.email),
            phone: Some(p.phone),
        }
    }
}

/// Immutable handle to the users resource. Cheap to clone.
#[derive(Clone, Debug)]
pub struct UserClient {
    http: reqwest::Client,
    base_url: String,
}

impl UserClient {
    /// Build a client for `base_url` (e.g. `http://host:8080/api/users`).
    pub fn new(base_url: &str) -> RequestResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .with_ctx(|| "Failed to build HTTP client".to_string())?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    pub async fn list_users(&self) -> RequestResult<Vec<User>> {
        debug!(url = %self.base_url, "GET users");
        let res = async {
            let resp = self.http.get(&self.base_url).send().await?.error_for_status()?;
            resp.json::<Vec<User>>().await
        }
        .await
        .with_ctx(|| "Failed to get all users".to_string());
        log_failure(res)
    }

    pub async fn get_user(&self, id: &str) -> RequestResult<User> {
        let url = self.record_url(id);
        debug!(%url, "GET user");
        let res = async {
            let resp = self.http.get(&url).send().await?.error_for_status()?;
            resp.json::<User>().await
        }
        .await
        .with_ctx(|| format!("Failed to get user with id {id}"));
        log_failure(res)
    }

    pub async fn create_user(&self, payload: &UserPayload) -> RequestResult<User> {
        debug!(url = %self.base_url, "POST user");
        let res = async {
            let resp = self
                .http
                .post(&self.base_url)
                .json(payload)
                .send()
                .await?
                .error_for_status()?;
            resp.json::<User>().await
        }
        .await
        .with_ctx(|| "Failed to create user".to_string());
        log_failure(res)
    }

    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> RequestResult<User> {
        let url = self.record_url(id);
        debug!(%url, "PUT user");
        let res = async {
            let resp = self
                .http
                .put(&url)
                .json(patch)
                .send()
                .await?
                .error_for_status()?;
            resp.json::<User>().await
        }
        .await
        .with_ctx(|| format!("Failed to update user with id {id}"));
        log_failure(res)
    }

    pub async fn delete_user(&self, id: &str) -> RequestResult<()> {
        let url = self.record_url(id);
        debug!(%url, "DELETE user");
        let res = async {
            self.http.delete(&url).send().await?.error_for_status()?;
            Ok::<(), reqwest::Error>(())
        }
        .await
        .with_ctx(|| format!("Failed to delete user with id {id}"));
        log_failure(res)
    }
}

fn log_failure<T>(res: Result<T, RequestError>) -> RequestResult<T> {
    if let Err(e) = &res {
        error!(error = %e, "users API request failed");
    }
    res
}
