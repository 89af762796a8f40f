//! reqwest-backed [`TrackingApi`]

use crate::client::{endpoints, ApiConfig, TrackingApi};
use crate::error::ApiError;
use crate::session::SessionContext;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use suivi_model::{
    decode_batch, Batch, CompletionEvent, Matricule, Module, ModuleId, NewUser, PhaseCompletion,
    PhaseDraft, PhaseId, PhaseRecord, Project, ProjectRef, TaskProgress, User,
};

const NO_BODY: Option<&()> = None;

#[derive(Serialize)]
struct LoginRequest<'a> {
    matricule: &'a str,
    mot_de_passe: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    matricule: Option<Matricule>,
}

/// HTTP client bound to one signed-in session
#[derive(Debug, Clone)]
pub struct HttpTrackingApi {
    client: reqwest::Client,
    base: Url,
    session: SessionContext,
}

fn build_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|source| ApiError::Transport {
            endpoint: config.base_url.clone(),
            source,
        })
}

fn parse_base(config: &ApiConfig) -> Result<Url, ApiError> {
    let base = Url::parse(&config.base_url)
        .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
    if base.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
    }
    Ok(base)
}

fn join(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn check(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Json {
        endpoint: endpoint.to_string(),
        source,
    })
}

impl HttpTrackingApi {
    /// Client for an existing session
    pub fn new(config: &ApiConfig, session: SessionContext) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(config)?,
            base: parse_base(config)?,
            session,
        })
    }

    /// Exchange credentials for a session
    pub async fn login(
        config: &ApiConfig,
        matricule: &str,
        password: &str,
    ) -> Result<SessionContext, ApiError> {
        let client = build_client(config)?;
        let url = join(&parse_base(config)?, endpoints::LOGIN);
        let endpoint = url.path().to_string();
        tracing::info!(matricule, "signing in");

        let response = client
            .post(url)
            .json(&LoginRequest {
                matricule,
                mot_de_passe: password,
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        let body: LoginResponse = read_json(&endpoint, check(&endpoint, response).await?).await?;

        let session = match body.matricule {
            Some(m) => SessionContext::with_matricule(body.token, m),
            None => SessionContext::from_token(body.token)?,
        };
        tracing::debug!(matricule = %session.matricule(), "signed in");
        Ok(session)
    }

    /// Session the client acts for
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = join(&self.base, segments);
        let endpoint = url.path().to_string();
        tracing::debug!(%method, endpoint = %endpoint, "api request");

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(self.session.token());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| {
            tracing::error!(endpoint = %endpoint, error = %source, "api request failed");
            ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            }
        })?;
        check(&endpoint, response).await
    }

    async fn listing<T: DeserializeOwned>(
        &self,
        what: &'static str,
        segments: &[&str],
    ) -> Result<Batch<T>, ApiError> {
        let response = self.send(Method::GET, segments, NO_BODY).await?;
        let endpoint = response.url().path().to_string();
        let body: serde_json::Value = read_json(&endpoint, response).await?;
        let batch = decode_batch(what, body)?;
        tracing::debug!(
            listing = what,
            items = batch.items.len(),
            skipped = batch.skipped,
            "fetched listing"
        );
        Ok(batch)
    }

    async fn write<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.send(method, segments, body).await.map(drop)
    }
}

#[async_trait]
impl TrackingApi for HttpTrackingApi {
    async fn list_phases(&self) -> Result<Batch<PhaseRecord>, ApiError> {
        self.listing("phases", endpoints::PHASES).await
    }

    async fn list_task_progress(&self) -> Result<Batch<TaskProgress>, ApiError> {
        self.listing("task progress", endpoints::TASK_PROGRESS).await
    }

    async fn list_completion_events(&self) -> Result<Batch<CompletionEvent>, ApiError> {
        self.listing("completion events", endpoints::COMPLETION_EVENTS)
            .await
    }

    async fn list_users(&self) -> Result<Batch<User>, ApiError> {
        self.listing("users", endpoints::USERS).await
    }

    async fn list_modules(&self) -> Result<Batch<Module>, ApiError> {
        self.listing("modules", endpoints::MODULES).await
    }

    async fn list_projects(&self) -> Result<Batch<Project>, ApiError> {
        self.listing("projects", endpoints::PROJECTS).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.write(Method::POST, endpoints::USERS, Some(user)).await
    }

    async fn update_user(&self, user: &User) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            &["utilisateurs", user.matricule.as_str()],
            Some(user),
        )
        .await
    }

    async fn delete_user(&self, matricule: &Matricule) -> Result<(), ApiError> {
        self.write(Method::DELETE, &["utilisateurs", matricule.as_str()], NO_BODY)
            .await
    }

    async fn create_module(&self, module: &Module) -> Result<(), ApiError> {
        self.write(Method::POST, endpoints::MODULES, Some(module)).await
    }

    async fn update_module(&self, module: &Module) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            &["modules", module.id_module.as_str()],
            Some(module),
        )
        .await
    }

    async fn delete_module(&self, id: &ModuleId) -> Result<(), ApiError> {
        self.write(Method::DELETE, &["modules", id.as_str()], NO_BODY)
            .await
    }

    async fn create_project(&self, project: &Project) -> Result<(), ApiError> {
        self.write(Method::POST, endpoints::PROJECTS, Some(project))
            .await
    }

    async fn update_project(&self, project: &Project) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            &["projets", project.ref_projet.as_str()],
            Some(project),
        )
        .await
    }

    async fn delete_project(&self, project: &ProjectRef) -> Result<(), ApiError> {
        self.write(Method::DELETE, &["projets", project.as_str()], NO_BODY)
            .await
    }

    async fn add_phase(&self, project: &ProjectRef, phase: &PhaseDraft) -> Result<(), ApiError> {
        self.write(
            Method::POST,
            &["projets", project.as_str(), "phases"],
            Some(phase),
        )
        .await
    }

    async fn update_phase(
        &self,
        project: &ProjectRef,
        phase: &PhaseDraft,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            &["projets", project.as_str(), "phases", phase.id_phase.as_str()],
            Some(phase),
        )
        .await
    }

    async fn delete_phase(&self, project: &ProjectRef, phase: &PhaseId) -> Result<(), ApiError> {
        self.write(
            Method::DELETE,
            &["projets", project.as_str(), "phases", phase.as_str()],
            NO_BODY,
        )
        .await
    }

    async fn set_phase_completion(
        &self,
        project: &ProjectRef,
        phase: &PhaseId,
        completion: PhaseCompletion,
    ) -> Result<(), ApiError> {
        tracing::info!(
            ref_projet = %project,
            id_phase = %phase,
            completed = completion.date_fin_reelle.is_some(),
            "updating phase completion"
        );
        self.write(
            Method::PUT,
            &[
                "projets",
                project.as_str(),
                "phases",
                phase.as_str(),
                endpoints::ACTUAL_END,
            ],
            Some(&completion),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_encodes_segments_and_keeps_base_path() {
        let base = Url::parse("https://suivi.example.org/api/").unwrap();
        let url = join(&base, &["projets", "P 1/2", "phases"]);
        assert_eq!(url.as_str(), "https://suivi.example.org/api/projets/P%201%2F2/phases");
    }

    #[test]
    fn join_without_trailing_slash() {
        let base = Url::parse("http://localhost:3000/api").unwrap();
        assert_eq!(join(&base, endpoints::PHASES).path(), "/api/projets/phases");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let config = ApiConfig::new().with_base_url("mailto:someone@example.org");
        assert!(matches!(parse_base(&config), Err(ApiError::InvalidBaseUrl(_))));
        let config = ApiConfig::new().with_base_url("not a url");
        assert!(matches!(parse_base(&config), Err(ApiError::InvalidBaseUrl(_))));
    }
}
