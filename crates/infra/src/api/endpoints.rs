//! Typed backend endpoints
//!
//! Request/response schemas for every REST call the client makes, and the
//! port implementations the core services depend on.

use std::sync::Arc;

use assessor_core::{AuthApi, ProjectSetupApi, UploadKind};
use assessor_domain::{
    AvailableUser, CreateProjectRequest, CreatedProject, DictionaryContent, DictionaryOption,
    DraftFile, PromptSet, Result, SimulationFile, TemplateAnalysisReport,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::client::ApiClient;
use super::errors::ApiError;

/// Multipart field carrying the file bytes on `/projects/:id/upload`
pub const UPLOAD_FILE_FIELD: &str = "file";
/// Multipart field telling the backend what the uploaded file is for
pub const UPLOAD_KIND_FIELD: &str = "fileType";
/// Multipart field carrying the document on `/projects/analyze-template`
pub const TEMPLATE_FIELD: &str = "template";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
}

#[derive(Debug, Serialize)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

/// Collections arrive either bare or wrapped in a named field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Collection<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "projects",
            alias = "reports",
            alias = "dictionaries",
            alias = "files",
            alias = "users",
            alias = "data"
        )]
        items: Vec<T>,
    },
}

impl<T> Collection<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

/// Prompt defaults arrive bare or under `prompts`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PromptsPayload {
    Wrapped { prompts: PromptSet },
    Bare(PromptSet),
}

/// Creation responses arrive bare or under `project`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedPayload {
    Wrapped { project: CreatedProject },
    Bare(CreatedProject),
}

pub(crate) fn file_part(file: &DraftFile) -> std::result::Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)
        .map_err(|e| ApiError::Config(format!("invalid MIME type {:?}: {e}", file.mime_type)))
}

/// Port implementations over the authenticated [`ApiClient`]
#[derive(Clone)]
pub struct AssessorApi {
    client: Arc<ApiClient>,
}

impl AssessorApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    async fn collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let rows: Collection<T> = self.client.get(path).await?;
        Ok(rows.into_vec())
    }
}

#[async_trait]
impl AuthApi for AssessorApi {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response: LoginResponse =
            self.client.post("/auth/login", &LoginRequest { email, password }).await?;
        Ok(response.token)
    }

    #[instrument(skip(self))]
    async fn request_password_reset(&self, email: &str) -> Result<()> {
        let _: serde_json::Value =
            self.client.post("/auth/reset-password", &PasswordResetRequest { email }).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectSetupApi for AssessorApi {
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<CreatedProject> {
        let created = match self.client.post::<_, CreatedPayload>("/projects", request).await? {
            CreatedPayload::Wrapped { project } | CreatedPayload::Bare(project) => project,
        };
        info!(project_id = %created.id, "project created");
        Ok(created)
    }

    async fn upload_project_file(
        &self,
        project_id: &str,
        file: &DraftFile,
        kind: UploadKind,
    ) -> Result<()> {
        let form = Form::new()
            .text(UPLOAD_KIND_FIELD, kind.as_str())
            .part(UPLOAD_FILE_FIELD, file_part(file)?);
        let path = format!("/projects/{}/upload", urlencoding::encode(project_id));
        let _: serde_json::Value = self.client.post_multipart(&path, form).await?;
        info!(project_id, file_name = %file.file_name, kind = kind.as_str(), "project file uploaded");
        Ok(())
    }

    async fn initialize_context(&self, project_id: &str) -> Result<()> {
        let path = format!("/projects/{}/initialize-context", urlencoding::encode(project_id));
        let _: serde_json::Value = self.client.post_empty(&path).await?;
        Ok(())
    }

    async fn analyze_template(&self, file: &DraftFile) -> Result<TemplateAnalysisReport> {
        let form = Form::new().part(TEMPLATE_FIELD, file_part(file)?);
        Ok(self.client.post_multipart("/projects/analyze-template", form).await?)
    }

    async fn default_prompts(&self) -> Result<PromptSet> {
        match self.client.get::<PromptsPayload>("/projects/defaults/prompts").await? {
            PromptsPayload::Wrapped { prompts } | PromptsPayload::Bare(prompts) => Ok(prompts),
        }
    }

    async fn available_dictionaries(&self) -> Result<Vec<DictionaryOption>> {
        self.collection("/projects/available-dictionaries").await
    }

    async fn dictionary_content(&self, dictionary_id: &str) -> Result<DictionaryContent> {
        let path = format!("/projects/dictionary/{}/content", urlencoding::encode(dictionary_id));
        let mut content: DictionaryContent = self.client.get(&path).await?;
        if content.id.is_empty() {
            content.id = dictionary_id.to_string();
        }
        Ok(content)
    }

    async fn available_simulation_files(&self) -> Result<Vec<SimulationFile>> {
        self.collection("/projects/available-simulation-files").await
    }

    async fn available_users(&self) -> Result<Vec<AvailableUser>> {
        self.collection("/projects/available-users").await
    }
}
