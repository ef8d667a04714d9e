//! Port interface for the project setup endpoints

use assessor_domain::{
    AvailableUser, CreateProjectRequest, CreatedProject, DictionaryContent, DictionaryOption,
    DraftFile, PromptSet, Result, SimulationFile, TemplateAnalysisReport,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What an uploaded project file is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Template,
    KnowledgeBase,
}

impl UploadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::KnowledgeBase => "knowledge_base",
        }
    }
}

/// Backend operations the wizard depends on
#[async_trait]
pub trait ProjectSetupApi: Send + Sync {
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<CreatedProject>;

    /// Attach a file to an existing project (multipart)
    async fn upload_project_file(
        &self,
        project_id: &str,
        file: &DraftFile,
        kind: UploadKind,
    ) -> Result<()>;

    /// Build the retrieval context from uploaded knowledge-base files
    async fn initialize_context(&self, project_id: &str) -> Result<()>;

    /// Extract placeholder tokens from a template document (multipart)
    async fn analyze_template(&self, file: &DraftFile) -> Result<TemplateAnalysisReport>;

    async fn default_prompts(&self) -> Result<PromptSet>;

    async fn available_dictionaries(&self) -> Result<Vec<DictionaryOption>>;

    async fn dictionary_content(&self, dictionary_id: &str) -> Result<DictionaryContent>;

    async fn available_simulation_files(&self) -> Result<Vec<SimulationFile>>;

    async fn available_users(&self) -> Result<Vec<AvailableUser>>;
}
