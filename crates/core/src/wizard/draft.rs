//! Draft wizard state machine

use std::sync::Arc;

use assessor_domain::{
    AssessorError, AvailableUser, CreateProjectRequest, DictionaryContent, DictionaryOption,
    DraftFile, ProjectDraft, Result, SimulationFile, TemplateAnalysis, WizardSection,
};
use tracing::{debug, info, instrument, warn};

use super::errors::{DraftValidationError, DraftValidationKind, WizardError};
use super::ports::ProjectSetupApi;
use super::submission::{self, SubmissionReceipt};
use crate::navigation::DraftStatus;
use crate::stores::ToastQueue;

/// Selectable options fetched when the wizard opens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardCatalog {
    pub dictionaries: Vec<DictionaryOption>,
    pub simulation_files: Vec<SimulationFile>,
    pub users: Vec<AvailableUser>,
}

/// In-memory project draft with free section navigation.
///
/// Sections are never gated; validation only runs on [`submit`](Self::submit).
pub struct DraftWizard {
    api: Arc<dyn ProjectSetupApi>,
    toasts: Arc<ToastQueue>,
    draft: ProjectDraft,
    /// Draft as seeded from server defaults; edits are measured against it
    baseline: ProjectDraft,
    section: WizardSection,
    /// Analysis of the template currently attached, keyed by its file name
    analysis: Option<(String, TemplateAnalysis)>,
    catalog: WizardCatalog,
    dictionary_preview: Option<DictionaryContent>,
    submitted: bool,
}

impl DraftWizard {
    pub fn new(api: Arc<dyn ProjectSetupApi>, toasts: Arc<ToastQueue>) -> Self {
        Self {
            api,
            toasts,
            draft: ProjectDraft::new(),
            baseline: ProjectDraft::new(),
            section: WizardSection::default(),
            analysis: None,
            catalog: WizardCatalog::default(),
            dictionary_preview: None,
            submitted: false,
        }
    }

    pub fn section(&self) -> WizardSection {
        self.section
    }

    pub fn go_to(&mut self, section: WizardSection) {
        debug!(%section, "wizard section changed");
        self.section = section;
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    /// Mutable access for plain field edits (name, description, prompts, toggles).
    pub fn draft_mut(&mut self) -> &mut ProjectDraft {
        &mut self.draft
    }

    pub fn catalog(&self) -> &WizardCatalog {
        &self.catalog
    }

    /// Attach a template; any previous analysis is discarded.
    pub fn set_template(&mut self, file: DraftFile) {
        self.analysis = None;
        self.draft.template = Some(file);
    }

    pub fn clear_template(&mut self) {
        self.analysis = None;
        self.draft.template = None;
    }

    /// Analysis of the attached template, if it has been analyzed.
    pub fn analysis(&self) -> Option<&TemplateAnalysis> {
        let (file_name, analysis) = self.analysis.as_ref()?;
        let template = self.draft.template.as_ref()?;
        (template.file_name == *file_name).then_some(analysis)
    }

    /// Run placeholder analysis on the attached template.
    ///
    /// # Errors
    /// `InvalidInput` without a template, otherwise the API error.
    #[instrument(skip(self))]
    pub async fn analyze_template(&mut self) -> Result<&TemplateAnalysis> {
        let template = self
            .draft
            .template
            .clone()
            .ok_or_else(|| AssessorError::InvalidInput("no template attached".into()))?;

        let report = self.api.analyze_template(&template).await?;
        let analysis = TemplateAnalysis::from_report(report);
        info!(
            file_name = %template.file_name,
            found = analysis.found_count(),
            duplicates = analysis.duplicates.len(),
            invalid = analysis.invalid.len(),
            "template analyzed"
        );
        if analysis.has_errors() {
            self.toasts.error(format!("Invalid placeholders: {}", analysis.invalid.join(", ")));
        } else if analysis.has_warnings() {
            self.toasts.warning(format!("Duplicate placeholders: {}", analysis.duplicates.join(", ")));
        }

        let (_, stored) = self.analysis.insert((template.file_name, analysis));
        Ok(&*stored)
    }

    /// Seed the prompt fields with the server defaults.
    ///
    /// Seeded prompts do not count as edits. Prompts the user already
    /// changed are kept.
    ///
    /// # Errors
    /// Propagates the API error; the prompts are left untouched.
    pub async fn load_default_prompts(&mut self) -> Result<()> {
        let prompts = self.api.default_prompts().await?;
        if self.draft.prompts == self.baseline.prompts {
            self.draft.prompts = prompts.clone();
        }
        self.baseline.prompts = prompts;
        Ok(())
    }

    /// Fetch dictionaries, simulation files and invitable users.
    ///
    /// # Errors
    /// The first failing request aborts; the previous catalog is kept.
    #[instrument(skip(self))]
    pub async fn load_catalog(&mut self) -> Result<&WizardCatalog> {
        let dictionaries = self.api.available_dictionaries().await?;
        let simulation_files = self.api.available_simulation_files().await?;
        let users = self.api.available_users().await?;
        self.catalog = WizardCatalog { dictionaries, simulation_files, users };
        Ok(&self.catalog)
    }

    /// Select a dictionary and clear the previous preview.
    pub fn select_dictionary(&mut self, dictionary_id: impl Into<String>) {
        self.draft.dictionary_id = Some(dictionary_id.into());
        self.dictionary_preview = None;
    }

    /// Fetch the content of the selected dictionary for preview.
    ///
    /// # Errors
    /// `InvalidInput` when no dictionary is selected, otherwise the API error.
    pub async fn preview_dictionary(&mut self) -> Result<&DictionaryContent> {
        let dictionary_id = self
            .draft
            .dictionary_id
            .clone()
            .ok_or_else(|| AssessorError::InvalidInput("no dictionary selected".into()))?;
        let content = self.api.dictionary_content(&dictionary_id).await?;
        Ok(&*self.dictionary_preview.insert(content))
    }

    pub fn dictionary_preview(&self) -> Option<&DictionaryContent> {
        self.dictionary_preview.as_ref()
    }

    /// Check the submission gate, in order: name, template, dictionary,
    /// template placeholders.
    ///
    /// # Errors
    /// The first failing rule, with the section to show.
    pub fn validate(&self) -> std::result::Result<(), DraftValidationError> {
        let fail = |section, kind| Err(DraftValidationError { section, kind });

        if self.draft.name.trim().is_empty() {
            return fail(self.section, DraftValidationKind::MissingName);
        }
        if self.draft.template.is_none() {
            return fail(WizardSection::Template, DraftValidationKind::MissingTemplate);
        }
        if !self.draft.dictionary_id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
            return fail(WizardSection::Dictionary, DraftValidationKind::MissingDictionary);
        }
        if self.analysis().is_some_and(TemplateAnalysis::has_errors) {
            return fail(WizardSection::Template, DraftValidationKind::InvalidPlaceholders);
        }
        Ok(())
    }

    /// Validate, then run the submission pipeline.
    ///
    /// A validation failure moves to the offending section and issues no
    /// request. A pipeline failure keeps the draft so the user can retry;
    /// a project already created on the server is not removed.
    ///
    /// # Errors
    /// See [`WizardError`].
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> std::result::Result<SubmissionReceipt, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }

        if let Err(err) = self.validate() {
            warn!(kind = ?err.kind, section = %err.section, "draft rejected");
            self.section = err.section;
            self.toasts.warning(err.message());
            return Err(err.into());
        }

        if self.draft.template.is_some() && self.analysis().is_none() {
            let invalid = match self.analyze_template().await {
                Ok(analysis) => analysis.has_errors(),
                Err(err) => {
                    warn!(error = %err, "template analysis failed before submission");
                    self.toasts.error(err.user_message());
                    return Err(WizardError::Analysis(err));
                }
            };
            if invalid {
                let err = DraftValidationError {
                    section: WizardSection::Template,
                    kind: DraftValidationKind::InvalidPlaceholders,
                };
                self.section = err.section;
                return Err(err.into());
            }
        }

        let (Some(template), Some(dictionary_id)) =
            (self.draft.template.as_ref(), self.draft.dictionary_id.clone())
        else {
            return Err(WizardError::Validation(DraftValidationError {
                section: WizardSection::Template,
                kind: DraftValidationKind::MissingTemplate,
            }));
        };
        let request = CreateProjectRequest::from_draft(&self.draft, dictionary_id);

        let outcome =
            submission::run(self.api.as_ref(), &request, template, &self.draft.knowledge_base).await;
        match outcome {
            Ok(receipt) => {
                self.submitted = true;
                self.toasts.success("Project created successfully");
                Ok(receipt)
            }
            Err(err) => {
                self.toasts.error(err.message.clone());
                Err(err.into())
            }
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether the user changed anything since the wizard opened.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.baseline
    }

    /// Input for the navigation blocker.
    pub fn status(&self) -> DraftStatus {
        DraftStatus { dirty: self.is_dirty(), submitted: self.submitted }
    }

    /// Discard the draft and start over from the seeded defaults.
    pub fn cancel(&mut self) {
        self.draft = self.baseline.clone();
        self.section = WizardSection::default();
        self.analysis = None;
        self.dictionary_preview = None;
        self.submitted = false;
    }
}
