//! Project draft model used by the creation wizard
//!
//! The draft is an uncommitted aggregate. Required for submission: a name,
//! a template file and a dictionary. Everything else is optional.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::serde_helpers::id_string;
use crate::errors::{AssessorError, Result};
use crate::impl_domain_status_conversions;

/// Wizard sections, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardSection {
    #[default]
    Template,
    KnowledgeBase,
    Dictionary,
    SimulationMethods,
    Prompts,
    Users,
}

impl WizardSection {
    pub const ALL: [Self; 6] = [
        Self::Template,
        Self::KnowledgeBase,
        Self::Dictionary,
        Self::SimulationMethods,
        Self::Prompts,
        Self::Users,
    ];
}

impl_domain_status_conversions!(WizardSection {
    Template => "template",
    KnowledgeBase => "knowledge_base",
    Dictionary => "dictionary",
    SimulationMethods => "simulation_methods",
    Prompts => "prompts",
    Users => "users",
});

/// A file picked by the user, held in memory until submission
#[derive(Clone, PartialEq, Eq)]
pub struct DraftFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DraftFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime_type: mime_type.into(), bytes }
    }
}

impl fmt::Debug for DraftFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Prompt text fields, seeded from the server defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptSet {
    pub system_prompt: String,
    pub evaluation_prompt: String,
    pub competency_prompt: String,
    pub executive_summary_prompt: String,
}

/// In-memory project draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub template: Option<DraftFile>,
    pub knowledge_base: Vec<DraftFile>,
    pub dictionary_id: Option<String>,
    pub simulation_file_ids: Vec<String>,
    pub invited_user_ids: Vec<String>,
    pub prompts: PromptSet,
    competency_analysis: bool,
    executive_summary: bool,
}

impl ProjectDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn competency_analysis(&self) -> bool {
        self.competency_analysis
    }

    pub fn executive_summary(&self) -> bool {
        self.executive_summary
    }

    /// Disabling competency analysis forces the executive summary off in the
    /// same update.
    pub fn set_competency_analysis(&mut self, enabled: bool) {
        self.competency_analysis = enabled;
        if !enabled {
            self.executive_summary = false;
        }
    }

    /// # Errors
    /// Returns `InvalidInput` when enabling while competency analysis is off.
    pub fn set_executive_summary(&mut self, enabled: bool) -> Result<()> {
        if enabled && !self.competency_analysis {
            return Err(AssessorError::InvalidInput(
                "executive summary requires competency analysis".to_string(),
            ));
        }
        self.executive_summary = enabled;
        Ok(())
    }

    /// Add a knowledge-base file, replacing any file with the same name.
    pub fn add_knowledge_file(&mut self, file: DraftFile) {
        self.knowledge_base.retain(|existing| existing.file_name != file.file_name);
        self.knowledge_base.push(file);
    }

    /// Returns whether a file was removed.
    pub fn remove_knowledge_file(&mut self, file_name: &str) -> bool {
        let before = self.knowledge_base.len();
        self.knowledge_base.retain(|existing| existing.file_name != file_name);
        before != self.knowledge_base.len()
    }

    /// Toggle a simulation method; returns whether it is now selected.
    pub fn toggle_simulation_file(&mut self, file_id: &str) -> bool {
        toggle_membership(&mut self.simulation_file_ids, file_id)
    }

    /// Toggle an invited user; returns whether the user is now invited.
    pub fn toggle_invited_user(&mut self, user_id: &str) -> bool {
        toggle_membership(&mut self.invited_user_ids, user_id)
    }

    /// Whether anything differs from a freshly created draft.
    pub fn is_dirty(&self) -> bool {
        self != &Self::default()
    }
}

fn toggle_membership(ids: &mut Vec<String>, id: &str) -> bool {
    if let Some(position) = ids.iter().position(|existing| existing == id) {
        ids.remove(position);
        false
    } else {
        ids.push(id.to_string());
        true
    }
}

/// Body of `POST /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub dictionary_id: String,
    pub simulation_file_ids: Vec<String>,
    pub invited_user_ids: Vec<String>,
    pub prompts: PromptSet,
    pub competency_analysis: bool,
    pub executive_summary: bool,
}

impl CreateProjectRequest {
    pub fn from_draft(draft: &ProjectDraft, dictionary_id: String) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            dictionary_id,
            simulation_file_ids: draft.simulation_file_ids.clone(),
            invited_user_ids: draft.invited_user_ids.clone(),
            prompts: draft.prompts.clone(),
            competency_analysis: draft.competency_analysis,
            executive_summary: draft.executive_summary,
        }
    }
}

/// Response of `POST /projects`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedProject {
    #[serde(alias = "projectId", deserialize_with = "id_string")]
    pub id: String,
}

/// Raw response of `POST /projects/analyze-template`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateAnalysisReport {
    #[serde(alias = "found", alias = "tokens")]
    pub placeholders: Vec<String>,
    #[serde(alias = "invalidPlaceholders")]
    pub invalid: Vec<String>,
}

/// Placeholder tokens partitioned for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAnalysis {
    /// Every discovered token, in document order.
    pub found: Vec<String>,
    /// Well-formed tokens appearing more than once, each listed once.
    pub duplicates: Vec<String>,
    /// Syntactically invalid tokens; these block submission.
    pub invalid: Vec<String>,
}

impl TemplateAnalysis {
    pub fn from_report(report: TemplateAnalysisReport) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in &report.placeholders {
            if !report.invalid.contains(token) {
                *counts.entry(token.as_str()).or_default() += 1;
            }
        }

        let mut duplicates: Vec<String> = Vec::new();
        for token in &report.placeholders {
            if counts.get(token.as_str()).copied().unwrap_or_default() > 1
                && !duplicates.contains(token)
            {
                duplicates.push(token.clone());
            }
        }

        Self { found: report.placeholders, duplicates, invalid: report.invalid }
    }

    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.invalid.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(placeholders: &[&str], invalid: &[&str]) -> TemplateAnalysisReport {
        TemplateAnalysisReport {
            placeholders: placeholders.iter().map(|s| s.to_string()).collect(),
            invalid: invalid.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn disabling_competency_analysis_forces_summary_off() {
        let mut draft = ProjectDraft::new();
        draft.set_competency_analysis(true);
        draft.set_executive_summary(true).unwrap();
        assert!(draft.executive_summary());

        draft.set_competency_analysis(false);
        assert!(!draft.competency_analysis());
        assert!(!draft.executive_summary());
    }

    #[test]
    fn executive_summary_requires_competency_analysis() {
        let mut draft = ProjectDraft::new();
        assert!(draft.set_executive_summary(true).is_err());
        assert!(!draft.executive_summary());
        assert!(draft.set_executive_summary(false).is_ok());
    }

    #[test]
    fn knowledge_files_are_replaced_by_name() {
        let mut draft = ProjectDraft::new();
        draft.add_knowledge_file(DraftFile::new("guide.pdf", "application/pdf", vec![1]));
        draft.add_knowledge_file(DraftFile::new("guide.pdf", "application/pdf", vec![2, 3]));

        assert_eq!(draft.knowledge_base.len(), 1);
        assert_eq!(draft.knowledge_base[0].bytes, vec![2, 3]);
        assert!(draft.remove_knowledge_file("guide.pdf"));
        assert!(!draft.remove_knowledge_file("guide.pdf"));
    }

    #[test]
    fn toggles_invited_users() {
        let mut draft = ProjectDraft::new();
        assert!(draft.toggle_invited_user("u1"));
        assert!(draft.toggle_invited_user("u2"));
        assert!(!draft.toggle_invited_user("u1"));
        assert_eq!(draft.invited_user_ids, vec!["u2".to_string()]);
    }

    #[test]
    fn dirty_tracking() {
        let mut draft = ProjectDraft::new();
        assert!(!draft.is_dirty());
        draft.name = "Q3 assessment".into();
        assert!(draft.is_dirty());
    }

    #[test]
    fn analysis_reports_each_duplicate_once() {
        let analysis = TemplateAnalysis::from_report(report(&["x", "y", "x"], &[]));
        assert_eq!(analysis.duplicates, vec!["x".to_string()]);
        assert_eq!(analysis.found_count(), 3);
        assert!(!analysis.has_errors());
        assert!(analysis.has_warnings());

        let triple = TemplateAnalysis::from_report(report(&["a", "a", "a", "b", "b"], &[]));
        assert_eq!(triple.duplicates, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn invalid_tokens_are_not_counted_as_duplicates() {
        let analysis = TemplateAnalysis::from_report(report(&["{bad", "{bad", "ok"], &["{bad"]));
        assert!(analysis.duplicates.is_empty());
        assert!(analysis.has_errors());
        assert_eq!(analysis.invalid, vec!["{bad".to_string()]);
    }

    #[test]
    fn section_names_round_trip() {
        for section in WizardSection::ALL {
            assert_eq!(section.to_string().parse::<WizardSection>().unwrap(), section);
        }
    }

    #[test]
    fn create_request_serializes_camel_case() {
        let mut draft = ProjectDraft::new();
        draft.name = "  Pilot  ".into();
        draft.set_competency_analysis(true);
        let body = serde_json::to_value(CreateProjectRequest::from_draft(&draft, "d9".into())).unwrap();

        assert_eq!(body["name"], "Pilot");
        assert_eq!(body["dictionaryId"], "d9");
        assert_eq!(body["competencyAnalysis"], true);
        assert_eq!(body["executiveSummary"], false);
    }
}
