//! Reference data the project wizard offers for selection

use serde::{Deserialize, Serialize};

use super::serde_helpers::id_string;
use super::session::Role;

/// A competency dictionary the project can be bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryOption {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Full dictionary body shown in the preview pane
///
/// The body is displayed as-is, so it stays untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryContent {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

/// A simulation-method file that can be attached to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationFile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "fileName", alias = "filename")]
    pub name: String,
}

/// A user who can be invited to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUser {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}
