//! Dashboard list backends

use std::sync::Arc;

use assessor_core::ListBackend;
use assessor_domain::{ListTab, ProjectSummary, ReportSummary, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::client::ApiClient;
use super::endpoints::Collection;

const SEARCH_PARAM: &str = "search";

fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// `GET /projects[/archived]`, `PUT /projects/:id/(un)archive`
#[derive(Clone)]
pub struct ProjectListBackend {
    client: Arc<ApiClient>,
}

impl ProjectListBackend {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListBackend<ProjectSummary> for ProjectListBackend {
    async fn fetch(&self, tab: ListTab, search: &str) -> Result<Vec<ProjectSummary>> {
        let path = match tab {
            ListTab::Active => "/projects",
            ListTab::Archived => "/projects/archived",
        };
        let rows: Collection<ProjectSummary> =
            self.client.get_with_query(path, &[(SEARCH_PARAM, search)]).await?;
        let rows = rows.into_vec();
        debug!(%tab, count = rows.len(), "projects fetched");
        Ok(rows)
    }

    async fn archive(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self.client.put(&format!("/projects/{}/archive", segment(id))).await?;
        info!(project_id = id, "project archived");
        Ok(())
    }

    async fn unarchive(&self, id: &str) -> Result<()> {
        let _: serde_json::Value =
            self.client.put(&format!("/projects/{}/unarchive", segment(id))).await?;
        info!(project_id = id, "project restored");
        Ok(())
    }
}

/// `GET /projects/:id/reports[/archived]`, `PUT /reports/:id/(un)archive`
#[derive(Clone)]
pub struct ReportListBackend {
    client: Arc<ApiClient>,
    project_id: String,
}

impl ReportListBackend {
    pub fn new(client: Arc<ApiClient>, project_id: impl Into<String>) -> Self {
        Self { client, project_id: project_id.into() }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

#[async_trait]
impl ListBackend<ReportSummary> for ReportListBackend {
    async fn fetch(&self, tab: ListTab, search: &str) -> Result<Vec<ReportSummary>> {
        let base = format!("/projects/{}/reports", segment(&self.project_id));
        let path = match tab {
            ListTab::Active => base,
            ListTab::Archived => format!("{base}/archived"),
        };
        let rows: Collection<ReportSummary> =
            self.client.get_with_query(&path, &[(SEARCH_PARAM, search)]).await?;
        let rows = rows.into_vec();
        debug!(project_id = %self.project_id, %tab, count = rows.len(), "reports fetched");
        Ok(rows)
    }

    async fn archive(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self.client.put(&format!("/reports/{}/archive", segment(id))).await?;
        info!(report_id = id, "report archived");
        Ok(())
    }

    async fn unarchive(&self, id: &str) -> Result<()> {
        let _: serde_json::Value =
            self.client.put(&format!("/reports/{}/unarchive", segment(id))).await?;
        info!(report_id = id, "report restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assessor_core::MemoryCredentialStore;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiClientConfig;

    fn client(server: &MockServer) -> Arc<ApiClient> {
        Arc::new(
            ApiClient::builder()
                .config(ApiClientConfig { base_url: server.uri(), ..Default::default() })
                .credentials(Arc::new(MemoryCredentialStore::with_token("tok")))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn fetches_archived_reports_with_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/p1/reports/archived"))
            .and(query_param("search", "ana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reports": [{ "id": 5, "title": "Ana - Leadership", "createdAt": "2024-02-01", "canArchive": true }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = ReportListBackend::new(client(&server), "p1");
        let rows = backend.fetch(ListTab::Archived, "ana").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "5");
        assert!(rows[0].archivable);
    }

    #[tokio::test]
    async fn archive_hits_project_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/projects/p9/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "message": "archived" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/projects/p9/unarchive"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = ProjectListBackend::new(client(&server));
        backend.archive("p9").await.unwrap();
        backend.unarchive("p9").await.unwrap();
    }

    #[tokio::test]
    async fn active_projects_without_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "a", "name": "Alpha", "date": "2024-01-01", "owner": "Ana", "archivable": false }
            ])))
            .mount(&server)
            .await;

        let rows = ProjectListBackend::new(client(&server)).fetch(ListTab::Active, "").await.unwrap();
        assert_eq!(rows[0].name, "Alpha");
    }
}
