//! Request payloads sent to the Azkaban server.
use serde::Deserialize;

/// Scope identifier Azkaban uses for the root flow of an execution.
pub const ROOT_SCOPE: &str = "ROOT";

/// A runtime property override for one node of the executed flow.
///
/// `scope` is [`ROOT_SCOPE`], a subflow node id (`innerflow`) or a
/// colon-separated path to a nested job (`innerflow:job1`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeProperty {
    pub scope: String,
    pub name: String,
    pub value: String,
}

impl RuntimeProperty {
    /// Override `name` with `value` for the node at `scope`.
    pub fn new(
        scope: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Form field name the executor servlet groups overrides by.
    pub fn param_name(&self) -> String {
        format!("runtimeProperty[{}][{}]", self.scope, self.name)
    }
}

/// Request to create a project.
///
/// Sent as a form to `/manager` with `action=create`. The server rejects
/// names that already exist, so callers check the listing first.
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    pub name: String,
    /// Free text shown on the project page. Must not be empty.
    pub description: String,
}

/// Request to upload a project archive.
///
/// Sent as multipart form data with the archive in the `file` part. Each
/// upload creates a new project version.
#[derive(Debug, Clone)]
pub struct UploadProjectRequest {
    /// Existing project receiving the archive.
    pub project: String,
    /// Filename reported to the server, must end in `.zip`.
    pub file_name: String,
    /// Raw zip bytes.
    pub content: Vec<u8>,
}

/// Request to execute a flow.
#[derive(Debug, Clone)]
pub struct ExecuteFlowRequest {
    pub project: String,
    /// Id of the flow to start, i.e. the name of its final job.
    pub flow: String,
    /// Overrides applied to this execution only, in the order given.
    pub runtime_properties: Vec<RuntimeProperty>,
}

impl ExecuteFlowRequest {
    /// Form parameters for the request, excluding the session id.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("ajax".to_string(), "executeFlow".to_string()),
            ("project".to_string(), self.project.clone()),
            ("flow".to_string(), self.flow.clone()),
        ];

        params.extend(
            self.runtime_properties
                .iter()
                .map(|p| (p.param_name(), p.value.clone())),
        );

        params
    }
}
