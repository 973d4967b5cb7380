//! Response bodies returned by the Azkaban servlets.
use serde::Deserialize;
use std::fmt;

/// Status value the servlets report for a successful action.
pub const SUCCESS_STATUS: &str = "success";

/// Identifier the server may encode either as a JSON number or a string
/// (the upload servlet stringifies `projectId`, the listing does not).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(u64),
    Text(String),
}

impl Id {
    /// Empty strings are treated as an absent id.
    pub fn is_empty(&self) -> bool {
        matches!(self, Id::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{n}"),
            Id::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Body of `POST /index` with `action=login`.
///
/// A successful login carries `status: "success"` and the session id; a
/// rejected one carries only `error` (for example "Incorrect Login.").
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: Option<String>,
    /// Token to send as `session.id` on every later request.
    #[serde(rename = "session.id")]
    pub session_id: Option<String>,
    pub error: Option<String>,
}

/// One entry of the `fetchallprojects` listing. Only the name is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: Option<Id>,
    pub project_name: String,
}

/// Body of `GET /index?ajax=fetchallprojects`.
#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
    pub error: Option<String>,
}

/// Body of `POST /manager` with `action=create`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectResponse {
    pub status: Option<String>,
    /// Failure reason when `status` is `"error"`.
    pub message: Option<String>,
    /// Redirect target of the new project page on success.
    pub path: Option<String>,
}

/// Body of the multipart `ajax=upload` request. The servlet has no status
/// field: success is signalled by `projectId` being present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub project_id: Option<Id>,
    pub version: Option<Id>,
    pub error: Option<String>,
}

/// Body of `POST /executor` with `ajax=executeFlow`.
#[derive(Debug, Deserialize)]
pub struct ExecuteFlowResponse {
    /// Execution id assigned by the server, absent when submission failed.
    pub execid: Option<Id>,
    pub project: Option<String>,
    pub flow: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedProject {
    pub project_id: String,
    /// Project version created by this upload, when the server reports it.
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_as_number_or_string() {
        let upload: UploadResponse =
            serde_json::from_str(r#"{"projectId":"12","version":"3"}"#)
                .unwrap();
        assert_eq!(upload.project_id, Some(Id::Text("12".into())));
        assert_eq!(upload.version.unwrap().to_string(), "3");

        let exec: ExecuteFlowResponse = serde_json::from_str(
            r#"{"project":"p","flow":"job3","execid":42,"message":"ok"}"#,
        )
        .unwrap();
        assert_eq!(exec.execid, Some(Id::Number(42)));
    }

    #[test]
    fn parses_login_session_id() {
        let login: LoginResponse = serde_json::from_str(
            r#"{"status":"success","session.id":"abc-123"}"#,
        )
        .unwrap();
        assert_eq!(login.status.as_deref(), Some(SUCCESS_STATUS));
        assert_eq!(login.session_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn empty_text_id_counts_as_empty() {
        assert!(Id::Text(" ".into()).is_empty());
        assert!(!Id::Text("7".into()).is_empty());
        assert!(!Id::Number(0).is_empty());
    }
}
