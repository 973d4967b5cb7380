//! HTTP client for the Azkaban web server.
//!
//! [`AzkabanClient::login`] exchanges credentials for a [`Session`]; every
//! other call goes through the session, which sends the server-issued
//! `session.id` with each request. Non-2xx responses and responses missing
//! their success marker are errors.
use color_eyre::eyre::WrapErr;
use log::*;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashSet;
use url::Url;

use crate::{
    azkaban::{
        request::{
            CreateProjectRequest, ExecuteFlowRequest, UploadProjectRequest,
        },
        types::{
            CreateProjectResponse, ExecuteFlowResponse, LoginResponse,
            ProjectsResponse, SUCCESS_STATUS, UploadResponse, UploadedProject,
        },
    },
    error::ToolError,
    result::Result,
};

const INDEX_PATH: &str = "index";
const MANAGER_PATH: &str = "manager";
const EXECUTOR_PATH: &str = "executor";
const SESSION_ID_PARAM: &str = "session.id";
const ZIP_MIME_TYPE: &str = "application/zip";

/// Unauthenticated client bound to a server base URL.
#[derive(Debug)]
pub struct AzkabanClient {
    client: Client,
    base_url: Url,
}

impl AzkabanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(ToolError::from)?;

        // join() replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(ToolError::from)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticate and return a session for subsequent calls.
    pub async fn login(
        self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session> {
        info!("logging in to {} as {username}", self.base_url);

        let url = endpoint(&self.base_url, INDEX_PATH)?;

        let params = [
            ("action", "login"),
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let response = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(ToolError::from)?
            .error_for_status()
            .map_err(ToolError::from)?
            .json::<LoginResponse>()
            .await
            .map_err(ToolError::from)?;

        if response.status.as_deref() != Some(SUCCESS_STATUS) {
            let reason = response
                .error
                .unwrap_or_else(|| format!("status {:?}", response.status));
            return Err(ToolError::LoginFailed(reason).into());
        }

        let session_id = response
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or(ToolError::missing_field("login", SESSION_ID_PARAM))?;

        debug!("login succeeded");

        Ok(Session {
            client: self.client,
            base_url: self.base_url,
            session_id: SecretString::from(session_id),
        })
    }
}

/// Authenticated handle to the server, valid for one run. The session id
/// is redacted from `Debug` output.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base_url: Url,
    session_id: SecretString,
}

impl Session {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Names of every project on the server.
    pub async fn get_project_names(&self) -> Result<HashSet<String>> {
        let mut url = endpoint(&self.base_url, INDEX_PATH)?;

        url.query_pairs_mut()
            .append_pair("ajax", "fetchallprojects")
            .append_pair(SESSION_ID_PARAM, self.session_id.expose_secret());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ToolError::from)?
            .error_for_status()
            .map_err(ToolError::from)?
            .json::<ProjectsResponse>()
            .await
            .map_err(ToolError::from)?;

        if let Some(error) = response.error {
            return Err(
                ToolError::request_failed("fetchallprojects", error).into()
            );
        }

        let names = response
            .projects
            .into_iter()
            .map(|p| p.project_name)
            .collect::<HashSet<String>>();

        debug!("server has {} projects", names.len());

        Ok(names)
    }

    /// Create a project unconditionally.
    pub async fn create_project(
        &self,
        req: &CreateProjectRequest,
    ) -> Result<()> {
        info!("creating project: {}", req.name);

        let url = endpoint(&self.base_url, MANAGER_PATH)?;

        let params = [
            ("action", "create"),
            ("name", req.name.as_str()),
            ("description", req.description.as_str()),
            (SESSION_ID_PARAM, self.session_id.expose_secret()),
        ];

        let response = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(ToolError::from)?
            .error_for_status()
            .map_err(ToolError::from)?
            .json::<CreateProjectResponse>()
            .await
            .map_err(ToolError::from)?;

        if response.status.as_deref() != Some(SUCCESS_STATUS) {
            let message = response
                .message
                .unwrap_or_else(|| format!("status {:?}", response.status));
            return Err(ToolError::request_failed("create", message).into());
        }

        if let Some(path) = response.path {
            debug!("project created at {path}");
        }

        Ok(())
    }

    /// Create the project unless the server already has one by that name.
    /// Returns whether a create request was issued.
    pub async fn create_project_if_not_exists(
        &self,
        req: &CreateProjectRequest,
    ) -> Result<bool> {
        let names = self
            .get_project_names()
            .await
            .wrap_err("failed to list projects")?;

        if names.contains(&req.name) {
            debug!("project {} already exists: skipping creation", req.name);
            return Ok(false);
        }

        self.create_project(req).await?;

        Ok(true)
    }

    /// Upload a project archive.
    pub async fn upload_zip(
        &self,
        req: UploadProjectRequest,
    ) -> Result<UploadedProject> {
        info!(
            "uploading {} ({} bytes) to project {}",
            req.file_name,
            req.content.len(),
            req.project
        );

        let url = endpoint(&self.base_url, MANAGER_PATH)?;

        let file = Part::bytes(req.content)
            .file_name(req.file_name)
            .mime_str(ZIP_MIME_TYPE)
            .map_err(ToolError::from)?;

        let form = Form::new()
            .text("ajax", "upload")
            .text("project", req.project)
            .text(SESSION_ID_PARAM, self.session_id.expose_secret().to_string())
            .part("file", file);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ToolError::from)?
            .error_for_status()
            .map_err(ToolError::from)?
            .json::<UploadResponse>()
            .await
            .map_err(ToolError::from)?;

        if let Some(error) = response.error {
            return Err(ToolError::request_failed("upload", error).into());
        }

        let project_id = response
            .project_id
            .filter(|id| !id.is_empty())
            .ok_or(ToolError::missing_field("upload", "projectId"))?;

        let uploaded = UploadedProject {
            project_id: project_id.to_string(),
            version: response.version.map(|v| v.to_string()),
        };

        debug!("uploaded project: {uploaded:?}");

        Ok(uploaded)
    }

    /// Start a flow execution and return its execution id. Does not wait
    /// for the execution to finish.
    pub async fn execute_flow(
        &self,
        req: &ExecuteFlowRequest,
    ) -> Result<String> {
        info!("executing flow {} in project {}", req.flow, req.project);

        let url = endpoint(&self.base_url, EXECUTOR_PATH)?;

        let mut params = req.form_params();
        params.push((
            SESSION_ID_PARAM.to_string(),
            self.session_id.expose_secret().to_string(),
        ));

        for (key, value) in params.iter().filter(|(k, _)| k != SESSION_ID_PARAM)
        {
            debug!("execute param: {key}={value}");
        }

        let response = self
            .client
            .post(url)
            .form(&params)
            .send()
            .await
            .map_err(ToolError::from)?
            .error_for_status()
            .map_err(ToolError::from)?
            .json::<ExecuteFlowResponse>()
            .await
            .map_err(ToolError::from)?;

        let Some(execid) = response.execid.filter(|id| !id.is_empty()) else {
            if let Some(error) = response.error {
                return Err(
                    ToolError::request_failed("executeFlow", error).into()
                );
            }
            return Err(
                ToolError::missing_field("executeFlow", "execid").into()
            );
        };

        if let Some(message) = response.message {
            debug!("{message}");
        }

        Ok(execid.to_string())
    }

    /// Link to the execution page's job list.
    pub fn execution_url(&self, exec_id: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, EXECUTOR_PATH)?;
        url.query_pairs_mut().append_pair("execid", exec_id);
        url.set_fragment(Some("jobslist"));
        Ok(url)
    }
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url> {
    Ok(base_url.join(path).map_err(ToolError::from)?)
}
