use azkaban_tools::{
    command::deploy_example::deploy_example, config::DeployConfig,
    error::ToolError,
};
use mockito::{Matcher, Server, ServerGuard};
use secrecy::SecretString;
use tempfile::TempDir;

const SESSION_ID: &str = "a1b2c3";
const FIXTURE_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/execpropstest");

fn config(server: &ServerGuard, dir: &TempDir) -> DeployConfig {
    DeployConfig {
        base_url: server.url(),
        fixture_dir: FIXTURE_DIR.into(),
        zip_path: Some(
            dir.path()
                .join("execpropstest.zip")
                .to_string_lossy()
                .to_string(),
        ),
        ..DeployConfig::default()
    }
}

async fn mock_login(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/index")
        .match_body(Matcher::UrlEncoded("action".into(), "login".into()))
        .with_status(200)
        .with_body(format!(
            r#"{{"status":"success","session.id":"{SESSION_ID}"}}"#
        ))
        .create_async()
        .await
}

async fn mock_projects(server: &mut ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/index")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ajax".into(), "fetchallprojects".into()),
            Matcher::UrlEncoded("session.id".into(), SESSION_ID.into()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

async fn mock_upload(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/manager")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".into()),
        )
        .with_status(200)
        .with_body(r#"{"projectId":"12","version":"1"}"#)
        .create_async()
        .await
}

#[test_log::test(tokio::test)]
async fn deploys_and_executes_example_project() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    let login = mock_login(&mut server).await;
    let list = mock_projects(&mut server, r#"{"projects":[]}"#).await;
    let create = server
        .mock("POST", "/manager")
        .match_header(
            "content-type",
            Matcher::Regex("^application/x-www-form-urlencoded".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "create".into()),
            Matcher::UrlEncoded("name".into(), "execpropstest".into()),
            Matcher::UrlEncoded("session.id".into(), SESSION_ID.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"status":"success"}"#)
        .expect(1)
        .create_async()
        .await;
    let upload = mock_upload(&mut server).await;
    let execute = server
        .mock("POST", "/executor")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ajax".into(), "executeFlow".into()),
            Matcher::UrlEncoded("project".into(), "execpropstest".into()),
            Matcher::UrlEncoded("flow".into(), "job3".into()),
            Matcher::UrlEncoded(
                "runtimeProperty[ROOT][my_prop]".into(),
                "my_ROOT_val".into(),
            ),
            Matcher::UrlEncoded(
                "runtimeProperty[innerflow][my_prop]".into(),
                "my_subflow_val".into(),
            ),
            Matcher::UrlEncoded(
                "runtimeProperty[innerflow:job1][my_prop]".into(),
                "my_inner_job_val".into(),
            ),
            Matcher::UrlEncoded("session.id".into(), SESSION_ID.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"project":"execpropstest","flow":"job3","execid":42}"#)
        .create_async()
        .await;

    let mut output = vec![];
    let url = deploy_example(
        &config,
        &SecretString::from("azkaban"),
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(url, format!("{}/executor?execid=42#jobslist", server.url()));
    assert_eq!(String::from_utf8(output).unwrap(), format!("{url}\n"));
    assert!(dir.path().join("execpropstest.zip").exists());

    login.assert_async().await;
    list.assert_async().await;
    create.assert_async().await;
    upload.assert_async().await;
    execute.assert_async().await;
}

#[tokio::test]
async fn existing_project_is_reused() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    mock_login(&mut server).await;
    mock_projects(
        &mut server,
        r#"{"projects":[{"projectId":12,"projectName":"execpropstest"}]}"#,
    )
    .await;
    let upload = mock_upload(&mut server).await;
    server
        .mock("POST", "/executor")
        .with_status(200)
        .with_body(r#"{"execid":7}"#)
        .create_async()
        .await;

    let mut output = vec![];
    let url = deploy_example(
        &config,
        &SecretString::from("azkaban"),
        &mut output,
    )
    .await
    .unwrap();

    // only the multipart upload hit /manager
    upload.assert_async().await;
    assert!(url.ends_with("/executor?execid=7#jobslist"));
}

#[tokio::test]
async fn failed_login_stops_deployment() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    server
        .mock("POST", "/index")
        .with_status(200)
        .with_body(r#"{"error":"Incorrect Login."}"#)
        .create_async()
        .await;
    let manager = server
        .mock("POST", "/manager")
        .expect(0)
        .create_async()
        .await;

    let mut output = vec![];
    let err = deploy_example(
        &config,
        &SecretString::from("wrong"),
        &mut output,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::LoginFailed(_))
    ));
    assert!(output.is_empty());
    manager.assert_async().await;
}

#[tokio::test]
async fn missing_fixture_fails_before_contacting_server() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let config = DeployConfig {
        fixture_dir: dir.path().join("absent").to_string_lossy().to_string(),
        ..config(&server, &dir)
    };

    let login = server
        .mock("POST", "/index")
        .expect(0)
        .create_async()
        .await;

    let mut output = vec![];
    let err = deploy_example(
        &config,
        &SecretString::from("azkaban"),
        &mut output,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::FixtureNotFound(_))
    ));
    login.assert_async().await;
}
