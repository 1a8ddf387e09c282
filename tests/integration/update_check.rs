use std::process::Output;

use assert_cmd::Command;
use xfer_cli::test_utils::{CannedResponse, TestEnvironment, TestServer};
use xfer_cli::upgrade::github::platform_asset_name;

use super::xfer;

const OFFERED: &str = "99.0.0";

/// A release server offering `OFFERED` and an environment whose config
/// points at it.
async fn offering_release(check_on_startup: bool) -> (TestServer, TestEnvironment) {
    let release = serde_json::json!({
        "tag_name": format!("v{OFFERED}"),
        "assets": [{
            "name": platform_asset_name(),
            "size": 10,
            "browser_download_url": "http://127.0.0.1:9/unreachable",
        }],
    });
    let server = TestServer::start(
        CannedResponse::ok(release.to_string()).with_header("Content-Type", "application/json"),
    )
    .await
    .unwrap();

    let env = TestEnvironment::new().unwrap();
    let mut config = env.config();
    config.upgrade.check_on_startup = check_on_startup;
    config.upgrade.api_url = server.url("");
    env.write_config(&config).unwrap();
    (server, env)
}

/// Run `cmd` answering "n" to any prompt, off the async runtime.
async fn declining(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.write_stdin("n\n").output().unwrap()).await.unwrap()
}

fn prompted(output: &Output) -> bool {
    String::from_utf8_lossy(&output.stderr).contains(&format!("Version {OFFERED}"))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_startup_check_never_reoffers_declined_version() {
    let (_server, env) = offering_release(true).await;

    let mut cmd = xfer(&env);
    cmd.arg("list");
    let first = declining(cmd).await;
    assert!(first.status.success());
    assert!(prompted(&first));
    assert!(String::from_utf8_lossy(&first.stdout).contains("No transfers"));
    assert!(env.read_state().unwrap().ignored_versions.contains(OFFERED));

    let mut cmd = xfer(&env);
    cmd.arg("list");
    let second = declining(cmd).await;
    assert!(second.status.success());
    assert!(!prompted(&second));

    let mut cmd = xfer(&env);
    cmd.args(["update", "--routine"]);
    let routine = declining(cmd).await;
    assert!(routine.status.success());
    assert!(!prompted(&routine));

    // A manual check offers the version again
    let mut cmd = xfer(&env);
    cmd.arg("update");
    let manual = declining(cmd).await;
    assert!(manual.status.success());
    assert!(prompted(&manual));
    assert_eq!(env.read_state().unwrap().ignored_versions.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_startup_check_disabled_by_default() {
    let (_server, env) = offering_release(false).await;

    let mut cmd = xfer(&env);
    cmd.arg("list");
    let output = declining(cmd).await;
    assert!(output.status.success());
    assert!(!prompted(&output));
    assert!(env.read_state().unwrap().ignored_versions.is_empty());
}
