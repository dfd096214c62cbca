use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::net::SocketAddr;
use std::process::Command;

/// Localhost staff directory: three bios plus one page without a name heading.
fn spawn_site(rt: &tokio::runtime::Runtime) -> SocketAddr {
    use axum::{http::header, http::StatusCode, routing::get, Router};

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        let base = format!("http://{addr}");

        let directory = format!(
            r#"<html><body>
              <a href="{base}/staff/ada/">Ada</a>
              <a href="{base}/news/">News</a>
              <a>no target</a>
              <a href="{base}/staff/bo/">Bo</a>
              <a href="{base}/staff/ghost/">Ghost</a>
              <a href="{base}/staff/cy/">Cy</a>
            </body></html>"#
        );

        let html = |body: &'static str| ([(header::CONTENT_TYPE, "text/html")], body);
        let app = Router::new()
            .route(
                "/people/",
                get(move || {
                    let d = directory.clone();
                    async move { ([(header::CONTENT_TYPE, "text/html")], d) }
                }),
            )
            .route(
                "/staff/ada/",
                get(move || async move {
                    html("<html><body><h1>Institute for Data, Systems, and Society at Example</h1><h2>Ada Lovelace</h2><p>Ada works on machine learning and statistics.</p><p>She also teaches.</p></body></html>")
                }),
            )
            .route(
                "/staff/bo/",
                get(move || async move {
                    html("<html><body><h2>Bo Cook</h2><p>Bo writes cooking recipes.</p></body></html>")
                }),
            )
            .route(
                "/staff/ghost/",
                get(move || async move { html("<html><body><h1>No name here</h1><p>orphan</p></body></html>") }),
            )
            .route(
                "/staff/cy/",
                get(move || async move { html("<html><body><h2>Cy</h2></body></html>") }),
            )
            .route(
                "/broken/",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("axum serve");
        });
        addr
    })
}

#[test]
fn biomatch_scrape_then_query_contract() {
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let addr = spawn_site(&rt);
    let base = format!("http://{addr}");
    let tmp = tempfile::tempdir().expect("tempdir");
    let data = tmp.path().join("bios.json");

    let out = Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["scrape", "--directory", &format!("{base}/people/"), "--slug", &format!("{base}/staff/"), "--data"])
        .arg(&data)
        .output()
        .expect("run biomatch scrape");
    assert!(out.status.success(), "scrape failed: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("      -- h1: Institute for Data, Systems, and Society..."), "probe listing: {stdout}");
    assert!(stdout.contains("      -- h2: Ada Lovelace"), "probe listing: {stdout}");
    assert!(stdout.contains("      --  p: Ada works on machine learning and statis..."), "probe listing: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("skipping page"), "expected a skipped page log: {stderr}");

    let stored: serde_json::Value = serde_json::from_slice(&std::fs::read(&data).unwrap()).unwrap();
    let keys: Vec<_> = stored.as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            format!("{base}/staff/ada/"),
            format!("{base}/staff/bo/"),
            format!("{base}/staff/cy/"),
        ]
    );
    let ada = &stored[format!("{base}/staff/ada/").as_str()];
    assert_eq!(ada["name"].as_str(), Some("Ada Lovelace"));
    assert_eq!(ada["paragraphs"][1].as_str(), Some("she also teaches."));
    assert_eq!(ada["tokens"][0].as_str(), Some("ada"));
    assert_eq!(stored[format!("{base}/staff/cy/").as_str()]["tokens"].as_array().map(|a| a.len()), Some(0));

    Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["query", "machine learning research", "--data"])
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("      1.  Ada Lovelace"));
}

#[test]
fn biomatch_run_uses_existing_store_without_network() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let data = tmp.path().join("bios.json");
    std::fs::write(
        &data,
        r#"{"u1": {"name": "Only One", "paragraphs": ["graph theory"], "tokens": ["graph", "theory"]}}"#,
    )
    .unwrap();

    // The directory is unreachable; `run` must not touch it when the store exists.
    Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["run", "--directory", "http://127.0.0.1:9/people/", "--slug", "http://127.0.0.1:9/staff/", "--data"])
        .arg(&data)
        .arg("graph theory")
        .assert()
        .success()
        .stdout(predicate::str::contains("Only One (Score: 1.0000)"));
}

#[test]
fn biomatch_scrape_with_no_links_reports_clear_error() {
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let addr = spawn_site(&rt);
    let base = format!("http://{addr}");
    let tmp = tempfile::tempdir().expect("tempdir");
    let data = tmp.path().join("bios.json");

    Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["scrape", "--directory", &format!("{base}/people/"), "--slug", &format!("{base}/faculty/"), "--data"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bio links found"));
    assert!(!data.exists(), "no store should be written");
}

#[test]
fn biomatch_scrape_with_unreachable_directory_fails() {
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let addr = spawn_site(&rt);
    let base = format!("http://{addr}");
    let tmp = tempfile::tempdir().expect("tempdir");

    Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["scrape", "--directory", &format!("{base}/broken/"), "--slug", &format!("{base}/staff/"), "--data"])
        .arg(tmp.path().join("bios.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("staff directory unreachable"));
}

#[test]
fn biomatch_probe_lists_tags() {
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let addr = spawn_site(&rt);
    let base = format!("http://{addr}");

    Command::cargo_bin("biomatch")
        .expect("bin")
        .args(["probe", "--directory", &format!("{base}/people/"), "--slug", &format!("{base}/staff/")])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Tags on {base}/staff/ada/:")))
        .stdout(predicate::str::contains("      -- h2: Ada Lovelace"));
}
