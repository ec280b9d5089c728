//! Configuration updates while serving.

use std::time::Duration;

use reqwest::StatusCode;

mod common;

use common::{client, config_for, start_gate, start_mock_upstream, write_pages};

/// Poll until `check` accepts the response, or give up after ~2s.
async fn eventually<F>(url: &str, mut check: F) -> bool
where
    F: FnMut(StatusCode, &str) -> bool,
{
    let client = client();
    for _ in 0..100 {
        let res = client.get(url).send().await.unwrap();
        let status = res.status();
        let body = res.text().await.unwrap();
        if check(status, &body) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_toggle_through_update_channel() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(dir.path());
    let upstream = start_mock_upstream().await;
    let config = config_for(upstream, dir.path());
    let gate = start_gate(config.clone()).await;

    let res = client().get(gate.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut enabled = config.clone();
    enabled.maintenance.enabled = true;
    enabled.maintenance.content = vec!["ok.txt".into()];
    gate.updates.send(enabled).unwrap();
    assert!(
        eventually(&gate.url("/"), |status, body| {
            status == StatusCode::SERVICE_UNAVAILABLE && body == "Maintenance"
        })
        .await
    );

    gate.updates.send(config).unwrap();
    assert!(eventually(&gate.url("/"), |status, _| status == StatusCode::OK).await);
}

#[tokio::test]
async fn test_rejected_update_keeps_serving_previous() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(dir.path());
    let upstream = start_mock_upstream().await;
    let mut config = config_for(upstream, dir.path());
    config.maintenance.enabled = true;
    config.maintenance.content = vec!["foo.html".into()];
    let gate = start_gate(config.clone()).await;

    let mut broken = config.clone();
    broken.maintenance.only_if = Some(r#"http.path ~ "(""#.into());
    gate.updates.send(broken).unwrap();

    let mut missing = config.clone();
    missing.maintenance.content = vec!["foo.html".into(), "gone.txt".into()];
    gate.updates.send(missing).unwrap();

    // A later valid update proves the broken ones were processed first.
    let mut marker = config.clone();
    marker.maintenance.content = vec!["ok.txt".into(), "foo.html".into()];
    gate.updates.send(marker).unwrap();
    assert!(eventually(&gate.url("/"), |_, body| body == "Maintenance").await);

    let snapshot = gate.store.current();
    assert!(snapshot.enabled());
    assert!(snapshot.predicate().is_none());
    assert_eq!(snapshot.alternatives().len(), 2);
}

#[tokio::test]
async fn test_concurrent_requests_during_reloads() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(dir.path());
    let upstream = start_mock_upstream().await;
    let base = config_for(upstream, dir.path());
    let gate = start_gate(base.clone()).await;

    // Intercepts only /maint/*, always with the html page.
    let mut html = base.clone();
    html.maintenance.enabled = true;
    html.maintenance.only_if = Some(r#"http.path ~ "^/maint/""#.into());
    html.maintenance.content = vec!["foo.html".into()];

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = client();
        let url = gate.url("/maint/page");
        tasks.push(tokio::spawn(async move {
            for _ in 0..25 {
                let res = client.get(&url).send().await.unwrap();
                let status = res.status();
                let body = res.text().await.unwrap();
                match status {
                    StatusCode::OK => assert_eq!(body, common::UPSTREAM_BODY),
                    StatusCode::SERVICE_UNAVAILABLE => assert_eq!(body, "<h1>Maintenance</h1>"),
                    other => panic!("unexpected status {other}"),
                }
            }
        }));
    }

    for i in 0..50 {
        let next = if i % 2 == 0 { html.clone() } else { base.clone() };
        gate.updates.send(next).unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    for task in tasks {
        task.await.unwrap();
    }
}
