//! Integration tests for the catalog and playback progress endpoints.

mod common;

use common::{TestHarness, TEST_LOGIN, TEST_PASSWORD};
use serde_json::json;

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn list_is_paginated() {
    let (h, addr) = TestHarness::with_server().await;
    for i in 0..5 {
        h.create_video_with_file(&format!("video-{i}"), &[0u8; 64], 0);
    }

    let resp = client()
        .get(format!("http://{addr}/api/videos?page=1&pageSize=2"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["videos"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn page_size_is_clamped() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/api/videos?pageSize=10000"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["pageSize"], 100);
}

#[tokio::test]
async fn search_filters_by_title() {
    let (h, addr) = TestHarness::with_server().await;
    h.create_video_with_file("ocean-documentary", &[0u8; 64], 0);
    h.create_video_with_file("mountain-hike", &[0u8; 64], 0);

    let resp = client()
        .get(format!("http://{addr}/api/videos?query=ocean"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["title"], "ocean-documentary");
}

#[tokio::test]
async fn detail_includes_files_and_stream_url() {
    let (h, addr) = TestHarness::with_server().await;
    let video = h.create_video_with_file("detail", &[0u8; 512], 1500);

    let resp = client()
        .get(format!("http://{addr}/api/videos/{}", video.id))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "detail");
    assert_eq!(
        body["streamUrl"],
        format!("/api/videos/{}/stream", video.id)
    );
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["fileSize"], 512);
    assert_eq!(files[0]["bitrateKbps"], 1500);
}

#[tokio::test]
async fn unknown_video_is_not_found() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!(
            "http://{addr}/api/videos/00000000-0000-0000-0000-000000000000"
        ))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_video_id_is_bad_request() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/api/videos/not-a-uuid"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn progress_round_trip() {
    let (h, addr) = TestHarness::with_server().await;
    let video = h.create_video_with_file("progress", &[0u8; 64], 0);

    let resp = client()
        .post(format!("http://{addr}/api/users/me/progress"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .json(&json!({
            "videoId": video.id.to_string(),
            "positionSec": 120,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client()
        .get(format!(
            "http://{addr}/api/users/me/history?videoId={}",
            video.id
        ))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["positionSec"], 120);
    assert_eq!(body["completed"], false);
}

#[tokio::test]
async fn progress_update_replaces_position() {
    let (h, addr) = TestHarness::with_server().await;
    let video = h.create_video_with_file("replace", &[0u8; 64], 0);

    for (pos, done) in [(60, false), (600, true)] {
        let resp = client()
            .post(format!("http://{addr}/api/users/me/progress"))
            .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
            .json(&json!({
                "videoId": video.id.to_string(),
                "positionSec": pos,
                "completed": done,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
    }

    let resp = client()
        .get(format!(
            "http://{addr}/api/users/me/history?videoId={}",
            video.id
        ))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["positionSec"], 600);
    assert_eq!(body["completed"], true);
}

#[tokio::test]
async fn missing_history_is_no_content() {
    let (h, addr) = TestHarness::with_server().await;
    let video = h.create_video_with_file("fresh", &[0u8; 64], 0);

    let resp = client()
        .get(format!(
            "http://{addr}/api/users/me/history?videoId={}",
            video.id
        ))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 204);
}

#[tokio::test]
async fn progress_for_unknown_video_is_not_found() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .post(format!("http://{addr}/api/users/me/progress"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .json(&json!({
            "videoId": ottstream_common::VideoId::new().to_string(),
            "positionSec": 10,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn negative_position_is_rejected() {
    let (h, addr) = TestHarness::with_server().await;
    let video = h.create_video_with_file("neg", &[0u8; 64], 0);

    let resp = client()
        .post(format!("http://{addr}/api/users/me/progress"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .json(&json!({
            "videoId": video.id.to_string(),
            "positionSec": -5,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}
