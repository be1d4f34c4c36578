//! Voice endpoint integration tests
//!
//! `ElevenLabs` and Azure Speech are stubbed locally. Transcoding runs through a
//! shell shim standing in for ffmpeg that copies the upload unchanged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, Query},
    http::{HeaderMap, Request, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{build_router, get_json, post_json, post_raw, secret, spawn_stub, test_config};

const BOUNDARY: &str = "concierge-test-boundary";

fn multipart_request(field: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"recording.webm\"\r\nContent-Type: audio/webm\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/stt")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

fn tts_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

type Calls = Arc<Mutex<Vec<(String, HashMap<String, String>, serde_json::Value)>>>;

/// `ElevenLabs` stand-in keyed on the voice id
///
/// `broken` fails with 401, `slow-start` answers after two seconds, `trickle`
/// sends five chunks 300 ms apart; anything else returns fixed bytes.
async fn elevenlabs_stub(calls: Calls) -> String {
    let app = Router::new()
        .route(
            "/text-to-speech/{voice_id}/stream",
            post(
                move |Path(voice_id): Path<String>,
                      Query(q): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| {
                    let calls = calls.clone();
                    async move {
                        assert_eq!(headers["xi-api-key"], "el-key");
                        calls.lock().unwrap().push((voice_id.clone(), q, body));

                        match voice_id.as_str() {
                            "broken" => (
                                StatusCode::UNAUTHORIZED,
                                Json(json!({ "detail": { "status": "invalid_api_key", "message": "Invalid API key" } })),
                            )
                                .into_response(),
                            "slow-start" => {
                                tokio::time::sleep(Duration::from_secs(2)).await;
                                b"late".to_vec().into_response()
                            }
                            "trickle" => {
                                let chunks = futures::stream::unfold(0_u8, |sent| async move {
                                    if sent == 5 {
                                        return None;
                                    }
                                    tokio::time::sleep(Duration::from_millis(300)).await;
                                    Some((Ok::<_, std::io::Error>(Bytes::from_static(b"chunk")), sent + 1))
                                });
                                ([(header::CONTENT_TYPE, "audio/mpeg")], Body::from_stream(chunks))
                                    .into_response()
                            }
                            _ => ([(header::CONTENT_TYPE, "audio/mpeg")], b"ID3fake-mp3-frames".to_vec())
                                .into_response(),
                        }
                    }
                },
            ),
        )
        .route(
            "/voices",
            get(|| async {
                Json(json!({ "voices": [
                    { "voice_id": "f1", "name": "Ada", "labels": { "gender": "female" } },
                    { "voice_id": "m1", "name": "Bo", "labels": { "gender": "male" } },
                    { "voice_id": "n1", "name": "Robo", "labels": {} }
                ]}))
            }),
        );

    spawn_stub(app).await
}

async fn tts_router(calls: Calls) -> Router {
    tts_router_with_timeout(calls, Duration::from_secs(30)).await
}

async fn tts_router_with_timeout(calls: Calls, timeout: Duration) -> Router {
    let mut config = test_config();
    config.elevenlabs.base_url = elevenlabs_stub(calls).await;
    config.elevenlabs.api_key = secret("el-key");
    config.elevenlabs.timeout = timeout;
    build_router(config)
}

#[tokio::test]
async fn test_tts_streams_audio() {
    let calls: Calls = Arc::default();
    let app = tts_router(calls.clone()).await;

    let (status, headers, body) = send_raw(&app, tts_request(&json!({ "text": "Hello there" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body, b"ID3fake-mp3-frames");

    let calls = calls.lock().unwrap();
    let (voice_id, query, payload) = &calls[0];
    assert_eq!(voice_id, "21m00Tcm4TlvDq8ikWAM");
    assert_eq!(query["optimize_streaming_latency"], "4");
    assert_eq!(query["output_format"], "mp3_22050_32");
    assert_eq!(payload["text"], "Hello there");
    assert_eq!(payload["model_id"], "eleven_turbo_v2_5");
    assert_eq!(payload["voice_settings"]["stability"], 0.5);
}

#[tokio::test]
async fn test_tts_uses_requested_voice() {
    let calls: Calls = Arc::default();
    let app = tts_router(calls.clone()).await;

    let (status, _, _) = send_raw(
        &app,
        tts_request(&json!({ "text": "Hi", "voice_id": "TxGEqnHWrfWFTfGW9XjX" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.lock().unwrap()[0].0, "TxGEqnHWrfWFTfGW9XjX");
}

#[tokio::test]
async fn test_tts_propagates_vendor_status() {
    let app = tts_router(Arc::default()).await;

    let (status, json) = post_json(&app, "/api/tts", &json!({ "text": "Hi", "voice_id": "broken" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "ElevenLabs error (401): Invalid API key");
}

#[tokio::test]
async fn test_tts_stream_outlives_timeout() {
    // 1.5 s of audio against a 1 s timeout; no single gap exceeds it
    let app = tts_router_with_timeout(Arc::default(), Duration::from_secs(1)).await;

    let (status, _, body) = send_raw(
        &app,
        tts_request(&json!({ "text": "A long answer", "voice_id": "trickle" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"chunk".repeat(5));
}

#[tokio::test]
async fn test_tts_timeout() {
    let app = tts_router_with_timeout(Arc::default(), Duration::from_millis(300)).await;

    let (status, json) = post_json(&app, "/api/tts", &json!({ "text": "Hi", "voice_id": "slow-start" })).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["error"], "ElevenLabs timeout");
}

#[tokio::test]
async fn test_tts_malformed_body() {
    let calls: Calls = Arc::default();
    let app = tts_router(calls.clone()).await;

    for (content_type, body) in [
        (None, r#"{"text":"Hi"}"#),
        (Some("application/json"), r#"{"text":5}"#),
        (Some("application/json"), "not json"),
    ] {
        let (status, json) = post_raw(&app, "/api/tts", content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(json["error"].is_string(), "{body}");
    }

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_tts_requires_text() {
    let app = tts_router(Arc::default()).await;

    for body in [json!({}), json!({ "text": "" })] {
        let (status, json) = post_json(&app, "/api/tts", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Text is required");
    }
}

#[tokio::test]
async fn test_tts_without_key() {
    let app = build_router(test_config());

    let (status, json) = post_json(&app, "/api/tts", &json!({ "text": "Hi" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "ElevenLabs API key not configured");
}

#[tokio::test]
async fn test_tts_unreachable_vendor() {
    let mut config = test_config();
    config.elevenlabs.api_key = secret("el-key");
    let app = build_router(config);

    let (status, json) = post_json(&app, "/api/tts", &json!({ "text": "Hi" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "Unable to connect to ElevenLabs");
}

#[tokio::test]
async fn test_voices_grouped_from_listing() {
    let app = tts_router(Arc::default()).await;

    let (status, json) = get_json(&app, "/api/voices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["female"][0]["voice_id"], "f1");
    assert_eq!(json["female"][0]["display_name"], "Ada");
    assert_eq!(json["male"][0]["name"], "Bo");
    assert_eq!(json["other"][0]["voice_id"], "n1");
}

#[tokio::test]
async fn test_voices_fall_back_to_builtin() {
    let stub = Router::new().route(
        "/voices",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down").into_response() }),
    );
    let mut config = test_config();
    config.elevenlabs.base_url = spawn_stub(stub).await;
    config.elevenlabs.api_key = secret("el-key");
    let app = build_router(config);

    let (status, json) = get_json(&app, "/api/voices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["female"].as_array().unwrap().len(), 4);
    assert_eq!(json["male"].as_array().unwrap().len(), 4);
    assert_eq!(json["female"][0]["name"], "Rachel");
    assert!(json["other"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stt_requires_audio_field() {
    let app = build_router(test_config());

    let (status, _, body) = send_raw(&app, multipart_request("note", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Audio file is required");

    // not multipart at all
    let (status, json) = post_json(&app, "/api/stt", &json!({ "audio": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Audio file is required");
}

#[tokio::test]
async fn test_stt_without_key() {
    let app = build_router(test_config());

    let (status, _, body) = send_raw(&app, multipart_request("audio", b"webm-bytes")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Azure Speech key not configured");
}

#[tokio::test]
async fn test_stt_conversion_failure() {
    let mut config = test_config();
    config.azure_speech.api_key = secret("az-key");
    config.azure_speech.ffmpeg = "/nonexistent/ffmpeg".to_string();
    let app = build_router(config);

    let (status, _, body) = send_raw(&app, multipart_request("audio", b"webm-bytes")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Audio conversion failed");
}

type Recognitions = Arc<Mutex<Vec<(HashMap<String, String>, HeaderMap, Bytes)>>>;

/// Azure short-audio stand-in keyed on the (copied) audio bytes
async fn azure_stub(seen: Recognitions) -> String {
    let app = Router::new().route(
        "/stt",
        post(
            move |Query(q): Query<HashMap<String, String>>, headers: HeaderMap, body: Bytes| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push((q, headers, body.clone()));
                    match &body[..] {
                        b"speech" => Json(json!({
                            "RecognitionStatus": "Success",
                            "DisplayText": " What's the weather in Paris? ",
                            "Offset": 0,
                            "Duration": 1_200_000
                        }))
                        .into_response(),
                        b"silence" => Json(json!({ "RecognitionStatus": "NoMatch" })).into_response(),
                        _ => (StatusCode::FORBIDDEN, "Invalid subscription key").into_response(),
                    }
                }
            },
        ),
    );

    spawn_stub(app).await
}

/// Router whose transcoder is a shim that copies input to output
///
/// The returned directory holds the shim and must outlive the router.
#[cfg(unix)]
async fn stt_router(seen: Recognitions) -> (Router, tempfile::TempDir) {
    use std::os::unix::fs::PermissionsExt;

    // invoked as: -y -i <input> -ar 16000 -ac 1 <output>
    let dir = tempfile::tempdir().unwrap();
    let shim = dir.path().join("ffmpeg");
    std::fs::write(&shim, "#!/bin/sh\ncp \"$3\" \"$8\"\n").unwrap();
    std::fs::set_permissions(&shim, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = test_config();
    config.azure_speech.api_key = secret("az-key");
    config.azure_speech.endpoint = Some(format!("{}/stt", azure_stub(seen).await));
    config.azure_speech.ffmpeg = shim.display().to_string();

    (build_router(config), dir)
}

#[cfg(unix)]
#[tokio::test]
async fn test_stt_transcribes_recording() {
    let seen: Recognitions = Arc::default();
    let (app, _dir) = stt_router(seen.clone()).await;

    let (status, _, body) = send_raw(&app, multipart_request("audio", b"speech")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "What's the weather in Paris?");

    let seen = seen.lock().unwrap();
    let (query, headers, audio) = &seen[0];
    assert_eq!(query["language"], "en-US");
    assert_eq!(query["format"], "simple");
    assert_eq!(headers["ocp-apim-subscription-key"], "az-key");
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "audio/wav; codecs=audio/pcm; samplerate=16000"
    );
    assert_eq!(&audio[..], b"speech");
}

#[cfg(unix)]
#[tokio::test]
async fn test_stt_no_match_is_unprocessable() {
    let (app, _dir) = stt_router(Arc::default()).await;

    let (status, _, body) = send_raw(&app, multipart_request("audio", b"silence")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Recognition failed: NoMatch");
}

#[cfg(unix)]
#[tokio::test]
async fn test_stt_propagates_vendor_status() {
    let (app, _dir) = stt_router(Arc::default()).await;

    let (status, _, body) = send_raw(&app, multipart_request("audio", b"wrong-key")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Azure STT error (403): Invalid subscription key");
}
