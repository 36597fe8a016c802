//! End-to-end calls against the in-process sidecar.
//!
//! Every test runs a real HTTP round trip through [`MockService`] with a
//! [`FakeRuntime`] standing in for Docker, so the startup sequence, envelope
//! handling and result shaping are exercised without a container.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use pythainlp_sidecar::nlp::{FEATURE_SYLLABLE, FEATURE_TOKENIZE, FEATURE_TRANSLITERATE};
use pythainlp_sidecar::testing::{FakeRuntime, MockService, ready_manager};
use pythainlp_sidecar::{
    AnalyzeOptions, CancellationToken, Error, LifecycleState, Manager, RomanizeOptions,
    TokenizeOptions,
};

async fn manager_for(service: &MockService, runtime: Arc<FakeRuntime>) -> Manager {
    Manager::builder()
        .port(service.port())
        .runtime(runtime)
        .poll_interval(Duration::from_millis(10))
        .startup_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("manager should build")
}

// ── Startup ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn init_polls_until_third_health_check() {
    let service = MockService::start().await;
    service.ready_from_call(3);
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let manager = manager_for(&service, runtime.clone()).await;

    manager.init(&CancellationToken::new()).await.unwrap();

    // One probe before launch, then two polls.
    assert_eq!(service.health_calls(), 3);
    assert_eq!(runtime.detached_launches(), 1);
    assert_eq!(runtime.ensure_running_calls(), 1);
    assert_eq!(manager.state(), LifecycleState::Ready);

    let execs = runtime.exec_log();
    assert_eq!(execs.len(), 3);
    assert!(execs[0].join(" ").contains("mkdir -p /workspace/service"));
    assert!(execs[2].join(" ").contains("chmod +x /workspace/service/server.py"));
}

#[tokio::test]
async fn init_skips_launch_when_service_already_ready() {
    let service = MockService::start().await;
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let manager = manager_for(&service, runtime.clone()).await;

    manager.init(&CancellationToken::new()).await.unwrap();

    assert_eq!(service.health_calls(), 1);
    assert_eq!(runtime.detached_launches(), 0);
    // The script is still refreshed.
    assert_eq!(runtime.exec_log().len(), 3);
}

#[tokio::test]
async fn init_times_out_when_never_ready() {
    let service = MockService::start().await;
    service.never_ready();
    let manager = Manager::builder()
        .port(service.port())
        .runtime(Arc::new(FakeRuntime::new("calls-pythainlp-1")))
        .poll_interval(Duration::from_millis(10))
        .startup_timeout(Duration::from_millis(200))
        .build()
        .await
        .unwrap();

    let err = manager.init(&CancellationToken::new()).await.unwrap_err();

    match err {
        Error::ReadinessTimeout { timeout, attempts } => {
            assert_eq!(timeout, Duration::from_millis(200));
            assert!(attempts > 0);
        }
        other => panic!("expected ReadinessTimeout, got {other:?}"),
    }
    assert_eq!(manager.state(), LifecycleState::Failed);
    assert!(!manager.is_ready());
}

#[tokio::test]
async fn init_recreate_passes_no_cache() {
    let service = MockService::start().await;
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let manager = manager_for(&service, runtime.clone()).await;

    manager
        .init_recreate(true, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(runtime.recreates(), vec![true]);
    assert_eq!(runtime.ensure_running_calls(), 0);
    assert!(manager.is_ready());
}

#[tokio::test]
async fn pull_image_reports_progress() {
    let service = MockService::start().await;
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let manager = Manager::builder()
        .port(service.port())
        .runtime(runtime.clone())
        .download_progress(move |current, total, status| {
            sink.lock().unwrap().push((current, total, status.to_string()));
        })
        .build()
        .await
        .unwrap();

    manager.pull_image().await.unwrap();

    assert_eq!(runtime.pulls(), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(1, 1, "Download complete".to_string())]
    );
}

// ── Readiness gate ──────────────────────────────────────────────────────────

#[tokio::test]
async fn calls_before_init_send_nothing() {
    let service = MockService::start().await;
    let manager = manager_for(&service, Arc::new(FakeRuntime::new("calls-pythainlp-1"))).await;

    assert!(matches!(manager.tokenize("สวัสดี").await, Err(Error::NotReady)));
    assert!(matches!(manager.romanize("สวัสดี").await, Err(Error::NotReady)));
    assert!(matches!(manager.transliterate("สวัสดี").await, Err(Error::NotReady)));
    assert!(matches!(
        manager.syllable_tokenize("สวัสดี").await,
        Err(Error::NotReady)
    ));
    assert!(matches!(manager.analyze_text("สวัสดี").await, Err(Error::NotReady)));
    assert!(matches!(manager.version().await, Err(Error::NotReady)));

    assert_eq!(service.request_count(), 0);
    assert_eq!(service.health_calls(), 0);
}

#[tokio::test]
async fn stop_then_calls_are_rejected() {
    let service = MockService::start().await;
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let manager = manager_for(&service, runtime.clone()).await;
    manager.init(&CancellationToken::new()).await.unwrap();

    manager.stop().await.unwrap();

    assert_eq!(manager.state(), LifecycleState::Stopped);
    assert!(runtime.is_stopped());
    let err = manager.tokenize("สวัสดี").await.unwrap_err();
    assert!(err.is_not_ready());
    assert_eq!(service.request_count(), 0);
}

#[tokio::test]
async fn stop_during_init_is_not_resurrected() {
    let service = MockService::start().await;
    service.ready_from_call(20);
    let runtime = Arc::new(FakeRuntime::new("calls-pythainlp-1"));
    let manager = Arc::new(manager_for(&service, runtime.clone()).await);

    let starting = Arc::clone(&manager);
    let init = tokio::spawn(async move { starting.init(&CancellationToken::new()).await });

    while service.health_calls() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(manager.state(), LifecycleState::Starting);
    manager.stop().await.unwrap();

    let result = init.await.unwrap();

    assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
    assert!(service.health_calls() >= 20);
    assert_eq!(manager.state(), LifecycleState::Stopped);
    assert!(!manager.is_ready());
    assert!(runtime.is_stopped());
}

#[tokio::test]
async fn close_then_calls_are_rejected() {
    let (manager, service) = ready_manager().await;

    manager.close().await.unwrap();

    assert_eq!(manager.state(), LifecycleState::Closed);
    assert!(manager.analyze_text("สวัสดี").await.unwrap_err().is_not_ready());
    assert_eq!(service.request_count(), 0);
}

// ── Operations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn tokenize_marks_lexical_tokens() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/tokenize",
        json!({
            "data": {"tokens": ["ผม", " ", "ชื่อ", "Coco", "2024"]},
            "metadata": {"processing_time_ms": 3.0},
            "error": null
        }),
    );

    let result = manager.tokenize("ผม ชื่อCoco2024").await.unwrap();

    let lexical: Vec<bool> = result.tokens.iter().map(|t| t.is_lexical).collect();
    assert_eq!(lexical, vec![true, false, true, false, false]);
    assert_eq!(result.raw.len(), 5);
    assert_eq!(result.engine, "newmm");
    assert_eq!(result.processing_time, Some(Duration::from_millis(3)));
    manager.close().await.unwrap();
}

#[tokio::test]
async fn empty_engine_is_defaulted_in_request() {
    let (manager, service) = ready_manager().await;

    manager.tokenize_with_engine("สวัสดี", "").await.unwrap();
    manager.romanize_with_engine("สวัสดี", "").await.unwrap();
    manager.transliterate_with_engine("สวัสดี", "").await.unwrap();
    manager.syllable_tokenize_with_engine("สวัสดี", "").await.unwrap();

    assert_eq!(service.last_request("/tokenize").unwrap()["engine"], "newmm");
    assert_eq!(service.last_request("/romanize").unwrap()["engine"], "royin");
    assert_eq!(
        service.last_request("/transliterate").unwrap()["engine"],
        "thaig2p"
    );
    assert_eq!(
        service.last_request("/syllable_tokenize").unwrap()["engine"],
        "han_solo"
    );
    manager.close().await.unwrap();
}

#[tokio::test]
async fn options_reach_the_request_body() {
    let (manager, service) = ready_manager().await;

    manager
        .tokenize_with_options(
            "สวัสดีครับ",
            TokenizeOptions {
                engine: "longest".to_string(),
                custom_dict: vec!["สวัสดีครับ".to_string()],
                keep_whitespace: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let body = service.last_request("/tokenize").unwrap();
    assert_eq!(body["engine"], "longest");
    assert_eq!(body["custom_dict"], json!(["สวัสดีครับ"]));
    assert_eq!(body["keep_whitespace"], true);
    assert!(body.get("join_broken_num").is_none());

    service.respond(
        "/romanize",
        json!({
            "data": {
                "romanized": "sawatdi khrap",
                "tokens": ["สวัสดี", "ครับ"],
                "romanized_tokens": ["sawatdi", "khrap"]
            },
            "metadata": {},
            "error": null
        }),
    );
    let result = manager
        .romanize_with_options(
            "สวัสดีครับ",
            RomanizeOptions {
                engine: "lookup".to_string(),
                tokenize_first: true,
                fallback_engine: "thai2rom".to_string(),
            },
        )
        .await
        .unwrap();
    let body = service.last_request("/romanize").unwrap();
    assert_eq!(body["tokenize"], true);
    assert_eq!(body["fallback_engine"], "thai2rom");
    assert_eq!(result.romanized_parts, vec!["sawatdi", "khrap"]);
    assert_eq!(result.processing_time, None);
    manager.close().await.unwrap();
}

#[tokio::test]
async fn tokenize_sends_explicit_false_flags() {
    let (manager, service) = ready_manager().await;

    manager
        .tokenize_with_options(
            "ผม กิน",
            TokenizeOptions {
                keep_whitespace: Some(false),
                join_broken_num: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let body = service.last_request("/tokenize").unwrap();
    assert_eq!(body["keep_whitespace"], false);
    assert_eq!(body["join_broken_num"], false);

    manager.tokenize("ผม กิน").await.unwrap();
    let body = service.last_request("/tokenize").unwrap();
    assert!(body.get("keep_whitespace").is_none());
    manager.close().await.unwrap();
}

#[tokio::test]
async fn tokenize_ignores_non_numeric_processing_time() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/tokenize",
        json!({
            "data": {"tokens": ["ผม", "กิน"]},
            "metadata": {"processing_time_ms": "12.5"},
            "error": null
        }),
    );

    let result = manager.tokenize("ผมกิน").await.unwrap();

    assert_eq!(result.raw, vec!["ผม", "กิน"]);
    assert_eq!(result.processing_time, None);
    manager.close().await.unwrap();
}

#[tokio::test]
async fn syllables_keep_whitespace_by_default() {
    let (manager, service) = ready_manager().await;

    let result = manager.syllable_tokenize("สวัสดีครับ").await.unwrap();

    assert_eq!(result.syllables, vec!["สวัส", "ดี", "ครับ"]);
    assert_eq!(
        service.last_request("/syllable_tokenize").unwrap()["keep_whitespace"],
        true
    );
    manager.close().await.unwrap();
}

#[tokio::test]
async fn pronunciate_is_transliterate() {
    let (manager, service) = ready_manager().await;

    let a = manager.transliterate("สวัสดี").await.unwrap();
    let b = manager.pronunciate("สวัสดี").await.unwrap();

    assert_eq!(a, b);
    assert_eq!(b.engine, "thaig2p");
    assert_eq!(service.request_count(), 2);
    manager.close().await.unwrap();
}

#[tokio::test]
async fn health_queries_once_ready() {
    let (manager, _service) = ready_manager().await;

    assert_eq!(manager.version().await.unwrap(), "5.1.2");
    let engines = manager.supported_engines().await.unwrap();
    assert_eq!(engines["tokenize"], vec!["newmm", "longest"]);
    assert!(engines.contains_key("syllable_tokenize"));
    manager.close().await.unwrap();
}

// ── Analyze ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_zips_tokens_with_romanization() {
    let (manager, service) = ready_manager().await;

    let result = manager.analyze_text("สวัสดีครับ").await.unwrap();

    assert_eq!(result.tokens.len(), 2);
    assert_eq!(result.tokens[0].surface, "สวัสดี");
    assert_eq!(result.tokens[0].romanization, "sawatdi");
    assert_eq!(result.tokens[1].romanization, "khrap");
    assert_eq!(result.romanized, "sawatdi khrap");
    assert_eq!(
        service.last_request("/analyze").unwrap()["features"],
        json!(["tokenize", "romanize"])
    );
    manager.close().await.unwrap();
}

#[tokio::test]
async fn analyze_leaves_extra_tokens_unromanized() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/analyze",
        json!({
            "data": {
                "tokens": ["ผม", "กิน", "ข้าว"],
                "romanized": "phom kin",
                "romanized_tokens": ["phom", "kin"]
            },
            "metadata": {},
            "error": null
        }),
    );

    let result = manager.tokenize_and_romanize("ผมกินข้าว").await.unwrap();

    let pairs: Vec<(&str, &str)> = result
        .tokens
        .iter()
        .map(|t| (t.surface.as_str(), t.romanization.as_str()))
        .collect();
    assert_eq!(pairs, vec![("ผม", "phom"), ("กิน", "kin"), ("ข้าว", "")]);
    assert_eq!(result.raw_tokens.len(), 3);
    assert_eq!(result.romanized_parts.len(), 2);
    manager.close().await.unwrap();
}

#[tokio::test]
async fn analyze_ignores_surplus_romanization() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/analyze",
        json!({
            "data": {
                "tokens": ["ผม"],
                "romanized_tokens": ["phom", "kin"]
            },
            "metadata": {},
            "error": null
        }),
    );

    let result = manager.analyze_text("ผม").await.unwrap();

    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].romanization, "phom");
    manager.close().await.unwrap();
}

#[tokio::test]
async fn analyze_with_options_sends_features_and_engines() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/analyze",
        json!({
            "data": {
                "tokens": ["สวัสดี"],
                "phonetic": "sa˨˩.wat̚˨˩.diː˧",
                "syllables": ["สวัส", "ดี"]
            },
            "metadata": {"processing_time_ms": 2.5, "engine_versions": {"newmm": "1"}},
            "error": null
        }),
    );

    let result = manager
        .analyze_with_options(
            "สวัสดี",
            AnalyzeOptions {
                features: vec![
                    FEATURE_TOKENIZE.to_string(),
                    FEATURE_TRANSLITERATE.to_string(),
                    FEATURE_SYLLABLE.to_string(),
                ],
                tokenize_engine: "longest".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let body = service.last_request("/analyze").unwrap();
    assert_eq!(body["features"], json!(["tokenize", "transliterate", "syllable"]));
    assert_eq!(body["tokenize_engine"], "longest");
    assert!(body.get("romanize_engine").is_none());

    assert_eq!(result.tokens[0].romanization, "");
    assert_eq!(result.syllables, vec!["สวัส", "ดี"]);
    assert!(!result.phonetic.is_empty());
    assert_eq!(result.processing_time, Some(Duration::from_micros(2500)));
    manager.close().await.unwrap();
}

// ── Failure shapes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn service_error_is_preserved() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/tokenize",
        json!({
            "data": null,
            "metadata": {},
            "error": {"code": "E1", "message": "bad input"}
        }),
    );

    let err = manager.tokenize("x").await.unwrap_err();

    let remote = err.service_error().expect("expected a service error");
    assert_eq!(remote.code, "E1");
    assert_eq!(remote.message, "bad input");
    assert!(err.to_string().contains("bad input"));
    manager.close().await.unwrap();
}

#[tokio::test]
async fn invalid_engine_details_survive() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/romanize",
        json!({
            "data": null,
            "metadata": {},
            "error": {
                "code": "INVALID_ENGINE",
                "message": "Unknown engine: nope",
                "details": {"supported": ["royin", "tltk"]}
            }
        }),
    );

    let err = manager.romanize_with_engine("สวัสดี", "nope").await.unwrap_err();

    let remote = err.service_error().unwrap();
    assert_eq!(remote.code, "INVALID_ENGINE");
    assert_eq!(
        remote.details,
        Some(json!({"supported": ["royin", "tltk"]}))
    );
    manager.close().await.unwrap();
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let (manager, service) = ready_manager().await;
    service.respond_raw("/tokenize", "Internal Server Error");

    let err = manager.tokenize("สวัสดี").await.unwrap_err();

    assert!(
        matches!(err, Error::Decode { path: "/tokenize", .. }),
        "got {err:?}"
    );
    manager.close().await.unwrap();
}

#[tokio::test]
async fn missing_data_is_reported() {
    let (manager, service) = ready_manager().await;
    service.respond(
        "/transliterate",
        json!({"data": null, "metadata": {}, "error": null}),
    );

    let err = manager.transliterate("สวัสดี").await.unwrap_err();

    assert!(matches!(err, Error::MissingData { path: "/transliterate" }));
    manager.close().await.unwrap();
}
