use corsgate::{
    dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec},
    middleware::{
        CorsConfig, CorsMiddleware, CorsMiddlewareBuilder, Middleware, RejectBehavior,
        TracingMiddleware,
    },
};
use http::Method;
use smallvec::smallvec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ACAO: &str = "Access-Control-Allow-Origin";
const ACAC: &str = "Access-Control-Allow-Credentials";
const ACAM: &str = "Access-Control-Allow-Methods";
const ACAH: &str = "Access-Control-Allow-Headers";
const ACMA: &str = "Access-Control-Max-Age";
const ACEH: &str = "Access-Control-Expose-Headers";

/// Dispatcher around a handler that counts its invocations
struct Harness {
    dispatcher: Dispatcher,
    calls: Arc<AtomicUsize>,
}

impl Harness {
    fn new(cors: CorsMiddleware) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = move |_: &HandlerRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            HandlerResponse::json(200, serde_json::json!({ "handled": true }))
        };
        let mut dispatcher = Dispatcher::new(Arc::new(handler));
        dispatcher.add_middleware(Arc::new(TracingMiddleware));
        dispatcher.add_middleware(Arc::new(cors));
        Self { dispatcher, calls }
    }

    fn from_config(config: CorsConfig) -> Self {
        Self::new(CorsMiddleware::new(&config).unwrap())
    }

    fn send(&self, method: Method, headers: &[(&str, &str)]) -> HandlerResponse {
        let headers: HeaderVec = headers
            .iter()
            .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
            .collect();
        self.dispatcher
            .dispatch(&HandlerRequest::new(method, "/api/items", headers))
    }

    fn handler_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn config(origins: &str) -> CorsConfig {
    CorsConfig {
        origins: origins.to_string(),
        ..CorsConfig::default()
    }
}

fn assert_no_cors_headers(res: &HandlerResponse) {
    for name in [ACAO, ACAC, ACAM, ACAH, ACMA, ACEH] {
        assert!(res.get_header(name).is_none(), "unexpected {} header", name);
    }
}

#[test]
fn test_no_origin_forwards_with_vary_only() {
    let h = Harness::from_config(config("http://a.com"));
    let res = h.send(Method::GET, &[]);
    assert_eq!(h.handler_calls(), 1);
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("Vary"), Some("Origin"));
    assert_no_cors_headers(&res);
}

#[test]
fn test_empty_origin_is_treated_as_absent() {
    let h = Harness::from_config(config("http://a.com"));
    let res = h.send(Method::GET, &[("Origin", "")]);
    assert_eq!(h.handler_calls(), 1);
    assert_no_cors_headers(&res);
}

#[test]
fn test_unknown_origin_is_not_forwarded() {
    let h = Harness::from_config(config("http://a.com, http://b.com"));
    let res = h.send(Method::GET, &[("Origin", "http://evil.com")]);
    assert_eq!(h.handler_calls(), 0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::Value::Null);
    assert_eq!(res.get_header("Vary"), Some("Origin"));
    assert_no_cors_headers(&res);
}

#[test]
fn test_origin_match_is_case_sensitive() {
    let h = Harness::from_config(config("http://a.com"));
    h.send(Method::GET, &[("Origin", "http://A.com")]);
    assert_eq!(h.handler_calls(), 0);
}

#[test]
fn test_reject_status_override() {
    let h = Harness::from_config(CorsConfig {
        on_reject: RejectBehavior::Status(403),
        ..config("http://a.com")
    });
    let res = h.send(Method::GET, &[("Origin", "http://evil.com")]);
    assert_eq!(h.handler_calls(), 0);
    assert_eq!(res.status, 403);
    assert_no_cors_headers(&res);
}

#[test]
fn test_wildcard_matches_any_origin() {
    let h = Harness::from_config(config("*"));
    for origin in ["http://a.com", "https://x.example:8443", "null"] {
        let res = h.send(Method::GET, &[("Origin", origin)]);
        assert_eq!(res.get_header(ACAO), Some("*"));
    }
    assert_eq!(h.handler_calls(), 3);
}

#[test]
fn test_credentials_echo_origin_under_wildcard() {
    let h = Harness::from_config(CorsConfig {
        credentials: true,
        ..config("*")
    });
    let res = h.send(Method::GET, &[("Origin", "http://anywhere.test")]);
    assert_eq!(res.get_header(ACAO), Some("http://anywhere.test"));
    assert_eq!(res.get_header(ACAC), Some("true"));

    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://anywhere.test"),
            ("Access-Control-Request-Method", "GET"),
        ],
    );
    assert_eq!(res.get_header(ACAO), Some("http://anywhere.test"));
    assert_eq!(res.get_header(ACAC), Some("true"));
}

#[test]
fn test_unvalidated_preflight_always_succeeds() {
    let h = Harness::from_config(CorsConfig {
        methods: "GET, POST".to_string(),
        request_headers: "Content-Type".to_string(),
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "PURGE"),
            ("Access-Control-Request-Headers", "X-Anything, X-Else"),
        ],
    );
    assert_eq!(h.handler_calls(), 0);
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::Value::Null);
    assert_eq!(res.get_header(ACAM), Some("GET, POST"));
    assert_eq!(res.get_header(ACAH), Some("Content-Type"));
    assert_eq!(res.get_header(ACMA), Some("60"));
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
    assert_eq!(res.get_header("Vary"), Some("Origin"));
}

#[test]
fn test_validated_preflight_rejects_unknown_method() {
    let h = Harness::from_config(CorsConfig {
        methods: "GET, POST".to_string(),
        validate_headers: true,
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "DELETE"),
        ],
    );
    assert_eq!(h.handler_calls(), 0);
    assert_no_cors_headers(&res);
}

#[test]
fn test_validated_preflight_method_is_case_sensitive() {
    let h = Harness::from_config(CorsConfig {
        methods: "GET, POST".to_string(),
        validate_headers: true,
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "post"),
        ],
    );
    assert_no_cors_headers(&res);
}

#[test]
fn test_validated_preflight_headers_case_insensitive_and_trimmed() {
    let h = Harness::from_config(CorsConfig {
        request_headers: "x-foo, x-bar".to_string(),
        validate_headers: true,
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "GET"),
            ("Access-Control-Request-Headers", "X-Foo, x-bar"),
        ],
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header(ACAH), Some("x-foo, x-bar"));
    assert_eq!(h.handler_calls(), 0);
}

#[test]
fn test_validated_preflight_rejects_unknown_header() {
    let h = Harness::from_config(CorsConfig {
        request_headers: "x-foo".to_string(),
        validate_headers: true,
        on_reject: RejectBehavior::Status(403),
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "GET"),
            ("Access-Control-Request-Headers", "x-foo, x-secret"),
        ],
    );
    assert_eq!(res.status, 403);
    assert_no_cors_headers(&res);
}

#[test]
fn test_validated_preflight_with_empty_requested_headers() {
    let h = Harness::from_config(CorsConfig {
        request_headers: "x-foo".to_string(),
        validate_headers: true,
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "GET"),
            ("Access-Control-Request-Headers", ""),
        ],
    );
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
    assert_eq!(res.get_header(ACAM), Some("GET, PUT, POST, DELETE"));
}

#[test]
fn test_max_age_zero_omits_header() {
    let h = Harness::from_config(CorsConfig {
        max_age: Duration::ZERO,
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "GET"),
        ],
    );
    assert_eq!(res.status, 200);
    assert!(res.get_header(ACMA).is_none());
}

#[test]
fn test_max_age_sixty_seconds() {
    let h = Harness::from_config(CorsConfig {
        max_age: Duration::from_secs(60),
        ..config("http://a.com")
    });
    let res = h.send(
        Method::OPTIONS,
        &[
            ("Origin", "http://a.com"),
            ("Access-Control-Request-Method", "GET"),
        ],
    );
    assert_eq!(res.get_header(ACMA), Some("60"));
}

#[test]
fn test_simple_request_exposes_headers() {
    let h = Harness::from_config(CorsConfig {
        exposed_headers: "X-Custom".to_string(),
        ..config("http://a.com")
    });
    let res = h.send(Method::POST, &[("Origin", "http://a.com")]);
    assert_eq!(h.handler_calls(), 1);
    assert_eq!(res.get_header(ACEH), Some("X-Custom"));
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
    assert!(res.get_header(ACAM).is_none());
    assert!(res.get_header(ACMA).is_none());
    assert_eq!(res.body, serde_json::json!({ "handled": true }));
}

#[test]
fn test_options_without_request_method_is_forwarded() {
    let h = Harness::from_config(config("http://a.com"));
    let res = h.send(Method::OPTIONS, &[("Origin", "http://a.com")]);
    assert_eq!(h.handler_calls(), 1);
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
    assert!(res.get_header(ACAM).is_none());
}

#[test]
fn test_credentialed_simple_request_scenario() {
    let h = Harness::from_config(CorsConfig {
        methods: "GET, POST".to_string(),
        credentials: true,
        ..config("http://a.com")
    });
    let res = h.send(Method::GET, &[("Origin", "http://a.com")]);
    assert_eq!(h.handler_calls(), 1);
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
    assert_eq!(res.get_header(ACAC), Some("true"));
}

#[test]
fn test_handler_vary_is_preserved() {
    let handler = |_: &HandlerRequest| {
        let mut res = HandlerResponse::empty(200);
        res.append_header("Vary", "Accept-Encoding".to_string());
        res
    };
    let mut dispatcher = Dispatcher::new(Arc::new(handler));
    dispatcher.add_middleware(Arc::new(CorsMiddleware::permissive()));
    let req = HandlerRequest::new(
        Method::GET,
        "/",
        smallvec![(Arc::from("Origin"), "http://a.com".to_string())],
    );
    let res = dispatcher.dispatch(&req);
    let vary: Vec<&str> = res.get_header_all("vary").collect();
    assert_eq!(vary, vec!["Accept-Encoding", "Origin"]);
}

#[test]
fn test_lowercase_request_header_names() {
    let h = Harness::from_config(config("http://a.com"));
    let res = h.send(
        Method::OPTIONS,
        &[
            ("origin", "http://a.com"),
            ("access-control-request-method", "GET"),
        ],
    );
    assert_eq!(h.handler_calls(), 0);
    assert_eq!(res.get_header(ACAO), Some("http://a.com"));
}

#[test]
fn test_before_is_stateless_across_requests() {
    let cors = CorsMiddlewareBuilder::new()
        .allowed_origins(&["http://a.com"])
        .build()
        .unwrap();
    let ok = HandlerRequest::new(
        Method::GET,
        "/",
        smallvec![(Arc::from("Origin"), "http://a.com".to_string())],
    );
    let bad = HandlerRequest::new(
        Method::GET,
        "/",
        smallvec![(Arc::from("Origin"), "http://b.com".to_string())],
    );
    for _ in 0..3 {
        assert!(cors.before(&ok).is_none());
        assert!(cors.before(&bad).is_some());
    }
}

#[test]
fn test_shared_middleware_across_threads() {
    let h = Arc::new(Harness::from_config(config("http://a.com")));
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let h = Arc::clone(&h);
            std::thread::spawn(move || {
                let origin = if i % 2 == 0 { "http://a.com" } else { "http://b.com" };
                h.send(Method::GET, &[("Origin", origin)])
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(h.handler_calls(), 4);
}
