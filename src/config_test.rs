use super::*;

// =============================================================================
// validate_api_url
// =============================================================================

#[test]
fn https_url_is_accepted_and_trimmed() {
    assert_eq!(validate_api_url(" https://api.example.com/ ").unwrap(), "https://api.example.com");
}

#[test]
fn https_url_keeps_path_prefix() {
    assert_eq!(validate_api_url("https://example.com/backend/").unwrap(), "https://example.com/backend");
}

#[test]
fn http_loopback_is_accepted() {
    for url in ["http://localhost:8080", "http://127.0.0.1:3000", "http://[::1]:9000"] {
        assert!(validate_api_url(url).is_ok(), "{url}");
    }
}

#[test]
fn http_remote_is_rejected() {
    let err = validate_api_url("http://api.example.com").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidApiUrl { reason, .. } if reason.contains("loopback")));
}

#[test]
fn missing_scheme_is_rejected() {
    assert!(matches!(
        validate_api_url("api.example.com"),
        Err(ConfigError::InvalidApiUrl { reason: "missing scheme", .. })
    ));
}

#[test]
fn other_schemes_are_rejected() {
    assert!(validate_api_url("ftp://example.com").is_err());
    assert!(validate_api_url("https://").is_err());
}

// =============================================================================
// ClientConfig
// =============================================================================

#[test]
fn new_applies_defaults() {
    let cfg = ClientConfig::new("https://api.example.com").unwrap();
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 30, connect_secs: 10 });
    assert_eq!(cfg.retry, RetryPolicy::default());
    assert_eq!(cfg.google_client_id, None);
    assert!(cfg.store_path.ends_with(DEFAULT_STORE_FILE));
}

#[test]
fn endpoint_joins_path() {
    let cfg = ClientConfig::new("https://api.example.com/").unwrap();
    assert_eq!(cfg.endpoint("/auth/login"), "https://api.example.com/auth/login");
}

#[test]
fn builder_overrides() {
    let cfg = ClientConfig::new("https://api.example.com")
        .unwrap()
        .with_store_path("/tmp/estate.json")
        .with_retry(RetryPolicy::no_retry());
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/estate.json"));
    assert_eq!(cfg.retry.max_attempts, 1);
}

/// # Safety
/// Mutates process env; only touches `ESTATE_*` vars no other test reads.
unsafe fn clear_estate_env() {
    unsafe {
        std::env::remove_var("ESTATE_API_URL");
        std::env::remove_var("ESTATE_STORE_PATH");
        std::env::remove_var("ESTATE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("ESTATE_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("ESTATE_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("ESTATE_GOOGLE_CLIENT_ID");
    }
}

#[test]
fn from_env_reads_all_settings() {
    unsafe {
        clear_estate_env();
        assert!(matches!(ClientConfig::from_env(), Err(ConfigError::Missing("ESTATE_API_URL"))));

        std::env::set_var("ESTATE_API_URL", "https://api.example.com/");
        std::env::set_var("ESTATE_STORE_PATH", "/var/tmp/estate.json");
        std::env::set_var("ESTATE_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("ESTATE_CONNECT_TIMEOUT_SECS", "not-a-number");
        std::env::set_var("ESTATE_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("ESTATE_GOOGLE_CLIENT_ID", "client-123.apps.googleusercontent.com");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://api.example.com");
    assert_eq!(cfg.store_path, PathBuf::from("/var/tmp/estate.json"));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS });
    assert_eq!(cfg.retry.max_attempts, 5);
    assert_eq!(cfg.google_client_id.as_deref(), Some("client-123.apps.googleusercontent.com"));

    unsafe { clear_estate_env() };
}
