use super::*;

#[test]
fn new_trims_trailing_slash() {
    let config = ClientConfig::new("http://localhost:8080/", Some(PathBuf::from("c.json")), 3000, 10).unwrap();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.endpoint("/api/chat/auth"), "http://localhost:8080/api/chat/auth");
}

#[test]
fn new_applies_intervals() {
    let config = ClientConfig::new(DEFAULT_BASE_URL, Some(PathBuf::from("c.json")), 250, 3).unwrap();
    assert_eq!(config.poll_interval, Duration::from_millis(250));
    assert_eq!(config.request_timeout, Duration::from_secs(3));
    assert_eq!(config.connect_timeout, Duration::from_secs(3));
}

#[test]
fn new_rejects_non_http_base_url() {
    let err = ClientConfig::new("ftp://example.com", None, 3000, 10).unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));
}

#[test]
fn new_rejects_zero_poll_interval() {
    let err = ClientConfig::new(DEFAULT_BASE_URL, None, 0, 10).unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));
}

#[test]
fn new_rejects_zero_request_timeout() {
    let err = ClientConfig::new(DEFAULT_BASE_URL, None, 3000, 0).unwrap_err();
    assert!(matches!(err, ChatError::Config(_)));
}

#[test]
fn default_credential_path_ends_with_file_name() {
    let path = default_credential_path();
    assert!(path.ends_with("chatterm/credential.json") || path.ends_with("credential.json"));
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_CHAT_ENV_PARSE_GARBAGE_31__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse(key, 7_u64), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_trims_whitespace() {
    let key = "__TEST_CHAT_ENV_PARSE_WS_32__";
    unsafe { std::env::set_var(key, " 1500 ") };
    assert_eq!(env_parse(key, 7_u64), 1500);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn from_env_reads_chat_variables() {
    let vars = [
        ("CHAT_BASE_URL", "https://chat.example.com/"),
        ("CHAT_CREDENTIAL_FILE", "/tmp/chatterm-env/cred.json"),
        ("CHAT_POLL_INTERVAL_MS", "750"),
        ("CHAT_REQUEST_TIMEOUT_SECS", "4"),
    ];
    for (key, value) in vars {
        unsafe { std::env::set_var(key, value) };
    }

    let config = ClientConfig::from_env();
    for (key, _) in vars {
        unsafe { std::env::remove_var(key) };
    }

    let config = config.unwrap();
    assert_eq!(config.base_url, "https://chat.example.com");
    assert_eq!(config.credential_path, PathBuf::from("/tmp/chatterm-env/cred.json"));
    assert_eq!(config.poll_interval, Duration::from_millis(750));
    assert_eq!(config.request_timeout, Duration::from_secs(4));
    assert_eq!(config.connect_timeout, Duration::from_secs(4));
}
