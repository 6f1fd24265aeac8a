use super::*;

// =============================================================================
// Credential
// =============================================================================

#[test]
fn credential_with_empty_half_is_incomplete() {
    assert!(Credential::new("alice", "t1").is_complete());
    assert!(!Credential::new("", "t1").is_complete());
    assert!(!Credential::new("alice", "  ").is_complete());
}

#[test]
fn credential_auth_header_joins_user_and_token() {
    assert_eq!(Credential::new("alice", "t1").auth_header(), "alice:t1");
}

// =============================================================================
// AuthRequest
// =============================================================================

#[test]
fn auth_request_login_serializes_with_type_tag() {
    let req = AuthRequest::Login { user: "alice".into(), password: "pw".into() };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "login", "user": "alice", "password": "pw" }));
}

#[test]
fn auth_request_signup_uses_new_tag() {
    let req = AuthRequest::New { user: "bob".into(), password: "pw".into() };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["type"], "new");
    assert_eq!(req.kind(), "new");
}

#[test]
fn auth_request_check_carries_token_not_password() {
    let req = AuthRequest::Check { user: "alice".into(), token: "t1".into() };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "check", "user": "alice", "token": "t1" }));
}

// =============================================================================
// MessagesResponse
// =============================================================================

#[test]
fn messages_response_parses_millisecond_timestamps() {
    let body = r#"{"messages":[{"user":"alice","content":"hi","timestamp":1700000000123}]}"#;
    let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.messages.len(), 1);
    assert_eq!(parsed.messages[0].user, "alice");
    assert_eq!(parsed.messages[0].timestamp, Some(1_700_000_000_123));
}

#[test]
fn messages_response_missing_or_null_list_is_empty() {
    let missing: MessagesResponse = serde_json::from_str("{}").unwrap();
    assert!(missing.messages.is_empty());

    let null: MessagesResponse = serde_json::from_str(r#"{"messages":null}"#).unwrap();
    assert!(null.messages.is_empty());
}

#[test]
fn message_timestamp_accepts_strings_and_rejects_garbage() {
    let body = r#"{"messages":[
        {"user":"a","content":"x","timestamp":"42"},
        {"user":"b","content":"y","timestamp":"noon"},
        {"user":"c","content":"z"}
    ]}"#;
    let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.messages[0].timestamp, Some(42));
    assert_eq!(parsed.messages[1].timestamp, None);
    assert_eq!(parsed.messages[2].timestamp, None);
}

#[test]
fn auth_response_tolerates_success_only_body() {
    let parsed: AuthResponse = serde_json::from_str(r#"{"success":"Created new user bob"}"#).unwrap();
    assert!(parsed.token.is_none());
    assert_eq!(parsed.success.as_deref(), Some("Created new user bob"));
}
