use super::*;

struct TestUser(&'static str);

impl GrantUser for TestUser {
    fn get_user_id(&self) -> String {
        self.0.to_string()
    }
}

fn issued(redirect_uri: Option<&str>) -> TemporaryCredential {
    let token = TemporaryToken::new("tok1", "secret1").unwrap();
    TemporaryCredential::issue(token, "clientA", redirect_uri)
}

#[test]
fn test_issue_without_redirect() {
    let cred = issued(None);

    assert_eq!(cred.get_oauth_token(), "tok1");
    assert_eq!(cred.get_oauth_token_secret(), "secret1");
    assert_eq!(cred.get_client_id(), "clientA");
    assert_eq!(cred.get_redirect_uri(), None);
    assert_eq!(cred.get_user_id(), None);
    assert!(!cred.is_granted());
}

#[test]
fn test_issue_ignores_empty_redirect() {
    let cred = issued(Some(""));
    assert_eq!(cred.get_redirect_uri(), None);

    let cred = issued(Some("https://client.example/cb"));
    assert_eq!(cred.get_redirect_uri(), Some("https://client.example/cb"));
}

#[test]
fn test_empty_token_rejected() {
    let result = TemporaryToken::new("", "secret");
    assert!(matches!(result, Err(StorageError::InvalidKey(_))));
}

#[test]
fn test_check_verifier_before_grant() {
    let cred = issued(None);

    assert!(!cred.check_verifier("anything"));
    assert!(!cred.check_verifier(""));
}

#[test]
fn test_check_verifier_after_grant() {
    let mut cred = issued(None);
    cred.grant(TestUser("u1").get_user_id(), "V123");

    assert!(cred.is_granted());
    assert_eq!(cred.get_user_id(), Some("u1"));
    assert!(cred.check_verifier("V123"));
    assert!(!cred.check_verifier("wrong"));
    assert!(!cred.check_verifier("v123")); // Case-sensitive
    assert!(!cred.check_verifier("V1234"));
    assert!(!cred.check_verifier(""));
}

#[test]
fn test_stored_form_uses_oauth_names() {
    let mut cred = issued(Some("https://client.example/cb"));
    cred.grant("u1".to_string(), "verA");

    let stored = cred.to_stored().unwrap();
    let json: serde_json::Value = serde_json::from_str(&stored).unwrap();

    assert_eq!(json["oauth_token"], "tok1");
    assert_eq!(json["oauth_token_secret"], "secret1");
    assert_eq!(json["oauth_consumer_key"], "clientA");
    assert_eq!(json["oauth_callback"], "https://client.example/cb");
    assert_eq!(json["oauth_verifier"], "verA");
    assert_eq!(json["user_id"], "u1");
}

#[test]
fn test_stored_form_omits_unset_fields() {
    let stored = issued(None).to_stored().unwrap();

    assert!(!stored.contains("oauth_callback"));
    assert!(!stored.contains("oauth_verifier"));
    assert!(!stored.contains("user_id"));
}

#[test]
fn test_rematerialized_accessors_match() {
    let mut cred = issued(Some("https://client.example/cb"));
    cred.grant("u1".to_string(), "verA");

    let restored = TemporaryCredential::from_stored("k", &cred.to_stored().unwrap()).unwrap();

    assert_eq!(restored.get_oauth_token(), cred.get_oauth_token());
    assert_eq!(restored.get_oauth_token_secret(), cred.get_oauth_token_secret());
    assert_eq!(restored.get_client_id(), cred.get_client_id());
    assert_eq!(restored.get_redirect_uri(), cred.get_redirect_uri());
    assert_eq!(restored.get_user_id(), cred.get_user_id());
    assert!(restored.check_verifier("verA"));
}

#[test]
fn test_from_stored_rejects_half_granted_record() {
    let value = r#"{
        "oauth_token": "tok1",
        "oauth_token_secret": "s",
        "oauth_consumer_key": "clientA",
        "oauth_verifier": "verA"
    }"#;

    let result = TemporaryCredential::from_stored("temporary_credential:tok1", value);
    assert!(matches!(result, Err(StorageError::Corrupt { .. })));
}

#[test]
fn test_from_stored_rejects_empty_token() {
    let value = r#"{"oauth_token": "", "oauth_token_secret": "s", "oauth_consumer_key": "c"}"#;

    let result = TemporaryCredential::from_stored("k", value);
    assert!(matches!(result, Err(StorageError::Corrupt { .. })));
}

#[test]
fn test_from_stored_rejects_garbage() {
    let result = TemporaryCredential::from_stored("k", "1");
    match result {
        Err(StorageError::Corrupt { key, .. }) => assert_eq!(key, "k"),
        other => panic!("expected Corrupt, got {:?}", other),
    }
}

#[test]
fn test_generate_token() {
    let a = TemporaryToken::generate();
    let b = TemporaryToken::generate();

    assert_eq!(a.oauth_token.len(), 32);
    assert!(Uuid::parse_str(&a.oauth_token).is_ok());
    assert_eq!(a.oauth_token_secret.len(), SECRET_LENGTH);
    assert!(a.oauth_token_secret.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a.oauth_token, b.oauth_token);
    assert_ne!(a.oauth_token_secret, b.oauth_token_secret);
}

#[test]
fn test_generate_verifier() {
    let v = generate_verifier();

    assert_eq!(v.len(), VERIFIER_LENGTH);
    assert!(v.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(v, generate_verifier());
}
