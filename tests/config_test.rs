use retort::config::{RetortConfig, parse};
use std::path::PathBuf;

#[test]
fn default_config_has_sensible_values() {
    let config = RetortConfig::default();
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert!(config.gateway.secret_token.is_none());
    assert!(config.gateway.is_loopback());
    assert!(config.telegram.token.is_none());
    assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    assert!(config.telegram.bot_id.is_none());
    assert_eq!(config.telegram.send_timeout_secs, 10);
    assert_eq!(config.telegram.poll_timeout_secs, 30);
    assert_eq!(config.catalog.path, PathBuf::from("respostas.json"));
}

#[test]
fn valid_toml_parses_successfully() {
    let toml_str = r#"
[gateway]
port = 9000
bind = "0.0.0.0"
secret_token = "s3cret"

[telegram]
token = "123:abc"
api_base = "http://127.0.0.1:8081"
bot_id = 777
send_timeout_secs = 5
poll_timeout_secs = 50

[catalog]
path = "/etc/retort/respostas.json"
"#;

    let config = parse(toml_str).unwrap();
    assert_eq!(config.gateway.port, 9000);
    assert!(!config.gateway.is_loopback());
    assert_eq!(config.gateway.secret_token.as_deref(), Some("s3cret"));
    assert_eq!(config.telegram.token.as_deref(), Some("123:abc"));
    assert_eq!(config.telegram.api_base, "http://127.0.0.1:8081");
    assert_eq!(config.telegram.bot_id, Some(777));
    assert_eq!(config.telegram.send_timeout().as_secs(), 5);
    assert_eq!(config.telegram.poll_timeout_secs, 50);
    assert_eq!(
        config.catalog.path,
        PathBuf::from("/etc/retort/respostas.json")
    );
}

#[test]
fn partial_config_uses_defaults_for_missing_fields() {
    let config = parse(
        r#"
[telegram]
token = "123:abc"
"#,
    )
    .unwrap();
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    assert_eq!(config.telegram.send_timeout_secs, 10);
    assert_eq!(config.catalog.path, PathBuf::from("respostas.json"));
}

#[test]
fn empty_toml_uses_all_defaults() {
    let config = parse("").unwrap();
    assert_eq!(config.gateway.port, 8080);
    assert!(config.telegram.token.is_none());
}

#[test]
fn malformed_toml_returns_parse_error() {
    let err = parse("this is not valid toml {{{").unwrap_err().to_string();
    assert!(
        err.contains("expected") || err.contains("invalid"),
        "error should be descriptive: {err}"
    );
}

#[test]
fn invalid_api_base_rejected() {
    let err = parse(
        r#"
[telegram]
api_base = "not a url"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("telegram.api_base"));
}

#[test]
fn zero_send_timeout_rejected() {
    let err = parse(
        r#"
[telegram]
send_timeout_secs = 0
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("send_timeout_secs"));
}

#[test]
fn non_positive_bot_id_rejected() {
    let err = parse(
        r#"
[telegram]
bot_id = -5
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("bot_id"));
}
