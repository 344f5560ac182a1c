use pollenchat_core::{ChatError, RetryPolicy, Settings};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.api.base_url, "https://text.pollinations.ai");
    assert_eq!(settings.api.timeout_secs, 30);
    assert_eq!(settings.chat.model, "openai");
    assert_eq!(settings.chat.temperature, 0.7);
    assert_eq!(settings.chat.max_tokens, Some(1000));
    assert_eq!(settings.chat.max_message_chars, 2000);
    assert!(settings.storage.persist);
    assert!(settings.storage.data_dir.is_none());
    assert_eq!(settings.retry_policy(), RetryPolicy::default());
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_from(&dir.path().join("nope.toml"));
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_invalid_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is = = not toml").unwrap();
    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[chat]
model = "mistral"

[api]
retry_attempts = 5
retry_base_delay_ms = 250
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path);
    assert_eq!(settings.chat.model, "mistral");
    assert_eq!(settings.chat.temperature, 0.7);
    assert_eq!(settings.api.base_url, "https://text.pollinations.ai");
    assert_eq!(
        settings.retry_policy(),
        RetryPolicy::new(5, Duration::from_millis(250))
    );
    assert!(settings.storage.persist);
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut settings = Settings::default();
    settings.chat.model = "claude".into();
    settings.chat.temperature = 0.2;
    settings.storage.persist = false;
    settings.save_to(&path).unwrap();

    assert_eq!(Settings::load_from(&path), settings);
}

#[test]
fn test_completion_options_validated() {
    let mut settings = Settings::default();
    settings.chat.model = "llama".into();
    settings.chat.max_tokens = None;
    let options = settings.completion_options().unwrap();
    assert_eq!(options.model, "llama");
    assert_eq!(options.max_tokens, None);

    settings.chat.temperature = 1.5;
    assert!(matches!(
        settings.completion_options(),
        Err(ChatError::Validation(_))
    ));
}

#[test]
fn test_zero_retry_attempts_still_tries_once() {
    let mut settings = Settings::default();
    settings.api.retry_attempts = 0;
    assert_eq!(settings.retry_policy().max_attempts, 1);
}

#[test]
fn test_client_from_settings() {
    let mut settings = Settings::default();
    settings.api.base_url = "http://127.0.0.1:9".into();
    let client = settings.build_client();
    assert_eq!(client.base_url(), "http://127.0.0.1:9");
    assert_eq!(client.retry_policy(), settings.retry_policy());
}

#[test]
fn test_non_persistent_storage_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.storage.persist = false;
    settings.storage.data_dir = Some(dir.path().to_path_buf());

    let storage = settings.build_storage();
    storage.set("chat_messages", &vec!["x"]);

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_build_session_rejects_bad_options() {
    let mut settings = Settings::default();
    settings.storage.persist = false;
    settings.chat.model = "not-a-model".into();
    assert!(settings.build_session().is_err());
}

#[test]
fn test_unusable_data_dir_falls_back_to_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    let mut settings = Settings::default();
    settings.storage.data_dir = Some(blocker.join("sub"));

    let storage = settings.build_storage();
    storage.set("chat_messages", &vec!["kept"]);
    let kept: Vec<String> = storage.get("chat_messages", Vec::new());
    assert_eq!(kept, vec!["kept".to_string()]);

    let session = settings.build_session().unwrap();
    assert!(session.state().messages.is_empty());
    assert!(session.can_send_message());
}
