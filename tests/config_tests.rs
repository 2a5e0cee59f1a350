//! Configuration loading, defaults, and validation.

use std::io::Write;
use std::time::Duration;

use cascade::config::Config;
use parking_lot::Mutex;

/// Tests that set or depend on `CASCADE_FEED_URL` serialize through this
/// lock; the process environment is shared across test threads.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const MINIMAL: &str = r#"
[source]
feed_url = "https://feed.example/changes"
"#;

const FULL: &str = r#"
[source]
feed_url = "https://feed.example/changes"
poll_interval_ms = 250
page_limit = 50

[delivery]
max_attempts = 5
first_interval_ms = 1000
backoff_multiplier = 3.0
max_interval_ms = 30000
request_timeout_ms = 10000

[registry]
suspension_threshold = 2

[[consumers]]
endpoint = "https://x.example/hook"

[[consumers]]
endpoint = "https://y.example/hook"
headers = { "x-api-key" = "secret" }

[admin]
enabled = false
bind = "127.0.0.1:9999"

[store]
run_file = "/tmp/cascade-test/run.json"

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn minimal_config_uses_defaults() {
    let file = write_config(MINIMAL);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.source.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.source.page_limit, 100);
    assert_eq!(config.delivery.max_attempts, 3);
    assert_eq!(
        config.delivery.retry_policy().first_interval,
        Duration::from_secs(5)
    );
    assert_eq!(config.registry.suspension_threshold, 3);
    assert!(config.consumers.is_empty());
    assert!(config.admin.enabled);
    assert_eq!(config.admin.bind, "127.0.0.1:8070");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn full_config_parses_every_section() {
    let file = write_config(FULL);
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.source.page_limit, 50);
    assert_eq!(config.delivery.max_attempts, 5);
    assert_eq!(config.registry.suspension_threshold, 2);
    assert!(!config.admin.enabled);

    let consumers = config.consumers();
    assert_eq!(consumers.len(), 2);
    assert_eq!(
        consumers[1].headers.get("x-api-key").map(String::as_str),
        Some("secret")
    );
    assert!(consumers.iter().all(|c| c.is_active()));
}

#[test]
fn missing_feed_url_is_rejected() {
    let _env = ENV_LOCK.lock();
    let file = write_config("[source]\nfeed_url = \"\"\n");
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn unparseable_feed_url_is_rejected() {
    let _env = ENV_LOCK.lock();
    let file = write_config("[source]\nfeed_url = \"not a url\"\n");
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn zero_attempts_is_rejected() {
    let file = write_config(
        r#"
[source]
feed_url = "https://feed.example/changes"

[delivery]
max_attempts = 0
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn duplicate_consumer_endpoints_are_rejected() {
    let file = write_config(
        r#"
[source]
feed_url = "https://feed.example/changes"

[[consumers]]
endpoint = "https://x.example/hook"

[[consumers]]
endpoint = "https://x.example/hook"
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn invalid_consumer_endpoint_is_rejected() {
    let file = write_config(
        r#"
[source]
feed_url = "https://feed.example/changes"

[[consumers]]
endpoint = "not a url"
"#,
    );
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn env_var_overrides_feed_url() {
    let _env = ENV_LOCK.lock();
    let file = write_config(MINIMAL);

    std::env::set_var("CASCADE_FEED_URL", "https://other.example/changes");
    let config = Config::load(file.path());
    std::env::remove_var("CASCADE_FEED_URL");

    assert_eq!(
        config.unwrap().source.feed_url,
        "https://other.example/changes"
    );
}
