//! # Configuration Tests
//!
//! Layering of defaults, YAML file and `WPMIGRATE_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use wpmigrate::{get_config, MigrateError, OutputFormat};

// Environment variables are process-global; tests touching them run one at a time.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "WPMIGRATE_API_URL",
    "WPMIGRATE_SITE_URL",
    "WPMIGRATE_FORMAT",
    "WPMIGRATE_PER_PAGE",
    "WPMIGRATE_MAX_PAGES",
    "WPMIGRATE_CONCURRENCY",
    "WPMIGRATE_POSTS_DIR",
    "WPMIGRATE_TEST_HOST",
];

fn clear_env_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("wpmigrate.yml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_get_config_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let config = get_config(None).expect("defaults should load");

    assert_eq!(config.per_page, 100);
    assert_eq!(config.max_pages, 1);
    assert_eq!(config.concurrency, 1);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.asset_url_prefix, "/assets/images/blog-images");
    assert!(config.api_url.ends_with("/wp-json/wp/v2"));
}

#[test]
fn test_env_vars_override_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    env::set_var("WPMIGRATE_API_URL", "http://wp.test/wp-json/wp/v2");
    env::set_var("WPMIGRATE_FORMAT", "markdown");
    env::set_var("WPMIGRATE_PER_PAGE", "25");
    env::set_var("WPMIGRATE_MAX_PAGES", "0");
    env::set_var("WPMIGRATE_POSTS_DIR", "/tmp/wpmigrate-posts");

    let config = get_config(None).expect("configuration should load");

    assert_eq!(config.api_url, "http://wp.test/wp-json/wp/v2");
    assert_eq!(config.format, OutputFormat::Markdown);
    assert_eq!(config.per_page, 25);
    assert_eq!(config.max_pages, 0);
    assert_eq!(config.posts_dir, PathBuf::from("/tmp/wpmigrate-posts"));

    clear_env_vars();
}

#[test]
fn test_yaml_file_with_substitution_and_env_precedence() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    let dir = tempfile::tempdir().unwrap();

    env::set_var("WPMIGRATE_TEST_HOST", "blog.example.com");
    env::set_var("WPMIGRATE_CONCURRENCY", "8");
    let path = write_config(
        &dir,
        r#"
api_url: "https://${WPMIGRATE_TEST_HOST}/wp-json/wp/v2"
site_url: "https://${WPMIGRATE_TEST_HOST}"
format: markdown
per_page: 10
concurrency: 2
index_file: "out/index.json"
"#,
    );

    let config = get_config(Some(&path)).expect("configuration should load");

    assert_eq!(config.api_url, "https://blog.example.com/wp-json/wp/v2");
    assert_eq!(config.site_url, "https://blog.example.com");
    assert_eq!(config.format, OutputFormat::Markdown);
    assert_eq!(config.per_page, 10);
    assert_eq!(config.concurrency, 8, "env should win over the file");
    assert_eq!(config.index_file, PathBuf::from("out/index.json"));
    // Untouched fields keep their defaults.
    assert_eq!(config.max_pages, 1);

    clear_env_vars();
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    let dir = tempfile::tempdir().unwrap();

    let result = get_config(Some(&dir.path().join("absent.yml")));

    match result {
        Err(MigrateError::Config(message)) => assert!(message.contains("absent.yml")),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_value_fails_validation() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    env::set_var("WPMIGRATE_PER_PAGE", "500");
    let result = get_config(None);
    clear_env_vars();

    assert!(matches!(result, Err(MigrateError::Config(_))));
}

#[test]
fn test_unparseable_value_is_a_config_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "per_page: many\n");

    let result = get_config(Some(&path));

    assert!(matches!(result, Err(MigrateError::Config(_))));
}
