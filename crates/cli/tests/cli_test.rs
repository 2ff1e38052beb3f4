//! # CLI Tests
//!
//! Runs the `wpmigrate` binary against a mock WordPress site.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;
use wpmigrate_test_utils::{PostBuilder, TestSetup, POSTS_PATH};

#[tokio::test(flavor = "multi_thread")]
async fn test_migrate_command_writes_posts_and_index() {
    // Arrange
    let setup = TestSetup::new().await.unwrap();
    setup.mount_png("/img/cover.png").await;
    let post = PostBuilder::new("hello")
        .featured(&setup.url("/img/cover.png"))
        .build();
    setup.mount_posts(&[post]).await;

    // Act
    let mut cmd = Command::cargo_bin("wpmigrate").unwrap();
    cmd.current_dir(setup.dir.path())
        .arg("migrate")
        .arg("--api-url")
        .arg(&setup.config.api_url)
        .arg("--site-url")
        .arg(&setup.config.site_url)
        .arg("--posts-dir")
        .arg(&setup.config.posts_dir)
        .arg("--images-dir")
        .arg(&setup.config.images_dir)
        .arg("--index-file")
        .arg(&setup.config.index_file);

    // Assert
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 post(s) migrated"));
    assert!(setup.config.posts_dir.join("hello.json").exists());
    assert!(setup.config.index_file.exists());
    assert!(setup.image_folder("hello").join("boritokep.webp").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_migrate_command_fails_when_post_list_fails() {
    // Arrange
    let setup = TestSetup::new().await.unwrap();
    setup.mount_status(POSTS_PATH, 500).await;

    // Act
    let mut cmd = Command::cargo_bin("wpmigrate").unwrap();
    cmd.current_dir(setup.dir.path())
        .env("WPMIGRATE_API_URL", &setup.config.api_url)
        .env("WPMIGRATE_INDEX_FILE", &setup.config.index_file)
        .arg("migrate");

    // Assert
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("returned status 500"));
    assert!(!setup.config.index_file.exists());
}

#[test]
fn test_config_command_prints_effective_yaml() {
    // Arrange
    let temp_dir = tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("wpmigrate.yml"),
        "api_url: https://blog.test/wp-json/wp/v2\nformat: markdown\n",
    )
    .unwrap();

    // Act
    let mut cmd = Command::cargo_bin("wpmigrate").unwrap();
    cmd.current_dir(temp_dir.path())
        .env("WPMIGRATE_PER_PAGE", "20")
        .arg("config");

    // Assert
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "api_url: https://blog.test/wp-json/wp/v2",
        ))
        .stdout(predicate::str::contains("format: markdown"))
        .stdout(predicate::str::contains("per_page: 20"));
}

#[test]
fn test_missing_config_file_is_reported() {
    // Act & Assert
    let temp_dir = tempdir().unwrap();
    Command::cargo_bin("wpmigrate")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("config")
        .arg("--config")
        .arg("nope.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
