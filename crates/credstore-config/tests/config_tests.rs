// SPDX-FileCopyrightText: 2026 Credstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading.

use std::path::PathBuf;

use credstore_config::diagnostic::ConfigError;
use credstore_config::{
    load_and_validate, load_and_validate_str, load_config, load_config_from_path,
    load_config_from_str,
};
use figment::Jail;

/// Point the XDG config dir inside the jail so a developer's own
/// `~/.config/credstore/credstore.toml` cannot leak into the test.
fn isolate_user_config(jail: &mut Jail) {
    let xdg = jail.directory().join("xdg");
    jail.set_env("XDG_CONFIG_HOME", xdg.display());
}

#[test]
fn valid_toml_deserializes() {
    let toml = r#"
[store]
credentials_file = "secrets/app.conf.enc"
master_key_file = "secrets/app.key"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.store.credentials_file, PathBuf::from("secrets/app.conf.enc"));
    assert_eq!(config.store.master_key_file, PathBuf::from("secrets/app.key"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(
        config.store.credentials_file,
        PathBuf::from("resources/credentials.conf.enc")
    );
    assert_eq!(config.store.master_key_file, PathBuf::from("resources/master.key"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn only_one_path_overridden_keeps_other_default() {
    let toml = r#"
[store]
master_key_file = "configured.key"
"#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.store.master_key_file, PathBuf::from("configured.key"));
    assert_eq!(
        config.store.credentials_file,
        PathBuf::from("resources/credentials.conf.enc")
    );
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[store]
master_kye_file = "k"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should be rejected");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "master_kye_file");
            assert_eq!(suggestion.as_deref(), Some("master_key_file"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[agent]
name = "x"
"#;
    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("agent"),
        "error should mention the unknown section, got: {msg}"
    );
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[logging]
level = 3
"#;
    let errors = load_and_validate_str(toml).expect_err("integer level should be rejected");
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[store]
credentials_file = "same"
master_key_file = "same"
"#;
    let errors = load_and_validate_str(toml).expect_err("identical paths should fail");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn local_file_and_env_override() {
    Jail::expect_with(|jail| {
        isolate_user_config(jail);
        jail.create_file(
            "credstore.toml",
            r#"
[store]
credentials_file = "from-file.enc"
master_key_file = "from-file.key"
"#,
        )?;
        jail.set_env("CREDSTORE_STORE_MASTER_KEY_FILE", "from-env.key");
        jail.set_env("CREDSTORE_LOGGING_LEVEL", "warn");

        let config = load_config()?;
        assert_eq!(config.store.credentials_file, PathBuf::from("from-file.enc"));
        assert_eq!(config.store.master_key_file, PathBuf::from("from-env.key"));
        assert_eq!(config.logging.level, "warn");
        Ok(())
    });
}

#[test]
fn no_files_means_defaults() {
    Jail::expect_with(|jail| {
        isolate_user_config(jail);
        let config = load_config()?;
        assert_eq!(config.store.master_key_file, PathBuf::from("resources/master.key"));
        Ok(())
    });
}

#[test]
fn explicit_path_bypasses_hierarchy() {
    Jail::expect_with(|jail| {
        isolate_user_config(jail);
        jail.create_file("credstore.toml", "[store]\ncredentials_file = \"local.enc\"\n")?;
        jail.create_file("other.toml", "[store]\ncredentials_file = \"other.enc\"\n")?;

        let config = load_config_from_path(&jail.directory().join("other.toml"))?;
        assert_eq!(config.store.credentials_file, PathBuf::from("other.enc"));
        Ok(())
    });
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let errors = load_and_validate(Some(&dir.path().join("absent.toml")))
        .expect_err("missing explicit config must fail");
    assert!(errors[0].to_string().contains("not found"));
}

#[test]
fn unknown_key_in_local_file_is_diagnosed() {
    Jail::expect_with(|jail| {
        isolate_user_config(jail);
        jail.create_file("credstore.toml", "[store]\ncredentials_fiel = \"x\"\n")?;

        let errors = load_and_validate(None).expect_err("typo should be rejected");
        match &errors[0] {
            ConfigError::UnknownKey { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("credentials_file"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}
