//! Integration tests for layered configuration loading

use scopestack::config::{ConfigLoader, ENV_VAR};
use scopestack::storage::BackendKind;
use scopestack::Binding;
use std::fs;
use std::path::Path;

use crate::integration::with_xdg_env;

fn write_workspace_config(root: &Path, name: &str, contents: &str) {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_defaults_without_any_source() {
    with_xdg_env(|temp| {
        let workspace = temp.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Thread);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    });
}

#[test]
fn test_global_file_under_xdg_config_home() {
    with_xdg_env(|temp| {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.starts_with(temp.path().join(".config")));

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[storage]\nbackend = \"local\"\n").unwrap();

        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Local);
    });
}

#[test]
fn test_workspace_overrides_global() {
    with_xdg_env(|temp| {
        let global = ConfigLoader::global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(&global, "[storage]\nbackend = \"local\"\n[logging]\nlevel = \"warn\"\n").unwrap();

        write_workspace_config(temp.path(), "config.toml", "[storage]\nbackend = \"task\"\n");

        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Task);
        assert_eq!(config.logging.level, "warn");
    });
}

#[test]
fn test_env_specific_workspace_file() {
    with_xdg_env(|temp| {
        write_workspace_config(temp.path(), "config.toml", "[logging]\nlevel = \"info\"\n");
        write_workspace_config(temp.path(), "ci.toml", "[logging]\nlevel = \"error\"\n");
        std::env::set_var(ENV_VAR, "ci");

        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.logging.level, "error");
    });
}

#[test]
fn test_environment_overrides_files() {
    with_xdg_env(|temp| {
        write_workspace_config(temp.path(), "config.toml", "[storage]\nbackend = \"task\"\n");
        std::env::set_var("SCOPESTACK__STORAGE__BACKEND", "local");

        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.storage.backend, BackendKind::Local);
    });
}

#[test]
fn test_invalid_backend_is_rejected() {
    with_xdg_env(|temp| {
        write_workspace_config(temp.path(), "config.toml", "[storage]\nbackend = \"redis\"\n");
        assert!(ConfigLoader::load(temp.path()).is_err());
    });
}

#[test]
fn test_binding_from_loaded_config() {
    with_xdg_env(|temp| {
        write_workspace_config(temp.path(), "config.toml", "[storage]\nbackend = \"local\"\n");
        let config = ConfigLoader::load(temp.path()).unwrap();

        let contexts: Binding<i32> = Binding::from_config(&config.storage);
        assert_eq!(contexts.storage().kind(), BackendKind::Local);

        contexts.scope(|_| {
            contexts.set_checkpoint_value("a", 1).unwrap();
            assert_eq!(contexts.get_checkpoint_value("a"), Some(1));
        });
    });
}
