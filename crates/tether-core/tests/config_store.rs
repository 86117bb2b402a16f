use tempfile::TempDir;

use tether_core::config::{
    AccountEntry, ConfigScope, ConfigStore, KeyEntry, TetherConfig, load_merged,
};

fn store(temp: &TempDir, scope: ConfigScope) -> ConfigStore {
    ConfigStore::from_paths(scope, temp.path().join("config"), temp.path().join("project"))
}

#[test]
fn load_missing_returns_empty_config() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp, ConfigScope::Global);

    assert!(!store.exists());
    assert!(store.load_optional().unwrap().is_none());

    let config = store.load().unwrap();
    assert!(config.networks.is_empty());
    assert!(config.deployments.is_empty());
}

#[test]
fn save_then_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp, ConfigScope::Project);

    let mut config = TetherConfig::with_default_networks();
    config.accounts.insert(
        "alice".to_string(),
        AccountEntry {
            address: "0x01".parse().unwrap(),
            key: KeyEntry {
                index: 2,
                private_key: None,
                private_key_env: Some("ALICE_KEY".to_string()),
            },
        },
    );

    store.save(&config).unwrap();
    assert_eq!(
        store.config_path(),
        temp.path().join("project").join("tether.toml")
    );

    let loaded = store.load().unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn project_layer_may_deploy_to_globally_defined_account() {
    let temp = TempDir::new().unwrap();
    let global_dir = temp.path().join("config");
    let project_root = temp.path().join("project");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::create_dir_all(&project_root).unwrap();

    std::fs::write(
        global_dir.join("tether.toml"),
        r#"
[networks.emulator]
host = "http://127.0.0.1:8888"

[accounts.alice]
address = "0x01"
key = { private_key = "11" }
"#,
    )
    .unwrap();
    std::fs::write(
        project_root.join("tether.toml"),
        r#"
[networks.emulator]
host = "http://127.0.0.1:3569"

[contracts.A]
source = "A.cdc"

[[deployments]]
network = "emulator"
account = "alice"
contracts = ["A"]
"#,
    )
    .unwrap();

    let merged = load_merged(&global_dir, &project_root).unwrap();

    assert_eq!(merged.networks["emulator"].host, "http://127.0.0.1:3569");
    assert!(merged.accounts.contains_key("alice"));
    assert_eq!(merged.deployments.len(), 1);
}

#[test]
fn merged_configuration_is_validated() {
    let temp = TempDir::new().unwrap();
    let project_root = temp.path().join("project");
    std::fs::create_dir_all(&project_root).unwrap();
    std::fs::write(
        project_root.join("tether.toml"),
        r#"
[networks.emulator]
host = "http://127.0.0.1:8888"

[[deployments]]
network = "emulator"
account = "ghost"
contracts = []
"#,
    )
    .unwrap();

    let err = load_merged(&temp.path().join("config"), &project_root).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Merged configuration is invalid"));
    assert!(message.contains("unknown account 'ghost'"));
}

#[test]
fn missing_layers_ask_for_init() {
    let temp = TempDir::new().unwrap();

    let err = load_merged(&temp.path().join("config"), &temp.path().join("project")).unwrap_err();

    assert!(err.to_string().contains("Run 'tether init' first"));
}
