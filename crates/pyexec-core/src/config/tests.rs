use super::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_are_valid() {
    let config = ExecutorConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.image, DEFAULT_IMAGE);
    assert_eq!(config.backend, ContainerBackend::Cli);
    assert_eq!(config.network_mode, "host");
    assert_eq!(config.container_workdir, "/app");
    assert_eq!(config.bootstrap_path_in_container(), "/app/run.sh");
}

#[test]
fn test_empty_document_yields_defaults() {
    let config = ConfigLoader::from_str("   \n").unwrap();
    assert_eq!(config, ExecutorConfig::default());
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
backend: daemon
timeout_secs: 30
max_concurrent: 2
workspace_root: /var/tmp/pyexec
"#;
    let config = ConfigLoader::from_str(yaml).unwrap();
    assert_eq!(config.backend, ContainerBackend::Daemon);
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.max_concurrent, 2);
    assert_eq!(config.workspace_root, Some(PathBuf::from("/var/tmp/pyexec")));
    assert_eq!(config.image, DEFAULT_IMAGE);
    assert_eq!(config.runtime_binary, "docker");
}

#[test]
fn test_invalid_values_are_rejected() {
    let err = ConfigLoader::from_str("timeout_secs: 0").unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));

    let err = ConfigLoader::from_str("max_concurrent: 0").unwrap_err();
    assert!(err.to_string().contains("max_concurrent"));

    let err = ConfigLoader::from_str("container_workdir: app").unwrap_err();
    assert!(err.to_string().contains("absolute"));

    let err = ConfigLoader::from_str("image: ''").unwrap_err();
    assert!(err.to_string().contains("image"));
}

#[test]
fn test_unknown_backend_fails_to_parse() {
    let err = ConfigLoader::from_str("backend: podman-remote").unwrap_err();
    assert!(err.to_string().contains("Failed to parse YAML config"));

    assert!("podman-remote".parse::<ContainerBackend>().is_err());
    assert_eq!("DAEMON".parse::<ContainerBackend>().unwrap(), ContainerBackend::Daemon);
}

#[test]
fn test_trailing_slash_in_workdir() {
    let config = ExecutorConfig {
        container_workdir: "/work/".to_string(),
        ..Default::default()
    };
    assert_eq!(config.bootstrap_path_in_container(), "/work/run.sh");
}

#[test]
fn test_root_workdir_is_rejected() {
    for workdir in ["/", "//"] {
        let config = ExecutorConfig {
            container_workdir: workdir.to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("container root"), "{}", err);
    }

    let err = ConfigLoader::from_str("container_workdir: /").unwrap_err();
    assert!(err.to_string().contains("container_workdir"));
}

#[tokio::test]
async fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "image: python:3.12-slim").unwrap();
    writeln!(file, "runtime_binary: podman").unwrap();

    let config = ConfigLoader::from_file(file.path()).await.unwrap();
    assert_eq!(config.image, "python:3.12-slim");
    assert_eq!(config.runtime_binary, "podman");
}

#[tokio::test]
async fn test_resolve_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("pyexec.yaml");

    let config = ConfigLoader::resolve(None, Some(&missing)).await.unwrap();
    assert_eq!(config, ExecutorConfig::default());

    let err = ConfigLoader::resolve(Some(&missing), None).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[tokio::test]
async fn test_resolve_uses_existing_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("pyexec.yaml");
    std::fs::write(&fallback, "timeout_secs: 12\n").unwrap();

    let config = ConfigLoader::resolve(None, Some(&fallback)).await.unwrap();
    assert_eq!(config.timeout_secs, 12);
}
