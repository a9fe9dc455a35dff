use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.embedding.protocol, "http");
    assert_eq!(config.embedding.host, "localhost");
    assert_eq!(config.embedding.port, 11434);
    assert_eq!(config.embedding.model, "nomic-embed-text:latest");
    assert_eq!(config.embedding.dimension, DEFAULT_EMBEDDING_DIMENSION);
    assert_eq!(config.search.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(config.search.max_top_k, 10);
    assert_eq!(config.search.snippet_length, 500);
    assert_eq!(config.search.cache_ttl_secs, 86400);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.embedding.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.dimension = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.search.similarity_threshold = 1.5;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.search.max_top_k = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.search.cache_ttl_secs = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn endpoint_url_generation() {
    let config = Config::default();
    let url = config
        .embedding
        .endpoint_url()
        .expect("should generate endpoint_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_config_uses_defaults() {
    let partial_toml = r#"
        [embedding]
        host = "custom-host"
    "#;

    let config: Config = toml::from_str(partial_toml).expect("should parse toml successfully");
    assert_eq!(config.embedding.host, "custom-host");
    assert_eq!(config.embedding.port, 11434);
    assert_eq!(config.search.max_top_k, 10);
}

#[test]
fn load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let config = Config::load(temp_dir.path()).expect("should load defaults successfully");
    assert_eq!(config.embedding, EmbeddingConfig::default());
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");

    let mut config = Config::load(temp_dir.path()).expect("should load defaults successfully");
    config.embedding.host = "embeddings.internal".to_string();
    config.embedding.port = 8080;
    config.search.similarity_threshold = 0.1;
    config.save().expect("should save config successfully");

    let reloaded = Config::load(temp_dir.path()).expect("should reload config successfully");
    assert_eq!(reloaded.embedding.host, "embeddings.internal");
    assert_eq!(reloaded.embedding.port, 8080);
    assert_eq!(reloaded.search.similarity_threshold, 0.1);
}

#[test]
fn load_rejects_invalid_saved_config() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join("config.toml");

    let invalid_toml = r#"
        [embedding]
        protocol = "ftp"
    "#;
    std::fs::write(&config_path, invalid_toml).expect("should write config successfully");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn derived_paths() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = Config::load(temp_dir.path()).expect("should load defaults successfully");

    assert_eq!(config.config_file_path(), temp_dir.path().join("config.toml"));
    assert_eq!(config.database_path(), temp_dir.path().join("artifacts.db"));
    assert_eq!(config.storage_dir(), temp_dir.path().join("storage"));
}

#[test]
fn error_display_messages() {
    let errors = vec![
        ConfigError::InvalidProtocol("ftp".to_string()),
        ConfigError::InvalidPort(0),
        ConfigError::InvalidModel(String::new()),
        ConfigError::InvalidUrl("invalid-url".to_string()),
        ConfigError::InvalidSimilarityThreshold(2.0),
    ];

    for error in errors {
        let message = format!("{error}");
        assert!(!message.is_empty());
        assert!(message.len() > 10);
    }
}
