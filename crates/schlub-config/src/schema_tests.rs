use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.scan.roots.is_empty());
    assert_eq!(config.scan.extension, "toml");
    assert!(config.scan.max_depth.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_partial_sections_use_defaults() {
    let config: Config = toml::from_str(
        r#"
        [scan]
        roots = ["/srv/services"]
        "#,
    )
    .unwrap();
    assert_eq!(config.scan.roots, vec!["/srv/services"]);
    assert_eq!(config.scan.extension, "toml");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_root_paths_expand_tilde() {
    let scan = ScanConfig {
        roots: vec!["~/services".to_string(), "/abs/path".to_string()],
        ..ScanConfig::default()
    };
    let paths = scan.root_paths();
    assert!(!paths[0].starts_with("~"));
    assert!(paths[0].ends_with("services"));
    assert_eq!(paths[1], PathBuf::from("/abs/path"));
}

#[test]
fn test_root_paths_match_loader_expansion() {
    let scan = ScanConfig {
        roots: vec!["~/services".to_string()],
        ..ScanConfig::default()
    };
    assert_eq!(
        scan.root_paths(),
        vec![PathBuf::from(ConfigLoader::expand_path("~/services"))]
    );
}

#[test]
fn test_config_serialization_roundtrip() {
    let mut config = Config::default();
    config.scan.max_depth = Some(3);
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.scan.max_depth, Some(3));
    assert_eq!(parsed.scan.extension, "toml");
}

#[test]
fn test_unset_max_depth_not_serialized() {
    let text = toml::to_string(&Config::default()).unwrap();
    assert!(!text.contains("max_depth"));
}
