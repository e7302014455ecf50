    use super::*;

    fn configured() -> Config {
        let mut config = Config::default();
        config.scan.roots.push("/srv/services".to_string());
        config
    }

    #[test]
    fn test_validate_default_config() {
        let result = ConfigValidator::validate(&Config::default()).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "scan.roots"));
    }

    #[test]
    fn test_validate_configured() {
        let result = ConfigValidator::validate(&configured()).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_extension() {
        let mut config = configured();
        config.scan.extension = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "scan.extension"));
    }

    #[test]
    fn test_validate_dotted_extension() {
        let mut config = configured();
        config.scan.extension = ".toml".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains(".toml"));
    }

    #[test]
    fn test_validate_empty_root() {
        let mut config = configured();
        config.scan.roots.push("  ".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "scan.roots[1]"));
    }

    #[test]
    fn test_validate_zero_depth_allowed() {
        let mut config = configured();
        config.scan.max_depth = Some(0);

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_unknown_log_level() {
        let mut config = configured();
        config.logging.level = "verbose".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "logging.level"));
    }

    #[test]
    fn test_validate_log_level_case_insensitive() {
        let mut config = configured();
        config.logging.level = "DEBUG".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_into_error() {
        let mut config = configured();
        config.scan.extension = String::new();

        let err = ConfigValidator::validate(&config).unwrap().into_error().unwrap();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "scan.extension"));
    }

    #[test]
    fn test_validation_result_default() {
        let result = ValidationResult::default();
        assert!(result.is_valid());
        assert!(result.into_error().is_none());
    }
