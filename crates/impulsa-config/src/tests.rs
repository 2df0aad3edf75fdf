#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_defaults_are_development_friendly() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.environment, "development");
        assert!(!config.auth.require_api_key);
        assert!(config.rate_limit.enabled);
        assert!(config.database.max_connections > config.database.min_connections);
    }

    #[test]
    fn test_empty_toml_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.database.run_schema);
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml = r#"
            environment = "production"

            [server]
            port = 8080

            [auth]
            require_api_key = true
            api_keys = ["stars-2025-key"]

            [rate_limit]
            max_requests = 5
            window_secs = 10
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(config.auth.require_api_key);
        assert_eq!(config.auth.api_keys, vec!["stars-2025-key"]);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_parse_api_keys_trims_and_drops_blanks() {
        let keys = parse_api_keys("alpha, beta ,,gamma,");
        assert_eq!(keys, vec!["alpha", "beta", "gamma"]);
        assert!(parse_api_keys("").is_empty());
        assert!(parse_api_keys(" , ").is_empty());
    }
}
