//! Integration tests for configuration loading at startup
//!
//! The server must refuse to start when credentials are missing or malformed.

use std::collections::HashMap;
use token_service::config::{Config, ConfigError, DEFAULT_BIND_ADDRESS, DEFAULT_WEB_ROOT};
use token_test_utils::{test_env_vars, TEST_ACCOUNT_SID};

#[test]
fn test_complete_environment_loads() {
    let config = Config::from_vars(&test_env_vars()).expect("fixture env should load");

    assert_eq!(config.credentials.account_sid(), TEST_ACCOUNT_SID);
    assert_eq!(config.bind_address.to_string(), DEFAULT_BIND_ADDRESS);
    assert_eq!(config.web_root.to_string_lossy(), DEFAULT_WEB_ROOT);
}

#[test]
fn test_each_missing_credential_fails_startup() {
    for name in ["ACCOUNT_SID", "API_KEY", "API_SECRET"] {
        let mut vars = test_env_vars();
        vars.remove(name);

        let result = Config::from_vars(&vars);

        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref var)) if var == name),
            "Missing {} should fail with MissingEnvVar, got {:?}",
            name,
            result.err()
        );
    }
}

#[test]
fn test_empty_environment_fails_startup() {
    assert!(Config::from_vars(&HashMap::new()).is_err());
}

#[test]
fn test_malformed_account_sid_fails_startup() {
    let mut vars = test_env_vars();
    vars.insert("ACCOUNT_SID".to_string(), "not-a-sid".to_string());

    assert!(matches!(
        Config::from_vars(&vars),
        Err(ConfigError::InvalidAccountSid)
    ));
}
