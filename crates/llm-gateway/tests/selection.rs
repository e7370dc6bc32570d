use std::env;

use locus_llm_gateway::{build_backend, GatewayError, ProviderConfig, ProviderSelection};
use serial_test::serial;

const KEY_VARS: &[&str] = &[
    "LOCUS_OPENAI_API_KEY",
    "OPENAI_API_KEY",
    "LOCUS_ANTHROPIC_API_KEY",
    "ANTHROPIC_API_KEY",
    "CLAUDE_API_KEY",
    "LOCUS_ZHIPU_API_KEY",
    "ZHIPU_API_KEY",
];

fn with_env_vars<F: FnOnce() -> T, T>(vars: &[(&str, &str)], f: F) -> T {
    let previous: Vec<(String, Option<String>)> = KEY_VARS
        .iter()
        .map(|key| (key.to_string(), env::var(key).ok()))
        .collect();
    for key in KEY_VARS {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }
    let result = f();
    for (key, value) in previous {
        match value {
            Some(val) => env::set_var(&key, val),
            None => env::remove_var(&key),
        }
    }
    result
}

#[test]
#[serial]
fn missing_key_names_the_environment_variables() {
    let err = with_env_vars(&[], || {
        build_backend(ProviderSelection::Anthropic, &ProviderConfig::default())
            .err()
            .expect("missing key")
    });
    assert!(matches!(err, GatewayError::MissingApiKey { .. }));
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}

#[test]
#[serial]
fn placeholder_environment_key_counts_as_missing() {
    let err = with_env_vars(&[("OPENAI_API_KEY", "your-api-key")], || {
        build_backend(ProviderSelection::OpenAi, &ProviderConfig::default())
            .err()
            .expect("missing key")
    });
    assert!(err.is_configuration());
}

#[test]
#[serial]
fn environment_key_configures_backend() {
    let backend = with_env_vars(&[("ZHIPU_API_KEY", "zk-123")], || {
        build_backend(ProviderSelection::Zhipu, &ProviderConfig::default()).expect("backend")
    });
    assert_eq!(backend.label(), "zhipu");
}

#[test]
#[serial]
fn explicit_key_wins_over_environment() {
    let backend = with_env_vars(&[], || {
        build_backend(
            ProviderSelection::OpenAi,
            &ProviderConfig {
                api_key: Some("sk-explicit".into()),
                ..ProviderConfig::default()
            },
        )
        .expect("backend")
    });
    assert_eq!(backend.label(), "openai");
}
