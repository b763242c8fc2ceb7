use attendance_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 9] = [
    "APP_ENV",
    "HOST_BIND_ADDR",
    "API_PROXY_PREFIX",
    "API_PROXY_TARGET",
    "API_PROXY_CHANGE_ORIGIN",
    "API_PROXY_TIMEOUT_SECS",
    "ASSET_DIR",
    "ALLOWED_HOSTS",
    "ALLOWED_ORIGINS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with every config variable cleared, then restores the originals.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(String, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_env_defaults() {
    let config = run_with_env(AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:5173");
    assert_eq!(config.api_prefix, "/api");
    assert_eq!(config.api_target.scheme_str(), Some("http"));
    assert_eq!(
        config.api_target.authority().map(|a| a.as_str()),
        Some("127.0.0.1:8090")
    );
    assert!(config.change_origin);
    assert_eq!(config.proxy_timeout, Duration::from_secs(30));
    assert_eq!(config.asset_dir.to_str(), Some("dist"));
    assert!(config.allowed_hosts.is_empty());
    assert_eq!(
        config.allowed_origins,
        vec!["http://localhost:8090", "http://127.0.0.1:8090"]
    );
}

#[test]
#[serial]
fn test_production_fail_fast_without_target() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_PROXY_TARGET"
    );
}

#[test]
#[serial]
fn test_production_with_target() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_PROXY_TARGET", "http://attendance-api:8090");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(
        config.api_target.authority().map(|a| a.as_str()),
        Some("attendance-api:8090")
    );
}

#[test]
#[serial]
fn test_overrides_are_parsed() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("HOST_BIND_ADDR", "127.0.0.1:8080");
            env::set_var("API_PROXY_PREFIX", "/backend");
            env::set_var("API_PROXY_CHANGE_ORIGIN", "false");
            env::set_var("API_PROXY_TIMEOUT_SECS", "5");
            env::set_var("ASSET_DIR", "/srv/portal");
            env::set_var("ALLOWED_HOSTS", "10680706bkfz8.vicp.fun, portal.example.edu ,");
            env::set_var("ALLOWED_ORIGINS", "https://portal.example.edu");
        }
        AppConfig::load()
    });

    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.api_prefix, "/backend");
    assert!(!config.change_origin);
    assert_eq!(config.proxy_timeout, Duration::from_secs(5));
    assert_eq!(config.asset_dir.to_str(), Some("/srv/portal"));
    assert_eq!(
        config.allowed_hosts,
        vec!["10680706bkfz8.vicp.fun", "portal.example.edu"]
    );
    assert_eq!(config.allowed_origins, vec!["https://portal.example.edu"]);
}

#[test]
#[serial]
fn test_rejects_non_http_target() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("API_PROXY_TARGET", "https://attendance-api");
            }
            AppConfig::load()
        })
    });

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_rejects_relative_prefix() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("API_PROXY_PREFIX", "api");
            }
            AppConfig::load()
        })
    });

    assert!(result.is_err());
}

#[test]
fn test_default_config_is_local() {
    let config = AppConfig::default();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_prefix, "/api");
    assert!(config.change_origin);
}
