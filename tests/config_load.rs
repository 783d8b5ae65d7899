// tests/config_load.rs
use std::{env, fs};

use news_briefing::config::briefing::{BriefingConfig, DEFAULT_LLM_MODEL, ENV_CONFIG_PATH};

const OVERRIDE_VARS: &[&str] = &[
    ENV_CONFIG_PATH,
    "GROQ_API_KEY",
    "LLM_BASE_URL",
    "LLM_MODEL",
    "BRIGHTDATA_API_KEY",
    "WEB_UNLOCKER_ZONE",
    "PROXY_ENABLED",
    "RATE_LIMIT_PER_SEC",
    "AUDIO_OUTPUT_DIR",
    "TTS_LANGUAGE",
];

fn clear_env() {
    for v in OVERRIDE_VARS {
        env::remove_var(v);
    }
}

#[serial_test::serial]
#[test]
fn defaults_when_no_file_exists() {
    clear_env();
    // Isolate CWD so the repo's config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    let cfg = BriefingConfig::load().unwrap();
    assert_eq!(cfg.llm.model, DEFAULT_LLM_MODEL);
    assert_eq!(cfg.fetch.rate_per_sec, 5);
    assert_eq!(cfg.fetch.cooldown_ms, 1_000);
    assert_eq!(cfg.audio.language, "en");
    assert!(!cfg.proxy_usable());

    env::set_current_dir(old).unwrap();
}

#[serial_test::serial]
#[test]
fn file_then_env_overrides() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("briefing.toml");
    fs::write(
        &path,
        r#"
[llm]
api_key = "ENV"
model = "file-model"

[fetch]
rate_per_sec = 2
max_attempts = 4

[proxy]
enabled = false
"#,
    )
    .unwrap();

    env::set_var(ENV_CONFIG_PATH, &path);
    env::set_var("GROQ_API_KEY", "gsk_test");
    env::set_var("LLM_MODEL", "env-model");
    env::set_var("RATE_LIMIT_PER_SEC", "9");
    env::set_var("PROXY_ENABLED", "true");
    env::set_var("BRIGHTDATA_API_KEY", "bd_key");
    env::set_var("WEB_UNLOCKER_ZONE", "unlocker");
    env::set_var("TTS_LANGUAGE", "DE");

    let cfg = BriefingConfig::load().unwrap();
    assert_eq!(cfg.llm.api_key, "gsk_test", "ENV placeholder resolves from GROQ_API_KEY");
    assert_eq!(cfg.llm.model, "env-model");
    assert_eq!(cfg.fetch.rate_per_sec, 9);
    assert_eq!(cfg.fetch.max_attempts, 4, "file value kept when env is silent");
    assert!(cfg.proxy_usable());
    assert_eq!(cfg.audio.language, "de");

    clear_env();
}

#[serial_test::serial]
#[test]
fn missing_env_path_is_an_error() {
    clear_env();
    env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/briefing.toml");
    assert!(BriefingConfig::load().is_err());
    clear_env();
}

#[serial_test::serial]
#[test]
fn unparsable_rate_override_is_ignored() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("briefing.toml");
    fs::write(&path, "[fetch]\nrate_per_sec = 3\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, &path);
    env::set_var("RATE_LIMIT_PER_SEC", "fast");

    let cfg = BriefingConfig::load().unwrap();
    assert_eq!(cfg.fetch.rate_per_sec, 3);
    clear_env();
}
