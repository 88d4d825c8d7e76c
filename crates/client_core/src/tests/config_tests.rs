use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("person_browser_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("client.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_yields_defaults() {
    let settings =
        load_settings_from(Path::new("/definitely/not/here/client.toml"), no_env).expect("load");
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "persons_api_url = \"https://people.example.com/api/\"\npage_size = 25\n",
    );
    let settings = load_settings_from(&path, no_env).expect("load");
    assert_eq!(settings.persons_api_url, "https://people.example.com/api");
    assert_eq!(settings.page_size, 25);
    assert_eq!(
        settings.demography_api_url,
        ClientSettings::default().demography_api_url
    );
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file_and_prefixed_key_wins() {
    let path = temp_settings_file("persons_api_url = \"http://file:1\"\n");
    let env_values: HashMap<&str, &str> = HashMap::from([
        ("PERSONS_API_URL", "http://plain:2"),
        ("APP__PERSONS_API_URL", "http://prefixed:3"),
        ("DEMOGRAPHY_API_URL", "http://demo:4/"),
        ("APP__PAGE_SIZE", " 50 "),
    ]);
    let settings =
        load_settings_from(&path, |key| env_values.get(key).map(|v| v.to_string())).expect("load");

    assert_eq!(settings.persons_api_url, "http://prefixed:3");
    assert_eq!(settings.demography_api_url, "http://demo:4");
    assert_eq!(settings.page_size, 50);
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn rejects_non_http_urls_and_zero_page_size() {
    let env_values = HashMap::from([("PERSONS_API_URL", "ftp://people")]);
    let err = load_settings_from(Path::new("/nope.toml"), |key| {
        env_values.get(key).map(|v| v.to_string())
    })
    .expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidUrl { key: "persons_api_url", .. }));

    let env_values = HashMap::from([("APP__PAGE_SIZE", "0")]);
    let err = load_settings_from(Path::new("/nope.toml"), |key| {
        env_values.get(key).map(|v| v.to_string())
    })
    .expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidPageSize(_)));
}

#[test]
fn malformed_file_is_reported() {
    let path = temp_settings_file("page_size = \"many\"\n");
    let err = load_settings_from(&path, no_env).expect_err("must fail");
    assert!(err.to_string().contains("failed to parse settings file"));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
