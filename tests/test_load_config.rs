use serial_test::serial;
use std::env;

use convert_bucket::load_config::{
    load_config, CONVERTAPI_BASE_URL_VAR, DEFAULT_CONVERTAPI_BASE_URL, REGION_VAR,
    STORAGE_BUCKET_VAR,
};

fn clear_env() {
    env::remove_var(STORAGE_BUCKET_VAR);
    env::remove_var(REGION_VAR);
    env::remove_var(CONVERTAPI_BASE_URL_VAR);
}

#[test]
#[serial]
fn test_load_config_reads_bucket_and_defaults() {
    clear_env();
    env::set_var(STORAGE_BUCKET_VAR, "converted-files");

    let config = load_config().expect("Config should load");

    assert_eq!(config.storage_bucket, "converted-files");
    assert_eq!(config.region, None);
    assert_eq!(config.convertapi_base_url, DEFAULT_CONVERTAPI_BASE_URL);

    let dispatch = config.dispatch_config();
    assert_eq!(dispatch.destination_bucket, "converted-files");
    assert_eq!(dispatch.source_folder, "original");
    assert_eq!(dispatch.destination_folder, "processed");
    clear_env();
}

#[test]
#[serial]
fn test_load_config_reads_region_and_base_url_override() {
    clear_env();
    env::set_var(STORAGE_BUCKET_VAR, "converted-files");
    env::set_var(REGION_VAR, "eu-west-1");
    env::set_var(CONVERTAPI_BASE_URL_VAR, "http://localhost:8080/");

    let config = load_config().expect("Config should load");

    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.convertapi_base_url, "http://localhost:8080");
    clear_env();
}

#[test]
#[serial]
fn test_load_config_fails_without_bucket() {
    clear_env();
    let err = load_config().expect_err("Missing bucket must fail");
    assert!(err.to_string().contains(STORAGE_BUCKET_VAR));

    env::set_var(STORAGE_BUCKET_VAR, "   ");
    assert!(load_config().is_err(), "Blank bucket must fail");
    clear_env();
}

#[test]
#[serial]
fn test_load_config_rejects_non_http_base_url() {
    clear_env();
    env::set_var(STORAGE_BUCKET_VAR, "converted-files");
    env::set_var(CONVERTAPI_BASE_URL_VAR, "ftp://example.com");

    assert!(load_config().is_err());
    clear_env();
}
