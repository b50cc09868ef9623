// Configuration comes from the environment, optionally seeded from a .env
// file. Uses a throwaway variable name so other tests' environments are
// untouched.

use std::env;
use std::fs;

use tempfile::TempDir;

#[test]
fn test_env_file_values_are_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join(".env");
    fs::write(
        &env_path,
        "HELIO_TEST_ONLY_KEY=sk-from-env-file\nHELIO_TEST_ONLY_CAP=5\n",
    )
    .unwrap();

    dotenvy::from_path(&env_path).unwrap();

    assert_eq!(env::var("HELIO_TEST_ONLY_KEY").unwrap(), "sk-from-env-file");
    let cap: usize = env::var("HELIO_TEST_ONLY_CAP").unwrap().parse().unwrap();
    assert_eq!(cap, 5);
}

#[test]
fn test_recommend_cap_default() {
    // No HELIO_RECOMMEND_CAP in the test environment, so the observed
    // default applies.
    assert_eq!(*helio::config::RECOMMEND_CAP, 3);
}
