use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!tapeloop::config::Config::exists().unwrap());

    // Loading without a file yields defaults
    let defaults = tapeloop::config::Config::load().unwrap();
    assert_eq!(defaults.browse_dir, ".");

    // Create and save a config
    let config = tapeloop::config::Config::new();
    config.save().unwrap();
    assert!(tapeloop::config::Config::exists().unwrap());

    // Test config mutation
    let docs = temp_dir.path().join("docs");
    let mut config = tapeloop::config::Config::load().unwrap();
    config
        .set_value("documents_dir", &docs.to_string_lossy())
        .unwrap();
    config.set_value("log_level", "warn").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = tapeloop::config::Config::load().unwrap();
    assert_eq!(reloaded.documents_path(), docs);
    assert_eq!(reloaded.recording_path(), docs.join("recording.wav"));
    assert_eq!(reloaded.log_level_filter().unwrap(), log::LevelFilter::Warn);

    // Test invalid key
    let mut config = tapeloop::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
}
