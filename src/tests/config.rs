use crate::config::Config;

#[test]
fn test_load_creates_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("regdash");

    let config = Config::load_with(&base).unwrap();
    assert_eq!(config, Config::default());
    assert!(base.join("config.yaml").exists());

    // Second load reads the file it wrote.
    assert_eq!(Config::load_with(&base).unwrap(), config);
}

#[test]
fn test_partial_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "source: /srv/registry\nfetch_threads: 0\nperf:\n  timeout_secs: 5\n",
    )
    .unwrap();

    let config = Config::load_with(dir.path()).unwrap();
    assert_eq!(config.source, "/srv/registry");
    // Zero threads is bumped to one.
    assert_eq!(config.fetch_threads, 1);
    assert_eq!(config.perf.timeout_secs, 5);
    assert_eq!(config.perf.engine_url, Config::default().perf.engine_url);
    assert_eq!(config.taskcluster_root_url, Config::default().taskcluster_root_url);
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "fetch_threads: [1, 2\n").unwrap();
    let err = Config::load_with(dir.path()).unwrap_err();
    assert!(err.to_string().contains("is malformed"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    std::fs::write(dir.path().join("config.yaml"), "source: \"  \"\n").unwrap();
    assert!(Config::load_with(dir.path()).is_err());

    std::fs::write(dir.path().join("config.yaml"), "fetch_timeout_secs: 0\n").unwrap();
    assert!(Config::load_with(dir.path()).is_err());

    std::fs::write(dir.path().join("config.yaml"), "perf:\n  engine_url: not a url\n").unwrap();
    let err = Config::load_with(dir.path()).unwrap_err();
    assert!(err.to_string().contains("perf.engine_url"));
}

#[test]
fn test_save_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.source = "http://localhost:8000/registry/".to_string();
    config.perf.workdir = "/tmp/perf".into();
    config.save(dir.path()).unwrap();

    assert_eq!(Config::load_with(dir.path()).unwrap(), config);
}
