use tempfile::TempDir;
use zlog::{Error, LevelMap, LevelPredicate, LoggerConfig, LoggerCore};

#[test]
fn test_install_global_once() {
    let dir = TempDir::new_in(".").unwrap();
    // Bare name: leading separators are dropped from base paths
    let base = dir.path().file_name().unwrap().to_string_lossy();
    let config = LoggerConfig::new(base, 1, 0, 0, false);
    let core = LoggerCore::new(config);

    let mut streams = LevelMap::new();
    streams.insert("error".to_string(), LevelPredicate::ERROR);
    let logger = core.initialize(&streams);

    logger.install_global().unwrap();
    tracing::error!("through the global default");

    let path = logger.sinks()[0].file_path().unwrap().to_string();
    assert!(dir.path().join("error.log").exists());
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("through the global default"));

    assert!(matches!(logger.install_global(), Err(Error::AlreadyInstalled)));
}
