use std::sync::Arc;
use tempfile::TempDir;
use zlog::{LevelMap, LevelPredicate, LogFormat, LoggerConfig, LoggerCore};

fn logger_in(dir: &TempDir, format: LogFormat) -> Arc<zlog::Logger> {
    let base = dir.path().file_name().unwrap().to_string_lossy();
    let config = LoggerConfig::new(base, 1, 0, 0, false).with_format(format);
    let mut streams = LevelMap::new();
    streams.insert("error".to_string(), LevelPredicate::ERROR);
    LoggerCore::new(config).initialize(&streams)
}

#[test]
fn test_helpers_record_the_calling_file() {
    let dir = TempDir::new_in(".").unwrap();
    let logger = logger_in(&dir, LogFormat::Text);

    let line = line!() + 1;
    logger.error("from the caller");

    let content = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
    assert!(content.contains("from the caller"));
    assert!(content.contains(&format!("tests/caller.rs:{}", line)));
}

#[test]
fn test_log_records_the_calling_file_in_json() {
    let dir = TempDir::new_in(".").unwrap();
    let logger = logger_in(&dir, LogFormat::Json);

    logger.log(tracing::Level::ERROR, "json caller");

    let content = std::fs::read_to_string(dir.path().join("error.log")).unwrap();
    let record: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(record["fields"]["message"], "json caller");
    assert!(record["fields"]["caller"]
        .as_str()
        .unwrap()
        .contains("tests/caller.rs"));
}
