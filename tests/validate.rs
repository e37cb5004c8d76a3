//! Integration tests for the `validate` command.
use solar_sizing::cli::handle_validate_command;
use solar_sizing::log::is_logger_initialised;
use solar_sizing::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("SOLAR_SIZING_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    handle_validate_command(&get_model_dir(), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());

    // A confidence level of 1 would need infinite storage
    let dir = tempdir().unwrap();
    for entry in fs::read_dir(get_model_dir()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    let project_path = dir.path().join("project.toml");
    let project = fs::read_to_string(&project_path)
        .unwrap()
        .replace("confidence_level = 0.7", "confidence_level = 1.0");
    fs::write(&project_path, project).unwrap();
    assert!(handle_validate_command(dir.path(), Some(Settings::default())).is_err());
}
