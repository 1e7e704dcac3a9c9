use std::fs;
use std::path::PathBuf;

use corn_config::defaults::KEY_HTTP_PORT;
use corn_config::{ConfigError, ConfigSources, load};
use corn_test_support::fixtures::temp_dir;

#[test]
fn properties_file_supplies_values_below_environment() -> anyhow::Result<()> {
    let dir = temp_dir("corn-config-")?;
    let path = dir.path().join("corn.yaml");
    fs::write(
        &path,
        "CORN_TARGET: /var/lib/corn/work/\nCORN_CLEANUP: false\nCORN_HTTP_PORT: 9090\nCORN_DATA: ~\n",
    )?;

    let sources = ConfigSources::new()
        .with_properties_file(&path)?
        .with_env(KEY_HTTP_PORT, "9191");
    let config = load(&sources)?;

    assert_eq!(config.target_root, PathBuf::from("/var/lib/corn/work/"));
    assert!(!config.cleanup);
    assert_eq!(config.http_port, 9191);
    assert_eq!(config.data_root, PathBuf::from("data/"));
    Ok(())
}

#[test]
fn nested_properties_are_rejected() -> anyhow::Result<()> {
    let dir = temp_dir("corn-config-")?;
    let path = dir.path().join("corn.yaml");
    fs::write(&path, "CORN_TARGET:\n  nested: true\n")?;

    let result = ConfigSources::new().with_properties_file(&path);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidField {
            reason: "not_scalar",
            ..
        })
    ));
    Ok(())
}

#[test]
fn missing_properties_file_reports_path() -> anyhow::Result<()> {
    let dir = temp_dir("corn-config-")?;
    let path = dir.path().join("absent.yaml");

    match ConfigSources::new().with_properties_file(&path) {
        Err(ConfigError::PropertiesRead { path: reported, .. }) => {
            assert_eq!(reported, path);
        }
        other => anyhow::bail!("expected read failure, got {other:?}"),
    }
    Ok(())
}
