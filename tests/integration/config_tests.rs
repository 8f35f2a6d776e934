use clap::Parser;
use dupsort::cli::Cli;
use dupsort::config::Config;
use dupsort::duplicates::{MemberOrder, SortDirection};
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Figment directly, without Env, so other tests' variables cannot leak in
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::extract(figment).unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.order, SortDirection::Descending);
    assert_eq!(config.members, MemberOrder::Path);
    assert!(config.extension.is_none());
}

#[test]
fn test_config_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 2\nparanoid = false\n").unwrap();

    // Neither value changes which sets other tests find
    std::env::set_var("DUPSORT_IO_THREADS", "3");
    std::env::set_var("DUPSORT_PARANOID", "true");

    let config = Config::load(Some(&path)).unwrap();

    std::env::remove_var("DUPSORT_IO_THREADS");
    std::env::remove_var("DUPSORT_PARANOID");

    assert_eq!(config.io_threads, 3);
    assert!(config.paranoid);
}

#[test]
fn test_config_partial_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "members = \"discovery\"\n").unwrap();

    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&path));
    let config = Config::extract(figment).unwrap();

    assert_eq!(config.members, MemberOrder::Discovery);
    assert_eq!(config.order, SortDirection::Descending);
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_invalid_toml_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = \"many\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid configuration"));
}

#[test]
fn test_cli_flags_win_over_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "order = \"asc\"\nstrict = true\nskip_empty = true\nextension = \"log\"\n",
    )
    .unwrap();
    let config_arg = path.to_string_lossy().to_string();

    let cli = Cli::try_parse_from([
        "dupsort",
        "prune",
        "/data",
        "--config",
        config_arg.as_str(),
        "--order",
        "desc",
        "--members",
        "discovery",
    ])
    .unwrap();
    let config = Config::from_cli(cli.command.scan_args(), false).unwrap();

    assert_eq!(config.order, SortDirection::Descending);
    assert_eq!(config.members, MemberOrder::Discovery);
    // A boolean flag left off cannot switch a file setting back off
    assert!(config.strict);
    assert!(config.skip_empty);
    assert_eq!(config.extension.as_deref(), Some("log"));
    assert!(!config.trash);
}

#[test]
fn test_config_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.toml");
    let config = Config {
        io_threads: 6,
        trash: true,
        members: MemberOrder::Discovery,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("io_threads = 6"));
    assert!(text.contains("members = \"discovery\""));

    let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&path));
    assert_eq!(Config::extract(figment).unwrap(), config);
}
