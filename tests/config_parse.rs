use frea::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../frea.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.output.dir_name, "converted");
    assert_eq!(cfg.engine.timeout_seconds, 0);
    assert!(!cfg.engine.pandoc_exe.is_empty());
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[output]\ndefault_format = \"html\"\n").expect("parse TOML");
    assert_eq!(cfg.output.default_format, "html");
    assert_eq!(cfg.output.dir_name, "converted");
    assert_eq!(cfg.logging.level, "info");
    assert_eq!(cfg.ui.theme, "dark");
}

fn load_raw(raw: &str) -> anyhow::Result<Config> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frea.toml");
    std::fs::write(&path, raw).unwrap();
    Config::load(&path)
}

#[test]
fn defaults_and_example_validate() {
    assert!(Config::default().validate().is_ok());
    let cfg = load_raw(include_str!("../frea.example.toml")).expect("example config loads");
    assert_eq!(cfg.ui.theme, "dark");
}

#[test]
fn unknown_theme_is_rejected_at_load() {
    let err = load_raw("[ui]\ntheme = \"solarized\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("unknown ui.theme: solarized"));
}

#[test]
fn unknown_default_format_is_rejected_at_load() {
    let err = load_raw("[output]\ndefault_format = \"tex\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("unknown output.default_format: tex"));
    assert!(load_raw("[output]\ndefault_format = \"PDF\"\n").is_ok());
}
