use crumbtrail::config::{Settings, read_settings};
use crumbtrail::handlers::*;
use crumbtrail::load_settings;
use crumbtrail_core::model::{BreadcrumbNode, PageRecord};
use crumbtrail_core::resolve_roots;
use crumbtrail_scanner::{Delay, HostMode};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use url::Url;

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://www.canada.ca/en.html");
    assert_eq!(result, Some("https://www.canada.ca/en.html".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    let result = parse_url_line("www.canada.ca/en.html");
    assert_eq!(result, Some("https://www.canada.ca/en.html".to_string()));
}

#[test]
fn test_parse_url_line_invalid() {
    let result = parse_url_line("not a valid url!!!");
    assert_eq!(result, None);
}

#[test]
fn test_parse_seed_line_with_prototype() {
    let seed = parse_seed_line(
        "https://www.canada.ca/en/a.html  https://cra-design.github.io/proto/a.html",
    )
    .unwrap();
    assert_eq!(seed.url, "https://www.canada.ca/en/a.html");
    assert_eq!(
        seed.prototype_url.as_deref(),
        Some("https://cra-design.github.io/proto/a.html")
    );

    let comma = parse_seed_line("https://www.canada.ca/b.html,https://test.canada.ca/b.html").unwrap();
    assert_eq!(comma.prototype_url.as_deref(), Some("https://test.canada.ca/b.html"));
}

#[test]
fn test_parse_url_line_normalises_like_url_args() {
    let from_file = parse_url_line("https://WWW.Canada.ca").unwrap();
    let from_arg = Url::parse("https://WWW.Canada.ca").unwrap();
    assert_eq!(from_file, "https://www.canada.ca/");
    assert_eq!(from_file, from_arg.as_str());

    let seed = parse_seed_line("www.canada.ca test.canada.ca").unwrap();
    assert_eq!(seed.url, "https://www.canada.ca/");
    assert_eq!(seed.prototype_url.as_deref(), Some("https://test.canada.ca/"));
}

#[test]
fn test_hosts_file_seed_matches_breadcrumb_urls() {
    let home = parse_seed_line("https://www.canada.ca").unwrap();
    let child = parse_seed_line("https://www.canada.ca/en.html").unwrap();

    let records = vec![
        PageRecord::new(home.url.clone(), "Home", Vec::new()),
        PageRecord::new(
            child.url,
            "English",
            vec![BreadcrumbNode::new("Home", "https://www.canada.ca/")],
        ),
    ];
    let roots = resolve_roots(&records);

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].url, home.url);
}

#[test]
fn test_parse_seed_line_without_prototype() {
    let seed = parse_seed_line("https://www.canada.ca/en/a.html").unwrap();
    assert_eq!(seed.prototype_url, None);
}

#[test]
fn test_load_seeds_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://www.canada.ca/en/a.html")?;
    writeln!(temp_file, "# comment")?;
    writeln!(temp_file)?; // Empty line
    writeln!(
        temp_file,
        "www.canada.ca/en/b.html\thttps://test.canada.ca/b.html"
    )?;

    let path = PathBuf::from(temp_file.path());
    let seeds = load_seeds_from_file(&path)?;

    assert_eq!(seeds.len(), 2);
    assert_eq!(seeds[0].url, "https://www.canada.ca/en/a.html");
    assert_eq!(seeds[1].url, "https://www.canada.ca/en/b.html");
    assert_eq!(
        seeds[1].prototype_url.as_deref(),
        Some("https://test.canada.ca/b.html")
    );

    Ok(())
}

#[test]
fn test_load_seeds_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_seeds_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No valid URLs"));
}

#[test]
fn test_load_seeds_from_file_missing() {
    let path = PathBuf::from("/nonexistent/seeds.txt");
    let result = load_seeds_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to read hosts file"));
}

#[test]
fn test_load_seeds_from_source_urls() {
    let urls = vec![
        Url::parse("https://www.canada.ca/a.html").unwrap(),
        Url::parse("https://www.canada.ca/b.html").unwrap(),
    ];
    let seeds = load_seeds_from_source(&urls, None).unwrap();

    assert_eq!(seeds.len(), 2);
    assert_eq!(seeds[1].url, "https://www.canada.ca/b.html");
}

#[test]
fn test_load_seeds_from_source_none() {
    let result = load_seeds_from_source(&[], None);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Either --url or --hosts-file"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.host_mode, HostMode::Prod);
    assert_eq!(settings.retry.retries, 5);
    assert_eq!(settings.fan_out.cap, 5);
    assert!(settings.hosts.require_https);
}

#[test]
fn test_partial_config_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    write!(
        temp_file,
        r#"{{
            "host_mode": "both",
            "concurrency": 8,
            "retry": {{ "delay": {{ "fixed": 250 }} }},
            "hosts": {{ "proto_hosts": ["localhost"], "require_https": false }}
        }}"#
    )?;

    let settings = read_settings(temp_file.path())?;

    assert_eq!(settings.host_mode, HostMode::Both);
    assert_eq!(settings.concurrency, 8);
    assert_eq!(settings.retry.delay, Delay::Fixed(250));
    assert_eq!(settings.retry.retries, 5);
    assert!(settings.hosts.proto_hosts.contains("localhost"));
    assert!(settings.hosts.prod_hosts.contains("www.canada.ca"));
    assert!(!settings.hosts.require_https);
    assert_eq!(settings.timeout_secs, 10);

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{{ not json").unwrap();

    let err = read_settings(temp_file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid config file"));
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let result = load_settings(Some("/nonexistent/crumbtrail/config.json"));
    assert!(result.is_err());
}
