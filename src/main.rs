use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Arg, Command};
use log::LevelFilter;
use phish_sentinel::url_features::FEATURE_NAMES;
use phish_sentinel::{EngineConfig, ModelRegistry, ScanEngine, ScanRequest};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phish-sentinel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing verdict engine combining URL, content and visual signals")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phish-sentinel.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("scan-url")
                .long("scan-url")
                .value_name("URL")
                .help("Scan a URL and print the verdict report as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("html-file")
                .long("html-file")
                .value_name("FILE")
                .help("HTML body to scan alongside --scan-url")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("screenshot-file")
                .long("screenshot-file")
                .value_name("FILE")
                .help("Screenshot image to scan alongside --scan-url")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .value_name("URL")
                .help("Print the lexical feature vector for a URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-domain")
                .long("check-domain")
                .value_name("DOMAIN")
                .help("Show trust and heuristic flags for a domain")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-signal detail")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        let config = EngineConfig::default();
        match config.to_file(generate_path) {
            Ok(()) => println!("Default configuration written to {generate_path}"),
            Err(e) => {
                eprintln!("Failed to write configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = if std::path::Path::new(config_path).exists() {
        match EngineConfig::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration from {config_path}: {e}");
                process::exit(1);
            }
        }
    } else {
        log::debug!("No configuration at {config_path}, using built-in defaults");
        EngineConfig::default()
    };

    if matches.get_flag("test-config") {
        match config.validate() {
            Ok(()) => {
                println!("Configuration OK");
                println!("  Trusted domains:  {}", config.trusted_domains.len());
                println!("  Suspicious TLDs:  {}", config.suspicious_tlds.len());
                println!("  Brand keywords:   {}", config.brand_keywords.len());
            }
            Err(e) => {
                eprintln!("Configuration invalid: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let engine = match ScanEngine::new(config, ModelRegistry::default()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to initialize engine: {e}");
            process::exit(1);
        }
    };

    if let Some(url) = matches.get_one::<String>("features") {
        let features = engine.extractor().extract(url);
        for (name, value) in FEATURE_NAMES.iter().zip(&features) {
            println!("{name:18} {value}");
        }
        return;
    }

    if let Some(domain) = matches.get_one::<String>("check-domain") {
        let trusted = engine.trust_filter().is_trusted(domain);
        let flags = engine.heuristics().analyze(domain);
        let summary = serde_json::json!({
            "domain": domain,
            "trusted": trusted,
            "heuristics": flags,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
        return;
    }

    if let Some(url) = matches.get_one::<String>("scan-url") {
        let html_content = match matches.get_one::<String>("html-file") {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Failed to read HTML file {path}: {e}");
                    process::exit(1);
                }
            },
            None => String::new(),
        };
        let screenshot_base64 = match matches.get_one::<String>("screenshot-file") {
            Some(path) => match std::fs::read(path) {
                Ok(bytes) => BASE64.encode(bytes),
                Err(e) => {
                    eprintln!("Failed to read screenshot file {path}: {e}");
                    process::exit(1);
                }
            },
            None => String::new(),
        };

        log::info!("No models are loaded; scan runs in degraded mode (whitelist and heuristics only)");
        let request = ScanRequest {
            url: url.clone(),
            html_content,
            screenshot_base64,
        };
        let report = engine.scan(&request).await;
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return;
    }

    eprintln!("No action specified. Try --scan-url, --features, --check-domain or --help.");
    process::exit(1);
}
