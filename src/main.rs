use clap::{Arg, Command};
use log::LevelFilter;
use phishscan::{BatchRunner, Config, FeatureSet, PhishingDetector, RiskAssessment};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

#[derive(Serialize)]
struct UrlReport<'a> {
    features: &'a FeatureSet,
    assessment: &'a RiskAssessment,
}

#[tokio::main]
async fn main() {
    let matches = Command::new("phishscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing URL classifier")
        .long_about(
            "phishscan scores URLs with lexical checks, brand lookalike detection,\n\
             WHOIS domain age and a live login-form probe, and labels each one\n\
             legitimate or phishing. Without --url or --batch an interactive menu starts.",
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Analyse a single URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .short('b')
                .long("batch")
                .value_name("FILE")
                .help("Classify every row of a CSV dataset with a 'url' column")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for batch results (default: next to the dataset)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the single URL report as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishscan.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
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
        match Config::default().to_file(generate_path) {
            Ok(()) => println!("✅ Default configuration written to {generate_path}"),
            Err(e) => {
                eprintln!("❌ Failed to write configuration: {e:#}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("phishscan.yaml");

    let config = match Config::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    let detector = match PhishingDetector::from_config(&config) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("❌ Failed to initialise detector: {e:#}");
            process::exit(1);
        }
    };

    let output_dir = matches.get_one::<String>("output-dir").map(Path::new);

    if let Some(url) = matches.get_one::<String>("url") {
        check_url(&detector, url, matches.get_flag("json")).await;
    } else if let Some(dataset) = matches.get_one::<String>("batch") {
        if !process_dataset(&detector, Path::new(dataset), output_dir).await {
            process::exit(1);
        }
    } else {
        interactive_menu(&detector, output_dir).await;
    }
}

async fn check_url(detector: &PhishingDetector, url: &str, as_json: bool) {
    let (features, assessment) = detector.assess(url).await;

    if as_json {
        let report = UrlReport {
            features: &features,
            assessment: &assessment,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("❌ Failed to serialise report: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("====== URL ANALYSIS ======");
    println!("URL: {}", features.url);
    println!("URL Length: {}", features.url_length);
    println!("Has SSL: {}", features.has_ssl);
    println!(
        "Contains Suspicious Keywords: {}",
        features.has_suspicious_keyword
    );
    match &features.impersonated_brand {
        Some(brand) => println!(
            "Pattern/Impersonation Result: {} ({brand})",
            features.pattern_verdict
        ),
        None => println!("Pattern/Impersonation Result: {}", features.pattern_verdict),
    }
    println!("Domain Age (days): {}", features.domain_age_days);
    println!("Live Content: {}", features.probe);
    println!("Risk Score: {}", assessment.score);
    for reason in &assessment.reasons {
        println!("  • {reason}");
    }
    println!("Classification: {}", assessment.classification);
    println!();
}

/// Returns false when the dataset could not be processed
async fn process_dataset(
    detector: &PhishingDetector,
    dataset: &Path,
    output_dir: Option<&Path>,
) -> bool {
    match BatchRunner::new(detector).run(dataset, output_dir).await {
        Ok(summary) => {
            println!();
            println!("✅ Dataset processing complete.");
            println!(
                "   {} URLs: {} legitimate, {} phishing",
                summary.total, summary.legitimate, summary.phishing
            );
            println!("   - All results saved to: {}", summary.all_results.display());
            println!(
                "   - Legitimate sites saved to: {}",
                summary.legitimate_only.display()
            );
            println!();
            true
        }
        Err(e) => {
            eprintln!("❌ Error processing dataset: {e:#}");
            false
        }
    }
}

fn prompt(message: &str) -> Option<String> {
    print!("{message}");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

async fn interactive_menu(detector: &PhishingDetector, output_dir: Option<&Path>) {
    println!();
    println!("====== PHISHING DETECTOR ======");
    println!("Choose an option:");
    println!("1. Process URLs from a dataset (CSV file)");
    println!("2. Check a single URL");

    let Some(choice) = prompt("Enter 1 or 2: ") else {
        return;
    };

    match choice.as_str() {
        "1" => loop {
            let Some(path) = prompt("Enter the path to the dataset CSV file: ") else {
                return;
            };
            let path = path.trim_matches('"');

            if Path::new(path).exists() {
                if !process_dataset(detector, Path::new(path), output_dir).await {
                    process::exit(1);
                }
                break;
            }
            println!("❌ File not found. Please try again.");
            println!();
        },
        "2" => {
            if let Some(url) = prompt("Enter the URL to check: ") {
                check_url(detector, &url, false).await;
            }
        }
        _ => println!("❌ Invalid option. Please enter 1 or 2."),
    }
}
