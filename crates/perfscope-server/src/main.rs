use anyhow::Result;
use perfscope_common::types::ReportType;
use perfscope_rules::RuleSource;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use perfscope_server::analysis::run_analysis;
use perfscope_server::api::analyze::AnalyzeResponse;
use perfscope_server::app;
use perfscope_server::config::ServerConfig;
use perfscope_server::logging::generate_trace_id;
use perfscope_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  perfscope-server [config.toml]                                   Start the server");
    eprintln!("  perfscope-server check-rules <rules.yaml>                        Load and list a rule file");
    eprintln!("  perfscope-server analyze <jmeter|loadrunner> <report> [rules]    Analyze a report file offline");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("perfscope=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("check-rules") => {
            let rules_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("check-rules requires <rules.yaml> argument")
            })?;
            run_check_rules(rules_path)
        }
        Some("analyze") => {
            let report_type = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("analyze requires <jmeter|loadrunner> and <report> arguments")
            })?;
            let report_path = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("analyze requires <report> argument")
            })?;
            run_analyze(report_type, report_path, args.get(4).map(String::as_str))
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

fn rule_source_for(path: Option<&str>) -> RuleSource {
    path.map_or(RuleSource::Builtin, |p| RuleSource::File(PathBuf::from(p)))
}

/// Load a rule file the way the server would and list what survived.
#[allow(clippy::print_stdout)]
fn run_check_rules(rules_path: &str) -> Result<()> {
    let source = rule_source_for(Some(rules_path));
    let set = source.load()?;

    println!("{} rule(s) loaded from {}", set.len(), source);
    for rule in set.rules() {
        println!(
            "  [p{}] {}: {} {} {}",
            rule.effective_priority(),
            rule.id,
            rule.condition.metric,
            rule.condition.operator,
            rule.condition.threshold
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_analyze(report_type: &str, report_path: &str, rules_path: Option<&str>) -> Result<()> {
    let report_type: ReportType = report_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let content = std::fs::read_to_string(report_path)
        .map_err(|e| anyhow::anyhow!("Failed to read report '{}': {}", report_path, e))?;

    let outcome = run_analysis(report_type, &content, &rule_source_for(rules_path))?;
    let response = AnalyzeResponse::new(outcome.summary, outcome.suggestions, &generate_trace_id());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    tracing::info!(config = %config_path, "Loaded configuration");

    let http_addr: SocketAddr = format!("{}:{}", config.bind_addr, config.http_port).parse()?;
    let state = AppState::new(config);

    // Fail fast on a broken rule file; requests re-read it afterwards.
    let rules = state.rule_source.load()?;
    tracing::info!(source = %state.rule_source, rules = rules.len(), "Rules loaded");

    let http_app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(addr = %http_addr, "Server started");

    let result = axum::serve(listener, http_app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutting down gracefully");
        })
        .await;
    if let Err(e) = result {
        tracing::error!(error = %e, "HTTP server error");
    }

    tracing::info!("Server stopped");
    Ok(())
}
