#![deny(unsafe_code)]

//! Quarry CLI: builds discovery requests and evaluates runtime conditions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quarry_config::{AppConfig, DiscoveryConfig};
use quarry_core::{
    ClasspathRoots, ConditionEvaluator, FixedRuntime, JavaRuntime, NamePattern, RangeDeclaration,
    RequestTranslator, RunOptions, RuntimeCondition, RuntimeEnvironment, build_info,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Quarry: assemble test discovery requests.
#[derive(Parser)]
#[command(name = "quarry", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "quarry.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a discovery request and print it as JSON.
    Discover(DiscoverArgs),

    /// Evaluate a runtime-range condition against the current runtime.
    Condition(ConditionArgs),

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Show build information.
    Version,
}

#[derive(Args, Debug, Default)]
struct DiscoverArgs {
    /// Scan classpath roots (or the given root paths) instead of named tests.
    #[arg(long)]
    scan_classpath: bool,

    /// Only keep tests whose fully-qualified name matches this expression.
    #[arg(short = 'n', long = "include-classname", value_name = "REGEX")]
    include_classname: Option<String>,

    /// Only keep tests carrying at least one of these tags.
    #[arg(short = 't', long = "include-tag", value_name = "TAG")]
    include_tags: Vec<String>,

    /// Drop tests carrying any of these tags.
    #[arg(short = 'T', long = "exclude-tag", value_name = "TAG")]
    exclude_tags: Vec<String>,

    /// Test names, or root paths with --scan-classpath.
    #[arg(value_name = "ARGS")]
    arguments: Vec<String>,
}

#[derive(Args, Debug)]
struct ConditionArgs {
    /// Skip (rather than run) when the runtime is inside the range.
    #[arg(long)]
    disabled: bool,

    /// Lowest runtime version in the range (inclusive).
    #[arg(long)]
    min: Option<String>,

    /// Highest runtime version in the range (inclusive).
    #[arg(long)]
    max: Option<String>,

    /// Candidate name reported in errors.
    #[arg(long, default_value = "<command-line>")]
    candidate: String,

    /// Use this runtime version instead of detecting one.
    #[arg(long)]
    runtime_version: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    // -v flags override the configured level; RUST_LOG overrides both
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(version = %build_info::version_string(), "Starting quarry");
    if !cli.config.exists() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Discover(args) => cmd_discover(&config, args)?,
        Commands::Condition(args) => cmd_condition(&config, args)?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
        Commands::Version => println!("quarry {}", build_info::version_string()),
    }

    Ok(())
}

fn cmd_discover(config: &AppConfig, args: DiscoverArgs) -> Result<()> {
    let options = run_options(&config.discovery, args)?;
    let roots =
        ClasspathRoots::from_env().with_extra_roots(config.discovery.extra_roots.iter().cloned());
    let request = RequestTranslator::new(roots).to_discovery_request(&options)?;

    let json = serde_json::to_string_pretty(&request).context("failed to render request")?;
    println!("{json}");
    Ok(())
}

fn cmd_condition(config: &AppConfig, args: ConditionArgs) -> Result<()> {
    let runtime = runtime_for(config, args.runtime_version.clone());
    let declaration = RangeDeclaration::new(args.min.as_deref(), args.max.as_deref());
    let condition = if args.disabled {
        RuntimeCondition::DisabledForRange(declaration)
    } else {
        RuntimeCondition::EnabledForRange(declaration)
    };

    let result = ConditionEvaluator::new(runtime).evaluate(&args.candidate, Some(&condition))?;
    println!("{}: {}", result.state, result.reason);
    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path)
            .await
            .with_context(|| format!("failed to load config '{}'", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

/// Merge command-line flags over the configured discovery defaults.
///
/// Tags accumulate; a pattern given on the command line replaces the
/// configured one; either source can switch on classpath scanning.
fn run_options(defaults: &DiscoveryConfig, args: DiscoverArgs) -> Result<RunOptions> {
    let mut options = RunOptions::from_config(defaults)?;
    options.run_all_tests |= args.scan_classpath;
    options.arguments = args.arguments;
    if let Some(pattern) = args.include_classname.as_deref() {
        options.class_name_pattern = Some(NamePattern::new(pattern)?);
    }
    options.include_tags.extend(args.include_tags);
    options.exclude_tags.extend(args.exclude_tags);
    Ok(options)
}

/// Flag override, then configured version, then the detected launcher version.
fn runtime_for(
    config: &AppConfig,
    version_override: Option<String>,
) -> Box<dyn RuntimeEnvironment> {
    match version_override.or_else(|| config.runtime.version.clone()) {
        Some(version) => Box::new(FixedRuntime::new(version)),
        None => Box::new(JavaRuntime::new(config.runtime.java_command.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_test_utils::config::TestConfigBuilder;

    #[test]
    fn test_cli_parses_discover_flags() {
        let cli = Cli::try_parse_from([
            "quarry",
            "discover",
            "-n",
            ".*Tests",
            "-t",
            "fast",
            "-T",
            "slow",
            "--exclude-tag",
            "flaky",
            "a.First",
            "b.Second",
        ])
        .unwrap();
        let Commands::Discover(args) = cli.command else {
            panic!("expected discover");
        };
        assert_eq!(args.include_classname.as_deref(), Some(".*Tests"));
        assert_eq!(args.include_tags, vec!["fast"]);
        assert_eq!(args.exclude_tags, vec!["slow", "flaky"]);
        assert_eq!(args.arguments, vec!["a.First", "b.Second"]);
        assert!(!args.scan_classpath);
    }

    #[test]
    fn test_flags_merge_over_config() {
        let config = TestConfigBuilder::new()
            .class_name_pattern(".*IT")
            .include_tag("fast")
            .exclude_tag("slow")
            .build();
        let args = DiscoverArgs {
            scan_classpath: true,
            include_classname: Some(".*Tests".to_string()),
            include_tags: vec!["unit".to_string()],
            exclude_tags: vec!["slow".to_string()],
            arguments: vec!["build/classes".to_string()],
        };

        let options = run_options(&config.discovery, args).unwrap();

        assert!(options.run_all_tests);
        assert_eq!(options.arguments, vec!["build/classes"]);
        assert_eq!(
            options.class_name_pattern,
            Some(NamePattern::new(".*Tests").unwrap())
        );
        assert_eq!(
            options.include_tags.into_iter().collect::<Vec<_>>(),
            vec!["fast", "unit"]
        );
        assert_eq!(
            options.exclude_tags.into_iter().collect::<Vec<_>>(),
            vec!["slow"]
        );
    }

    #[test]
    fn test_config_scan_applies_without_flag() {
        let config = TestConfigBuilder::new().scan_classpath(true).build();
        let options = run_options(&config.discovery, DiscoverArgs::default()).unwrap();
        assert!(options.run_all_tests);
        assert!(options.class_name_pattern.is_none());
    }

    #[test]
    fn test_invalid_flag_pattern_is_an_error() {
        let args = DiscoverArgs {
            include_classname: Some("(".to_string()),
            ..Default::default()
        };
        assert!(run_options(&DiscoveryConfig::default(), args).is_err());
    }

    #[test]
    fn test_runtime_override_precedence() {
        let config = TestConfigBuilder::new().runtime_version("11").build();

        let flagged = runtime_for(&config, Some("17".to_string()));
        assert_eq!(flagged.current_version().unwrap(), "17");

        let configured = runtime_for(&config, None);
        assert_eq!(configured.current_version().unwrap(), "11");
    }
}
