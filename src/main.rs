use std::fs::File;
use std::str::FromStr;
use std::sync::Arc;

use casequery::ToolHandler;
use casequery::cases::catalog::{self, MAJOR_CASES};
use casequery::cases::sitemap::render_sitemap;
use casequery::cases::slug::slug_to_case_name;
use casequery::cases::{CaseGenerator, CaseService, OpenAiCaseGenerator, server};
use casequery::cli;
use casequery::core::config::{self, CliOverrides, ResolvedConfig};
use clap::{Parser, Subcommand};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

#[derive(Parser)]
#[command(name = "casequery", about = "Supreme Court of Canada legal research assistant")]
struct Args {
    /// Assistant gateway base URL
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive research session (default)
    Chat {
        /// How tool calls from the assistant are answered
        #[arg(long, default_value_t, value_enum)]
        tool_handler: ToolHandler,
    },
    /// Serve case pages and the sitemap over HTTP
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
    },
    /// Generate the page content for one case
    Case { slug: String },
    /// List the major cases
    Cases,
    /// Print the sitemap
    Sitemap,
}

fn init_logging(config: &ResolvedConfig, echo_to_terminal: bool) {
    let level = LevelFilter::from_str(&config.log_level).unwrap_or(LevelFilter::Debug);
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    // Writes to casequery.log in current directory
    if let Ok(log_file) = File::create("casequery.log") {
        loggers.push(WriteLogger::new(level, log_config.clone(), log_file));
    }
    if echo_to_terminal {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            log_config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    let _ = CombinedLogger::init(loggers);
}

fn case_generator(config: &ResolvedConfig) -> Arc<dyn CaseGenerator> {
    Arc::new(OpenAiCaseGenerator::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    ))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("Ignoring config file: {e}");
        config::CaseQueryConfig::default()
    });
    let bind = match &args.command {
        Some(Commands::Serve { bind }) => bind.clone(),
        _ => None,
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            gateway_url: args.gateway_url.clone(),
            bind_address: bind,
        },
    );

    init_logging(&resolved, matches!(args.command, Some(Commands::Serve { .. })));
    log::info!("CaseQuery starting up, gateway {}", resolved.gateway_url);

    match args.command.unwrap_or(Commands::Chat {
        tool_handler: ToolHandler::default(),
    }) {
        Commands::Chat { tool_handler } => cli::run(resolved, tool_handler).await,
        Commands::Serve { .. } => {
            let service = Arc::new(CaseService::new(
                case_generator(&resolved),
                resolved.site_url.clone(),
            ));
            server::serve(&resolved.bind_address, service).await
        }
        Commands::Case { slug } => {
            let name = slug_to_case_name(&slug);
            if let Some(major) = catalog::find(&slug) {
                eprintln!("{} ({}, {})", major.name, major.area, major.importance.label());
            }
            let content = case_generator(&resolved)
                .generate(&name)
                .await
                .map_err(std::io::Error::other)?;
            let json = serde_json::to_string_pretty(&content).map_err(std::io::Error::other)?;
            println!("{json}");
            Ok(())
        }
        Commands::Cases => {
            for case in MAJOR_CASES {
                println!(
                    "{:<40} {:<60} {:<20} {}",
                    case.slug,
                    case.name,
                    case.area,
                    case.importance.label()
                );
            }
            Ok(())
        }
        Commands::Sitemap => {
            println!("{}", render_sitemap(&resolved.site_url, chrono::Utc::now()));
            Ok(())
        }
    }
}
