use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use survey_analytics::analytics::aggregate::analyze_survey;
use survey_analytics::analytics::SectionStatistics;
use survey_analytics::comparison::Classification;
use survey_analytics::config::{Config, ConfigOverrides};
use survey_analytics::output::csv::{
    comparison_to_csv, overall_to_csv, report_to_csv, sections_to_csv, surveys_to_csv,
};
use survey_analytics::output::json::render_json;
use survey_analytics::output::table::{
    render_comparison_table, render_overall_table, render_sections_table, render_surveys_table,
};
use survey_analytics::report::{build_comparison, build_report, ComparisonView, OverallStatistics};
use survey_analytics::responses::SurveyData;
use survey_analytics::server::run_server;
use survey_analytics::source::{build_source, SurveySummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "survey-analytics",
    about = "Rating statistics and survey/audit comparison for survey responses"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Read surveys from a JSON export instead of the configured source
    #[arg(short, long)]
    data: Option<String>,
    /// Read surveys from a PostgREST-style backend at this URL
    #[arg(long = "base-url")]
    base_url: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Difference band within which averages count as similar
    #[arg(short, long)]
    tolerance: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Surveys,
    Sections {
        survey_id: String,
        #[arg(long)]
        audit: bool,
    },
    Overall {
        survey_id: String,
    },
    Compare {
        survey_id: String,
        /// Only show rows with this classification
        #[arg(long)]
        only: Option<Classification>,
    },
    Report {
        survey_id: String,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        data_path: cli.data.clone(),
        base_url: cli.base_url.clone(),
        tolerance: cli.tolerance,
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    config.validate()?;

    let source = build_source(&config)?;
    info!("using {} survey source", source.name());

    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, source, addr).await;
    }

    match &cli.command {
        Commands::Surveys => {
            let surveys = source.list_surveys().await?;
            print_surveys(&surveys, cli.output)?;
        }
        Commands::Sections { survey_id, audit } => {
            let data = source
                .fetch_survey(survey_id)
                .await
                .with_context(|| format!("failed loading survey {survey_id}"))?;
            let analytics = analyze_survey(&data);
            let set = if *audit {
                analytics.audit
            } else {
                analytics.survey
            };
            print_sections(&set.per_section, cli.output)?;
        }
        Commands::Overall { survey_id } => {
            let data = source
                .fetch_survey(survey_id)
                .await
                .with_context(|| format!("failed loading survey {survey_id}"))?;
            let report = build_report(&data);
            print_overall(&report.overall_statistics, cli.output)?;
        }
        Commands::Compare { survey_id, only } => {
            let data = source
                .fetch_survey(survey_id)
                .await
                .with_context(|| format!("failed loading survey {survey_id}"))?;
            let mut view = build_comparison(&data, config.tolerance());
            if let Some(classification) = only {
                view.rows.retain(|row| row.classification == *classification);
            }
            print_comparison(&view, cli.output)?;
        }
        Commands::Report { survey_id } => {
            let data = source
                .fetch_survey(survey_id)
                .await
                .with_context(|| format!("failed loading survey {survey_id}"))?;
            print_report(&data, cli.output)?;
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        if config_path.exists() {
            warn!("config already exists at {}, leaving it untouched", config_path.display());
        } else {
            Config::write_template(config_path)?;
            println!("Wrote config template to {}", config_path.display());
        }
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn print_surveys(surveys: &[SurveySummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_surveys_table(surveys)),
        OutputFormat::Json => println!("{}", render_json(surveys)?),
        OutputFormat::Csv => print!("{}", surveys_to_csv(surveys)?),
    }
    Ok(())
}

fn print_sections(sections: &[SectionStatistics], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_sections_table(sections)),
        OutputFormat::Json => println!("{}", render_json(sections)?),
        OutputFormat::Csv => print!("{}", sections_to_csv(sections)?),
    }
    Ok(())
}

fn print_overall(overall: &OverallStatistics, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_overall_table(overall)),
        OutputFormat::Json => println!("{}", render_json(overall)?),
        OutputFormat::Csv => print!("{}", overall_to_csv(overall)?),
    }
    Ok(())
}

fn print_comparison(view: &ComparisonView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_comparison_table(view)),
        OutputFormat::Json => println!("{}", render_json(view)?),
        OutputFormat::Csv => print!("{}", comparison_to_csv(view)?),
    }
    Ok(())
}

fn print_report(data: &SurveyData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let analytics = analyze_survey(data);
            let title = data.title.as_deref().unwrap_or("untitled");
            println!("Survey {} ({title})", data.survey_id);
            println!("{}", render_sections_table(&analytics.survey.per_section));
            println!("Audit");
            println!("{}", render_sections_table(&analytics.audit.per_section));
            println!("Overall");
            println!(
                "{}",
                render_overall_table(&OverallStatistics {
                    survey: analytics.survey.overall,
                    audit: analytics.audit.overall,
                })
            );
        }
        OutputFormat::Json => println!("{}", render_json(&build_report(data))?),
        OutputFormat::Csv => print!("{}", report_to_csv(&analyze_survey(data))?),
    }
    Ok(())
}
