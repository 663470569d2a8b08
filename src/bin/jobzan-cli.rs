use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use jobzan::client::{JobFilter, JobzanClient};
use jobzan::config::{load_config, AppConfig};
use jobzan::domain::{Commute, JobInput, JobStatus};
use jobzan::observability::logging;

#[derive(Parser)]
#[command(name = "jobzan-cli")]
#[command(about = "Command-line client for the Jobzan job tracker API", long_about = None)]
struct Cli {
    /// TOML config file; its [client] section supplies defaults.
    #[arg(short, long, env = "JOBZAN_CONFIG")]
    config: Option<PathBuf>,

    /// API base URL (overrides config).
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token for the API.
    #[arg(short, long, env = "JOBZAN_API_TOKEN")]
    token: Option<String>,

    /// Attempt budget per request (overrides config).
    #[arg(long)]
    max_retries: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Status,
    /// Manage job leads and applications
    #[command(subcommand)]
    Jobs(JobCommands),
    /// Manage employers
    #[command(subcommand)]
    Employers(EmployerCommands),
    /// Average salary by status and commute type
    Analytics,
}

#[derive(Subcommand)]
enum JobCommands {
    /// List jobs, optionally filtered
    List {
        #[arg(long)]
        status: Option<JobStatus>,
        #[arg(long)]
        commute: Option<Commute>,
        #[arg(long)]
        employer_id: Option<String>,
    },
    /// Show one job
    Get { id: String },
    /// Record a new job
    Add(AddJob),
    /// Delete a job
    Delete { id: String },
}

#[derive(Args)]
struct AddJob {
    #[arg(long)]
    employer_id: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    salary: f64,
    #[arg(long, default_value = "lead")]
    status: JobStatus,
    #[arg(long, default_value = "remote")]
    commute: Commute,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long)]
    link: Option<String>,
}

#[derive(Subcommand)]
enum EmployerCommands {
    /// List employers; with --near, include distance in miles
    List {
        /// Reference point as LAT,LON
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        near: Option<(f64, f64)>,
    },
    /// Show one employer
    Get { id: String },
    /// Delete an employer and all of its jobs
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| "expected LAT,LON".to_string())?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("latitude: {}", e))?;
    let lon = lon.trim().parse::<f64>().map_err(|e| format!("longitude: {}", e))?;
    Ok((lat, lon))
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" declines.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => AppConfig::default(),
    };
    logging::init(&config.observability);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut client_config = config.client;
    if let Some(url) = cli.url {
        client_config.base_url = url;
    }
    if let Some(max_retries) = cli.max_retries {
        client_config.retries.max_retries = max_retries;
    }

    let mut client = JobzanClient::from_config(&client_config)?;
    let config_token = config
        .auth
        .enabled
        .then_some(config.auth.api_token.as_str());
    if let Some(token) = cli.token.as_deref().or(config_token) {
        client = client.with_token(token)?;
    }

    match cli.command {
        Commands::Status => print_json(&client.health().await?)?,
        Commands::Analytics => print_json(&client.salary_pivot().await?)?,
        Commands::Jobs(command) => run_jobs(&client, command).await?,
        Commands::Employers(command) => run_employers(&client, command).await?,
    }
    Ok(())
}

async fn run_jobs(
    client: &JobzanClient<jobzan::net::ReqwestTransport>,
    command: JobCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        JobCommands::List {
            status,
            commute,
            employer_id,
        } => {
            let filter = JobFilter {
                status,
                commute,
                employer_id,
            };
            print_json(&client.list_jobs(&filter).await?)?;
        }
        JobCommands::Get { id } => print_json(&client.get_job(&id).await?)?,
        JobCommands::Add(job) => {
            let input = JobInput {
                employer_id: job.employer_id,
                title: job.title,
                salary: job.salary,
                status: job.status,
                commute: job.commute,
                description: job.description,
                notes: job.notes,
                job_description_link: job.link,
            };
            print_json(&client.create_job(&input).await?)?;
        }
        JobCommands::Delete { id } => {
            client.delete_job(&id).await?;
            println!("Deleted job {}", id);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployerWithDistance {
    #[serde(flatten)]
    employer: jobzan::domain::Employer,
    distance_miles: f64,
}

async fn run_employers(
    client: &JobzanClient<jobzan::net::ReqwestTransport>,
    command: EmployerCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        EmployerCommands::List { near: None } => print_json(&client.list_employers().await?)?,
        EmployerCommands::List {
            near: Some((lat, lon)),
        } => {
            let mut rows: Vec<EmployerWithDistance> = client
                .list_employers()
                .await?
                .into_iter()
                .map(|employer| {
                    let distance = employer.distance_miles_from(lat, lon);
                    EmployerWithDistance {
                        employer,
                        distance_miles: (distance * 100.0).round() / 100.0,
                    }
                })
                .collect();
            rows.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
            print_json(&rows)?;
        }
        EmployerCommands::Get { id } => print_json(&client.get_employer(&id).await?)?,
        EmployerCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete employer {} and all associated jobs?", id))? {
                println!("Cancelled");
                return Ok(());
            }
            match client.delete_employer(&id).await {
                Ok(()) => println!("Deleted employer {}", id),
                Err(e) if e.status() == Some(404) => {
                    return Err(format!("employer {} not found", id).into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
