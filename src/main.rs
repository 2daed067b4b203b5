//! alumni-hub entry point

use alumni_hub::{CriteriaKey, EngineeringField, FilterCriteria};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

/// alumni-hub: role-scoped alumni directory
#[derive(Parser, Debug)]
#[command(name = "alumni-hub")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Sign-in used to scope one-shot commands.
#[derive(ClapArgs, Debug, Clone)]
struct LoginArgs {
    /// Admin email
    #[arg(long, requires = "password")]
    email: Option<String>,
    /// Admin password
    #[arg(long, requires = "email")]
    password: Option<String>,
}

impl From<LoginArgs> for cli::Credentials {
    fn from(args: LoginArgs) -> Self {
        Self {
            email: args.email,
            password: args.password,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API server
    Serve {
        /// HTTP port. If not specified, uses config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
    /// Search batchmates
    Search {
        /// Free text matched against names, nick name and email
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        calling_name: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        nick_name: Option<String>,
        #[arg(long)]
        working_place: Option<String>,
        /// WhatsApp number (substring)
        #[arg(long)]
        whatsapp: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        /// Exact country name, or "all"
        #[arg(long)]
        country: Option<String>,
        /// Engineering field, or "all"
        #[arg(long)]
        field: Option<String>,
        /// Maximum rows to print
        #[arg(short, long)]
        limit: Option<usize>,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Show dashboard statistics
    Stats {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Generate a field or country report
    Report {
        /// Fields to include (repeatable); none means all accessible fields
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<EngineeringField>,
        /// Report on one country instead
        #[arg(long, conflicts_with = "fields")]
        country: Option<String>,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Print the SHA-256 digest of a password for the accounts table
    HashPassword {
        password: String,
    },
}

fn parse_field(s: &str) -> Result<EngineeringField, String> {
    s.parse()
}

fn init_logging(json_logs: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alumni_hub=info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !matches!(args.command, Command::Serve { .. }) {
        // Minimal logging for CLI commands
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        Command::Serve { port, json_logs } => {
            init_logging(json_logs);
            tracing::info!("Starting alumni-hub v{}", env!("CARGO_PKG_VERSION"));

            let mut config = cli::load_config(&args.config)?;
            if let Some(p) = port {
                config.server.port = p;
            }
            alumni_hub::run_http(config).await
        }
        Command::Search {
            query,
            calling_name,
            full_name,
            nick_name,
            working_place,
            whatsapp,
            mobile,
            country,
            field,
            limit,
            login,
        } => {
            let mut criteria = FilterCriteria::new();
            for (key, value) in [
                (CriteriaKey::CallingName, calling_name),
                (CriteriaKey::FullName, full_name),
                (CriteriaKey::NickName, nick_name),
                (CriteriaKey::WorkingPlace, working_place),
                (CriteriaKey::WhatsappMobile, whatsapp),
                (CriteriaKey::Mobile, mobile),
                (CriteriaKey::Country, country),
                (CriteriaKey::Field, field),
            ] {
                criteria.set(key, value);
            }

            let config = cli::load_config(&args.config)?;
            cli::run_search(
                config,
                login.into(),
                criteria.normalized(),
                query,
                limit,
                args.json,
            )
            .await
        }
        Command::Stats { login } => {
            let config = cli::load_config(&args.config)?;
            cli::run_stats(config, login.into(), args.json).await
        }
        Command::Report {
            fields,
            country,
            login,
        } => {
            let config = cli::load_config(&args.config)?;
            cli::run_report(config, login.into(), fields, country, args.json).await
        }
        Command::HashPassword { password } => cli::run_hash_password(&password, args.json),
    }
}
