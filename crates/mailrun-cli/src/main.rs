//! `mailrun`: one batch run of the mail queue.
//!
//! Reactivates today's suspended tasks, sends every queued `mailer` task and
//! moves the files into their terminal directories. Logs go to
//! `<logs-dir>/mail.log`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use mailrun_core::config::{Directories, LogLabels, SmtpSettings, TlsMode};
use mailrun_core::impls::SmtpMailTransport;
use mailrun_core::{MailrunError, PipelineBuilder, RunSummary};

const LOG_FILE: &str = "mail.log";

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "mailrun", about = "Send queued mail tasks over SMTP", version, long_about = None)]
struct Cli {
    /// SMTP server host.
    #[arg(short = 'a', long, default_value = "smtp.mail.ru")]
    address: String,

    /// SMTP server port.
    #[arg(short, long, default_value_t = 465)]
    port: u16,

    /// Upgrade the connection with STARTTLS.
    #[arg(short = 'c', long)]
    starttls: bool,

    /// Implicit TLS (SMTPS). Takes precedence over --starttls.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    ssl: bool,

    /// SMTP login; empty disables authentication.
    #[arg(short = 'L', long, default_value = "user@mail.com")]
    login: String,

    #[arg(short = 'P', long, default_value = "password")]
    password: String,

    #[arg(short = 't', long, default_value = "templates/")]
    templates_dir: PathBuf,

    #[arg(short = 'w', long, default_value = "tasks/")]
    tasks_dir: PathBuf,

    #[arg(short = 'm', long, default_value = "mail/")]
    mail_dir: PathBuf,

    #[arg(short = 'l', long, default_value = "logs/")]
    logs_dir: PathBuf,

    /// Recipient profile store (JSON object keyed by address).
    #[arg(long, default_value = "db/persons.json")]
    profiles: PathBuf,

    /// SMTP connect/read timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Substitution key logged as the recipient's company.
    #[arg(long, default_value = LogLabels::DEFAULT_COMPANY_KEY)]
    company_key: String,

    /// Substitution key logged as the recipient's project.
    #[arg(long, default_value = LogLabels::DEFAULT_PROJECT_KEY)]
    project_key: String,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn smtp(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.address.clone(),
            port: self.port,
            login: self.login.clone(),
            password: self.password.clone(),
            tls: TlsMode::from_flags(self.ssl, self.starttls),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    fn directories(&self) -> Directories {
        Directories {
            tasks: self.tasks_dir.clone(),
            templates: self.templates_dir.clone(),
            mail: self.mail_dir.clone(),
            logs: self.logs_dir.clone(),
            profiles: self.profiles.clone(),
        }
    }

    fn labels(&self) -> LogLabels {
        LogLabels {
            company_key: self.company_key.clone(),
            project_key: self.project_key.clone(),
        }
    }
}

fn main() -> Result<(), MailrunError> {
    let args = Cli::parse();
    init_tracing(&args.logs_dir, args.log_format)?;
    let smtp = args.smtp();
    info!(
        host = %smtp.host,
        port = smtp.port,
        tls = ?smtp.tls,
        auth = smtp.has_credentials(),
        "mailrun start"
    );

    let summary = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| MailrunError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(&args))
        .inspect_err(|err| error!(error = %err, kind = ?err.kind(), "run aborted"))?;

    info!(summary = %summary_json(&summary), "mailrun finished");
    Ok(())
}

async fn run(args: &Cli) -> Result<RunSummary, MailrunError> {
    let transport = SmtpMailTransport::from_settings(&args.smtp())?;

    let mut pipeline = PipelineBuilder::new()
        .with_directories(&args.directories())?
        .transport(Arc::new(transport))
        .labels(args.labels())
        .build()?;

    pipeline.run().await
}

fn summary_json(summary: &RunSummary) -> String {
    serde_json::to_string(summary).unwrap_or_else(|_| format!("{summary:?}"))
}

/// Log to `<logs_dir>/mail.log`, appending, without ANSI colours.
fn init_tracing(logs_dir: &Path, log_format: LogFormat) -> Result<(), MailrunError> {
    fs::create_dir_all(logs_dir).map_err(|err| {
        MailrunError::Config(format!("cannot create {}: {err}", logs_dir.display()))
    })?;
    let path = logs_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| MailrunError::Config(format!("cannot open {}: {err}", path.display())))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| MailrunError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| MailrunError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
