use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::application::{AppError, GeminiClient, LedgerService, SmtpMailer};
use crate::config::{AdviceConfig, SmtpConfig};
use crate::domain::{
    Cents, DATE_FORMAT, DEFAULT_MONTHLY_BUDGET, Record, RecordForm, RecordId, format_cents,
    month_of, parse_cents, parse_month, totals,
};
use crate::storage::Repository;

mod render;

use render::{
    print_categories, print_category_summary, print_charts, print_records, print_totals,
};

/// Cashbook - personal income and expense ledger
#[derive(Parser)]
#[command(name = "cashbook")]
#[command(about = "Track dated income and expenses in a CSV ledger, with summaries, charts, budget checks, advice and email reports")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "CASHBOOK_LEDGER", default_value = "records.csv")]
    pub ledger: PathBuf,

    /// Category list file path
    #[arg(long, env = "CASHBOOK_CATEGORIES", default_value = "categories.txt")]
    pub categories: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub advice: AdviceConfig,

    #[command(flatten)]
    pub smtp: SmtpConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a record (positive amount = income, negative = expense)
    #[command(allow_negative_numbers = true)]
    Add {
        /// Amount (e.g., "1200", "-45.50")
        amount: String,

        /// Category label
        #[arg(short, long)]
        category: String,

        /// Date of the record (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Edit a record; fields that are not given keep their current value
    #[command(allow_negative_numbers = true)]
    Update {
        /// Record id (as shown by `list`)
        id: RecordId,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD); only checked when given
        #[arg(short, long)]
        date: Option<String>,

        /// New note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Delete one or more records by id
    Delete {
        /// Record ids (as shown by `list`)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<RecordId>,
    },

    /// List records
    List {
        /// Only records from this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// Display order
        #[arg(long, value_enum, default_value_t = SortKey::Entry)]
        sort: SortKey,
    },

    /// Find records whose category or note contains a keyword (case-sensitive)
    Search {
        /// Keyword; empty lists every record
        #[arg(default_value = "")]
        keyword: String,
    },

    /// Show total, income, expense and net
    Totals,

    /// Net amount per category
    Summary,

    /// Expense share by category and monthly net trend
    Charts {
        /// Width of the widest bar, in characters
        #[arg(long, default_value_t = 40)]
        width: usize,
    },

    /// Category list management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Compare a month's expenses against a budget
    Budget {
        /// Budget amount (e.g., "20000")
        #[arg(short, long)]
        amount: Option<String>,

        /// Month to analyze (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        /// Also email the report to this address
        #[arg(long)]
        email: Option<String>,
    },

    /// Ask the advice service for suggestions based on the ledger
    Advice,

    /// Ask the advice service a question about the ledger
    Chat {
        /// The question
        #[arg(required = true, trailing_var_arg = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Email a month's records as a CSV attachment
    Email {
        /// Recipient address
        to: String,

        /// Month to send (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Export records to CSV or JSON
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only records from this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },

    /// Read commands from stdin, one per line, against a single open ledger
    Shell,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoryCommands {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name (must be unique)
        name: String,
    },

    /// Delete a category (records keep their category text)
    Delete {
        /// Category name
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Ledger order
    Entry,
    Date,
    Amount,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// One line of input in shell mode.
#[derive(Parser)]
#[command(name = "cashbook", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let repo = Repository::new(&self.ledger, &self.categories);
        let service = LedgerService::open(repo)?;
        debug!(
            ledger = %self.ledger.display(),
            records = service.len(),
            "Ledger opened"
        );

        let mut session = Session {
            service,
            advice: self.advice,
            smtp: self.smtp,
        };

        match self.command {
            Commands::Shell => session.run_shell().await,
            command => session.execute(command).await,
        }
    }
}

/// An open ledger plus the integration settings, shared by every command of a
/// shell session.
pub struct Session {
    service: LedgerService,
    advice: AdviceConfig,
    smtp: SmtpConfig,
}

impl Session {
    pub fn new(service: LedgerService, advice: AdviceConfig, smtp: SmtpConfig) -> Self {
        Self {
            service,
            advice,
            smtp,
        }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                amount,
                category,
                date,
                note,
            } => {
                let date = date.unwrap_or_else(today);
                let mut form = RecordForm::new(date, category, amount);
                form.note = note;

                let record = self.service.add(&form)?;
                println!("Added record {}: {}", record.id, describe(&record));
            }

            Commands::Update {
                id,
                amount,
                category,
                date,
                note,
            } => {
                let form = RecordForm {
                    date,
                    category,
                    amount,
                    note,
                };
                let record = self.service.edit(id, &form)?;
                println!("Updated record {}: {}", record.id, describe(&record));
            }

            Commands::Delete { ids } => {
                let removed = self.service.delete(&ids)?;
                for record in &removed {
                    println!("Deleted record {}: {}", record.id, describe(record));
                }
            }

            Commands::List { month, sort } => {
                let mut records = match month {
                    Some(month) => self.service.records_in_month(&parse_month(&month)?),
                    None => self.service.records().to_vec(),
                };
                sort_records(&mut records, sort);
                print_records(&records);
                print_totals(&totals(&records));
            }

            Commands::Search { keyword } => {
                let records = self.service.search(keyword.trim());
                print_records(&records);
            }

            Commands::Totals => print_totals(&self.service.totals()),

            Commands::Summary => print_category_summary(&self.service.category_summary()),

            Commands::Charts { width } => print_charts(
                &self.service.expense_shares(),
                &self.service.monthly_trend(),
                width.max(1),
            ),

            Commands::Category(cmd) => self.run_category_command(cmd)?,

            Commands::Budget {
                amount,
                month,
                email,
            } => {
                let budget: Cents = match amount {
                    Some(a) => parse_cents(&a)
                        .with_context(|| format!("Invalid budget amount '{}'", a))?,
                    None => DEFAULT_MONTHLY_BUDGET,
                };
                let month = resolve_month(month)?;
                let analysis = self.service.budget_analysis(&month, budget);
                print!("{}", analysis.to_report_text());

                if let Some(to) = email {
                    let mailer = SmtpMailer::from_config(&self.smtp)?;
                    self.service
                        .send_budget_report(&mailer, self.smtp.sender()?, &to, &analysis)?;
                    println!("Report sent to {}", to.trim());
                }
            }

            Commands::Advice => {
                let client = GeminiClient::from_config(&self.advice)?;
                let advice = self.service.financial_advice(&client).await?;
                println!("{}", advice);
            }

            Commands::Chat { question } => {
                let client = GeminiClient::from_config(&self.advice)?;
                let answer = self.service.chat(&client, &question.join(" ")).await?;
                println!("{}", answer);
            }

            Commands::Email { to, month } => {
                let month = resolve_month(month)?;
                let mailer = SmtpMailer::from_config(&self.smtp)?;
                let email =
                    self.service
                        .send_monthly_report(&mailer, self.smtp.sender()?, &to, &month)?;
                println!("Report for {} sent to {}", month, email.to);
            }

            Commands::Export {
                format,
                output,
                month,
            } => self.run_export_command(format, output, month)?,

            Commands::Shell => anyhow::bail!("Already in a shell session"),
        }

        Ok(())
    }

    fn run_category_command(&mut self, cmd: CategoryCommands) -> Result<(), AppError> {
        match cmd {
            CategoryCommands::List => print_categories(self.service.categories().names()),
            CategoryCommands::Add { name } => {
                let name = self.service.add_category(&name)?;
                println!("Added category: {}", name);
            }
            CategoryCommands::Delete { name } => {
                self.service.delete_category(&name)?;
                println!("Deleted category: {}", name.trim());
            }
        }
        Ok(())
    }

    fn run_export_command(
        &self,
        format: ExportFormat,
        output: Option<PathBuf>,
        month: Option<String>,
    ) -> Result<()> {
        use crate::io::Exporter;
        use std::fs::File;
        use std::io::stdout;

        let records = match month {
            Some(month) => self.service.records_in_month(&parse_month(&month)?),
            None => self.service.records().to_vec(),
        };

        let writer: Box<dyn std::io::Write> = match &output {
            Some(path) => {
                let file = File::create(path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Box::new(file)
            }
            None => Box::new(stdout()),
        };

        let exporter = Exporter::new(&self.service);
        let count = match format {
            ExportFormat::Csv => exporter.export_csv(writer, &records)?,
            ExportFormat::Json => exporter.export_json(writer, &records)?.records.len(),
        };
        if output.is_some() {
            eprintln!("Exported {} records", count);
        }
        Ok(())
    }

    /// Run commands read from stdin until end of input or `exit`. A failing
    /// command is reported and the session continues.
    pub async fn run_shell(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        loop {
            print!("cashbook> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                println!();
                break;
            }

            match self.run_line(&line).await {
                Ok(ShellFlow::Continue) => {}
                Ok(ShellFlow::Exit) => break,
                Err(e) => eprintln!("Error: {:#}", e),
            }
        }
        Ok(())
    }

    /// Run one line of shell input against the open ledger.
    pub async fn run_line(&mut self, line: &str) -> Result<ShellFlow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellFlow::Continue);
        }
        if matches!(line, "exit" | "quit") {
            return Ok(ShellFlow::Exit);
        }

        let words = shell_words::split(line).context("Cannot split command line")?;
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            // --help and friends
            Err(e) if !e.use_stderr() => {
                let _ = e.print();
                return Ok(ShellFlow::Continue);
            }
            Err(e) => {
                let message = e.to_string();
                anyhow::bail!("{}", message.trim_start_matches("error: ").trim_end());
            }
        };

        self.execute(parsed.command).await?;
        Ok(ShellFlow::Continue)
    }
}

/// What the shell loop does after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Exit,
}

fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn resolve_month(month: Option<String>) -> Result<String> {
    match month {
        Some(month) => Ok(parse_month(&month)?),
        None => Ok(month_of(Local::now().date_naive())),
    }
}

fn describe(record: &Record) -> String {
    let mut text = format!(
        "{} {} {}",
        record.date,
        record.category,
        format_cents(record.amount)
    );
    if !record.note.is_empty() {
        text.push_str(&format!(" ({})", record.note));
    }
    text
}

fn sort_records(records: &mut [Record], key: SortKey) {
    match key {
        SortKey::Entry => {}
        SortKey::Date => records.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::Amount => records.sort_by_key(|r| r.amount),
        SortKey::Category => records.sort_by(|a, b| a.category.cmp(&b.category)),
    }
}
