use clap::{Parser, Subcommand};
use dotenv::dotenv;
use inquire::Text;
use prettytable::{Cell, Row, Table, format};
use rust_decimal::Decimal;
use std::{error::Error, path::PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gastos::config::{Config, default_output_dir, parse_amount};
use gastos::csv_input::load_records;
use gastos::grouping::{group_by_employee, partition_by_month, summarize};
use gastos::{ExpenseRecord, generate_reports};

// --- CLI Structure ---
#[derive(Parser)]
#[command(name = "Gastos")]
#[command(about = "Build monthly expense workbooks per employee from a CSV export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the records of a CSV file and how they will be grouped
    Preview {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Create or update the workbooks
    Generate {
        #[arg(long)]
        csv: PathBuf,
        /// Destination folder (created if missing)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Per-diem amount, "20.00" or "20,00"
        #[arg(long)]
        per_diem: Option<String>,
    },
}

const PREVIEW_PROJECT_WIDTH: usize = 50;

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok(); // Reads the .env file
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Preview { csv } => handle_preview(&load_records(&csv)?)?,
        Commands::Generate { csv, out, per_diem } => {
            let records = load_records(&csv)?;
            handle_generate(&records, &config, out, per_diem)?
        }
    }

    Ok(())
}

// --- Preview ---
fn handle_preview(records: &[ExpenseRecord]) -> Result<(), Box<dyn Error>> {
    if records.is_empty() {
        println!("The CSV file has no records.");
        return Ok(());
    }

    let summary = summarize(records);
    println!(
        "{} registros, {} personas, {} proyectos\n",
        summary.records, summary.employees, summary.projects
    );

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Nombre").style_spec("b"),
        Cell::new("Proyecto").style_spec("b"),
        Cell::new("Fecha").style_spec("b"),
    ]));
    for record in records {
        table.add_row(Row::new(vec![
            Cell::new(&record.employee_name),
            Cell::new(&truncate(&record.project, PREVIEW_PROJECT_WIDTH)),
            Cell::new(&record.date),
        ]));
    }
    table.printstd();

    println!("\n--- Sheets to generate ---");
    let mut sheets = Table::new();
    sheets.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    sheets.set_titles(Row::new(vec![
        Cell::new("Employee").style_spec("b"),
        Cell::new("Sheet").style_spec("b"),
        Cell::new("Days").style_spec("br"),
    ]));
    for (employee_name, employee_records) in group_by_employee(records) {
        for group in partition_by_month(&employee_name, &employee_records)? {
            sheets.add_row(Row::new(vec![
                Cell::new(&employee_name),
                Cell::new(&group.context.sheet_name()),
                Cell::new(&group.worked_days()?.len().to_string()).style_spec("r"),
            ]));
        }
    }
    sheets.printstd();

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width).collect::<String>())
    } else {
        text.to_string()
    }
}

// --- Generate ---
fn handle_generate(
    records: &[ExpenseRecord],
    config: &Config,
    out: Option<PathBuf>,
    per_diem: Option<String>,
) -> Result<(), Box<dyn Error>> {
    if records.is_empty() {
        println!("No CSV data loaded. Nothing to generate.");
        return Ok(());
    }

    let output_dir = match out.or_else(|| config.output_dir.clone()) {
        Some(dir) => dir,
        None => prompt_output_dir()?,
    };
    let per_diem = match per_diem {
        Some(raw) => parse_amount(&raw)?,
        None => match config.per_diem {
            Some(amount) => amount,
            None => prompt_per_diem()?,
        },
    };

    let report = generate_reports(records, &output_dir, per_diem);

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new("Status").style_spec("b"),
        Cell::new("Workbook / Employee").style_spec("b"),
        Cell::new("Detail").style_spec("b"),
    ]));
    for path in &report.written {
        table.add_row(Row::new(vec![
            Cell::new("OK").style_spec("Fg"),
            Cell::new(&path.display().to_string()),
            Cell::new(""),
        ]));
    }
    for failure in &report.failures {
        table.add_row(Row::new(vec![
            Cell::new("FAILED").style_spec("Fr"),
            Cell::new(&failure.employee_name),
            Cell::new(&failure.error.to_string()),
        ]));
    }
    table.printstd();

    if report.written.is_empty() {
        println!("\nNo workbooks could be generated.");
    } else {
        println!(
            "\nGenerated {} workbook(s) in: {}",
            report.written.len(),
            output_dir.display()
        );
    }

    Ok(())
}

fn prompt_output_dir() -> Result<PathBuf, Box<dyn Error>> {
    let default = default_output_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let answer = Text::new("Destination folder:")
        .with_default(&default)
        .with_help_message("Created if it does not exist")
        .prompt()?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err("No destination folder given".into());
    }
    Ok(PathBuf::from(answer))
}

fn prompt_per_diem() -> Result<Decimal, Box<dyn Error>> {
    let answer = Text::new("Per-diem amount (€):")
        .with_default("0.00")
        .prompt()?;
    Ok(parse_amount(&answer)?)
}
