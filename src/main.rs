//! grademap CLI - structured queries over course grade history.
//!
//! Command-line entry point mirroring the MCP tool surface, useful for
//! poking at a dataset without a client:
//!
//! 1. Load config (grademap.toml) and the dataset snapshot
//! 2. Build the catalog index (fails fast on integrity errors)
//! 3. Run one query operation and print the JSON result

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use grademap::aggregate::GroupBy;
use grademap::mcp::GradesServer;
use grademap::query::{CourseQuery, ProfessorQuery, SortHint};
use grademap::types::Level;
use grademap::GradesEngine;

/// Structured queries over university course offerings and grade history.
///
/// Examples:
///   grademap courses --department CSCI --number-min 4000
///   grademap courses --keyword "machine learning" --min-gpa 3.0
///   grademap course CSCI 5511 --group-by professor
///   grademap professors --name smith
///   grademap mcp
#[derive(Parser, Debug)]
#[command(name = "grademap")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// Path to the dataset JSON file (overrides grademap.toml)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Verbose logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search courses by any combination of filters
    Courses {
        /// Department code or full name
        #[arg(long)]
        department: Option<String>,
        /// Inclusive lower bound on course number
        #[arg(long)]
        number_min: Option<u32>,
        /// Inclusive upper bound on course number
        #[arg(long)]
        number_max: Option<u32>,
        /// Course level
        #[arg(long, value_enum)]
        level: Option<Level>,
        /// Minimum aggregate GPA
        #[arg(long)]
        min_gpa: Option<f64>,
        /// Liberal-education tag
        #[arg(long)]
        libed: Option<String>,
        /// Fuzzy keyword against titles and codes
        #[arg(long)]
        keyword: Option<String>,
        /// Professor id or name fragment
        #[arg(long)]
        professor: Option<String>,
        /// Sort order when no keyword is given
        #[arg(long, value_enum)]
        sort: Option<SortHint>,
        /// Maximum results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Grade report for one course
    Course {
        /// Department code or full name
        department: String,
        /// Course number, e.g. 5511 or 1001W
        number: String,
        /// Partition the report by professor or term
        #[arg(long, value_enum)]
        group_by: Option<GroupBy>,
    },
    /// Search professors by name fragment or id
    Professors {
        /// Name or partial name
        #[arg(long)]
        name: Option<String>,
        /// Exact professor id
        #[arg(long)]
        id: Option<u32>,
        /// Minimum external rating
        #[arg(long)]
        min_rating: Option<f64>,
        /// Sort order when no name is given
        #[arg(long, value_enum)]
        sort: Option<SortHint>,
        /// Maximum results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Grade report for one professor
    Professor {
        /// The professor's id
        id: u32,
        /// Partition the report by term
        #[arg(long, value_enum)]
        group_by: Option<GroupBy>,
    },
    /// Courses satisfying a liberal-education requirement
    Libed {
        /// The requirement's tag
        tag: String,
    },
    /// List department and term codes with their labels
    Terms,
    /// Run the MCP server over stdio
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine = GradesEngine::bootstrap(cli.dataset.as_deref())?;

    match cli.command {
        Command::Courses {
            department,
            number_min,
            number_max,
            level,
            min_gpa,
            libed,
            keyword,
            professor,
            sort,
            limit,
        } => {
            let query = CourseQuery {
                department,
                number_min,
                number_max,
                level,
                min_gpa,
                liberal_ed_tag: libed,
                keyword,
                professor,
                sort,
                ..Default::default()
            };
            let mut hits = engine.search_courses(&query)?;
            hits.truncate(limit);
            print_json(&hits)?;
        }
        Command::Course {
            department,
            number,
            group_by,
        } => {
            let report =
                engine.course_grades(&department, &number, group_by.unwrap_or_default())?;
            print_json(&report)?;
        }
        Command::Professors {
            name,
            id,
            min_rating,
            sort,
            limit,
        } => {
            let query = ProfessorQuery {
                name_fragment: name,
                id,
                min_rating,
                sort,
            };
            let mut hits = engine.search_professors(&query)?;
            hits.truncate(limit);
            print_json(&hits)?;
        }
        Command::Professor { id, group_by } => {
            let report = engine.professor_grades(id, group_by.unwrap_or_default())?;
            print_json(&report)?;
        }
        Command::Libed { tag } => {
            let listing = engine.liberal_education_courses(&tag)?;
            print_json(&listing)?;
        }
        Command::Terms => {
            print_json(&engine.abbreviations_and_terms())?;
        }
        Command::Mcp => {
            let server = GradesServer::new(std::sync::Arc::new(engine));
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
