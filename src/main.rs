use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tagql::cli::{self, AggregateOptions, CliError, QueryOptions};
use tagql::output::OutputFormat;

#[derive(ClapParser)]
#[command(name = "tagql")]
#[command(about = "tagql - query a tag-structured workspace export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a query ("find TAG where ... order by ... limit N")
    Query {
        /// The query text (reads from stdin if not provided)
        query: Option<String>,

        /// Path to the workspace database
        #[arg(short, long)]
        db: PathBuf,

        /// Output format: json, csv, or table
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Count entities carrying a tag, optionally grouped by a field
    Aggregate {
        /// Target tag name
        tag: String,

        /// Field to group counts by
        #[arg(short, long)]
        group_by: Option<String>,

        /// Filter expression (the text after 'where')
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Path to the workspace database
        #[arg(short, long)]
        db: PathBuf,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List all tags in the workspace
    Tags {
        /// Path to the workspace database
        #[arg(short, long)]
        db: PathBuf,
    },

    /// Show a tag's effective field list (own + inherited)
    Fields {
        /// Tag name
        tag: String,

        /// Path to the workspace database
        #[arg(short, long)]
        db: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query {
            query,
            db,
            format,
            pretty,
        } => run_query(query, db, format, pretty),
        Commands::Aggregate {
            tag,
            group_by,
            filter,
            db,
            pretty,
        } => cli::execute_aggregate(&AggregateOptions {
            tag,
            group_by,
            filter,
            db,
            pretty,
        }),
        Commands::Tags { db } => cli::list_tags(&db),
        Commands::Fields { tag, db } => cli::list_fields(&db, &tag),
    };

    match result {
        Ok(output) => print!("{}", ensure_newline(output)),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run_query(
    query: Option<String>,
    db: PathBuf,
    format: String,
    pretty: bool,
) -> Result<String, CliError> {
    let query = match query {
        Some(q) => q,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            buffer.trim().to_string()
        }
        None => return Err(CliError::NoQuery),
    };
    if query.is_empty() {
        return Err(CliError::NoQuery);
    }

    let format: OutputFormat = format
        .parse()
        .map_err(|e: String| CliError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    cli::execute_query(&QueryOptions {
        query,
        db,
        format,
        pretty,
    })
}

fn ensure_newline(mut s: String) -> String {
    if !s.is_empty() && !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
