use clap::{Parser, Subcommand};
use datefilter::{crumbs, query, DatePicker, Error, Filter, Operator, PickerConfig, Result};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datefilter", about = "Resolve and rewrite MBQL date filters")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "DATEFILTER_CONFIG",
        help = "YAML file with picker options",
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "DATEFILTER_HIDE_EMPTINESS_OPERATORS",
        help = "Leave out Is Empty / Not Empty",
    )]
    hide_emptiness_operators: bool,

    #[arg(
        long,
        global = true,
        env = "DATEFILTER_HIDE_TIME_SELECTORS",
        help = "Hide hour and minute selectors",
    )]
    hide_time_selectors: bool,

    #[arg(
        long,
        global = true,
        env = "DATEFILTER_INCLUDE_ALL_TIME",
        help = "Offer the All Time operator",
    )]
    include_all_time: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the operator a filter currently matches
    Resolve {
        #[arg(help = "Filter as JSON, or - for stdin")]
        filter: String,
    },
    /// Print the filter a freshly opened picker would normalize to
    Init {
        #[arg(help = "Filter as JSON, or - for stdin")]
        filter: String,
    },
    /// Rewrite a filter for another operator
    Switch {
        #[arg(long, help = "Operator name, e.g. Between")]
        operator: String,
        #[arg(help = "Filter as JSON, or - for stdin")]
        filter: String,
    },
    /// Print what the picker shows for a filter
    View {
        #[arg(help = "Filter as JSON, or - for stdin")]
        filter: String,
    },
    /// Render a breadcrumb list
    Crumbs {
        #[arg(long, help = "Emit HTML instead of text")]
        html: bool,
        #[arg(help = "Crumbs as a JSON array, or - for stdin")]
        crumbs: String,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let file_config = match &cli.config {
        Some(path) => PickerConfig::load(path)?,
        None => PickerConfig::default(),
    };
    let config = file_config.merge(PickerConfig {
        hide_emptiness_operators: cli.hide_emptiness_operators,
        hide_time_selectors: cli.hide_time_selectors,
        include_all_time: cli.include_all_time,
    });
    tracing::debug!(?config, "picker config");

    match cli.command {
        Command::Resolve { filter } => run_resolve(config, &read_filter(&filter)?),
        Command::Init { filter } => run_init(config, &read_filter(&filter)?),
        Command::Switch { operator, filter } => {
            run_switch(config, &operator, &read_filter(&filter)?)
        }
        Command::View { filter } => run_view(config, &read_filter(&filter)?),
        Command::Crumbs { html, crumbs } => run_crumbs(&read_arg(&crumbs)?, html),
    }
}

fn run_resolve(config: PickerConfig, filter: &Filter) -> Result<ExitCode> {
    let picker = DatePicker::new(config, |_| {});
    match picker.resolve(filter) {
        Some(operator) => {
            println!("{}", operator);
            Ok(ExitCode::from(0))
        }
        None => {
            println!("(none)");
            Ok(ExitCode::from(1))
        }
    }
}

fn run_init(config: PickerConfig, filter: &Filter) -> Result<ExitCode> {
    let mut emitted: Option<Filter> = None;
    DatePicker::new(config, |f| emitted = Some(f)).mount(filter);

    println!("{}", serde_json::to_string(&emitted.flatten())?);
    Ok(ExitCode::from(0))
}

fn run_switch(config: PickerConfig, name: &str, filter: &Filter) -> Result<ExitCode> {
    let mut emitted: Option<Filter> = None;
    let mut picker = DatePicker::new(config, |f| emitted = Some(f));

    let offered = picker.operators();
    let operator = Operator::from_name(name)
        .filter(|op| offered.contains(op))
        .ok_or_else(|| {
            let names: Vec<&str> = offered.iter().map(|op| op.name()).collect();
            Error::UnknownOperator(name.to_string(), names.join(", "))
        })?;

    picker.select_operator(filter, operator);
    drop(picker);

    println!("{}", serde_json::to_string(&emitted.flatten())?);
    Ok(ExitCode::from(0))
}

fn run_view(config: PickerConfig, filter: &Filter) -> Result<ExitCode> {
    let picker = DatePicker::new(config, |_| {});
    let view = picker.view(filter);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(ExitCode::from(0))
}

fn run_crumbs(input: &str, html: bool) -> Result<ExitCode> {
    let list = query::parse_crumbs(input)?;
    let trail = crumbs::render(&list);

    if html {
        println!("{}", trail.to_html());
    } else {
        println!("{}", trail);
    }

    Ok(ExitCode::from(0))
}

fn read_filter(arg: &str) -> Result<Filter> {
    let input = read_arg(arg)?;
    Ok(query::parse(&input)?)
}

fn read_arg(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}
