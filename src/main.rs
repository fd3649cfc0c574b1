mod analyser;
mod error;
mod ui;

use analyser::core::SourceSpec;
use analyser::utils::{RowSchema, DEFAULT_ID_COLUMN, DEFAULT_TIMESTAMP_COLUMN};
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use ui::output;

/// capcompare compares two packet capture logs and correlates their packets by id
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First (reference) capture log
    #[arg(short = 'a', long, default_value = "dpdk/dpdk_packet_log.csv")]
    first: PathBuf,

    /// Second capture log; delays are reported as second minus first
    #[arg(short = 'b', long, default_value = "Non_dpdk/non_dpdk_packet_log.csv")]
    second: PathBuf,

    /// Name of the first capture in the report
    #[arg(long, default_value = "DPDK")]
    first_label: String,

    /// Name of the second capture in the report
    #[arg(long, default_value = "Non-DPDK")]
    second_label: String,

    /// Header name of the microsecond timestamp column
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN)]
    timestamp_column: String,

    /// Header name of the packet id column
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Field delimiter
    #[arg(short = 'd', long, default_value_t = ',')]
    delimiter: char,

    /// Also list per-id delays and unmatched ids
    #[arg(short = 'l', long, action = ArgAction::SetTrue)]
    list_ids: bool,

    /// Display output as formatted JSON
    #[arg(short = 'j', long, action = ArgAction::SetTrue)]
    json: bool,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(err) = simple_logger::init_with_env() {
        eprintln!("Failed to initialise logger: {err}");
    }

    let args = Args::parse();

    let schema = RowSchema {
        timestamp_column: args.timestamp_column,
        id_column: args.id_column,
        delimiter: args.delimiter,
    };
    let first = SourceSpec::new(args.first_label, args.first);
    let second = SourceSpec::new(args.second_label, args.second);

    let report = analyser::core::analyse(&first, &second, &schema);

    // ---- Output ----
    let rendered = if args.json {
        match output::data_as_json(&report) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialise report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        let colour = output::use_colour(args.output.is_some(), std::io::stdout().is_terminal());
        output::render_text(&report, args.list_ids, colour)
    };

    match args.output.as_deref() {
        Some(path) => {
            if let Err(err) = output::data_to_file(&rendered, path) {
                log::error!("Failed to write {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
            log::info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if report.any_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
