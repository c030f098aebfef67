//! Folio pager CLI (for inspecting page plans)
//! The main interface is the library and its WASM bindings.

use folio_pager::layout::{LayoutSession, LayoutUpdate, MeasuredHeights, MonospaceMeasurer};
use folio_pager::{FlowDocument, PaginationConfig, PaginationError};
use serde::Deserialize;
use std::env;
use std::fs;

/// Input file: an article plus optional configuration and measured heights
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    #[serde(default)]
    config: PaginationConfig,
    document: FlowDocument,
    /// When present, the measured pass runs on these heights
    #[serde(default)]
    heights: Option<MeasuredHeights>,
}

fn main() -> Result<(), PaginationError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Prints the page plan of an article.");
        eprintln!();
        eprintln!("Usage: {} <article.json> [--json] [--trace]", args[0]);
        eprintln!();
        eprintln!("The input holds {{\"document\": [...], \"config\"?: {{...}}, \"heights\"?: {{...}}}}.");
        std::process::exit(1);
    }

    let as_json = args.iter().any(|arg| arg == "--json");
    let with_trace = args.iter().any(|arg| arg == "--trace");

    let source = fs::read_to_string(&args[1])?;
    let input: Input = serde_json::from_str(&source)?;
    let config = input.config.with_diagnostics(with_trace);

    let measurer = MonospaceMeasurer::from_config(&config);
    let mut session = LayoutSession::new(config, measurer)?;
    let mut update = session.load(input.document);

    if let (Some(ticket), Some(heights)) = (update.ticket, input.heights.as_ref()) {
        update = session.complete(ticket, heights)?;
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&update)?);
    } else {
        print_plan(&update);
    }
    Ok(())
}

fn print_plan(update: &LayoutUpdate) {
    for page in update.pages.iter() {
        let header = if page.is_first_page { "full header" } else { "continuation" };
        println!("Page {}/{} ({header})", page.page_number, page.total_pages);
        for element in &page.elements {
            let marker = match element.split {
                Some(split) if split.first_half && split.second_half => " [continued, continues]",
                Some(split) if split.first_half => " [continues]",
                Some(_) => " [continued]",
                None => "",
            };
            let preview: String = element.body.chars().take(48).collect();
            println!("  {} {:<14} {preview}{marker}", element.id, element.kind.name());
        }
    }

    if update.ticket.is_some() {
        println!("(estimated heights; pass \"heights\" for the measured layout)");
    }

    for warning in &update.warnings {
        println!("warning: {warning}");
    }

    if let Some(trace) = &update.trace {
        for event in &trace.events {
            match serde_json::to_string(event) {
                Ok(line) => println!("trace: {line}"),
                Err(err) => log::warn!("could not encode trace event: {err}"),
            }
        }
    }
}
