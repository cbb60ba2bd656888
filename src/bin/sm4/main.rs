//! SM4 CLI - Tool for inspecting RHK SM4 files.

use rayon::prelude::*;
use sm4::prelude::*;
use sm4::sm4::ObjectOutcome;
use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Default filter for each verbosity flag.
const LOG_QUIET: &str = "error";
const LOG_INFO: &str = "warn";
const LOG_DEBUG: &str = "sm4=debug";
const LOG_TRACE: &str = "sm4=trace";

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = LOG_INFO;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = LOG_DEBUG,
            "-vv" | "--trace" => level = LOG_TRACE,
            "-q" | "--quiet" => level = LOG_QUIET,
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - header and page summary, files decoded in parallel
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: sm4 info <file.SM4>...");
                std::process::exit(1);
            }
            cmd_info(&filtered_args[1..]);
        }

        // Channels command - calibrated channel list
        "channels" | "c" => {
            let json = filtered_args.contains(&"--json");
            let files: Vec<&str> = filtered_args[1..].iter().copied().filter(|a| *a != "--json").collect();
            if files.is_empty() {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: sm4 channels <file.SM4> [--json]");
                std::process::exit(1);
            }
            cmd_channels(files[0], json);
        }

        // Objects command - per-page object outcomes
        "objects" | "o" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: sm4 objects <file.SM4>");
                std::process::exit(1);
            }
            cmd_objects(filtered_args[1]);
        }

        // PRM command - dump the parameter block
        "prm" | "p" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: sm4 prm <file.SM4> [out.txt]");
                std::process::exit(1);
            }
            cmd_prm(filtered_args[1], filtered_args.get(2).copied());
        }

        "help" | "h" | "-h" | "--help" => print_help(),
        _ => {
            // Assume it's a file path
            if Path::new(filtered_args[0]).exists() {
                cmd_info(&filtered_args[..1]);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                print_help();
                std::process::exit(1);
            }
        }
    }
}

/// Version line with the build stamp, e.g. `sm4 0.1.0 (built 2024-05-01 12:00:00 UTC)`.
fn banner() -> String {
    format!(
        "sm4 {} (built {} {} UTC)",
        env!("CARGO_PKG_VERSION"),
        env!("SM4_BUILD_DATE"),
        env!("SM4_BUILD_TIME")
    )
}

fn print_help() {
    println!("{} - RHK SM4 file toolkit", banner());
    println!();
    println!("USAGE:");
    println!("    sm4 [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info     <file>...           Show header and page summary");
    println!("    c, channels <file> [--json]     List calibrated channels");
    println!("    o, objects  <file>              Show every page object and its outcome");
    println!("    p, prm      <file> [out]        Write the parameter block (stdout by default)");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    sm4 info scan.SM4                  # Quick overview");
    println!("    sm4 info data/*.SM4                # Many files at once");
    println!("    sm4 channels scan.SM4 --json       # Channel summary as JSON");
    println!("    sm4 prm scan.SM4 scan.prm          # Extract parameters");
    println!();
    println!("NOTES:");
    println!("    - Passing a .SM4 file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
}

fn open_or_exit(path: &str) -> Sm4 {
    match Sm4::open(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(paths: &[&str]) {
    let reports: Vec<(&str, Result<String>)> = paths
        .par_iter()
        .map(|&path| (path, Container::open(path).map(|c| format_info(&c))))
        .collect();

    let mut failed = 0;
    for (path, report) in reports {
        match report {
            Ok(text) => {
                println!("File: {}", path);
                print!("{}", text);
                println!();
            }
            Err(e) => {
                eprintln!("Failed to open {}: {}", path, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        std::process::exit(1);
    }
}

fn format_info(container: &Container) -> String {
    use std::fmt::Write;

    let header = container.header();
    let mut out = String::new();
    let _ = writeln!(out, "Signature: {}", header.signature_text().trim());
    let _ = writeln!(out, "Pages: {}", container.num_pages());
    if let Some(prm) = container.prm() {
        let _ = writeln!(out, "PRM: {} bytes ({})", prm.data_size, match prm.payload {
            PrmPayload::Plain(_) => "plain",
            PrmPayload::Compressed { .. } => "compressed",
        });
    }
    for page in container.pages() {
        let _ = write!(out, "  [{:>2}] id={:<4} {:<10}", page.index, page.id, page.data_type.to_string());
        match &page.header {
            PageHeader::Default(h) => {
                let _ = writeln!(
                    out,
                    " {:<26} {}x{} objects={}",
                    h.page_type.to_string(),
                    h.x_size,
                    h.y_size,
                    page.walked_objects()
                );
            }
            PageHeader::Sequential(h) => {
                let _ = writeln!(out, " params={} objects={}", h.params.len(), page.walked_objects());
            }
        }
    }
    out
}

fn cmd_channels(path: &str, json: bool) {
    let sm4 = open_or_exit(path);

    if json {
        let stdout = io::stdout();
        if let Err(e) = serde_json::to_writer_pretty(stdout.lock(), sm4.channels()) {
            eprintln!("Failed to write JSON: {}", e);
            std::process::exit(1);
        }
        println!();
        return;
    }

    println!("Channels: {}", sm4.len());
    for (i, ch) in sm4.iter().enumerate() {
        let ts = ch
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{:>2}] {:<26} {:<16} {}x{} size={:.3e}x{:.3e} bias={:.4} current={:.4e} {}",
            i,
            ch.page_type.to_string(),
            ch.line_type.to_string(),
            ch.xres,
            ch.yres,
            ch.xsize,
            ch.ysize,
            ch.bias,
            ch.current,
            ts
        );
    }
}

fn cmd_objects(path: &str) {
    let container = match Container::open(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    for page in container.pages() {
        println!("Page {} (id {}, {}):", page.index, page.id, page.data_type);
        for entry in &page.entries {
            let outcome = match &entry.outcome {
                ObjectOutcome::Header => "header".to_string(),
                ObjectOutcome::Decoded(_) => "decoded".to_string(),
                ObjectOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
                ObjectOutcome::Unsupported { reason } => format!("unsupported: {}", reason),
                ObjectOutcome::DependencyMissing { missing } => format!("missing {}", missing),
            };
            println!(
                "  {:<22} @{:#010x} {:>8}  {}",
                entry.record.object_type.to_string(),
                entry.record.offset,
                entry.record.size,
                outcome
            );
        }
    }
}

fn cmd_prm(path: &str, out: Option<&str>) {
    let sm4 = open_or_exit(path);

    let written = match out {
        Some(out_path) => File::create(out_path)
            .map_err(Error::from)
            .and_then(|f| sm4.write_prm(BufWriter::new(f))),
        None => sm4.write_prm(io::stdout().lock()),
    };

    match written {
        Ok(0) => {
            eprintln!("{}: no uncompressed parameter block", path);
            std::process::exit(1);
        }
        Ok(n) => tracing::info!(bytes = n, "wrote parameter block"),
        Err(e) => {
            eprintln!("Failed to write parameters: {}", e);
            std::process::exit(1);
        }
    }
}
