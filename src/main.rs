use clap::Parser;
use std::path::PathBuf;

use thesis_fmt::{FormatOptions, ThesisInfo};

#[derive(Parser)]
#[command(name = "thesis-fmt", about = "Format a thesis DOCX to the institution's standard")]
struct Args {
    /// Input DOCX file
    input: PathBuf,
    /// Output DOCX file (defaults to <input>_formatted.docx)
    output: Option<PathBuf>,
    /// JSON file with formatting options
    #[arg(long)]
    options: Option<PathBuf>,
    /// JSON file with thesis information for the cover page
    #[arg(long)]
    info: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Disable a feature (cover, commitment, page_number, keywords,
    /// figures_tables, footnotes, math, toc, acknowledgment, appendix,
    /// reorganize, basic); may be repeated
    #[arg(long = "no", value_name = "FEATURE")]
    disable: Vec<String>,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.input.exists() {
        fail(format_args!("file not found: {}", args.input.display()));
    }
    if !args.input.is_file() {
        fail(format_args!("not a file: {}", args.input.display()));
    }

    let mut options = match &args.options {
        Some(path) => FormatOptions::load(path).unwrap_or_else(|e| fail(e)),
        None => FormatOptions::default(),
    };
    for feature in &args.disable {
        if let Err(e) = options.set_option(feature, false) {
            fail(e);
        }
    }
    let info = match &args.info {
        Some(path) => ThesisInfo::load(path).unwrap_or_else(|e| fail(e)),
        None => ThesisInfo::default(),
    };

    let output = args.output.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "thesis".to_string());
        args.input.with_file_name(format!("{stem}_formatted.docx"))
    });

    match thesis_fmt::format_file(&args.input, &output, &options, &info) {
        Ok(report) => {
            if args.json {
                match report.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => fail(e),
                }
            } else {
                print!("{report}");
                println!("文档已保存: {}", output.display());
            }
        }
        Err(e) => {
            log::error!("formatting failed: {e}");
            fail(e);
        }
    }
}
