//! Inspect a thesis DOCX: package entries, detected sections and the role
//! assigned to each paragraph.
//!
//! Usage:
//!   thesis-inspect <file.docx>                    list all ZIP entries
//!   thesis-inspect <file.docx> --structure        section positions and paragraph roles
//!   thesis-inspect <file.docx> <internal/path>    dump one entry

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use zip::ZipArchive;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  thesis-inspect <file.docx>                    list ZIP entries");
        eprintln!("  thesis-inspect <file.docx> --structure        sections and roles");
        eprintln!("  thesis-inspect <file.docx> <internal/path>    dump file");
        std::process::exit(1);
    }

    match args.get(2).map(String::as_str) {
        Some("--structure") => print_structure(Path::new(&args[1])),
        other => {
            let file = fs::File::open(&args[1]).unwrap_or_else(|e| {
                eprintln!("Cannot open '{}': {e}", args[1]);
                std::process::exit(1);
            });
            let mut archive = ZipArchive::new(file).unwrap_or_else(|e| {
                eprintln!("Not a valid ZIP/DOCX: {e}");
                std::process::exit(1);
            });
            match other {
                None => list_entries(&mut archive),
                Some(path) => dump_entry(&mut archive, path),
            }
        }
    }
}

fn list_entries(archive: &mut ZipArchive<fs::File>) {
    println!("{:>9}  path", "bytes");
    println!("{}", "─".repeat(55));
    for i in 0..archive.len() {
        let Ok(entry) = archive.by_index(i) else {
            continue;
        };
        if !entry.is_dir() {
            println!("{:>9}  {}", entry.size(), entry.name());
        }
    }
}

fn dump_entry(archive: &mut ZipArchive<fs::File>, path: &str) {
    let mut entry = archive.by_name(path).unwrap_or_else(|_| {
        eprintln!("'{path}' not found in archive");
        eprintln!("Run without a path argument to list available entries.");
        std::process::exit(1);
    });
    let mut content = Vec::new();
    if let Err(e) = entry.read_to_end(&mut content) {
        eprintln!("Cannot read '{path}': {e}");
        std::process::exit(1);
    }
    let _ = io::stdout().write_all(&content);
}

fn print_structure(path: &Path) {
    let doc = thesis_fmt::docx::parse(path).unwrap_or_else(|e| {
        eprintln!("Cannot parse '{}': {e}", path.display());
        std::process::exit(1);
    });
    let structure = thesis_fmt::analyze(&doc);
    let classification = thesis_fmt::classify(&doc, &structure);

    println!("sections:");
    for (key, index) in structure.found() {
        println!("  {:<16} {index}", key.name());
    }
    println!("{}", "─".repeat(55));
    for (i, _, role) in classification.iter() {
        let text: String = doc.paragraphs[i].text().trim().chars().take(40).collect();
        println!("{i:>5}  {:<28} {text}", format!("{role:?}"));
    }
}
