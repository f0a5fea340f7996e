//! The formatting run: analysis, the parallel passes, then the ordered
//! post-processing stages.

use std::path::Path;

use crate::classify::{self, Classification, Lang, Role};
use crate::cover;
use crate::docx;
use crate::error::Error;
use crate::fonts::{FontManager, FontStyle};
use crate::format::{self, Pass};
use crate::model::Document;
use crate::options::{FormatOptions, ThesisInfo};
use crate::pagination;
use crate::reorganize;
use crate::report::{self, FormatReport};
use crate::spacing;
use crate::structure::{self, Structure};
use crate::toc;
use crate::writer;

/// Font table entry the font stage applies to a role, if any.
pub fn font_style_for(role: Role) -> Option<FontStyle> {
    Some(match role {
        Role::AbstractTitle { lang: Lang::Cn } => FontStyle::AbstractTitleCn,
        Role::AbstractTitle { lang: Lang::En } => FontStyle::AbstractTitleEn,
        Role::Heading { level, .. } => FontStyle::heading(level),
        Role::Body | Role::AcknowledgmentBody => FontStyle::MainText,
        Role::ReferenceEntry => FontStyle::Reference,
        Role::FigureCaption | Role::TableCaption => FontStyle::FigureCaption,
        Role::Footnote => FontStyle::Footnote,
        _ => return None,
    })
}

/// Applies the font table to every non-blank paragraph with a styled role.
pub fn apply_fonts(doc: &mut Document, classification: &Classification) -> usize {
    let fonts = FontManager::new();
    let mut touched = 0;
    for para in &mut doc.paragraphs {
        if para.is_blank() {
            continue;
        }
        if let Some(style) = font_style_for(classification.role(para.id)) {
            fonts.format_mixed_text(para, style);
            touched += 1;
        }
    }
    touched
}

fn refresh(doc: &Document, previous: &Classification) -> (Structure, Classification) {
    let structure = structure::analyze(doc);
    let classification = classify::reclassify(doc, &structure, previous);
    (structure, classification)
}

pub struct ThesisFormatter {
    pub options: FormatOptions,
    pub info: ThesisInfo,
}

impl ThesisFormatter {
    pub fn new(options: FormatOptions, info: ThesisInfo) -> Self {
        ThesisFormatter { options, info }
    }

    /// Formats `doc` and returns the result with its report. A failing
    /// parallel pass is recorded in the report; a failing sequential stage
    /// aborts the run.
    pub fn run(&self, mut doc: Document) -> Result<(Document, FormatReport), Error> {
        let options = &self.options;
        options.check()?;
        let mut report = FormatReport::default();

        let structure = structure::analyze(&doc);
        let classification = classify::classify(&doc, &structure);
        log::info!(
            "{} paragraphs, sections found: {:?}",
            doc.len(),
            structure.found().iter().map(|(k, _)| k.name()).collect::<Vec<_>>()
        );

        let passes: Vec<Pass> = Pass::CANONICAL
            .into_iter()
            .filter(|p| {
                let enabled = p.enabled(options);
                if !enabled {
                    log::info!("{} pass disabled", p.name());
                }
                enabled
            })
            .collect();
        report.passes =
            format::run_parallel(&mut doc, &structure, &classification, options, &passes)?;

        if options.generate_cover {
            let inserted = cover::generate_cover(&mut doc, &structure, &self.info, options);
            report.note("cover", format!("{inserted} 段"));
        }
        if options.generate_commitment {
            let current = structure::analyze(&doc);
            let inserted = cover::generate_commitment(&mut doc, &current, options);
            report.note("commitment", format!("{inserted} 段"));
        }

        let (structure, classification) = refresh(&doc, &classification);

        if options.basic_formatting {
            let fonts = apply_fonts(&mut doc, &classification);
            let spaced = spacing::apply_document(&mut doc, &classification);
            report.note("fonts", format!("{fonts} 段"));
            report.note("spacing", format!("{spaced} 段"));
        }

        if options.setup_page_numbers {
            // Headers split the body into its own section before any section
            // properties are filled in, so the front matter never inherits them.
            let headed = pagination::add_headers(&mut doc, &structure, options);
            let sections = pagination::setup_page_numbers(&mut doc, &structure);
            report.note("header", format!("{headed} 节"));
            report.note("page_numbers", format!("{sections} 节"));
        }

        let mut classification = classification;
        if options.update_toc {
            let (structure, current) = refresh(&doc, &classification);
            let summary =
                toc::update_toc(&mut doc, &structure, &current, options.paragraphs_per_page);
            report.note("toc", format!("{} 条", summary.entries));
            report.toc = Some(summary);
            classification = current;
        }

        if options.reorder_document {
            let before = reorganize::validate_document_order(&doc);
            if !before.ok {
                report.note("reorganize", before.message);
            }
            let structure = structure::analyze(&doc);
            doc = reorganize::reorganize(doc, &structure)?;
        }

        let (structure, classification) = refresh(&doc, &classification);
        report.structure = structure;
        report.order = Some(reorganize::validate_document_order(&doc));
        if options.format_acknowledgment {
            report.acknowledgment = Some(format::check_acknowledgment(&doc, &classification));
        }
        report.font_issues = FontManager::new().validate(&doc);
        let (errors, warnings) = spacing::validate(&doc, &classification);
        report.spacing_errors = errors;
        report.spacing_warnings = warnings;
        if options.setup_page_numbers {
            report.header_issues = pagination::validate_headers(&doc, options);
        }
        report.checklist = report::checklist(&doc, options);

        for failed in report.failed_passes() {
            log::warn!("{} pass did not complete", failed.pass);
        }
        Ok((doc, report))
    }
}

/// Reads `input`, formats it and writes the result to `output`.
pub fn format_file(
    input: &Path,
    output: &Path,
    options: &FormatOptions,
    info: &ThesisInfo,
) -> Result<FormatReport, Error> {
    let doc = docx::parse(input)?;
    let formatter = ThesisFormatter::new(options.clone(), info.clone());
    let (doc, report) = formatter.run(doc)?;
    writer::save(&doc, output)?;
    log::info!("saved {}", output.display());
    Ok(report)
}
