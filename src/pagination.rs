//! Page-numbering domains and the running header.
//!
//! Front matter (cover through TOC) is numbered in lower-case roman
//! numerals, the body in arabic numerals restarting at 1. Both are live
//! `PAGE` fields evaluated by the viewing application.

use crate::model::{Alignment, Document, PageNumbering, Paragraph, RawXml, Run, RunProps};
use crate::options::FormatOptions;
use crate::structure::Structure;

const FOOTER_SIZE: f32 = 10.5;
const HEADER_SIZE: f32 = 10.5;
/// Header distance from the top edge, 1.5cm.
const HEADER_DISTANCE: f32 = 1.5 * 72.0 / 2.54;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    Roman,
    Arabic,
}

impl NumberFormat {
    fn field_switch(self) -> &'static str {
        match self {
            NumberFormat::Roman => "roman",
            NumberFormat::Arabic => "arabic",
        }
    }

    fn section_format(self) -> &'static str {
        match self {
            NumberFormat::Roman => "lowerRoman",
            NumberFormat::Arabic => "decimal",
        }
    }
}

fn song(size: f32) -> RunProps {
    let mut props = RunProps::default();
    props.set_font("宋体");
    props.size = Some(size);
    props
}

/// Centered footer paragraph holding a `PAGE` field.
pub fn page_number_footer(format: NumberFormat) -> Paragraph {
    let mut para = Paragraph::new();
    para.props.alignment = Some(Alignment::Center);
    let mut run = Run::field(&format!(" PAGE \\* {} ", format.field_switch()));
    run.props = song(FOOTER_SIZE);
    para.push_run(run);
    para
}

/// Header paragraph with a thin rule underneath.
pub fn header_paragraph(text: &str) -> Paragraph {
    let mut para = Paragraph::new();
    para.props.alignment = Some(Alignment::Center);
    para.props.extra.push(RawXml::new(
        "pBdr",
        r#"<w:pBdr><w:bottom w:val="single" w:sz="4" w:space="1" w:color="auto"/></w:pBdr>"#,
    ));
    para.push_run(Run::with_props(text, song(HEADER_SIZE)));
    para
}

/// Index of the section the body starts in, inserting a section break in
/// front of the main body when it shares a section with front matter.
/// `None` when there is no main body.
pub fn ensure_body_section(doc: &mut Document, structure: &Structure) -> Option<usize> {
    let main_start = structure.main_start?;
    let span = doc
        .sections()
        .into_iter()
        .find(|s| (s.start..s.end).contains(&main_start))?;
    if span.start == main_start {
        return Some(span.index);
    }
    let template = doc.section_props(span.index).cloned().unwrap_or_default();
    let front = &mut doc.paragraphs[main_start - 1];
    front.props.section = Some(Box::new(template));
    log::debug!("section break inserted before paragraph {main_start}");
    Some(span.index + 1)
}

/// Roman footers up to the body section, arabic footers from it on, with
/// the body restarting at 1. Returns the number of sections configured.
pub fn setup_page_numbers(doc: &mut Document, structure: &Structure) -> usize {
    let body = ensure_body_section(doc, structure);
    if body.is_none() {
        log::info!("no main body found, arabic page numbers throughout");
    }
    let body = body.unwrap_or(0);
    let count = doc.section_count();
    for index in 0..count {
        let format = if index < body { NumberFormat::Roman } else { NumberFormat::Arabic };
        let restart = index == 0 || index == body;
        let Some(section) = doc.section_props_mut(index) else {
            continue;
        };
        section.set_footer(vec![page_number_footer(format)]);
        let numbering = section.page_numbering.get_or_insert_with(PageNumbering::default);
        numbering.format = Some(format.section_format().to_string());
        numbering.start = restart.then_some(1);
    }
    count
}

/// Installs the running header on sections overlapping the main body and
/// an empty header everywhere else. The body gets its own section first.
/// Returns the number of sections that received the header text.
pub fn add_headers(doc: &mut Document, structure: &Structure, options: &FormatOptions) -> usize {
    ensure_body_section(doc, structure);
    let body = match structure.main_start {
        Some(start) => start..structure.references.unwrap_or(doc.len()).max(start + 1),
        None => {
            log::warn!("no main body found, header added to every section");
            0..doc.len().max(1)
        }
    };
    let mut installed = 0;
    for span in doc.sections() {
        let overlaps = span.start < body.end && span.end > body.start;
        let Some(section) = doc.section_props_mut(span.index) else {
            continue;
        };
        if overlaps {
            section.set_header(vec![header_paragraph(&options.header_text)]);
            section.margins_mut().header = Some(HEADER_DISTANCE);
            installed += 1;
        } else {
            section.set_header(vec![Paragraph::new()]);
        }
    }
    for problem in validate_headers(doc, options) {
        log::warn!("{problem}");
    }
    installed
}

/// Generated headers whose text or typography differs from the configured
/// header.
pub fn validate_headers(doc: &Document, options: &FormatOptions) -> Vec<String> {
    let mut problems = Vec::new();
    for index in 0..doc.section_count() {
        let Some(paras) = doc.section_props(index).and_then(|s| s.generated_header()) else {
            continue;
        };
        let Some(para) = paras.first() else {
            continue;
        };
        let text = para.text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let n = index + 1;
        if text != options.header_text {
            problems.push(format!("第{n}节：页眉文本不符合要求"));
        }
        if let Some(run) = para.first_run() {
            if run.props.east_asia_font() != Some("宋体") {
                problems.push(format!("第{n}节：页眉字体应为宋体"));
            }
            if run.props.size != Some(HEADER_SIZE) {
                problems.push(format!("第{n}节：页眉字号应为{HEADER_SIZE}磅"));
            }
        }
        if para.props.alignment != Some(Alignment::Center) {
            problems.push(format!("第{n}节：页眉应该居中对齐"));
        }
    }
    problems
}
