//! Table of contents regeneration.
//!
//! Page numbers are estimated from a fixed number of paragraphs per page;
//! there is no layout engine behind them.

use serde::Serialize;

use crate::classify::{Classification, Lang, Role};
use crate::model::{
    Alignment, Document, LineSpacing, ParaId, Paragraph, Run, RunProps, TabAlignment, TabLeader,
    TabStop,
};
use crate::structure::{Structure, toc_block};

/// Page-number tab, 14.5cm from the left margin.
const PAGE_TAB: f32 = 14.5 * 72.0 / 2.54;
const LEVEL_INDENT: f32 = 24.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TocEntry {
    pub text: String,
    /// 0 for unnumbered titles such as 摘要 or 参考文献.
    pub level: u8,
    pub page: String,
    pub special: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TocSummary {
    pub entries: usize,
    pub created: bool,
    pub estimated: bool,
}

pub fn to_roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Estimated page label of paragraph `index`: roman before the main body,
/// arabic counted from the main body.
pub fn estimate_page(index: usize, main_start: usize, per_page: usize) -> String {
    let per_page = per_page.max(1);
    if index < main_start {
        to_roman(index / per_page + 1)
    } else {
        ((index - main_start) / per_page + 1).to_string()
    }
}

/// Abstract titles, then headings (levels 1-3) and closing titles of the
/// main body in document order.
pub fn collect_entries(
    doc: &Document,
    classification: &Classification,
    structure: &Structure,
    per_page: usize,
) -> Vec<TocEntry> {
    let main_start = structure.main_start.unwrap_or(0);
    let mut entries = Vec::new();
    for (i, para) in doc.paragraphs.iter().enumerate() {
        let role = classification.role(para.id);
        let (level, special) = match role {
            Role::AbstractTitle { .. } => (0, true),
            Role::Heading { level, .. } if i >= main_start && level <= 3 => (level, false),
            Role::ReferenceTitle | Role::AcknowledgmentTitle | Role::AppendixTitle { .. }
                if i >= main_start =>
            {
                (0, true)
            }
            _ => continue,
        };
        let text = match role {
            Role::AbstractTitle { lang: Lang::Cn } => "摘要".to_string(),
            Role::AbstractTitle { lang: Lang::En } => "Abstract".to_string(),
            _ => para.text().trim().replace('\n', " "),
        };
        entries.push(TocEntry {
            text,
            level,
            page: estimate_page(i, main_start, per_page),
            special,
        });
    }
    entries
}

fn song(size: f32, bold: bool) -> RunProps {
    let mut props = RunProps::default();
    props.set_font("宋体");
    props.size = Some(size);
    props.bold = Some(bold);
    props
}

pub fn entry_paragraph(entry: &TocEntry) -> Paragraph {
    let mut para = Paragraph::new();
    para.props.indent.left = Some(LEVEL_INDENT * f32::from(entry.level.saturating_sub(1)));
    para.props.spacing.after = Some(0.0);
    para.props.spacing.line = Some(LineSpacing::Exact(22.0));
    para.props.tabs = vec![TabStop {
        position: PAGE_TAB,
        alignment: TabAlignment::Right,
        leader: TabLeader::Dot,
    }];
    para.push_run(Run::with_props(&entry.text, song(12.0, entry.special)));
    para.push_run(Run::with_props("\t", song(12.0, false)));
    para.push_run(Run::with_props(&entry.page, song(12.0, false)));
    para
}

fn title_paragraph() -> Paragraph {
    let mut para = Paragraph::new();
    para.props.alignment = Some(Alignment::Center);
    para.push_run(Run::with_props("目录", song(18.0, true)));
    para
}

/// Replaces the entries after the TOC title, or inserts a new TOC page in
/// front of the main body when the document has none.
pub fn update_toc(
    doc: &mut Document,
    structure: &Structure,
    classification: &Classification,
    per_page: usize,
) -> TocSummary {
    let entries = collect_entries(doc, classification, structure, per_page);

    if let Some(toc) = structure.toc {
        let title = doc.paragraphs[toc].id;
        let block = toc_block(doc, structure);
        let stale: Vec<ParaId> = classification
            .iter()
            .filter(|(i, _, role)| *role == Role::TocEntry && block.contains(i))
            .map(|(_, id, _)| id)
            .collect();
        for id in stale {
            doc.remove(id);
        }
        let at = doc.position(title).map_or(doc.len(), |p| p + 1);
        for (offset, entry) in entries.iter().enumerate() {
            doc.insert(at + offset, entry_paragraph(entry));
        }
        log::warn!("table of contents page numbers are estimates");
        return TocSummary { entries: entries.len(), created: false, estimated: true };
    }

    let Some(main_start) = structure.main_start else {
        log::info!("TOC skipped: no TOC and no main body");
        return TocSummary::default();
    };

    // The front/body section break stays in front of the main body.
    let boundary = main_start
        .checked_sub(1)
        .and_then(|i| doc.paragraphs[i].props.section.take());

    let mut page = Vec::with_capacity(entries.len() + 2);
    let after_break = main_start
        .checked_sub(1)
        .is_none_or(|i| doc.paragraphs[i].has_page_break());
    if !after_break {
        page.push(Paragraph::page_break());
    }
    page.push(title_paragraph());
    page.extend(entries.iter().map(entry_paragraph));
    match boundary {
        Some(section) => {
            if let Some(last) = page.last_mut() {
                last.props.section = Some(section);
            }
        }
        None => page.push(Paragraph::page_break()),
    }
    for (offset, para) in page.into_iter().enumerate() {
        doc.insert(main_start + offset, para);
    }
    log::warn!("table of contents created; page numbers are estimates");
    TocSummary { entries: entries.len(), created: true, estimated: true }
}
