//! Rebuilds the document in canonical binding order.
//!
//! Paragraphs are moved, not copied, so formatting, embedded objects and
//! body elements carried in front of a paragraph travel with it.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Error;
use crate::model::{Alignment, Document, Paragraph, Run, RunItem, RunProps};
use crate::structure::{self, SectionKey, Structure};

pub const UNCLASSIFIED_BANNER: &str = "【以下内容未能自动归类】";

const REQUIRED: [SectionKey; 4] = [
    SectionKey::AbstractCn,
    SectionKey::Toc,
    SectionKey::MainContent,
    SectionKey::References,
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderCheck {
    pub ok: bool,
    pub issues: Vec<String>,
    pub message: String,
}

/// Missing required sections and sections out of canonical order.
pub fn validate_document_order(doc: &Document) -> OrderCheck {
    let structure = structure::analyze(doc);
    let mut issues: Vec<String> = REQUIRED
        .iter()
        .filter(|k| structure.get(**k).is_none())
        .map(|k| format!("缺少{}", k.title()))
        .collect();

    let mut last = None;
    for key in SectionKey::CANONICAL {
        let Some(pos) = structure.get(key) else {
            continue;
        };
        if last.is_some_and(|l| pos <= l) {
            issues.push(format!("{}位置不正确", key.title()));
        }
        last = Some(pos);
    }

    let message = if issues.is_empty() {
        "文档装订顺序正确".to_string()
    } else {
        format!("装订顺序问题：{}", issues.join("；"))
    };
    OrderCheck { ok: issues.is_empty(), issues, message }
}

fn banner() -> Paragraph {
    let mut props = RunProps::default();
    props.set_font("宋体");
    props.size = Some(12.0);
    props.bold = Some(true);
    let mut para = Paragraph::new();
    para.props.alignment = Some(Alignment::Center);
    para.push_run(Run::with_props(UNCLASSIFIED_BANNER, props));
    para
}

fn strip_page_breaks(para: &mut Paragraph) {
    for run in para.runs_mut() {
        run.items.retain(|item| !matches!(item, RunItem::PageBreak));
    }
}

fn ends_with_break(doc: &Document) -> bool {
    doc.paragraphs.last().is_none_or(|p| p.has_page_break())
}

fn text_counts(doc: &Document) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for para in &doc.paragraphs {
        let text = para.text().trim().to_string();
        if !text.is_empty() {
            *counts.entry(text).or_insert(0) += 1;
        }
    }
    counts
}

/// Moves every found section, in canonical order, into a new document.
/// Paragraphs in front of the first found section that carry text land at
/// the end under [`UNCLASSIFIED_BANNER`].
pub fn reorganize(mut doc: Document, structure: &Structure) -> Result<Document, Error> {
    let before = text_counts(&doc);
    let len = doc.len();
    let found = structure.found();
    let first = found.first().map_or(len, |(_, start)| *start);

    // The section break closing the front matter must still close it.
    let boundary = structure
        .main_start
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| doc.paragraphs[i].props.section.take());

    let mut slots: Vec<Option<Paragraph>> = doc.paragraphs.drain(..).map(Some).collect();
    let mut out = doc.empty_like();
    out.trailing = std::mem::take(&mut doc.trailing);

    let mut boundary = boundary;
    for key in SectionKey::CANONICAL {
        let Some(start) = structure.get(key) else {
            continue;
        };
        let end = structure.end_of(start, len);
        if !out.is_empty() {
            match (key, boundary.take()) {
                (SectionKey::MainContent, Some(section)) => {
                    if let Some(last) = out.paragraphs.last_mut() {
                        strip_page_breaks(last);
                        last.props.section = Some(section);
                    }
                }
                (_, kept) => {
                    boundary = kept;
                    let opens_with_break =
                        slots[start].as_ref().is_some_and(Paragraph::has_page_break);
                    if !ends_with_break(&out) && !opens_with_break {
                        out.add_page_break();
                    }
                }
            }
        }
        out.paragraphs.extend(slots[start..end].iter_mut().filter_map(Option::take));
        log::debug!("{} moved: {} paragraphs", key.name(), end - start);
    }

    let leftovers: Vec<Paragraph> = slots[..first]
        .iter_mut()
        .filter_map(Option::take)
        .filter(|p| !p.is_blank() || !p.preceding.is_empty() || p.props.section.is_some())
        .collect();
    if leftovers.iter().any(|p| !p.is_blank()) {
        log::warn!("{} paragraphs could not be placed in a section", leftovers.len());
        if !out.is_empty() && !ends_with_break(&out) {
            out.add_page_break();
        }
        out.push(banner());
    }
    out.paragraphs.extend(leftovers);
    if boundary.is_some() {
        log::debug!("front matter section break dropped: no main body");
    }

    let after = text_counts(&out);
    if let Some((text, _)) = before
        .iter()
        .find(|(text, n)| after.get(*text).copied().unwrap_or(0) < **n)
    {
        return Err(Error::Stage {
            stage: "reorganize",
            reason: format!("paragraph lost while reordering: {text}"),
        });
    }
    Ok(out)
}
