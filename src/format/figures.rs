use std::collections::HashMap;
use std::sync::Arc;

use regex::Captures;

use crate::classify::{Classification, Role};
use crate::error::Error;
use crate::model::{Alignment, Document, LineSpacing, Paragraph, Run, RunItem, RunProps};
use crate::patterns::{CAPTION_REFERENCE, FIGURE_CAPTION, TABLE_CAPTION};

use super::{Pass, PassContext, Patch};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum CaptionKind {
    Figure,
    Table,
}

impl CaptionKind {
    fn of(role: Role) -> Option<Self> {
        match role {
            Role::FigureCaption => Some(CaptionKind::Figure),
            Role::TableCaption => Some(CaptionKind::Table),
            _ => None,
        }
    }

    fn label(self) -> char {
        match self {
            CaptionKind::Figure => '图',
            CaptionKind::Table => '表',
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "图" => Some(CaptionKind::Figure),
            "表" => Some(CaptionKind::Table),
            _ => None,
        }
    }
}

/// `1-2`, `1 _ 2` and `1．2` all become `1.2`.
fn normalize_number(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if matches!(c, '-' | '_' | '．') { '.' } else { c })
        .collect()
}

/// Existing number token (normalized) and the caption text after it.
fn split_caption(text: &str, kind: CaptionKind) -> (Option<String>, String) {
    let text = text.trim();
    let pattern = match kind {
        CaptionKind::Figure => &*FIGURE_CAPTION,
        CaptionKind::Table => &*TABLE_CAPTION,
    };
    if let Some(caps) = pattern.captures(text) {
        let end = caps.get(0).map_or(0, |m| m.end());
        let number = caps.get(1).map(|m| normalize_number(m.as_str()));
        return (number, text[end..].trim().to_string());
    }
    let rest = text.strip_prefix(kind.label()).unwrap_or(text);
    (None, rest.trim().to_string())
}

fn caption_text(number: &str, rest: &str) -> String {
    if rest.is_empty() {
        number.to_string()
    } else {
        format!("{number} {rest}")
    }
}

struct Numbered {
    index: usize,
    kind: CaptionKind,
    old: Option<String>,
    new: String,
}

/// Assigns `{chapter}.{count}` to every caption in document order; the
/// count restarts with each chapter.
fn number_captions(classification: &Classification, doc: &Document) -> Vec<Numbered> {
    let mut counters: HashMap<(CaptionKind, u32), u32> = HashMap::new();
    let mut out = Vec::new();
    for (i, _, role) in classification.iter() {
        let Some(kind) = CaptionKind::of(role) else {
            continue;
        };
        let chapter = classification.chapter_at(i);
        let count = counters.entry((kind, chapter)).or_insert(0);
        *count += 1;
        let (old, _) = split_caption(&doc.paragraphs[i].text(), kind);
        out.push(Numbered { index: i, kind, old, new: format!("{chapter}.{count}") });
    }
    out
}

pub type CaptionMap = HashMap<(char, String), String>;

/// Old caption number to new one, keyed by label (图/表).
pub fn caption_number_map(doc: &Document, classification: &Classification) -> CaptionMap {
    number_captions(classification, doc)
        .into_iter()
        .filter_map(|n| Some(((n.kind.label(), n.old?), n.new)))
        .collect()
}

/// Rewrites in-text references like `图1-1` through `map`. Unmapped dashed
/// forms are normalized to the dotted style. One regex pass, so a rewritten
/// reference is never rewritten again.
pub fn rewrite_references(text: &str, map: &CaptionMap) -> String {
    CAPTION_REFERENCE
        .replace_all(text, |caps: &Captures| {
            let label = &caps[1];
            let number = normalize_number(&caps[2]);
            let key = label.chars().next().map(|c| (c, number.clone()));
            match key.and_then(|k| map.get(&k)) {
                Some(new) => format!("{label}{new}"),
                None if CaptionKind::from_label(label).is_some() && number.contains('.') => {
                    format!("{label}{number}")
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Applies [`rewrite_references`] to each text item so run formatting
/// survives. Returns true if anything changed.
fn rewrite_runs(para: &mut Paragraph, map: &CaptionMap) -> bool {
    let mut changed = false;
    for run in para.runs_mut() {
        for item in &mut run.items {
            if let RunItem::Text(text) = item {
                let new = rewrite_references(text, map);
                if new != *text {
                    *text = new;
                    changed = true;
                }
            }
        }
    }
    changed
}

fn caption_props() -> RunProps {
    let mut props = RunProps::default();
    props.set_font("宋体");
    props.size = Some(12.0);
    props
}

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::FigureTable);
    let numbered = number_captions(ctx.classification, ctx.doc);

    for n in &numbered {
        let id = ctx.doc.paragraphs[n.index].id;
        let kind = n.kind;
        let number = format!("{}{}", kind.label(), n.new);
        patch.edit(id, move |para| {
            let (_, rest) = split_caption(&para.text(), kind);
            para.clear();
            para.push_run(Run::with_props(&caption_text(&number, &rest), caption_props()));
            para.props.alignment = Some(Alignment::Center);
            para.props.spacing.before = Some(6.0);
            para.props.spacing.after = Some(6.0);
            para.props.spacing.line = Some(LineSpacing::Exact(22.0));
        });
    }

    let map: Arc<CaptionMap> = Arc::new(
        numbered
            .into_iter()
            .filter_map(|n| Some(((n.kind.label(), n.old?), n.new)))
            .collect(),
    );
    for (i, id, role) in ctx.classification.iter() {
        if matches!(
            role,
            Role::FigureCaption | Role::TableCaption | Role::Heading { .. } | Role::TocEntry
        ) {
            continue;
        }
        if !CAPTION_REFERENCE.is_match(&ctx.doc.paragraphs[i].text()) {
            continue;
        }
        let map = Arc::clone(&map);
        patch.edit(id, move |para| {
            if rewrite_runs(para, &map) {
                log::debug!("updated caption references in {:?}", para.id);
            }
        });
    }
    Ok(patch)
}
