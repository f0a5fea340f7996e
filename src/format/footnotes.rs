use crate::classify::Role;
use crate::error::Error;
use crate::model::{Inline, LineSpacing, Paragraph, Run, RunItem, RunProps, VertAlign};
use crate::patterns::FOOTNOTE_MARKER;

use super::{Pass, PassContext, Patch};

const MARKER_SIZE: f32 = 9.0;

fn marker_props(base: &RunProps) -> RunProps {
    let mut props = base.clone();
    props.vert_align = Some(VertAlign::Superscript);
    props.set_font("宋体");
    props.size = Some(MARKER_SIZE);
    props
}

/// Moves every footnote marker (`[n]`, `(n)`, ①..⑳) into its own
/// superscript 宋体 小五 run. A marker opening the paragraph is numbering,
/// not a reference, and stays as it is.
pub fn split_markers(para: &mut Paragraph) -> usize {
    let mut split = 0;
    let mut seen_text = false;
    let content = std::mem::take(&mut para.content);
    for inline in content {
        let run = match inline {
            Inline::Run(run) => run,
            raw @ Inline::Raw { .. } => {
                seen_text |= matches!(&raw, Inline::Raw { text, .. } if !text.trim().is_empty());
                para.content.push(raw);
                continue;
            }
        };
        if run.props.is_superscript() {
            seen_text |= !run.text().trim().is_empty();
            para.content.push(Inline::Run(run));
            continue;
        }

        let mut current = Run { props: run.props.clone(), items: Vec::new() };
        let mut pieces = Vec::new();
        for item in run.items {
            let RunItem::Text(text) = item else {
                current.items.push(item);
                continue;
            };
            let mut last = 0;
            for m in FOOTNOTE_MARKER.find_iter(&text) {
                let leading = !seen_text && text[last..m.start()].trim().is_empty();
                if leading {
                    continue;
                }
                if m.start() > last {
                    current.items.push(RunItem::Text(text[last..m.start()].to_string()));
                }
                if !current.items.is_empty() {
                    pieces.push(std::mem::replace(
                        &mut current,
                        Run { props: run.props.clone(), items: Vec::new() },
                    ));
                }
                pieces.push(Run::with_props(m.as_str(), marker_props(&run.props)));
                split += 1;
                last = m.end();
                seen_text = true;
            }
            if last < text.len() {
                let rest = &text[last..];
                seen_text |= !rest.trim().is_empty();
                current.items.push(RunItem::Text(rest.to_string()));
            }
        }
        if !current.items.is_empty() {
            pieces.push(current);
        }
        para.content.extend(pieces.into_iter().map(Inline::Run));
    }
    split
}

fn normalize_superscripts(para: &mut Paragraph) {
    for run in para.runs_mut() {
        if run.props.is_superscript() {
            run.props.set_font("宋体");
            run.props.size = Some(MARKER_SIZE);
        }
    }
}

fn format_footnote_text(para: &mut Paragraph) {
    let spacing = &mut para.props.spacing;
    spacing.line = Some(LineSpacing::Exact(12.0));
    spacing.before = Some(0.0);
    spacing.after = Some(3.0);
    para.props.indent.first_line = Some(0.0);
    for run in para.runs_mut() {
        run.props.set_font("宋体");
        run.props.size = Some(MARKER_SIZE);
    }
}

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Footnote);
    for (i, id, role) in ctx.classification.iter() {
        let para = &ctx.doc.paragraphs[i];
        match role {
            Role::Footnote => patch.edit(id, format_footnote_text),
            Role::Body => {
                let has_marker = FOOTNOTE_MARKER.is_match(&para.text());
                let has_superscript = para.runs().any(|r| r.props.is_superscript());
                if has_marker || has_superscript {
                    patch.edit(id, |para| {
                        split_markers(para);
                        normalize_superscripts(para);
                    });
                }
            }
            Role::AbstractBody { .. } | Role::AcknowledgmentBody | Role::AppendixBody => {
                if para.runs().any(|r| r.props.is_superscript()) {
                    patch.edit(id, normalize_superscripts);
                }
            }
            _ => {}
        }
    }

    // Footnote numbering restarts on every page.
    patch.edit_document(|doc| {
        for index in 0..doc.section_count() {
            if let Some(section) = doc.section_props_mut(index) {
                section.footnote_restart = Some("eachPage".to_string());
            }
        }
    });
    Ok(patch)
}
