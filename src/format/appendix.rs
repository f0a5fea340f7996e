use crate::classify::Role;
use crate::error::Error;
use crate::model::{Alignment, Document, LineSpacing, ParaId, Paragraph, Run, RunProps};
use crate::patterns::{APPENDIX_TITLE, appendix_label};

use super::{Pass, PassContext, Patch};

/// Title text without its `附录`/`Appendix` prefix and label. A label is a
/// capital letter not starting a word, or a number.
fn strip_label(text: &str) -> &str {
    let text = text.trim();
    let Some(m) = APPENDIX_TITLE.find(text) else {
        return text;
    };
    let rest = text[m.end()..].trim_start();
    let mut chars = rest.char_indices();
    let label_end = match chars.next() {
        Some((_, c)) if c.is_ascii_uppercase() => {
            match chars.next() {
                Some((_, next)) if next.is_ascii_lowercase() => 0,
                Some((i, _)) => i,
                None => rest.len(),
            }
        }
        Some((_, c)) if c.is_ascii_digit() => rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i),
        _ => 0,
    };
    rest[label_end..].trim_start_matches([':', '：']).trim()
}

fn title_text(ordinal: usize, original: &str) -> String {
    let label = appendix_label(ordinal);
    let rest = strip_label(original);
    if rest.is_empty() {
        format!("附录{label}")
    } else {
        format!("附录{label}  {rest}")
    }
}

fn title_run(text: &str) -> Run {
    let mut props = RunProps::default();
    props.set_font("黑体");
    props.size = Some(16.0);
    props.bold = Some(true);
    Run::with_props(text, props)
}

fn fill_missing_fonts(para: &mut Paragraph, size: f32) {
    for run in para.runs_mut() {
        if run.props.latin_font().is_none() && run.props.east_asia_font().is_none() {
            run.props.set_font("宋体");
        }
        if run.props.size.is_none() {
            run.props.size = Some(size);
        }
    }
}

fn format_content(para: &mut Paragraph) {
    para.props.indent.first_line = Some(28.0);
    para.props.spacing.line = Some(LineSpacing::Exact(20.0));
    para.props.spacing.after = Some(0.0);
    fill_missing_fonts(para, 12.0);
}

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Appendix);
    for (_, id, role) in ctx.classification.iter() {
        match role {
            Role::AppendixTitle { ordinal } => patch.edit(id, move |para| {
                let text = title_text(ordinal, &para.text());
                para.clear();
                para.push_run(title_run(&text));
                para.props.alignment = Some(Alignment::Center);
                para.props.spacing.before = Some(24.0);
                para.props.spacing.after = Some(18.0);
            }),
            Role::AppendixSubtitle => patch.edit(id, |para| {
                para.props.spacing.before = Some(12.0);
                para.props.spacing.after = Some(6.0);
                fill_missing_fonts(para, 14.0);
            }),
            Role::AppendixBody => patch.edit(id, format_content),
            _ => {}
        }
    }
    if patch.is_empty() {
        log::info!("appendix pass skipped: no appendix");
    }
    Ok(patch)
}

/// Appends a new appendix after a page break, labelled after the
/// appendices already present. Returns the id of its title paragraph.
pub fn add_appendix(doc: &mut Document, title: &str, content: &[&str]) -> ParaId {
    let existing = doc
        .paragraphs
        .iter()
        .filter(|p| {
            let text = p.text();
            let text = text.trim();
            APPENDIX_TITLE.is_match(text) && text.chars().count() <= 50
        })
        .count();
    doc.add_page_break();
    let mut heading = Paragraph::new();
    heading.props.alignment = Some(Alignment::Center);
    heading.push_run(title_run(&title_text(existing, title)));
    let id = doc.push(heading);
    for line in content.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        let mut para = Paragraph::with_text(line);
        para.props.indent.first_line = Some(28.0);
        fill_missing_fonts(&mut para, 12.0);
        doc.push(para);
    }
    id
}
