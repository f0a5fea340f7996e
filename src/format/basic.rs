use crate::classify::{Lang, Role};
use crate::error::Error;
use crate::model::{Alignment, LineSpacing, Paragraph, Run, RunProps};

use super::{Pass, PassContext, Patch};

fn props(font: &str, size: f32, bold: bool) -> RunProps {
    let mut props = RunProps::default();
    props.set_font(font);
    props.size = Some(size);
    props.bold = Some(bold);
    props
}

/// Clears the paragraph and re-adds `text` as one styled run.
fn rewrite(para: &mut Paragraph, text: &str, run_props: RunProps) {
    para.clear();
    para.push_run(Run::with_props(text, run_props));
}

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 18.0,
        2 => 16.0,
        _ => 14.0,
    }
}

pub(super) fn headings(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Heading);
    for (_, id, role) in ctx.classification.iter() {
        let Role::Heading { level, .. } = role else {
            continue;
        };
        patch.edit(id, move |para| {
            let text = para.text();
            rewrite(para, &text, props("宋体", heading_size(level), true));
            if level == 1 {
                para.props.alignment = Some(Alignment::Center);
            }
        });
    }
    Ok(patch)
}

/// Body text of the main part: justified, two-character indent, exact 22pt.
pub(super) fn paragraphs(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Paragraph);
    let Some(start) = ctx.structure.main_start else {
        log::info!("paragraph pass skipped: no main body");
        return Ok(patch);
    };
    let end = ctx.structure.references.unwrap_or(ctx.doc.len());
    for (i, id, role) in ctx.classification.iter() {
        if i < start || i >= end || role != Role::Body {
            continue;
        }
        if ctx.doc.starts_bold(&ctx.doc.paragraphs[i]) {
            continue;
        }
        patch.edit(id, |para| {
            para.props.alignment = Some(Alignment::Justify);
            para.props.indent.first_line = Some(24.0);
            para.props.spacing.line = Some(LineSpacing::Exact(22.0));
            para.props.spacing.before = Some(0.0);
            para.props.spacing.after = Some(0.0);
            for run in para.runs_mut() {
                run.props.set_font("宋体");
                run.props.size = Some(12.0);
            }
        });
    }
    Ok(patch)
}

pub(super) fn abstracts(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Abstract);
    for (_, id, role) in ctx.classification.iter() {
        match role {
            Role::AbstractTitle { lang } => patch.edit(id, move |para| {
                let (title, font) = match lang {
                    Lang::Cn => ("摘要", "宋体"),
                    Lang::En => ("Abstract", "Times New Roman"),
                };
                let mut run_props = RunProps::default();
                match lang {
                    Lang::Cn => run_props.set_font(font),
                    Lang::En => run_props.set_latin_font(font),
                }
                run_props.size = Some(18.0);
                run_props.bold = Some(true);
                rewrite(para, title, run_props);
                para.props.alignment = Some(Alignment::Center);
            }),
            Role::AbstractBody { lang } => patch.edit(id, move |para| {
                para.props.alignment = Some(Alignment::Justify);
                para.props.indent.first_line = Some(24.0);
                para.props.spacing.line = Some(LineSpacing::Exact(22.0));
                for run in para.runs_mut() {
                    match lang {
                        Lang::Cn => run.props.set_font("楷体"),
                        Lang::En => run.props.set_latin_font("Times New Roman"),
                    }
                    run.props.size = Some(12.0);
                }
            }),
            _ => {}
        }
    }
    Ok(patch)
}

pub(super) fn references(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Reference);
    if ctx.structure.references.is_none() {
        log::info!("reference pass skipped: no reference list");
        return Ok(patch);
    }
    for (_, id, role) in ctx.classification.iter() {
        match role {
            Role::ReferenceTitle => patch.edit(id, |para| {
                rewrite(para, "参考文献", props("宋体", 18.0, true));
                para.props.alignment = Some(Alignment::Center);
            }),
            Role::ReferenceEntry => patch.edit(id, |para| {
                para.props.alignment = Some(Alignment::Justify);
                para.props.indent.left = Some(0.0);
                para.props.indent.first_line = Some(-21.0);
                para.props.spacing.line = Some(LineSpacing::Exact(18.0));
                for run in para.runs_mut() {
                    run.props.set_font("宋体");
                    run.props.size = Some(10.5);
                }
            }),
            _ => {}
        }
    }
    Ok(patch)
}
