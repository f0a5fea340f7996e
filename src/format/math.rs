use std::collections::HashMap;
use std::sync::Arc;

use regex::Captures;

use crate::classify::Role;
use crate::error::Error;
use crate::fonts::{FontManager, FontStyle, Script};
use crate::model::{
    Alignment, Inline, LineSpacing, Paragraph, Run, RunItem, TabAlignment, TabLeader, TabStop,
};
use crate::patterns::{FORMULA_NUMBER, FORMULA_REFERENCE};

use super::{Pass, PassContext, Patch};

/// Right tab for the equation number, 14cm from the margin.
const NUMBER_TAB: f32 = 14.0 * 72.0 / 2.54;

const MATH_OPERATORS: [char; 6] = ['=', '+', '-', '*', '/', '^'];

fn formula_run(text: &str) -> Run {
    let mut run = Run::new(text);
    FontManager::new().apply_run(&mut run, FontStyle::FormulaConstant, Script::Latin);
    run
}

/// Centered formula, right tab, `(chapter.n)` after the tab. A number
/// already at the end of the formula is replaced.
fn layout_formula(para: &mut Paragraph, number: &str) {
    let text = para.text();
    let formula = FORMULA_NUMBER.replace(text.trim(), "");
    let formula = formula.trim_end_matches('\t').trim().to_string();
    para.clear();
    para.props.alignment = Some(Alignment::Center);
    para.props.spacing.before = Some(6.0);
    para.props.spacing.after = Some(6.0);
    para.props.spacing.line = Some(LineSpacing::Exact(22.0));
    para.props.tabs = vec![TabStop {
        position: NUMBER_TAB,
        alignment: TabAlignment::Right,
        leader: TabLeader::None,
    }];
    para.push_run(formula_run(&formula));
    para.push_run(formula_run("\t"));
    para.push_run(formula_run(&format!("({number})")));
}

/// Single ASCII letters that are not part of a longer word.
fn variable_spans(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    for (k, &(start, c)) in chars.iter().enumerate() {
        if !c.is_ascii_alphabetic() {
            continue;
        }
        let before = k.checked_sub(1).map(|j| chars[j].1);
        let after = chars.get(k + 1).map(|&(_, c)| c);
        let isolated = !before.is_some_and(|b| b.is_ascii_alphabetic())
            && !after.is_some_and(|a| a.is_ascii_alphabetic());
        if isolated {
            spans.push((start, start + c.len_utf8()));
        }
    }
    spans
}

/// Italicizes single-letter variables in runs that contain a math operator.
/// The letters move into their own Times New Roman italic runs.
pub(crate) fn italicize_variables(para: &mut Paragraph) -> usize {
    let fonts = FontManager::new();
    let mut changed = 0;
    let content = std::mem::take(&mut para.content);
    for inline in content {
        let run = match inline {
            Inline::Run(run) => run,
            raw => {
                para.content.push(raw);
                continue;
            }
        };
        let text = run.text();
        let in_math = text.contains(MATH_OPERATORS);
        let only_text = run.items.iter().all(|i| matches!(i, RunItem::Text(_)));
        let spans = if in_math && only_text && run.props.italic != Some(true) {
            variable_spans(&text)
        } else {
            Vec::new()
        };
        if spans.is_empty() {
            para.content.push(Inline::Run(run));
            continue;
        }
        let mut last = 0;
        for (start, end) in spans {
            if start > last {
                para.content.push(Inline::Run(Run::with_props(&text[last..start], run.props.clone())));
            }
            let mut var = Run::with_props(&text[start..end], run.props.clone());
            fonts.apply_run(&mut var, FontStyle::FormulaVariable, Script::Latin);
            if let Some(size) = run.props.size {
                var.props.size = Some(size);
            }
            para.content.push(Inline::Run(var));
            last = end;
            changed += 1;
        }
        if last < text.len() {
            para.content.push(Inline::Run(Run::with_props(&text[last..], run.props.clone())));
        }
    }
    changed
}

type FormulaMap = HashMap<String, String>;

/// `公式3` / `式(1.2)` through the old-to-new map, always emitted in the
/// `公式(c.n)` form. Unknown numbers are left alone.
pub(crate) fn rewrite_formula_references(text: &str, map: &FormulaMap) -> String {
    FORMULA_REFERENCE
        .replace_all(text, |caps: &Captures| {
            let number = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            match map.get(number) {
                Some(new) => format!("{}({new})", &caps[1]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn existing_number(text: &str) -> Option<String> {
    let m = FORMULA_NUMBER.find(text.trim_end())?;
    let digits: String = m
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '．'))
        .map(|c| if c == '．' { '.' } else { c })
        .collect();
    Some(digits)
}

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Math);
    let mut counters: HashMap<u32, u32> = HashMap::new();
    let mut map = FormulaMap::new();
    let mut ordinal = 0;

    for (i, id, role) in ctx.classification.iter() {
        if role != Role::Formula {
            continue;
        }
        let chapter = ctx.classification.chapter_at(i);
        let count = counters.entry(chapter).or_insert(0);
        *count += 1;
        let number = format!("{chapter}.{count}");
        ordinal += 1;
        map.entry(ordinal.to_string()).or_insert_with(|| number.clone());
        if let Some(old) = existing_number(&ctx.doc.paragraphs[i].text()) {
            map.insert(old, number.clone());
        }
        patch.edit(id, move |para| layout_formula(para, &number));
    }

    let map = Arc::new(map);
    for (i, id, role) in ctx.classification.iter() {
        if !matches!(
            role,
            Role::Body | Role::AcknowledgmentBody | Role::AppendixBody | Role::AbstractBody { .. }
        ) {
            continue;
        }
        let text = ctx.doc.paragraphs[i].text();
        if !map.is_empty() && FORMULA_REFERENCE.is_match(&text) {
            let map = Arc::clone(&map);
            patch.edit(id, move |para| {
                for run in para.runs_mut() {
                    for item in &mut run.items {
                        if let RunItem::Text(t) = item {
                            *t = rewrite_formula_references(t, &map);
                        }
                    }
                }
            });
        }
        if role == Role::Body && text.contains(MATH_OPERATORS) {
            patch.edit(id, |para| {
                italicize_variables(para);
            });
        }
    }
    Ok(patch)
}
