use std::fmt;

use serde::Serialize;

use crate::error::Error;
use crate::format::{AcknowledgmentCheck, PassOutcome};
use crate::model::Document;
use crate::options::FormatOptions;
use crate::reorganize::OrderCheck;
use crate::structure::Structure;
use crate::toc::TocSummary;

const RULE: &str = "==================================================";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckItem {
    pub name: &'static str,
    pub done: bool,
}

/// What one sequential stage did.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageNote {
    pub stage: &'static str,
    pub note: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FormatReport {
    pub checklist: Vec<CheckItem>,
    pub passes: Vec<PassOutcome>,
    pub stages: Vec<StageNote>,
    pub structure: Structure,
    pub order: Option<OrderCheck>,
    pub acknowledgment: Option<AcknowledgmentCheck>,
    pub toc: Option<TocSummary>,
    pub font_issues: Vec<String>,
    pub spacing_errors: Vec<String>,
    pub spacing_warnings: Vec<String>,
    pub header_issues: Vec<String>,
}

fn is_numbered_caption(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('图' | '表'))
        && chars.as_str().split_once('.').is_some_and(|(chapter, rest)| {
            !chapter.is_empty()
                && chapter.chars().all(|c| c.is_ascii_digit())
                && rest.starts_with(|c: char| c.is_ascii_digit())
        })
}

/// Pass/fail per item, read off the finished document.
pub fn checklist(doc: &Document, options: &FormatOptions) -> Vec<CheckItem> {
    let texts: Vec<String> = doc.paragraphs.iter().map(|p| p.text().trim().to_string()).collect();
    let any = |pred: fn(&str) -> bool| texts.iter().any(|t| pred(t));
    vec![
        CheckItem {
            name: "封面",
            done: texts.first().is_some_and(|t| t.contains(&options.institution)),
        },
        CheckItem {
            name: "承诺书",
            done: texts.iter().take(40).any(|t| t.contains("承诺书")),
        },
        CheckItem { name: "页码系统", done: doc.section_count() > 1 },
        CheckItem {
            name: "关键词格式",
            done: any(|t| t.starts_with("[关键词]") || t.starts_with("[Keywords]")),
        },
        CheckItem { name: "图表编号", done: any(is_numbered_caption) },
        CheckItem { name: "目录", done: any(|t| t == "目录") },
        CheckItem {
            name: "致谢",
            done: any(|t| t.contains("致谢") && t.chars().count() < 10),
        },
    ]
}

impl FormatReport {
    pub fn failed_passes(&self) -> impl Iterator<Item = &PassOutcome> {
        self.passes.iter().filter(|p| !p.ok())
    }

    pub fn note(&mut self, stage: &'static str, note: impl Into<String>) {
        self.stages.push(StageNote { stage, note: note.into() });
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for FormatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "论文格式化报告")?;
        writeln!(f, "{RULE}")?;
        for item in &self.checklist {
            let status = if item.done { "✓ 已完成" } else { "✗ 未完成" };
            writeln!(f, "{}: {status}", item.name)?;
        }
        writeln!(f, "{RULE}")?;

        if !self.passes.is_empty() {
            writeln!(f, "格式化步骤:")?;
            for pass in &self.passes {
                match &pass.error {
                    None => writeln!(f, "  {}: {} 段", pass.pass, pass.edited)?,
                    Some(e) => writeln!(f, "  {}: 失败 ({e})", pass.pass)?,
                }
            }
        }
        for stage in &self.stages {
            writeln!(f, "  {}: {}", stage.stage, stage.note)?;
        }
        if let Some(order) = &self.order {
            writeln!(f, "{}", order.message)?;
        }
        if let Some(ack) = &self.acknowledgment {
            writeln!(f, "{}", ack.message)?;
        }
        if self.toc.as_ref().is_some_and(|t| t.estimated) {
            writeln!(f, "注意：目录页码为估算值，请在Word中更新目录")?;
        }
        let issues = self
            .font_issues
            .iter()
            .chain(&self.spacing_errors)
            .chain(&self.header_issues);
        for issue in issues {
            writeln!(f, "  ! {issue}")?;
        }
        if !self.spacing_warnings.is_empty() {
            writeln!(f, "  {} 段行间距不是固定值", self.spacing_warnings.len())?;
        }
        Ok(())
    }
}
