use serde::Serialize;

use crate::classify::{Classification, Role};
use crate::error::Error;
use crate::model::{Alignment, Document, LineSpacing, Run, RunProps};

use super::{Pass, PassContext, Patch};

const MIN_CHARS: usize = 200;
const MAX_CHARS: usize = 1500;
const EXPECTED_ELEMENTS: [&str; 3] = ["导师", "老师", "感谢"];

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Acknowledgment);
    for (_, id, role) in ctx.classification.iter() {
        match role {
            Role::AcknowledgmentTitle => patch.edit(id, |para| {
                let text = para.text().trim().to_string();
                let mut props = RunProps::default();
                props.set_font("宋体");
                props.size = Some(18.0);
                props.bold = Some(true);
                para.clear();
                para.push_run(Run::with_props(&text, props));
                para.props.alignment = Some(Alignment::Center);
                para.props.spacing.before = Some(24.0);
                para.props.spacing.after = Some(18.0);
                para.props.spacing.line = Some(LineSpacing::Exact(22.0));
            }),
            Role::AcknowledgmentBody => patch.edit(id, |para| {
                para.props.alignment = Some(Alignment::Justify);
                para.props.indent.first_line = Some(24.0);
                para.props.spacing.line = Some(LineSpacing::Exact(22.0));
                para.props.spacing.before = Some(0.0);
                para.props.spacing.after = Some(0.0);
                for run in para.runs_mut() {
                    run.props.set_font("宋体");
                    run.props.size = Some(12.0);
                    run.props.bold = Some(false);
                }
            }),
            _ => {}
        }
    }
    if patch.is_empty() {
        log::info!("acknowledgment pass skipped: no acknowledgment section");
    }
    Ok(patch)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcknowledgmentCheck {
    pub found: bool,
    pub chars: usize,
    pub missing: Vec<&'static str>,
    pub message: String,
}

impl AcknowledgmentCheck {
    pub fn passed(&self) -> bool {
        self.found && self.missing.is_empty() && (MIN_CHARS..=MAX_CHARS).contains(&self.chars)
    }
}

/// Length and content checks on the acknowledgment body.
pub fn check_acknowledgment(doc: &Document, classification: &Classification) -> AcknowledgmentCheck {
    let found = classification.count(|r| r == Role::AcknowledgmentTitle) > 0;
    let content: String = classification
        .iter()
        .filter(|(_, _, role)| *role == Role::AcknowledgmentBody)
        .map(|(i, _, _)| doc.paragraphs[i].text().trim().to_string())
        .collect();
    let chars = content.chars().count();
    let missing: Vec<&'static str> = EXPECTED_ELEMENTS
        .into_iter()
        .filter(|e| !content.contains(e))
        .collect();

    let message = if !found {
        "未找到致谢部分".to_string()
    } else if chars < MIN_CHARS {
        format!("致谢内容过短（当前{chars}字，建议不少于300字）")
    } else if chars > MAX_CHARS {
        format!("致谢内容过长（当前{chars}字，建议不超过800字）")
    } else if !missing.is_empty() {
        format!("致谢内容可能缺少必要元素：{}", missing.join(", "))
    } else {
        "致谢格式符合规范".to_string()
    };
    AcknowledgmentCheck { found, chars, missing, message }
}
