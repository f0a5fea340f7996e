use crate::classify::{Classification, Role};
use crate::model::{Document, LineSpacing, Paragraph};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpacingKind {
    CoverInfo,
    MainText,
    Footnote,
    Reference,
    Abstract,
    Toc,
    Heading1,
    Heading2,
    Heading3,
    FigureCaption,
    TableCaption,
    Keywords,
    Formula,
}

/// Exact line height and the space around a paragraph, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpacingRule {
    pub line: f32,
    pub before: f32,
    pub after: f32,
}

const fn exact(line: f32, before: f32, after: f32) -> SpacingRule {
    SpacingRule { line, before, after }
}

impl SpacingKind {
    pub fn rule(self) -> SpacingRule {
        match self {
            SpacingKind::CoverInfo => exact(28.0, 0.0, 0.0),
            SpacingKind::MainText => exact(22.0, 0.0, 0.0),
            SpacingKind::Footnote => exact(12.0, 0.0, 3.0),
            SpacingKind::Reference => exact(18.0, 0.0, 0.0),
            SpacingKind::Abstract => exact(22.0, 0.0, 0.0),
            SpacingKind::Toc => exact(20.0, 0.0, 0.0),
            SpacingKind::Heading1 => exact(22.0, 12.0, 6.0),
            SpacingKind::Heading2 => exact(22.0, 6.0, 6.0),
            SpacingKind::Heading3 => exact(22.0, 6.0, 3.0),
            SpacingKind::FigureCaption => exact(18.0, 6.0, 6.0),
            SpacingKind::TableCaption => exact(18.0, 6.0, 3.0),
            SpacingKind::Keywords => exact(22.0, 6.0, 6.0),
            SpacingKind::Formula => exact(22.0, 6.0, 6.0),
        }
    }

    pub fn heading(level: u8) -> Self {
        match level {
            1 => SpacingKind::Heading1,
            2 => SpacingKind::Heading2,
            _ => SpacingKind::Heading3,
        }
    }

    /// Spacing applied by the spacing stage. Roles whose own pass sets the
    /// spacing (titles, keywords, formulas, appendix) map to `None`.
    pub fn for_role(role: Role) -> Option<Self> {
        Some(match role {
            Role::CoverInfo => SpacingKind::CoverInfo,
            Role::Heading { level, .. } => SpacingKind::heading(level),
            Role::ReferenceEntry => SpacingKind::Reference,
            Role::FigureCaption => SpacingKind::FigureCaption,
            Role::TableCaption => SpacingKind::TableCaption,
            Role::AbstractBody { .. } => SpacingKind::Abstract,
            Role::TocEntry => SpacingKind::Toc,
            Role::Footnote => SpacingKind::Footnote,
            Role::Body | Role::AcknowledgmentBody => SpacingKind::MainText,
            _ => return None,
        })
    }
}

pub fn apply(para: &mut Paragraph, kind: SpacingKind) {
    let rule = kind.rule();
    let spacing = &mut para.props.spacing;
    spacing.line = Some(LineSpacing::Exact(rule.line));
    spacing.before = Some(rule.before);
    spacing.after = Some(rule.after);
}

/// Applies role-based spacing to every non-blank paragraph. Returns the
/// number of paragraphs touched.
pub fn apply_document(doc: &mut Document, classification: &Classification) -> usize {
    let mut touched = 0;
    for para in &mut doc.paragraphs {
        if para.is_blank() {
            continue;
        }
        if let Some(kind) = SpacingKind::for_role(classification.role(para.id)) {
            apply(para, kind);
            touched += 1;
        }
    }
    touched
}

/// Paragraphs whose spacing is not exact, and reference entries off 18pt.
pub fn validate(doc: &Document, classification: &Classification) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (i, para) in doc.paragraphs.iter().enumerate() {
        if para.is_blank() {
            continue;
        }
        let line = para.props.spacing.line;
        if !matches!(line, Some(LineSpacing::Exact(_))) {
            warnings.push(format!("第{}段：行间距不是固定值", i + 1));
        }
        if classification.role(para.id) == Role::ReferenceEntry
            && line != Some(LineSpacing::Exact(18.0))
        {
            errors.push(format!("第{}段：参考文献区域行间距应为18磅", i + 1));
        }
    }
    (errors, warnings)
}
