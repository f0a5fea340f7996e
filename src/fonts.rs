use std::str::FromStr;

use crate::model::{Alignment, Document, Inline, Paragraph, Run, RunItem};
use crate::patterns::is_cjk;

/// Traditional Chinese type sizes in points.
const NAMED_SIZES: &[(&str, f32)] = &[
    ("初号", 42.0),
    ("小初", 36.0),
    ("一号", 26.0),
    ("小一", 24.0),
    ("二号", 22.0),
    ("二号六", 21.0),
    ("小二", 18.0),
    ("三号", 16.0),
    ("小三", 15.0),
    ("四号", 14.0),
    ("小四", 12.0),
    ("五号", 10.5),
    ("小五", 9.0),
];

pub fn named_size(name: &str) -> Option<f32> {
    NAMED_SIZES.iter().find(|(n, _)| *n == name).map(|(_, pt)| *pt)
}

/// Point size for a named size, 小四 when the name is unknown.
pub fn size_pt(name: &str) -> f32 {
    named_size(name).unwrap_or(12.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    CoverTitle,
    AbstractTitleCn,
    AbstractTitleEn,
    ThesisTitle,
    Heading1,
    Heading2,
    Heading3,
    MainText,
    TableHeader,
    TableContent,
    FormulaVariable,
    FormulaConstant,
    Footnote,
    Reference,
    KeywordLabel,
    KeywordContent,
    PageHeader,
    FigureCaption,
    SourceNote,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontRule {
    pub cn_font: &'static str,
    pub en_font: &'static str,
    pub size: &'static str,
    pub bold: bool,
    pub italic: Option<bool>,
    pub alignment: Option<Alignment>,
}

const fn rule(
    cn_font: &'static str,
    en_font: &'static str,
    size: &'static str,
    bold: bool,
    alignment: Option<Alignment>,
) -> FontRule {
    FontRule { cn_font, en_font, size, bold, italic: None, alignment }
}

impl FontStyle {
    pub fn rule(self) -> FontRule {
        use Alignment::*;
        match self {
            FontStyle::CoverTitle => rule("宋体", "Times New Roman", "三号", true, Some(Center)),
            FontStyle::AbstractTitleCn => rule("黑体", "Arial", "二号", true, Some(Center)),
            FontStyle::AbstractTitleEn => {
                rule("Arial Black", "Arial Black", "二号", true, Some(Center))
            }
            FontStyle::ThesisTitle => rule("宋体", "Times New Roman", "二号六", true, Some(Center)),
            FontStyle::Heading1 => rule("宋体", "Times New Roman", "小三", true, Some(Left)),
            FontStyle::Heading2 => rule("宋体", "Times New Roman", "四号", true, Some(Left)),
            FontStyle::Heading3 => rule("宋体", "Times New Roman", "小四", true, Some(Left)),
            FontStyle::MainText => rule("宋体", "Times New Roman", "小四", false, Some(Justify)),
            FontStyle::TableHeader => rule("宋体", "Times New Roman", "小四", true, Some(Center)),
            FontStyle::TableContent => {
                rule("宋体", "Times New Roman", "小四", false, Some(Center))
            }
            FontStyle::FormulaVariable => FontRule {
                italic: Some(true),
                ..rule("Times New Roman", "Times New Roman", "小四", false, None)
            },
            FontStyle::FormulaConstant => FontRule {
                italic: Some(false),
                ..rule("Times New Roman", "Times New Roman", "小四", false, None)
            },
            FontStyle::Footnote => rule("宋体", "Times New Roman", "小五", false, Some(Justify)),
            FontStyle::Reference => rule("宋体", "Times New Roman", "五号", false, Some(Justify)),
            FontStyle::KeywordLabel => rule("黑体", "Arial Black", "小四", true, Some(Left)),
            FontStyle::KeywordContent => rule("楷体", "Times New Roman", "小四", false, Some(Left)),
            FontStyle::PageHeader => rule("宋体", "Times New Roman", "五号", false, Some(Center)),
            FontStyle::FigureCaption => {
                rule("宋体", "Times New Roman", "五号", false, Some(Center))
            }
            FontStyle::SourceNote => rule("宋体", "Times New Roman", "小五", false, Some(Left)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FontStyle::CoverTitle => "cover_title",
            FontStyle::AbstractTitleCn => "abstract_title_cn",
            FontStyle::AbstractTitleEn => "abstract_title_en",
            FontStyle::ThesisTitle => "thesis_title",
            FontStyle::Heading1 => "heading_1",
            FontStyle::Heading2 => "heading_2",
            FontStyle::Heading3 => "heading_3",
            FontStyle::MainText => "main_text",
            FontStyle::TableHeader => "table_header",
            FontStyle::TableContent => "table_content",
            FontStyle::FormulaVariable => "formula_variable",
            FontStyle::FormulaConstant => "formula_constant",
            FontStyle::Footnote => "footnote",
            FontStyle::Reference => "reference",
            FontStyle::KeywordLabel => "keyword_label",
            FontStyle::KeywordContent => "keyword_content",
            FontStyle::PageHeader => "page_header",
            FontStyle::FigureCaption => "figure_caption",
            FontStyle::SourceNote => "source_note",
        }
    }

    pub fn heading(level: u8) -> Self {
        match level {
            1 => FontStyle::Heading1,
            2 => FontStyle::Heading2,
            _ => FontStyle::Heading3,
        }
    }

    const ALL: [FontStyle; 19] = [
        FontStyle::CoverTitle,
        FontStyle::AbstractTitleCn,
        FontStyle::AbstractTitleEn,
        FontStyle::ThesisTitle,
        FontStyle::Heading1,
        FontStyle::Heading2,
        FontStyle::Heading3,
        FontStyle::MainText,
        FontStyle::TableHeader,
        FontStyle::TableContent,
        FontStyle::FormulaVariable,
        FontStyle::FormulaConstant,
        FontStyle::Footnote,
        FontStyle::Reference,
        FontStyle::KeywordLabel,
        FontStyle::KeywordContent,
        FontStyle::PageHeader,
        FontStyle::FigureCaption,
        FontStyle::SourceNote,
    ];
}

impl FromStr for FontStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontStyle::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| format!("unknown font style: {s}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Cjk,
    Latin,
}

fn char_script(c: char) -> Option<Script> {
    if is_cjk(c) {
        Some(Script::Cjk)
    } else if c.is_ascii_alphanumeric() || (c.is_alphabetic() && !c.is_ascii()) {
        Some(Script::Latin)
    } else {
        // Spaces and punctuation follow the text around them.
        None
    }
}

/// Dominant script of a run: CJK if it holds any CJK character.
pub fn detect_script(text: &str) -> Script {
    if text.chars().any(is_cjk) {
        Script::Cjk
    } else {
        Script::Latin
    }
}

/// Splits a run so that each piece holds text of one script. Breaks, tabs
/// and embedded objects stay with the piece they follow.
pub fn split_by_script(run: Run) -> Vec<Run> {
    let mut pieces: Vec<(Option<Script>, Vec<RunItem>)> = Vec::new();
    for item in run.items {
        let RunItem::Text(text) = item else {
            match pieces.last_mut() {
                Some((_, items)) => items.push(item),
                None => pieces.push((None, vec![item])),
            }
            continue;
        };
        for c in text.chars() {
            let script = char_script(c);
            let current = pieces.last().and_then(|(s, _)| *s);
            match (script, current) {
                (Some(s), Some(cur)) if s != cur => pieces.push((Some(s), Vec::new())),
                _ if pieces.is_empty() => pieces.push((script, Vec::new())),
                (Some(_), None) => {
                    if let Some((slot, _)) = pieces.last_mut() {
                        *slot = script;
                    }
                }
                _ => {}
            }
            if let Some((_, items)) = pieces.last_mut() {
                match items.last_mut() {
                    Some(RunItem::Text(buf)) => buf.push(c),
                    _ => items.push(RunItem::Text(c.to_string())),
                }
            }
        }
    }
    if pieces.len() <= 1 {
        let items = pieces.pop().map(|(_, items)| items).unwrap_or_default();
        return vec![Run { props: run.props, items }];
    }
    pieces
        .into_iter()
        .map(|(_, items)| Run { props: run.props.clone(), items })
        .collect()
}

/// Lookup-and-apply for the fixed font table.
#[derive(Clone, Copy, Debug, Default)]
pub struct FontManager;

impl FontManager {
    pub fn new() -> Self {
        FontManager
    }

    pub fn apply_run(&self, run: &mut Run, style: FontStyle, script: Script) {
        let rule = style.rule();
        match script {
            Script::Cjk => run.props.set_font(rule.cn_font),
            Script::Latin => {
                run.props.set_latin_font(rule.en_font);
                run.props.set_east_asia_font(rule.cn_font);
            }
        }
        run.props.size = Some(size_pt(rule.size));
        run.props.bold = Some(rule.bold);
        if let Some(italic) = rule.italic {
            run.props.italic = Some(italic);
        }
    }

    pub fn apply_paragraph(&self, para: &mut Paragraph, style: FontStyle) {
        if let Some(alignment) = style.rule().alignment {
            para.props.alignment = Some(alignment);
        }
    }

    /// Alignment plus per-script fonts for every run of the paragraph.
    /// Superscript runs (footnote markers) keep their own formatting.
    pub fn format_mixed_text(&self, para: &mut Paragraph, style: FontStyle) {
        self.apply_paragraph(para, style);
        let content = std::mem::take(&mut para.content);
        for inline in content {
            match inline {
                Inline::Run(run) if run.props.is_superscript() => {
                    para.content.push(Inline::Run(run));
                }
                Inline::Run(run) => {
                    for mut piece in split_by_script(run) {
                        let script = detect_script(&piece.text());
                        self.apply_run(&mut piece, style, script);
                        para.content.push(Inline::Run(piece));
                    }
                }
                raw @ Inline::Raw { .. } => para.content.push(raw),
            }
        }
    }

    /// Title fonts that do not match the table.
    pub fn validate(&self, doc: &Document) -> Vec<String> {
        let mut errors = Vec::new();
        for (i, para) in doc.paragraphs.iter().enumerate() {
            let text = para.text();
            let expected = match text.trim() {
                "摘要" => FontStyle::AbstractTitleCn,
                "Abstract" => FontStyle::AbstractTitleEn,
                _ => continue,
            };
            let Some(run) = para.first_run() else {
                continue;
            };
            let rule = expected.rule();
            let actual = run.props.east_asia_font().or(run.props.latin_font());
            if actual != Some(rule.cn_font) {
                errors.push(format!(
                    "第{}段：{}标题应使用{}，当前为{}",
                    i + 1,
                    text.trim(),
                    rule.cn_font,
                    actual.unwrap_or("默认字体")
                ));
            }
        }
        errors
    }
}
