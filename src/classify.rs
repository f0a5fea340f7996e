use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Document, ParaId, Paragraph};
use crate::patterns;
use crate::structure::{SectionKey, Structure, toc_block};

const ABSTRACT_BODY_WINDOW: usize = 10;
pub const KEYWORD_WINDOW: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lang {
    Cn,
    En,
}

/// Semantic role of one paragraph. Each paragraph has exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    Blank,
    Cover,
    CoverInfo,
    Commitment,
    AbstractTitle { lang: Lang },
    AbstractBody { lang: Lang },
    Keywords { lang: Lang },
    TocTitle,
    TocEntry,
    Heading { level: u8, chapter: u32 },
    FigureCaption,
    TableCaption,
    Formula,
    Footnote,
    ReferenceTitle,
    ReferenceEntry,
    AcknowledgmentTitle,
    AcknowledgmentBody,
    AppendixTitle { ordinal: usize },
    AppendixSubtitle,
    AppendixBody,
    Body,
    Unclassified,
}

impl Role {
    pub fn is_heading(self) -> bool {
        matches!(self, Role::Heading { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Classification {
    entries: Vec<(ParaId, Role)>,
    /// Chapter in effect at each paragraph; 1 before the first chapter title.
    chapters: Vec<u32>,
    index: HashMap<ParaId, usize>,
}

impl Classification {
    fn push(&mut self, id: ParaId, role: Role, chapter: u32) {
        self.index.insert(id, self.entries.len());
        self.entries.push((id, role));
        self.chapters.push(chapter);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn role(&self, id: ParaId) -> Role {
        self.index
            .get(&id)
            .map(|&i| self.entries[i].1)
            .unwrap_or(Role::Unclassified)
    }

    pub fn get(&self, id: ParaId) -> Option<Role> {
        self.index.get(&id).map(|&i| self.entries[i].1)
    }

    pub fn role_at(&self, index: usize) -> Role {
        self.entries
            .get(index)
            .map(|e| e.1)
            .unwrap_or(Role::Unclassified)
    }

    pub fn chapter_at(&self, index: usize) -> u32 {
        self.chapters.get(index).copied().unwrap_or(1)
    }

    /// `(position, id, role)` in document order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ParaId, Role)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (id, role))| (i, *id, *role))
    }

    pub fn count(&self, pred: impl Fn(Role) -> bool) -> usize {
        self.entries.iter().filter(|(_, r)| pred(*r)).count()
    }
}

struct Signals<'a> {
    doc: &'a Document,
}

impl Signals<'_> {
    fn centered(&self, p: &Paragraph) -> bool {
        self.doc.is_centered(p)
    }

    fn bold(&self, p: &Paragraph) -> bool {
        self.doc.starts_bold(p)
    }

    /// Explicit size on the first text run, not inherited from styles.
    fn explicit_size(&self, p: &Paragraph) -> Option<f32> {
        p.first_run().and_then(|r| r.props.size)
    }

    fn standalone(&self, p: &Paragraph) -> bool {
        self.centered(p) || p.props.spacing.before.is_some_and(|b| b > 6.0)
    }

    fn caption_fallback(&self, p: &Paragraph, text: &str, label: char) -> bool {
        text.starts_with(label)
            && text.chars().count() < 100
            && (self.centered(p) || self.explicit_size(p).is_some_and(|s| s <= 12.0))
    }
}

fn main_body_role(signals: &Signals, p: &Paragraph, text: &str, chapter: &mut u32) -> Role {
    let chars = text.chars().count();
    if let Some(level) = patterns::heading_level(text)
        && (chars <= 40 || signals.bold(p))
        && !patterns::TOC_LINE.is_match(text)
    {
        if level == 1 {
            *chapter = patterns::chapter_number(text).unwrap_or(*chapter);
        }
        return Role::Heading { level, chapter: *chapter };
    }
    if patterns::FIGURE_CAPTION.is_match(text) || signals.caption_fallback(p, text, '图') {
        return Role::FigureCaption;
    }
    if patterns::TABLE_CAPTION.is_match(text) || signals.caption_fallback(p, text, '表') {
        return Role::TableCaption;
    }
    if chars <= 200 && patterns::is_formula_like(text) && signals.standalone(p) {
        return Role::Formula;
    }
    if patterns::FOOTNOTE_MARKER.find(text).is_some_and(|m| m.start() == 0)
        && signals.explicit_size(p).is_some_and(|s| s <= 10.0)
    {
        return Role::Footnote;
    }
    Role::Body
}

/// Assigns one role per paragraph, region rules first, then pattern rules
/// inside the main body.
pub fn classify(doc: &Document, structure: &Structure) -> Classification {
    classify_with(doc, structure, None)
}

/// Like [`classify`], but paragraphs already present in `previous` keep
/// their earlier role so formatted paragraphs are never reclassified.
pub fn reclassify(
    doc: &Document,
    structure: &Structure,
    previous: &Classification,
) -> Classification {
    classify_with(doc, structure, Some(previous))
}

fn classify_with(
    doc: &Document,
    structure: &Structure,
    previous: Option<&Classification>,
) -> Classification {
    let signals = Signals { doc };
    let texts: Vec<String> = doc
        .paragraphs
        .iter()
        .map(|p| p.text().trim().to_string())
        .collect();

    // Keyword lines: first marker line inside the lookahead window.
    let keyword_line = |start: Option<usize>, lang: Lang| -> Option<usize> {
        let start = start?;
        let end = (start + KEYWORD_WINDOW).min(structure.end_of(start, texts.len()));
        (start + 1..end).find(|&i| match lang {
            Lang::Cn => patterns::KEYWORDS_CN.is_match(&texts[i]),
            Lang::En => patterns::KEYWORDS_EN.is_match(&texts[i]),
        })
    };
    let keywords_cn = keyword_line(structure.abstract_cn, Lang::Cn);
    let keywords_en = keyword_line(structure.abstract_en, Lang::En);
    let toc_entries = toc_block(doc, structure);

    let mut out = Classification::default();
    let mut chapter = 1;
    let mut abstract_open = true;
    let mut ack_open = true;
    let mut in_endnotes = false;
    let mut appendix_ordinal = 0;

    for (i, para) in doc.paragraphs.iter().enumerate() {
        let text = texts[i].as_str();

        if let Some(role) = previous.and_then(|prev| prev.get(para.id)) {
            if let Role::Heading { level: 1, chapter: c } = role {
                chapter = c;
            }
            if let Role::AppendixTitle { ordinal } = role {
                appendix_ordinal = ordinal + 1;
            }
            out.push(para.id, role, chapter);
            continue;
        }

        if text.is_empty() {
            out.push(para.id, Role::Blank, chapter);
            continue;
        }

        let region = structure.region_of(i);
        let is_start = region.is_some_and(|k| structure.get(k) == Some(i));
        if is_start {
            abstract_open = true;
            ack_open = true;
        }

        let role = match region {
            None => Role::Unclassified,
            Some(SectionKey::Cover) => {
                if patterns::COVER_INFO_LABEL.is_match(text) {
                    Role::CoverInfo
                } else {
                    Role::Cover
                }
            }
            Some(SectionKey::Commitment) => Role::Commitment,
            Some(key @ (SectionKey::AbstractCn | SectionKey::AbstractEn)) => {
                let (lang, keywords, start) = if key == SectionKey::AbstractCn {
                    (Lang::Cn, keywords_cn, structure.abstract_cn)
                } else {
                    (Lang::En, keywords_en, structure.abstract_en)
                };
                let start = start.unwrap_or(i);
                if is_start {
                    Role::AbstractTitle { lang }
                } else if keywords == Some(i) {
                    abstract_open = false;
                    Role::Keywords { lang }
                } else {
                    let stop = match lang {
                        Lang::Cn => text.contains("关键词") || text.contains("Abstract"),
                        Lang::En => text.contains("Keywords") || text.contains('第'),
                    };
                    if stop {
                        abstract_open = false;
                    }
                    if abstract_open && i < start + ABSTRACT_BODY_WINDOW {
                        Role::AbstractBody { lang }
                    } else {
                        Role::Body
                    }
                }
            }
            Some(SectionKey::Toc) => {
                if is_start {
                    Role::TocTitle
                } else if toc_entries.contains(&i) {
                    Role::TocEntry
                } else {
                    // Unnumbered front text such as 前言 after the contents list.
                    Role::Body
                }
            }
            Some(SectionKey::MainContent) => {
                if patterns::ENDNOTES_TITLE.is_match(text) && signals.bold(para) {
                    in_endnotes = true;
                    Role::Body
                } else if in_endnotes && patterns::FOOTNOTE_MARKER.find(text).is_some_and(|m| m.start() == 0) {
                    Role::Footnote
                } else {
                    let role = main_body_role(&signals, para, text, &mut chapter);
                    if role.is_heading() {
                        in_endnotes = false;
                    }
                    role
                }
            }
            Some(SectionKey::References) => {
                if is_start {
                    Role::ReferenceTitle
                } else {
                    Role::ReferenceEntry
                }
            }
            Some(SectionKey::Acknowledgment) => {
                if is_start {
                    Role::AcknowledgmentTitle
                } else if ack_open && !patterns::SECTION_TITLE.is_match(text) {
                    Role::AcknowledgmentBody
                } else {
                    ack_open = false;
                    Role::Body
                }
            }
            Some(SectionKey::Appendix) => {
                if is_start || (patterns::APPENDIX_TITLE.is_match(text) && text.chars().count() <= 50) {
                    let ordinal = appendix_ordinal;
                    appendix_ordinal += 1;
                    Role::AppendixTitle { ordinal }
                } else if text.chars().count() < 50
                    && (signals.bold(para) || patterns::APPENDIX_SUBHEADING.is_match(text))
                {
                    Role::AppendixSubtitle
                } else {
                    Role::AppendixBody
                }
            }
        };

        if region == Some(SectionKey::Acknowledgment) && para.has_page_break() {
            ack_open = false;
        }

        out.push(para.id, role, chapter);
    }

    out
}
