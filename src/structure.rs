use std::collections::HashSet;
use std::ops::Range;

use serde::Serialize;

use crate::model::{Document, Paragraph};
use crate::patterns;

/// Named sections in canonical document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Cover,
    Commitment,
    AbstractCn,
    AbstractEn,
    Toc,
    MainContent,
    References,
    Acknowledgment,
    Appendix,
}

impl SectionKey {
    pub const CANONICAL: [SectionKey; 9] = [
        SectionKey::Cover,
        SectionKey::Commitment,
        SectionKey::AbstractCn,
        SectionKey::AbstractEn,
        SectionKey::Toc,
        SectionKey::MainContent,
        SectionKey::References,
        SectionKey::Acknowledgment,
        SectionKey::Appendix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKey::Cover => "cover",
            SectionKey::Commitment => "commitment",
            SectionKey::AbstractCn => "abstract_cn",
            SectionKey::AbstractEn => "abstract_en",
            SectionKey::Toc => "toc",
            SectionKey::MainContent => "main_content",
            SectionKey::References => "references",
            SectionKey::Acknowledgment => "acknowledgment",
            SectionKey::Appendix => "appendix",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKey::Cover => "封面",
            SectionKey::Commitment => "承诺书",
            SectionKey::AbstractCn => "中文摘要",
            SectionKey::AbstractEn => "英文摘要",
            SectionKey::Toc => "目录",
            SectionKey::MainContent => "正文",
            SectionKey::References => "参考文献",
            SectionKey::Acknowledgment => "致谢",
            SectionKey::Appendix => "附录",
        }
    }
}

/// Paragraph index of each section's title paragraph, `None` when absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Structure {
    pub cover: Option<usize>,
    pub commitment: Option<usize>,
    pub abstract_cn: Option<usize>,
    pub abstract_en: Option<usize>,
    pub toc: Option<usize>,
    pub main_start: Option<usize>,
    pub references: Option<usize>,
    pub acknowledgment: Option<usize>,
    pub appendix: Option<usize>,
}

impl Structure {
    pub fn get(&self, key: SectionKey) -> Option<usize> {
        match key {
            SectionKey::Cover => self.cover,
            SectionKey::Commitment => self.commitment,
            SectionKey::AbstractCn => self.abstract_cn,
            SectionKey::AbstractEn => self.abstract_en,
            SectionKey::Toc => self.toc,
            SectionKey::MainContent => self.main_start,
            SectionKey::References => self.references,
            SectionKey::Acknowledgment => self.acknowledgment,
            SectionKey::Appendix => self.appendix,
        }
    }

    fn slot(&mut self, key: SectionKey) -> &mut Option<usize> {
        match key {
            SectionKey::Cover => &mut self.cover,
            SectionKey::Commitment => &mut self.commitment,
            SectionKey::AbstractCn => &mut self.abstract_cn,
            SectionKey::AbstractEn => &mut self.abstract_en,
            SectionKey::Toc => &mut self.toc,
            SectionKey::MainContent => &mut self.main_start,
            SectionKey::References => &mut self.references,
            SectionKey::Acknowledgment => &mut self.acknowledgment,
            SectionKey::Appendix => &mut self.appendix,
        }
    }

    /// First match wins: a key already set is never overwritten.
    fn set_once(&mut self, key: SectionKey, index: usize) -> bool {
        let slot = self.slot(key);
        if slot.is_none() {
            *slot = Some(index);
            true
        } else {
            false
        }
    }

    fn any_set(&self) -> bool {
        SectionKey::CANONICAL.iter().any(|k| self.get(*k).is_some())
    }

    /// Found sections sorted by position.
    pub fn found(&self) -> Vec<(SectionKey, usize)> {
        let mut found: Vec<_> = SectionKey::CANONICAL
            .iter()
            .filter_map(|k| self.get(*k).map(|i| (*k, i)))
            .collect();
        found.sort_by_key(|(k, i)| (*i, *k));
        found
    }

    /// Start of the next found section after `index`, or `len`.
    pub fn end_of(&self, index: usize, len: usize) -> usize {
        self.found()
            .into_iter()
            .map(|(_, i)| i)
            .find(|&i| i > index)
            .unwrap_or(len)
    }

    /// Section whose range contains `index`.
    pub fn region_of(&self, index: usize) -> Option<SectionKey> {
        self.found()
            .into_iter()
            .take_while(|(_, start)| *start <= index)
            .last()
            .map(|(k, _)| k)
    }
}

fn breaks_before(para: &Paragraph) -> bool {
    para.props.extra.iter().any(|e| e.name == "pageBreakBefore")
}

/// Paragraphs of the contents list after the TOC title: entry lines and
/// blanks. The block ends at a page or section break, at the next found
/// section, or at the first line that is neither shaped like an entry nor
/// repeated further down. Empty when there is no TOC.
pub fn toc_block(doc: &Document, structure: &Structure) -> Range<usize> {
    let Some(toc) = structure.toc else {
        return 0..0;
    };
    let limit = structure.end_of(toc, doc.len());
    let texts: Vec<String> = doc
        .paragraphs
        .iter()
        .map(|p| p.text().trim().to_string())
        .collect();

    let mut end = toc + 1;
    while end < limit {
        let para = &doc.paragraphs[end];
        if breaks_before(para) || doc.paragraphs[end - 1].props.section.is_some() {
            break;
        }
        let text = texts[end].as_str();
        if text.is_empty() {
            if para.has_page_break() {
                break;
            }
            end += 1;
            continue;
        }
        let entry =
            patterns::TOC_LINE.is_match(text) || texts[end + 1..].iter().any(|t| t == text);
        if !entry {
            break;
        }
        end += 1;
        if para.has_page_break() {
            break;
        }
    }
    toc + 1..end
}

/// Single forward scan locating section title paragraphs.
pub fn analyze(doc: &Document) -> Structure {
    let texts: Vec<String> = doc
        .paragraphs
        .iter()
        .map(|p| p.text().trim().to_string())
        .collect();
    let mut structure = Structure::default();
    let mut in_toc = false;
    let mut seen_later: HashSet<&str> = HashSet::new();
    // Texts that occur again further down; inside a TOC block these are entries.
    let mut repeated: HashSet<usize> = HashSet::new();
    for (i, text) in texts.iter().enumerate().rev() {
        if !text.is_empty() && !seen_later.insert(text.as_str()) {
            repeated.insert(i);
        }
    }

    for (i, para) in doc.paragraphs.iter().enumerate() {
        let text = texts[i].as_str();
        if breaks_before(para) || (i > 0 && doc.paragraphs[i - 1].props.section.is_some()) {
            in_toc = false;
        }
        if text.is_empty() {
            if para.has_page_break() {
                in_toc = false;
            }
            continue;
        }
        let toc_entry = in_toc && (repeated.contains(&i) || patterns::TOC_LINE.is_match(text));
        let short = text.chars().count() <= 30;

        if patterns::TOC_TITLE.is_match(text) {
            if structure.set_once(SectionKey::Toc, i) {
                in_toc = true;
            }
        } else if toc_entry {
            // Entry of the contents list, not a section title.
        } else if patterns::ABSTRACT_CN.is_match(text) {
            structure.set_once(SectionKey::AbstractCn, i);
        } else if patterns::ABSTRACT_EN.is_match(text) {
            structure.set_once(SectionKey::AbstractEn, i);
        } else if patterns::REFERENCES_TITLE.is_match(text) {
            structure.set_once(SectionKey::References, i);
        } else if patterns::ACKNOWLEDGMENT_TITLE.is_match(text) {
            structure.set_once(SectionKey::Acknowledgment, i);
        } else if patterns::APPENDIX_TITLE.is_match(text)
            && short
            && !patterns::TOC_LINE.is_match(text)
        {
            structure.set_once(SectionKey::Appendix, i);
        } else if patterns::heading_level(text) == Some(1) && !patterns::TOC_LINE.is_match(text) {
            if structure.set_once(SectionKey::MainContent, i) {
                in_toc = false;
            }
        } else if patterns::COMMITMENT_TITLE.is_match(text) && text.chars().count() <= 20 {
            structure.set_once(SectionKey::Commitment, i);
        } else if patterns::COVER_MARKER.is_match(text)
            && text.chars().count() <= 40
            && !structure.any_set()
        {
            // Everything before the marker (institution, title) is cover too.
            structure.set_once(SectionKey::Cover, 0);
        }

        if para.has_page_break() {
            in_toc = false;
        }
    }

    log::debug!("structure: {structure:?}");
    structure
}
