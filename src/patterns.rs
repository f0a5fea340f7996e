use std::sync::LazyLock;

use regex::Regex;

pub static CHAPTER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^第\s*([一二三四五六七八九十百零〇两\d]+)\s*[章节]").unwrap()
});

pub static CHAPTER_TITLE_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^chapter\s+(\d+)\b").unwrap());

pub static HEADING_2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\s+\S").unwrap());

pub static HEADING_3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\s+\S").unwrap());

/// Trailing page number after a tab or leader dots, as in a TOC line.
pub static TOC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\t|\.{3,}|…{2,}|·{3,}|\s{4,})\s*(?:\d+|[IVXLivxl]+)\s*$").unwrap()
});

pub static ABSTRACT_CN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^摘\s*要$").unwrap());

pub static ABSTRACT_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:Abstract|ABSTRACT)$").unwrap());

pub static TOC_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^目\s*录$").unwrap());

pub static REFERENCES_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^参\s*考\s*文\s*献$").unwrap());

pub static ACKNOWLEDGMENT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:致\s*谢|谢\s*辞|acknowledge?ments?)$").unwrap()
});

pub static APPENDIX_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:附\s*录|appendix)").unwrap());

pub static APPENDIX_SUBHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z]\.\d+|[一二三四五六七八九十]+、)").unwrap());

/// Section titles that end an acknowledgment block.
pub static SECTION_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:第[一二三四五六七八九十\d]+[章节]|附\s*录|appendix|参考文献|references)")
        .unwrap()
});

pub static COVER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"毕业论文|学位论文|毕业设计").unwrap());

pub static COMMITMENT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"诚信承诺|^承诺书$").unwrap());

pub static ENDNOTES_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:注\s*释|尾\s*注|notes|endnotes)$").unwrap());

pub static KEYWORDS_CN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"关键[词字]").unwrap());

pub static KEYWORDS_EN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)key\s*words?").unwrap());

pub static KEYWORDS_CN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\[【]?\s*关键[词字]\s*[\]】]?\s*[:：]?\s*").unwrap()
});

pub static KEYWORDS_EN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*[\[【]?\s*key\s*words?\s*[\]】]?\s*[:：]?\s*").unwrap()
});

pub static KEYWORDS_CN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[，,、；;]\s*").unwrap());

pub static KEYWORDS_EN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,;，；]\s*").unwrap());

/// Caption label and its number token, if any.
pub static FIGURE_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:图|figure|fig\.?)\s*(\d+(?:\s*[-_.．]\s*\d+)*)\s*").unwrap()
});

pub static TABLE_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:表|table|tab\.?)\s*(\d+(?:\s*[-_.．]\s*\d+)*)\s*").unwrap()
});

/// In-text figure/table reference such as 图1-2 or 表 3.1.
pub static CAPTION_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([图表])\s*(\d+(?:[-_.]\d+)+|\d+)").unwrap());

pub static FORMULA_SIGNATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\s*[a-zA-Z]\s*=",
        r"=.*[+\-*/]",
        r"\\[a-zA-Z]+",
        r"[∫∑∏√∞]",
        r"\d+\s*[+\-*/]\s*\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub static FORMULA_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[(（]\s*\d+\s*[.．]\s*\d+\s*[)）]\s*$").unwrap());

/// Formula reference such as 公式3, 式(2.1) or 公式（1.2）.
pub static FORMULA_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(公式|式)\s*(?:[(（]\s*(\d+(?:\.\d+)?)\s*[)）]|(\d+(?:\.\d+)?))").unwrap()
});

pub static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]|\(\d+\)|[\u{2460}-\u{2473}]").unwrap());

pub static COVER_INFO_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:专\s*业|班\s*级|学\s*号|姓\s*名|指导教师)").unwrap());

/// Han ideographs, CJK punctuation and full-width forms.
pub fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3000}'..='\u{303f}' | '\u{ff00}'..='\u{ffef}')
}

fn digit_value(c: char) -> Option<u32> {
    Some(match c {
        '零' | '〇' => 0,
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    })
}

/// Value of a chapter number written in Arabic digits or Chinese numerals
/// up to 九百九十九.
pub fn parse_numeral(text: &str) -> Option<u32> {
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    let mut total = 0;
    let mut pending: Option<u32> = None;
    for c in text.chars() {
        match c {
            '百' => {
                total += pending.take().unwrap_or(1) * 100;
            }
            '十' => {
                total += pending.take().unwrap_or(1) * 10;
            }
            _ => pending = Some(digit_value(c)?),
        }
    }
    total += pending.unwrap_or(0);
    (total > 0).then_some(total)
}

/// Chapter number of a level-one heading, if the text is one.
pub fn chapter_number(text: &str) -> Option<u32> {
    let caps = CHAPTER_TITLE
        .captures(text)
        .or_else(|| CHAPTER_TITLE_EN.captures(text))?;
    parse_numeral(&caps[1])
}

pub fn heading_level(text: &str) -> Option<u8> {
    if CHAPTER_TITLE.is_match(text) || CHAPTER_TITLE_EN.is_match(text) {
        Some(1)
    } else if HEADING_3.is_match(text) {
        Some(3)
    } else if HEADING_2.is_match(text) {
        Some(2)
    } else {
        None
    }
}

pub fn is_formula_like(text: &str) -> bool {
    FORMULA_SIGNATURES.iter().any(|re| re.is_match(text))
}

/// Appendix label for the n-th appendix (0-based): A..H, then 9, 10, ...
pub fn appendix_label(index: usize) -> String {
    const LETTERS: &[u8] = b"ABCDEFGH";
    match LETTERS.get(index) {
        Some(&b) => (b as char).to_string(),
        None => (index + 1).to_string(),
    }
}
