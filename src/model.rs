use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Stable paragraph handle. Positions are derived by looking the id up in
/// the live paragraph list, so handles survive insertions and deletions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParaId(u32);

static NEXT_PARA_ID: AtomicU32 = AtomicU32::new(1);

impl ParaId {
    pub fn fresh() -> Self {
        ParaId(NEXT_PARA_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An element the model does not interpret, re-emitted verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct RawXml {
    pub name: String,
    pub xml: String,
}

impl RawXml {
    pub fn new(name: &str, xml: impl Into<String>) -> Self {
        RawXml { name: name.to_string(), xml: xml.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineSpacing {
    Exact(f32),
    AtLeast(f32),
    Multiple(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TabAlignment {
    Left,
    Center,
    Right,
    Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TabLeader {
    None,
    Dot,
    Hyphen,
    Underscore,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabStop {
    pub position: f32, // points from the left margin
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertAlign {
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunFonts {
    pub ascii: Option<String>,
    pub h_ansi: Option<String>,
    pub east_asia: Option<String>,
    /// Remaining rFonts attributes (cs, hint, theme references) by local name.
    pub other: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProps {
    pub style: Option<String>,
    pub fonts: RunFonts,
    pub size: Option<f32>, // points
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub vert_align: Option<VertAlign>,
    pub extra: Vec<RawXml>,
}

impl RunProps {
    /// Font used for Latin script. Theme references would override it, so they go.
    pub fn set_latin_font(&mut self, name: &str) {
        self.fonts.ascii = Some(name.to_string());
        self.fonts.h_ansi = Some(name.to_string());
        self.fonts
            .other
            .retain(|(k, _)| k != "asciiTheme" && k != "hAnsiTheme");
    }

    pub fn set_east_asia_font(&mut self, name: &str) {
        self.fonts.east_asia = Some(name.to_string());
        self.fonts.other.retain(|(k, _)| k != "eastAsiaTheme");
    }

    /// Same family for every script.
    pub fn set_font(&mut self, name: &str) {
        self.set_latin_font(name);
        self.set_east_asia_font(name);
    }

    pub fn latin_font(&self) -> Option<&str> {
        self.fonts.ascii.as_deref()
    }

    pub fn east_asia_font(&self) -> Option<&str> {
        self.fonts.east_asia.as_deref()
    }

    pub fn is_superscript(&self) -> bool {
        self.vert_align == Some(VertAlign::Superscript)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunItem {
    Text(String),
    Tab,
    LineBreak,
    PageBreak,
    /// Live field evaluated by the viewer, e.g. ` PAGE \* roman `.
    Field(String),
    Raw(RawXml),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub props: RunProps,
    pub items: Vec<RunItem>,
}

fn text_items(text: &str) -> Vec<RunItem> {
    let mut items = Vec::new();
    let mut buf = String::new();
    for c in text.chars() {
        let special = match c {
            '\t' => Some(RunItem::Tab),
            '\n' => Some(RunItem::LineBreak),
            '\u{c}' => Some(RunItem::PageBreak),
            _ => None,
        };
        match special {
            Some(item) => {
                if !buf.is_empty() {
                    items.push(RunItem::Text(std::mem::take(&mut buf)));
                }
                items.push(item);
            }
            None => buf.push(c),
        }
    }
    if !buf.is_empty() {
        items.push(RunItem::Text(buf));
    }
    items
}

impl Run {
    pub fn new(text: &str) -> Self {
        Run { props: RunProps::default(), items: text_items(text) }
    }

    pub fn with_props(text: &str, props: RunProps) -> Self {
        Run { props, items: text_items(text) }
    }

    pub fn page_break() -> Self {
        Run { props: RunProps::default(), items: vec![RunItem::PageBreak] }
    }

    pub fn field(instruction: &str) -> Self {
        Run {
            props: RunProps::default(),
            items: vec![RunItem::Field(instruction.to_string())],
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                RunItem::Text(t) => out.push_str(t),
                RunItem::Tab => out.push('\t'),
                RunItem::LineBreak => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    /// True if the run holds an explicit page break.
    pub fn has_page_break(&self) -> bool {
        self.items.iter().any(|i| matches!(i, RunItem::PageBreak))
    }

    fn has_embedded_object(&self) -> bool {
        self.items.iter().any(|i| matches!(i, RunItem::Raw(_) | RunItem::Field(_)))
    }
}

/// Paragraph-level inline content: either a run or an element such as a
/// hyperlink, bookmark or math zone that is preserved as-is. The raw form
/// keeps its plain text so classification can still read it.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Run(Run),
    Raw { xml: RawXml, text: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Indent {
    pub left: Option<f32>,
    pub right: Option<f32>,
    /// Negative values are hanging indents.
    pub first_line: Option<f32>,
    /// Character-unit attributes (firstLineChars etc.), written only while
    /// the matching point value is unset.
    pub chars: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub before: Option<f32>,
    pub after: Option<f32>,
    pub line: Option<LineSpacing>,
    /// Line-unit and autospacing attributes, same rule as `Indent::chars`.
    pub other: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphProps {
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    pub indent: Indent,
    pub spacing: Spacing,
    pub tabs: Vec<TabStop>,
    /// Present when this paragraph ends a section.
    pub section: Option<Box<SectionProps>>,
    pub extra: Vec<RawXml>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub id: ParaId,
    pub props: ParagraphProps,
    pub content: Vec<Inline>,
    /// Body-level elements (tables, content controls) that sat directly
    /// before this paragraph; they move with it.
    pub preceding: Vec<RawXml>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Paragraph::new()
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Paragraph {
            id: ParaId::fresh(),
            props: ParagraphProps::default(),
            content: Vec::new(),
            preceding: Vec::new(),
        }
    }

    pub fn with_text(text: &str) -> Self {
        let mut p = Paragraph::new();
        if !text.is_empty() {
            p.push_run(Run::new(text));
        }
        p
    }

    pub fn page_break() -> Self {
        let mut p = Paragraph::new();
        p.push_run(Run::page_break());
        p
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.content {
            match inline {
                Inline::Run(run) => out.push_str(&run.text()),
                Inline::Raw { text, .. } => out.push_str(text),
            }
        }
        out
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|i| match i {
            Inline::Run(r) => Some(r),
            Inline::Raw { .. } => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|i| match i {
            Inline::Run(r) => Some(r),
            Inline::Raw { .. } => None,
        })
    }

    /// First run carrying text, the one heuristics inspect for boldness/size.
    pub fn first_run(&self) -> Option<&Run> {
        self.runs().find(|r| !r.text().is_empty())
    }

    pub fn push_run(&mut self, run: Run) -> &mut Run {
        self.content.push(Inline::Run(run));
        match self.content.last_mut() {
            Some(Inline::Run(r)) => r,
            _ => unreachable!("just pushed a run"),
        }
    }

    /// Removes textual content, keeping objects that carry no text
    /// (drawings, bookmarks, fields) so they survive a rewrite.
    pub fn clear(&mut self) {
        self.content.retain(|inline| match inline {
            Inline::Run(run) => run.has_embedded_object() && run.text().is_empty(),
            Inline::Raw { text, .. } => text.is_empty(),
        });
        for run in self.runs_mut() {
            run.items.retain(|i| matches!(i, RunItem::Raw(_) | RunItem::Field(_)));
        }
    }

    /// Rewrites the text into a single run that keeps the formatting of the
    /// first text run. No-op when the text is unchanged.
    pub fn replace_text(&mut self, text: &str) {
        if self.text() == text {
            return;
        }
        let props = self.first_run().map(|r| r.props.clone()).unwrap_or_default();
        self.clear();
        self.push_run(Run::with_props(text, props));
    }

    pub fn has_page_break(&self) -> bool {
        self.runs().any(Run::has_page_break)
    }

    pub fn is_page_break_only(&self) -> bool {
        self.has_page_break() && self.is_blank()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeaderFooterKind {
    Default,
    First,
    Even,
}

impl HeaderFooterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderFooterKind::Default => "default",
            HeaderFooterKind::First => "first",
            HeaderFooterKind::Even => "even",
        }
    }

    pub fn parse(val: &str) -> Self {
        match val {
            "first" => HeaderFooterKind::First,
            "even" => HeaderFooterKind::Even,
            _ => HeaderFooterKind::Default,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HeaderFooterSource {
    /// Part already in the package, by relationship id.
    Existing(String),
    /// Part written on save.
    Generated(Vec<Paragraph>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderFooterRef {
    pub kind: HeaderFooterKind,
    pub source: HeaderFooterSource,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageMargins {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub header: Option<f32>,
    pub footer: Option<f32>,
    pub gutter: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageNumbering {
    pub format: Option<String>, // w:fmt, e.g. "lowerRoman"
    pub start: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionProps {
    pub headers: Vec<HeaderFooterRef>,
    pub footers: Vec<HeaderFooterRef>,
    pub margins: Option<PageMargins>,
    pub page_numbering: Option<PageNumbering>,
    pub footnote_restart: Option<String>,
    pub footnote_extra: Vec<RawXml>,
    pub extra: Vec<RawXml>,
}

impl SectionProps {
    pub fn a4() -> Self {
        SectionProps {
            margins: Some(PageMargins {
                top: Some(72.0),
                right: Some(72.0),
                bottom: Some(72.0),
                left: Some(90.0),
                header: Some(42.55),
                footer: Some(49.6),
                gutter: Some(0.0),
            }),
            extra: vec![
                RawXml::new("pgSz", r#"<w:pgSz w:w="11906" w:h="16838"/>"#),
                RawXml::new("cols", r#"<w:cols w:space="425"/>"#),
                RawXml::new("docGrid", r#"<w:docGrid w:type="lines" w:linePitch="312"/>"#),
            ],
            ..Default::default()
        }
    }

    /// Replaces every header reference with a single default one.
    pub fn set_header(&mut self, paragraphs: Vec<Paragraph>) {
        self.headers = vec![HeaderFooterRef {
            kind: HeaderFooterKind::Default,
            source: HeaderFooterSource::Generated(paragraphs),
        }];
    }

    pub fn set_footer(&mut self, paragraphs: Vec<Paragraph>) {
        self.footers = vec![HeaderFooterRef {
            kind: HeaderFooterKind::Default,
            source: HeaderFooterSource::Generated(paragraphs),
        }];
    }

    pub fn generated_header(&self) -> Option<&[Paragraph]> {
        generated(&self.headers)
    }

    pub fn generated_footer(&self) -> Option<&[Paragraph]> {
        generated(&self.footers)
    }

    pub fn margins_mut(&mut self) -> &mut PageMargins {
        self.margins.get_or_insert_with(PageMargins::default)
    }
}

fn generated(refs: &[HeaderFooterRef]) -> Option<&[Paragraph]> {
    refs.iter().find_map(|r| match &r.source {
        HeaderFooterSource::Generated(p) if r.kind == HeaderFooterKind::Default => {
            Some(p.as_slice())
        }
        _ => None,
    })
}

/// Contiguous paragraph range belonging to one section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionSpan {
    pub index: usize,
    pub start: usize,
    pub end: usize, // exclusive
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleDefaults {
    pub bold: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphStyle {
    pub bold: Option<bool>,
    pub alignment: Option<Alignment>,
    pub based_on: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    pub defaults: StyleDefaults,
    pub paragraph_styles: HashMap<String, ParagraphStyle>,
    pub default_paragraph_style: Option<String>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheet {
            defaults: StyleDefaults { bold: false },
            paragraph_styles: HashMap::new(),
            default_paragraph_style: None,
        }
    }
}

impl StyleSheet {
    /// Walks the basedOn chain of a paragraph style, nearest first.
    fn chain<'a>(&'a self, style_id: Option<&'a str>) -> impl Iterator<Item = &'a ParagraphStyle> {
        let mut next = style_id.or(self.default_paragraph_style.as_deref());
        let mut depth = 0;
        std::iter::from_fn(move || {
            if depth > 8 {
                return None;
            }
            depth += 1;
            let style = self.paragraph_styles.get(next?)?;
            next = style.based_on.as_deref();
            Some(style)
        })
    }

    pub fn bold(&self, style_id: Option<&str>) -> bool {
        self.chain(style_id)
            .find_map(|s| s.bold)
            .unwrap_or(self.defaults.bold)
    }

    pub fn alignment(&self, style_id: Option<&str>) -> Option<Alignment> {
        self.chain(style_id).find_map(|s| s.alignment)
    }
}

/// Everything in the .docx container besides the main document part.
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    /// Zip entries in original order, `word/document.xml` excluded.
    pub parts: Vec<(String, Vec<u8>)>,
    /// Namespace declarations of the source `w:document` root (prefix, uri).
    pub namespaces: Vec<(String, String)>,
    /// Other root attributes such as `mc:Ignorable`, qualified name first.
    pub root_attributes: Vec<(String, String)>,
}

impl Package {
    pub fn blank() -> Self {
        crate::writer::blank_package()
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    /// Body-level elements after the last paragraph.
    pub trailing: Vec<RawXml>,
    pub body_section: SectionProps,
    pub styles: StyleSheet,
    pub package: Package,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            paragraphs: Vec::new(),
            trailing: Vec::new(),
            body_section: SectionProps::a4(),
            styles: StyleSheet::default(),
            package: Package::blank(),
        }
    }

    /// Empty document sharing this one's package, styles and final section.
    pub fn empty_like(&self) -> Self {
        Document {
            paragraphs: Vec::new(),
            trailing: Vec::new(),
            body_section: self.body_section.clone(),
            styles: self.styles.clone(),
            package: self.package.clone(),
        }
    }

    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut doc = Document::new();
        for t in texts {
            doc.paragraphs.push(Paragraph::with_text(t));
        }
        doc
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn push(&mut self, paragraph: Paragraph) -> ParaId {
        let id = paragraph.id;
        self.paragraphs.push(paragraph);
        id
    }

    pub fn push_text(&mut self, text: &str) -> ParaId {
        self.push(Paragraph::with_text(text))
    }

    pub fn add_page_break(&mut self) -> ParaId {
        self.push(Paragraph::page_break())
    }

    pub fn insert(&mut self, index: usize, paragraph: Paragraph) -> ParaId {
        let id = paragraph.id;
        let index = index.min(self.paragraphs.len());
        self.paragraphs.insert(index, paragraph);
        id
    }

    pub fn remove(&mut self, id: ParaId) -> Option<Paragraph> {
        let pos = self.position(id)?;
        let removed = self.paragraphs.remove(pos);
        // Carried body elements must not vanish with their paragraph.
        if !removed.preceding.is_empty() {
            match self.paragraphs.get_mut(pos) {
                Some(next) => {
                    let mut carried = removed.preceding.clone();
                    carried.append(&mut next.preceding);
                    next.preceding = carried;
                }
                None => self.trailing.splice(0..0, removed.preceding.clone()).for_each(drop),
            }
        }
        Some(removed)
    }

    pub fn position(&self, id: ParaId) -> Option<usize> {
        self.paragraphs.iter().position(|p| p.id == id)
    }

    pub fn index_map(&self) -> HashMap<ParaId, usize> {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect()
    }

    pub fn get(&self, id: ParaId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParaId) -> Option<&mut Paragraph> {
        self.paragraphs.iter_mut().find(|p| p.id == id)
    }

    pub fn texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(Paragraph::text).collect()
    }

    /// Paragraph ranges per section, in document order. The final span is
    /// governed by `body_section`.
    pub fn sections(&self) -> Vec<SectionSpan> {
        let mut spans = Vec::new();
        let mut start = 0;
        for (i, p) in self.paragraphs.iter().enumerate() {
            if p.props.section.is_some() {
                spans.push(SectionSpan { index: spans.len(), start, end: i + 1 });
                start = i + 1;
            }
        }
        spans.push(SectionSpan {
            index: spans.len(),
            start,
            end: self.paragraphs.len(),
        });
        spans
    }

    pub fn section_count(&self) -> usize {
        self.sections().len()
    }

    /// Section properties by section ordinal.
    pub fn section_props_mut(&mut self, index: usize) -> Option<&mut SectionProps> {
        let mut seen = 0;
        for p in &mut self.paragraphs {
            if let Some(sect) = p.props.section.as_deref_mut() {
                if seen == index {
                    return Some(sect);
                }
                seen += 1;
            }
        }
        (seen == index).then_some(&mut self.body_section)
    }

    pub fn section_props(&self, index: usize) -> Option<&SectionProps> {
        let mut seen = 0;
        for p in &self.paragraphs {
            if let Some(sect) = p.props.section.as_deref() {
                if seen == index {
                    return Some(sect);
                }
                seen += 1;
            }
        }
        (seen == index).then_some(&self.body_section)
    }

    pub fn effective_bold(&self, para: &Paragraph, run: &Run) -> bool {
        run.props
            .bold
            .unwrap_or_else(|| self.styles.bold(para.props.style.as_deref()))
    }

    pub fn effective_alignment(&self, para: &Paragraph) -> Alignment {
        para.props
            .alignment
            .or_else(|| self.styles.alignment(para.props.style.as_deref()))
            .unwrap_or(Alignment::Left)
    }

    /// "Is the first run bold", with style inheritance.
    pub fn starts_bold(&self, para: &Paragraph) -> bool {
        para.first_run().is_some_and(|r| self.effective_bold(para, r))
    }

    pub fn is_centered(&self, para: &Paragraph) -> bool {
        self.effective_alignment(para) == Alignment::Center
    }
}
