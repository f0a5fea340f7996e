use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::docx::{DOCUMENT_PART, REL_NS, WML_NS};
use crate::error::Error;
use crate::model::{
    Alignment, Document, HeaderFooterRef, HeaderFooterSource, Indent, Inline, LineSpacing,
    Package, Paragraph, ParagraphProps, RawXml, Run, RunItem, RunProps, SectionProps, Spacing,
    TabAlignment, TabLeader, VertAlign,
};

type XmlWriter = Writer<Vec<u8>>;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const HEADER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const FOOTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const HEADER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

// Child order required by the WordprocessingML schema.
const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle",
    "rPr", "sectPr", "pPrChange",
];

const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath",
];

const SECT_ORDER: &[&str] = &[
    "headerReference", "footerReference", "footnotePr", "endnotePr", "type", "pgSz", "pgMar",
    "paperSrc", "pgBorders", "lnNumType", "pgNumType", "cols", "formProt", "vAlign", "noEndnote",
    "titlePg", "textDirection", "bidi", "rtlGutter", "docGrid", "printerSettings",
    "sectPrChange",
];

fn order_of(table: &[&str], name: &str) -> usize {
    table.iter().position(|n| *n == name).unwrap_or(table.len())
}

/// An element waiting to be written.
enum Node {
    Empty(BytesStart<'static>),
    Text(BytesStart<'static>, String),
    Parent(BytesStart<'static>, Vec<Node>),
    /// Preserved source markup, written verbatim.
    Raw(String),
}

/// A property child tagged with its local name for schema ordering.
struct Prop {
    name: String,
    node: Node,
}

impl Prop {
    fn new(name: &str, node: Node) -> Self {
        Prop { name: name.to_string(), node }
    }

    fn raw(raw: &RawXml) -> Self {
        Prop { name: raw.name.clone(), node: Node::Raw(raw.xml.clone()) }
    }
}

fn w(name: &str) -> BytesStart<'static> {
    BytesStart::new(format!("w:{name}"))
}

/// `<w:name w:key="value" .../>`.
fn leaf(name: &str, attrs: &[(&str, &str)]) -> Node {
    let mut start = w(name);
    for (key, val) in attrs {
        start.push_attribute((format!("w:{key}").as_str(), *val));
    }
    Node::Empty(start)
}

/// Like [`leaf`], but `None` when there are no attributes to write.
fn leaf_with(name: &str, attrs: &[(&str, String)]) -> Option<Node> {
    if attrs.is_empty() {
        return None;
    }
    let borrowed: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    Some(leaf(name, &borrowed))
}

/// Sorts `props` into schema order under a `w:name` parent.
fn ordered(name: &str, table: &[&str], mut props: Vec<Prop>) -> Node {
    props.sort_by_key(|p| order_of(table, &p.name));
    Node::Parent(w(name), props.into_iter().map(|p| p.node).collect())
}

fn write_raw(xml: &mut XmlWriter, raw: &str) -> Result<(), Error> {
    xml.write_event(Event::Text(BytesText::from_escaped(raw)))?;
    Ok(())
}

fn write_node(xml: &mut XmlWriter, node: &Node) -> Result<(), Error> {
    match node {
        Node::Empty(start) => xml.write_event(Event::Empty(start.borrow()))?,
        Node::Text(start, text) => {
            xml.write_event(Event::Start(start.borrow()))?;
            xml.write_event(Event::Text(BytesText::new(text)))?;
            xml.write_event(Event::End(start.to_end()))?;
        }
        Node::Parent(start, children) => {
            xml.write_event(Event::Start(start.borrow()))?;
            for child in children {
                write_node(xml, child)?;
            }
            xml.write_event(Event::End(start.to_end()))?;
        }
        Node::Raw(raw) => write_raw(xml, raw)?,
    }
    Ok(())
}

fn write_declaration(xml: &mut XmlWriter) -> Result<(), Error> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

fn write_empties(xml: &mut XmlWriter, elements: &[BytesStart<'static>]) -> Result<(), Error> {
    for element in elements {
        xml.write_event(Event::Empty(element.borrow()))?;
    }
    Ok(())
}

fn twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

fn alignment_val(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

/// New parts created while serialising generated headers and footers.
struct PartAllocator {
    next_rel: u32,
    taken: Vec<String>,
    parts: Vec<(String, Vec<u8>)>,
    relationships: Vec<BytesStart<'static>>,
    overrides: Vec<BytesStart<'static>>,
}

impl PartAllocator {
    fn new(package: &Package) -> Self {
        let next_rel = crate::docx::document_relationships(package)
            .keys()
            .filter_map(|id| id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        PartAllocator {
            next_rel,
            taken: package.parts.iter().map(|(n, _)| n.clone()).collect(),
            parts: Vec::new(),
            relationships: Vec::new(),
            overrides: Vec::new(),
        }
    }

    fn allocate(&mut self, header: bool, paragraphs: &[Paragraph]) -> Result<String, Error> {
        let stem = if header { "header" } else { "footer" };
        let mut n = 1;
        let mut name = format!("word/{stem}{n}.xml");
        while self.taken.contains(&name) {
            n += 1;
            name = format!("word/{stem}{n}.xml");
        }
        self.taken.push(name.clone());

        let id = format!("rId{}", self.next_rel);
        self.next_rel += 1;

        let mut xml = Writer::new(Vec::new());
        write_declaration(&mut xml)?;
        let root = w(if header { "hdr" } else { "ftr" })
            .with_attributes([("xmlns:w", WML_NS), ("xmlns:r", REL_NS)]);
        xml.write_event(Event::Start(root.borrow()))?;
        for p in paragraphs {
            // Header paragraphs never carry section properties.
            write_paragraph(&mut xml, p, None)?;
        }
        xml.write_event(Event::End(root.to_end()))?;
        self.parts.push((name, xml.into_inner()));

        let (rel_type, content_type) = if header {
            (HEADER_REL_TYPE, HEADER_CONTENT_TYPE)
        } else {
            (FOOTER_REL_TYPE, FOOTER_CONTENT_TYPE)
        };
        let target = format!("{stem}{n}.xml");
        self.relationships.push(BytesStart::new("Relationship").with_attributes([
            ("Id", id.as_str()),
            ("Type", rel_type),
            ("Target", target.as_str()),
        ]));
        let part_name = format!("/word/{target}");
        self.overrides.push(
            BytesStart::new("Override")
                .with_attributes([("PartName", part_name.as_str()), ("ContentType", content_type)]),
        );
        Ok(id)
    }
}

fn run_props(props: &RunProps) -> Option<Node> {
    let mut children: Vec<Prop> = Vec::new();
    if let Some(style) = &props.style {
        children.push(Prop::new("rStyle", leaf("rStyle", &[("val", style.as_str())])));
    }
    let fonts = &props.fonts;
    let mut font_attrs: Vec<(&str, String)> = [
        ("ascii", &fonts.ascii),
        ("hAnsi", &fonts.h_ansi),
        ("eastAsia", &fonts.east_asia),
    ]
    .into_iter()
    .filter_map(|(key, val)| Some((key, val.clone()?)))
    .collect();
    for (key, val) in &fonts.other {
        font_attrs.push((key.as_str(), val.clone()));
    }
    if let Some(node) = leaf_with("rFonts", &font_attrs) {
        children.push(Prop::new("rFonts", node));
    }
    for (name, value) in [("b", props.bold), ("i", props.italic)] {
        match value {
            Some(true) => children.push(Prop::new(name, leaf(name, &[]))),
            Some(false) => children.push(Prop::new(name, leaf(name, &[("val", "0")]))),
            None => {}
        }
    }
    if let Some(size) = props.size {
        let half_points = ((size * 2.0).round() as i64).to_string();
        children.push(Prop::new("sz", leaf("sz", &[("val", half_points.as_str())])));
    }
    match props.underline {
        Some(true) => children.push(Prop::new("u", leaf("u", &[("val", "single")]))),
        Some(false) => children.push(Prop::new("u", leaf("u", &[("val", "none")]))),
        None => {}
    }
    if let Some(va) = props.vert_align {
        let val = match va {
            VertAlign::Baseline => "baseline",
            VertAlign::Superscript => "superscript",
            VertAlign::Subscript => "subscript",
        };
        children.push(Prop::new("vertAlign", leaf("vertAlign", &[("val", val)])));
    }
    children.extend(props.extra.iter().map(Prop::raw));
    (!children.is_empty()).then(|| ordered("rPr", RPR_ORDER, children))
}

fn preserved_text(name: &str, text: &str) -> Node {
    Node::Text(w(name).with_attributes([("xml:space", "preserve")]), text.to_string())
}

fn field_bodies(instruction: &str) -> [Node; 5] {
    [
        leaf("fldChar", &[("fldCharType", "begin")]),
        preserved_text("instrText", instruction),
        leaf("fldChar", &[("fldCharType", "separate")]),
        Node::Text(w("t"), "1".to_string()),
        leaf("fldChar", &[("fldCharType", "end")]),
    ]
}

fn write_run(xml: &mut XmlWriter, run: &Run) -> Result<(), Error> {
    let rpr = run_props(&run.props);

    // A field spans several w:r elements sharing the run's properties.
    let mut bodies: Vec<Vec<Node>> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    for item in &run.items {
        match item {
            RunItem::Text(t) => current.push(preserved_text("t", t)),
            RunItem::Tab => current.push(leaf("tab", &[])),
            RunItem::LineBreak => current.push(leaf("br", &[])),
            RunItem::PageBreak => current.push(leaf("br", &[("type", "page")])),
            RunItem::Raw(raw) => current.push(Node::Raw(raw.xml.clone())),
            RunItem::Field(instr) => {
                if !current.is_empty() {
                    bodies.push(std::mem::take(&mut current));
                }
                bodies.extend(field_bodies(instr).map(|node| vec![node]));
            }
        }
    }
    if !current.is_empty() || bodies.is_empty() {
        bodies.push(current);
    }
    for body in &bodies {
        xml.write_event(Event::Start(BytesStart::new("w:r")))?;
        if let Some(rpr) = &rpr {
            write_node(xml, rpr)?;
        }
        for node in body {
            write_node(xml, node)?;
        }
        xml.write_event(Event::End(BytesEnd::new("w:r")))?;
    }
    Ok(())
}

fn spacing_node(spacing: &Spacing) -> Option<Node> {
    let mut attrs: Vec<(&str, String)> = Vec::new();
    for (key, val) in &spacing.other {
        let governed = match key.as_str() {
            "beforeLines" | "beforeAutospacing" => spacing.before.is_some(),
            "afterLines" | "afterAutospacing" => spacing.after.is_some(),
            _ => false,
        };
        if !governed {
            attrs.push((key.as_str(), val.clone()));
        }
    }
    if let Some(before) = spacing.before {
        attrs.push(("before", twips(before).to_string()));
    }
    if let Some(after) = spacing.after {
        attrs.push(("after", twips(after).to_string()));
    }
    let line = match spacing.line {
        Some(LineSpacing::Exact(pt)) => Some((twips(pt), "exact")),
        Some(LineSpacing::AtLeast(pt)) => Some((twips(pt), "atLeast")),
        Some(LineSpacing::Multiple(m)) => Some(((m * 240.0).round() as i64, "auto")),
        None => None,
    };
    if let Some((value, rule)) = line {
        attrs.push(("line", value.to_string()));
        attrs.push(("lineRule", rule.to_string()));
    }
    leaf_with("spacing", &attrs)
}

fn indent_node(indent: &Indent) -> Option<Node> {
    let mut attrs: Vec<(&str, String)> = Vec::new();
    for (key, val) in &indent.chars {
        let governed = match key.as_str() {
            "leftChars" | "startChars" => indent.left.is_some(),
            "rightChars" | "endChars" => indent.right.is_some(),
            "firstLineChars" | "hangingChars" => indent.first_line.is_some(),
            _ => false,
        };
        if !governed {
            attrs.push((key.as_str(), val.clone()));
        }
    }
    if let Some(left) = indent.left {
        attrs.push(("left", twips(left).to_string()));
    }
    if let Some(right) = indent.right {
        attrs.push(("right", twips(right).to_string()));
    }
    match indent.first_line {
        Some(v) if v < 0.0 => attrs.push(("hanging", twips(-v).to_string())),
        Some(v) => attrs.push(("firstLine", twips(v).to_string())),
        None => {}
    }
    leaf_with("ind", &attrs)
}

fn tabs_node(props: &ParagraphProps) -> Node {
    let tabs = props
        .tabs
        .iter()
        .map(|tab| {
            let val = match tab.alignment {
                TabAlignment::Left => "left",
                TabAlignment::Center => "center",
                TabAlignment::Right => "right",
                TabAlignment::Decimal => "decimal",
            };
            let pos = twips(tab.position).to_string();
            let leader = match tab.leader {
                TabLeader::None => None,
                TabLeader::Dot => Some("dot"),
                TabLeader::Hyphen => Some("hyphen"),
                TabLeader::Underscore => Some("underscore"),
            };
            match leader {
                Some(leader) => {
                    leaf("tab", &[("val", val), ("leader", leader), ("pos", pos.as_str())])
                }
                None => leaf("tab", &[("val", val), ("pos", pos.as_str())]),
            }
        })
        .collect();
    Node::Parent(w("tabs"), tabs)
}

fn paragraph_props(
    props: &ParagraphProps,
    alloc: Option<&mut PartAllocator>,
) -> Result<Option<Node>, Error> {
    let mut children: Vec<Prop> = Vec::new();
    if let Some(style) = &props.style {
        children.push(Prop::new("pStyle", leaf("pStyle", &[("val", style.as_str())])));
    }
    if !props.tabs.is_empty() {
        children.push(Prop::new("tabs", tabs_node(props)));
    }
    if let Some(spacing) = spacing_node(&props.spacing) {
        children.push(Prop::new("spacing", spacing));
    }
    if let Some(ind) = indent_node(&props.indent) {
        children.push(Prop::new("ind", ind));
    }
    if let Some(alignment) = props.alignment {
        children.push(Prop::new("jc", leaf("jc", &[("val", alignment_val(alignment))])));
    }
    children.extend(props.extra.iter().map(Prop::raw));
    if let (Some(sect), Some(alloc)) = (&props.section, alloc) {
        children.push(Prop::new("sectPr", section_node(sect, alloc)?));
    }
    Ok((!children.is_empty()).then(|| ordered("pPr", PPR_ORDER, children)))
}

fn write_paragraph(
    xml: &mut XmlWriter,
    para: &Paragraph,
    alloc: Option<&mut PartAllocator>,
) -> Result<(), Error> {
    for element in &para.preceding {
        write_raw(xml, &element.xml)?;
    }
    xml.write_event(Event::Start(BytesStart::new("w:p")))?;
    if let Some(ppr) = paragraph_props(&para.props, alloc)? {
        write_node(xml, &ppr)?;
    }
    for inline in &para.content {
        match inline {
            Inline::Run(run) => write_run(xml, run)?,
            Inline::Raw { xml: raw, .. } => write_raw(xml, &raw.xml)?,
        }
    }
    xml.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn reference_prop(
    element: &str,
    reference: &HeaderFooterRef,
    alloc: &mut PartAllocator,
) -> Result<Prop, Error> {
    let id = match &reference.source {
        HeaderFooterSource::Existing(id) => id.clone(),
        HeaderFooterSource::Generated(paragraphs) => {
            alloc.allocate(element == "headerReference", paragraphs)?
        }
    };
    let start = w(element)
        .with_attributes([("w:type", reference.kind.as_str()), ("r:id", id.as_str())]);
    Ok(Prop::new(element, Node::Empty(start)))
}

fn section_node(sect: &SectionProps, alloc: &mut PartAllocator) -> Result<Node, Error> {
    let mut children: Vec<Prop> = Vec::new();
    for h in &sect.headers {
        children.push(reference_prop("headerReference", h, alloc)?);
    }
    for f in &sect.footers {
        children.push(reference_prop("footerReference", f, alloc)?);
    }
    if sect.footnote_restart.is_some() || !sect.footnote_extra.is_empty() {
        let mut notes: Vec<Node> =
            sect.footnote_extra.iter().map(|extra| Node::Raw(extra.xml.clone())).collect();
        if let Some(restart) = &sect.footnote_restart {
            notes.push(leaf("numRestart", &[("val", restart.as_str())]));
        }
        children.push(Prop::new("footnotePr", Node::Parent(w("footnotePr"), notes)));
    }
    if let Some(m) = &sect.margins {
        let attrs: Vec<(&str, String)> = [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
            ("header", m.header),
            ("footer", m.footer),
            ("gutter", m.gutter),
        ]
        .into_iter()
        .filter_map(|(key, val)| Some((key, twips(val?).to_string())))
        .collect();
        let node = leaf_with("pgMar", &attrs).unwrap_or_else(|| leaf("pgMar", &[]));
        children.push(Prop::new("pgMar", node));
    }
    if let Some(numbering) = &sect.page_numbering {
        let mut attrs: Vec<(&str, String)> = Vec::new();
        if let Some(fmt) = &numbering.format {
            attrs.push(("fmt", fmt.clone()));
        }
        if let Some(start) = numbering.start {
            attrs.push(("start", start.to_string()));
        }
        let node = leaf_with("pgNumType", &attrs).unwrap_or_else(|| leaf("pgNumType", &[]));
        children.push(Prop::new("pgNumType", node));
    }
    children.extend(sect.extra.iter().map(Prop::raw));
    Ok(ordered("sectPr", SECT_ORDER, children))
}

fn document_xml(doc: &Document, alloc: &mut PartAllocator) -> Result<Vec<u8>, Error> {
    let mut xml = Writer::new(Vec::new());
    write_declaration(&mut xml)?;

    let mut root = w("document");
    let mut namespaces = doc.package.namespaces.clone();
    for (prefix, uri) in [("w", WML_NS), ("r", REL_NS)] {
        if !namespaces.iter().any(|(p, _)| p == prefix) {
            namespaces.push((prefix.to_string(), uri.to_string()));
        }
    }
    for (prefix, uri) in &namespaces {
        match prefix.as_str() {
            "xml" => {}
            "" => root.push_attribute(("xmlns", uri.as_str())),
            p => root.push_attribute((format!("xmlns:{p}").as_str(), uri.as_str())),
        }
    }
    for (name, value) in &doc.package.root_attributes {
        root.push_attribute((name.as_str(), value.as_str()));
    }

    xml.write_event(Event::Start(root.borrow()))?;
    xml.write_event(Event::Start(w("body")))?;
    for para in &doc.paragraphs {
        write_paragraph(&mut xml, para, Some(&mut *alloc))?;
    }
    for element in &doc.trailing {
        write_raw(&mut xml, &element.xml)?;
    }
    write_node(&mut xml, &section_node(&doc.body_section, alloc)?)?;
    xml.write_event(Event::End(BytesEnd::new("w:body")))?;
    xml.write_event(Event::End(root.to_end()))?;
    Ok(xml.into_inner())
}

/// Copies `data` event by event, adding `additions` as the last children of
/// the `root` element.
fn append_children(
    data: &[u8],
    root: &str,
    additions: &[BytesStart<'static>],
) -> Result<Vec<u8>, Error> {
    if additions.is_empty() {
        return Ok(data.to_vec());
    }
    let mut reader = Reader::from_reader(data);
    let mut xml = Writer::new(Vec::with_capacity(data.len()));
    let mut buf = Vec::new();
    let mut appended = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::End(end) if end.name().as_ref() == root.as_bytes() => {
                write_empties(&mut xml, additions)?;
                xml.write_event(Event::End(end))?;
                appended = true;
            }
            Event::Empty(start) if start.name().as_ref() == root.as_bytes() => {
                let end = start.to_end().into_owned();
                xml.write_event(Event::Start(start))?;
                write_empties(&mut xml, additions)?;
                xml.write_event(Event::End(end))?;
                appended = true;
            }
            Event::Eof => break,
            event => xml.write_event(event)?,
        }
        buf.clear();
    }
    if !appended {
        return Err(Error::InvalidDocx(format!("missing <{root}> element")));
    }
    Ok(xml.into_inner())
}

fn relationships_xml(relationships: &[BytesStart<'static>]) -> Result<Vec<u8>, Error> {
    let mut xml = Writer::new(Vec::new());
    write_declaration(&mut xml)?;
    let root = BytesStart::new("Relationships").with_attributes([("xmlns", PACKAGE_RELS_NS)]);
    xml.write_event(Event::Start(root.borrow()))?;
    write_empties(&mut xml, relationships)?;
    xml.write_event(Event::End(root.to_end()))?;
    Ok(xml.into_inner())
}

/// Writes the document as a .docx package.
pub fn write<W: Write + Seek>(doc: &Document, writer: W) -> Result<(), Error> {
    let mut alloc = PartAllocator::new(&doc.package);
    let body = document_xml(doc, &mut alloc)?;

    let mut zip = ZipWriter::new(writer);
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut has_rels = false;
    for (name, data) in &doc.package.parts {
        zip.start_file(name.as_str(), opt)?;
        match name.as_str() {
            CONTENT_TYPES_PART => {
                zip.write_all(&append_children(data, "Types", &alloc.overrides)?)?;
            }
            DOCUMENT_RELS_PART => {
                has_rels = true;
                zip.write_all(&append_children(data, "Relationships", &alloc.relationships)?)?;
            }
            _ => zip.write_all(data)?,
        }
    }
    if !has_rels && !alloc.relationships.is_empty() {
        zip.start_file(DOCUMENT_RELS_PART, opt)?;
        zip.write_all(&relationships_xml(&alloc.relationships)?)?;
    }

    zip.start_file(DOCUMENT_PART, opt)?;
    zip.write_all(&body)?;

    for (name, xml) in &alloc.parts {
        zip.start_file(name.as_str(), opt)?;
        zip.write_all(xml)?;
    }

    zip.finish()?;
    log::debug!("wrote package with {} generated parts", alloc.parts.len());
    Ok(())
}

pub fn to_bytes(doc: &Document) -> Result<Vec<u8>, Error> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    write(doc, &mut cursor)?;
    Ok(cursor.into_inner())
}

pub fn save(doc: &Document, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write(doc, std::io::BufWriter::new(file))
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#
}

fn rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
}

fn word_rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
}

fn styles_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:eastAsia="宋体"/><w:sz w:val="21"/></w:rPr></w:rPrDefault>
    <w:pPrDefault/>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
</w:styles>"#
}

pub(crate) fn blank_package() -> Package {
    Package {
        parts: vec![
            (CONTENT_TYPES_PART.to_string(), content_types_xml().as_bytes().to_vec()),
            ("_rels/.rels".to_string(), rels_xml().as_bytes().to_vec()),
            (DOCUMENT_RELS_PART.to_string(), word_rels_xml().as_bytes().to_vec()),
            ("word/styles.xml".to_string(), styles_xml().as_bytes().to_vec()),
        ],
        namespaces: vec![
            ("w".to_string(), WML_NS.to_string()),
            ("r".to_string(), REL_NS.to_string()),
        ],
        root_attributes: Vec::new(),
    }
}
