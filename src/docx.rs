use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{
    Alignment, Document, HeaderFooterKind, HeaderFooterRef, HeaderFooterSource, Indent, Inline,
    LineSpacing, Package, PageMargins, PageNumbering, ParaId, Paragraph, ParagraphProps,
    ParagraphStyle, RawXml, Run, RunFonts, RunItem, RunProps, SectionProps, Spacing,
    StyleSheet, TabAlignment, TabLeader, TabStop, VertAlign,
};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

fn twips_to_pts(twips: f32) -> f32 {
    twips / 20.0
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn twips_attr(node: roxmltree::Node, attr: &str) -> Option<f32> {
    node.attribute((WML_NS, attr))
        .and_then(|v| v.parse::<f32>().ok())
        .map(twips_to_pts)
}

/// `w:b`, `w:i` and friends: present without a value means on.
fn toggle(node: roxmltree::Node) -> bool {
    !matches!(
        node.attribute((WML_NS, "val")),
        Some("0" | "false" | "off")
    )
}

fn raw(source: &str, node: roxmltree::Node) -> RawXml {
    RawXml::new(node.tag_name().name(), &source[node.range()])
}

/// Plain text of a preserved element (hyperlink, smart tag, math zone).
fn descendant_text(node: roxmltree::Node) -> String {
    let mut out = String::new();
    for n in node.descendants() {
        let ns = n.tag_name().namespace();
        match n.tag_name().name() {
            "t" if ns == Some(WML_NS) || ns == Some(MATH_NS) => {
                out.push_str(n.text().unwrap_or(""));
            }
            "tab" if ns == Some(WML_NS) => out.push('\t'),
            _ => {}
        }
    }
    out
}

/// Non-WML attributes keep their source prefix so they can be re-emitted.
fn qualified_name(node: roxmltree::Node, attr: &roxmltree::Attribute) -> String {
    match attr.namespace() {
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
            _ => attr.name().to_string(),
        },
        None => attr.name().to_string(),
    }
}

pub(crate) fn parse_alignment(val: &str) -> Option<Alignment> {
    match val {
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "distribute" => Some(Alignment::Justify),
        "left" | "start" => Some(Alignment::Left),
        _ => None,
    }
}

fn parse_styles(xml_content: &str) -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        log::warn!("styles.xml is not well-formed, using built-in defaults");
        return sheet;
    };
    let root = xml.root_element();

    if let Some(rpr) = wml(root, "docDefaults")
        .and_then(|n| wml(n, "rPrDefault"))
        .and_then(|n| wml(n, "rPr"))
    {
        if let Some(b) = wml(rpr, "b") {
            sheet.defaults.bold = toggle(b);
        }
    }

    for style_node in root.children() {
        if !is_wml(style_node, "style")
            || style_node.attribute((WML_NS, "type")) != Some("paragraph")
        {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };
        if style_node.attribute((WML_NS, "default")) == Some("1") {
            sheet.default_paragraph_style = Some(style_id.to_string());
        }

        let ppr = wml(style_node, "pPr");
        let rpr = wml(style_node, "rPr");

        let bold = rpr.and_then(|n| wml(n, "b")).map(toggle);
        let alignment = ppr
            .and_then(|ppr| wml_attr(ppr, "jc"))
            .and_then(parse_alignment);
        let based_on = wml_attr(style_node, "basedOn").map(str::to_string);

        sheet.paragraph_styles.insert(
            style_id.to_string(),
            ParagraphStyle { bold, alignment, based_on },
        );
    }

    sheet
}

fn parse_run_props(source: &str, rpr: roxmltree::Node) -> RunProps {
    let mut props = RunProps::default();
    for child in rpr.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            props.extra.push(raw(source, child));
            continue;
        }
        match child.tag_name().name() {
            "rStyle" => props.style = child.attribute((WML_NS, "val")).map(str::to_string),
            "rFonts" => props.fonts = parse_run_fonts(child),
            "sz" => {
                props.size = child
                    .attribute((WML_NS, "val"))
                    .and_then(|v| v.parse::<f32>().ok())
                    .map(|hp| hp / 2.0)
            }
            "b" => props.bold = Some(toggle(child)),
            "i" => props.italic = Some(toggle(child)),
            "u" => match child.attribute((WML_NS, "val")) {
                Some("none") => props.underline = Some(false),
                Some("single") | None if child.attributes().len() <= 1 => {
                    props.underline = Some(true)
                }
                // Double, wavy or coloured underlines are kept as written.
                _ => props.extra.push(raw(source, child)),
            },
            "vertAlign" => {
                props.vert_align = match child.attribute((WML_NS, "val")) {
                    Some("superscript") => Some(VertAlign::Superscript),
                    Some("subscript") => Some(VertAlign::Subscript),
                    Some("baseline") => Some(VertAlign::Baseline),
                    _ => None,
                }
            }
            _ => props.extra.push(raw(source, child)),
        }
    }
    props
}

fn parse_run_fonts(node: roxmltree::Node) -> RunFonts {
    let mut fonts = RunFonts::default();
    for attr in node.attributes() {
        if attr.namespace() != Some(WML_NS) {
            continue;
        }
        match attr.name() {
            "ascii" => fonts.ascii = Some(attr.value().to_string()),
            "hAnsi" => fonts.h_ansi = Some(attr.value().to_string()),
            "eastAsia" => fonts.east_asia = Some(attr.value().to_string()),
            other => fonts.other.push((other.to_string(), attr.value().to_string())),
        }
    }
    fonts
}

fn parse_run(source: &str, node: roxmltree::Node) -> Run {
    let mut run = Run::default();
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            run.items.push(RunItem::Raw(raw(source, child)));
            continue;
        }
        match child.tag_name().name() {
            "rPr" => run.props = parse_run_props(source, child),
            "t" => run.items.push(RunItem::Text(child.text().unwrap_or("").to_string())),
            "tab" => run.items.push(RunItem::Tab),
            "cr" => run.items.push(RunItem::LineBreak),
            "br" => match child.attribute((WML_NS, "type")) {
                Some("page") => run.items.push(RunItem::PageBreak),
                Some("column") => run.items.push(RunItem::Raw(raw(source, child))),
                _ => run.items.push(RunItem::LineBreak),
            },
            _ => run.items.push(RunItem::Raw(raw(source, child))),
        }
    }
    run
}

fn parse_tabs(node: roxmltree::Node) -> Vec<TabStop> {
    node.children()
        .filter(|n| is_wml(*n, "tab"))
        .filter_map(|tab| {
            let alignment = match tab.attribute((WML_NS, "val"))? {
                "center" => TabAlignment::Center,
                "right" | "end" => TabAlignment::Right,
                "decimal" => TabAlignment::Decimal,
                "left" | "start" => TabAlignment::Left,
                _ => return None,
            };
            let leader = match tab.attribute((WML_NS, "leader")) {
                Some("dot") => TabLeader::Dot,
                Some("hyphen") => TabLeader::Hyphen,
                Some("underscore") => TabLeader::Underscore,
                _ => TabLeader::None,
            };
            Some(TabStop {
                position: twips_attr(tab, "pos")?,
                alignment,
                leader,
            })
        })
        .collect()
}

fn parse_indent(node: roxmltree::Node) -> Indent {
    let mut indent = Indent {
        left: twips_attr(node, "left").or_else(|| twips_attr(node, "start")),
        right: twips_attr(node, "right").or_else(|| twips_attr(node, "end")),
        first_line: twips_attr(node, "firstLine"),
        chars: Vec::new(),
    };
    if let Some(hanging) = twips_attr(node, "hanging") {
        indent.first_line = Some(-hanging);
    }
    for attr in node.attributes() {
        if attr.namespace() == Some(WML_NS) && attr.name().ends_with("Chars") {
            indent.chars.push((attr.name().to_string(), attr.value().to_string()));
        }
    }
    indent
}

fn parse_spacing(node: roxmltree::Node) -> Spacing {
    let line = node
        .attribute((WML_NS, "line"))
        .and_then(|v| v.parse::<f32>().ok())
        .map(|v| match node.attribute((WML_NS, "lineRule")) {
            Some("exact") => LineSpacing::Exact(twips_to_pts(v)),
            Some("atLeast") => LineSpacing::AtLeast(twips_to_pts(v)),
            _ => LineSpacing::Multiple(v / 240.0),
        });
    let other = node
        .attributes()
        .filter(|a| a.namespace() == Some(WML_NS))
        .filter(|a| !matches!(a.name(), "before" | "after" | "line" | "lineRule"))
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();
    Spacing {
        before: twips_attr(node, "before"),
        after: twips_attr(node, "after"),
        line,
        other,
    }
}

fn parse_header_footer_ref(node: roxmltree::Node) -> Option<HeaderFooterRef> {
    let id = node.attribute((REL_NS, "id"))?;
    Some(HeaderFooterRef {
        kind: HeaderFooterKind::parse(node.attribute((WML_NS, "type")).unwrap_or("default")),
        source: HeaderFooterSource::Existing(id.to_string()),
    })
}

fn parse_section(source: &str, node: roxmltree::Node) -> SectionProps {
    let mut sect = SectionProps::default();
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            sect.extra.push(raw(source, child));
            continue;
        }
        match child.tag_name().name() {
            "headerReference" => match parse_header_footer_ref(child) {
                Some(r) => sect.headers.push(r),
                None => sect.extra.push(raw(source, child)),
            },
            "footerReference" => match parse_header_footer_ref(child) {
                Some(r) => sect.footers.push(r),
                None => sect.extra.push(raw(source, child)),
            },
            "pgMar" => {
                sect.margins = Some(PageMargins {
                    top: twips_attr(child, "top"),
                    right: twips_attr(child, "right"),
                    bottom: twips_attr(child, "bottom"),
                    left: twips_attr(child, "left"),
                    header: twips_attr(child, "header"),
                    footer: twips_attr(child, "footer"),
                    gutter: twips_attr(child, "gutter"),
                })
            }
            "pgNumType" => {
                sect.page_numbering = Some(PageNumbering {
                    format: child.attribute((WML_NS, "fmt")).map(str::to_string),
                    start: child
                        .attribute((WML_NS, "start"))
                        .and_then(|v| v.parse().ok()),
                })
            }
            "footnotePr" => {
                for fp in child.children().filter(|n| n.is_element()) {
                    if is_wml(fp, "numRestart") {
                        sect.footnote_restart =
                            fp.attribute((WML_NS, "val")).map(str::to_string);
                    } else {
                        sect.footnote_extra.push(raw(source, fp));
                    }
                }
            }
            _ => sect.extra.push(raw(source, child)),
        }
    }
    sect
}

fn parse_paragraph_props(source: &str, ppr: roxmltree::Node) -> ParagraphProps {
    let mut props = ParagraphProps::default();
    for child in ppr.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            props.extra.push(raw(source, child));
            continue;
        }
        match child.tag_name().name() {
            "pStyle" => props.style = child.attribute((WML_NS, "val")).map(str::to_string),
            "jc" => {
                props.alignment = child.attribute((WML_NS, "val")).and_then(parse_alignment);
                if props.alignment.is_none() {
                    props.extra.push(raw(source, child));
                }
            }
            "ind" => props.indent = parse_indent(child),
            "spacing" => props.spacing = parse_spacing(child),
            "tabs" => props.tabs = parse_tabs(child),
            "sectPr" => props.section = Some(Box::new(parse_section(source, child))),
            _ => props.extra.push(raw(source, child)),
        }
    }
    props
}

fn parse_paragraph(source: &str, node: roxmltree::Node) -> Paragraph {
    let mut para = Paragraph {
        id: ParaId::fresh(),
        props: ParagraphProps::default(),
        content: Vec::new(),
        preceding: Vec::new(),
    };
    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "pPr") {
            para.props = parse_paragraph_props(source, child);
        } else if is_wml(child, "r") {
            para.content.push(Inline::Run(parse_run(source, child)));
        } else {
            para.content.push(Inline::Raw {
                xml: raw(source, child),
                text: descendant_text(child),
            });
        }
    }
    para
}

fn read_part<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, Error> {
    let mut file = zip.by_name(name)?;
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Reads a .docx package from any seekable source.
pub fn read<R: Read + Seek>(reader: R) -> Result<Document, Error> {
    let mut zip = zip::ZipArchive::new(reader)?;

    let mut parts = Vec::new();
    let mut document_xml = None;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        if name == DOCUMENT_PART {
            document_xml = Some(data);
        } else {
            parts.push((name, data));
        }
    }
    let document_xml = match document_xml {
        Some(d) => d,
        None => read_part(&mut zip, DOCUMENT_PART)?,
    };
    let xml_content = String::from_utf8(document_xml)
        .map_err(|_| Error::InvalidDocx("document.xml is not UTF-8".into()))?;

    let styles = parts
        .iter()
        .find(|(n, _)| n == STYLES_PART)
        .and_then(|(_, data)| std::str::from_utf8(data).ok())
        .map(parse_styles)
        .unwrap_or_default();

    let xml = roxmltree::Document::parse(&xml_content)?;
    let root = xml.root_element();
    if !is_wml(root, "document") {
        return Err(Error::InvalidDocx("root element is not w:document".into()));
    }

    let namespaces: Vec<(String, String)> = root
        .namespaces()
        .map(|ns| (ns.name().unwrap_or("").to_string(), ns.uri().to_string()))
        .collect();
    let root_attributes = root
        .attributes()
        .map(|a| (qualified_name(root, &a), a.value().to_string()))
        .collect();

    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut paragraphs = Vec::new();
    let mut pending: Vec<RawXml> = Vec::new();
    let mut body_section = None;

    for node in body.children().filter(|n| n.is_element()) {
        if is_wml(node, "p") {
            let mut para = parse_paragraph(&xml_content, node);
            para.preceding = std::mem::take(&mut pending);
            paragraphs.push(para);
        } else if is_wml(node, "sectPr") {
            body_section = Some(parse_section(&xml_content, node));
        } else {
            pending.push(raw(&xml_content, node));
        }
    }

    log::debug!(
        "parsed {} paragraphs, {} package parts",
        paragraphs.len(),
        parts.len()
    );

    Ok(Document {
        paragraphs,
        trailing: pending,
        body_section: body_section.unwrap_or_default(),
        styles,
        package: Package { parts, namespaces, root_attributes },
    })
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let file = std::fs::File::open(path)?;
    read(std::io::BufReader::new(file))
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    read(std::io::Cursor::new(bytes))
}

/// Relationship targets of `word/document.xml`, by id.
pub(crate) fn document_relationships(package: &Package) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Some(data) = package.part("word/_rels/document.xml.rels") else {
        return rels;
    };
    let Ok(text) = std::str::from_utf8(data) else {
        return rels;
    };
    let Ok(xml) = roxmltree::Document::parse(text) else {
        return rels;
    };
    for node in xml.root_element().children().filter(|n| n.is_element()) {
        if let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target")) {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}
