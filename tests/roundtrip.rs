use thesis_fmt::model::{Alignment, Document, Paragraph, RunProps};
use thesis_fmt::Run;
use thesis_fmt::{FormatOptions, ThesisFormatter, ThesisInfo, docx, writer};

fn thesis() -> Document {
    let mut doc = Document::new();
    for t in ["摘要", "本文研究了图像识别。", "关键词：图像识别，深度学习"] {
        doc.push_text(t);
    }
    doc.push_text("第一章 绪论");
    doc.push_text("正文 with <markup> & \"quotes\" 内容。");
    let mut caption = Paragraph::with_text("图 1 系统结构");
    caption.props.alignment = Some(Alignment::Center);
    doc.push(caption);
    doc.push_text("参考文献");
    doc.push_text("[1] 张三. 论文[J]. 期刊, 2020.");
    doc
}

#[test]
fn written_package_reads_back() {
    let doc = thesis();
    let bytes = writer::to_bytes(&doc).unwrap();
    let back = docx::parse_bytes(&bytes).unwrap();
    assert_eq!(back.texts(), doc.texts());
    assert_eq!(back.paragraphs[5].props.alignment, Some(Alignment::Center));
}

#[test]
fn formatted_document_keeps_sections_and_headers() {
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (doc, _) = formatter.run(thesis()).unwrap();

    let bytes = writer::to_bytes(&doc).unwrap();
    let back = docx::parse_bytes(&bytes).unwrap();
    assert_eq!(back.texts(), doc.texts());
    assert!(back.section_count() > 1);

    let parts: Vec<&str> = back.package.parts.iter().map(|(n, _)| n.as_str()).collect();
    assert!(parts.iter().any(|n| n.starts_with("word/header")));
    assert!(parts.iter().any(|n| n.starts_with("word/footer")));

    let rels = back.package.part("word/_rels/document.xml.rels").unwrap();
    let rels = String::from_utf8_lossy(rels);
    assert!(rels.contains("relationships/header"));
    assert!(rels.contains("relationships/footer"));
}

#[test]
fn markup_characters_escaped_in_text_and_attributes() {
    let mut doc = Document::new();
    let mut para = Paragraph::default();
    para.props.style = Some("Body&\"1\"".to_string());
    let mut props = RunProps::default();
    props.set_latin_font("A&B <Sans>");
    para.push_run(Run::with_props("x < y & \"z\" 'w'", props));
    doc.push(para);

    let bytes = writer::to_bytes(&doc).unwrap();
    let back = docx::parse_bytes(&bytes).unwrap();
    assert_eq!(back.texts(), ["x < y & \"z\" 'w'"]);
    assert_eq!(back.paragraphs[0].props.style.as_deref(), Some("Body&\"1\""));
    let run = back.paragraphs[0].runs().next().unwrap();
    assert_eq!(run.props.latin_font(), Some("A&B <Sans>"));
}

#[test]
fn generated_parts_registered_once() {
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (doc, _) = formatter.run(thesis()).unwrap();
    let back = docx::parse_bytes(&writer::to_bytes(&doc).unwrap()).unwrap();

    let types = String::from_utf8_lossy(back.package.part("[Content_Types].xml").unwrap());
    assert!(roxmltree::Document::parse(&types).is_ok());
    assert_eq!(types.matches(r#"PartName="/word/header1.xml""#).count(), 1);
    assert!(types.trim_end().ends_with("</Types>"));

    let rels = String::from_utf8_lossy(back.package.part("word/_rels/document.xml.rels").unwrap());
    assert!(roxmltree::Document::parse(&rels).is_ok());
    assert_eq!(rels.matches(r#"Target="header1.xml""#).count(), 1);
}

#[test]
fn page_number_field_written() {
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (doc, _) = formatter.run(thesis()).unwrap();
    let bytes = writer::to_bytes(&doc).unwrap();
    let back = docx::parse_bytes(&bytes).unwrap();

    let footers: Vec<String> = back
        .package
        .parts
        .iter()
        .filter(|(n, _)| n.starts_with("word/footer"))
        .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
        .collect();
    assert!(footers.iter().any(|xml| xml.contains("PAGE \\* roman")));
    assert!(footers.iter().any(|xml| xml.contains("PAGE \\* arabic")));
}

#[test]
fn save_and_parse_file() {
    let dir = std::env::temp_dir().join(format!("thesis-fmt-{}", std::process::id()));
    let input = dir.join("in.docx");
    let output = dir.join("out/formatted.docx");
    writer::save(&thesis(), &input).unwrap();

    let report =
        thesis_fmt::format_file(&input, &output, &FormatOptions::default(), &ThesisInfo::default())
            .unwrap();
    let doc = docx::parse(&output).unwrap();
    assert!(doc.texts()[0].contains(&FormatOptions::default().institution));
    assert!(report.order.is_some_and(|o| o.ok));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_non_docx_input() {
    assert!(docx::parse_bytes(b"not a zip archive").is_err());
}
