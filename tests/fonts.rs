use thesis_fmt::fonts::{FontManager, FontStyle, Script, detect_script, named_size, size_pt};
use thesis_fmt::model::{Alignment, Document, Paragraph, RunProps, VertAlign};
use thesis_fmt::{Run, analyze, classify, font_style_for};

#[test]
fn named_sizes() {
    assert_eq!(named_size("小四"), Some(12.0));
    assert_eq!(named_size("五号"), Some(10.5));
    assert_eq!(named_size("二号六"), Some(21.0));
    assert_eq!(named_size("六号"), None);
    assert_eq!(size_pt("六号"), 12.0);
}

#[test]
fn font_styles_parse_by_name() {
    let style: FontStyle = "heading_2".parse().unwrap();
    assert_eq!(style, FontStyle::Heading2);
    assert_eq!(style.rule().size, "四号");
    assert_eq!("keyword_content".parse::<FontStyle>(), Ok(FontStyle::KeywordContent));

    let err = "heading_9".parse::<FontStyle>().unwrap_err();
    assert!(err.contains("heading_9"));
}

#[test]
fn mixed_text_gets_font_per_script() {
    let mut para = Paragraph::with_text("基于CNN的识别");
    FontManager::new().format_mixed_text(&mut para, FontStyle::MainText);

    assert_eq!(para.props.alignment, Some(Alignment::Justify));
    let runs: Vec<&Run> = para.runs().collect();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[1].text(), "CNN");
    assert_eq!(runs[1].props.latin_font(), Some("Times New Roman"));
    assert_eq!(runs[1].props.east_asia_font(), Some("宋体"));
    assert_eq!(runs[0].props.latin_font(), Some("宋体"));
    assert!(runs.iter().all(|r| r.props.size == Some(12.0)));
    assert_eq!(para.text(), "基于CNN的识别");
}

#[test]
fn superscript_runs_keep_their_formatting() {
    let mut para = Paragraph::with_text("结论");
    let mut props = RunProps::default();
    props.vert_align = Some(VertAlign::Superscript);
    props.size = Some(9.0);
    para.push_run(Run::with_props("[1]", props.clone()));

    FontManager::new().format_mixed_text(&mut para, FontStyle::MainText);
    let marker = para.runs().last().unwrap();
    assert_eq!(marker.text(), "[1]");
    assert_eq!(marker.props, props);
}

#[test]
fn formula_rules_set_italic() {
    let manager = FontManager::new();
    let mut run = Run::new("x");
    manager.apply_run(&mut run, FontStyle::FormulaVariable, Script::Latin);
    assert_eq!(run.props.italic, Some(true));
    assert_eq!(run.props.latin_font(), Some("Times New Roman"));

    manager.apply_run(&mut run, FontStyle::FormulaConstant, Script::Latin);
    assert_eq!(run.props.italic, Some(false));
}

#[test]
fn script_detection() {
    assert_eq!(detect_script("Deep learning"), Script::Latin);
    assert_eq!(detect_script("深度 learning"), Script::Cjk);
    assert_eq!(detect_script("2024"), Script::Latin);
}

#[test]
fn abstract_title_fonts_validated() {
    let mut doc = Document::from_texts(["摘要", "本文内容。", "Abstract", "Text."]);
    let manager = FontManager::new();

    let problems = manager.validate(&doc);
    assert_eq!(problems.len(), 2);
    assert!(problems[0].starts_with("第1段"));
    assert!(problems[0].contains("黑体"));
    assert!(problems[0].contains("默认字体"));

    manager.format_mixed_text(&mut doc.paragraphs[0], FontStyle::AbstractTitleCn);
    manager.format_mixed_text(&mut doc.paragraphs[2], FontStyle::AbstractTitleEn);
    assert!(manager.validate(&doc).is_empty());
}

#[test]
fn roles_map_to_font_styles() {
    let doc = Document::from_texts(["第一章 绪论", "1.1 背景", "正文。", "参考文献", "[1] 文献"]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    let styles: Vec<Option<FontStyle>> =
        (0..doc.len()).map(|i| font_style_for(classification.role_at(i))).collect();
    assert_eq!(styles[0], Some(FontStyle::Heading1));
    assert_eq!(styles[1], Some(FontStyle::Heading2));
    assert_eq!(styles[2], Some(FontStyle::MainText));
    assert_eq!(styles[4], Some(FontStyle::Reference));
}
