use thesis_fmt::format::{self, Pass, PassOutcome, Patch, add_appendix, check_acknowledgment};
use thesis_fmt::model::{Alignment, Document, Paragraph, VertAlign};
use thesis_fmt::{FormatOptions, analyze, classify};

fn run(doc: &mut Document, passes: &[Pass]) -> Vec<PassOutcome> {
    let structure = analyze(doc);
    let classification = classify(doc, &structure);
    format::run_parallel(doc, &structure, &classification, &FormatOptions::default(), passes)
        .unwrap()
}

fn doc_with(paragraphs: Vec<Paragraph>) -> Document {
    let mut doc = Document::new();
    for p in paragraphs {
        doc.push(p);
    }
    doc
}

fn text(t: &str) -> Paragraph {
    Paragraph::with_text(t)
}

fn centered(t: &str) -> Paragraph {
    let mut p = Paragraph::with_text(t);
    p.props.alignment = Some(Alignment::Center);
    p
}

#[test]
fn figure_numbers_restart_per_chapter() {
    let mut doc = doc_with(vec![
        text("第一章 绪论"),
        centered("图 甲"),
        centered("图 乙"),
        text("第二章 方法"),
        centered("图 丙"),
    ]);
    let outcomes = run(&mut doc, &[Pass::FigureTable]);
    assert!(outcomes.iter().all(PassOutcome::ok));

    let texts = doc.texts();
    assert_eq!(texts[1], "图1.1 甲");
    assert_eq!(texts[2], "图1.2 乙");
    assert_eq!(texts[4], "图2.1 丙");
}

#[test]
fn table_and_figure_counters_are_separate() {
    let mut doc = doc_with(vec![
        text("第一章 绪论"),
        centered("表1 数据统计"),
        centered("图1 系统结构"),
        centered("表2 实验结果"),
    ]);
    run(&mut doc, &[Pass::FigureTable]);
    let texts = doc.texts();
    assert_eq!(texts[1], "表1.1 数据统计");
    assert_eq!(texts[2], "图1.1 系统结构");
    assert_eq!(texts[3], "表1.2 实验结果");
    assert_eq!(doc.paragraphs[1].props.alignment, Some(Alignment::Center));
}

#[test]
fn caption_references_follow_renumbering_once() {
    let mut doc = Document::from_texts([
        "第一章 绪论",
        "图2-1 流程图",
        "如图2-1所示，系统分为三层。",
        "第二章 方法",
        "图 3 结构",
        "见图3说明。",
    ]);
    run(&mut doc, &[Pass::FigureTable]);
    let first = doc.texts();
    assert_eq!(first[1], "图1.1 流程图");
    assert_eq!(first[2], "如图1.1所示，系统分为三层。");
    assert_eq!(first[4], "图2.1 结构");
    assert_eq!(first[5], "见图2.1说明。");

    run(&mut doc, &[Pass::FigureTable]);
    assert_eq!(doc.texts(), first);
}

#[test]
fn caption_map_drives_reference_rewrites() {
    let doc = Document::from_texts([
        "第一章 绪论",
        "图2-1 流程图",
        "第二章 方法",
        "表 4 参数",
    ]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    let map = format::caption_number_map(&doc, &classification);
    assert_eq!(map.get(&('图', "2.1".to_string())).map(String::as_str), Some("1.1"));
    assert_eq!(map.get(&('表', "4".to_string())).map(String::as_str), Some("2.1"));

    assert_eq!(format::rewrite_references("见图2-1与表4。", &map), "见图1.1与表2.1。");
    assert_eq!(format::rewrite_references("见图7-3。", &map), "见图7.3。");
    assert_eq!(format::rewrite_references("共5张表。", &map), "共5张表。");
}

#[test]
fn keyword_line_is_relabelled() {
    let mut doc = Document::from_texts([
        "摘要",
        "本文研究了图像识别。",
        "关键词：图像识别，深度学习，卷积网络",
        "Abstract",
        "This thesis studies image recognition.",
        "Key words: image recognition, deep learning.",
    ]);
    run(&mut doc, &[Pass::Keyword]);
    let texts = doc.texts();
    assert_eq!(texts[2], "[关键词] 图像识别；深度学习；卷积网络");
    assert_eq!(texts[5], "[Keywords] image recognition; deep learning");

    let label = doc.paragraphs[2].first_run().unwrap();
    assert_eq!(label.props.east_asia_font(), Some("黑体"));
    assert_eq!(label.props.bold, Some(true));
}

#[test]
fn keyword_extraction_drops_label_and_full_stop() {
    use thesis_fmt::Lang;
    assert_eq!(
        format::extract_keywords("【关键词】 A、B；C。", Lang::Cn),
        vec!["A", "B", "C"]
    );
    assert_eq!(
        format::extract_keywords("[关键词] 图像识别；深度学习", Lang::Cn),
        vec!["图像识别", "深度学习"]
    );
    assert!(format::extract_keywords("关键词：", Lang::Cn).is_empty());
    assert_eq!(
        format::extract_keywords("本文关键词：甲，乙", Lang::Cn),
        vec!["本文关键词：甲", "乙"]
    );
    assert_eq!(
        format::extract_keywords("Keywords: data; key words", Lang::En),
        vec!["data", "key words"]
    );
}

#[test]
fn footnote_markers_become_superscript() {
    let mut doc = Document::from_texts(["第一章 绪论", "研究表明[1]该方法有效。"]);
    run(&mut doc, &[Pass::Footnote]);

    let runs: Vec<_> = doc.paragraphs[1].runs().collect();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].text(), "研究表明");
    assert_eq!(runs[1].text(), "[1]");
    assert_eq!(runs[1].props.vert_align, Some(VertAlign::Superscript));
    assert_eq!(runs[1].props.size, Some(9.0));
    assert_eq!(runs[2].text(), "该方法有效。");
    assert_eq!(doc.texts()[1], "研究表明[1]该方法有效。");
    assert_eq!(doc.body_section.footnote_restart.as_deref(), Some("eachPage"));
}

#[test]
fn leading_marker_is_numbering_not_reference() {
    let mut para = Paragraph::with_text("[1] 文献说明，见(2)。");
    let split = format::split_markers(&mut para);
    assert_eq!(split, 1);
    assert_eq!(para.first_run().unwrap().text(), "[1] 文献说明，见");
}

#[test]
fn formulas_numbered_and_referenced() {
    let mut doc = doc_with(vec![
        text("第一章 绪论"),
        centered("E = m * c ^ 2"),
        text("由公式1可知结果。"),
    ]);
    run(&mut doc, &[Pass::Math]);
    let texts = doc.texts();
    assert_eq!(texts[1], "E = m * c ^ 2\t(1.1)");
    assert_eq!(texts[2], "由公式(1.1)可知结果。");
    assert_eq!(doc.paragraphs[1].props.tabs.len(), 1);
}

#[test]
fn inline_variables_are_italic() {
    let mut doc = Document::from_texts(["第一章 绪论", "其中 x + y = 1 成立"]);
    run(&mut doc, &[Pass::Math]);

    let para = &doc.paragraphs[1];
    let italic: Vec<String> = para
        .runs()
        .filter(|r| r.props.italic == Some(true))
        .map(|r| r.text())
        .collect();
    assert_eq!(italic, vec!["x", "y"]);
    assert_eq!(para.text(), "其中 x + y = 1 成立");
}

#[test]
fn appendix_titles_get_letters() {
    let mut doc = Document::from_texts([
        "第一章 绪论",
        "正文。",
        "附录",
        "实验数据表格说明内容。",
        "附录 B 程序代码",
        "代码说明",
    ]);
    run(&mut doc, &[Pass::Appendix]);
    let texts = doc.texts();
    assert_eq!(texts[2], "附录A");
    assert_eq!(texts[4], "附录B  程序代码");
    assert_eq!(doc.paragraphs[3].props.indent.first_line, Some(28.0));
}

#[test]
fn added_appendix_continues_labels() {
    let mut doc = Document::from_texts(["第一章 绪论", "附录A 数据"]);
    let id = add_appendix(&mut doc, "调查问卷", &["问题一", "", "问题二"]);
    let title = doc.get(id).unwrap();
    assert_eq!(title.text(), "附录B  调查问卷");
    assert_eq!(doc.len(), 6);
    assert!(doc.paragraphs[2].is_page_break_only());
}

#[test]
fn acknowledgment_checks() {
    let short = Document::from_texts(["第一章 绪论", "正文。", "致谢", "感谢导师。"]);
    let s = analyze(&short);
    let check = check_acknowledgment(&short, &classify(&short, &s));
    assert!(!check.passed());
    assert!(check.message.starts_with("致谢内容过短"));

    let none = Document::from_texts(["第一章 绪论", "正文。"]);
    let s = analyze(&none);
    let check = check_acknowledgment(&none, &classify(&none, &s));
    assert_eq!(check.message, "未找到致谢部分");

    let body = "感谢我的导师和各位老师的悉心指导。".repeat(13);
    let good = Document::from_texts(["第一章 绪论", "正文。", "致谢", body.as_str()]);
    let s = analyze(&good);
    let check = check_acknowledgment(&good, &classify(&good, &s));
    assert!(check.passed(), "{}", check.message);
}

#[test]
fn basic_passes_format_headings_and_references() {
    let mut doc = Document::from_texts([
        "第一章 绪论",
        "1.1 研究背景",
        "正文内容。",
        "参考文献",
        "[1] 张三. 论文[J]. 期刊, 2020.",
    ]);
    let outcomes = run(
        &mut doc,
        &[Pass::Heading, Pass::Paragraph, Pass::Reference],
    );
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.ok() && o.edited > 0));
    assert_eq!(doc.texts()[0], "第一章 绪论");
    assert_eq!(doc.paragraphs[0].first_run().unwrap().props.bold, Some(true));
}

#[test]
fn outcomes_follow_canonical_order() {
    let mut doc = Document::from_texts(["第一章 绪论", "正文。"]);
    let outcomes = run(&mut doc, &[Pass::Appendix, Pass::Math, Pass::Heading]);
    let names: Vec<&str> = outcomes.iter().map(|o| o.pass).collect();
    assert_eq!(names, vec!["heading", "math", "appendix"]);
}

#[test]
fn panicking_edit_rolls_back_its_patch() {
    let mut doc = Document::from_texts(["第一章 绪论", "正文。"]);
    let before = doc.clone();
    let (first, second) = (doc.paragraphs[0].id, doc.paragraphs[1].id);

    let mut patch = Patch::new(Pass::Keyword);
    patch.edit(first, |p| p.replace_text("改写"));
    patch.edit(second, |_| panic!("rewrite failed"));
    let err = patch.commit(&mut doc).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("keyword"));
    assert!(message.contains("rewrite failed"));
    assert_eq!(doc, before);

    let mut patch = Patch::new(Pass::Keyword);
    patch.edit(first, |p| p.replace_text("改写"));
    assert_eq!(patch.commit(&mut doc).unwrap(), 1);
    assert_eq!(doc.texts(), vec!["改写".to_string(), "正文。".to_string()]);
}
