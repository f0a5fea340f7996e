use thesis_fmt::cover::{generate_commitment, generate_cover, split_title};
use thesis_fmt::model::{Document, HeaderFooterSource, Paragraph, RunItem};
use thesis_fmt::options::DEFAULT_INSTITUTION;
use thesis_fmt::pagination::{add_headers, setup_page_numbers, validate_headers};
use thesis_fmt::reorganize::{UNCLASSIFIED_BANNER, reorganize, validate_document_order};
use thesis_fmt::spacing::{self, SpacingKind};
use thesis_fmt::toc::{estimate_page, to_roman, update_toc};
use thesis_fmt::{
    FormatOptions, SectionKey, ThesisFormatter, ThesisInfo, analyze, apply_fonts, classify,
};

/// Fifty paragraphs: title, abstracts with keyword lines, two chapters of
/// filler and a reference list.
fn sample_thesis() -> Document {
    let mut doc = Document::new();
    doc.push_text("基于深度学习的图像识别研究");
    doc.push(Paragraph::new());
    doc.push_text("摘要");
    doc.push_text("本文研究了基于深度学习的图像识别方法。");
    doc.push_text("实验表明该方法在多个数据集上取得了较好的效果。");
    doc.push_text("最后总结了全文工作并展望了后续研究方向。");
    doc.push_text("关键词：图像识别，深度学习，卷积网络");
    doc.push_text("Abstract");
    doc.push_text("This thesis studies image recognition based on deep learning.");
    doc.push_text("Keywords: image recognition, deep learning, convolutional network");
    doc.push_text("第一章 绪论");
    doc.push_text("1.1 研究背景");
    for i in 12..25 {
        doc.push_text(&format!("正文内容第{i}段。"));
    }
    doc.push_text("第二章 方法");
    for i in 26..45 {
        doc.push_text(&format!("正文内容第{i}段。"));
    }
    doc.push_text("参考文献");
    for i in 1..=4 {
        doc.push_text(&format!("[{i}] 作者{i}. 论文题目[J]. 期刊, 2020."));
    }
    assert_eq!(doc.len(), 50);
    doc
}

fn done(report: &thesis_fmt::FormatReport, name: &str) -> bool {
    report
        .checklist
        .iter()
        .find(|item| item.name == name)
        .is_some_and(|item| item.done)
}

#[test]
fn formats_complete_thesis() {
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (doc, report) = formatter.run(sample_thesis()).unwrap();
    let texts = doc.texts();

    assert!(texts[0].contains(DEFAULT_INSTITUTION));
    let abstract_cn = report.structure.abstract_cn.unwrap();
    assert_eq!(texts[abstract_cn], "摘要");
    assert_eq!(report.structure.appendix, None);
    assert!(texts.iter().any(|t| t == "[关键词] 图像识别；深度学习；卷积网络"));

    for item in ["封面", "承诺书", "页码系统", "关键词格式", "目录"] {
        assert!(done(&report, item), "{item} not done");
    }
    assert!(!done(&report, "致谢"));

    let order = report.order.as_ref().unwrap();
    assert!(order.ok, "{}", order.message);
    assert!(report.passes.iter().all(|p| p.ok()));
    assert!(report.toc.as_ref().is_some_and(|t| t.created && t.entries > 0));
    assert!(report.header_issues.is_empty());
    assert!(report.font_issues.is_empty(), "{:?}", report.font_issues);
}

#[test]
fn report_renders_and_serializes() {
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (_, report) = formatter.run(sample_thesis()).unwrap();

    let text = report.to_string();
    assert!(text.contains("论文格式化报告"));
    assert!(text.contains("封面: ✓ 已完成"));
    assert!(text.contains("目录页码为估算值"));

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["structure"]["references"], serde_json::json!(report.structure.references));
    assert!(value["checklist"].as_array().is_some_and(|a| a.len() == 7));
}

#[test]
fn disabled_features_are_skipped() {
    let mut options = FormatOptions::default();
    for name in ["cover", "commitment", "toc", "reorganize", "page_number"] {
        options.set_option(name, false).unwrap();
    }
    let formatter = ThesisFormatter::new(options, ThesisInfo::default());
    let (doc, report) = formatter.run(sample_thesis()).unwrap();

    assert_eq!(doc.len(), 50);
    assert_eq!(doc.texts()[0], "基于深度学习的图像识别研究");
    assert_eq!(doc.section_count(), 1);
    assert!(report.toc.is_none());
    assert!(!done(&report, "封面"));
}

#[test]
fn invalid_options_abort() {
    let options = FormatOptions { workers: 0, ..FormatOptions::default() };
    let formatter = ThesisFormatter::new(options, ThesisInfo::default());
    assert!(formatter.run(sample_thesis()).is_err());
}

#[test]
fn reorganize_moves_sections_and_keeps_everything() {
    let mut doc = Document::from_texts(["孤立的说明文字", "第一章 绪论", "正文内容。"]);
    doc.add_page_break();
    for t in ["摘要", "这是摘要。", "参考文献", "[1] 文献"] {
        doc.push_text(t);
    }

    let check = validate_document_order(&doc);
    assert!(!check.ok);
    assert!(check.issues.contains(&"缺少目录".to_string()));
    assert!(check.issues.contains(&"正文位置不正确".to_string()));

    let structure = analyze(&doc);
    let input = doc.texts();
    let out = reorganize(doc, &structure).unwrap();
    let texts = out.texts();

    for t in input.iter().filter(|t| !t.trim().is_empty()) {
        assert!(texts.contains(t), "{t} lost");
    }
    let first = texts.iter().find(|t| !t.trim().is_empty()).unwrap();
    assert_eq!(first, "摘要");
    let banner = texts.iter().position(|t| t == UNCLASSIFIED_BANNER).unwrap();
    let orphan = texts.iter().position(|t| t == "孤立的说明文字").unwrap();
    assert!(banner < orphan);

    let check = validate_document_order(&out);
    assert_eq!(check.issues, vec!["缺少目录".to_string()]);
}

#[test]
fn reorganize_without_leftovers_adds_no_banner() {
    let doc = Document::from_texts(["摘要", "内容", "第一章 绪论", "正文", "参考文献", "[1] x"]);
    let structure = analyze(&doc);
    let out = reorganize(doc, &structure).unwrap();
    assert!(!out.texts().iter().any(|t| t == UNCLASSIFIED_BANNER));
}

#[test]
fn fonts_and_spacing_are_idempotent() {
    let mut doc = Document::from_texts(["第一章 绪论", "正文内容 mixed with English 文本。"]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);

    apply_fonts(&mut doc, &classification);
    spacing::apply(&mut doc.paragraphs[1], SpacingKind::MainText);
    let once = doc.clone();
    apply_fonts(&mut doc, &classification);
    spacing::apply(&mut doc.paragraphs[1], SpacingKind::MainText);
    assert_eq!(doc, once);

    let runs: Vec<_> = doc.paragraphs[1].runs().collect();
    assert!(runs.len() > 1);
    assert!(runs.iter().any(|r| r.props.latin_font() == Some("Times New Roman")
        && r.text().contains("English")));
}

#[test]
fn page_numbers_split_front_matter_and_body() {
    let mut doc =
        Document::from_texts(["摘要", "内容", "第一章 绪论", "正文", "参考文献", "[1] x"]);
    let structure = analyze(&doc);
    let options = FormatOptions::default();

    assert_eq!(add_headers(&mut doc, &structure, &options), 1);
    assert_eq!(setup_page_numbers(&mut doc, &structure), 2);
    assert_eq!(doc.section_count(), 2);
    assert!(doc.paragraphs[1].props.section.is_some());

    let front = doc.section_props(0).unwrap();
    let body = doc.section_props(1).unwrap();
    let numbering = |s: &thesis_fmt::model::SectionProps| {
        let n = s.page_numbering.clone().unwrap();
        (n.format.unwrap(), n.start)
    };
    assert_eq!(numbering(front), ("lowerRoman".to_string(), Some(1)));
    assert_eq!(numbering(body), ("decimal".to_string(), Some(1)));

    let footer = &front.generated_footer().unwrap()[0];
    let field = footer.runs().flat_map(|r| r.items.iter()).find_map(|i| match i {
        RunItem::Field(f) => Some(f.clone()),
        _ => None,
    });
    assert_eq!(field.as_deref(), Some(" PAGE \\* roman "));

    assert_eq!(front.generated_header().unwrap()[0].text(), "");
    assert_eq!(body.generated_header().unwrap()[0].text(), options.header_text);
    assert!(validate_headers(&doc, &options).is_empty());
}

#[test]
fn without_main_body_numbering_is_arabic() {
    let mut doc = Document::from_texts(["摘要", "内容"]);
    let structure = analyze(&doc);
    setup_page_numbers(&mut doc, &structure);
    let section = doc.section_props(0).unwrap();
    let numbering = section.page_numbering.as_ref().unwrap();
    assert_eq!(numbering.format.as_deref(), Some("decimal"));
    assert!(matches!(section.footers[0].source, HeaderFooterSource::Generated(_)));
}

#[test]
fn header_problems_are_reported() {
    let mut doc = Document::from_texts(["第一章 绪论", "正文"]);
    let structure = analyze(&doc);
    let options = FormatOptions::default();
    add_headers(&mut doc, &structure, &options);

    let other = FormatOptions { header_text: "别的页眉".into(), ..FormatOptions::default() };
    assert_eq!(validate_headers(&doc, &other), vec!["第1节：页眉文本不符合要求".to_string()]);
}

#[test]
fn toc_created_in_front_of_main_body() {
    let mut doc = Document::from_texts([
        "摘要",
        "内容",
        "关键词：甲，乙",
        "第一章 绪论",
        "1.1 背景",
        "正文",
        "参考文献",
        "[1] x",
    ]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    let summary = update_toc(&mut doc, &structure, &classification, 30);
    assert!(summary.created && summary.estimated);
    assert_eq!(summary.entries, 4);

    let texts = doc.texts();
    assert_eq!(texts[4], "目录");
    assert_eq!(texts[5], "摘要\tI");
    assert_eq!(texts[6], "第一章 绪论\t1");
    assert_eq!(texts[7], "1.1 背景\t1");
    assert_eq!(texts[8], "参考文献\t1");

    let after = analyze(&doc);
    assert_eq!(after.toc, Some(4));
    assert_eq!(after.main_start, Some(10));
}

#[test]
fn toc_entries_replaced_in_place() {
    let mut doc = Document::from_texts(["摘要", "内容", "目录", "旧条目一\t3", "旧条目二\t5"]);
    doc.add_page_break();
    for t in ["第一章 绪论", "正文", "参考文献", "[1] x"] {
        doc.push_text(t);
    }
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    let summary = update_toc(&mut doc, &structure, &classification, 30);
    assert!(!summary.created);

    let texts = doc.texts();
    assert!(!texts.iter().any(|t| t.starts_with("旧条目")));
    assert_eq!(&texts[3..6], &["摘要\tI", "第一章 绪论\t1", "参考文献\t1"]);
    assert!(doc.paragraphs[6].is_page_break_only());
}

#[test]
fn toc_update_keeps_text_after_page_break() {
    let mut doc = Document::from_texts(["摘要", "内容", "目录", "绪论\t1"]);
    doc.add_page_break();
    for t in ["绪论", "这是正文第一段。", "这是正文第二段。", "参考文献", "[1] x"] {
        doc.push_text(t);
    }
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    update_toc(&mut doc, &structure, &classification, 30);

    let texts = doc.texts();
    assert!(!texts.contains(&"绪论\t1".to_string()));
    for kept in ["绪论", "这是正文第一段。", "这是正文第二段。", "参考文献", "[1] x"] {
        assert!(texts.iter().any(|t| t == kept), "{kept} missing: {texts:?}");
    }
    assert_eq!(&texts[3..5], &["摘要\t1", "参考文献\t1"]);
    assert!(doc.paragraphs[5].is_page_break_only());
}

#[test]
fn preface_between_toc_and_first_chapter_survives() {
    let mut doc = Document::from_texts(["摘要", "本文内容。", "关键词：甲，乙", "目录", "第一章 绪论\t1"]);
    doc.add_page_break();
    for t in ["前言", "前言正文内容。", "第一章 绪论", "正文。", "参考文献", "[1] x"] {
        doc.push_text(t);
    }
    let formatter = ThesisFormatter::new(FormatOptions::default(), ThesisInfo::default());
    let (doc, _) = formatter.run(doc).unwrap();

    let texts = doc.texts();
    for kept in ["前言", "前言正文内容。", "第一章 绪论", "正文。", "[1] x"] {
        assert!(texts.iter().any(|t| t == kept), "{kept} missing: {texts:?}");
    }
    let entries = texts.iter().filter(|t| t.starts_with("第一章 绪论\t")).count();
    assert_eq!(entries, 1);
}

#[test]
fn page_estimates() {
    assert_eq!(to_roman(4), "IV");
    assert_eq!(to_roman(1994), "MCMXCIV");
    assert_eq!(estimate_page(0, 40, 30), "I");
    assert_eq!(estimate_page(35, 40, 30), "II");
    assert_eq!(estimate_page(40, 40, 30), "1");
    assert_eq!(estimate_page(75, 40, 30), "2");
}

#[test]
fn long_titles_split_after_connective() {
    let title = "基于深度学习的图像识别算法研究与智能监控系统的设计实现";
    let lines = split_title(title);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with('与'));
    assert_eq!(lines.concat(), title);
    assert_eq!(split_title("短标题"), vec!["短标题".to_string()]);
}

#[test]
fn cover_and_commitment_inserted_once() {
    let options = FormatOptions::default();
    let info = ThesisInfo::default();
    let mut doc = Document::from_texts(["摘要", "内容"]);

    let initial = analyze(&doc);
    let inserted = generate_cover(&mut doc, &initial, &info, &options);
    assert_eq!(inserted, 14);
    assert_eq!(doc.texts()[0], options.institution);
    assert_eq!(doc.texts()[2], "毕业论文");
    assert!(doc.paragraphs[13].is_page_break_only());

    let structure = analyze(&doc);
    assert_eq!(structure.get(SectionKey::Cover), Some(0));
    assert_eq!(generate_cover(&mut doc, &structure, &info, &options), 0);

    let inserted = generate_commitment(&mut doc, &structure, &options);
    assert!(inserted > 0);
    assert_eq!(doc.texts()[14], "诚信承诺书");
    assert_eq!(analyze(&doc).commitment, Some(14));
    let after = analyze(&doc);
    assert_eq!(generate_commitment(&mut doc, &after, &options), 0);
}
