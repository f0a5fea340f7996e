use thesis_fmt::model::{Alignment, Document, Paragraph};
use thesis_fmt::structure::toc_block;
use thesis_fmt::{Lang, Role, SectionKey, analyze, classify};

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
fn abstract_title_is_first_exact_match() {
    let doc = Document::from_texts(["论文题目", "摘要内容概述", "摘要", "本文研究了……", "摘要"]);
    let structure = analyze(&doc);
    assert_eq!(structure.abstract_cn, Some(2));
}

#[test]
fn toc_entries_do_not_start_the_main_body() {
    let doc = doc_with(vec![
        text("摘要"),
        text("本文研究了……"),
        text("目录"),
        text("第一章 绪论\t1"),
        text("1.1 研究背景\t2"),
        text("参考文献\t10"),
        Paragraph::page_break(),
        text("第一章 绪论"),
        text("正文内容。"),
        text("参考文献"),
        text("[1] 张三. 论文[J]. 期刊, 2020."),
    ]);
    let structure = analyze(&doc);
    assert_eq!(structure.toc, Some(2));
    assert_eq!(structure.main_start, Some(7));
    assert_eq!(structure.references, Some(9));

    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(3), Role::TocEntry);
    assert_eq!(classification.role_at(5), Role::TocEntry);
    assert_eq!(classification.role_at(7), Role::Heading { level: 1, chapter: 1 });
    assert_eq!(classification.role_at(10), Role::ReferenceEntry);
}

#[test]
fn missing_sections_stay_unset() {
    let doc = Document::from_texts(["只有一段正文。"]);
    let structure = analyze(&doc);
    assert!(structure.found().is_empty());
    assert_eq!(structure.region_of(0), None);

    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(0), Role::Unclassified);
}

#[test]
fn sections_and_regions() {
    let doc = Document::from_texts([
        "摘要",
        "本文研究了……",
        "关键词：图像识别，深度学习",
        "Abstract",
        "This thesis studies image recognition.",
        "Keywords: image recognition; deep learning",
        "第一章 绪论",
        "正文。",
        "参考文献",
        "[1] 文献",
        "致谢",
        "感谢导师。",
        "附录",
        "附加材料。",
    ]);
    let structure = analyze(&doc);
    let found: Vec<SectionKey> = structure.found().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        found,
        vec![
            SectionKey::AbstractCn,
            SectionKey::AbstractEn,
            SectionKey::MainContent,
            SectionKey::References,
            SectionKey::Acknowledgment,
            SectionKey::Appendix,
        ]
    );
    assert_eq!(structure.end_of(0, doc.len()), 3);
    assert_eq!(structure.region_of(7), Some(SectionKey::MainContent));

    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(0), Role::AbstractTitle { lang: Lang::Cn });
    assert_eq!(classification.role_at(1), Role::AbstractBody { lang: Lang::Cn });
    assert_eq!(classification.role_at(2), Role::Keywords { lang: Lang::Cn });
    assert_eq!(classification.role_at(5), Role::Keywords { lang: Lang::En });
    assert_eq!(classification.role_at(10), Role::AcknowledgmentTitle);
    assert_eq!(classification.role_at(11), Role::AcknowledgmentBody);
    assert_eq!(classification.role_at(12), Role::AppendixTitle { ordinal: 0 });
    assert_eq!(classification.role_at(13), Role::AppendixBody);
}

#[test]
fn chapters_follow_level_one_headings() {
    let doc = doc_with(vec![
        text("第一章 绪论"),
        centered("图 系统结构"),
        text("第三章 实验"),
        text("3.1 数据集"),
        centered("表 3-1 数据统计"),
    ]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(1), Role::FigureCaption);
    assert_eq!(classification.chapter_at(1), 1);
    assert_eq!(classification.role_at(3), Role::Heading { level: 2, chapter: 3 });
    assert_eq!(classification.role_at(4), Role::TableCaption);
    assert_eq!(classification.chapter_at(4), 3);
}

#[test]
fn plain_paragraph_starting_with_figure_label_is_body() {
    let doc = Document::from_texts(["第一章 绪论", "图像识别是一个重要的研究方向，近年来取得了很大进展。"]);
    let structure = analyze(&doc);
    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(1), Role::Body);
}

#[test]
fn reclassify_keeps_earlier_roles() {
    let mut doc = Document::from_texts(["第一章 绪论", "正文。"]);
    let structure = analyze(&doc);
    let before = classify(&doc, &structure);

    // Rewritten text would no longer classify as a heading on its own.
    doc.paragraphs[0].replace_text("绪论");
    doc.insert(0, Paragraph::with_text("新插入的段落"));
    let structure = analyze(&doc);
    let after = thesis_fmt::reclassify(&doc, &structure, &before);
    assert_eq!(after.role(doc.paragraphs[1].id), Role::Heading { level: 1, chapter: 1 });
    assert_eq!(after.role(doc.paragraphs[2].id), Role::Body);
}

#[test]
fn toc_block_stops_at_first_non_entry_line() {
    let doc = doc_with(vec![
        text("目录"),
        text("前言\tI"),
        text("研究方法"),
        Paragraph::new(),
        text("前言"),
        text("前言正文。"),
        text("研究方法"),
        text("参考文献"),
    ]);
    let structure = analyze(&doc);
    assert_eq!(toc_block(&doc, &structure), 1..4);

    let classification = classify(&doc, &structure);
    assert_eq!(classification.role_at(2), Role::TocEntry);
    assert_eq!(classification.role_at(4), Role::Body);
    assert_eq!(classification.role_at(5), Role::Body);
}

#[test]
fn toc_block_ends_at_section_break() {
    let mut entry = text("绪论\t1");
    entry.props.section = Some(Box::default());
    let doc = doc_with(vec![text("目录"), entry, text("绪论\t1"), text("参考文献")]);
    let structure = analyze(&doc);
    assert_eq!(toc_block(&doc, &structure), 1..2);

    let plain = Document::from_texts(["正文"]);
    assert!(toc_block(&plain, &analyze(&plain)).is_empty());
}
