use proptest::prelude::*;

use thesis_fmt::format::{self, Pass, extract_keywords, keyword_runs};
use thesis_fmt::fonts::{Script, detect_script, split_by_script};
use thesis_fmt::model::{Alignment, Document, Paragraph};
use thesis_fmt::reorganize::reorganize;
use thesis_fmt::toc::estimate_page;
use thesis_fmt::{FormatOptions, Lang, Run, analyze, classify, docx, writer};

fn paragraph(kind: usize) -> Paragraph {
    let (text, centered) = match kind {
        0 => ("第一章 绪论", false),
        1 => ("第二章 方法", false),
        2 => ("图 系统结构", true),
        3 => ("表 数据统计", true),
        4 => ("如图1-1所示，见表2。", false),
        _ => ("正文内容。", false),
    };
    let mut p = Paragraph::with_text(text);
    if centered {
        p.props.alignment = Some(Alignment::Center);
    }
    p
}

const SECTION_TEXTS: [&str; 10] = [
    "摘要",
    "Abstract",
    "目录",
    "第一章 绪论",
    "参考文献",
    "致谢",
    "附录",
    "正文内容。",
    "[1] 文献",
    "",
];

proptest! {
    #[test]
    fn script_split_keeps_text(text in "[a-zA-Z0-9 ，。中文混排测试]{0,40}") {
        let pieces = split_by_script(Run::new(&text));
        let joined: String = pieces.iter().map(Run::text).collect();
        prop_assert_eq!(joined, text);
        for piece in &pieces {
            let t = piece.text();
            if detect_script(&t) == Script::Latin {
                prop_assert!(!t.chars().any(thesis_fmt::patterns::is_cjk));
            }
        }
    }

    #[test]
    fn chinese_keywords_survive_formatting(tokens in prop::collection::vec("[一-龥a-z]{1,6}", 1..6)) {
        let line = format!("关键词：{}", tokens.join("，"));
        let extracted = extract_keywords(&line, Lang::Cn);
        prop_assert_eq!(&extracted, &tokens);

        let formatted: String = keyword_runs(&extracted, Lang::Cn).iter().map(Run::text).collect();
        prop_assert_eq!(extract_keywords(&formatted, Lang::Cn), tokens);
    }

    #[test]
    fn english_keywords_survive_formatting(
        tokens in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8})?", 1..6)
    ) {
        let line = format!("Keywords: {}", tokens.join(", "));
        let extracted = extract_keywords(&line, Lang::En);
        prop_assert_eq!(&extracted, &tokens);

        let formatted: String = keyword_runs(&extracted, Lang::En).iter().map(Run::text).collect();
        prop_assert_eq!(extract_keywords(&formatted, Lang::En), tokens);
    }

    #[test]
    fn body_page_estimates_never_decrease(
        main_start in 0usize..100,
        a in 0usize..500,
        b in 0usize..500,
        per_page in 1usize..60,
    ) {
        let (lo, hi) = (main_start + a.min(b), main_start + a.max(b));
        let page = |i| estimate_page(i, main_start, per_page).parse::<usize>().unwrap();
        prop_assert!(page(lo) <= page(hi));
        prop_assert_eq!(page(main_start), 1);
    }

    #[test]
    fn caption_numbering_is_idempotent(kinds in prop::collection::vec(0usize..6, 0..20)) {
        let mut doc = Document::new();
        doc.push(paragraph(0));
        for kind in kinds {
            doc.push(paragraph(kind));
        }
        let options = FormatOptions::default();
        let run = |doc: &mut Document| {
            let structure = analyze(doc);
            let classification = classify(doc, &structure);
            format::run_parallel(doc, &structure, &classification, &options, &[Pass::FigureTable])
                .unwrap();
        };
        run(&mut doc);
        let first = doc.texts();
        run(&mut doc);
        prop_assert_eq!(doc.texts(), first);
    }

    #[test]
    fn reorganize_keeps_every_text(kinds in prop::collection::vec(0usize..10, 0..30)) {
        let doc = Document::from_texts(kinds.iter().map(|&k| SECTION_TEXTS[k]));
        let mut input: Vec<String> =
            doc.texts().into_iter().filter(|t| !t.trim().is_empty()).collect();
        let structure = analyze(&doc);
        let out = reorganize(doc, &structure);
        prop_assert!(out.is_ok());
        let out = out.unwrap();
        for text in out.texts() {
            if let Some(pos) = input.iter().position(|t| *t == text) {
                input.swap_remove(pos);
            }
        }
        prop_assert!(input.is_empty(), "lost: {:?}", input);
    }

    #[test]
    fn package_round_trip_keeps_text(texts in prop::collection::vec("[a-zA-Z0-9 中文测试<>&\"'\t]{0,20}", 1..10)) {
        let doc = Document::from_texts(texts.iter().map(String::as_str));
        let bytes = writer::to_bytes(&doc).unwrap();
        let back = docx::parse_bytes(&bytes).unwrap();
        prop_assert_eq!(back.texts(), texts);
    }
}
