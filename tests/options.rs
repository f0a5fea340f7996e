use thesis_fmt::options::DEFAULT_INSTITUTION;
use thesis_fmt::{Error, FormatOptions, ThesisInfo};

#[test]
fn defaults_enable_everything() {
    let options = FormatOptions::default();
    assert!(options.generate_cover && options.update_toc && options.reorder_document);
    assert_eq!(options.institution, DEFAULT_INSTITUTION);
    assert!(options.header_text.starts_with(DEFAULT_INSTITUTION));
    assert!(options.check().is_ok());
}

#[test]
fn short_and_field_names_toggle_flags() {
    let mut options = FormatOptions::default();
    options.set_option("toc", false).unwrap();
    options.set_option("format_math", false).unwrap();
    options.set_option("page_number", false).unwrap();
    assert!(!options.update_toc);
    assert!(!options.format_math);
    assert!(!options.setup_page_numbers);

    let err = options.set_option("colour", true).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
    assert!(err.to_string().contains("colour"));
}

#[test]
fn partial_json_keeps_defaults() {
    let options =
        FormatOptions::from_json(r#"{"generate_cover": false, "workers": 2}"#).unwrap();
    assert!(!options.generate_cover);
    assert_eq!(options.workers, 2);
    assert!(options.format_keywords);
    assert_eq!(options.paragraphs_per_page, FormatOptions::default().paragraphs_per_page);
}

#[test]
fn invalid_json_options_rejected() {
    assert!(matches!(
        FormatOptions::from_json(r#"{"workers": 0}"#),
        Err(Error::InvalidOptions(_))
    ));
    assert!(matches!(FormatOptions::from_json("{"), Err(Error::Json(_))));
}

#[test]
fn thesis_info_validation() {
    assert!(ThesisInfo::default().validate().is_empty());

    let info = ThesisInfo::from_json(r#"{"title": "", "advisor": " "}"#).unwrap();
    let problems = info.validate();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("title"));
    assert!(problems[0].contains("advisor"));

    let info = ThesisInfo { title: "题".repeat(41), ..ThesisInfo::default() };
    assert_eq!(info.validate(), vec!["论文标题不能超过40个字符".to_string()]);
}

#[test]
fn default_date_is_current_month() {
    let date = ThesisInfo::default().date;
    assert!(date.ends_with('月'));
    assert!(date.contains('年'));
}

#[test]
fn options_load_from_file() {
    let path = std::env::temp_dir().join(format!("thesis-fmt-options-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"header_text": "测试页眉", "reorder_document": false}"#).unwrap();
    let options = FormatOptions::load(&path).unwrap();
    assert_eq!(options.header_text, "测试页眉");
    assert!(!options.reorder_document);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(FormatOptions::load(&path), Err(Error::Io(_))));
}
