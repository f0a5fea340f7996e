use crate::model::{Alignment, Document, LineSpacing, Paragraph, Run, RunProps};
use crate::options::{FormatOptions, ThesisInfo};
use crate::structure::Structure;

const TITLE_BREAK_CHARS: &str = "的与和及或";

fn song(size: f32, bold: bool) -> RunProps {
    let mut props = RunProps::default();
    props.set_font("宋体");
    props.size = Some(size);
    props.bold = Some(bold);
    props
}

fn centered(text: &str, props: RunProps) -> Paragraph {
    let mut para = Paragraph::new();
    para.props.alignment = Some(Alignment::Center);
    if !text.is_empty() {
        para.push_run(Run::with_props(text, props));
    }
    para
}

fn spacer(after: f32) -> Paragraph {
    let mut para = Paragraph::new();
    para.props.spacing.after = Some(after);
    para
}

/// Splits a long title near its middle, preferring to break after a
/// connective such as 的 or 与.
pub fn split_title(title: &str) -> Vec<String> {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= 20 {
        return vec![title.to_string()];
    }
    let mut mid = chars.len() / 2;
    if let Some(i) = (mid - 5..mid + 5).find(|&i| TITLE_BREAK_CHARS.contains(chars[i])) {
        mid = i + 1;
    }
    vec![chars[..mid].iter().collect(), chars[mid..].iter().collect()]
}

/// Cover page paragraphs, ending with a page break.
pub fn cover_paragraphs(info: &ThesisInfo, options: &FormatOptions) -> Vec<Paragraph> {
    let mut paras = vec![
        centered(&options.institution, song(22.0, true)),
        spacer(36.0),
        centered("毕业论文", song(26.0, true)),
        spacer(48.0),
    ];

    let mut title = Paragraph::new();
    title.props.alignment = Some(Alignment::Center);
    title.props.spacing.line = Some(LineSpacing::Multiple(2.0));
    for (i, line) in split_title(&info.title).iter().enumerate() {
        if i > 0 {
            title.push_run(Run::new("\n"));
        }
        title.push_run(Run::with_props(line, song(16.0, true)));
    }
    paras.push(title);
    paras.push(spacer(72.0));

    let items = [
        ("专　　业：", &info.major),
        ("班　　级：", &info.class),
        ("学　　号：", &info.student_id),
        ("姓　　名：", &info.name),
        ("指导教师：", &info.advisor),
    ];
    for (label, value) in items {
        let mut line = centered(label, song(16.0, false));
        let mut value_props = song(16.0, false);
        value_props.underline = Some(true);
        line.push_run(Run::with_props(value, value_props));
        line.props.spacing.after = Some(18.0);
        paras.push(line);
    }

    paras.push(spacer(72.0));
    paras.push(centered(&info.date, song(14.0, false)));
    paras.push(Paragraph::page_break());
    paras
}

/// Integrity commitment page, ending with a page break.
pub fn commitment_paragraphs(options: &FormatOptions) -> Vec<Paragraph> {
    let mut title = centered("诚信承诺书", song(18.0, true));
    title.props.spacing.after = Some(36.0);

    let mut opening = Paragraph::new();
    opening.props.spacing.after = Some(12.0);
    opening.push_run(Run::with_props("本人郑重承诺：", song(14.0, false)));

    let body = [
        format!(
            "所呈交的毕业论文是本人在导师指导下独立进行研究工作所取得的研究成果。\
             除了文中特别加以标注和致谢的地方外，论文中不包含其他人或集体已经发表或撰写过的研究成果，\
             也不包含为获得{}或其它教育机构的学位或证书而使用过的材料。",
            options.institution
        ),
        "本人承诺，如违反上述声明，愿意承担由此引发的一切责任和后果。".to_string(),
    ];

    let mut paras = vec![title, opening];
    for text in &body {
        let mut para = Paragraph::new();
        para.props.indent.first_line = Some(28.0);
        para.props.spacing.line = Some(LineSpacing::Exact(28.0));
        para.push_run(Run::with_props(text, song(14.0, false)));
        paras.push(para);
    }
    paras.push(spacer(72.0));

    let right = |text: &str| {
        let mut para = Paragraph::new();
        para.props.alignment = Some(Alignment::Right);
        para.props.indent.right = Some(3.0 * 72.0 / 2.54);
        para.push_run(Run::with_props(text, song(14.0, false)));
        para
    };
    paras.push(right(&format!("承诺人（签名）：{}", "_".repeat(20))));
    let mut date = right("日期：____年____月____日");
    date.props.spacing.before = Some(12.0);
    paras.push(date);
    paras.push(Paragraph::page_break());
    paras
}

fn insert_all(doc: &mut Document, at: usize, paras: Vec<Paragraph>) -> usize {
    let count = paras.len();
    for (offset, para) in paras.into_iter().enumerate() {
        doc.insert(at + offset, para);
    }
    count
}

/// Inserts the cover page at the front unless the document has one.
/// Returns the number of paragraphs inserted.
pub fn generate_cover(
    doc: &mut Document,
    structure: &Structure,
    info: &ThesisInfo,
    options: &FormatOptions,
) -> usize {
    if structure.cover.is_some() {
        log::info!("cover already present, not generated");
        return 0;
    }
    for problem in info.validate() {
        log::warn!("thesis info: {problem}");
    }
    insert_all(doc, 0, cover_paragraphs(info, options))
}

/// Inserts the commitment page after the cover, or at the front when
/// there is no cover. Returns the number of paragraphs inserted.
pub fn generate_commitment(
    doc: &mut Document,
    structure: &Structure,
    options: &FormatOptions,
) -> usize {
    if structure.commitment.is_some() {
        log::info!("commitment page already present, not generated");
        return 0;
    }
    let at = match structure.cover {
        Some(start) => structure.end_of(start, doc.len()),
        None => 0,
    };
    insert_all(doc, at, commitment_paragraphs(options))
}
