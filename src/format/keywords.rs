use crate::classify::{Lang, Role};
use crate::error::Error;
use crate::fonts::{FontManager, FontStyle, Script};
use crate::model::Run;
use crate::patterns::{
    KEYWORDS_CN_MARKER, KEYWORDS_CN_SEPARATOR, KEYWORDS_EN_MARKER, KEYWORDS_EN_SEPARATOR,
};
use crate::spacing::{self, SpacingKind};

use super::{Pass, PassContext, Patch};

/// Keyword tokens of a keyword line, with the label and any trailing full
/// stop removed.
pub fn extract_keywords(text: &str, lang: Lang) -> Vec<String> {
    let (marker, separator) = match lang {
        Lang::Cn => (&*KEYWORDS_CN_MARKER, &*KEYWORDS_CN_SEPARATOR),
        Lang::En => (&*KEYWORDS_EN_MARKER, &*KEYWORDS_EN_SEPARATOR),
    };
    // Markers are anchored at the line start; one in mid-line is content.
    let body = marker.replace(text.trim(), "");
    let body = body.trim().trim_end_matches(['。', '.']);
    separator
        .split(body)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Label, space and content runs of a formatted keyword line.
pub fn keyword_runs(keywords: &[String], lang: Lang) -> Vec<Run> {
    let fonts = FontManager::new();
    let (label, joiner, script) = match lang {
        Lang::Cn => ("[关键词]", "；", Script::Cjk),
        Lang::En => ("[Keywords]", "; ", Script::Latin),
    };
    let mut label_run = Run::new(label);
    fonts.apply_run(&mut label_run, FontStyle::KeywordLabel, script);
    let mut content = Run::new(&keywords.join(joiner));
    fonts.apply_run(&mut content, FontStyle::KeywordContent, script);
    vec![label_run, Run::new(" "), content]
}

pub(super) fn format(ctx: &PassContext) -> Result<Patch, Error> {
    let mut patch = Patch::new(Pass::Keyword);
    for (_, id, role) in ctx.classification.iter() {
        let Role::Keywords { lang } = role else {
            continue;
        };
        patch.edit(id, move |para| {
            let keywords = extract_keywords(&para.text(), lang);
            para.clear();
            for run in keyword_runs(&keywords, lang) {
                para.push_run(run);
            }
            spacing::apply(para, SpacingKind::Keywords);
        });
    }
    if patch.is_empty() {
        log::info!("keyword pass: no keyword lines found");
    }
    Ok(patch)
}
