//! Independent per-section formatting passes.
//!
//! Each pass reads an immutable snapshot of the document plus its
//! classification and returns a [`Patch`]: edits keyed by paragraph id.
//! Passes run concurrently; patches are applied afterwards in
//! [`Pass::CANONICAL`] order, so two passes touching the same paragraph
//! compose instead of racing. A patch whose edits panic is rolled back
//! and its pass reported as failed.

mod acknowledgment;
mod appendix;
mod basic;
mod figures;
mod footnotes;
mod keywords;
mod math;

pub use acknowledgment::{AcknowledgmentCheck, check_acknowledgment};
pub use appendix::add_appendix;
pub use figures::{caption_number_map, rewrite_references};
pub use footnotes::split_markers;
pub use keywords::{extract_keywords, keyword_runs};

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;

use crate::classify::Classification;
use crate::error::Error;
use crate::model::{Document, ParaId, Paragraph};
use crate::options::FormatOptions;
use crate::structure::Structure;

pub type Rewrite = Box<dyn FnOnce(&mut Paragraph) + Send>;
pub type DocumentEdit = Box<dyn FnOnce(&mut Document) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Heading,
    Paragraph,
    Abstract,
    Reference,
    Keyword,
    FigureTable,
    Footnote,
    Math,
    Acknowledgment,
    Appendix,
}

impl Pass {
    pub const CANONICAL: [Pass; 10] = [
        Pass::Heading,
        Pass::Paragraph,
        Pass::Abstract,
        Pass::Reference,
        Pass::Keyword,
        Pass::FigureTable,
        Pass::Footnote,
        Pass::Math,
        Pass::Acknowledgment,
        Pass::Appendix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::Heading => "heading",
            Pass::Paragraph => "paragraph",
            Pass::Abstract => "abstract",
            Pass::Reference => "reference",
            Pass::Keyword => "keyword",
            Pass::FigureTable => "figure_table",
            Pass::Footnote => "footnote",
            Pass::Math => "math",
            Pass::Acknowledgment => "acknowledgment",
            Pass::Appendix => "appendix",
        }
    }

    pub fn enabled(self, options: &FormatOptions) -> bool {
        match self {
            Pass::Heading | Pass::Paragraph | Pass::Abstract | Pass::Reference => {
                options.basic_formatting
            }
            Pass::Keyword => options.format_keywords,
            Pass::FigureTable => options.format_figures_tables,
            Pass::Footnote => options.format_footnotes,
            Pass::Math => options.format_math,
            Pass::Acknowledgment => options.format_acknowledgment,
            Pass::Appendix => options.format_appendix,
        }
    }

    pub fn run(self, ctx: &PassContext) -> Result<Patch, Error> {
        match self {
            Pass::Heading => basic::headings(ctx),
            Pass::Paragraph => basic::paragraphs(ctx),
            Pass::Abstract => basic::abstracts(ctx),
            Pass::Reference => basic::references(ctx),
            Pass::Keyword => keywords::format(ctx),
            Pass::FigureTable => figures::format(ctx),
            Pass::Footnote => footnotes::format(ctx),
            Pass::Math => math::format(ctx),
            Pass::Acknowledgment => acknowledgment::format(ctx),
            Pass::Appendix => appendix::format(ctx),
        }
    }
}

/// Read-only inputs shared by every pass.
pub struct PassContext<'a> {
    pub doc: &'a Document,
    pub structure: &'a Structure,
    pub classification: &'a Classification,
    pub options: &'a FormatOptions,
}

pub struct Patch {
    pub pass: Pass,
    pub edits: Vec<(ParaId, Rewrite)>,
    pub document_edits: Vec<DocumentEdit>,
}

impl Patch {
    pub fn new(pass: Pass) -> Self {
        Patch { pass, edits: Vec::new(), document_edits: Vec::new() }
    }

    pub fn edit(&mut self, id: ParaId, rewrite: impl FnOnce(&mut Paragraph) + Send + 'static) {
        self.edits.push((id, Box::new(rewrite)));
    }

    pub fn edit_document(&mut self, edit: impl FnOnce(&mut Document) + Send + 'static) {
        self.document_edits.push(Box::new(edit));
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.document_edits.is_empty()
    }

    /// Applies the edits to the live document. Edits for paragraphs that no
    /// longer exist are dropped. Returns the number of paragraphs edited.
    pub fn apply(self, doc: &mut Document) -> usize {
        let index = doc.index_map();
        let mut applied = 0;
        for (id, rewrite) in self.edits {
            match index.get(&id) {
                Some(&i) => {
                    rewrite(&mut doc.paragraphs[i]);
                    applied += 1;
                }
                None => log::debug!("{}: paragraph {id:?} is gone", self.pass.name()),
            }
        }
        for edit in self.document_edits {
            edit(doc);
        }
        applied
    }

    /// Applies the patch to a staged copy and keeps it only if no edit
    /// panics. On failure `doc` is left as it was.
    pub fn commit(self, doc: &mut Document) -> Result<usize, Error> {
        let pass = self.pass.name();
        let mut staged = doc.clone();
        let edited = catch_unwind(AssertUnwindSafe(|| self.apply(&mut staged)))
            .map_err(|payload| Error::Pass { pass, reason: panic_message(payload) })?;
        *doc = staged;
        Ok(edited)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Outcome of one pass for the report.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PassOutcome {
    pub pass: &'static str,
    pub edited: usize,
    pub error: Option<String>,
}

impl PassOutcome {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the given passes on a pool of `workers` threads against the
/// snapshot, then applies successful patches in canonical order. A failing
/// or panicking pass is recorded and does not stop the others.
pub fn run_parallel(
    doc: &mut Document,
    structure: &Structure,
    classification: &Classification,
    options: &FormatOptions,
    passes: &[Pass],
) -> Result<Vec<PassOutcome>, Error> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .map_err(|e| Error::Stage { stage: "parallel", reason: e.to_string() })?;

    let ctx = PassContext { doc: &*doc, structure, classification, options };
    let results: Vec<(Pass, Result<Patch, Error>)> = pool.install(|| {
        passes
            .par_iter()
            .map(|&pass| {
                log::debug!("{} pass started", pass.name());
                let result = catch_unwind(AssertUnwindSafe(|| pass.run(&ctx)))
                    .unwrap_or_else(|payload| {
                        Err(Error::Pass { pass: pass.name(), reason: panic_message(payload) })
                    });
                (pass, result)
            })
            .collect()
    });

    let mut by_pass: HashMap<Pass, Result<Patch, Error>> = results.into_iter().collect();
    let mut touched: HashMap<ParaId, Vec<&'static str>> = HashMap::new();
    let mut outcomes = Vec::new();
    for pass in Pass::CANONICAL {
        let Some(result) = by_pass.remove(&pass) else {
            continue;
        };
        let ids: Vec<ParaId> = match &result {
            Ok(patch) => patch.edits.iter().map(|(id, _)| *id).collect(),
            Err(_) => Vec::new(),
        };
        match result.and_then(|patch| patch.commit(doc)) {
            Ok(edited) => {
                for id in ids {
                    touched.entry(id).or_default().push(pass.name());
                }
                log::debug!("{} pass finished, {edited} paragraphs edited", pass.name());
                outcomes.push(PassOutcome { pass: pass.name(), edited, error: None });
            }
            Err(e) => {
                log::warn!("{e}");
                outcomes.push(PassOutcome { pass: pass.name(), edited: 0, error: Some(e.to_string()) });
            }
        }
    }

    let shared = touched.values().filter(|passes| passes.len() > 1).count();
    if shared > 0 {
        log::debug!("{shared} paragraphs edited by more than one pass");
    }
    Ok(outcomes)
}
