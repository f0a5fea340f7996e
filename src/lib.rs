pub mod classify;
pub mod cover;
pub mod docx;
mod error;
pub mod fonts;
pub mod format;
pub mod model;
pub mod options;
pub mod pagination;
pub mod patterns;
mod pipeline;
pub mod reorganize;
pub mod report;
pub mod spacing;
pub mod structure;
pub mod toc;
pub mod writer;

pub use classify::{Classification, Lang, Role, classify, reclassify};
pub use error::Error;
pub use model::{Document, ParaId, Paragraph, Run};
pub use options::{FormatOptions, ThesisInfo};
pub use pipeline::{ThesisFormatter, apply_fonts, font_style_for, format_file};
pub use report::FormatReport;
pub use structure::{SectionKey, Structure, analyze};
