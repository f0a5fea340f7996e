use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_INSTITUTION: &str = "江西财经大学现代经济管理学院";

/// Feature switches and tunables for one formatting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub generate_cover: bool,
    pub generate_commitment: bool,
    pub format_keywords: bool,
    pub format_figures_tables: bool,
    pub format_footnotes: bool,
    pub format_math: bool,
    pub update_toc: bool,
    pub format_acknowledgment: bool,
    pub format_appendix: bool,
    pub setup_page_numbers: bool,
    pub reorder_document: bool,
    pub basic_formatting: bool,
    pub institution: String,
    pub header_text: String,
    /// Threads in the pool running the independent passes.
    pub workers: usize,
    /// Paragraphs per page assumed when estimating TOC page numbers.
    pub paragraphs_per_page: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            generate_cover: true,
            generate_commitment: true,
            format_keywords: true,
            format_figures_tables: true,
            format_footnotes: true,
            format_math: true,
            update_toc: true,
            format_acknowledgment: true,
            format_appendix: true,
            setup_page_numbers: true,
            reorder_document: true,
            basic_formatting: true,
            institution: DEFAULT_INSTITUTION.to_string(),
            header_text: format!("{DEFAULT_INSTITUTION}普通本科毕业论文"),
            workers: 12,
            paragraphs_per_page: 30,
        }
    }
}

impl FormatOptions {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: FormatOptions = serde_json::from_str(json)?;
        options.check()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn check(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidOptions("workers must be at least 1".into()));
        }
        if self.paragraphs_per_page == 0 {
            return Err(Error::InvalidOptions("paragraphs_per_page must be at least 1".into()));
        }
        Ok(())
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "cover" | "generate_cover" => &mut self.generate_cover,
            "commitment" | "generate_commitment" => &mut self.generate_commitment,
            "page_number" | "setup_page_numbers" => &mut self.setup_page_numbers,
            "keywords" | "format_keywords" => &mut self.format_keywords,
            "figures_tables" | "format_figures_tables" => &mut self.format_figures_tables,
            "footnotes" | "format_footnotes" => &mut self.format_footnotes,
            "math" | "format_math" => &mut self.format_math,
            "toc" | "update_toc" => &mut self.update_toc,
            "acknowledgment" | "format_acknowledgment" => &mut self.format_acknowledgment,
            "appendix" | "format_appendix" => &mut self.format_appendix,
            "reorganize" | "reorder_document" => &mut self.reorder_document,
            "basic" | "basic_formatting" => &mut self.basic_formatting,
            _ => return None,
        })
    }

    /// Sets a feature flag by its short option name (`toc`, `math`, ...)
    /// or its field name.
    pub fn set_option(&mut self, name: &str, value: bool) -> Result<(), Error> {
        match self.flag_mut(name) {
            Some(flag) => {
                *flag = value;
                Ok(())
            }
            None => Err(Error::InvalidOptions(format!("unknown option: {name}"))),
        }
    }
}

/// Student and thesis details printed on the cover page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThesisInfo {
    pub title: String,
    pub major: String,
    pub class: String,
    pub student_id: String,
    pub name: String,
    pub advisor: String,
    pub date: String,
}

impl Default for ThesisInfo {
    fn default() -> Self {
        ThesisInfo {
            title: "基于深度学习的图像识别研究".into(),
            major: "计算机科学与技术".into(),
            class: "计科1901".into(),
            student_id: "20190001".into(),
            name: "张三".into(),
            advisor: "李教授".into(),
            date: current_month(),
        }
    }
}

pub fn current_month() -> String {
    chrono::Local::now().format("%Y年%m月").to_string()
}

impl ThesisInfo {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Problems with the record; empty when it is complete.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let required = [
            ("title", &self.title),
            ("major", &self.major),
            ("class", &self.class),
            ("student_id", &self.student_id),
            ("name", &self.name),
            ("advisor", &self.advisor),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            problems.push(format!("缺少必需字段：{}", missing.join(", ")));
        }
        if self.title.chars().count() > 40 {
            problems.push("论文标题不能超过40个字符".to_string());
        }
        problems
    }
}
