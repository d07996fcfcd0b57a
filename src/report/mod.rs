pub mod beeswarm;
pub mod data_file;
pub mod general_stats;
pub mod html;
pub mod latex;
pub mod zip;

use crate::core::engine::DataSources;
use crate::core::model::ReportTable;

pub const DATA_FILE: &str = "multiqc_mirtop.txt";
pub const SOURCES_FILE: &str = "multiqc_sources.txt";
pub const GENERAL_STATS_FILE: &str = "mirtop_general_stats.txt";
pub const HTML_FILE: &str = "mirtop_report.html";
pub const REPORT_DIR: &str = "mirtop_report";

pub struct ModuleInfo {
    pub name: &'static str,
    pub anchor: &'static str,
    pub href: &'static str,
    pub info: &'static str,
}

pub const MODULE: ModuleInfo = ModuleInfo {
    name: "miRTop",
    anchor: "mirtop",
    href: "https://github.com/miRTop",
    info: "is a Command line tool to annotate miRNAs and isomiRs using a standard naming.",
};

pub struct SectionInfo {
    pub name: &'static str,
    pub anchor: &'static str,
    pub description: &'static str,
}

pub const STATS_SECTION: SectionInfo = SectionInfo {
    name: "IsomiR Summary Statistics",
    anchor: "mirtop-stats",
    description: "This module parses the summary data generated by <code>mirtop</code>. ",
};

/// Everything the writers need about one finished run.
pub struct ReportContext<'a> {
    pub table: &'a ReportTable,
    pub sources: &'a DataSources,
    pub files_scanned: usize,
    pub files_skipped: usize,
}
