pub mod fluency_analyzer;
pub mod fluency_report;
