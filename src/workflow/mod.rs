pub mod document_flow;
pub mod report;

pub use document_flow::DocumentFlow;
pub use report::{CitationReport, DeleteReport, FragmentList, FragmentReport, StatusReport};
