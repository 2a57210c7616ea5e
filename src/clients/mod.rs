pub mod citation_client;
pub mod llm_client;

pub use citation_client::{normalize_doi, CitationResolver, CrossrefClient};
pub use llm_client::{OpenAiClient, TextGenerator};
