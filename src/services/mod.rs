pub mod bib_writer;
pub mod compiler;
pub mod fragment_store;
pub mod master_sync;
pub mod prompts;

pub use bib_writer::BibWriter;
pub use compiler::{CompileReport, PdfCompiler};
pub use fragment_store::FragmentStore;
pub use master_sync::{MasterSync, SyncReport};
