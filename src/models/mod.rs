pub mod fragment;
pub mod prompt;
pub mod section;

pub use fragment::{Fragment, FragmentName};
pub use prompt::Prompt;
pub use section::CanonicalSection;
