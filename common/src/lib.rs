pub mod error;

pub use error::{ProposalError, Result};
