use thiserror::Error;

/// Errors raised while discovering or editing a cluster proposal
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("{node} is not an available node")]
    NotAvailable { node: String },

    #[error("{node} has not been assigned")]
    NotAssigned { node: String },

    #[error("role {token} is not supported; add it manually to policy.cfg to use it")]
    UnsupportedRole { token: String },

    #[error("role {role} is not part of this cluster")]
    RoleNotFound { role: String },

    #[error("invalid node id: {message}")]
    InvalidNodeId { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ProposalError {
    /// True for operator mistakes that leave state untouched and can simply be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProposalError::NotAvailable { .. }
                | ProposalError::NotAssigned { .. }
                | ProposalError::UnsupportedRole { .. }
                | ProposalError::RoleNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProposalError>;
