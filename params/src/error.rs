use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("invalid {param}: {reason}")]
    InvalidParameter {
        param: &'static str,
        reason: &'static str,
    },
}
