use thiserror::Error;

use crate::ids::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("loader error: {0}")]
    Loader(String),
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
    #[error("config error: {0}")]
    Config(String),
}
