//! 核心：错误类型与 Ctrl-C 处理

pub mod error;
pub mod shutdown;

pub use error::{
    CardError, DecisionError, FailureReason, LlmError, LookupError, MediaError, QueryError,
    WorkListError,
};
pub use shutdown::{install_ctrl_c_handler, INTERRUPTED_EXIT_CODE};
