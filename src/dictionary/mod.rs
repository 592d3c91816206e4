//! 查词：数据模型、提示词、LLM 网关、候选去重

pub mod gateway;
pub mod normalize;
pub mod prompt;
pub mod types;

pub use gateway::{parse_lookup_response, LlmLookupGateway, LookupGateway};
pub use normalize::normalize;
pub use types::{CandidateSense, Language, LookupResult, WordQuery};
