pub mod error;
pub mod openai;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use openai::OpenAi;
pub use traits::{Message, MessageRole, ResponseMode};
pub use util::{strip_code_blocks, truncate_chars};
