//! intentrank-text
//!
//! Text-level building blocks of the ranking engine: normalization, locator
//! hint tokenization and the word + character TF-IDF vectorizer.
pub mod normalize;
pub mod tokens;
pub mod vectorize;

pub use normalize::normalize;
pub use tokens::extract_tokens;
pub use vectorize::{LexicalVectorizer, NgramRange};
