//! Token counting for LLM context reporting

use anyhow::Result;
use tiktoken_rs::cl100k_base;

/// Count tokens in `text` under the cl100k_base encoding.
pub fn count_tokens(text: &str) -> Result<usize> {
    let bpe = cl100k_base()?;
    Ok(bpe.encode_with_special_tokens(text).len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens("").unwrap(), 0);

        let count = count_tokens("Hello, world! This is a token count test.").unwrap();
        assert!(count > 5);
        assert!(count < 20);
    }
}
