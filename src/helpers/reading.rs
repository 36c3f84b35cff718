//! Word counting and reading time

use crate::content::richtext::as_text;
use crate::content::ContentBlock;

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in a post: every heading plus the plain text of every body
pub fn post_words(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| count_words(&block.heading) + count_words(&as_text(&block.body)))
        .sum()
}

/// Minutes needed to read `blocks`, rounded up
///
/// An empty post takes zero minutes.
pub fn reading_time(blocks: &[ContentBlock], words_per_minute: u32) -> u32 {
    let words = post_words(blocks) as u64;
    let per_minute = u64::from(words_per_minute.max(1));
    words.div_ceil(per_minute) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextNode;

    fn block(heading: &str, body: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.to_string(),
            body: body.iter().map(|text| RichTextNode::paragraph(text)).collect(),
        }
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Writing our first test"), 4);
        assert_eq!(count_words("  spaced   out\nwords "), 3);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let body = vec!["word"; 40].join(" ");
        let blocks = vec![block("Writing our first test", &[&body])];
        assert_eq!(post_words(&blocks), 44);
        assert_eq!(reading_time(&blocks, 200), 1);
    }

    #[test]
    fn test_reading_time_multiple_blocks() {
        let long = vec!["word"; 199].join(" ");
        let blocks = vec![
            block("One", &[&long]),
            block("Two words", &["three more words", "and four more here"]),
        ];
        // 200 + 2 + 3 + 4
        assert_eq!(post_words(&blocks), 209);
        assert_eq!(reading_time(&blocks, 200), 2);
        assert_eq!(reading_time(&blocks, 209), 1);
    }

    #[test]
    fn test_reading_time_empty() {
        assert_eq!(reading_time(&[], 200), 0);
        assert_eq!(reading_time(&[block("", &[])], 200), 0);
    }
}
