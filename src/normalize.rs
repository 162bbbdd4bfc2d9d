//! Free-text form input to structured lists.
//!
//! Form fields for prompts, negative prompts, and reference image URLs are
//! plain textareas. [`parse_list`] turns each one into an ordered list and
//! [`merge_frames`] zips prompts with negative prompts into [`Frame`]s.

use crate::storyboard::Frame;

/// Split free text on newlines or commas into trimmed, non-empty entries.
///
/// Order is preserved. Empty or whitespace-only input yields an empty list;
/// this function never fails.
///
/// # Example
///
/// ```
/// use growth_pipeline::normalize::parse_list;
///
/// let items = parse_list("a cat, b dog\n\n  c bird ");
/// assert_eq!(items, vec!["a cat", "b dog", "c bird"]);
/// ```
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`parse_list`], treating a missing field as empty.
pub fn parse_optional_list(raw: Option<&str>) -> Vec<String> {
    raw.map(parse_list).unwrap_or_default()
}

/// Zip prompts with negative prompts by position.
///
/// One frame is produced per prompt. `negatives[i]` applies to frame `i`
/// only; entries past the end of `prompts` are ignored.
pub fn merge_frames(prompts: Vec<String>, negatives: &[String]) -> Vec<Frame> {
    prompts
        .into_iter()
        .enumerate()
        .map(|(idx, prompt)| {
            let frame = Frame::new(prompt);
            match negatives.get(idx) {
                Some(negative) if !negative.is_empty() => frame.with_negative_prompt(negative),
                _ => frame,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_newlines_and_commas() {
        let items = parse_list("one\ntwo,three\r\nfour");
        assert_eq!(items, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_parse_list_drops_blank_entries() {
        let items = parse_list(" ,\n\n  ,a,, \n b ");
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_list_empty() {
        assert!(parse_list("").is_empty());
        assert!(parse_list("   \n  ").is_empty());
        assert!(parse_optional_list(None).is_empty());
    }

    #[test]
    fn test_parse_list_idempotent() {
        let inputs = [
            "a cat\nb dog",
            " x , y ,, z\n",
            "https://a.example/1.png, https://a.example/2.png",
            "",
            "single",
        ];
        for raw in inputs {
            let once = parse_list(raw);
            let twice = parse_list(&once.join("\n"));
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_merge_frames_positional() {
        let frames = merge_frames(parse_list("a cat\nb dog"), &parse_list("blurry"));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].prompt, "a cat");
        assert_eq!(frames[0].negative_prompt.as_deref(), Some("blurry"));
        assert_eq!(frames[1].prompt, "b dog");
        assert!(frames[1].negative_prompt.is_none());
    }

    #[test]
    fn test_merge_frames_ignores_surplus_negatives() {
        let frames = merge_frames(
            vec!["only".into()],
            &["n1".to_string(), "n2".to_string(), "n3".to_string()],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].negative_prompt.as_deref(), Some("n1"));
    }

    #[test]
    fn test_merge_frames_length_matches_prompts() {
        for n in 1..6 {
            let prompts: Vec<String> = (0..n).map(|i| format!("p{}", i)).collect();
            let frames = merge_frames(prompts, &[]);
            assert_eq!(frames.len(), n);
        }
    }
}
