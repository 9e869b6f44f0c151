//! Validation of raw model output into a single well-formed payload

use warden_domain::{PayloadKind, SourceError};

const FENCE: &str = "```";

/// Validate raw model output
///
/// Accepts either exactly one fenced code block (with nothing but
/// whitespace around it) or plain text with no fence at all. Everything
/// else is malformed: empty output, several blocks, an unterminated fence,
/// or explanatory prose mixed with code.
///
/// # Examples
///
/// ```
/// use warden_llm::payload::validate_payload;
/// use warden_domain::PayloadKind;
///
/// let (body, kind) = validate_payload("```sh\nls -la /tmp\n```").unwrap();
/// assert_eq!(body, "ls -la /tmp");
/// assert_eq!(kind, PayloadKind::Code { language: Some("sh".into()) });
///
/// assert!(validate_payload("   ").is_err());
/// assert!(validate_payload("Run this:\n```sh\nls\n```").is_err());
/// ```
pub fn validate_payload(raw: &str) -> Result<(String, PayloadKind), SourceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SourceError::Malformed("empty response".to_string()));
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let fences: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with(FENCE))
        .map(|(idx, _)| idx)
        .collect();

    match fences.len() {
        0 => {
            if trimmed.contains(FENCE) {
                return Err(SourceError::Malformed(
                    "inline code fence mixed with text".to_string(),
                ));
            }
            Ok((trimmed.to_string(), PayloadKind::Advice))
        }
        1 => Err(SourceError::Malformed("unterminated code fence".to_string())),
        2 => extract_block(&lines, fences[0], fences[1]),
        n => Err(SourceError::Malformed(format!(
            "expected exactly one fenced code block, found {} fence lines",
            n
        ))),
    }
}

fn extract_block(
    lines: &[&str],
    open: usize,
    close: usize,
) -> Result<(String, PayloadKind), SourceError> {
    // The response is trimmed, so anything before the opening or after the
    // closing fence is non-blank text.
    if open != 0 || close != lines.len() - 1 {
        return Err(SourceError::Malformed(
            "explanatory prose outside the code block".to_string(),
        ));
    }

    if lines[close].trim() != FENCE {
        return Err(SourceError::Malformed(
            "closing fence carries trailing text".to_string(),
        ));
    }

    let info = lines[open].trim_start().trim_start_matches('`').trim();
    let language = info
        .split_whitespace()
        .next()
        .map(|lang| lang.to_lowercase());

    let body = lines[open + 1..close].join("\n");
    if body.trim().is_empty() {
        return Err(SourceError::Malformed("empty code block".to_string()));
    }

    Ok((body.trim_end().to_string(), PayloadKind::Code { language }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(raw: &str) -> String {
        match validate_payload(raw) {
            Err(SourceError::Malformed(reason)) => reason,
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_advice() {
        let (body, kind) =
            validate_payload("  Isolate the host and delete the dropper.  \n").unwrap();
        assert_eq!(body, "Isolate the host and delete the dropper.");
        assert_eq!(kind, PayloadKind::Advice);
    }

    #[test]
    fn test_single_block_without_language() {
        let (body, kind) = validate_payload("```\necho ok\n```").unwrap();
        assert_eq!(body, "echo ok");
        assert_eq!(kind, PayloadKind::Code { language: None });
    }

    #[test]
    fn test_language_is_lowercased() {
        let (_, kind) = validate_payload("```Python\nprint('x')\n```").unwrap();
        assert_eq!(
            kind,
            PayloadKind::Code {
                language: Some("python".into())
            }
        );
    }

    #[test]
    fn test_multiline_body_preserved() {
        let raw = "```bash\nset -e\n\nls /tmp\n```\n";
        let (body, _) = validate_payload(raw).unwrap();
        assert_eq!(body, "set -e\n\nls /tmp");
    }

    #[test]
    fn test_empty_is_malformed() {
        assert_eq!(malformed(""), "empty response");
        assert_eq!(malformed(" \n\t "), "empty response");
    }

    #[test]
    fn test_prose_before_block_is_malformed() {
        assert!(malformed("Here is the fix:\n```sh\nls\n```").contains("prose"));
    }

    #[test]
    fn test_prose_after_block_is_malformed() {
        assert!(malformed("```sh\nls\n```\nThis lists files.").contains("prose"));
    }

    #[test]
    fn test_two_blocks_are_malformed() {
        let raw = "```sh\nls\n```\n```sh\npwd\n```";
        assert!(malformed(raw).contains("exactly one"));
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(malformed("```sh\nls"), "unterminated code fence");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(malformed("```sh\n\n```"), "empty code block");
    }

    #[test]
    fn test_inline_fence() {
        assert!(malformed("Run ```rm -rf /tmp/x``` now").contains("inline"));
    }
}
