/// Escape text so it renders literally inside HTML.
///
/// Character references that are already present (`&amp;`, `&#60;`,
/// `&#x3c;`) are kept as they are, which makes the transform idempotent:
/// escaping a body twice yields the same string as escaping it once.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.char_indices() {
        match c {
            '&' if starts_with_char_ref(&text[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }

    out
}

// Longest named reference in the HTML5 table is 33 bytes including & and ;
const MAX_REF_LEN: usize = 33;

fn starts_with_char_ref(s: &str) -> bool {
    let Some(end) = s.bytes().take(MAX_REF_LEN).position(|b| b == b';') else {
        return false;
    };
    let inner = &s[1..end];

    if let Some(num) = inner.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit())
        } else {
            !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit())
        }
    } else {
        inner.bytes().next().is_some_and(|b| b.is_ascii_alphabetic())
            && inner.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
        assert_eq!(
            escape_html(r#"<a href="x" title='y'>"#),
            "&lt;a href=&quot;x&quot; title=&#x27;y&#x27;&gt;"
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(escape_html("Hello World!"), "Hello World!");
        assert_eq!(escape_html("naïve café ☕"), "naïve café ☕");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn bare_ampersands_escaped() {
        assert_eq!(escape_html("tom & jerry"), "tom &amp; jerry");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("&;"), "&amp;;");
        assert_eq!(escape_html("&#;"), "&amp;#;");
        assert_eq!(escape_html("&#xZZ;"), "&amp;#xZZ;");
        assert_eq!(escape_html("trailing &"), "trailing &amp;");
    }

    #[test]
    fn existing_references_kept() {
        assert_eq!(escape_html("&amp; &#60; &#x3C;"), "&amp; &#60; &#x3C;");
    }

    #[test]
    fn idempotent() {
        for input in [
            "<b>hi</b>",
            "tom & jerry",
            "\"quoted\" and 'single'",
            "<script>alert('x')</script>",
            "already &lt;escaped&gt;",
            "ü < ß & ø",
        ] {
            let once = escape_html(input);
            assert_eq!(escape_html(&once), once, "input: {input}");
        }
    }
}
