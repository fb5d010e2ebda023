//! Forgiving HTML tokenizer for server-rendered pages and fragments.
//!
//! Tag and attribute names are ASCII `[A-Za-z0-9:_-]` and are lower-cased. Text and
//! attribute values are entity-decoded. `script`/`style` bodies are raw text, `textarea`/`title`
//! bodies are escapable raw text. Malformed markup never fails; it degrades to text.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

/// Find `</name` followed by optional whitespace and `>`; returns (start, end) byte offsets.
fn find_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let name = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        if bytes.get(i + 1) == Some(&b'/') && starts_with_ignore_ascii_case_at(bytes, i + 2, name) {
            let mut k = i + 2 + name.len();
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    // Slices are only cut at ASCII structural bytes, so every endpoint is a char boundary.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            push_text(&mut out, &input[start..i]);
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            continue;
        }

        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            match input[i..].find('>') {
                Some(end) => {
                    out.push(Token::Doctype(input[i + 2..i + end].trim().to_string()));
                    i += end + 1;
                }
                None => i = len,
            }
            continue;
        }

        if bytes.get(i + 1) == Some(&b'/') {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_byte(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < len && bytes[j] != b'>' {
                j += 1;
            }
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            i = (j + 1).min(len);
            continue;
        }

        let start = i + 1;
        let mut j = start;
        while j < len && is_name_byte(bytes[j]) {
            j += 1;
        }
        if j == start {
            // A lone `<` is text.
            push_text(&mut out, "<");
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let (attributes, explicit_self_closing, after) = read_attributes(input, j);
        let self_closing = explicit_self_closing || is_void_element(&name);
        i = after;

        let body_kind = match name.as_str() {
            "script" | "style" => Some(false),
            "textarea" | "title" => Some(true),
            _ => None,
        };

        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let (Some(decode), false) = (body_kind, self_closing) {
            let (body_end, resume) = match find_close_tag(&input[i..], &name) {
                Some((rel_start, rel_end)) => (i + rel_start, i + rel_end),
                None => (len, len),
            };
            let raw = &input[i..body_end];
            if !raw.is_empty() {
                let text = if decode {
                    decode_entities(raw)
                } else {
                    raw.to_string()
                };
                out.push(Token::Text(text));
            }
            out.push(Token::EndTag(name));
            i = resume;
        }
    }

    out
}

fn push_text(out: &mut Vec<Token>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let decoded = decode_entities(raw);
    if let Some(Token::Text(prev)) = out.last_mut() {
        prev.push_str(&decoded);
    } else {
        out.push(Token::Text(decoded));
    }
}

type Attributes = Vec<(String, Option<String>)>;

/// Reads attributes starting right after the tag name. Returns the attributes, whether the
/// tag was written `/>`, and the offset just past the closing `>`.
fn read_attributes(input: &str, mut k: usize) -> (Attributes, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes: Attributes = Vec::new();
    let mut self_closing = false;

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            break;
        }
        match bytes[k] {
            b'>' => {
                k += 1;
                break;
            }
            b'/' if bytes.get(k + 1) == Some(&b'>') => {
                self_closing = true;
                k += 2;
                break;
            }
            b'/' => {
                k += 1;
                continue;
            }
            _ => {}
        }

        let name_start = k;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            k += 1;
            continue;
        }
        let name = input[name_start..k].to_ascii_lowercase();

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                let raw = &input[vstart..k];
                k = (k + 1).min(len);
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                        break;
                    }
                    k += 1;
                }
                Some(decode_entities(&input[vstart..k]))
            }
        } else {
            None
        };

        // First occurrence wins, as in browsers.
        if !attributes.iter().any(|(existing, _)| *existing == name) {
            attributes.push((name, value));
        }
    }

    (attributes, self_closing, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, Option<&str>)]) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect(),
            self_closing: false,
        }
    }

    #[test]
    fn reads_quoted_unquoted_and_bare_attributes() {
        let tokens = tokenize(r#"<a HREF="/b" data-url='/a' data-ajax=true hidden>go</a>"#);
        assert_eq!(
            tokens,
            vec![
                start(
                    "a",
                    &[
                        ("href", Some("/b")),
                        ("data-url", Some("/a")),
                        ("data-ajax", Some("true")),
                        ("hidden", None),
                    ]
                ),
                Token::Text("go".to_string()),
                Token::EndTag("a".to_string()),
            ]
        );
    }

    #[test]
    fn void_elements_self_close() {
        let tokens = tokenize(r#"<input name="q" value="a&amp;b">"#);
        assert!(matches!(
            &tokens[..],
            [Token::StartTag { name, self_closing: true, attributes }]
                if name == "input" && attributes[1].1.as_deref() == Some("a&b")
        ));
    }

    #[test]
    fn textarea_body_is_text_even_with_markup() {
        let tokens = tokenize("<textarea name=t><b>hi</b> &amp;</TEXTAREA>after");
        assert_eq!(tokens[1], Token::Text("<b>hi</b> &".to_string()));
        assert_eq!(tokens[2], Token::EndTag("textarea".to_string()));
        assert_eq!(tokens[3], Token::Text("after".to_string()));
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let tokens = tokenize("1 < 2");
        assert_eq!(tokens, vec![Token::Text("1 < 2".to_string())]);
    }

    #[test]
    fn keeps_utf8_text() {
        let tokens = tokenize("<p>café ×</p><!-- note -->");
        assert_eq!(tokens[1], Token::Text("café ×".to_string()));
        assert_eq!(tokens[3], Token::Comment(" note ".to_string()));
    }
}
