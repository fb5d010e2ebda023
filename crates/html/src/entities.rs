/// Decode the handful of character references that show up in server-rendered fragments.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`. Numeric references must be
/// semicolon-terminated (`&#38;`, `&#x26;`) and name a Unicode scalar value. Anything else is
/// left untouched.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// Longest accepted reference is `&#x10FFFF;` (10 bytes).
const MAX_REFERENCE_LEN: usize = 10;

fn decode_one(tail: &str) -> Option<(char, usize)> {
    let bytes = tail.as_bytes();
    let window = &bytes[..bytes.len().min(MAX_REFERENCE_LEN)];
    let semi = window.iter().position(|&b| b == b';')?;
    let body = &tail[1..semi];

    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            Some(_) => return None,
            None if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) => {
                num.parse::<u32>().ok()?
            }
            None => return None,
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{00A0}',
            _ => return None,
        }
    };

    Some((ch, semi + 1))
}
