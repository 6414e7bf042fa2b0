/// Command-line byte strings.
///
/// Arguments are split on whitespace. Double quotes group bytes that contain
/// whitespace (`""` is the zero-length string) and a backslash introduces an
/// escape, so any byte sequence, NUL included, can be typed:
///
/// ```text
/// \xNN  \0  \n  \t  \r  \\  \"  \<space>
/// ```
///
/// Output uses the same escapes inside double quotes, so what the shell
/// prints can be pasted back in.
use crate::error::ShellError;

pub fn tokenize(line: &str) -> Result<Vec<Vec<u8>>, ShellError> {
    let mut tokens = Vec::new();
    let mut bytes = line.bytes().peekable();

    loop {
        while bytes.peek().is_some_and(u8::is_ascii_whitespace) {
            bytes.next();
        }
        if bytes.peek().is_none() {
            return Ok(tokens);
        }

        let mut token = Vec::new();
        let mut quoted = false;
        while let Some(b) = bytes.next() {
            match b {
                b'"' => quoted = !quoted,
                b'\\' => token.push(unescape(&mut bytes)?),
                b if b.is_ascii_whitespace() && !quoted => break,
                b => token.push(b),
            }
        }
        if quoted {
            return Err(ShellError::Type("unterminated string".into()));
        }
        tokens.push(token);
    }
}

fn unescape<I: Iterator<Item = u8>>(bytes: &mut I) -> Result<u8, ShellError> {
    let b = bytes
        .next()
        .ok_or_else(|| ShellError::Type("dangling escape at end of line".into()))?;
    Ok(match b {
        b'0' => 0,
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'\\' | b'"' | b' ' => b,
        b'x' => {
            let hi = bytes.next().and_then(hex_digit);
            let lo = bytes.next().and_then(hex_digit);
            match (hi, lo) {
                (Some(hi), Some(lo)) => hi << 4 | lo,
                _ => return Err(ShellError::Type("\\x needs two hex digits".into())),
            }
        }
        other => {
            return Err(ShellError::Type(format!(
                "unknown escape \\{}",
                other.escape_ascii()
            )))
        }
    })
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Renders bytes as a double-quoted string using the input escapes.
pub fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            0 => out.push_str("\\0"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<Vec<u8>> {
        tokenize(line).unwrap()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            toks("  PUT db1\tkey   value "),
            vec![b"PUT".to_vec(), b"db1".to_vec(), b"key".to_vec(), b"value".to_vec()]
        );
    }

    #[test]
    fn blank_line_has_no_tokens() {
        assert!(toks("   ").is_empty());
    }

    #[test]
    fn quotes_group_and_allow_empty() {
        assert_eq!(
            toks(r#"PUT db1 "two words" """#),
            vec![
                b"PUT".to_vec(),
                b"db1".to_vec(),
                b"two words".to_vec(),
                Vec::new()
            ]
        );
    }

    #[test]
    fn escapes_produce_raw_bytes() {
        assert_eq!(toks(r"a\0b"), vec![b"a\0b".to_vec()]);
        assert_eq!(toks(r"\xff\x00"), vec![vec![0xff, 0x00]]);
        assert_eq!(toks(r#"\"q\" a\ b"#), vec![b"\"q\"".to_vec(), b"a b".to_vec()]);
    }

    #[test]
    fn malformed_input_is_a_type_error() {
        assert!(matches!(tokenize("\"open"), Err(ShellError::Type(_))));
        assert!(matches!(tokenize(r"\x4"), Err(ShellError::Type(_))));
        assert!(matches!(tokenize(r"\q"), Err(ShellError::Type(_))));
        assert!(matches!(tokenize("trailing\\"), Err(ShellError::Type(_))));
    }

    #[test]
    fn quote_escapes_what_tokenize_reads() {
        let raw = b"a b\0\"\\\xfe".to_vec();
        let printed = quote(&raw);
        assert_eq!(printed, r#""a b\0\"\\\xfe""#);
        assert_eq!(toks(&printed), vec![raw]);
    }
}
