//! 支付交易号
//!
//! 格式: `TX` + 10 个字符，字符集去掉了易混淆的 `I`, `O`, `0`, `1`。
//! 顾客转账时把交易号写进转账备注，银行 webhook 再从备注里提取。

use rand::Rng;

pub const PREFIX: &str = "TX";
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const BODY_LEN: usize = 10;
pub const TOTAL_LEN: usize = PREFIX.len() + BODY_LEN;

/// Generate a fresh transaction id
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(TOTAL_LEN);
    id.push_str(PREFIX);
    for _ in 0..BODY_LEN {
        let idx = rng.gen_range(0..ALPHABET.len());
        id.push(ALPHABET[idx] as char);
    }
    id
}

fn is_symbol(b: u8) -> bool {
    ALPHABET.contains(&b)
}

/// Exact format check: length 12, `TX` prefix, alphabet only
pub fn is_valid(candidate: &str) -> bool {
    candidate.len() == TOTAL_LEN
        && candidate.starts_with(PREFIX)
        && candidate.bytes().skip(PREFIX.len()).all(is_symbol)
}

/// Scan a transfer memo for well-formed transaction ids
///
/// Matching is case-sensitive: ids are generated upper-case and only an
/// exact substring counts. The memo is split on anything that is not ASCII
/// alphanumeric; longer tokens are also scanned for an embedded `TX` run.
pub fn extract(content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for token in content.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token.len() < TOTAL_LEN {
            continue;
        }
        let bytes = token.as_bytes();
        for start in 0..=(bytes.len() - TOTAL_LEN) {
            if &bytes[start..start + PREFIX.len()] != PREFIX.as_bytes() {
                continue;
            }
            let window = &token[start..start + TOTAL_LEN];
            if is_valid(window) && !found.iter().any(|f| f == window) {
                found.push(window.to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_valid() {
        for _ in 0..200 {
            let id = generate();
            assert_eq!(id.len(), 12);
            assert!(is_valid(&id), "{id}");
        }
    }

    #[test]
    fn test_is_valid_exact_format() {
        assert!(is_valid("TXABCDEFGH23"));
        assert!(is_valid("TX2345678923"));
        // wrong length
        assert!(!is_valid("TXABCDEFGH2"));
        assert!(!is_valid("TXABCDEFGH234"));
        // wrong prefix
        assert!(!is_valid("TYABCDEFGH23"));
        assert!(!is_valid("txabcdefgh23"));
        // excluded symbols
        assert!(!is_valid("TXABCDEFGHI2"));
        assert!(!is_valid("TXABCDEFGHO2"));
        assert!(!is_valid("TXABCDEFGH01"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_extract_from_memo() {
        assert_eq!(extract("thanh toan TXABCDEFGH23 ban 5"), vec!["TXABCDEFGH23"]);
        assert_eq!(
            extract("MBVCB.123.TXABCDEFGH23.CT tu 0123"),
            vec!["TXABCDEFGH23"]
        );
    }

    #[test]
    fn test_extract_embedded_and_dedup() {
        assert_eq!(extract("PAYTXABCDEFGH23X"), vec!["TXABCDEFGH23"]);
        assert_eq!(
            extract("TXABCDEFGH23 TXABCDEFGH23 TXZZZZZZZZ22"),
            vec!["TXABCDEFGH23", "TXZZZZZZZZ22"]
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract("no reference here").is_empty());
        assert!(extract("TX123").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        assert!(extract("txabcdefgh23").is_empty());
        assert!(extract("thanh toan TxABCDEFGH23").is_empty());
        assert!(extract("TXabcdefgh23").is_empty());
    }
}
