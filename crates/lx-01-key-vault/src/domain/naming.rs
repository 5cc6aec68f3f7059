//! # Key File Naming and Fingerprints
//!
//! Key files are named `<label>--<0xaddress>.json`. Only `*.json` files take
//! part in the directory fingerprint, so temporary files written during
//! wallet creation never trigger a re-scan.

use shared_types::Address;

/// Extension of key files.
pub const KEY_FILE_EXTENSION: &str = ".json";

/// Label used when the requested one sanitises to nothing.
pub const DEFAULT_LABEL: &str = "wallet";

/// Longest label kept in a file name.
pub const MAX_LABEL_LEN: usize = 64;

/// Keeps `[A-Za-z0-9_-]`, maps whitespace to `_`, drops everything else.
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .take(MAX_LABEL_LEN)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        cleaned
    }
}

/// Final file name for a wallet.
#[must_use]
pub fn key_file_name(label: &str, address: &Address) -> String {
    format!("{label}--{address}{KEY_FILE_EXTENSION}")
}

/// True if `name` is a key file (as opposed to a temporary or foreign file).
#[must_use]
pub fn is_key_file(name: &str) -> bool {
    name.ends_with(KEY_FILE_EXTENSION) && !name.starts_with('.')
}

/// Sorted concatenation of the key file names in `names`.
#[must_use]
pub fn fingerprint<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut keys: Vec<&str> = names.into_iter().filter(|n| is_key_file(n)).collect();
    keys.sort_unstable();
    keys.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("treasury"), "treasury");
        assert_eq!(sanitize_label("  my wallet "), "my_wallet");
        assert_eq!(sanitize_label("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_label("***"), DEFAULT_LABEL);
        assert_eq!(sanitize_label(&"x".repeat(200)).len(), MAX_LABEL_LEN);
    }

    #[test]
    fn test_file_name_embeds_label_and_address() {
        let addr = Address::new([0xab; 20]);
        let name = key_file_name("ops", &addr);
        assert_eq!(name, format!("ops--0x{}.json", "ab".repeat(20)));
        assert!(is_key_file(&name));
    }

    #[test]
    fn test_fingerprint_ignores_order_and_foreign_files() {
        let a = fingerprint(["b.json", "a.json", ".tmp-123", "notes.txt"]);
        let b = fingerprint(["a.json", "b.json"]);
        assert_eq!(a, b);
        assert_ne!(a, fingerprint(["a.json"]));
    }
}
