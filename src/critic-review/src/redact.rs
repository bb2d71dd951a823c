//! Masking of obvious credentials before code leaves the machine.

use std::sync::LazyLock;

use regex::Regex;

static API_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[A-Za-z0-9\-_]{16,}").expect("valid regex"));
static LONG_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Fa-f0-9]{40,}").expect("valid regex"));
static AWS_KEY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AKIA[0-9A-Z]{16}").expect("valid regex"));

/// Replace API keys, long hex secrets and AWS access key ids with
/// placeholders.
pub fn redact_secrets(text: &str) -> String {
    let text = API_KEY.replace_all(text, "[REDACTED_KEY]");
    let text = LONG_HEX.replace_all(&text, "[REDACTED_HEX]");
    AWS_KEY_ID
        .replace_all(&text, "[REDACTED_AWS_KEY]")
        .into_owned()
}
