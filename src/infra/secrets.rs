use std::panic;

const REDACTED: &str = "[REDACTED]";

/// Keys whose values never reach logs: the API hash, the 2FA password and
/// the login or email codes.
const SECRET_KEYS: [&str; 6] = ["hash", "password", "passcode", "code", "token", "key"];

/// Scrubs credentials from free-form text before it is logged.
///
/// `key=value` and `key: value` pairs with a secret key keep the key and lose
/// the value. Bare digit runs long enough to be a login code are dropped, and
/// phone numbers keep only their country prefix.
pub fn redact_text(input: &str) -> String {
    let mut redact_next = false;

    input
        .split_whitespace()
        .map(|word| {
            if std::mem::take(&mut redact_next) {
                return REDACTED.to_owned();
            }
            if let Some(key) = word.strip_suffix(':') {
                redact_next = is_secret_key(key);
                return word.to_owned();
            }
            redact_word(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        match info.location() {
            Some(at) => eprintln!(
                "telertx panic: {} at {}:{}",
                redact_text(&payload),
                at.file(),
                at.line()
            ),
            None => eprintln!("telertx panic: {}", redact_text(&payload)),
        }
    }));
}

fn redact_word(word: &str) -> String {
    if let Some((key, value)) = word.split_once('=') {
        if is_secret_key(key) && !value.is_empty() {
            return format!("{key}={REDACTED}");
        }
    }

    let core = word.trim_matches(|ch: char| !ch.is_ascii_alphanumeric() && ch != '+');
    if let Some(digits) = core.strip_prefix('+') {
        if digits.len() > 4 && digits.chars().all(|ch| ch.is_ascii_digit()) {
            return word.replacen(core, &mask_phone(digits), 1);
        }
    }

    if core.len() >= 5 && core.chars().all(|ch| ch.is_ascii_digit()) {
        return REDACTED.to_owned();
    }

    word.to_owned()
}

fn is_secret_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SECRET_KEYS.iter().any(|secret| lowered.ends_with(secret))
}

fn mask_phone(digits: &str) -> String {
    let (prefix, rest) = digits.split_at(2.min(digits.len()));
    format!("+{prefix}{}", "*".repeat(rest.len()))
}
