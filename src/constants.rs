use std::sync::OnceLock;

pub const DEFAULT_MAXMANAGER_URL: &str =
    "https://sw-ulm-spl51.maxmanager.xyz/inc/ajax-php_konnektor.inc.php";
pub static MAXMANAGER_URL: OnceLock<String> = OnceLock::new();

/// Minimum amount of characters a weekday column needs to count as open.
pub const CLOSED_COLUMN_THRESHOLD: usize = 100;

pub const PRICE_NOT_AVAILABLE: &str = "n/a";

pub fn maxmanager_url() -> &'static str {
    MAXMANAGER_URL
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_MAXMANAGER_URL)
}
