//! Best-effort app names from process command lines.

use std::sync::OnceLock;

use regex::Regex;

#[expect(clippy::expect_used, reason = "Patterns are literals")]
fn app_name_patterns() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"--dart-entrypoint-args=(\S+)").expect("entrypoint pattern"),
            Regex::new(r"/([^/\s]+)\.dart").expect("script pattern"),
            Regex::new(r"package:([^/\s]+)").expect("package pattern"),
        ]
    })
}

/// First match of: entrypoint args, a `*.dart` script name, a `package:` uri.
pub fn extract_app_name(cmdline: &str) -> Option<String> {
    app_name_patterns()
        .iter()
        .find_map(|re| re.captures(cmdline))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `/proc/<pid>/cmdline` uses NUL separators.
pub fn cmdline_from_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .split('\0')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
