//! Path rewriting and URL construction.

use regex::Regex;

use crate::service::RewriteRule;

/// Apply every rule in order to the accumulating path.
///
/// There is no short-circuit: a rule sees the output of all rules before it.
/// Each rule replaces the first match of its pattern.
pub fn apply_rewrites(path: &str, rules: &[RewriteRule]) -> Result<String, regex::Error> {
    let mut current = path.to_string();
    for rule in rules {
        let re = Regex::new(&rule.pattern)?;
        current = re.replace(&current, rule.replacement.as_str()).into_owned();
    }
    Ok(current)
}

/// Join a base URL and a path with exactly one `/` between them.
///
/// One trailing slash is trimmed from the base; leading slashes on the
/// path collapse to one.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
