//! Output grammars of `pacman -Ss`, `<helper> -Ss`, `expac` and `pacman -Qi`.

use super::{InstalledInfo, Namespace, SearchHit};
use regex::Regex;
use std::sync::LazyLock;

/// `core/linux 6.9.1.arch1-1 [installed]` -> `linux`
static REPO_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+/(\S+)(?:\s|$)").expect("Invalid regex pattern"));

/// `aur/yay-bin 12.3.5-1 (+1200 9.87)` -> `yay-bin`. Repo lines printed by
/// the helper (`extra/...`) do not match.
static AUR_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:aur/)?([a-zA-Z0-9@._+-]+)(?:\s|$)").expect("Invalid regex pattern")
});

/// Results are pairs of a flush-left header line and an indented
/// description line. A header without a description keeps an empty one.
pub(super) fn parse_search_output(ns: Namespace, output: &str) -> Vec<SearchHit> {
    let head = match ns {
        Namespace::Repo => &*REPO_HEAD,
        Namespace::Aur => &*AUR_HEAD,
    };

    let mut hits = Vec::new();
    let mut lines = output.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() || line.starts_with(char::is_whitespace) {
            continue;
        }
        let Some(caps) = head.captures(line.trim_end()) else {
            continue;
        };
        let desc = match lines.peek() {
            Some(next) if next.starts_with(char::is_whitespace) => {
                let desc = next.trim().to_string();
                lines.next();
                desc
            }
            _ => String::new(),
        };
        hits.push(SearchHit {
            name: caps[1].to_string(),
            desc,
        });
    }

    hits
}

/// Fill from one `%n\t%v\t%r\t%d` line. Missing columns stay empty.
pub(super) fn apply_expac_line(info: &mut InstalledInfo, output: &str) {
    let line = output.trim();
    if line.is_empty() {
        return;
    }
    let mut parts = line.splitn(4, '\t');
    let _name = parts.next();
    if let Some(ver) = parts.next() {
        info.version = ver.trim().to_string();
    }
    if let Some(repo) = parts.next() {
        info.repo = repo.trim().to_string();
    }
    if let Some(desc) = parts.next() {
        info.description = desc.trim().to_string();
    }
}

/// Fill from `pacman -Qi` by line prefix.
pub(super) fn apply_pacman_qi(info: &mut InstalledInfo, output: &str) {
    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        let key = key.trim_end();
        if key.starts_with("Version") {
            info.version = value;
        } else if key.starts_with("Repository") {
            info.repo = value;
        } else if key.starts_with("Description") {
            info.description = value;
        }
    }
}
