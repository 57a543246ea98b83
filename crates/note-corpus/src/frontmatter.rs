//! Frontmatter handling.
//!
//! A frontmatter block is a `---` line at the very start of the note, YAML
//! content, and a closing `---` line. Anything else is body. Malformed YAML
//! degrades to empty metadata instead of failing the note.

use std::collections::HashMap;
use std::path::Path;

use gray_matter::engine::{Engine, YAML};
use gray_matter::Pod;

/// Split a raw note into its frontmatter map and body.
///
/// The body is returned unchanged when no frontmatter block is present.
pub fn split_frontmatter(raw: &str) -> (HashMap<String, Pod>, &str) {
    let Some((metadata_src, body)) = delimit_frontmatter(raw) else {
        return (HashMap::new(), raw);
    };

    let metadata = YAML::parse(metadata_src)
        .and_then(|pod| pod.as_hashmap())
        .unwrap_or_default();

    (metadata, body)
}

/// Locate the frontmatter block, returning `(yaml_source, body)`.
fn delimit_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---")?;
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        // Something other than whitespace after the opening dashes.
        return None;
    }
    let content = &rest[newline + 1..];

    let mut offset = 0;
    loop {
        let line_end = content[offset..].find('\n');
        let line = match line_end {
            Some(end) => &content[offset..offset + end],
            None => &content[offset..],
        };

        if line.trim_end() == "---" {
            let metadata_src = &content[..offset];
            let body = match line_end {
                Some(end) => &content[offset + end + 1..],
                None => "",
            };
            return Some((metadata_src, body));
        }

        match line_end {
            Some(end) => offset += end + 1,
            None => return None,
        }
    }
}

/// Resolve a note title: frontmatter `title` if present and non-empty, else
/// the file's base name without extension.
pub fn title_of(path: &Path, metadata: &HashMap<String, Pod>) -> String {
    if let Some(pod) = metadata.get("title") {
        let title = flatten_pod(pod);
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Flatten all frontmatter values into one searchable string.
///
/// Keys are sorted so the output is stable for a given note.
pub fn flatten_values(metadata: &HashMap<String, Pod>) -> String {
    let mut keys: Vec<&String> = metadata.keys().collect();
    keys.sort();

    let parts: Vec<String> = keys
        .into_iter()
        .map(|key| flatten_pod(&metadata[key]))
        .filter(|part| !part.is_empty())
        .collect();

    parts.join(" ")
}

fn flatten_pod(pod: &Pod) -> String {
    match pod {
        Pod::Null => String::new(),
        Pod::String(s) => s.clone(),
        Pod::Integer(i) => i.to_string(),
        Pod::Float(f) => f.to_string(),
        Pod::Boolean(b) => b.to_string(),
        Pod::Array(items) => items
            .iter()
            .map(flatten_pod)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Pod::Hash(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|key| flatten_pod(&map[key]))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_split_with_frontmatter() {
        let raw = "---\ntitle: Clipper\ntags:\n  - web\n---\nWeb clipper tool\n";
        let (metadata, body) = split_frontmatter(raw);

        let title = metadata.get("title").unwrap().as_string().unwrap();
        assert_eq!(title, "Clipper");
        assert_eq!(body, "Web clipper tool\n");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let raw = "Obsidian is great\n";
        let (metadata, body) = split_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_delimiter_must_start_the_note() {
        let raw = "intro\n---\ntitle: X\n---\nbody\n";
        let (metadata, body) = split_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_malformed_yaml_is_empty_metadata() {
        let raw = "---\n: [ not yaml\n---\nbody text\n";
        let (metadata, body) = split_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, "body text\n");
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let raw = "---\ntitle: X\nno closing line\n";
        let (metadata, body) = split_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_title_from_frontmatter() {
        let raw = "---\ntitle: Clipper\n---\nbody\n";
        let (metadata, _) = split_frontmatter(raw);
        let title = title_of(&PathBuf::from("B.md"), &metadata);
        assert_eq!(title, "Clipper");
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        let (metadata, _) = split_frontmatter("Obsidian is great");
        let title = title_of(&PathBuf::from("notes/A.md"), &metadata);
        assert_eq!(title, "A");
    }

    #[test]
    fn test_empty_title_falls_back_to_stem() {
        let raw = "---\ntitle: \"\"\n---\nbody\n";
        let (metadata, _) = split_frontmatter(raw);
        let title = title_of(&PathBuf::from("C.md"), &metadata);
        assert_eq!(title, "C");
    }

    #[test]
    fn test_flatten_values_sorted_and_joined() {
        let raw = "---\ntags:\n  - rust\n  - search\nauthor: sato\nyear: 2024\n---\nbody\n";
        let (metadata, _) = split_frontmatter(raw);
        let flat = flatten_values(&metadata);
        assert_eq!(flat, "sato rust search 2024");
    }

    #[test]
    fn test_flatten_values_empty() {
        let (metadata, _) = split_frontmatter("no frontmatter");
        assert_eq!(flatten_values(&metadata), "");
    }
}
