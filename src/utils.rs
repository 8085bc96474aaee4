/// Number of title characters kept in an export file name.
pub const FILE_STEM_CHARS: usize = 20;

const FALLBACK_STEM: &str = "summary";

/// File stem for an exported summary: the first [`FILE_STEM_CHARS`]
/// characters of the title with every whitespace run turned into `_`.
pub fn export_file_stem(title: &str) -> String {
    let prefix: String = title.chars().take(FILE_STEM_CHARS).collect();

    let mut stem = String::with_capacity(prefix.len());
    let mut in_space = false;
    for c in prefix.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => stem.push('_'),
            c if c.is_control() => stem.push('_'),
            c => stem.push(c),
        }
    }

    if stem.trim_matches('_').is_empty() {
        return FALLBACK_STEM.to_string();
    }
    stem
}

pub fn export_file_name(title: &str, extension: &str) -> String {
    format!("{}.{}", export_file_stem(title), extension)
}
