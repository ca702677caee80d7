/// Quotes `word` for a POSIX shell, leaving it bare when nothing needs escaping.
pub fn quote(word: &str) -> String {
    let is_safe = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | ',' | '+' | '%')
        });

    if is_safe {
        return word.to_string();
    }

    let mut out = String::from("'");
    out.push_str(&word.replace('\'', r"'\''"));
    out.push('\'');
    out
}

pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| quote(w.as_ref()))
        .collect::<Vec<String>>()
        .join(" ")
}
