//! Rule-based English noun lemmatizer

/// Irregular plurals that suffix rules get wrong
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("hypotheses", "hypothesis"),
    ("theses", "thesis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
];

/// Singular endings that look like plurals
const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is", "ics"];

/// Reduces a lowercase noun to its singular form
pub fn lemmatize_noun(word: &str) -> String {
    if let Some((_, lemma)) = IRREGULAR_NOUNS.iter().find(|(plural, _)| *plural == word) {
        return lemma.to_string();
    }

    if word.len() <= 3 || SINGULAR_ENDINGS.iter().any(|end| word.ends_with(end)) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }

    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("men") {
        return format!("{}man", stem);
    }

    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}
