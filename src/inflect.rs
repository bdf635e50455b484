//! English pluralization for resource and type names.
//!
//! Irregular words are looked up first; everything else goes through a
//! short list of suffix rules. Rules are tried in order.

/// (singular, plural) pairs that don't follow the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("criterion", "criteria"),
    ("analysis", "analyses"),
    ("index", "indices"),
];

/// Words identical in both forms.
const UNCOUNTABLE: &[&str] = &[
    "sheep",
    "fish",
    "series",
    "species",
    "news",
    "equipment",
    "information",
    "data",
    "metadata",
    "media",
    "feedback",
    "staff",
];

/// Plural form of `word`. Case of the input is preserved for suffix rules.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, p)| *p == lower) {
        return word.to_string();
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{word}s")
}

/// Singular form of `word`, inverse of [`pluralize`].
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == lower) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(s, _)| *s == lower) {
        return word.to_string();
    }

    let cut = |n: usize| word[..word.len() - n].to_string();

    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", cut(3));
    }
    if lower.ends_with("ouses") {
        return cut(1);
    }
    if ["sses", "uses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        return cut(2);
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.ends_with('s') {
        return cut(1);
    }
    word.to_string()
}

/// Upper-case the first character (`owner` -> `Owner`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
