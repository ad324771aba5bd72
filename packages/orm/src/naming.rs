use std::fmt;

/// Maps model type names and field names to database identifiers.
pub trait NamingStrategy: fmt::Debug + Send + Sync {
    fn table_name(&self, type_name: &str) -> String;
    fn column_name(&self, table: &str, field_name: &str) -> String;
}

/// snake_case identifiers with pluralized table names, optionally prefixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultNamingStrategy {
    pub table_prefix: String,
    pub singular_table: bool,
}

impl NamingStrategy for DefaultNamingStrategy {
    fn table_name(&self, type_name: &str) -> String {
        let name = to_db_name(type_name);
        if self.singular_table {
            format!("{}{}", self.table_prefix, name)
        } else {
            format!("{}{}", self.table_prefix, pluralize(&name))
        }
    }

    fn column_name(&self, _table: &str, field_name: &str) -> String {
        to_db_name(field_name)
    }
}

/// CamelCase to snake_case, keeping acronyms together:
/// `UserID` → `user_id`, `HTTPServer` → `http_server`.
pub fn to_db_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "data",
    "metadata",
    "media",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("ox", "oxen"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
];

/// Pluralize the last `_`-separated word of a snake_case name.
pub fn pluralize(name: &str) -> String {
    let (head, word) = match name.rfind('_') {
        Some(i) => name.split_at(i + 1),
        None => ("", name),
    };
    format!("{head}{}", pluralize_word(word))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if word == *singular || word == *plural {
            return plural.to_string();
        }
    }

    let w = word;
    let stem = |suffix: &str| &w[..w.len() - suffix.len()];

    if w.ends_with("quiz") {
        return format!("{w}zes");
    }
    if w.ends_with("mouse") || w.ends_with("louse") {
        return format!("{}ice", stem("ouse"));
    }
    if w.ends_with("mice") || w.ends_with("lice") {
        return w.to_string();
    }
    for root in ["matr", "vert", "ind"] {
        for tail in ["ix", "ex"] {
            if w.ends_with(&format!("{root}{tail}")) {
                return format!("{}ices", stem(tail));
            }
        }
    }
    if ["x", "ch", "ss", "sh"].iter().any(|s| w.ends_with(s)) {
        return format!("{w}es");
    }
    if let Some(rest) = w.strip_suffix('y') {
        let consonant = rest
            .chars()
            .last()
            .is_some_and(|c| !"aeiouy".contains(c));
        if consonant || rest.ends_with("qu") {
            return format!("{rest}ies");
        }
    }
    if let Some(rest) = w.strip_suffix("fe") {
        if !rest.ends_with('f') && !rest.is_empty() {
            return format!("{rest}ves");
        }
    }
    if w.ends_with("lf") || w.ends_with("rf") {
        return format!("{}ves", stem("f"));
    }
    if w.ends_with("sis") {
        return format!("{}ses", stem("sis"));
    }
    if w.ends_with("ta") || w.ends_with("ia") {
        return w.to_string();
    }
    if w.ends_with("buffalo") || w.ends_with("tomato") {
        return format!("{w}es");
    }
    if w.ends_with("bus") {
        return format!("{w}es");
    }
    if w.ends_with("alias") || w.ends_with("status") {
        return format!("{w}es");
    }
    if w.ends_with("octopus") || w.ends_with("virus") {
        return format!("{}i", stem("us"));
    }
    if w == "axis" || w == "testis" {
        return format!("{}es", stem("is"));
    }
    if w.ends_with('s') {
        return w.to_string();
    }
    format!("{w}s")
}
