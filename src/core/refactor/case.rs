//! Case-convention variants of a PascalCase component name.
//!
//! Every function here is pure: the same input always yields the same output,
//! and there are no error conditions (empty input yields empty output).

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// `KubernetesMicroservice` -> `Kubernetes_Microservice`: split before a capitalized word.
static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

// `Route53Zone` / `awsS3` -> split at a lowercase-or-digit to uppercase boundary.
static LOWER_UPPER_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Which naming convention a variant pair renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStyle {
    Pascal,
    Camel,
    UpperSnake,
    Snake,
    Kebab,
    QuotedSpace,
    Lower,
}

impl CaseStyle {
    /// Most-specific-first application order.
    pub const ORDERED: [CaseStyle; 7] = [
        CaseStyle::Pascal,
        CaseStyle::Camel,
        CaseStyle::UpperSnake,
        CaseStyle::Snake,
        CaseStyle::Kebab,
        CaseStyle::QuotedSpace,
        CaseStyle::Lower,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CaseStyle::Pascal => "PascalCase",
            CaseStyle::Camel => "camelCase",
            CaseStyle::UpperSnake => "UPPER_SNAKE_CASE",
            CaseStyle::Snake => "snake_case",
            CaseStyle::Kebab => "kebab-case",
            CaseStyle::QuotedSpace => "\"space separated\"",
            CaseStyle::Lower => "lowercase",
        }
    }

    /// Render `name` (PascalCase) in this style, as used for matching.
    pub fn render(&self, name: &str) -> String {
        match self {
            CaseStyle::Pascal => name.to_string(),
            CaseStyle::Camel => camel_case(name),
            CaseStyle::UpperSnake => upper_snake_case(name),
            CaseStyle::Snake => snake_case(name),
            CaseStyle::Kebab => kebab_case(name),
            CaseStyle::QuotedSpace => format!("\"{}\"", space_separated(name)),
            CaseStyle::Lower => lowercase(name),
        }
    }
}

/// One substitution rule: replace `from` with `to` everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseVariant {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl CaseVariant {
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

pub fn lowercase(name: &str) -> String {
    name.to_lowercase()
}

pub fn snake_case(name: &str) -> String {
    let split = CAPITALIZED_WORD.replace_all(name, "${1}_${2}");
    LOWER_UPPER_BOUNDARY
        .replace_all(&split, "${1}_${2}")
        .to_lowercase()
}

pub fn kebab_case(name: &str) -> String {
    snake_case(name).replace('_', "-")
}

pub fn space_separated(name: &str) -> String {
    snake_case(name).replace('_', " ")
}

pub fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

pub fn upper_snake_case(name: &str) -> String {
    snake_case(name).to_uppercase()
}

/// Build the ordered substitution rules for renaming `old` to `new`.
///
/// Ordered most specific first and deduplicated by `from`, keeping the first
/// occurrence. Applying them in this order keeps a less specific pattern
/// (lowercase) from matching text a more specific one (PascalCase) owns.
pub fn variant_pairs(old: &str, new: &str) -> Vec<CaseVariant> {
    let mut variants: Vec<CaseVariant> = Vec::with_capacity(CaseStyle::ORDERED.len());

    for style in CaseStyle::ORDERED {
        let from = style.render(old);
        if variants.iter().any(|v| v.from == from) {
            continue;
        }
        variants.push(CaseVariant {
            from,
            to: style.render(new),
            label: style.label().to_string(),
        });
    }

    variants
}
