//! Keyword triage over font family names (made by FontLab https://www.fontlab.com/)

use crate::store::Verdict;

/// Lower-case substrings that correlate with Japanese-capable families.
///
/// Deliberately leaves out short or ambiguous tokens ("jp", "cjk", "noto"):
/// a name without a hint goes to the renderer instead.
pub const JAPANESE_NAME_HINTS: &[&str] = &[
    // Family style fragments
    "gothic",
    "mincho",
    "kaku",
    "maru",
    "kyokasho",
    "kaisho",
    "gyosho",
    "ud shin",
    "ud digi",
    "biz ud",
    // Vendors and product lines
    "meiryo",
    "hiragino",
    "osaka",
    "kozuka",
    "morisawa",
    "ryumin",
    "toppan",
    "source han",
    "ipaex",
    "ipagothic",
    "ipamincho",
    "takao",
    "sawarabi",
    "kosugi",
    "m plus",
    "mplus",
    "genshin",
    "koruri",
    "yu mincho",
    "yu gothic",
    // Names written in Japanese
    "ゴシック",
    "明朝",
    "メイリオ",
    "游",
    "ヒラギノ",
    "教科書",
];

/// Resolve a candidate from its identity alone.
///
/// Returns [`Verdict::Supported`] on a naming hit and [`Verdict::Unknown`]
/// otherwise; a missing hint says nothing about the font, so this never
/// answers [`Verdict::Unsupported`].
pub fn classify(identity: &str) -> Verdict {
    let lowered = identity.to_lowercase();
    if JAPANESE_NAME_HINTS
        .iter()
        .any(|hint| lowered.contains(hint))
    {
        Verdict::Supported
    } else {
        Verdict::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_japanese_families() {
        for name in [
            "MS Gothic",
            "MS PMincho",
            "Meiryo UI",
            "Hiragino Sans",
            "Source Han Sans",
            "IPAexGothic",
            "Yu Gothic Medium",
            "ＭＳ ゴシック",
            "游明朝",
        ] {
            assert_eq!(classify(name), Verdict::Supported, "{name}");
        }
    }

    #[test]
    fn leaves_unhinted_names_unknown() {
        for name in ["Arial", "Noto Serif JP", "Helvetica Neue", "Noto Sans CJK SC", ""] {
            assert_eq!(classify(name), Verdict::Unknown, "{name}");
        }
    }

    #[test]
    fn never_answers_unsupported() {
        for name in ["Courier New", "Zapf Dingbats", "Wingdings", "Times"] {
            assert_ne!(classify(name), Verdict::Unsupported);
        }
    }

    #[test]
    fn latin_gothic_families_are_accepted_false_positives() {
        assert_eq!(classify("Century Gothic"), Verdict::Supported);
    }
}
