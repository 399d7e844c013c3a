use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// 振込名義・会社名に現れる法人格の表記（前株・後株・略号）
const COMPANY_AFFIXES: &[&str] = &[
    "カ）",
    "カ)",
    "(株)",
    "（株）",
    "㈱",
    "株式会社",
    "(有)",
    "（有）",
    "ユ）",
    "ユ)",
    "㈲",
    "有限会社",
    "(合)",
    "（合）",
    "合同会社",
];

// 入力と同じ正規化をかけた表記。半角の ｶ) も カ) として一致させる
static NORMALIZED_AFFIXES: Lazy<Vec<String>> = Lazy::new(|| {
    let mut affixes: Vec<String> = Vec::new();
    for affix in COMPANY_AFFIXES {
        let normalized = nfkc(affix);
        if !affixes.contains(&normalized) {
            affixes.push(normalized);
        }
    }
    affixes
});

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn nfkc(input: &str) -> String {
    input.nfkc().collect()
}

fn strip_affixes(input: &str) -> String {
    NORMALIZED_AFFIXES
        .iter()
        .fold(input.to_string(), |acc, affix| acc.replace(affix.as_str(), ""))
}

/// 会社名を比較用に正規化する（表示・保存には使わない）
///
/// 1. NFKC で全角英数・半角カナを寄せる
/// 2. 法人格表記を位置を問わず除去する
/// 3. 空白（全角含む）を除去する
/// 4. ラテン文字を大文字化する
///
/// 除去で新たな法人格表記が現れる場合（「株式 会社」など）は消えるまで繰り返すため、
/// `normalize_company_name(normalize_company_name(x)) == normalize_company_name(x)`。
pub fn normalize_company_name(name: &str) -> String {
    let mut current = nfkc(name.trim());

    loop {
        let stripped = strip_affixes(&current);
        let compact = RE_WHITESPACE.replace_all(&stripped, "").into_owned();
        if compact == current {
            break;
        }
        current = compact;
    }

    // 大文字化で分解形が出ることがあるので再度 NFKC
    nfkc(&current.to_uppercase())
}
