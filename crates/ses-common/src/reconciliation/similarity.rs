use strsim::{levenshtein, normalized_levenshtein};

/// 1 文字単位（char）の挿入・削除・置換の最小回数
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// `1 - distance / max(len)`。両方空なら 1.0
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    normalized_levenshtein(a, b).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", "abcd"), 1);
        assert_eq!(levenshtein_distance("abcd", "abc"), 1);
        assert_eq!(levenshtein_distance("abc", "axc"), 1);
        assert_eq!(levenshtein_distance("abc", "xyz"), 3);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(levenshtein_distance("テスト", "テキスト"), 1);
        assert_eq!(levenshtein_distance("テスト商事", ""), 5);
    }

    #[test]
    fn distance_is_symmetric_and_obeys_triangle_inequality() {
        let words = ["テスト商事", "テスト商会", "テクノ商事", "ABC", "", "ＡＢＣ"];

        for a in words {
            assert_eq!(levenshtein_distance(a, a), 0);
            for b in words {
                assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a));
                for c in words {
                    assert!(
                        levenshtein_distance(a, c)
                            <= levenshtein_distance(a, b) + levenshtein_distance(b, c)
                    );
                }
            }
        }
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("テスト", "テスト"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);

        let ratio = similarity_ratio("テスト商事", "テスト商会");
        assert!((ratio - 0.8).abs() < 1e-9);

        for (a, b) in [("a", "abcdef"), ("カ)テスト", "テスト"), ("x", "y")] {
            let ratio = similarity_ratio(a, b);
            assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
