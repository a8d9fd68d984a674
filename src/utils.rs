//! Sequence, string and numeric helpers.

use crate::error::{RegionError, Result};

/// Reverse complement; unknown nucleotides become `X`.
pub fn rev_comp(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|nt| match nt {
            'A' | 'a' => 'T',
            'T' | 't' => 'A',
            'C' | 'c' => 'G',
            'G' | 'g' => 'C',
            'N' | 'n' => 'N',
            _ => 'X',
        })
        .collect()
}

/// Sequence as-is on the forward strand, reverse complement otherwise.
pub fn cond_rev_comp(seq: &str, strand: bool) -> String {
    if strand {
        seq.to_string()
    } else {
        rev_comp(seq)
    }
}

/// Qualities as-is on the forward strand, reversed otherwise.
pub fn cond_reverse<T: Clone>(qual: &[T], strand: bool) -> Vec<T> {
    if strand {
        qual.to_vec()
    } else {
        qual.iter().rev().cloned().collect()
    }
}

/// Number of upper-case `C` and `G`.
pub fn gc_count(seq: &str) -> usize {
    seq.bytes().filter(|&b| b == b'C' || b == b'G').count()
}

/// GC percentage (0-100). `None` for an empty sequence.
pub fn gc_content(seq: &str) -> Option<f64> {
    if seq.is_empty() {
        return None;
    }
    Some(100.0 * gc_count(seq) as f64 / seq.len() as f64)
}

/// Shrink `window` so that `length` splits into equally sized windows.
pub fn adjust_window_size(length: u64, window: u64) -> u64 {
    if length == 0 || window == 0 {
        return window;
    }
    let n_windows = length.div_ceil(window);
    length.div_ceil(n_windows)
}

/// Parse a distance like `1,500`, `2k` or `1.5m`.
pub fn parse_distance(value: &str) -> Result<u64> {
    let value = value.replace(',', "").to_lowercase();
    let invalid = || RegionError::Parse(format!("Invalid distance '{}'", value));

    let (number, scale) = if let Some(v) = value.strip_suffix('m') {
        (v, 1e6)
    } else if let Some(v) = value.strip_suffix('k') {
        (v, 1e3)
    } else {
        return value.trim().parse().map_err(|_| invalid());
    };

    let number: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !number.is_finite() || number < 0.0 {
        return Err(invalid());
    }
    Ok((number * scale) as u64)
}

/// Length of the prefix shared by all sequences.
pub fn common_prefix(first: &[u8], others: &[&[u8]]) -> usize {
    first
        .iter()
        .enumerate()
        .take_while(|&(i, nt)| others.iter().all(|seq| seq.get(i) == Some(nt)))
        .count()
}

/// Length of the suffix shared by all sequences.
pub fn common_suffix(first: &[u8], others: &[&[u8]]) -> usize {
    first
        .iter()
        .rev()
        .enumerate()
        .take_while(|&(i, nt)| {
            others
                .iter()
                .all(|seq| i < seq.len() && seq[seq.len() - 1 - i] == *nt)
        })
        .count()
}

/// `str_count(10, "word")` -> `"10 words"`, `str_count(1, "word")` -> `"1 word"`.
pub fn str_count(count: usize, word: &str) -> String {
    format!("{} {}{}", count, word, if count == 1 { "" } else { "s" })
}

/// Human-readable length: `950bp`, `12.3 Kb`, `4.5 Mb`.
pub fn fmt_len(length: u64) -> String {
    if length < 1000 {
        format!("{}bp", length)
    } else if length < 1_000_000 {
        format!("{:.1} Kb", length as f64 / 1000.0)
    } else {
        format!("{:.1} Mb", length as f64 / 1e6)
    }
}

/// One or two letter suffix: a, b, ..., z, aa, ab, ..., zz.
///
/// Returns `None` past `zz` (index 701).
pub fn letter_suffix(index: usize) -> Option<String> {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    let n = CHARS.len();
    if index < n {
        return Some((CHARS[index] as char).to_string());
    }
    if index >= n * (n + 1) {
        return None;
    }
    let first = CHARS[index / n - 1] as char;
    let second = CHARS[index % n] as char;
    Some(format!("{}{}", first, second))
}

/// Tricube kernel of `|value|`; values beyond 1 give 0.
pub fn tricube_kernel(value: f64) -> f64 {
    let x = value.abs().min(1.0);
    (1.0 - x.powi(3)).powi(3)
}

fn logsumexp(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Phred-scaled quality of choosing `best_ix` given natural-log probabilities.
pub fn phred_qual(log_probs: &[f64], best_ix: usize, max_value: f64) -> f64 {
    if log_probs.len() == 1 && best_ix == 0 {
        return max_value;
    }
    let others = logsumexp(
        log_probs
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != best_ix)
            .map(|(_, &p)| p),
    );
    if others.is_finite() {
        (-10.0 * others / std::f64::consts::LN_10).min(max_value)
    } else {
        max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rev_comp() {
        assert_eq!(rev_comp("ACGTn"), "NACGT");
        assert_eq!(rev_comp("AZ"), "XT");
        assert_eq!(cond_rev_comp("AAC", true), "AAC");
        assert_eq!(cond_rev_comp("AAC", false), "GTT");
        assert_eq!(cond_reverse(&[1, 2, 3], false), vec![3, 2, 1]);
    }

    #[test]
    fn test_gc() {
        assert_eq!(gc_count("ACGTGc"), 3);
        assert_eq!(gc_content("GGAA"), Some(50.0));
        assert_eq!(gc_content(""), None);
    }

    #[test]
    fn test_adjust_window_size() {
        assert_eq!(adjust_window_size(1000, 300), 250);
        assert_eq!(adjust_window_size(900, 300), 300);
        assert_eq!(adjust_window_size(0, 300), 300);
    }

    #[test]
    fn test_parse_distance() {
        assert_eq!(parse_distance("1,500").unwrap(), 1500);
        assert_eq!(parse_distance("2k").unwrap(), 2000);
        assert_eq!(parse_distance("1.5M").unwrap(), 1_500_000);
        assert!(parse_distance("abc").is_err());
        assert!(parse_distance("-2k").is_err());
    }

    #[test]
    fn test_common_prefix_suffix() {
        assert_eq!(common_prefix(b"ACGT", &[&b"ACGA"[..], &b"ACTT"[..]]), 2);
        assert_eq!(common_prefix(b"AC", &[&b"ACGT"[..]]), 2);
        assert_eq!(common_suffix(b"ACGT", &[&b"TCGT"[..], &b"CGT"[..]]), 3);
        assert_eq!(common_suffix(b"GT", &[&b"A"[..]]), 0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(str_count(1, "region"), "1 region");
        assert_eq!(str_count(3, "region"), "3 regions");
        assert_eq!(fmt_len(950), "950bp");
        assert_eq!(fmt_len(12_345), "12.3 Kb");
        assert_eq!(fmt_len(4_500_000), "4.5 Mb");
        assert_eq!(letter_suffix(0).as_deref(), Some("a"));
        assert_eq!(letter_suffix(25).as_deref(), Some("z"));
        assert_eq!(letter_suffix(26).as_deref(), Some("aa"));
        assert_eq!(letter_suffix(27).as_deref(), Some("ab"));
        assert_eq!(letter_suffix(52).as_deref(), Some("ba"));
        assert_eq!(letter_suffix(701).as_deref(), Some("zz"));
        assert_eq!(letter_suffix(702), None);
    }

    #[test]
    fn test_tricube_kernel() {
        assert_eq!(tricube_kernel(0.0), 1.0);
        assert_eq!(tricube_kernel(1.5), 0.0);
        assert_eq!(tricube_kernel(-1.0), 0.0);
        assert!((tricube_kernel(0.5) - 0.669921875).abs() < 1e-12);
    }

    #[test]
    fn test_phred_qual() {
        assert_eq!(phred_qual(&[0.0], 0, 10000.0), 10000.0);
        let probs = [0.99f64.ln(), 0.01f64.ln()];
        assert!((phred_qual(&probs, 0, 10000.0) - 20.0).abs() < 1e-9);
        assert_eq!(phred_qual(&[0.0, f64::NEG_INFINITY], 0, 100.0), 100.0);
    }
}
