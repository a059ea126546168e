//! 10進テキスト形式
//!
//! 学習側が出力する実数テキスト（`Wg2.txt` など、空白・改行区切り）。
//! 実数として解釈できないトークンだけ警告を出して読み飛ばす。
//! `inf` や `1e400` などの非有限値は残し、量子化でクランプする。

use crate::fixed::Q15;
use log::warn;
use std::io::{self, BufRead};

/// 実数値を読み込む
///
/// `source` は警告メッセージ用の名前。
pub fn parse_decimal_values<R: BufRead>(reader: R, source: &str) -> io::Result<Vec<f64>> {
    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            match token.parse::<f64>() {
                Ok(v) => values.push(v),
                Err(_) => warn!("{source}:{}: could not parse {token:?}, skipped", idx + 1),
            }
        }
    }
    Ok(values)
}

/// 実数値を Q1.15 に変換（クランプ + 偶数丸め）
pub fn quantize(values: &[f64]) -> Vec<Q15> {
    values.iter().copied().map(Q15::from_real).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_matrix_text() {
        let text = "0.62000000 -0.41000000\n-0.35000000 0.78000000\n\n0.27 0.55\n";
        let values = parse_decimal_values(Cursor::new(text), "Wg2.txt").unwrap();
        assert_eq!(values, vec![0.62, -0.41, -0.35, 0.78, 0.27, 0.55]);

        let q = quantize(&values);
        assert_eq!(q[0], Q15::from_bits(20316));
        assert_eq!(q[1], Q15::from_bits(-13435));
    }

    fn bits(values: &[f64]) -> Vec<i16> {
        quantize(values).iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn test_parse_skips_garbage() {
        let text = "0.5 abc 1e-3\n0x10 -2.0\n";
        let values = parse_decimal_values(Cursor::new(text), "x.txt").unwrap();
        assert_eq!(values, vec![0.5, 1e-3, -2.0]);
        // 範囲外はクランプ
        assert_eq!(quantize(&values)[2], Q15::MIN);
    }

    #[test]
    fn test_non_finite_values_keep_their_slot() {
        let values = parse_decimal_values(Cursor::new("0.5 1e400 -0.25\n"), "x.txt").unwrap();
        assert_eq!(bits(&values), vec![16384, 32767, -8192]);

        let values =
            parse_decimal_values(Cursor::new("inf -inf\nnan NaN -1e400 0.25\n"), "x.txt").unwrap();
        assert_eq!(values.len(), 6);
        assert_eq!(bits(&values), vec![32767, -32768, -32768, -32768, -32768, 8192]);
    }
}
