//! `$readmemh` 互換 hex ファイル
//!
//! 1行1ワード、4桁の大文字16進（2の補数）。読み込み時は以下も受け付ける:
//! - 空行、`//` 以降のコメント
//! - 1行に複数ワード（空白区切り）
//! - `_` 区切り（`7E_C8`）、小文字
//!
//! アドレス指定（`@10`）は位置がずれるため受け付けない。

use crate::constants::LATENT_DIM;
use crate::error::{to_array, GanError, GanResult};
use crate::fixed::Q15;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// ノイズサンプルファイルの接頭辞
pub const NOISE_SAMPLE_PREFIX: &str = "input_sample_";

/// hex ワード列を読み込む
///
/// `source` はエラーメッセージ用のパス。
pub fn parse_hex_words<R: BufRead>(reader: R, source: &Path) -> GanResult<Vec<Q15>> {
    let mut words = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split("//").next().unwrap_or_default();
        for token in content.split_whitespace() {
            let word = parse_word(token).ok_or_else(|| GanError::Parse {
                path: source.to_path_buf(),
                line: idx + 1,
                token: token.to_string(),
            })?;
            words.push(Q15::from_word(word));
        }
    }
    Ok(words)
}

fn parse_word(token: &str) -> Option<u16> {
    let digits: String = token.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    u16::from_str_radix(&digits, 16).ok()
}

/// hex ファイルを読み込む
pub fn read_hex_file<P: AsRef<Path>>(path: P) -> GanResult<Vec<Q15>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    parse_hex_words(reader, path)
}

/// hex ワード列を書き出す（1行1ワード）
pub fn write_hex_words<W: Write>(writer: &mut W, values: &[Q15]) -> GanResult<()> {
    for value in values {
        writeln!(writer, "{value:04X}")?;
    }
    Ok(())
}

/// hex ファイルへ書き出す
pub fn write_hex_file<P: AsRef<Path>>(path: P, values: &[Q15]) -> GanResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_hex_words(&mut writer, values)?;
    writer.flush()?;
    Ok(())
}

/// ノイズサンプル（2ワード）を読み込む
pub fn read_noise_file<P: AsRef<Path>>(path: P) -> GanResult<[Q15; LATENT_DIM]> {
    let words = read_hex_file(path)?;
    to_array("noise", &words)
}

/// ディレクトリ内のノイズサンプルファイル（`input_sample_NN_q15.hex`）を名前順で列挙
pub fn noise_sample_files<P: AsRef<Path>>(dir: P) -> GanResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_sample = path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
            name.starts_with(NOISE_SAMPLE_PREFIX) && name.ends_with(super::HEX_SUFFIX)
        });
        if is_sample {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
