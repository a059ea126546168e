//! gan_infer の設定ファイル（TOML）
//!
//! ```toml
//! params_dir = "parameters/hex"
//! samples_dir = "parameters/hex"
//! random = 4
//! seed = 42
//! cosim = true
//! ```
//!
//! コマンドライン引数が指定されていればそちらが優先される。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 乱数ノイズの既定シード
pub const DEFAULT_SEED: u64 = 42;

/// 推論ツールの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferConfig {
    /// `<Name>_q15.hex` を含むディレクトリ
    pub params_dir: Option<PathBuf>,
    /// JSON パラメータファイル（params_dir より優先）
    pub params_json: Option<PathBuf>,
    /// `input_sample_NN_q15.hex` を含むディレクトリ
    pub samples_dir: Option<PathBuf>,
    /// 明示的なノイズベクトル（`"0x4000,0xC000"` や `"0.5,-0.5"`）
    pub noise: Vec<String>,
    /// 乱数ノイズの本数
    pub random: usize,
    pub seed: u64,
    /// JSON Lines で出力
    pub json: bool,
    /// シーケンサのステップトレースを出力
    pub cosim: bool,
    /// 隠れ層の値も出力
    pub hidden: bool,
    /// 飽和加算で累積（RTL とは一致しない）
    pub saturating: bool,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            params_dir: None,
            params_json: None,
            samples_dir: None,
            noise: Vec::new(),
            random: 0,
            seed: DEFAULT_SEED,
            json: false,
            cosim: false,
            hidden: false,
            saturating: false,
        }
    }
}

impl InferConfig {
    /// TOML ファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読めません: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("設定ファイルの形式が不正です: {}", path.display()))
    }
}
