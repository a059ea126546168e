//! パラメータセット
//!
//! 8個の Q1.15 配列（row-major）を保持し、ファイルとの間で読み書きする。
//!
//! | 名前 | 形状 | 要素数 |
//! |------|------|--------|
//! | Wg2  | 3x2  | 6      |
//! | bg2  | 3    | 3      |
//! | Wg3  | 9x3  | 27     |
//! | bg3  | 9    | 9      |
//! | Wd2  | 3x9  | 27     |
//! | bd2  | 3    | 3      |
//! | Wd3  | 1x3  | 3      |
//! | bd3  | 1    | 1      |
//!
//! 対応フォーマット:
//! - hex: `$readmemh` 互換の1行1ワード（`<Name>_q15.hex`）
//! - JSON: [`ParameterSet`] の serde 表現（整数値）
//! - 10進テキスト: 実数の空白区切り（[`text`]、変換ツール用）

pub mod hex;
pub mod text;

use crate::constants::*;
use crate::error::{GanError, GanResult};
use crate::fixed::Q15;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// パラメータ名と要素数（ファイル読み込み順）
pub const PARAM_SHAPES: [(&str, usize); 8] = [
    ("Wg2", G_HIDDEN * LATENT_DIM),
    ("bg2", G_HIDDEN),
    ("Wg3", IMG_SIZE * G_HIDDEN),
    ("bg3", IMG_SIZE),
    ("Wd2", D_HIDDEN * IMG_SIZE),
    ("bd2", D_HIDDEN),
    ("Wd3", D_OUT * D_HIDDEN),
    ("bd3", D_OUT),
];

/// hex ファイル名の接尾辞
pub const HEX_SUFFIX: &str = "_q15.hex";

/// Generator のパラメータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorParams {
    #[serde(rename = "Wg2")]
    pub wg2: Vec<Q15>,
    pub bg2: Vec<Q15>,
    #[serde(rename = "Wg3")]
    pub wg3: Vec<Q15>,
    pub bg3: Vec<Q15>,
}

/// Discriminator のパラメータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminatorParams {
    #[serde(rename = "Wd2")]
    pub wd2: Vec<Q15>,
    pub bd2: Vec<Q15>,
    #[serde(rename = "Wd3")]
    pub wd3: Vec<Q15>,
    pub bd3: Vec<Q15>,
}

/// 全パラメータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub generator: GeneratorParams,
    pub discriminator: DiscriminatorParams,
}

impl ParameterSet {
    /// 全要素ゼロ（次元は正しい）
    pub fn zeros() -> Self {
        let mut set = Self::default();
        for (name, len) in PARAM_SHAPES {
            if let Some(values) = set.get_mut(name) {
                *values = vec![Q15::ZERO; len];
            }
        }
        set
    }

    /// 名前で配列を参照
    pub fn get(&self, name: &str) -> Option<&[Q15]> {
        let values = match name {
            "Wg2" => &self.generator.wg2,
            "bg2" => &self.generator.bg2,
            "Wg3" => &self.generator.wg3,
            "bg3" => &self.generator.bg3,
            "Wd2" => &self.discriminator.wd2,
            "bd2" => &self.discriminator.bd2,
            "Wd3" => &self.discriminator.wd3,
            "bd3" => &self.discriminator.bd3,
            _ => return None,
        };
        Some(values)
    }

    /// 名前で配列を可変参照
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Q15>> {
        let values = match name {
            "Wg2" => &mut self.generator.wg2,
            "bg2" => &mut self.generator.bg2,
            "Wg3" => &mut self.generator.wg3,
            "bg3" => &mut self.generator.bg3,
            "Wd2" => &mut self.discriminator.wd2,
            "bd2" => &mut self.discriminator.bd2,
            "Wd3" => &mut self.discriminator.wd3,
            "bd3" => &mut self.discriminator.bd3,
            _ => return None,
        };
        Some(values)
    }

    /// 全配列の要素数を検証
    pub fn validate(&self) -> GanResult<()> {
        for (name, expected) in PARAM_SHAPES {
            let actual = self.get(name).map_or(0, <[Q15]>::len);
            if actual != expected {
                return Err(GanError::DimensionMismatch {
                    what: name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// hex ディレクトリから読み込み（`Wg2_q15.hex` など）
    pub fn load_hex_dir<P: AsRef<Path>>(dir: P) -> GanResult<Self> {
        let dir = dir.as_ref();
        let mut set = Self::default();
        for (name, _) in PARAM_SHAPES {
            let path = hex_path(dir, name);
            let values = hex::read_hex_file(&path)?;
            debug!("loaded {} ({} words)", path.display(), values.len());
            if let Some(slot) = set.get_mut(name) {
                *slot = values;
            }
        }
        set.validate()?;
        Ok(set)
    }

    /// hex ディレクトリへ書き出し
    pub fn save_hex_dir<P: AsRef<Path>>(&self, dir: P) -> GanResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (name, _) in PARAM_SHAPES {
            let values = self.get(name).unwrap_or_default();
            let path = hex_path(dir, name);
            hex::write_hex_file(&path, values)?;
            debug!("wrote {} ({} words)", path.display(), values.len());
        }
        Ok(())
    }

    /// JSON 文字列から読み込み
    pub fn from_json_str(json: &str) -> GanResult<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    /// JSON ファイルから読み込み
    pub fn load_json<P: AsRef<Path>>(path: P) -> GanResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let set: Self = serde_json::from_reader(reader)?;
        set.validate()?;
        debug!("loaded parameters from {}", path.as_ref().display());
        Ok(set)
    }

    /// JSON ファイルへ書き出し
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> GanResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// パラメータ名から hex ファイルパスを作る
pub fn hex_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{HEX_SUFFIX}"))
}
