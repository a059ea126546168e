//! Error types for qgan-core
//!
//! 構成エラー（次元不一致）とパラメータ読み込みエラーを一つの列挙型で扱う。

use std::path::PathBuf;

/// qgan-core のエラー
#[derive(thiserror::Error, Debug)]
pub enum GanError {
    /// 配列長が層の宣言次元と一致しない
    #[error("configuration error: {what} expected {expected} values, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 重み行列の行数が出力次元と一致しない
    #[error("configuration error: {what} expected {expected} rows, got {actual}")]
    RowCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// パラメータファイルの字句エラー
    #[error("{}:{line}: invalid Q1.15 word {token:?}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// File I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GanError {
    /// 構成エラー（次元・形状の不一致）かどうか
    pub fn is_configuration(&self) -> bool {
        matches!(self, GanError::DimensionMismatch { .. } | GanError::RowCountMismatch { .. })
    }
}

/// Result type for qgan-core operations
pub type GanResult<T> = Result<T, GanError>;

/// スライス長を検証して固定長配列にコピーする
pub(crate) fn to_array<T: Copy + Default, const N: usize>(
    what: &'static str,
    values: &[T],
) -> GanResult<[T; N]> {
    if values.len() != N {
        return Err(GanError::DimensionMismatch {
            what,
            expected: N,
            actual: values.len(),
        });
    }
    let mut out = [T::default(); N];
    out.copy_from_slice(values);
    Ok(out)
}
