//! 全結合層
//!
//! `output[i] = act( Σ_j multiply(W[i][j], x[j]) + b[i] )`
//!
//! 積和の契約:
//! - 各項は個別に Q1.15 切り捨て乗算してから 16bit で累積する（32bit 積のまま足さない）
//! - j の昇順に累積し、最後にバイアスを加える
//! - 累積は飽和しない（[`Accumulation::Wrapping`]）
//!
//! 形状は const generics で固定する。可変長データからの構築時だけ次元を検証する。

use crate::activation::Activation;
use crate::error::{to_array, GanError, GanResult};
use crate::fixed::Q15;

/// 累積モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accumulation {
    /// 16bit wrapping 加算（RTL と同一）
    #[default]
    Wrapping,
    /// 16bit 飽和加算
    ///
    /// RTL とは bit-exact ではない拡張モード。学習済み重みの範囲外で使う場合のみ。
    Saturating,
}

impl Accumulation {
    #[inline]
    const fn accumulate(self, acc: Q15, term: Q15) -> Q15 {
        match self {
            Accumulation::Wrapping => acc.wrapping_add(term),
            Accumulation::Saturating => acc.saturating_add(term),
        }
    }
}

/// パラメータ名（エラーメッセージ・診断ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerNames {
    pub weights: &'static str,
    pub biases: &'static str,
}

impl LayerNames {
    pub const fn new(weights: &'static str, biases: &'static str) -> Self {
        Self { weights, biases }
    }
}

/// 全結合層
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseLayer<const IN: usize, const OUT: usize> {
    names: LayerNames,
    /// 重み（row-major、出力ニューロンごとに1行）
    weights: [[Q15; IN]; OUT],
    /// バイアス
    biases: [Q15; OUT],
    activation: Activation,
    accumulation: Accumulation,
}

impl<const IN: usize, const OUT: usize> DenseLayer<IN, OUT> {
    /// 固定長配列から作成
    pub fn new(
        names: LayerNames,
        weights: [[Q15; IN]; OUT],
        biases: [Q15; OUT],
        activation: Activation,
    ) -> Self {
        Self {
            names,
            weights,
            biases,
            activation,
            accumulation: Accumulation::Wrapping,
        }
    }

    /// row-major のフラット配列から作成
    ///
    /// 長さが `IN * OUT` / `OUT` と一致しなければ構成エラー。
    pub fn from_flat(
        names: LayerNames,
        weights: &[Q15],
        biases: &[Q15],
        activation: Activation,
    ) -> GanResult<Self> {
        if weights.len() != IN * OUT {
            return Err(GanError::DimensionMismatch {
                what: names.weights,
                expected: IN * OUT,
                actual: weights.len(),
            });
        }
        let mut matrix = [[Q15::ZERO; IN]; OUT];
        for (row, chunk) in matrix.iter_mut().zip(weights.chunks_exact(IN.max(1))) {
            row.copy_from_slice(&chunk[..IN]);
        }
        let biases = to_array(names.biases, biases)?;
        Ok(Self::new(names, matrix, biases, activation))
    }

    /// 行ごとの重みから作成
    ///
    /// 行数が `OUT`、各行の長さが `IN` と一致しなければ構成エラー。
    pub fn from_rows<R: AsRef<[Q15]>>(
        names: LayerNames,
        rows: &[R],
        biases: &[Q15],
        activation: Activation,
    ) -> GanResult<Self> {
        if rows.len() != OUT {
            return Err(GanError::RowCountMismatch {
                what: names.weights,
                expected: OUT,
                actual: rows.len(),
            });
        }
        let mut matrix = [[Q15::ZERO; IN]; OUT];
        for (dst, src) in matrix.iter_mut().zip(rows) {
            *dst = to_array(names.weights, src.as_ref())?;
        }
        let biases = to_array(names.biases, biases)?;
        Ok(Self::new(names, matrix, biases, activation))
    }

    /// 累積モードを変更
    pub fn with_accumulation(mut self, accumulation: Accumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// 活性化前の値（積和 + バイアス）
    #[inline]
    pub fn pre_activation(&self, input: &[Q15; IN]) -> [Q15; OUT] {
        let mut out = [Q15::ZERO; OUT];
        for ((out_val, row), &bias) in out.iter_mut().zip(&self.weights).zip(&self.biases) {
            let mut acc = Q15::ZERO;
            for (&w, &x) in row.iter().zip(input) {
                acc = self.accumulation.accumulate(acc, w.mul_trunc(x));
            }
            *out_val = self.accumulation.accumulate(acc, bias);
        }
        out
    }

    /// 順伝播
    #[inline]
    pub fn forward(&self, input: &[Q15; IN]) -> [Q15; OUT] {
        let mut out = self.pre_activation(input);
        for val in out.iter_mut() {
            *val = self.activation.apply(*val);
        }

        #[cfg(feature = "diagnostics")]
        log::info!(
            "[Dense {}] {IN}->{OUT} {}: in={:?} out={:?}",
            self.names.weights,
            self.activation,
            (*input).map(Q15::to_bits),
            out.map(Q15::to_bits)
        );

        out
    }

    /// スライス入力の順伝播（入力長を検証）
    pub fn forward_slice(&self, input: &[Q15]) -> GanResult<[Q15; OUT]> {
        let input: [Q15; IN] = to_array("layer input", input)?;
        Ok(self.forward(&input))
    }

    pub fn names(&self) -> LayerNames {
        self.names
    }

    pub fn weights(&self) -> &[[Q15; IN]; OUT] {
        &self.weights
    }

    pub fn biases(&self) -> &[Q15; OUT] {
        &self.biases
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn accumulation(&self) -> Accumulation {
        self.accumulation
    }

    /// 重みをフラット配列（row-major）で返す
    pub fn flat_weights(&self) -> Vec<Q15> {
        self.weights.iter().flatten().copied().collect()
    }
}
