//! 区分線形（PWL）活性化関数
//!
//! - `tanh_approx`: 3領域（恒等 / ±0.8 / ±0.99）
//! - `sigmoid_approx`: 3領域（0.25 / 0.5 + x/2 / 0.75）
//! - `leaky_relu_approx`: 負側を `>> 3`（/8）
//! - `gated_activation`: `tanh(feature) * sigmoid(gate)`（乗算は Q1.15 切り捨て）
//!
//! いずれも分岐のみの純関数。境界比較は閾値を含む（`>=` / `<=`）。

use crate::constants::*;
use crate::fixed::Q15;
use std::fmt;

/// tanh の PWL 近似
///
/// ```text
/// |x| >= 0x7333 (≈0.9) → ±0x7EC8 (≈0.99)
/// |x| >= 0x4000 (0.5)  → ±0x6666 (≈0.8)
/// それ以外             → x
/// ```
///
/// |x| は符号なしで比較するため、-1.0（0x8000）は飽和領域に入る。
#[inline]
pub const fn tanh_approx(x: Q15) -> Q15 {
    let magnitude = x.unsigned_abs();
    let out = if magnitude >= TANH_SAT_THRESHOLD {
        TANH_SAT_OUT
    } else if magnitude >= TANH_MID_THRESHOLD {
        TANH_MID_OUT
    } else {
        return x;
    };
    if x.is_negative() { Q15::from_bits(-out) } else { Q15::from_bits(out) }
}

/// sigmoid の PWL 近似
///
/// ```text
/// x <= -0x4000 → 0x2000 (0.25)
/// x >=  0x4000 → 0x6000 (0.75)
/// それ以外     → 0x4000 + (x >> 1)
/// ```
///
/// `x >> 1` は算術シフトなので奇数の負値は -∞ 方向に丸まる。
#[inline]
pub const fn sigmoid_approx(x: Q15) -> Q15 {
    let bits = x.to_bits();
    if bits <= -SIGMOID_EDGE {
        Q15::from_bits(SIGMOID_LOW_OUT)
    } else if bits >= SIGMOID_EDGE {
        Q15::from_bits(SIGMOID_HIGH_OUT)
    } else {
        Q15::from_bits(Q15_HALF + (bits >> 1))
    }
}

/// leaky ReLU の近似（負側の傾き 1/8）
#[inline]
pub const fn leaky_relu_approx(x: Q15) -> Q15 {
    if x.is_negative() { x.shr(LEAKY_SHIFT) } else { x }
}

/// ゲート付き活性化ユニット
///
/// `tanh_approx(feature) * sigmoid_approx(gate)` を Q1.15 切り捨て乗算で計算する。
#[inline]
pub const fn gated_activation(feature: Q15, gate: Q15) -> Q15 {
    tanh_approx(feature).mul_trunc(sigmoid_approx(gate))
}

/// 層に割り当てる活性化関数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    Tanh,
    Sigmoid,
    LeakyRelu,
}

impl Activation {
    /// 1要素に適用
    #[inline]
    pub const fn apply(self, x: Q15) -> Q15 {
        match self {
            Activation::Tanh => tanh_approx(x),
            Activation::Sigmoid => sigmoid_approx(x),
            Activation::LeakyRelu => leaky_relu_approx(x),
        }
    }

    /// 名前
    pub const fn name(self) -> &'static str {
        match self {
            Activation::Tanh => "tanh_approx",
            Activation::Sigmoid => "sigmoid_approx",
            Activation::LeakyRelu => "leaky_relu_approx",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
