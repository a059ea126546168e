//! Q1.15 固定小数点演算
//!
//! - 乗算: 32bit 積の bit[30:15] を切り出す（`(a * b) >> 15` を 16bit に切り詰め）
//! - 加算: 16bit 2の補数の wrapping 加算（飽和なし、オーバーフロー検出なし）
//!
//! 乗算は丸めを行わない。捨てる下位 15bit は常に -∞ 方向に切り捨てられる。
//! 加算の飽和省略は RTL 由来の挙動で、学習済み重みの大きさで範囲内に収まる前提。

use crate::constants::{FRAC_BITS, Q15_MAX_REAL, Q15_SCALE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg};

/// Q1.15 値（符号1bit + 小数15bit、実数値 = bits / 32768）
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Q15(i16);

impl Q15 {
    /// 0.0
    pub const ZERO: Q15 = Q15(0);
    /// 0.5
    pub const HALF: Q15 = Q15(0x4000);
    /// -1.0
    pub const MIN: Q15 = Q15(i16::MIN);
    /// 0.999969...
    pub const MAX: Q15 = Q15(i16::MAX);

    /// 生ビットから作成
    #[inline]
    pub const fn from_bits(bits: i16) -> Self {
        Q15(bits)
    }

    /// 生ビット
    #[inline]
    pub const fn to_bits(self) -> i16 {
        self.0
    }

    /// 16bit ワード（16進表示用の符号なし表現）
    #[inline]
    pub const fn to_word(self) -> u16 {
        self.0 as u16
    }

    /// 16bit ワードから作成（2の補数として解釈）
    #[inline]
    pub const fn from_word(word: u16) -> Self {
        Q15(word as i16)
    }

    /// 切り捨て乗算
    ///
    /// 32bit 積の bit[30:15] を取り出す。`-1.0 * -1.0` は bit[30:15] = 0x8000 となり
    /// -1.0 に戻るが、これも RTL のビット切り出しと同じ結果。
    #[inline]
    pub const fn mul_trunc(self, rhs: Q15) -> Q15 {
        let product = self.0 as i32 * rhs.0 as i32;
        Q15((product >> FRAC_BITS) as i16)
    }

    /// 飽和なし加算
    #[inline]
    pub const fn wrapping_add(self, rhs: Q15) -> Q15 {
        Q15(self.0.wrapping_add(rhs.0))
    }

    /// 飽和加算
    ///
    /// RTL には存在しない拡張モード（[`crate::layer::Accumulation::Saturating`]）専用。
    #[inline]
    pub const fn saturating_add(self, rhs: Q15) -> Q15 {
        Q15(self.0.saturating_add(rhs.0))
    }

    /// 算術右シフト（-∞ 方向への丸め）
    #[inline]
    pub const fn shr(self, bits: u32) -> Q15 {
        Q15(self.0 >> bits)
    }

    /// 絶対値（符号なし）。-1.0 は 0x8000 になる
    #[inline]
    pub const fn unsigned_abs(self) -> u16 {
        self.0.unsigned_abs()
    }

    /// 負の値かどうか
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// 実数へ変換（表示・テスト用）
    pub fn to_real(self) -> f64 {
        self.0 as f64 / Q15_SCALE
    }

    /// 実数から変換（表示・テスト用）
    ///
    /// [-1.0, 0.999969482421875] にクランプしてから 32768 倍し、偶数丸めする。
    /// ±inf は両端に張り付き、NaN は -1.0 になる。
    pub fn from_real(value: f64) -> Q15 {
        if value.is_nan() {
            return Q15::MIN;
        }
        let scaled = (value.clamp(-1.0, Q15_MAX_REAL) * Q15_SCALE).round_ties_even();
        Q15(scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16)
    }
}

/// 切り捨て乗算（[`Q15::mul_trunc`]）
#[inline]
pub const fn multiply(a: Q15, b: Q15) -> Q15 {
    a.mul_trunc(b)
}

/// 飽和なし加算（[`Q15::wrapping_add`]）
#[inline]
pub const fn add(a: Q15, b: Q15) -> Q15 {
    a.wrapping_add(b)
}

impl Mul for Q15 {
    type Output = Q15;

    #[inline]
    fn mul(self, rhs: Q15) -> Q15 {
        self.mul_trunc(rhs)
    }
}

impl Add for Q15 {
    type Output = Q15;

    #[inline]
    fn add(self, rhs: Q15) -> Q15 {
        self.wrapping_add(rhs)
    }
}

impl Neg for Q15 {
    type Output = Q15;

    /// 2の補数の符号反転（-1.0 は -1.0 のまま）
    #[inline]
    fn neg(self) -> Q15 {
        Q15(self.0.wrapping_neg())
    }
}

impl From<i16> for Q15 {
    fn from(bits: i16) -> Self {
        Q15(bits)
    }
}

impl From<Q15> for i16 {
    fn from(q: Q15) -> Self {
        q.0
    }
}

impl fmt::Display for Q15 {
    /// RTL の波形表示に合わせて 16bit ワードの16進で表示する
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.to_word())
    }
}

impl fmt::UpperHex for Q15 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.to_word(), f)
    }
}

impl fmt::LowerHex for Q15 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.to_word(), f)
    }
}

/// i16 配列を Q15 配列に変換
pub const fn q15_array<const N: usize>(bits: [i16; N]) -> [Q15; N] {
    let mut out = [Q15::ZERO; N];
    let mut i = 0;
    while i < N {
        out[i] = Q15(bits[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(bits: i16) -> Q15 {
        Q15::from_bits(bits)
    }

    #[test]
    fn test_multiply_half_by_half() {
        // 0.5 * 0.5 = 0.25: 0x4000 * 0x4000 = 2^28, >> 15 = 2^13
        assert_eq!(multiply(q(0x4000), q(0x4000)), q(0x2000));
    }

    #[test]
    fn test_multiply_truncates_toward_negative_infinity() {
        // 1 * 1 = 1 >> 15 = 0
        assert_eq!(multiply(q(1), q(1)), q(0));
        // -1 * 1 = -1 >> 15 = -1（0 ではない）
        assert_eq!(multiply(q(-1), q(1)), q(-1));
        // 0x4001 * 0x4001 = 0x10008001 >> 15 = 0x2001（下位の 1 は捨てる）
        assert_eq!(multiply(q(0x4001), q(0x4001)), q(0x2001));
        // -0x10008001 >> 15 は -0x2002（ゼロ方向ではなく -∞ 方向）
        assert_eq!(multiply(q(-0x4001), q(0x4001)), q(-0x2002));
    }

    #[test]
    fn test_multiply_extremes() {
        // -1.0 * -1.0: bit[30:15] = 0x8000 → -1.0
        assert_eq!(multiply(Q15::MIN, Q15::MIN), Q15::MIN);
        // -1.0 * 0.99997 = -0x7FFF
        assert_eq!(multiply(Q15::MIN, Q15::MAX), q(-0x7FFF));
        // 0.99997^2 = 0x3FFF0001 >> 15 = 0x7FFE
        assert_eq!(multiply(Q15::MAX, Q15::MAX), q(0x7FFE));
        assert_eq!(multiply(Q15::MAX, Q15::ZERO), Q15::ZERO);
    }

    #[test]
    fn test_add_wraps_without_saturation() {
        assert_eq!(add(q(0x1000), q(0x2000)), q(0x3000));
        // 0x7000 + 0x2000 = 0x9000 → 負数に回り込む
        assert_eq!(add(q(0x7000), q(0x2000)), q(0x9000u16 as i16));
        assert_eq!(add(Q15::MIN, q(-1)), Q15::MAX);
        // 演算子も同じ意味
        assert_eq!(q(0x7000) + q(0x2000), q(0x9000u16 as i16));
        assert_eq!(q(0x4000) * q(0x4000), q(0x2000));
    }

    #[test]
    fn test_saturating_add_is_separate() {
        assert_eq!(q(0x7000).saturating_add(q(0x2000)), Q15::MAX);
        assert_eq!(Q15::MIN.saturating_add(q(-1)), Q15::MIN);
    }

    #[test]
    fn test_real_conversion() {
        assert_eq!(Q15::from_real(0.0), Q15::ZERO);
        assert_eq!(Q15::from_real(0.5), Q15::HALF);
        assert_eq!(Q15::from_real(-1.0), Q15::MIN);
        assert_eq!(Q15::from_real(1.0), Q15::MAX);
        assert_eq!(Q15::from_real(-3.5), Q15::MIN);
        assert_eq!(Q15::from_real(0.62), q(20316));
        assert_eq!(Q15::from_real(-0.41), q(-13435));
        // 0.5 / 32768 ちょうどの端数は偶数側に丸める
        assert_eq!(Q15::from_real(0.5 / 32768.0), q(0));
        assert_eq!(Q15::from_real(1.5 / 32768.0), q(2));
        assert_eq!(Q15::from_real(f64::NAN), Q15::MIN);
        assert_eq!(Q15::from_real(f64::INFINITY), Q15::MAX);
        assert_eq!(Q15::from_real(f64::NEG_INFINITY), Q15::MIN);

        assert_eq!(Q15::HALF.to_real(), 0.5);
        assert_eq!(Q15::MIN.to_real(), -1.0);
    }

    #[test]
    fn test_display_is_word_hex() {
        assert_eq!(q(0x4F63).to_string(), "0x4F63");
        assert_eq!(q(-0x7EC8).to_string(), "0x8138");
        assert_eq!(format!("{:04X}", q(-1)), "FFFF");
        assert_eq!(Q15::from_word(0xFFFF), q(-1));
    }

    #[test]
    fn test_neg_and_abs() {
        assert_eq!(-q(0x4000), q(-0x4000));
        assert_eq!(-Q15::MIN, Q15::MIN);
        assert_eq!(Q15::MIN.unsigned_abs(), 0x8000);
        assert_eq!(q(-3).shr(1), q(-2));
    }
}
