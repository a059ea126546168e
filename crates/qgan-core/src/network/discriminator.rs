//! Discriminator
//!
//! image [9] → L2 [9→3] tanh → L3 [3→1] sigmoid → probability
//!
//! 出力は sigmoid 近似の値域 [0x2000, 0x6000]（0.25〜0.75）。
//! real / fake の判定（> 0.5）は呼び出し側で行う。

use crate::activation::Activation;
use crate::constants::{D_HIDDEN, D_OUT, IMG_SIZE};
use crate::error::{to_array, GanResult};
use crate::fixed::Q15;
use crate::layer::{Accumulation, DenseLayer, LayerNames};
use crate::params::DiscriminatorParams;
use serde::Serialize;

/// L2 層のパラメータ名
pub const D_L2_NAMES: LayerNames = LayerNames::new("Wd2", "bd2");
/// L3 層のパラメータ名
pub const D_L3_NAMES: LayerNames = LayerNames::new("Wd3", "bd3");

/// Discriminator の中間値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscriminatorTrace {
    /// L2 出力
    pub hidden: [Q15; D_HIDDEN],
    /// L3 出力（P(real)）
    pub probability: Q15,
}

/// Discriminator ネットワーク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    layer2: DenseLayer<IMG_SIZE, D_HIDDEN>,
    layer3: DenseLayer<D_HIDDEN, D_OUT>,
}

impl Discriminator {
    pub fn new(
        layer2: DenseLayer<IMG_SIZE, D_HIDDEN>,
        layer3: DenseLayer<D_HIDDEN, D_OUT>,
    ) -> Self {
        Self { layer2, layer3 }
    }

    /// フラットなパラメータ配列から構築（次元を検証）
    pub fn from_params(params: &DiscriminatorParams) -> GanResult<Self> {
        let layer2 =
            DenseLayer::from_flat(D_L2_NAMES, &params.wd2, &params.bd2, Activation::Tanh)?;
        let layer3 =
            DenseLayer::from_flat(D_L3_NAMES, &params.wd3, &params.bd3, Activation::Sigmoid)?;
        Ok(Self::new(layer2, layer3))
    }

    /// 両層の累積モードを変更
    pub fn with_accumulation(self, accumulation: Accumulation) -> Self {
        Self {
            layer2: self.layer2.with_accumulation(accumulation),
            layer3: self.layer3.with_accumulation(accumulation),
        }
    }

    /// 画像を判定して P(real) を返す
    #[inline]
    pub fn discriminate(&self, image: [Q15; IMG_SIZE]) -> Q15 {
        let [probability] = self.layer3.forward(&self.layer2.forward(&image));
        probability
    }

    /// 中間値付きで判定
    pub fn discriminate_traced(&self, image: [Q15; IMG_SIZE]) -> DiscriminatorTrace {
        let hidden = self.layer2.forward(&image);
        let [probability] = self.layer3.forward(&hidden);
        DiscriminatorTrace {
            hidden,
            probability,
        }
    }

    /// スライス入力版（画像長を検証）
    pub fn discriminate_slice(&self, image: &[Q15]) -> GanResult<Q15> {
        let image = to_array("image", image)?;
        Ok(self.discriminate(image))
    }

    pub fn layer2(&self) -> &DenseLayer<IMG_SIZE, D_HIDDEN> {
        &self.layer2
    }

    pub fn layer3(&self) -> &DenseLayer<D_HIDDEN, D_OUT> {
        &self.layer3
    }

    /// フラットなパラメータ配列に戻す
    pub fn to_params(&self) -> DiscriminatorParams {
        DiscriminatorParams {
            wd2: self.layer2.flat_weights(),
            bd2: self.layer2.biases().to_vec(),
            wd3: self.layer3.flat_weights(),
            bd3: self.layer3.biases().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(bits: i16) -> Q15 {
        Q15::from_bits(bits)
    }

    /// 画素の平均的な明るさに反応する判定器
    fn brightness_params(bd3: i16) -> DiscriminatorParams {
        DiscriminatorParams {
            // h0 = Σ x * 0.0625、h1 = h2 = 0
            wd2: [vec![q(0x0800); 9], vec![Q15::ZERO; 18]].concat(),
            bd2: vec![Q15::ZERO; 3],
            wd3: vec![Q15::MAX, Q15::ZERO, Q15::ZERO],
            bd3: vec![q(bd3)],
        }
    }

    #[test]
    fn test_discriminate_zero_image_is_half() {
        let disc = Discriminator::from_params(&brightness_params(0)).unwrap();
        assert_eq!(disc.discriminate([Q15::ZERO; 9]), q(0x4000));
    }

    #[test]
    fn test_discriminate_traced_matches() {
        let disc = Discriminator::from_params(&brightness_params(0)).unwrap();
        let image = [q(0x4000); 9];
        let trace = disc.discriminate_traced(image);
        // 0x4000 * 0x0800 >> 15 = 0x0400、9項で 0x2400
        assert_eq!(trace.hidden, [q(0x2400), Q15::ZERO, Q15::ZERO]);
        // 0x2400 * 0x7FFF >> 15 = 0x23FF → sigmoid: 0x4000 + 0x11FF
        assert_eq!(trace.probability, q(0x51FF));
        assert_eq!(disc.discriminate(image), trace.probability);
    }

    #[test]
    fn test_probability_clamped_by_sigmoid() {
        let disc = Discriminator::from_params(&brightness_params(0x7000)).unwrap();
        assert_eq!(disc.discriminate([Q15::ZERO; 9]), q(0x6000));
        let disc = Discriminator::from_params(&brightness_params(-0x7000)).unwrap();
        assert_eq!(disc.discriminate([Q15::ZERO; 9]), q(0x2000));
    }

    #[test]
    fn test_from_params_rejects_bad_bias() {
        let mut params = brightness_params(0);
        params.bd3.push(Q15::ZERO);
        let err = Discriminator::from_params(&params).unwrap_err();
        assert!(err.to_string().contains("bd3 expected 1 values, got 2"));
    }

    #[test]
    fn test_discriminate_slice_validates_length() {
        let disc = Discriminator::from_params(&brightness_params(0)).unwrap();
        assert!(disc.discriminate_slice(&[Q15::ZERO; 8]).unwrap_err().is_configuration());
        assert_eq!(disc.discriminate_slice(&[Q15::ZERO; 9]).unwrap(), q(0x4000));
    }
}
