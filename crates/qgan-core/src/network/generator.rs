//! Generator
//!
//! noise [2] → L2 [2→3] tanh → L3 [3→9] tanh → image [9]

use crate::activation::Activation;
use crate::constants::{G_HIDDEN, IMG_SIZE, LATENT_DIM};
use crate::error::{to_array, GanResult};
use crate::fixed::Q15;
use crate::layer::{Accumulation, DenseLayer, LayerNames};
use crate::params::GeneratorParams;
use serde::Serialize;

/// L2 層のパラメータ名
pub const G_L2_NAMES: LayerNames = LayerNames::new("Wg2", "bg2");
/// L3 層のパラメータ名
pub const G_L3_NAMES: LayerNames = LayerNames::new("Wg3", "bg3");

/// Generator の中間値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratorTrace {
    /// L2 出力
    pub hidden: [Q15; G_HIDDEN],
    /// L3 出力（生成画像、row-major の 3x3）
    pub image: [Q15; IMG_SIZE],
}

/// Generator ネットワーク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    layer2: DenseLayer<LATENT_DIM, G_HIDDEN>,
    layer3: DenseLayer<G_HIDDEN, IMG_SIZE>,
}

impl Generator {
    pub fn new(
        layer2: DenseLayer<LATENT_DIM, G_HIDDEN>,
        layer3: DenseLayer<G_HIDDEN, IMG_SIZE>,
    ) -> Self {
        Self { layer2, layer3 }
    }

    /// フラットなパラメータ配列から構築（次元を検証）
    pub fn from_params(params: &GeneratorParams) -> GanResult<Self> {
        let layer2 =
            DenseLayer::from_flat(G_L2_NAMES, &params.wg2, &params.bg2, Activation::Tanh)?;
        let layer3 =
            DenseLayer::from_flat(G_L3_NAMES, &params.wg3, &params.bg3, Activation::Tanh)?;
        Ok(Self::new(layer2, layer3))
    }

    /// 両層の累積モードを変更
    pub fn with_accumulation(self, accumulation: Accumulation) -> Self {
        Self {
            layer2: self.layer2.with_accumulation(accumulation),
            layer3: self.layer3.with_accumulation(accumulation),
        }
    }

    /// 画像を生成
    #[inline]
    pub fn generate(&self, noise: [Q15; LATENT_DIM]) -> [Q15; IMG_SIZE] {
        self.layer3.forward(&self.layer2.forward(&noise))
    }

    /// 中間値付きで画像を生成
    pub fn generate_traced(&self, noise: [Q15; LATENT_DIM]) -> GeneratorTrace {
        let hidden = self.layer2.forward(&noise);
        let image = self.layer3.forward(&hidden);
        GeneratorTrace { hidden, image }
    }

    /// スライス入力版（ノイズ長を検証）
    pub fn generate_slice(&self, noise: &[Q15]) -> GanResult<[Q15; IMG_SIZE]> {
        let noise = to_array("noise", noise)?;
        Ok(self.generate(noise))
    }

    pub fn layer2(&self) -> &DenseLayer<LATENT_DIM, G_HIDDEN> {
        &self.layer2
    }

    pub fn layer3(&self) -> &DenseLayer<G_HIDDEN, IMG_SIZE> {
        &self.layer3
    }

    /// フラットなパラメータ配列に戻す
    pub fn to_params(&self) -> GeneratorParams {
        GeneratorParams {
            wg2: self.layer2.flat_weights(),
            bg2: self.layer2.biases().to_vec(),
            wg3: self.layer3.flat_weights(),
            bg3: self.layer3.biases().to_vec(),
        }
    }
}
