//! Generator / Discriminator ネットワーク
//!
//! どちらも構築後は不変。`&GanModel` はスレッド間で共有してよい。

mod discriminator;
mod generator;

pub use discriminator::{Discriminator, DiscriminatorTrace, D_L2_NAMES, D_L3_NAMES};
pub use generator::{Generator, GeneratorTrace, G_L2_NAMES, G_L3_NAMES};

use crate::constants::{IMG_SIZE, LATENT_DIM};
use crate::error::GanResult;
use crate::fixed::Q15;
use crate::layer::Accumulation;
use crate::params::ParameterSet;
use std::path::Path;

/// Generator + Discriminator の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanModel {
    generator: Generator,
    discriminator: Discriminator,
}

impl GanModel {
    pub fn new(generator: Generator, discriminator: Discriminator) -> Self {
        Self {
            generator,
            discriminator,
        }
    }

    /// パラメータセットから構築（8配列すべての次元を検証）
    pub fn from_params(params: &ParameterSet) -> GanResult<Self> {
        let generator = Generator::from_params(&params.generator)?;
        let discriminator = Discriminator::from_params(&params.discriminator)?;
        Ok(Self::new(generator, discriminator))
    }

    /// `<Name>_q15.hex` 形式のディレクトリから構築
    pub fn load_hex_dir<P: AsRef<Path>>(dir: P) -> GanResult<Self> {
        Self::from_params(&ParameterSet::load_hex_dir(dir)?)
    }

    /// JSON パラメータファイルから構築
    pub fn load_json<P: AsRef<Path>>(path: P) -> GanResult<Self> {
        Self::from_params(&ParameterSet::load_json(path)?)
    }

    /// 全層の累積モードを変更
    pub fn with_accumulation(self, accumulation: Accumulation) -> Self {
        Self {
            generator: self.generator.with_accumulation(accumulation),
            discriminator: self.discriminator.with_accumulation(accumulation),
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// [`Generator::generate`]
    #[inline]
    pub fn generate(&self, noise: [Q15; LATENT_DIM]) -> [Q15; IMG_SIZE] {
        self.generator.generate(noise)
    }

    /// [`Discriminator::discriminate`]
    #[inline]
    pub fn discriminate(&self, image: [Q15; IMG_SIZE]) -> Q15 {
        self.discriminator.discriminate(image)
    }

    /// 現在の重みをパラメータセットとして取り出す
    pub fn to_params(&self) -> ParameterSet {
        ParameterSet {
            generator: self.generator.to_params(),
            discriminator: self.discriminator.to_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_is_shareable() {
        assert_send_sync::<GanModel>();
    }

    #[test]
    fn test_from_params_rejects_empty_set() {
        let err = GanModel::from_params(&ParameterSet::default()).unwrap_err();
        assert!(err.is_configuration());
        // 最初に検証される配列の名前が出る
        assert!(err.to_string().contains("Wg2"));
    }

    #[test]
    fn test_zero_model_outputs() {
        let model = GanModel::from_params(&ParameterSet::zeros()).unwrap();
        let image = model.generate([Q15::HALF, Q15::HALF]);
        assert_eq!(image, [Q15::ZERO; IMG_SIZE]);
        assert_eq!(model.discriminate(image), Q15::HALF);
        assert_eq!(model.to_params(), ParameterSet::zeros());
    }
}
