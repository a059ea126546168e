//! 推論の入口
//!
//! - [`run_inference`]: シーケンサを start → done まで駆動して結果を返す
//! - [`GanModel::infer`]: シーケンサを介さない直接評価（全層の中間値付き）
//!
//! 両者の出力は常に一致する。

use crate::constants::{IMG_SIDE, IMG_SIZE, LATENT_DIM, Q15_HALF, SEQUENCER_LATENCY};
use crate::error::{to_array, GanResult};
use crate::fixed::Q15;
use crate::network::{DiscriminatorTrace, GanModel, GeneratorTrace};
use crate::sequencer::InferenceSequencer;
use serde::Serialize;
use std::fmt;

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    /// P(real) > 0.5 なら Real（0.5 ちょうどは Fake）
    pub fn from_probability(probability: Q15) -> Self {
        if probability.to_bits() > Q15_HALF { Verdict::Real } else { Verdict::Fake }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
        })
    }
}

/// 推論結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InferenceResult {
    /// 生成画像（row-major の 3x3）
    pub image: [Q15; IMG_SIZE],
    /// P(real)
    pub probability: Q15,
}

impl InferenceResult {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_probability(self.probability)
    }

    /// 画像を行ごとに返す
    pub fn rows(&self) -> impl Iterator<Item = &[Q15]> {
        self.image.chunks_exact(IMG_SIDE)
    }
}

/// 1回分の推論セッション（入力・中間値・出力）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InferenceSession {
    pub noise: [Q15; LATENT_DIM],
    pub generator: GeneratorTrace,
    pub discriminator: DiscriminatorTrace,
}

impl InferenceSession {
    pub fn image(&self) -> [Q15; IMG_SIZE] {
        self.generator.image
    }

    pub fn probability(&self) -> Q15 {
        self.discriminator.probability
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_probability(self.probability())
    }

    pub fn result(&self) -> InferenceResult {
        InferenceResult {
            image: self.image(),
            probability: self.probability(),
        }
    }
}

impl GanModel {
    /// 直接評価（全層の中間値を保持）
    pub fn infer(&self, noise: [Q15; LATENT_DIM]) -> InferenceSession {
        let generator = self.generator().generate_traced(noise);
        let discriminator = self.discriminator().discriminate_traced(generator.image);
        InferenceSession {
            noise,
            generator,
            discriminator,
        }
    }

    /// スライス入力版の直接評価（ノイズ長を検証）
    pub fn infer_slice(&self, noise: &[Q15]) -> GanResult<InferenceSession> {
        let noise = to_array("noise", noise)?;
        Ok(self.infer(noise))
    }

    /// シーケンサ経由の推論（[`run_inference`]）
    pub fn run_inference(&self, noise: [Q15; LATENT_DIM]) -> InferenceResult {
        run_inference(self, noise)
    }
}

/// シーケンサを start から done まで駆動し、start を解放して結果を返す
pub fn run_inference(model: &GanModel, noise: [Q15; LATENT_DIM]) -> InferenceResult {
    let mut sequencer = InferenceSequencer::new();
    let mut out = sequencer.step(model, true, noise);
    for _ in 0..SEQUENCER_LATENCY {
        if out.done {
            break;
        }
        out = sequencer.step(model, true, noise);
    }
    debug_assert!(out.done, "sequencer did not reach DONE_STATE");

    let result = InferenceResult {
        image: out.image,
        probability: out.probability,
    };
    sequencer.step(model, false, noise);
    result
}
