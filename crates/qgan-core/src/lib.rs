//! qgan-core: Q1.15 固定小数点 GAN 推論エンジン
//!
//! 3x3 画像を扱う小さな Generator / Discriminator の順伝播を、
//! RTL 実装と bit-exact に再現する。
//!
//! # アーキテクチャ概要
//!
//! ```text
//! noise [2]
//!    ↓
//! Generator
//!   L2 [2→3]  tanh_approx
//!   L3 [3→9]  tanh_approx
//!    ↓
//! image [9]（3x3）
//!    ↓
//! Discriminator
//!   L2 [9→3]  tanh_approx
//!   L3 [3→1]  sigmoid_approx
//!    ↓
//! probability（Q1.15, [0.25, 0.75]）
//! ```
//!
//! 乗算は 32bit 積の bit[30:15] を切り出す切り捨て、加算は飽和なしの 16bit wrapping。
//! どちらも RTL の挙動そのものであり、丸めや飽和を足してはいけない。

pub mod activation;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fixed;
pub mod layer;
pub mod network;
pub mod params;
pub mod sequencer;

pub use activation::{
    gated_activation, leaky_relu_approx, sigmoid_approx, tanh_approx, Activation,
};
pub use engine::{run_inference, InferenceResult, InferenceSession, Verdict};
pub use error::{GanError, GanResult};
pub use fixed::Q15;
pub use layer::{Accumulation, DenseLayer};
pub use network::{Discriminator, DiscriminatorTrace, GanModel, Generator, GeneratorTrace};
pub use params::{DiscriminatorParams, GeneratorParams, ParameterSet};
pub use sequencer::{InferenceSequencer, SequencerOutput, SequencerState};
