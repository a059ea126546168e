//! 推論シーケンサ
//!
//! RTL 上位モジュールの start / done ハンドシェイクをステップ単位で再現する。
//! `step` を外部クロック1回につき1回呼ぶ。
//!
//! ```text
//!          start                     (無条件)              (無条件)
//! IDLE ───────────→ COMPUTE_GEN ───────────→ COMPUTE_DISC ───────────→ DONE_STATE
//!  ↑  Generator 評価・ラッチ      Discriminator 評価・ラッチ      done = 1  │
//!  └──────────────────────────── !start ─────────────────────────────────────┘
//! ```
//!
//! - start を受理したステップから数えて 2 ステップ後に done がアサートされる
//! - DONE_STATE は start が保持されている間とどまり、解放された次のステップで IDLE に戻る
//! - IDLE 以外での start は無視する（ノイズ入力も読まない）

use crate::constants::{IMG_SIZE, LATENT_DIM};
use crate::fixed::Q15;
use crate::network::GanModel;
use log::debug;
use serde::Serialize;
use std::fmt;

/// シーケンサの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SequencerState {
    #[default]
    Idle,
    ComputeGen,
    ComputeDisc,
    Done,
}

impl SequencerState {
    /// RTL の状態名
    pub const fn name(self) -> &'static str {
        match self {
            SequencerState::Idle => "IDLE",
            SequencerState::ComputeGen => "COMPUTE_GEN",
            SequencerState::ComputeDisc => "COMPUTE_DISC",
            SequencerState::Done => "DONE_STATE",
        }
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 1ステップ後の出力（レジスタ値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequencerOutput {
    /// 通算ステップ数（このステップを含む）
    pub step: u64,
    pub state: SequencerState,
    pub done: bool,
    /// ラッチ済みの生成画像
    pub image: [Q15; IMG_SIZE],
    /// ラッチ済みの判定確率
    pub probability: Q15,
}

/// 推論シーケンサ
#[derive(Debug, Clone, Default)]
pub struct InferenceSequencer {
    state: SequencerState,
    image: [Q15; IMG_SIZE],
    probability: Q15,
    steps: u64,
}

impl InferenceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// リセット（IDLE、ラッチをゼロクリア）
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// done 出力
    pub fn done(&self) -> bool {
        self.state == SequencerState::Done
    }

    pub fn image(&self) -> [Q15; IMG_SIZE] {
        self.image
    }

    pub fn probability(&self) -> Q15 {
        self.probability
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// 1ステップ進める
    ///
    /// `noise` は IDLE で start を受理したステップでのみ読まれる。
    pub fn step(
        &mut self,
        model: &GanModel,
        start: bool,
        noise: [Q15; LATENT_DIM],
    ) -> SequencerOutput {
        let next = match self.state {
            SequencerState::Idle if start => {
                self.image = model.generate(noise);
                SequencerState::ComputeGen
            }
            SequencerState::Idle => SequencerState::Idle,
            SequencerState::ComputeGen => {
                self.probability = model.discriminate(self.image);
                SequencerState::ComputeDisc
            }
            SequencerState::ComputeDisc => SequencerState::Done,
            SequencerState::Done if start => SequencerState::Done,
            SequencerState::Done => SequencerState::Idle,
        };

        self.steps += 1;
        if next != self.state {
            debug!("[seq] step {}: {} -> {}", self.steps, self.state, next);
        }
        self.state = next;
        self.output()
    }

    /// 現在のレジスタ値
    pub fn output(&self) -> SequencerOutput {
        SequencerOutput {
            step: self.steps,
            state: self.state,
            done: self.done(),
            image: self.image,
            probability: self.probability,
        }
    }
}
