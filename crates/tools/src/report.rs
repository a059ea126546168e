//! 推論結果の整形と co-simulation トレース

use qgan_core::constants::{IMG_SIDE, IMG_SIZE, LATENT_DIM};
use qgan_core::{
    GanModel, InferenceResult, InferenceSequencer, InferenceSession, Q15, SequencerOutput,
    Verdict,
};
use serde::Serialize;
use std::fmt::Write;

/// start 保持の上限ステップ数
const MAX_COSIM_STEPS: usize = 16;

/// 1本のノイズに対する出力レコード（JSON Lines の1行）
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRecord {
    /// ノイズの出所（ファイル名、`cli`、`random#N`）
    pub source: String,
    pub noise: [Q15; LATENT_DIM],
    pub image: [Q15; IMG_SIZE],
    pub probability: Q15,
    /// 実数換算した確率
    pub probability_real: f64,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<HiddenValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<SequencerOutput>>,
}

/// 隠れ層の値
#[derive(Debug, Clone, Serialize)]
pub struct HiddenValues {
    pub generator: Vec<Q15>,
    pub discriminator: Vec<Q15>,
}

impl InferenceRecord {
    pub fn new(
        source: impl Into<String>,
        noise: [Q15; LATENT_DIM],
        result: InferenceResult,
    ) -> Self {
        Self {
            source: source.into(),
            noise,
            image: result.image,
            probability: result.probability,
            probability_real: result.probability.to_real(),
            verdict: result.verdict(),
            hidden: None,
            steps: None,
        }
    }

    /// 直接評価の中間値から作る
    pub fn from_session(source: impl Into<String>, session: &InferenceSession) -> Self {
        let mut record = Self::new(source, session.noise, session.result());
        record.hidden = Some(HiddenValues {
            generator: session.generator.hidden.to_vec(),
            discriminator: session.discriminator.hidden.to_vec(),
        });
        record
    }

    pub fn with_steps(mut self, steps: Vec<SequencerOutput>) -> Self {
        self.steps = Some(steps);
        self
    }

    /// テキスト形式
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "[{}] noise = [{}, {}] ({:+.5}, {:+.5})",
            self.source,
            self.noise[0],
            self.noise[1],
            self.noise[0].to_real(),
            self.noise[1].to_real()
        );
        if let Some(steps) = &self.steps {
            for step in steps {
                let _ = writeln!(out, "  {}", format_step(step));
            }
        }
        if let Some(hidden) = &self.hidden {
            let _ = writeln!(out, "  G hidden: {}", join_words(&hidden.generator));
            let _ = writeln!(out, "  D hidden: {}", join_words(&hidden.discriminator));
        }
        let _ = writeln!(out, "  image:");
        for row in self.image.chunks_exact(IMG_SIDE) {
            let _ = writeln!(out, "    {}", join_words(row));
        }
        let _ = writeln!(
            out,
            "  P(real) = {} ({:.5})  => {}",
            self.probability, self.probability_real, self.verdict
        );
        out
    }
}

fn join_words(values: &[Q15]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// シーケンサ1ステップ分の表示
pub fn format_step(out: &SequencerOutput) -> String {
    format!(
        "step {:>3}  {:<12} done={}  prob={}",
        out.step,
        out.state.name(),
        u8::from(out.done),
        out.probability
    )
}

/// テストベンチと同じ手順でシーケンサを駆動し、全ステップの出力を返す
///
/// 1ステップ IDLE → start 保持で done まで → start 解放で IDLE に戻るまで。
pub fn cosim_trace(model: &GanModel, noise: [Q15; LATENT_DIM]) -> Vec<SequencerOutput> {
    let mut seq = InferenceSequencer::new();
    let mut steps = vec![seq.step(model, false, noise)];
    for _ in 0..MAX_COSIM_STEPS {
        let out = seq.step(model, true, noise);
        steps.push(out);
        if out.done {
            break;
        }
    }
    steps.push(seq.step(model, false, noise));
    steps
}

/// トレースの最後の done 時点の結果
pub fn cosim_result(steps: &[SequencerOutput]) -> Option<InferenceResult> {
    steps.iter().rev().find(|s| s.done).map(|s| InferenceResult {
        image: s.image,
        probability: s.probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qgan_core::{ParameterSet, SequencerState};

    fn model() -> GanModel {
        let mut params = ParameterSet::zeros();
        params.generator.bg3 = vec![Q15::from_bits(0x1000); 9];
        params.discriminator.bd3 = vec![Q15::from_bits(0x2000)];
        GanModel::from_params(&params).unwrap()
    }

    #[test]
    fn test_cosim_trace_shape() {
        let model = model();
        let steps = cosim_trace(&model, [Q15::ZERO; 2]);
        let states: Vec<_> = steps.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                SequencerState::Idle,
                SequencerState::ComputeGen,
                SequencerState::ComputeDisc,
                SequencerState::Done,
                SequencerState::Idle,
            ]
        );
        let result = cosim_result(&steps).unwrap();
        assert_eq!(result, qgan_core::run_inference(&model, [Q15::ZERO; 2]));
    }

    #[test]
    fn test_text_output() {
        let model = model();
        let noise = [Q15::ZERO; 2];
        let record = InferenceRecord::new("cli", noise, model.run_inference(noise));
        let text = record.to_text();
        assert!(text.contains("0x1000 0x1000 0x1000"));
        assert!(text.contains("P(real) = 0x5000"));
        assert!(text.contains("REAL"));
    }

    #[test]
    fn test_json_record() {
        let model = model();
        let noise = [Q15::ZERO; 2];
        let record = InferenceRecord::from_session("cli", &model.infer(noise));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["probability"], 0x5000);
        assert_eq!(value["verdict"], "Real");
        assert_eq!(value["image"][0], 0x1000);
        assert!(value.get("steps").is_none());
        assert_eq!(value["hidden"]["discriminator"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_format_step() {
        let model = model();
        let steps = cosim_trace(&model, [Q15::ZERO; 2]);
        assert_eq!(format_step(&steps[3]), "step   4  DONE_STATE   done=1  prob=0x5000");
    }
}
