//! GAN 推論ツール
//!
//! Q1.15 パラメータを読み込み、ノイズベクトルごとに生成画像と判定結果を出力する。
//!
//! 使用例:
//! ```bash
//! # hex パラメータ + サンプル入力
//! cargo run --release -p tools --bin gan_infer -- \
//!   --params parameters/hex --samples parameters/hex
//!
//! # JSON パラメータ + 明示ノイズ + シーケンサトレース
//! cargo run --release -p tools --bin gan_infer -- \
//!   --params-json gan_parameters_q15.json --noise 0x4000,0x4000 --noise=-0.5,0.25 --cosim
//!
//! # 乱数ノイズを JSON Lines で
//! cargo run --release -p tools --bin gan_infer -- --params parameters/hex --random 100 --json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use qgan_core::constants::LATENT_DIM;
use qgan_core::params::hex::{noise_sample_files, read_noise_file};
use qgan_core::{Accumulation, GanModel, Q15, Verdict};
use tools::common::io::create_output;
use tools::config::InferConfig;
use tools::noise::{parse_noise, NoiseSampler};
use tools::report::{cosim_result, cosim_trace, InferenceRecord};

#[derive(Parser, Debug)]
#[command(name = "gan_infer")]
#[command(about = "Q1.15 固定小数点 GAN 推論を実行する")]
struct Cli {
    /// 設定ファイル（TOML）。以下の引数で上書きされる
    #[arg(long)]
    config: Option<PathBuf>,

    /// `<Name>_q15.hex` を含むディレクトリ
    #[arg(long, conflicts_with = "params_json")]
    params: Option<PathBuf>,

    /// JSON パラメータファイル
    #[arg(long)]
    params_json: Option<PathBuf>,

    /// ノイズベクトル（`0x4000,0xC000` / `0.5,-0.5`、複数指定可）
    #[arg(long, allow_hyphen_values = true)]
    noise: Vec<String>,

    /// `input_sample_NN_q15.hex` を含むディレクトリ
    #[arg(long)]
    samples: Option<PathBuf>,

    /// 正規乱数ノイズの本数
    #[arg(long)]
    random: Option<usize>,

    /// 乱数シード
    #[arg(long)]
    seed: Option<u64>,

    /// JSON Lines で出力
    #[arg(long)]
    json: bool,

    /// シーケンサのステップトレースを出力
    #[arg(long)]
    cosim: bool,

    /// 隠れ層の値も出力
    #[arg(long)]
    hidden: bool,

    /// 飽和加算で累積（RTL とは一致しない）
    #[arg(long)]
    saturating: bool,

    /// 出力先（`-` で stdout、`.gz` で圧縮）
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// デバッグログを出力
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tools::init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let model = load_model(&config)?;
    let inputs = collect_noise(&config)?;
    info!("{} noise vector(s)", inputs.len());

    let mut out = create_output(&cli.output)
        .with_context(|| format!("出力を開けません: {}", cli.output.display()))?;
    let mut real = 0usize;
    for (source, noise) in &inputs {
        let record = evaluate(&model, &config, source, *noise)?;
        if record.verdict == Verdict::Real {
            real += 1;
        }
        if config.json {
            serde_json::to_writer(&mut out, &record)?;
            writeln!(out)?;
        } else {
            write!(out, "{}", record.to_text())?;
        }
    }
    out.finish()?;

    eprintln!("推論数: {}  REAL: {}  FAKE: {}", inputs.len(), real, inputs.len() - real);
    Ok(())
}

/// 設定ファイルを読み、コマンドライン引数で上書きする
fn resolve_config(cli: &Cli) -> Result<InferConfig> {
    let mut config = match &cli.config {
        Some(path) => InferConfig::from_file(path)?,
        None => InferConfig::default(),
    };
    if let Some(dir) = &cli.params {
        config.params_dir = Some(dir.clone());
        config.params_json = None;
    }
    if let Some(path) = &cli.params_json {
        config.params_json = Some(path.clone());
    }
    if !cli.noise.is_empty() {
        config.noise = cli.noise.clone();
    }
    if let Some(dir) = &cli.samples {
        config.samples_dir = Some(dir.clone());
    }
    if let Some(n) = cli.random {
        config.random = n;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.json |= cli.json;
    config.cosim |= cli.cosim;
    config.hidden |= cli.hidden;
    config.saturating |= cli.saturating;
    Ok(config)
}

fn load_model(config: &InferConfig) -> Result<GanModel> {
    let model = match (&config.params_json, &config.params_dir) {
        (Some(path), _) => GanModel::load_json(path)
            .with_context(|| format!("パラメータを読めません: {}", path.display()))?,
        (None, Some(dir)) => GanModel::load_hex_dir(dir)
            .with_context(|| format!("パラメータを読めません: {}", dir.display()))?,
        (None, None) => bail!("パラメータを --params または --params-json で指定してください"),
    };
    if config.saturating {
        warn!("saturating accumulation enabled; outputs will not match the RTL");
        return Ok(model.with_accumulation(Accumulation::Saturating));
    }
    Ok(model)
}

fn collect_noise(config: &InferConfig) -> Result<Vec<(String, [Q15; LATENT_DIM])>> {
    let mut inputs = Vec::new();
    for (i, text) in config.noise.iter().enumerate() {
        inputs.push((format!("noise#{i}"), parse_noise(text)?));
    }
    if let Some(dir) = &config.samples_dir {
        let files = noise_sample_files(dir)
            .with_context(|| format!("サンプルディレクトリを読めません: {}", dir.display()))?;
        if files.is_empty() {
            warn!("no input_sample_*_q15.hex in {}", dir.display());
        }
        for path in files {
            let noise = read_noise_file(&path)
                .with_context(|| format!("サンプルを読めません: {}", path.display()))?;
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            inputs.push((name.unwrap_or_default(), noise));
        }
    }
    let mut sampler = NoiseSampler::new(config.seed);
    for i in 0..config.random {
        inputs.push((format!("random#{i}"), sampler.next_noise()));
    }
    if inputs.is_empty() {
        bail!("ノイズを --noise / --samples / --random のいずれかで指定してください");
    }
    Ok(inputs)
}

fn evaluate(
    model: &GanModel,
    config: &InferConfig,
    source: &str,
    noise: [Q15; LATENT_DIM],
) -> Result<InferenceRecord> {
    let session = model.infer(noise);
    let mut record = if config.hidden {
        InferenceRecord::from_session(source, &session)
    } else {
        InferenceRecord::new(source, noise, session.result())
    };
    if config.cosim {
        let steps = cosim_trace(model, noise);
        if cosim_result(&steps) != Some(session.result()) {
            bail!("シーケンサ出力が直接評価と一致しません: {source}");
        }
        record = record.with_steps(steps);
    }
    Ok(record)
}
