//! パラメータ変換ツール
//!
//! 学習側が出力した10進テキスト（`Wg2.txt` など）を Q1.15 hex に変換する。
//! 値は [-1.0, 0.999969482421875] にクランプしてから 2^15 倍し、偶数丸めする。
//!
//! 使用例:
//! ```bash
//! cargo run --release -p tools --bin convert_params_to_hex -- \
//!   --input parameters --output parameters/hex --json parameters/gan_parameters_q15.json
//!
//! # サンプル入力も生成（正規乱数、シード固定）
//! cargo run --release -p tools --bin convert_params_to_hex -- \
//!   --input parameters --output parameters/hex --generate-samples 10 --seed 42
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use qgan_core::params::hex::{write_hex_file, NOISE_SAMPLE_PREFIX};
use qgan_core::params::text::{parse_decimal_values, quantize};
use qgan_core::params::{hex_path, HEX_SUFFIX, PARAM_SHAPES};
use qgan_core::{ParameterSet, Q15};
use tools::common::io::{create_output, find_text_input, open_reader};
use tools::config::DEFAULT_SEED;
use tools::noise::NoiseSampler;

#[derive(Parser, Debug)]
#[command(name = "convert_params_to_hex")]
#[command(about = "10進テキストのパラメータを Q1.15 hex ファイルに変換する")]
struct Cli {
    /// `Wg2.txt` などを含むディレクトリ（`.txt.gz` も可）
    #[arg(long)]
    input: PathBuf,

    /// hex 出力ディレクトリ
    #[arg(long)]
    output: PathBuf,

    /// 8配列をまとめた JSON も出力する
    #[arg(long)]
    json: Option<PathBuf>,

    /// 変換対象とするサンプル入力の数（`input_sample_00.txt` から）
    #[arg(long, default_value_t = 10)]
    samples: usize,

    /// 正規乱数のサンプル入力を生成して出力ディレクトリに書く
    #[arg(long)]
    generate_samples: Option<usize>,

    /// サンプル生成の乱数シード
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// デバッグログを出力
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tools::init_logging(cli.verbose);

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("出力ディレクトリを作れません: {}", cli.output.display()))?;

    let mut set = ParameterSet::default();
    let mut converted = 0usize;
    for (name, expected) in PARAM_SHAPES {
        let Some(path) = find_text_input(&cli.input, name) else {
            warn!("{}/{name}.txt not found, skipping", cli.input.display());
            continue;
        };
        let values = convert_file(&path, &hex_path(&cli.output, name))?;
        if values.len() != expected {
            warn!("{name}: expected {expected} values, got {}", values.len());
        }
        if let Some(slot) = set.get_mut(name) {
            *slot = values;
        }
        converted += 1;
    }

    for i in 0..cli.samples {
        let stem = sample_stem(i);
        match find_text_input(&cli.input, &stem) {
            Some(path) => {
                let values = convert_file(&path, &cli.output.join(format!("{stem}{HEX_SUFFIX}")))?;
                if values.len() != 2 {
                    warn!("{stem}: expected 2 values, got {}", values.len());
                }
                converted += 1;
            }
            None => debug!("{stem} not found"),
        }
    }

    if let Some(count) = cli.generate_samples {
        generate_samples(&cli.output, count, cli.seed)?;
        eprintln!("サンプル入力を {count} 件生成しました (seed={})", cli.seed);
    }

    if let Some(json) = &cli.json {
        set.validate().context("JSON 出力には8配列すべてが正しい要素数で必要です")?;
        set.save_json(json)
            .with_context(|| format!("JSON を書けません: {}", json.display()))?;
        eprintln!("JSON: {}", json.display());
    }

    eprintln!("変換ファイル数: {converted}  出力先: {}", cli.output.display());
    Ok(())
}

fn sample_stem(index: usize) -> String {
    format!("{NOISE_SAMPLE_PREFIX}{index:02}")
}

/// 1ファイルを変換して書き出し、量子化した値を返す
fn convert_file(input: &Path, output: &Path) -> Result<Vec<Q15>> {
    let reader =
        open_reader(input).with_context(|| format!("入力を開けません: {}", input.display()))?;
    let values = parse_decimal_values(reader, &input.display().to_string())
        .with_context(|| format!("入力を読めません: {}", input.display()))?;
    let words = quantize(&values);
    write_hex_file(output, &words)
        .with_context(|| format!("出力を書けません: {}", output.display()))?;
    info!("Converted {} -> {} ({} values)", input.display(), output.display(), words.len());
    Ok(words)
}

/// `input_sample_NN.txt`（実数）と `input_sample_NN_q15.hex` を生成
fn generate_samples(dir: &Path, count: usize, seed: u64) -> Result<()> {
    let mut sampler = NoiseSampler::new(seed);
    for i in 0..count {
        let values = sampler.next_gaussian_pair();
        let stem = sample_stem(i);

        let txt = dir.join(format!("{stem}.txt"));
        let mut w = create_output(&txt)?;
        for v in values {
            writeln!(w, "{v:.8}")?;
        }
        w.finish()?;

        write_hex_file(dir.join(format!("{stem}{HEX_SUFFIX}")), &quantize(&values))?;
        debug!("generated {stem}: {values:?}");
    }
    Ok(())
}
