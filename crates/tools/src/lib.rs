//! qgan-core 用のコマンドラインツール群
//!
//! - `gan_infer`: パラメータを読み込んで推論を実行（co-simulation トレース出力付き）
//! - `convert_params_to_hex`: 10進テキストのパラメータを Q1.15 hex / JSON に変換

pub mod common;
pub mod config;
pub mod noise;
pub mod report;

use std::io::Write;

/// env_logger を初期化する
///
/// RUST_LOG が設定されていればそれを優先する。
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();
}
