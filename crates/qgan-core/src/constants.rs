//! 定数定義
//!
//! ネットワーク次元と Q1.15 の定数。

// =============================================================================
// 次元定義
// =============================================================================

/// 潜在ベクトル（ノイズ）の次元
pub const LATENT_DIM: usize = 2;

/// Generator 隠れ層の次元
pub const G_HIDDEN: usize = 3;

/// 画像の一辺
pub const IMG_SIDE: usize = 3;

/// 画像の要素数（3x3 = 9）
pub const IMG_SIZE: usize = IMG_SIDE * IMG_SIDE;

/// Discriminator 隠れ層の次元
pub const D_HIDDEN: usize = 3;

/// Discriminator 出力次元
pub const D_OUT: usize = 1;

// =============================================================================
// Q1.15
// =============================================================================

/// 小数部のビット数
pub const FRAC_BITS: u32 = 15;

/// スケール（2^15）
pub const Q15_SCALE: f64 = 32768.0;

/// 実数に変換できる最大値（0x7FFF / 32768）
pub const Q15_MAX_REAL: f64 = 0.999969482421875;

/// 0.5
pub const Q15_HALF: i16 = 0x4000;

// =============================================================================
// 活性化関数の境界値
// =============================================================================

/// tanh 飽和領域の閾値（≈ 0.9）
pub const TANH_SAT_THRESHOLD: u16 = 0x7333;

/// tanh 飽和領域の出力（≈ 0.99）
pub const TANH_SAT_OUT: i16 = 0x7EC8;

/// tanh 中間領域の閾値（0.5）
pub const TANH_MID_THRESHOLD: u16 = 0x4000;

/// tanh 中間領域の出力（≈ 0.8）
pub const TANH_MID_OUT: i16 = 0x6666;

/// sigmoid の下側クランプ出力（0.25）
pub const SIGMOID_LOW_OUT: i16 = 0x2000;

/// sigmoid の上側クランプ出力（0.75）
pub const SIGMOID_HIGH_OUT: i16 = 0x6000;

/// sigmoid の線形領域の境界（±0.5）
pub const SIGMOID_EDGE: i16 = 0x4000;

/// leaky ReLU の負側シフト量（/8）
pub const LEAKY_SHIFT: u32 = 3;

// =============================================================================
// シーケンサ
// =============================================================================

/// start 受理から done アサートまでのステップ数
pub const SEQUENCER_LATENCY: u32 = 2;
