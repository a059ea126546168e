//! ノイズベクトルの解析と生成

use anyhow::{bail, Context, Result};
use qgan_core::constants::LATENT_DIM;
use qgan_core::Q15;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// `"0x4000,0xC000"` / `"-0x4000,0x1000"` / `"0.5,-0.25"` 形式のノイズを解析
///
/// `0x` 付きは 16bit ワード（2の補数）、それ以外は実数として Q1.15 に変換する。
pub fn parse_noise(text: &str) -> Result<[Q15; LATENT_DIM]> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != LATENT_DIM {
        bail!("ノイズは{LATENT_DIM}要素で指定してください: {text:?}");
    }
    let mut noise = [Q15::ZERO; LATENT_DIM];
    for (slot, part) in noise.iter_mut().zip(parts) {
        *slot = parse_component(part).with_context(|| format!("ノイズの解析に失敗: {text:?}"))?;
    }
    Ok(noise)
}

fn parse_component(token: &str) -> Result<Q15> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let word = u16::from_str_radix(hex, 16).with_context(|| format!("不正な16進値: {token}"))?;
        if !negative {
            return Ok(Q15::from_word(word));
        }
        // -0x8000 まで
        if word > 0x8000 {
            bail!("Q1.15 の範囲外: {token}");
        }
        return Ok(Q15::from_bits((-(word as i32)) as i16));
    }
    let value: f64 = token.parse().with_context(|| format!("不正な数値: {token}"))?;
    Ok(Q15::from_real(value))
}

/// シード付き正規乱数ノイズ生成器
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    rng: Xoshiro256PlusPlus,
}

impl NoiseSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// 標準正規分布 N(0, 1) から潜在次元分を引く
    pub fn next_gaussian_pair(&mut self) -> [f64; LATENT_DIM] {
        std::array::from_fn(|_| StandardNormal.sample(&mut self.rng))
    }

    /// Q1.15 ノイズ（範囲外はクランプ）
    pub fn next_noise(&mut self) -> [Q15; LATENT_DIM] {
        self.next_gaussian_pair().map(Q15::from_real)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_decimal() {
        assert_eq!(
            parse_noise("0x4000,0xC000").unwrap(),
            [Q15::from_bits(0x4000), Q15::from_bits(-0x4000)]
        );
        assert_eq!(
            parse_noise("-0x4000, -0x8000").unwrap(),
            [Q15::from_bits(-0x4000), Q15::MIN]
        );
        assert_eq!(parse_noise("0.5,-0.5").unwrap(), [Q15::HALF, Q15::from_bits(-0x4000)]);
        // 実数はクランプ
        assert_eq!(parse_noise("3.0,-3.0").unwrap(), [Q15::MAX, Q15::MIN]);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_noise("0x4000").is_err());
        assert!(parse_noise("0x4000,0x4000,0").is_err());
        assert!(parse_noise("0x10000,0").is_err());
        assert!(parse_noise("-0x8001,0").is_err());
        assert!(parse_noise("abc,0").is_err());
    }

    #[test]
    fn test_sampler_is_deterministic() {
        let mut a = NoiseSampler::new(42);
        let mut b = NoiseSampler::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_noise(), b.next_noise());
        }
        assert_ne!(
            NoiseSampler::new(42).next_gaussian_pair(),
            NoiseSampler::new(43).next_gaussian_pair()
        );
    }

    #[test]
    fn test_gaussian_values_are_finite() {
        let mut sampler = NoiseSampler::new(0);
        for _ in 0..1000 {
            assert!(sampler.next_gaussian_pair().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_gaussian_moments() {
        let mut sampler = NoiseSampler::new(42);
        let draws: Vec<f64> = (0..20_000).flat_map(|_| sampler.next_gaussian_pair()).collect();
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.03, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");

        // |z| > 1 が約 31.7%、Q1.15 変換でクランプされる
        let clamped = draws.iter().filter(|v| v.abs() > 1.0).count() as f64 / n;
        assert!((0.29..0.35).contains(&clamped), "clamped share {clamped}");
    }
}
