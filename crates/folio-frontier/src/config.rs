//! 합성기 설정.

use serde::{Deserialize, Serialize};

use folio_core::{FolioError, FolioResult};

/// 프런티어 합성 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// 목표 합성 포인트 수 (기본값: 100)
    #[serde(default = "default_target_population")]
    pub target_population: usize,

    /// 시도 횟수 상한 배수 (기본값: 3)
    /// 수락 실패가 이어져도 `target_population × 이 값` 시도 후에는
    /// 반드시 종료합니다
    #[serde(default = "default_max_attempts_factor")]
    pub max_attempts_factor: usize,

    /// 극단 전략에서 의도적으로 나쁜 포인트를 만들 확률 (기본값: 0.2)
    #[serde(default = "default_bad_point_probability")]
    pub bad_point_probability: f64,

    /// 무위험 수익률 (%) 재정의. 없으면 페이로드의 값을 사용합니다
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_free_rate_pct: Option<f64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            target_population: default_target_population(),
            max_attempts_factor: default_max_attempts_factor(),
            bad_point_probability: default_bad_point_probability(),
            risk_free_rate_pct: None,
        }
    }
}

impl SynthesisConfig {
    /// 설정값을 검증합니다.
    pub fn validate(&self) -> FolioResult<()> {
        if self.max_attempts_factor < 1 {
            return Err(FolioError::InvalidInput(
                "max_attempts_factor는 1 이상이어야 함".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.bad_point_probability) {
            return Err(FolioError::InvalidInput(format!(
                "bad_point_probability 범위 초과: {}",
                self.bad_point_probability
            )));
        }
        if let Some(rf) = self.risk_free_rate_pct {
            if !rf.is_finite() {
                return Err(FolioError::InvalidInput(
                    "risk_free_rate_pct에 비유한 값".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// 기본값 함수들
fn default_target_population() -> usize {
    100
}

fn default_max_attempts_factor() -> usize {
    3
}

fn default_bad_point_probability() -> f64 {
    0.2
}
