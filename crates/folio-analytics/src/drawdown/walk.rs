//! 실행 고점 워크와 단일 최악 에피소드 추출.
//!
//! 자산 곡선을 한 번 순회하며 각 포인트에 실행 고점과 낙폭(%)을
//! 부여합니다. 이 증강 시퀀스가 최악 에피소드 추출과 랭킹 양쪽의
//! 공통 기반입니다.
//!
//! # 낙폭 계산
//!
//! `drawdown% = (value / peak - 1) × 100`, 항상 0 이하입니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use folio_core::{BacktestSummary, EquityPoint, FolioError, FolioResult};

use super::{PEAK_MATCH_TOLERANCE, RECOVERY_TOLERANCE_PCT, SIGNIFICANT_DRAWDOWN_PCT};

/// 실행 고점이 부여된 자산 곡선 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    /// 날짜
    pub date: NaiveDate,
    /// 자산 가치
    pub value: f64,
    /// 이 시점까지의 실행 고점
    pub peak_value: f64,
    /// 실행 고점 대비 낙폭 (%, 항상 ≤ 0)
    pub drawdown_pct: f64,
}

/// 단일 최악 드로다운 에피소드.
///
/// 고점 → 저점 → 회복(또는 시계열 끝)으로 구성됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorstEpisode {
    /// 고점 인덱스
    pub peak_index: usize,
    /// 고점 날짜
    pub peak_date: NaiveDate,
    /// 고점 가치
    pub peak_value: f64,
    /// 저점 인덱스
    pub trough_index: usize,
    /// 저점 날짜
    pub trough_date: NaiveDate,
    /// 저점 가치
    pub trough_value: f64,
    /// 최대 낙폭 (%, 음수)
    pub max_drawdown_pct: f64,
    /// 회복 인덱스 (미회복이면 None)
    pub recovery_index: Option<usize>,
    /// 회복 날짜 (미회복이면 None)
    pub recovery_date: Option<NaiveDate>,
    /// 회복 여부
    pub recovered: bool,
    /// 에피소드 길이 (포인트 수, 고점부터 회복 또는 끝까지)
    pub duration_points: usize,
    /// 고점에서 회복까지의 일수. 미회복이면 고점에서 마지막
    /// 포인트까지의 일수.
    pub recovery_days: i64,
}

impl WorstEpisode {
    /// 백테스트 서비스의 사전 계산 요약과 일치하는지 확인합니다.
    ///
    /// 낙폭은 0.01%p 이내, 날짜는 정확히 일치해야 합니다.
    /// 요약에 해당 필드가 없으면 그 필드는 일치로 간주합니다.
    pub fn matches_summary(&self, summary: &BacktestSummary) -> bool {
        if let Some(md) = summary.max_drawdown {
            if (md - self.max_drawdown_pct).abs() > 0.01 {
                return false;
            }
        }
        if let Some(date) = summary.max_drawdown_date {
            if self.trough_date != date {
                return false;
            }
        }
        if let Some(end) = summary.max_recovery_end_date {
            if self.recovery_date != Some(end) {
                return false;
            }
        }
        if let Some(days) = summary.max_recovery_time_days {
            if days != self.recovery_days {
                return false;
            }
        }
        true
    }
}

/// 호출자가 지정한 에피소드 기술자.
///
/// 랭킹 목록에서 사용자가 고른 에피소드를 같은 워크에 대해
/// 재해석할 때 사용합니다. 랭킹을 다시 계산하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeOverride {
    /// 고점 날짜
    pub peak_date: NaiveDate,
    /// 저점 날짜
    pub trough_date: NaiveDate,
    /// 회복 날짜 (없으면 미회복으로 처리)
    #[serde(default)]
    pub recovery_date: Option<NaiveDate>,
    /// 해당 에피소드의 최대 낙폭 (%). 저점 날짜를 찾지 못할 때
    /// 낙폭이 수치상 가장 가까운 포인트로 대체하는 데 씁니다.
    pub max_drawdown_pct: f64,
}

/// 실행 고점 워크.
///
/// 생성 후에는 불변이며, 최악 에피소드 추출과 랭킹이 모두 이
/// 시퀀스를 읽기 전용으로 사용합니다.
#[derive(Debug, Clone)]
pub struct DrawdownWalk {
    points: Vec<DrawdownPoint>,
}

impl DrawdownWalk {
    /// 자산 곡선에서 워크를 생성합니다.
    ///
    /// # 에러
    ///
    /// - 포인트가 2개 미만이거나 전부 0이면 `InsufficientData`
    /// - 비유한 가치가 포함되어 있으면 `InvalidInput`
    pub fn from_points(points: &[EquityPoint]) -> FolioResult<Self> {
        if points.len() < 2 {
            return Err(FolioError::InsufficientData(format!(
                "포인트 {}개 (최소 2개)",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.value.is_finite()) {
            return Err(FolioError::InvalidInput(
                "자산 가치에 비유한 값 포함".to_string(),
            ));
        }
        if points.iter().all(|p| p.value == 0.0) {
            return Err(FolioError::InsufficientData(
                "모든 자산 가치가 0".to_string(),
            ));
        }

        let mut peak = f64::NEG_INFINITY;
        let walked = points
            .iter()
            .map(|p| {
                if p.value > peak {
                    peak = p.value;
                }
                let drawdown_pct = if peak > 0.0 {
                    (p.value / peak - 1.0) * 100.0
                } else {
                    0.0
                };
                DrawdownPoint {
                    date: p.date,
                    value: p.value,
                    peak_value: peak,
                    drawdown_pct,
                }
            })
            .collect();

        Ok(Self { points: walked })
    }

    /// 증강된 포인트 시퀀스.
    pub fn points(&self) -> &[DrawdownPoint] {
        &self.points
    }

    /// 포인트 수.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 워크가 비어있는지 확인합니다 (생성 규칙상 항상 false).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 단일 최악 에피소드를 추출합니다.
    ///
    /// 요약 레코드가 주어지면 사전 계산된 `max_drawdown`과 낙폭이
    /// 0.001%p 이내로 일치하는 포인트를 저점으로 우선 사용하고,
    /// 없으면 전역 최소 낙폭 포인트를 사용합니다.
    ///
    /// # 에러
    ///
    /// 낙폭 절대값이 0.1% 미만이면 `NoSignificantDrawdown`.
    pub fn worst_episode(&self, summary: Option<&BacktestSummary>) -> FolioResult<WorstEpisode> {
        if let Some(md) = summary.and_then(|s| s.max_drawdown) {
            if md.abs() < SIGNIFICANT_DRAWDOWN_PCT {
                debug!(max_drawdown = md, "요약 기준 유의미한 드로다운 없음");
                return Err(FolioError::NoSignificantDrawdown);
            }
        }

        let trough_index = self.locate_trough(summary);
        let trough = &self.points[trough_index];

        if trough.drawdown_pct.abs() < SIGNIFICANT_DRAWDOWN_PCT {
            debug!(
                drawdown = trough.drawdown_pct,
                "워크 기준 유의미한 드로다운 없음"
            );
            return Err(FolioError::NoSignificantDrawdown);
        }

        let peak_index = self.locate_peak(trough_index);
        let (recovery_index, recovered) = self.locate_recovery(trough_index);

        Ok(self.assemble_episode(peak_index, trough_index, recovery_index, recovered))
    }

    /// 호출자가 지정한 에피소드 기술자를 워크에 대해 재해석합니다.
    ///
    /// - 고점 = 주어진 고점 날짜 이상인 첫 포인트 (없으면 인덱스 0)
    /// - 저점 = 주어진 저점 날짜 이상인 첫 포인트. 없으면 낙폭이
    ///   주어진 `max_drawdown_pct`에 수치상 가장 가까운 포인트.
    /// - 회복 = 회복 날짜가 주어졌으면 저점 이후 그 날짜 이상인 첫
    ///   포인트, 아니면 미회복으로 처리.
    pub fn resolve_override(&self, ov: &EpisodeOverride) -> WorstEpisode {
        let peak_index = self
            .points
            .iter()
            .position(|p| p.date >= ov.peak_date)
            .unwrap_or(0);

        let trough_index = self
            .points
            .iter()
            .position(|p| p.date >= ov.trough_date)
            .unwrap_or_else(|| self.closest_drawdown_index(ov.max_drawdown_pct));

        // 회복 탐색은 저점 이후 구간으로 한정: 저점보다 앞선 회복
        // 날짜가 주어져도 고점 ≤ 저점 ≤ 회복 순서가 유지됩니다.
        let (recovery_index, recovered) = match ov.recovery_date {
            Some(rd) => match self.points[trough_index..]
                .iter()
                .position(|p| p.date >= rd)
            {
                Some(offset) => (Some(trough_index + offset), true),
                None => (None, false),
            },
            None => (None, false),
        };

        self.assemble_episode(peak_index, trough_index, recovery_index, recovered)
    }

    /// 저점 인덱스를 결정합니다.
    fn locate_trough(&self, summary: Option<&BacktestSummary>) -> usize {
        if let Some(md) = summary.and_then(|s| s.max_drawdown) {
            if let Some(idx) = self
                .points
                .iter()
                .position(|p| (p.drawdown_pct - md).abs() < 0.001)
            {
                return idx;
            }
            warn!(
                max_drawdown = md,
                "요약의 낙폭과 일치하는 포인트 없음, 전역 최소값 사용"
            );
        }

        self.global_min_index()
    }

    /// 전역 최소 낙폭(가장 깊은 저점) 인덱스.
    fn global_min_index(&self) -> usize {
        let mut min_index = 0;
        for (i, p) in self.points.iter().enumerate() {
            if p.drawdown_pct < self.points[min_index].drawdown_pct {
                min_index = i;
            }
        }
        min_index
    }

    /// 낙폭이 주어진 값에 수치상 가장 가까운 포인트의 인덱스.
    fn closest_drawdown_index(&self, target_pct: f64) -> usize {
        let mut best = 0;
        let mut best_diff = f64::INFINITY;
        for (i, p) in self.points.iter().enumerate() {
            let diff = (p.drawdown_pct - target_pct).abs();
            if diff < best_diff {
                best_diff = diff;
                best = i;
            }
        }
        best
    }

    /// 저점에서 역방향으로 고점 인덱스를 찾습니다.
    fn locate_peak(&self, trough_index: usize) -> usize {
        let trough_peak = self.points[trough_index].peak_value;
        let mut i = trough_index;
        loop {
            if self.points[i].value >= trough_peak * PEAK_MATCH_TOLERANCE {
                return i;
            }
            if i == 0 {
                return 0;
            }
            i -= 1;
        }
    }

    /// 저점에서 순방향으로 회복 인덱스를 찾습니다.
    fn locate_recovery(&self, trough_index: usize) -> (Option<usize>, bool) {
        for (offset, p) in self.points[trough_index..].iter().enumerate() {
            if p.drawdown_pct >= RECOVERY_TOLERANCE_PCT {
                return (Some(trough_index + offset), true);
            }
        }
        (None, false)
    }

    /// 인덱스들로부터 에피소드 레코드를 조립합니다.
    fn assemble_episode(
        &self,
        peak_index: usize,
        trough_index: usize,
        recovery_index: Option<usize>,
        recovered: bool,
    ) -> WorstEpisode {
        let peak = &self.points[peak_index];
        let trough = &self.points[trough_index];
        let last_index = self.points.len() - 1;

        let end_index = recovery_index.unwrap_or(last_index);
        let end_date = self.points[end_index].date;
        let recovery_days = (end_date - peak.date).num_days();

        WorstEpisode {
            peak_index,
            peak_date: peak.date,
            peak_value: peak.value,
            trough_index,
            trough_date: trough.date,
            trough_value: trough.value,
            max_drawdown_pct: trough.drawdown_pct,
            recovery_index: if recovered { recovery_index } else { None },
            recovery_date: if recovered {
                recovery_index.map(|i| self.points[i].date)
            } else {
                None
            },
            recovered,
            duration_points: end_index - peak_index + 1,
            recovery_days,
        }
    }
}
