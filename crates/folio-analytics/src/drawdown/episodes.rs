//! 역사적 최악 에피소드 랭킹.
//!
//! 워크를 한 번 순회하며 국소 고점 기준으로 구분되는 에피소드를
//! 수집하고, 낙폭이 깊은 순으로 상위 N개를 랭킹합니다.
//!
//! 단일 최악 에피소드 추출([`super::walk`])과는 독립적인 상태
//! 기계이며, 경계 허용치가 다르므로 두 결과의 1위가 미세하게
//! 다를 수 있습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::walk::DrawdownWalk;
use super::{EPISODE_MATERIALITY_PCT, NEW_PEAK_TRIGGER};

/// 기본 랭킹 개수.
pub const DEFAULT_EPISODE_COUNT: usize = 3;

/// 랭킹된 드로다운 에피소드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// 랭크 (1 = 가장 깊은 낙폭)
    pub rank: usize,
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
    /// 에피소드 길이 (포인트 수)
    pub duration_points: usize,
    /// 고점에서 회복까지의 일수 (미회복이면 None)
    pub recovery_days: Option<i64>,
}

/// 진행 중인 에피소드의 작업 상태.
struct OpenEpisode {
    peak_index: usize,
    peak_value: f64,
    trough_index: usize,
    trough_drawdown_pct: f64,
}

impl OpenEpisode {
    /// 회복 인덱스(또는 시계열 끝)를 받아 확정 레코드로 변환합니다.
    fn close(self, walk: &DrawdownWalk, recovery_index: Option<usize>) -> DrawdownEpisode {
        let points = walk.points();
        let peak = &points[self.peak_index];
        let trough = &points[self.trough_index];
        let end_index = recovery_index.unwrap_or(points.len() - 1);

        DrawdownEpisode {
            rank: 0,
            peak_index: self.peak_index,
            peak_date: peak.date,
            peak_value: peak.value,
            trough_index: self.trough_index,
            trough_date: trough.date,
            trough_value: trough.value,
            max_drawdown_pct: self.trough_drawdown_pct,
            recovery_index,
            recovery_date: recovery_index.map(|i| points[i].date),
            recovered: recovery_index.is_some(),
            duration_points: end_index - self.peak_index + 1,
            recovery_days: recovery_index.map(|i| (points[i].date - peak.date).num_days()),
        }
    }
}

/// 역사적으로 구분되는 최악 에피소드 상위 `n`개를 랭킹합니다.
///
/// 에피소드 구분 규칙:
/// - 국소 고점 대비 낙폭이 -1%를 넘어서면 에피소드가 열립니다.
/// - 가치가 직전 국소 고점의 1.001배를 넘으면 회복으로 보고
///   열려 있던 에피소드를 마감합니다.
/// - 시계열이 끝나면 열려 있던 에피소드는 미회복 상태로
///   마감합니다.
///
/// 반환 목록은 낙폭이 깊은 순(가장 음수 먼저)이며 `rank`가
/// 1부터 부여됩니다. 자격을 갖춘 에피소드가 `n`개 미만이면 있는
/// 만큼만 반환합니다.
pub fn rank_worst_episodes(walk: &DrawdownWalk, n: usize) -> Vec<DrawdownEpisode> {
    let points = walk.points();
    let mut episodes: Vec<DrawdownEpisode> = Vec::new();

    let mut local_peak = points[0].value;
    let mut local_peak_index = 0usize;
    let mut state: Option<OpenEpisode> = None;

    for (i, p) in points.iter().enumerate() {
        if p.value > local_peak * NEW_PEAK_TRIGGER {
            // 새 국소 고점: 열린 에피소드가 있으면 여기서 회복 마감
            if let Some(open) = state.take() {
                if open.trough_drawdown_pct < EPISODE_MATERIALITY_PCT {
                    episodes.push(open.close(walk, Some(i)));
                }
            }
            local_peak = p.value;
            local_peak_index = i;
            continue;
        }

        if state.is_none() {
            // 트리거에 못 미치는 소폭 갱신도 고점 추적에는 반영
            if p.value > local_peak {
                local_peak = p.value;
                local_peak_index = i;
            }

            let dd = if local_peak > 0.0 {
                (p.value / local_peak - 1.0) * 100.0
            } else {
                0.0
            };
            if dd < EPISODE_MATERIALITY_PCT {
                state = Some(OpenEpisode {
                    peak_index: local_peak_index,
                    peak_value: local_peak,
                    trough_index: i,
                    trough_drawdown_pct: dd,
                });
            }
        } else if let Some(open) = state.as_mut() {
            let dd = if open.peak_value > 0.0 {
                (p.value / open.peak_value - 1.0) * 100.0
            } else {
                0.0
            };
            if dd < open.trough_drawdown_pct {
                open.trough_index = i;
                open.trough_drawdown_pct = dd;
            }
        }
    }

    // 시계열 끝: 열린 에피소드는 미회복으로 마감
    if let Some(open) = state.take() {
        if open.trough_drawdown_pct < EPISODE_MATERIALITY_PCT {
            episodes.push(open.close(walk, None));
        }
    }

    debug!(total = episodes.len(), requested = n, "에피소드 랭킹 완료");

    episodes.sort_by(|a, b| {
        a.max_drawdown_pct
            .partial_cmp(&b.max_drawdown_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    episodes.truncate(n);
    for (rank, ep) in episodes.iter_mut().enumerate() {
        ep.rank = rank + 1;
    }
    episodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::EquityPoint;

    fn walk(values: &[f64]) -> DrawdownWalk {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<EquityPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| EquityPoint::new(start + chrono::Duration::days(i as i64), *v))
            .collect();
        DrawdownWalk::from_points(&points).unwrap()
    }

    #[test]
    fn test_two_distinct_episodes() {
        // 두 개의 구분되는 V자 드로다운
        let w = walk(&[100.0, 80.0, 101.0, 105.0, 90.0, 106.0]);
        let episodes = rank_worst_episodes(&w, 3);

        assert_eq!(episodes.len(), 2);
        // 랭크 1 = 가장 깊은 낙폭 (-20%)
        assert_eq!(episodes[0].rank, 1);
        assert!((episodes[0].max_drawdown_pct - (-20.0)).abs() < 1e-9);
        assert_eq!(episodes[0].trough_index, 1);
        assert!(episodes[0].recovered);
        assert_eq!(episodes[0].recovery_index, Some(2));

        assert_eq!(episodes[1].rank, 2);
        assert_eq!(episodes[1].trough_index, 4);
        assert!(episodes[1].recovered);
    }

    #[test]
    fn test_shallow_dip_not_counted() {
        // -1%보다 얕은 하락은 에피소드가 아님
        let w = walk(&[100.0, 99.5, 100.2, 100.5]);
        assert!(rank_worst_episodes(&w, 3).is_empty());
    }

    #[test]
    fn test_unrecovered_tail_episode() {
        let w = walk(&[100.0, 105.0, 90.0, 92.0]);
        let episodes = rank_worst_episodes(&w, 3);

        assert_eq!(episodes.len(), 1);
        assert!(!episodes[0].recovered);
        assert!(episodes[0].recovery_days.is_none());
        assert_eq!(episodes[0].peak_index, 1);
        // 끝까지의 포인트 수
        assert_eq!(episodes[0].duration_points, 3);
    }

    #[test]
    fn test_small_bounce_does_not_split_episode() {
        // 저점 사이의 미미한 반등(< 0.1%)으로는 에피소드가 갈라지지 않음
        let w = walk(&[100.0, 90.0, 90.05, 85.0, 101.0]);
        let episodes = rank_worst_episodes(&w, 3);

        assert_eq!(episodes.len(), 1);
        assert!((episodes[0].max_drawdown_pct - (-15.0)).abs() < 1e-9);
    }

    #[test]
    fn test_truncation_and_ranks() {
        // 깊이가 다른 세 에피소드, 상위 2개만 요청
        let w = walk(&[
            100.0, 95.0, 101.0, 102.0, 80.0, 103.0, 104.0, 90.0, 105.0,
        ]);
        let episodes = rank_worst_episodes(&w, 2);

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].rank, 1);
        assert_eq!(episodes[1].rank, 2);
        assert!(episodes[0].max_drawdown_pct <= episodes[1].max_drawdown_pct);
        // 가장 깊은 건 102 → 80 구간
        assert_eq!(episodes[0].trough_index, 4);
    }

    #[test]
    fn test_monotonic_rise_has_no_episodes() {
        let w = walk(&[100.0, 102.0, 104.0, 108.0]);
        assert!(rank_worst_episodes(&w, 3).is_empty());
    }
}
