//! 차트 보조 유틸리티.
//!
//! 축 눈금 생성과 시계열 다운샘플링. 렌더링 자체는 상위 계층의
//! 책임이며, 여기서는 숫자만 다룹니다.

use tracing::trace;

/// 기본 눈금 개수.
pub const DEFAULT_TICK_COUNT: usize = 6;

/// 차트에 전달하는 최대 포인트 수.
pub const MAX_CHART_POINTS: usize = 300;

/// "보기 좋은" 축 눈금을 생성합니다.
///
/// 원시 간격을 10의 거듭제곱 × {1, 2, 5, 10} 중 가장 가까운 값으로
/// 올림하고, 그 간격의 배수로 [min, max]를 덮는 눈금을 만듭니다.
/// 각 눈금은 소수점 2자리로 반올림합니다.
///
/// # 엣지 케이스
///
/// - 비유한 입력 → 빈 벡터
/// - `min == max` → `[v-1, v, v+1]`
/// - 간격 올림으로 눈금이 3개 미만이 되면 원시 간격의 균등 분할로
///   대체합니다.
pub fn nice_ticks(min: f64, max: f64, desired_count: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || desired_count < 2 {
        return Vec::new();
    }
    if min == max {
        return vec![round2(min - 1.0), round2(min), round2(min + 1.0)];
    }
    let (min, max) = if min < max { (min, max) } else { (max, min) };

    let raw_step = (max - min) / (desired_count - 1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let step = if residual >= 5.0 {
        10.0
    } else if residual >= 2.0 {
        5.0
    } else if residual >= 1.0 {
        2.0
    } else {
        1.0
    } * magnitude;

    let nice_min = (min / step).floor() * step;
    let nice_max = (max / step).ceil() * step;

    let mut ticks = Vec::new();
    let mut v = nice_min;
    // 부동소수 누적 오차로 마지막 눈금을 놓치지 않도록 반 간격 여유
    while v <= nice_max + step / 2.0 && ticks.len() < desired_count * 3 {
        ticks.push(round2(v));
        v += step;
    }

    if ticks.len() < 3 {
        trace!(min, max, step, "올림 간격으로 눈금 부족, 균등 분할 대체");
        let raw = (max - min) / (desired_count - 1) as f64;
        return (0..desired_count)
            .map(|i| round2(min + raw * i as f64))
            .collect();
    }

    ticks
}

/// 시계열을 균등 간격으로 최대 `max_points`개까지 다운샘플링합니다.
///
/// 첫 포인트와 마지막 포인트는 항상 유지됩니다. 반올림으로 인덱스가
/// 충돌하면 앞쪽으로, 그다음 뒤쪽으로 스캔하여 미사용 인덱스를
/// 찾습니다.
pub fn sample_even_indices<T: Clone>(items: &[T], max_points: usize) -> Vec<T> {
    let n = items.len();
    if n <= max_points || max_points < 2 {
        return items.to_vec();
    }

    let step = (n - 1) as f64 / (max_points - 1) as f64;
    let mut used = vec![false; n];
    let mut indices = Vec::with_capacity(max_points);

    for i in 0..max_points {
        let mut idx = (i as f64 * step).round() as usize;
        if idx >= n {
            idx = n - 1;
        }
        if used[idx] {
            // 앞쪽 스캔
            let mut found = None;
            for j in idx + 1..n {
                if !used[j] {
                    found = Some(j);
                    break;
                }
            }
            // 뒤쪽 스캔
            if found.is_none() {
                for j in (0..idx).rev() {
                    if !used[j] {
                        found = Some(j);
                        break;
                    }
                }
            }
            match found {
                Some(j) => idx = j,
                None => continue,
            }
        }
        used[idx] = true;
        indices.push(idx);
    }

    indices.sort_unstable();
    indices.into_iter().map(|i| items[i].clone()).collect()
}

/// 소수점 2자리 반올림 (경계값의 내림 방지를 위한 엡실론 보정).
fn round2(v: f64) -> f64 {
    ((v + f64::EPSILON) * 100.0).round() / 100.0
}
