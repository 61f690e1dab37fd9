//! 收盘价序列的均线计算

/// 简单移动平均。
///
/// 每 `window` 个连续值求一次均值，结果长度为 `len - window + 1`；
/// `window` 为 0 或大于序列长度时返回空。
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > series.len() {
        return vec![];
    }

    let n = window as f64;
    series
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / n)
        .collect()
}

/// 逐个周期分别计算
pub fn moving_averages(series: &[f64], windows: &[usize]) -> Vec<(usize, Vec<f64>)> {
    windows
        .iter()
        .map(|&w| (w, moving_average(series, w)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_period_average() {
        let series = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(moving_average(&series, 3), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn length_is_len_minus_window_plus_one() {
        let series: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        for w in 1..=60 {
            assert_eq!(moving_average(&series, w).len(), series.len() - w + 1);
        }
        assert!(moving_average(&series, 61).is_empty());
    }

    #[test]
    fn each_value_is_mean_of_its_window() {
        let series = [3.5, 1.25, 8.0, 2.0, 7.75, 4.5, 6.0];
        let w = 4;
        let sma = moving_average(&series, w);
        for (i, value) in sma.iter().enumerate() {
            let expected = series[i..i + w].iter().sum::<f64>() / w as f64;
            assert!((value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_or_oversized_window_is_empty() {
        assert!(moving_average(&[1.0, 2.0], 0).is_empty());
        assert!(moving_average(&[1.0, 2.0], 3).is_empty());
        assert!(moving_average(&[], 1).is_empty());
    }

    #[test]
    fn window_of_one_is_identity() {
        assert_eq!(moving_average(&[1.0, 2.5, 4.0], 1), vec![1.0, 2.5, 4.0]);
    }

    #[test]
    fn windows_are_computed_independently() {
        let series: Vec<f64> = (1..=30).map(f64::from).collect();
        let result = moving_averages(&series, &[20, 50]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].0, 20);
        assert_eq!(result[0].1.len(), 11);
        assert_eq!(result[0].1[0], 10.5);
        assert_eq!(result[1], (50, vec![]));
    }
}
