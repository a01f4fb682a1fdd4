use chrono::{Datelike, NaiveDate, Weekday};
use quickcheck_macros::quickcheck;
use stock_forecast::analysis::{RollingWindow, ScalerState, SequenceScaler, rollout};
use stock_forecast::utils::next_trading_days;

#[quickcheck]
fn trading_days_skip_weekends_and_increase(day_offset: u16, count: u8) -> bool {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Days::new(day_offset as u64);
    let dates = next_trading_days(start, count as usize);
    dates.len() == count as usize
        && dates.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        && dates.first().is_none_or(|d| *d > start)
        && dates.windows(2).all(|w| w[0] < w[1])
}

#[quickcheck]
fn scaler_round_trip(noise: Vec<u16>, extra: u8) -> bool {
    // Always longer than one window, so every case reaches the scaler
    let len = 61 + extra as usize % 200;
    let closes: Vec<f64> = (0..len)
        .map(|i| {
            let jitter = noise.get(i % noise.len().max(1)).copied().unwrap_or(0);
            5.0 + jitter as f64 * 0.37 + (i * 17 % 101) as f64
        })
        .collect();
    let scaler = SequenceScaler::new(60);
    let Ok((scaled, state)) = scaler.fit_transform(&closes) else {
        return false;
    };
    let back = SequenceScaler::inverse(&state, &scaled);
    scaled.len() == len
        && scaled.iter().all(|v| (0.0..=1.0).contains(v))
        && back
            .iter()
            .zip(&closes)
            .all(|(b, c)| (b - c).abs() <= 1e-9 * c.abs().max(1.0))
}

#[quickcheck]
fn rollout_length_matches_request(steps: u8) -> bool {
    let Ok(mut window) = RollingWindow::seed(&[0.1, 0.2, 0.3, 0.4], 3) else {
        return false;
    };
    let state = ScalerState { min: 10.0, max: 20.0 };
    let Ok(out) = rollout(&mut window, steps as usize, |w| Ok(w.iter().sum::<f64>() / 3.0)) else {
        return false;
    };
    let prices = SequenceScaler::inverse(&state, &out);
    prices.len() == steps as usize && window.len() == 3
}
