/// Times a block and logs a warning when it runs longer than `$threshold_ms`.
/// Evaluates to the block's value; the block is left untimed when `LOG_PERFORMANCE` is off.
#[macro_export]
macro_rules! trace_time {
    ($label:expr, $threshold_ms:expr, $block:block) => {{
        if $crate::config::LOG_PERFORMANCE {
            let started = std::time::Instant::now();
            let value = $block;
            let took = started.elapsed();
            if took > std::time::Duration::from_millis($threshold_ms) {
                let build = if cfg!(debug_assertions) { "debug" } else { "release" };
                ::log::warn!(
                    "SLOW [{}] {}: {} (limit {}ms)",
                    build,
                    $label,
                    $crate::utils::format_duration(took.as_millis() as i64),
                    $threshold_ms
                );
            }
            value
        } else {
            $block
        }
    }};
}
