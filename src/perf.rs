use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::Instant;

static SLOW_STAGE_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static THRESHOLD_INIT: Once = Once::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// 慢阶段阈值（毫秒）
///
/// - `INVENTORY_PLANNER_SLOW_STAGE_MS=500` 配置阈值
/// - 未配置时 Debug 为 200ms，Release 为 1000ms；0 表示关闭
fn slow_stage_threshold_ms() -> u64 {
    THRESHOLD_INIT.call_once(|| {
        let ms = std::env::var("INVENTORY_PLANNER_SLOW_STAGE_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 200 } else { 1000 });
        SLOW_STAGE_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    });
    SLOW_STAGE_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 阶段耗时 Guard：记录 elapsed_ms + 处理条数 + 嵌套深度
///
/// 使用方式：
/// ```ignore
/// let mut perf = inventory_planner::perf::PerfGuard::new("aggregate");
/// perf.set_items(records.len());
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
    items: usize,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let current = d.get();
            d.set(current.saturating_add(1));
            current
        });
        Self {
            op,
            start: Instant::now(),
            depth,
            items: 0,
        }
    }

    pub fn set_items(&mut self, items: usize) {
        self.items = items;
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let threshold = slow_stage_threshold_ms();

        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                items = self.items,
                depth = self.depth,
                "slow stage"
            );
        } else {
            tracing::info!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                items = self.items,
                depth = self.depth,
                "done"
            );
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
