/// Status indicator driven by the periodic timer.
pub trait Led {
    fn off(&mut self);
    fn toggle(&mut self);
}

/// Ordered character output used by every task for its log lines.
///
/// No grouping is promised across calls: lines written by different tasks may
/// interleave.
pub trait DebugSink {
    fn emit(&self, text: &str);
}

/// Source of qualifying button edges, one completion per physical edge.
#[allow(async_fn_in_trait)]
pub trait EdgeSource {
    async fn wait_for_edge(&mut self);
}
