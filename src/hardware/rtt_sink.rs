use coord_core::DebugSink;

/// Debug sink over defmt-rtt. Each emitted line becomes one defmt frame.
pub struct RttSink;

pub static RTT_SINK: RttSink = RttSink;

impl DebugSink for RttSink {
    fn emit(&self, text: &str) {
        defmt::info!("{=str}", text.trim_end_matches('\n'));
    }
}
