use crate::error::AlignmentWarning;
use crate::input::RenderRequest;
use crate::sequence::PeriodSequence;
use crate::trend::TrendSequence;
use crate::RenderPlan;
use log::{debug, info, warn};

pub fn log_request(request: &RenderRequest) {
    info!("Render request:");
    info!("  Region: {}", request.region);
    info!("  Product: {}", request.product);
    if let Some(variable) = request.trend_variable() {
        info!("  Trend variable: {}", variable);
    }
}

pub fn log_sequence(sequence: &PeriodSequence) {
    info!(
        "Periods: {} (skip_first={}, hour_offset={})",
        sequence.len(),
        sequence.skip.skip_first,
        sequence.skip.hour_offset
    );
    for period in sequence {
        debug!(
            "  {:>2}: {} [{} .. {}]",
            period.display_index,
            period.key(),
            period.valid_start.format("%Y-%m-%d %HZ"),
            period.valid_end.format("%Y-%m-%d %HZ")
        );
    }
    for warning in &sequence.warnings {
        if let AlignmentWarning::EmptyDataset { dataset } = warning {
            info!("  No {} periods", dataset);
        }
    }
    let dropped = sequence.dropped_count();
    if dropped > 0 {
        warn!("  {} periods dropped", dropped);
    }
}

pub fn log_trends(trends: &TrendSequence) {
    info!("Trend deltas for '{}': {}", trends.variable, trends.len());
    for delta in trends {
        let (from, to) = delta.display_index_pair;
        debug!(
            "  {} -> {}: {} - {}{}",
            from,
            to,
            delta.to,
            delta.from,
            if delta.is_seam() { " (seam)" } else { "" }
        );
    }
    let dropped = trends.dropped_count();
    if dropped > 0 {
        warn!("  {} deltas dropped", dropped);
    }
}

pub fn log_plan_summary(plan: &RenderPlan) {
    info!("Render plan:");
    info!("  Bounding box: {}", plan.bounding_box);
    info!("  Decimation stride: {}", plan.stride);
    log_sequence(&plan.periods);
    match &plan.trends {
        Some(trends) => log_trends(trends),
        None => debug!("  No trend deltas requested"),
    }
}
