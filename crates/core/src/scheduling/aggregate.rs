use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::{
    calendar::{BusyBlock, CalendarBackend, FreeBusyQuery},
    errors::SchedulerResult,
    models::interval::TimeInterval,
};

/// Busy intervals across every calendar in `calendar_ids` for `window`.
///
/// Issues a single free/busy query, flattens the per-calendar lists into one
/// union and drops blocks with missing, unparsable or empty ranges. The
/// result is unordered.
pub async fn aggregate_busy(
    backend: &dyn CalendarBackend,
    calendar_ids: &[String],
    window: TimeInterval,
    time_zone: Tz,
) -> SchedulerResult<Vec<TimeInterval>> {
    let query = FreeBusyQuery {
        calendar_ids: calendar_ids.to_vec(),
        time_min: window.start(),
        time_max: window.end(),
        time_zone,
    };

    let calendars = backend.query_free_busy(&query).await?;

    let busy: Vec<TimeInterval> = calendars
        .iter()
        .flat_map(|(calendar_id, blocks)| {
            blocks
                .iter()
                .filter_map(move |block| parse_block(calendar_id, block))
        })
        .collect();

    debug!(
        calendars = calendars.len(),
        intervals = busy.len(),
        "aggregated busy intervals"
    );

    Ok(busy)
}

fn parse_block(calendar_id: &str, block: &BusyBlock) -> Option<TimeInterval> {
    let parsed = match (block.start.as_deref(), block.end.as_deref()) {
        (Some(start), Some(end)) => TimeInterval::parse_rfc3339(start, end),
        _ => None,
    };

    if parsed.is_none() {
        warn!(
            calendar_id,
            start = ?block.start,
            end = ?block.end,
            "dropping malformed busy block"
        );
    }

    parsed
}
