//! Sample data fixtures for testing.
//!
//! Ready-made cascade genealogies for other crates' tests: a small
//! two-generation tree with a known depth, breadth, and size.

use crate::{ShareChannel, ShareEvent};

/// A ten-event cascade for claim 0:
///
/// - 1 seed (agent 0)
/// - 3 first-generation shares caused by the seed
/// - 5 second-generation shares (3 from agent 1, 2 from agent 2)
/// - 1 third-generation share
///
/// Depth 3, max fanout 3, all on the positive channel.
pub fn sample_cascade() -> Vec<ShareEvent> {
    let mut events = vec![ShareEvent::seed(0, 0, 0, 0, ShareChannel::Positive)];
    for (id, (day, source, target, parent)) in [
        (1u32, 0u32, 1u32, 0u64),
        (1, 0, 2, 0),
        (1, 0, 3, 0),
        (2, 1, 4, 1),
        (2, 1, 5, 1),
        (2, 1, 6, 1),
        (2, 2, 7, 2),
        (2, 2, 8, 2),
        (3, 4, 9, 4),
    ]
    .into_iter()
    .enumerate()
    {
        events.push(ShareEvent {
            event_id: (id + 1) as u64,
            day,
            claim_id: 0,
            source_agent: source,
            target_agent: target,
            parent_event_id: Some(parent),
            channel: ShareChannel::Positive,
        });
    }
    events
}
