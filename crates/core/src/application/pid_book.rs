// Last-known PID per boot target
use parking_lot::Mutex;

use crate::domain::TargetKind;

#[derive(Debug, Default, Clone, Copy)]
struct Pids {
    kabus: Option<u32>,
    trade_app: Option<u32>,
}

/// Remembers the most recent PID of each target
///
/// Every boot attempt overwrites the previous entry (last writer wins).
/// The PIDs are snapshots, not tracked children.
#[derive(Debug, Default)]
pub struct PidBook {
    pids: Mutex<Pids>,
}

impl PidBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: TargetKind, pid: u32) {
        let mut pids = self.pids.lock();
        match kind {
            TargetKind::Kabus => pids.kabus = Some(pid),
            TargetKind::TradeApp => pids.trade_app = Some(pid),
        }
    }

    pub fn last(&self, kind: TargetKind) -> Option<u32> {
        let pids = self.pids.lock();
        match kind {
            TargetKind::Kabus => pids.kabus,
            TargetKind::TradeApp => pids.trade_app,
        }
    }
}
