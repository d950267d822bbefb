use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SendMessage,
    Predict,
    AnalyzeReport,
    GenerateReport,
    History,
}

impl Action {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Action::SendMessage => 0,
            Action::Predict => 1,
            Action::AnalyzeReport => 2,
            Action::GenerateReport => 3,
            Action::History => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::SendMessage => "Sending a message",
            Action::Predict => "Risk assessment",
            Action::AnalyzeReport => "Report analysis",
            Action::GenerateReport => "Report generation",
            Action::History => "History lookup",
        }
    }
}

/// Per-action "in flight" flags, shared with whatever renders them.
#[derive(Clone, Default)]
pub struct BusyIndicators {
    flags: Arc<[AtomicBool; Action::COUNT]>,
}

impl BusyIndicators {
    #[cfg(test)]
    pub fn is_busy(&self, action: Action) -> bool {
        self.flags[action.index()].load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn any_busy(&self) -> bool {
        self.flags.iter().any(|f| f.load(Ordering::Acquire))
    }

    /// Marks `action` busy until the returned guard drops. `None` if it
    /// already is.
    pub fn try_begin(&self, action: Action) -> Option<BusyGuard> {
        self.flags[action.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        Some(BusyGuard {
            flags: self.flags.clone(),
            action,
        })
    }
}

pub struct BusyGuard {
    flags: Arc<[AtomicBool; Action::COUNT]>,
    action: Action,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flags[self.action.index()].store(false, Ordering::Release);
    }
}
