use std::sync::{Arc, Mutex};

/// Condition reported by the permanently installed device observers.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceHealth {
    Ok,
    /// A validation or runtime error escaped every capture scope. Treated as
    /// a programming defect, not an expected runtime condition.
    Uncaptured(String),
    /// The device became permanently unusable; continuing would require a
    /// fresh negotiation.
    Lost(String),
}

/// Shared slot the uncaptured-error and device-loss observers write into.
///
/// Observers run on wgpu's callback path; the runtime reads the slot once per
/// tick and propagates any recorded condition to top-level shutdown instead
/// of swallowing it.
#[derive(Debug, Clone, Default)]
pub struct DeviceWatch {
    inner: Arc<Mutex<WatchState>>,
}

#[derive(Debug, Default)]
struct WatchState {
    uncaptured: Option<String>,
    lost: Option<String>,
}

impl DeviceWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_uncaptured(&self, message: String) {
        if let Ok(mut state) = self.inner.lock() {
            // Keep the first report; later ones are usually cascade noise.
            state.uncaptured.get_or_insert(message);
        }
    }

    pub(crate) fn record_loss(&self, message: String) {
        if let Ok(mut state) = self.inner.lock() {
            state.lost.get_or_insert(message);
        }
    }

    /// Current health. Uncaptured errors take precedence over loss, since a
    /// lost device frequently also reports trailing errors.
    pub fn health(&self) -> DeviceHealth {
        let Ok(state) = self.inner.lock() else {
            return DeviceHealth::Ok;
        };
        if let Some(message) = &state.uncaptured {
            return DeviceHealth::Uncaptured(message.clone());
        }
        if let Some(message) = &state.lost {
            return DeviceHealth::Lost(message.clone());
        }
        DeviceHealth::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_watch_is_healthy() {
        assert_eq!(DeviceWatch::new().health(), DeviceHealth::Ok);
    }

    #[test]
    fn first_uncaptured_report_wins() {
        let watch = DeviceWatch::new();
        watch.record_uncaptured("first".into());
        watch.record_uncaptured("second".into());
        assert_eq!(watch.health(), DeviceHealth::Uncaptured("first".into()));
    }

    #[test]
    fn uncaptured_takes_precedence_over_loss() {
        let watch = DeviceWatch::new();
        watch.record_loss("gone".into());
        watch.record_uncaptured("validation".into());
        assert_eq!(watch.health(), DeviceHealth::Uncaptured("validation".into()));
    }

    #[test]
    fn loss_is_visible_through_clones() {
        let watch = DeviceWatch::new();
        let observer_side = watch.clone();
        observer_side.record_loss("destroyed".into());
        assert_eq!(watch.health(), DeviceHealth::Lost("destroyed".into()));
    }
}
