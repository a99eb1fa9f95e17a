//! Running row action handlers
//!
//! A control is one action button on one row. While its handler runs the
//! control is disabled; the guard re-enables it on every exit path,
//! including failure, panic and the task being dropped.

use std::future::Future;
use std::sync::Arc;

use ahash::AHashSet;
use dg_core::events::{events::ActionFailed, EventBus};
use dg_core::{Row, RowAction};
use parking_lot::Mutex;

/// One action button on one row: `(action index, raw row index)`
pub type ControlId = (usize, usize);

/// How a row action invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action has no handler attached
    NoHandler,
    /// The same control was already running; nothing was invoked
    AlreadyRunning,
    Failed(String),
}

/// Controls whose handler is currently running
#[derive(Clone, Default)]
pub struct InFlight {
    controls: Arc<Mutex<AHashSet<ControlId>>>,
}

impl InFlight {
    pub fn is_running(&self, control: ControlId) -> bool {
        self.controls.lock().contains(&control)
    }

    pub fn len(&self) -> usize {
        self.controls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.lock().is_empty()
    }

    /// Mark a control running; `None` if it already is
    fn acquire(&self, control: ControlId) -> Option<InFlightGuard> {
        if self.controls.lock().insert(control) {
            Some(InFlightGuard {
                in_flight: self.clone(),
                control,
            })
        } else {
            None
        }
    }
}

/// Re-enables its control when dropped
struct InFlightGuard {
    in_flight: InFlight,
    control: ControlId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.controls.lock().remove(&self.control);
    }
}

/// Build the task running one handler against a copy of its row
///
/// The control is claimed immediately, not when the task is first polled,
/// so a double click is rejected even before the first task starts.
pub(crate) fn action_task(
    in_flight: &InFlight,
    event_bus: &EventBus,
    control: ControlId,
    label: String,
    handler: Option<Arc<dyn RowAction>>,
    row: Row,
) -> impl Future<Output = ActionOutcome> + Send + 'static {
    let guard = in_flight.acquire(control);
    let event_bus = event_bus.clone();

    async move {
        let Some(handler) = handler else {
            return ActionOutcome::NoHandler;
        };
        let Some(_guard) = guard else {
            tracing::debug!("Action '{}' on row {} is already running", label, control.1);
            return ActionOutcome::AlreadyRunning;
        };

        match handler.on_click(row).await {
            Ok(()) => {
                tracing::debug!("Action '{}' on row {} completed", label, control.1);
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!("Action '{}' on row {} failed: {:#}", label, control.1, e);
                let error = format!("{:#}", e);
                event_bus.publish(ActionFailed {
                    action_label: label,
                    raw_index: control.1,
                    error: error.clone(),
                });
                ActionOutcome::Failed(error)
            }
        }
    }
}
