use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use log::*;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tokio_util::sync::CancellationToken;

/// The gate never stays closed for longer than this in one activation.
pub const MAX_ACTIVATION: Duration = Duration::from_secs(24 * 60 * 60);

/// A process-wide "stop calling the accrual service" flag with an expiry.
///
/// The deadline is owned by a single background task. [`RateGate::activate`] only posts a new deadline to that task,
/// which keeps whichever deadline lies furthest in the future and lowers the flag once it passes. Cloning the gate
/// hands out another handle to the same task.
#[derive(Clone)]
pub struct RateGate {
    deadlines: mpsc::UnboundedSender<Instant>,
    active: Arc<AtomicBool>,
}

impl RateGate {
    /// Spawns the owning task and returns a handle to it. The task stops when `cancel` fires or every handle has been
    /// dropped.
    pub fn start(cancel: CancellationToken) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run_gate(rx, Arc::clone(&active), cancel));
        (Self { deadlines: tx, active }, handle)
    }

    /// Closes the gate for `duration` from now, up to [`MAX_ACTIVATION`]. A shorter activation never cuts an earlier,
    /// longer one short.
    ///
    /// Never blocks.
    pub fn activate(&self, duration: Duration) {
        let duration = duration.min(MAX_ACTIVATION);
        let Some(deadline) = Instant::now().checked_add(duration) else {
            warn!("🚦️ Cannot represent a deadline {duration:?} from now. Activation ignored");
            return;
        };
        // Raised eagerly so callers see the gate closed immediately. Only the owning task lowers it.
        self.active.store(true, Ordering::SeqCst);
        if self.deadlines.send(deadline).is_err() {
            warn!("🚦️ Rate gate task has stopped. Activation for {duration:?} ignored");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

async fn run_gate(
    mut deadlines: mpsc::UnboundedReceiver<Instant>,
    active: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    debug!("🚦️ Rate gate started");
    let mut blocked_until: Option<Instant> = None;
    loop {
        let current = blocked_until;
        let expiry = async move {
            match current {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = deadlines.recv() => match next {
                Some(deadline) => {
                    if extend(&mut blocked_until, deadline) {
                        let wait = deadline.saturating_duration_since(Instant::now());
                        info!("🚦️ Accrual calls suspended for {wait:?}");
                    }
                    active.store(true, Ordering::SeqCst);
                },
                None => break,
            },
            _ = expiry => {
                // An activation may have been posted while the timer was firing
                while let Ok(deadline) = deadlines.try_recv() {
                    extend(&mut blocked_until, deadline);
                }
                match blocked_until {
                    Some(deadline) if deadline > Instant::now() => continue,
                    _ => {
                        blocked_until = None;
                        active.store(false, Ordering::SeqCst);
                        info!("🚦️ Accrual calls resumed");
                    },
                }
            },
        }
    }
    debug!("🚦️ Rate gate stopped");
}

/// Moves the deadline forward. Returns true if it changed.
fn extend(blocked_until: &mut Option<Instant>, deadline: Instant) -> bool {
    match blocked_until {
        Some(current) if *current >= deadline => false,
        _ => {
            *blocked_until = Some(deadline);
            true
        },
    }
}
