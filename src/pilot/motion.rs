//! Background motion tasks.
//!
//! A motion node issues a start command to the robot and then hands the
//! waiting to a [`MotionTask`]: one thread that polls
//! [`Robot::motion_state`] and posts `Completion` or `Failure` back through
//! the node's [`EventPoster`].
//!
//! ```text
//! loop:
//!   cancelled? → exit
//!   sleep(poll)
//!   cancelled? → exit
//!   Arrived    → cancelled? exit : post Completion
//!   Failed     → cancelled? exit : post Failure
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::fsm::EventPoster;
use crate::robot::{MotionState, Robot};

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A running telemetry poller. Cancelled when dropped.
pub struct MotionTask {
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl MotionTask {
    /// Spawn a poller reporting to `poster`.
    pub fn spawn(
        label: &str,
        robot: Arc<dyn Robot>,
        poster: EventPoster,
        poll_interval: Duration,
    ) -> Result<Self> {
        let token = CancelToken::new();
        let thread_token = token.clone();
        let thread_label = label.to_string();

        let handle = thread::Builder::new()
            .name(format!("motion-{label}"))
            .spawn(move || {
                poll_until_done(&thread_label, robot.as_ref(), &poster, &thread_token, poll_interval)
            })?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Request cancellation. The thread exits at its next check and posts
    /// nothing further.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the thread to exit.
    pub fn join(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("motion task panicked");
            }
        }
    }
}

impl Drop for MotionTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn poll_until_done(
    label: &str,
    robot: &dyn Robot,
    poster: &EventPoster,
    token: &CancelToken,
    poll_interval: Duration,
) {
    loop {
        if token.is_cancelled() {
            debug!("[{}] cancelled", label);
            return;
        }
        thread::sleep(poll_interval);
        if token.is_cancelled() {
            debug!("[{}] cancelled", label);
            return;
        }

        match robot.motion_state() {
            MotionState::Idle | MotionState::Moving => {}
            MotionState::Arrived => {
                if !token.is_cancelled() {
                    debug!("[{}] arrived", label);
                    poster.post_completion();
                }
                return;
            }
            MotionState::Failed(reason) => {
                if !token.is_cancelled() {
                    warn!("[{}] motion failed: {}", label, reason);
                    poster.post_failure();
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point2D, Pose2D};
    use crate::fsm::{EventKind, NodeId, NodeRef};
    use crossbeam_channel::unbounded;
    use parking_lot::Mutex;

    struct FixedRobot(Mutex<MotionState>);

    impl Robot for FixedRobot {
        fn pose(&self) -> Pose2D {
            Pose2D::identity()
        }
        fn start_drive(&self, _path: &[Point2D]) -> Result<()> {
            Ok(())
        }
        fn start_doorway_pass(&self, _doorway: &str) -> Result<()> {
            Ok(())
        }
        fn motion_state(&self) -> MotionState {
            self.0.lock().clone()
        }
        fn stop_motion(&self) {
            *self.0.lock() = MotionState::Idle;
        }
    }

    fn origin() -> NodeRef {
        NodeRef {
            id: NodeId(1),
            activation: 1,
        }
    }

    #[test]
    fn test_posts_completion_on_arrival() {
        let robot = Arc::new(FixedRobot(Mutex::new(MotionState::Arrived)));
        let (tx, rx) = unbounded();
        let task = MotionTask::spawn(
            "drive",
            robot,
            EventPoster::new(tx, origin()),
            Duration::from_millis(1),
        )
        .unwrap();

        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.kind, EventKind::Completion);
        assert_eq!(event.origin, Some(origin()));
        task.join();
    }

    #[test]
    fn test_posts_failure() {
        let robot = Arc::new(FixedRobot(Mutex::new(MotionState::Failed("bump".into()))));
        let (tx, rx) = unbounded();
        let _task = MotionTask::spawn(
            "door",
            robot,
            EventPoster::new(tx, origin()),
            Duration::from_millis(1),
        )
        .unwrap();
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event.kind, EventKind::Failure);
    }

    #[test]
    fn test_cancel_before_poll_posts_nothing() {
        // Robot is already done: only the cancellation checks stand between
        // the task and a completion event.
        for _ in 0..50 {
            let robot = Arc::new(FixedRobot(Mutex::new(MotionState::Arrived)));
            let (tx, rx) = unbounded();
            let task = MotionTask::spawn(
                "race",
                robot,
                EventPoster::new(tx, origin()),
                Duration::from_millis(20),
            )
            .unwrap();
            task.cancel();
            task.join();
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_moving_robot_keeps_polling_until_cancelled() {
        let robot = Arc::new(FixedRobot(Mutex::new(MotionState::Moving)));
        let (tx, rx) = unbounded();
        let task = MotionTask::spawn(
            "slow",
            robot,
            EventPoster::new(tx, origin()),
            Duration::from_millis(1),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(!task.is_finished());
        task.join();
        assert!(rx.try_recv().is_err());
    }
}
