use crate::error::EventBusError;
use crate::pipeline::{FatalErrorKind, FramePayload, PipelineMode, PipelineState};
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events published by running pipelines
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// One processed frame with its recognition results
    Frame(Box<FramePayload>),
    /// The orchestrator moved to a new lifecycle state
    StateChanged {
        mode: PipelineMode,
        state: PipelineState,
        timestamp: SystemTime,
    },
    /// Session statistics were written
    StatsPersisted { mode: PipelineMode, path: PathBuf },
    /// The run ended on an unrecoverable condition
    Fatal {
        mode: PipelineMode,
        kind: FatalErrorKind,
        message: String,
    },
}

impl PipelineEvent {
    pub fn mode(&self) -> PipelineMode {
        match self {
            PipelineEvent::Frame(payload) => payload.mode,
            PipelineEvent::StateChanged { mode, .. } => *mode,
            PipelineEvent::StatsPersisted { mode, .. } => *mode,
            PipelineEvent::Fatal { mode, .. } => *mode,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            PipelineEvent::Frame(payload) => format!(
                "Frame {} ({} gestures, {} expressions)",
                payload.frame_id(),
                payload.gestures.len(),
                payload.expressions.len()
            ),
            PipelineEvent::StateChanged { mode, state, .. } => {
                format!("{} pipeline is {}", mode, state)
            }
            PipelineEvent::StatsPersisted { path, .. } => {
                format!("Stats saved to {}", path.display())
            }
            PipelineEvent::Fatal { kind, message, .. } => {
                format!("Fatal {}: {}", kind, message)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::Frame(_) => "frame",
            PipelineEvent::StateChanged { .. } => "state_changed",
            PipelineEvent::StatsPersisted { .. } => "stats_persisted",
            PipelineEvent::Fatal { .. } => "fatal",
        }
    }
}

/// Async event bus for component coordination using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        Self {
            debug_logging: true,
            ..Self::new(capacity)
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Subscribe with a filter
    pub fn receiver(&self, filter: EventFilter, name: &str) -> EventReceiver {
        EventReceiver::new(self.subscribe(), filter, name.to_string())
    }

    /// Publish an event to all subscribers. Fails when nobody is listening.
    pub async fn publish(&self, event: PipelineEvent) -> Result<usize, EventBusError> {
        match &event {
            PipelineEvent::Fatal { mode, kind, message } => {
                error!("{} pipeline failed ({}): {}", mode, kind, message);
            }
            PipelineEvent::StateChanged {
                mode,
                state: PipelineState::Degraded,
                ..
            } => {
                warn!("{} pipeline degraded", mode);
            }
            PipelineEvent::StateChanged { mode, state, .. } => {
                info!("{} pipeline is {}", mode, state);
            }
            _ => {
                if self.debug_logging {
                    debug!("Publishing event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept events from specific pipeline modes
    Modes(Vec<PipelineMode>),
    /// Custom filter function
    Custom(fn(&PipelineEvent) -> bool),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &PipelineEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Modes(modes) => modes.contains(&event.mode()),
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Event receiver with filtering capabilities
pub struct EventReceiver {
    receiver: broadcast::Receiver<PipelineEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<PipelineEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<PipelineEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<PipelineEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameData, FrameFormat};
    use crate::gesture::GestureKind;
    use tokio::time::{timeout, Duration};

    fn frame_event(mode: PipelineMode) -> PipelineEvent {
        PipelineEvent::Frame(Box::new(FramePayload {
            mode,
            annotated_frame: FrameData::new(
                7,
                SystemTime::now(),
                vec![0; 3],
                1,
                1,
                FrameFormat::Rgb24,
            ),
            gestures: vec![GestureKind::Palm],
            expressions: Vec::new(),
            direction_label: None,
            pointing_direction: None,
            actions: Vec::new(),
            stats: None,
        }))
    }

    fn fatal_event() -> PipelineEvent {
        PipelineEvent::Fatal {
            mode: PipelineMode::LiveView,
            kind: FatalErrorKind::CameraStopped,
            message: "camera went away".to_string(),
        }
    }

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus
            .publish(frame_event(PipelineMode::LiveView))
            .await
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            PipelineEvent::Frame(payload) => {
                assert_eq!(payload.frame_id(), 7);
                assert_eq!(payload.gestures, vec![GestureKind::Palm]);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);

        assert!(!event_bus.has_subscribers());
        assert!(event_bus.publish(fatal_event()).await.is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish(fatal_event()).await.unwrap();

        let _ = timeout(Duration::from_millis(100), receiver1.recv())
            .await
            .unwrap()
            .unwrap();
        let _ = timeout(Duration::from_millis(100), receiver2.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_event_filter() {
        let types = EventFilter::EventTypes(vec!["fatal"]);
        let modes = EventFilter::Modes(vec![PipelineMode::Game]);

        assert!(types.matches(&fatal_event()));
        assert!(!types.matches(&frame_event(PipelineMode::Game)));
        assert!(modes.matches(&frame_event(PipelineMode::Game)));
        assert!(!modes.matches(&fatal_event()));
        assert!(EventFilter::Custom(|e| e.event_type() == "frame")
            .matches(&frame_event(PipelineMode::Drawing)));
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let event_bus = EventBus::new(10);
        let mut filtered_receiver =
            event_bus.receiver(EventFilter::EventTypes(vec!["fatal"]), "test");

        event_bus
            .publish(frame_event(PipelineMode::LiveView))
            .await
            .unwrap();
        event_bus.publish(fatal_event()).await.unwrap();

        let received = timeout(Duration::from_millis(100), filtered_receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.event_type(), "fatal");
        assert!(filtered_receiver.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lagging_receiver_reports_skipped() {
        let event_bus = EventBus::new(2);
        let mut receiver = event_bus.receiver(EventFilter::All, "slow");

        for _ in 0..5 {
            event_bus.publish(fatal_event()).await.unwrap();
        }

        match receiver.recv().await {
            Err(EventBusError::Lagged { skipped }) => assert_eq!(skipped, 3),
            other => panic!("Expected lag, got {:?}", other),
        }
    }

    #[test]
    fn test_event_properties() {
        let event = fatal_event();

        assert_eq!(event.event_type(), "fatal");
        assert_eq!(event.mode(), PipelineMode::LiveView);
        assert!(event.description().contains("camera_stopped"));
    }
}
