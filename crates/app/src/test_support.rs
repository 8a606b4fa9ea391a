//! In-memory fakes of the ports, shared by the unit tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use ipadha_domain::entity::{AttributeValue, Entity};
use ipadha_domain::error::IpadhaError;
use ipadha_domain::id::EntityId;
use ipadha_domain::service::ServiceCall;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::ports::{HubClient, PushTransport, StateSink};

pub(crate) fn light(object_id: &str, brightness: i64) -> Entity {
    Entity::new(EntityId::new(format!("light.{object_id}")).unwrap(), "on")
        .with_attribute("brightness", AttributeValue::Int(brightness))
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub at: Instant,
    pub call: ServiceCall,
}

#[derive(Default)]
pub(crate) struct FakeHub {
    states: Mutex<Vec<Entity>>,
    calls: Mutex<Vec<RecordedCall>>,
    call_delay: Duration,
    fail_fetches: AtomicBool,
    fail_calls: AtomicBool,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every service call takes `delay` to complete.
    pub fn with_call_delay(delay: Duration) -> Self {
        Self {
            call_delay: delay,
            ..Self::default()
        }
    }

    pub fn set_states(&self, states: Vec<Entity>) {
        *self.states.lock().unwrap() = states;
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_calls(&self, fail: bool) {
        self.fail_calls.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.recorded().into_iter().map(|r| r.call).collect()
    }

    /// Brightness values of the recorded calls, in order.
    pub fn brightness_values(&self) -> Vec<u8> {
        self.calls()
            .iter()
            .filter_map(|c| c.brightness().map(|b| b.value()))
            .collect()
    }
}

impl HubClient for FakeHub {
    fn fetch_states(&self) -> impl Future<Output = Result<Vec<Entity>, IpadhaError>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_fetches.load(Ordering::SeqCst) {
            Err(IpadhaError::Transport("hub unreachable".into()))
        } else {
            Ok(self.states.lock().unwrap().clone())
        };
        async { result }
    }

    fn call_service(
        &self,
        call: &ServiceCall,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        let call = call.clone();
        async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(RecordedCall {
                at: Instant::now(),
                call,
            });
            if !self.call_delay.is_zero() {
                tokio::time::sleep(self.call_delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_calls.load(Ordering::SeqCst) {
                return Err(IpadhaError::Transport("connection refused".into()));
            }
            Ok(())
        }
    }
}

/// Script step for [`FakePush`].
pub(crate) enum PushCommand {
    Deliver(Entity),
    Fail,
}

/// Push transport driven by the test through a channel.
pub(crate) struct FakePush {
    commands: tokio::sync::Mutex<mpsc::UnboundedReceiver<PushCommand>>,
    reject_auth: AtomicBool,
    connects: AtomicUsize,
}

impl FakePush {
    pub fn new() -> (Self, mpsc::UnboundedSender<PushCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let push = Self {
            commands: tokio::sync::Mutex::new(rx),
            reject_auth: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
        };
        (push, tx)
    }

    pub fn reject_auth(&self, reject: bool) {
        self.reject_auth.store(reject, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl PushTransport for FakePush {
    fn stream_states(
        &self,
        sink: mpsc::Sender<Entity>,
    ) -> impl Future<Output = Result<(), IpadhaError>> + Send {
        async move {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.reject_auth.load(Ordering::SeqCst) {
                return Err(IpadhaError::Unauthorized);
            }
            let mut commands = self.commands.lock().await;
            while let Some(command) = commands.recv().await {
                match command {
                    PushCommand::Deliver(entity) => {
                        if sink.send(entity).await.is_err() {
                            return Ok(());
                        }
                    }
                    PushCommand::Fail => {
                        return Err(IpadhaError::Transport("connection reset".into()));
                    }
                }
            }
            std::future::pending().await
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    batches: Mutex<Vec<Vec<Entity>>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Vec<Entity>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.batches().into_iter().flatten().collect()
    }
}

impl StateSink for RecordingSink {
    fn apply_states(&self, entities: Vec<Entity>) {
        self.batches.lock().unwrap().push(entities);
    }
}
