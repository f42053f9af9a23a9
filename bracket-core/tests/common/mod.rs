#![allow(dead_code)]

use bracket_core::bracket::BuilderOptions;
use bracket_core::events::{BracketEvent, EventSink, EventSinkError};
use bracket_core::participants::{ParticipantSource, ParticipantSourceError};
use bracket_core::store::MemoryProcessor;
use bracket_core::BracketService;
use bracket_sdk::objects::Participant;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Serves a fixed participant list, or a 503 when `fail` is set.
#[derive(Clone, Default)]
pub struct FakeParticipants {
    pub participants: Vec<Participant>,
    pub fail: bool,
}

impl FakeParticipants {
    pub fn with(ids: &[Uuid]) -> Self {
        Self {
            participants: ids
                .iter()
                .enumerate()
                .map(|(i, id)| Participant {
                    id: *id,
                    name: format!("Player {}", i + 1),
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            participants: Vec::new(),
            fail: true,
        }
    }
}

impl ParticipantSource for FakeParticipants {
    async fn participants(&self, _tournament_id: Uuid) -> Result<Vec<Participant>, ParticipantSourceError> {
        if self.fail {
            return Err(ParticipantSourceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.participants.clone())
    }
}

/// Records every published event, or rejects them all when `fail` is set.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<BracketEvent>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<BracketEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    async fn publish(&self, event: BracketEvent) -> Result<(), EventSinkError> {
        if self.fail {
            return Err(EventSinkError::Unavailable("broker down".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub type TestService = BracketService<MemoryProcessor, FakeParticipants, RecordingSink>;

pub fn players(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

pub fn service(
    store: MemoryProcessor,
    participants: FakeParticipants,
    sink: RecordingSink,
    options: BuilderOptions,
) -> TestService {
    BracketService::with_options(store, participants, sink, options, Some(42))
}
