#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use fleetdocs_core::documents::REQUIRED_COLUMNS;
use fleetdocs_core::roster::{self, Cell, Roster, RosterLoad};
use fleetdocs_core::{Channel, Message};
use fleetdocs_events::{DeliveryError, Notifier, NotifierSession};
use fleetdocs_worker::RunOptions;

/// Shorthand for a calendar date in test fixtures.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Build a roster with the standard header. Each row is
/// `(vehicle_id, inspection, registration, operating_card)`.
pub fn sheet(rows: &[(&str, &str, &str, &str)]) -> Roster {
    Roster {
        columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|(id, inspection, registration, card)| {
                vec![
                    Cell::Text(id.to_string()),
                    Cell::Text(inspection.to_string()),
                    Cell::Text(registration.to_string()),
                    Cell::Text(card.to_string()),
                ]
            })
            .collect(),
    }
}

/// Load a fixture roster; panics on a missing column.
pub fn load(rows: &[(&str, &str, &str, &str)]) -> RosterLoad {
    roster::load(&sheet(rows)).unwrap()
}

/// Run options pinned to a reference date with a short send timeout.
pub fn options(channel: Channel, reference_date: NaiveDate) -> RunOptions {
    let mut options = RunOptions::new(channel);
    options.reference_date = reference_date;
    options.send_timeout = Duration::from_millis(200);
    options
}

// ---------------------------------------------------------------------------
// Recording notifier
// ---------------------------------------------------------------------------

/// In-memory notifier that records every delivered message.
///
/// Sends whose body mentions `fail_vehicle` fail with a timeout error.
pub struct RecordingNotifier {
    channel: Channel,
    fail_vehicle: Option<String>,
    pub opens: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub delivered: Arc<Mutex<Vec<Message>>>,
}

impl RecordingNotifier {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            fail_vehicle: None,
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_for(mut self, vehicle_id: &str) -> Self {
        self.fail_vehicle = Some(vehicle_id.to_string());
        self
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn delivered_bodies(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn open(&self) -> Result<Box<dyn NotifierSession>, DeliveryError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSession {
            fail_vehicle: self.fail_vehicle.clone(),
            closes: Arc::clone(&self.closes),
            delivered: Arc::clone(&self.delivered),
        }))
    }
}

struct RecordingSession {
    fail_vehicle: Option<String>,
    closes: Arc<AtomicUsize>,
    delivered: Arc<Mutex<Vec<Message>>>,
}

#[async_trait]
impl NotifierSession for RecordingSession {
    async fn send(&mut self, message: &Message) -> Result<(), DeliveryError> {
        if let Some(vehicle) = &self.fail_vehicle {
            if message.body.contains(&format!(" for {vehicle} ")) {
                return Err(DeliveryError::Timeout(Duration::from_secs(1)));
            }
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
