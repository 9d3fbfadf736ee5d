//! Booking orchestrator: owns the world and the public ride API surface.
//!
//! Exactly one authoritative [`Ride`] record exists per booking, owned by
//! the orchestrator's `World`; tracking systems emit into the feed and
//! mutate ride components only through the state-machine guard, all on the
//! single control thread. Consumers drive simulated time with
//! [`RideOrchestrator::advance_to`] / [`RideOrchestrator::advance_by`] and
//! read immutable snapshots.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource, Schedule, World};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::error::BookingError;
use crate::geo::Coordinate;
use crate::geocode::{Geocoder, GeocoderResource, LocationSuggestion};
use crate::pricing::{self, PricingConfig, VehicleClass};
use crate::quotes::{EstimateSet, QuoteBatchId, QuoteBoard, QuoteRequest, QUOTE_LATENCY_MS};
use crate::ride::{Address, DriverInfo, Ride, RideId, RideRequest, RideSnapshot, RideStatus};
use crate::runner::{booking_schedule, run_next_event, run_next_event_until};
use crate::search::{PendingReverse, SearchConfig, SearchField, SearchState};
use crate::telemetry::{EngineTelemetry, RideHistory};
use crate::tracking::{SubscriberId, TrackingConfig, TrackingEvent, TrackingFeed, TrackingRng};

/// Offset for the initial arrival estimate attached at ride creation.
const ESTIMATED_ARRIVAL_OFFSET_MS: u64 = 8 * 60 * 1000;
/// Upper bound on pump steps for the blocking conveniences.
const MAX_PUMP_STEPS: usize = 100_000;

#[derive(Debug, Default, Resource)]
struct RideIndex(HashMap<RideId, Entity>);

#[derive(Debug, Default, Resource)]
struct RideIdAllocator(u64);

/// Everything configurable at construction time.
pub struct OrchestratorParams {
    pub pricing: PricingConfig,
    pub tracking: TrackingConfig,
    pub search: SearchConfig,
    pub geocoder: Box<dyn Geocoder>,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            tracking: TrackingConfig::default(),
            search: SearchConfig::default(),
            geocoder: Box::new(crate::geocode::simulated::SimulatedGeocoder::new()),
        }
    }
}

pub struct RideOrchestrator {
    world: World,
    schedule: Schedule,
}

impl RideOrchestrator {
    pub fn new() -> Self {
        Self::with_params(OrchestratorParams::default())
    }

    pub fn with_params(params: OrchestratorParams) -> Self {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(TrackingRng::from_seed(params.tracking.seed));
        world.insert_resource(params.tracking);
        world.insert_resource(params.pricing);
        world.insert_resource(params.search);
        world.insert_resource(GeocoderResource(params.geocoder));
        world.insert_resource(TrackingFeed::default());
        world.insert_resource(QuoteBoard::default());
        world.insert_resource(EngineTelemetry::default());
        world.insert_resource(RideHistory::default());
        world.insert_resource(RideIndex::default());
        world.insert_resource(RideIdAllocator::default());

        Self {
            world,
            schedule: booking_schedule(),
        }
    }

    // ---- time -----------------------------------------------------------

    /// Current simulated time in milliseconds.
    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    /// Process every event due at or before `timestamp_ms`, then move the
    /// clock there. Returns the number of events processed.
    pub fn advance_to(&mut self, timestamp_ms: u64) -> usize {
        let mut steps = 0;
        while steps < MAX_PUMP_STEPS
            && run_next_event_until(&mut self.world, &mut self.schedule, timestamp_ms)
        {
            steps += 1;
        }
        self.world
            .resource_mut::<SimulationClock>()
            .advance_to(timestamp_ms);
        steps
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> usize {
        self.advance_to(self.now() + delta_ms)
    }

    /// Drain the event queue completely (bounded by `max_steps`).
    pub fn run_until_idle(&mut self, max_steps: usize) -> usize {
        crate::runner::run_until_empty(&mut self.world, &mut self.schedule, max_steps)
    }

    // ---- location search ------------------------------------------------

    /// Create one search input field (pickup, dropoff, ...).
    pub fn create_search_field(&mut self) -> Entity {
        self.world.spawn(SearchField::default()).id()
    }

    /// Record the field's new text. Restarts the debounce timer at
    /// `min_query_len` and above; below it, suggestions clear immediately
    /// and no search is issued.
    pub fn keystroke(&mut self, field: Entity, text: &str) {
        let config = *self.world.resource::<SearchConfig>();
        let now;
        {
            let mut clock = self.world.resource_mut::<SimulationClock>();
            now = clock.now();
            // Restart: drop the previously armed timer for this field.
            clock.cancel_matching(EventKind::DebounceElapsed, EventSubject::Field(field));
        }

        let mut deadline = None;
        if let Some(mut search_field) = self.world.get_mut::<SearchField>(field) {
            search_field.query = text.to_string();
            search_field.selection = None;
            if text.chars().count() < config.min_query_len {
                search_field.suggestions.clear();
                search_field.state = SearchState::Idle;
                search_field.debounce_deadline = None;
            } else {
                let at = now + config.debounce_ms;
                search_field.state = SearchState::Debouncing;
                search_field.debounce_deadline = Some(at);
                deadline = Some(at);
            }
        }

        if let Some(at) = deadline {
            self.world.resource_mut::<SimulationClock>().schedule_at(
                at,
                EventKind::DebounceElapsed,
                Some(EventSubject::Field(field)),
            );
        }
    }

    pub fn suggestions(&self, field: Entity) -> &[LocationSuggestion] {
        self.world
            .get::<SearchField>(field)
            .map(|f| f.suggestions.as_slice())
            .unwrap_or(&[])
    }

    pub fn search_state(&self, field: Entity) -> SearchState {
        self.world
            .get::<SearchField>(field)
            .map(|f| f.state)
            .unwrap_or(SearchState::Idle)
    }

    /// Accept a ranked suggestion, producing the field's selected address.
    pub fn accept_suggestion(&mut self, field: Entity, index: usize) -> Option<Address> {
        let mut search_field = self.world.get_mut::<SearchField>(field)?;
        let suggestion = search_field.suggestions.get(index)?.clone();
        let address = Address {
            location: suggestion.location,
            label: suggestion.display_name.clone(),
        };
        search_field.query = suggestion.display_name;
        search_field.suggestions.clear();
        search_field.state = SearchState::Idle;
        search_field.debounce_deadline = None;
        search_field.selection = Some(address.clone());
        Some(address)
    }

    pub fn selection(&self, field: Entity) -> Option<Address> {
        self.world
            .get::<SearchField>(field)
            .and_then(|f| f.selection.clone())
    }

    /// Resolve the device position into an address via a single reverse
    /// geocode (independent of the debounced text flow). Falls back to a
    /// formatted coordinate string if the geocoder fails.
    pub fn use_current_position(&mut self, field: Entity, position: Coordinate) {
        let config = *self.world.resource::<SearchConfig>();
        let resolve_at = self.now() + config.reverse_latency_ms;
        if let Some(mut search_field) = self.world.get_mut::<SearchField>(field) {
            search_field.pending_reverse = Some(PendingReverse {
                lat: position.lat,
                lng: position.lng,
                resolve_at,
            });
        } else {
            return;
        }
        self.world.resource_mut::<SimulationClock>().schedule_at(
            resolve_at,
            EventKind::ReverseResolved,
            Some(EventSubject::Field(field)),
        );
    }

    // ---- fare quotes ----------------------------------------------------

    /// Fan out one fare estimate per vehicle class. Branches resolve
    /// independently; a failing class surfaces as unavailable without
    /// aborting its siblings.
    pub fn request_fare_estimates(
        &mut self,
        pickup: Coordinate,
        dropoff: Coordinate,
    ) -> QuoteBatchId {
        let batch = self.world.resource_mut::<QuoteBoard>().open();
        for class in VehicleClass::ALL {
            let request = self
                .world
                .spawn(QuoteRequest { batch, class, pickup, dropoff })
                .id();
            self.world.resource_mut::<SimulationClock>().schedule_in(
                QUOTE_LATENCY_MS,
                EventKind::QuoteReady,
                Some(EventSubject::Quote(request)),
            );
        }
        batch
    }

    pub fn fare_estimates(&self, batch: QuoteBatchId) -> Option<&EstimateSet> {
        self.world.resource::<QuoteBoard>().estimates(batch)
    }

    pub fn quotes_complete(&self, batch: QuoteBatchId) -> bool {
        self.world.resource::<QuoteBoard>().is_complete(batch)
    }

    /// Blocking convenience: fan out, pump until all branches resolve, and
    /// return the per-class map (`None` = unavailable for that class).
    /// Advances simulated time past the quote latency.
    pub fn get_fare_estimates(&mut self, pickup: Coordinate, dropoff: Coordinate) -> EstimateSet {
        let batch = self.request_fare_estimates(pickup, dropoff);
        let mut steps = 0;
        while steps < MAX_PUMP_STEPS && !self.quotes_complete(batch) {
            if !run_next_event(&mut self.world, &mut self.schedule) {
                break;
            }
            steps += 1;
        }
        self.fare_estimates(batch).cloned().unwrap_or_default()
    }

    // ---- rides ----------------------------------------------------------

    /// Book a ride: fresh fare for the chosen class, a new identifier, a
    /// tracking session, and the simulated dispatch timeline.
    pub fn request_ride(&mut self, request: RideRequest) -> Result<RideSnapshot, BookingError> {
        let pickup = Coordinate::new(request.pickup.location.lat, request.pickup.location.lng)?;
        let dropoff = Coordinate::new(request.dropoff.location.lat, request.dropoff.location.lng)?;

        let fare = {
            let pricing = self.world.resource::<PricingConfig>();
            pricing::estimate_fare(pricing, pickup, dropoff, request.vehicle_class)?
        };

        let id = {
            let mut allocator = self.world.resource_mut::<RideIdAllocator>();
            allocator.0 += 1;
            RideId(allocator.0)
        };
        let now = self.now();

        let ride = Ride {
            id,
            pickup: request.pickup,
            dropoff: request.dropoff,
            vehicle_class: request.vehicle_class,
            status: RideStatus::Requested,
            fare,
            created_at: now,
            estimated_arrival: Some(now + ESTIMATED_ARRIVAL_OFFSET_MS),
        };
        let snapshot = RideSnapshot::from_parts(&ride, None);

        let entity = self.world.spawn(ride).id();
        self.world.resource_mut::<RideIndex>().0.insert(id, entity);
        self.world.resource_mut::<TrackingFeed>().open_session(id);

        let tracking = *self.world.resource::<TrackingConfig>();
        {
            let mut clock = self.world.resource_mut::<SimulationClock>();
            let subject = Some(EventSubject::Ride(entity));
            clock.schedule_in(tracking.assigned_delay_ms, EventKind::DriverAssigned, subject);
            clock.schedule_in(tracking.accepted_delay_ms, EventKind::DriverAccepted, subject);
            clock.schedule_in(tracking.trip_start_delay_ms, EventKind::TripStarted, subject);
        }

        self.world.resource_mut::<EngineTelemetry>().rides_requested += 1;
        tracing::info!(ride = %id, class = %snapshot.vehicle_class, "ride requested");
        Ok(snapshot)
    }

    /// Rider-initiated cancellation. Legal only before the trip starts; an
    /// attempt from `on_trip` or a terminal state surfaces
    /// [`BookingError::IllegalTransition`] to the caller.
    pub fn cancel_ride(&mut self, ride_id: RideId) -> Result<RideSnapshot, BookingError> {
        let entity = self
            .world
            .resource::<RideIndex>()
            .0
            .get(&ride_id)
            .copied()
            .ok_or(BookingError::UnknownRide(ride_id))?;

        let transition = {
            let mut ride = self
                .world
                .get_mut::<Ride>(entity)
                .ok_or(BookingError::UnknownRide(ride_id))?;
            ride.status.transition_to(RideStatus::Cancelled)
        };
        if let Err(err) = transition {
            self.world
                .resource_mut::<EngineTelemetry>()
                .illegal_transitions_rejected += 1;
            return Err(err);
        }

        // Tear down the session: stop pending timers, then close the feed.
        self.world
            .resource_mut::<SimulationClock>()
            .cancel_subject(EventSubject::Ride(entity));
        {
            let mut feed = self.world.resource_mut::<TrackingFeed>();
            feed.emit(ride_id, TrackingEvent::StatusChanged { status: RideStatus::Cancelled });
            feed.close_session(ride_id);
        }

        let snapshot = self
            .snapshot_entity(entity)
            .ok_or(BookingError::UnknownRide(ride_id))?;
        self.world
            .resource_mut::<RideHistory>()
            .record(snapshot.clone());
        self.world.resource_mut::<EngineTelemetry>().rides_cancelled += 1;
        tracing::info!(ride = %ride_id, "ride cancelled");
        Ok(snapshot)
    }

    pub fn ride(&self, ride_id: RideId) -> Option<RideSnapshot> {
        let entity = self.world.resource::<RideIndex>().0.get(&ride_id).copied()?;
        self.snapshot_entity(entity)
    }

    /// Terminal rides, newest first.
    pub fn ride_history(&self) -> Vec<RideSnapshot> {
        self.world.resource::<RideHistory>().newest_first()
    }

    // ---- tracking boundary ----------------------------------------------

    /// Subscribe to a ride's feed. Every subscriber observes the same
    /// ordered event sequence.
    pub fn subscribe(&mut self, ride_id: RideId) -> Result<SubscriberId, BookingError> {
        if !self.world.resource::<RideIndex>().0.contains_key(&ride_id) {
            return Err(BookingError::UnknownRide(ride_id));
        }
        Ok(self.world.resource_mut::<TrackingFeed>().subscribe(ride_id))
    }

    /// Drain events emitted since the subscriber's last poll.
    pub fn poll_events(&mut self, subscriber: SubscriberId) -> Vec<TrackingEvent> {
        self.world.resource_mut::<TrackingFeed>().poll(subscriber)
    }

    pub fn unsubscribe(&mut self, subscriber: SubscriberId) {
        self.world
            .resource_mut::<TrackingFeed>()
            .unsubscribe(subscriber);
    }

    // ---- introspection --------------------------------------------------

    pub fn telemetry(&self) -> EngineTelemetry {
        self.world.resource::<EngineTelemetry>().clone()
    }

    /// Direct world access, for tests and advanced embedding.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn snapshot_entity(&self, entity: Entity) -> Option<RideSnapshot> {
        let ride = self.world.get::<Ride>(entity)?;
        let driver = self.world.get::<DriverInfo>(entity);
        Some(RideSnapshot::from_parts(ride, driver))
    }
}

impl Default for RideOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
