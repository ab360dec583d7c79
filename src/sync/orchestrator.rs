use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::LoadError;
use crate::fill::{ColorTable, FillLayerController};
use crate::map::{build_bindings, Bindings, MapDocument};
use crate::results::{apply_winners, compute_leaders_for_seats, Candidate, FeedUpdate, SeatLeader, WinnerRecord};
use crate::types::{Generation, SeatId, ShapeId};

/// Lifecycle of the map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    /// No document requested yet.
    Idle,
    /// A document load for this generation is in flight.
    Loading(Generation),
    /// The document loaded and at least one shape is bound to a seat.
    Bound,
    /// The document failed to load, or no shape could be bound.
    Unbound,
    Disposed,
}

/// Whether the leader map reflects the external winners feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedStatus {
    /// No poll has completed yet.
    Pending,
    Live,
    /// The last poll failed; local data (or the previous feed) is shown.
    Fallback,
}

/// Upward notifications from the map. Every method has a no-op default.
pub trait SyncListener {
    fn on_hover_seat(&mut self, _seat: Option<SeatId>) {}

    fn on_hover_shape(&mut self, _shape: Option<ShapeId>) {}

    fn on_select_shape(&mut self, _shape: Option<ShapeId>) {}

    fn on_leaders(&mut self, _leaders: &BTreeMap<SeatId, SeatLeader>) {}

    fn on_status(&mut self, _status: FeedStatus) {}

    fn on_state(&mut self, _state: MapState) {}
}

impl SyncListener for () {}

/// Keeps the leader map and the map document's fills in step with user
/// interaction, vote changes and the winners feed.
///
/// Runs on a single logical thread; asynchronous work (document loads, feed
/// polls) reports back through [`MapSync::finish_load`] and
/// [`MapSync::apply_feed`], where results of superseded generations are
/// dropped.
pub struct MapSync<L: SyncListener> {
    config: MapConfig,
    colors: ColorTable,
    listener: L,

    state: MapState,
    generation: Generation,
    document: MapDocument,
    bindings: Bindings,
    fills: Option<FillLayerController>,

    seats: Vec<SeatId>,
    candidates: Vec<Candidate>,
    local: BTreeMap<SeatId, SeatLeader>,
    winners: Vec<WinnerRecord>,
    leaders: BTreeMap<SeatId, SeatLeader>,
    feed_status: FeedStatus,
    feed_generation: Generation,
}

impl<L: SyncListener> MapSync<L> {
    pub fn new(config: MapConfig, colors: ColorTable, listener: L) -> Self {
        Self {
            config,
            colors,
            listener,
            state: MapState::Idle,
            generation: Generation::default(),
            document: MapDocument::empty(Generation::default()),
            bindings: Bindings::default(),
            fills: None,
            seats: Vec::new(),
            candidates: Vec::new(),
            local: BTreeMap::new(),
            winners: Vec::new(),
            leaders: BTreeMap::new(),
            feed_status: FeedStatus::Pending,
            feed_generation: Generation::default(),
        }
    }

    #[inline] pub fn state(&self) -> MapState { self.state }

    #[inline] pub fn generation(&self) -> Generation { self.generation }

    #[inline] pub fn feed_status(&self) -> FeedStatus { self.feed_status }

    #[inline] pub fn document(&self) -> &MapDocument { &self.document }

    #[inline] pub fn bindings(&self) -> &Bindings { &self.bindings }

    #[inline] pub fn fills(&self) -> Option<&FillLayerController> { self.fills.as_ref() }

    #[inline] pub fn leaders(&self) -> &BTreeMap<SeatId, SeatLeader> { &self.leaders }

    #[inline] pub fn candidates(&self) -> &[Candidate] { &self.candidates }

    #[inline] pub fn winners(&self) -> &[WinnerRecord] { &self.winners }

    #[inline] pub fn listener(&self) -> &L { &self.listener }

    #[inline] pub fn listener_mut(&mut self) -> &mut L { &mut self.listener }

    /// Seat bound to a shape of the current document.
    pub fn seat_of(&self, shape: ShapeId) -> Option<SeatId> {
        if !self.is_current(shape) { return None }
        self.bindings.seat_of(shape)
    }

    fn is_current(&self, shape: ShapeId) -> bool {
        self.fills.as_ref().is_some_and(|f| f.contains(shape))
    }

    fn set_state(&mut self, state: MapState) {
        if self.state == state { return }
        debug!("[sync] {:?} -> {:?}", self.state, state);
        self.state = state;
        self.listener.on_state(state);
    }

    /// Start a new document generation. The previous document and all its
    /// layer state are discarded; a loaded map passes through `Disposed`.
    pub fn begin_load(&mut self) -> Generation {
        if matches!(self.state, MapState::Bound | MapState::Unbound) {
            self.set_state(MapState::Disposed);
        }
        let had_hover = self.fills.as_ref().is_some_and(|f| f.hovered().is_some());
        let had_selection = self.fills.as_ref().is_some_and(|f| f.selected().is_some());

        self.generation = self.generation.next();
        self.document = MapDocument::empty(self.generation);
        self.bindings = Bindings::default();
        self.fills = None;

        if had_hover {
            self.listener.on_hover_seat(None);
            self.listener.on_hover_shape(None);
        }
        if had_selection { self.listener.on_select_shape(None) }
        self.set_state(MapState::Loading(self.generation));
        self.generation
    }

    /// Install the result of a document load. Results for any generation
    /// but the one currently loading are dropped; returns whether it was
    /// applied.
    pub fn finish_load(&mut self, generation: Generation, result: Result<MapDocument, LoadError>) -> bool {
        if self.state != MapState::Loading(generation) {
            debug!("[sync] dropping stale load {generation} (state {:?})", self.state);
            return false;
        }

        let document = match result {
            Ok(document) => document,
            Err(e) => {
                warn!("[sync] {generation}: map unavailable, rendering unbound: {e}");
                MapDocument::empty(generation)
            }
        };
        self.bindings = build_bindings(&document, self.config.threshold);
        let mut fills = FillLayerController::new(&document, &self.config);
        if let Some(base) = self.config.base_fill.as_deref() {
            let ids: Vec<_> = fills.shape_ids().collect();
            for id in ids { fills.set_base_fill(id, Some(base)); }
        }
        self.fills = Some(fills);
        self.document = document;
        self.refresh_data_fills();

        let state = if self.bindings.is_unbound() { MapState::Unbound } else { MapState::Bound };
        info!(
            "[sync] {generation}: {} shapes, {} bound",
            self.bindings.len(),
            self.bindings.bound_count()
        );
        self.set_state(state);
        true
    }

    /// Pointer entered a shape.
    pub fn hover(&mut self, shape: ShapeId) {
        if !self.is_current(shape) {
            debug!("[sync] ignoring hover on stale {shape} ({})", shape.generation);
            return;
        }
        if let Some(fills) = self.fills.as_mut() { fills.set_hover(Some(shape)); }
        let seat = self.bindings.seat_of(shape);
        self.listener.on_hover_seat(seat);
        self.listener.on_hover_shape(Some(shape));
    }

    /// Pointer left a shape.
    pub fn leave(&mut self, shape: ShapeId) {
        if !self.is_current(shape) {
            debug!("[sync] ignoring leave on stale {shape} ({})", shape.generation);
            return;
        }
        if let Some(fills) = self.fills.as_mut() {
            if fills.hovered() == Some(shape) { fills.set_hover(None); }
        }
        self.listener.on_hover_seat(None);
        self.listener.on_hover_shape(None);
    }

    /// Shape clicked: select it and report the selection upward.
    pub fn click(&mut self, shape: ShapeId) {
        if !self.is_current(shape) {
            debug!("[sync] ignoring click on stale {shape} ({})", shape.generation);
            return;
        }
        if let Some(fills) = self.fills.as_mut() { fills.set_selected(Some(shape)); }
        self.listener.on_select_shape(Some(shape));
    }

    /// Selection set by a collaborator. Not echoed back to the listener.
    pub fn select_shape(&mut self, shape: Option<ShapeId>) {
        if shape.is_some_and(|s| !self.is_current(s)) {
            debug!("[sync] ignoring selection of stale shape");
            return;
        }
        if let Some(fills) = self.fills.as_mut() { fills.set_selected(shape); }
    }

    /// Seats that get a "No votes" leader even without candidates.
    pub fn set_seats(&mut self, seats: impl IntoIterator<Item = SeatId>) {
        self.seats = seats.into_iter().collect();
        self.recompute_leaders();
    }

    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.recompute_leaders();
    }

    /// Add one vote to a candidate and re-derive leaders. Returns false for
    /// unknown candidates.
    pub fn record_vote(&mut self, candidate_id: &str) -> bool {
        let Some(candidate) = self.candidates.iter_mut().find(|c| c.id == candidate_id) else {
            warn!("[sync] vote for unknown candidate {candidate_id}");
            return false;
        };
        candidate.votes = candidate.votes.saturating_add(1);
        debug!("[sync] vote for {candidate_id} (seat {})", candidate.seat_id);
        self.recompute_leaders();
        true
    }

    /// Apply one winners-feed poll. A failed poll keeps the previous
    /// winners and flips the status to fallback.
    pub fn apply_feed(&mut self, update: FeedUpdate) -> bool {
        if update.generation <= self.feed_generation {
            debug!("[sync] dropping stale feed update {}", update.generation);
            return false;
        }
        self.feed_generation = update.generation;

        let status = match update.outcome {
            Ok(winners) => {
                if winners != self.winners {
                    info!("[sync] winners feed: {} declared seats", winners.len());
                    self.winners = winners;
                    self.merge_leaders();
                }
                FeedStatus::Live
            }
            Err(e) => {
                warn!("[sync] winners feed unavailable, using fallback data: {e}");
                FeedStatus::Fallback
            }
        };
        if status != self.feed_status {
            self.feed_status = status;
            self.listener.on_status(status);
        }
        true
    }

    /// Tear down the map. Later events are ignored until a new load.
    pub fn dispose(&mut self) {
        self.fills = None;
        self.bindings = Bindings::default();
        self.document = MapDocument::empty(self.generation);
        self.set_state(MapState::Disposed);
    }

    fn recompute_leaders(&mut self) {
        self.local = compute_leaders_for_seats(self.seats.iter().copied(), &self.candidates);
        self.merge_leaders();
    }

    fn merge_leaders(&mut self) {
        self.leaders = apply_winners(&self.local, &self.winners, &self.colors);
        self.refresh_data_fills();
        self.listener.on_leaders(&self.leaders);
    }

    fn refresh_data_fills(&mut self) {
        let Some(fills) = self.fills.as_mut() else { return };
        let updates: Vec<_> = self.bindings.iter()
            .map(|(shape, seat)| {
                let color = seat
                    .and_then(|s| self.leaders.get(&s))
                    .and_then(|leader| self.colors.leader_color(leader));
                (shape, color)
            })
            .collect();
        for (shape, color) in updates {
            fills.set_data_fill(shape, color.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, SourceError};
    use crate::fill::FillLayer;

    const SVG: &str = r#"<svg>
        <g id="Wahlkreise">
            <rect x="5" y="5" width="10" height="10"/>
            <rect x="100" y="100" width="10" height="10"/>
            <rect x="500" y="500" width="10" height="10"/>
        </g>
        <text x="12" y="11">5</text>
        <text x="104" y="106">6</text>
    </svg>"#;

    #[derive(Default)]
    struct Recorder {
        hover_seats: Vec<Option<SeatId>>,
        hover_shapes: Vec<Option<ShapeId>>,
        selections: Vec<Option<ShapeId>>,
        leader_updates: usize,
        statuses: Vec<FeedStatus>,
        states: Vec<MapState>,
    }

    impl SyncListener for Recorder {
        fn on_hover_seat(&mut self, seat: Option<SeatId>) { self.hover_seats.push(seat) }
        fn on_hover_shape(&mut self, shape: Option<ShapeId>) { self.hover_shapes.push(shape) }
        fn on_select_shape(&mut self, shape: Option<ShapeId>) { self.selections.push(shape) }
        fn on_leaders(&mut self, _: &BTreeMap<SeatId, SeatLeader>) { self.leader_updates += 1 }
        fn on_status(&mut self, status: FeedStatus) { self.statuses.push(status) }
        fn on_state(&mut self, state: MapState) { self.states.push(state) }
    }

    fn cand(id: &str, seat: u32, party: &str, votes: u64) -> Candidate {
        Candidate {
            id: id.into(),
            seat_id: SeatId(seat),
            party_id: party.into(),
            name: id.to_uppercase(),
            votes,
            party_label: None,
        }
    }

    fn loaded() -> MapSync<Recorder> {
        let mut colors = ColorTable::default();
        colors.insert("bnp", "#006a4e");
        colors.insert("ncp", "#f97316");
        let mut sync = MapSync::new(MapConfig::default(), colors, Recorder::default());
        let generation = sync.begin_load();
        let doc = MapDocument::parse(SVG, generation, Some("Wahlkreise")).unwrap();
        assert!(sync.finish_load(generation, Ok(doc)));
        sync
    }

    fn shape(sync: &MapSync<Recorder>, i: u32) -> ShapeId { ShapeId::new(sync.generation(), i) }

    #[test]
    fn load_binds_shapes_and_reports_state() {
        let sync = loaded();
        assert_eq!(sync.state(), MapState::Bound);
        assert_eq!(sync.listener().states, vec![MapState::Loading(Generation(1)), MapState::Bound]);
        assert_eq!(sync.seat_of(shape(&sync, 0)), Some(SeatId(5)));
        assert_eq!(sync.seat_of(shape(&sync, 1)), Some(SeatId(6)));
        assert_eq!(sync.seat_of(shape(&sync, 2)), None);
    }

    #[test]
    fn hover_reports_seat_and_shape() {
        let mut sync = loaded();
        let (a, far) = (shape(&sync, 0), shape(&sync, 2));
        sync.hover(a);
        sync.hover(far);
        sync.leave(far);
        let l = sync.listener();
        assert_eq!(l.hover_seats, vec![Some(SeatId(5)), None, None]);
        assert_eq!(l.hover_shapes, vec![Some(a), Some(far), None]);
        assert_eq!(sync.fills().unwrap().hovered(), None);
    }

    #[test]
    fn leaders_color_bound_shapes() {
        let mut sync = loaded();
        sync.set_candidates(vec![cand("a", 5, "bnp", 80), cand("b", 5, "ncp", 30)]);
        let fills = sync.fills().unwrap();
        assert_eq!(fills.current_fill(shape(&sync, 0)), Some("#006a4e"));
        assert_eq!(fills.active_layer(shape(&sync, 2)), Some(FillLayer::Original));
        assert_eq!(sync.leaders()[&SeatId(5)].margin, 50);
    }

    #[test]
    fn votes_rederive_leaders_immediately() {
        let mut sync = loaded();
        sync.set_candidates(vec![cand("a", 5, "bnp", 2), cand("b", 5, "ncp", 3)]);
        assert!(sync.record_vote("a"));
        assert_eq!(sync.leaders()[&SeatId(5)].leader_name, "Tied");
        assert!(sync.record_vote("a"));
        assert_eq!(sync.leaders()[&SeatId(5)].leader_name, "A");
        assert!(!sync.record_vote("zzz"));
        assert_eq!(sync.listener().leader_updates, 3);
    }

    #[test]
    fn click_selects_and_sticks_through_hover() {
        let mut sync = loaded();
        let (a, b) = (shape(&sync, 0), shape(&sync, 1));
        sync.click(a);
        sync.hover(b);
        sync.leave(b);
        assert_eq!(sync.listener().selections, vec![Some(a)]);
        assert_eq!(sync.fills().unwrap().current_fill(a), Some("#22c55e"));

        sync.select_shape(None);
        assert_eq!(sync.fills().unwrap().selected(), None);
        assert_eq!(sync.listener().selections.len(), 1);
    }

    #[test]
    fn events_from_a_superseded_document_are_ignored() {
        let mut sync = loaded();
        let old = shape(&sync, 0);
        sync.hover(old);
        let generation = sync.begin_load();
        let doc = MapDocument::parse(SVG, generation, None).unwrap();
        sync.finish_load(generation, Ok(doc));

        let before = sync.listener().hover_seats.len();
        sync.hover(old);
        sync.click(old);
        assert_eq!(sync.listener().hover_seats.len(), before);
        assert_eq!(sync.seat_of(old), None);
        assert_eq!(sync.fills().unwrap().hovered(), None);
    }

    #[test]
    fn reload_disposes_the_previous_map_first() {
        let mut sync = loaded();
        let generation = sync.begin_load();
        sync.finish_load(generation, Err(LoadError::Document(DocumentError::NotSvg)));
        let generation = sync.begin_load();
        sync.finish_load(generation, Ok(MapDocument::parse(SVG, generation, None).unwrap()));
        assert_eq!(sync.listener().states, vec![
            MapState::Loading(Generation(1)),
            MapState::Bound,
            MapState::Disposed,
            MapState::Loading(Generation(2)),
            MapState::Unbound,
            MapState::Disposed,
            MapState::Loading(Generation(3)),
            MapState::Bound,
        ]);
    }

    #[test]
    fn rostered_seats_without_candidates_show_no_votes() {
        let mut sync = loaded();
        sync.set_candidates(vec![cand("a", 5, "bnp", 4)]);
        sync.set_seats([SeatId(5), SeatId(6)]);
        assert_eq!(sync.leaders()[&SeatId(5)].leader_name, "A");
        let empty = &sync.leaders()[&SeatId(6)];
        assert_eq!(empty.leader_name, crate::results::NO_VOTES);
        assert_eq!(empty.party, crate::types::PartyRef::Neutral);
        assert_eq!(sync.fills().unwrap().active_layer(shape(&sync, 1)), Some(FillLayer::Data));
    }

    #[test]
    fn stale_load_results_are_dropped() {
        let mut sync = MapSync::new(MapConfig::default(), ColorTable::default(), Recorder::default());
        let first = sync.begin_load();
        let second = sync.begin_load();
        let doc = MapDocument::parse(SVG, first, None).unwrap();
        assert!(!sync.finish_load(first, Ok(doc)));
        assert_eq!(sync.state(), MapState::Loading(second));
    }

    #[test]
    fn failed_loads_render_unbound() {
        let mut sync = MapSync::new(MapConfig::default(), ColorTable::default(), Recorder::default());
        let generation = sync.begin_load();
        assert!(sync.finish_load(generation, Err(LoadError::Document(DocumentError::NotSvg))));
        assert_eq!(sync.state(), MapState::Unbound);
        assert!(sync.bindings().is_empty());
    }

    #[test]
    fn feed_drives_status_and_overlays_winners() {
        let mut sync = loaded();
        sync.set_candidates(vec![cand("a", 5, "bnp", 80)]);
        let winners = vec![WinnerRecord {
            seat_id: SeatId(5),
            candidate_name: Some("Declared".into()),
            party_label: Some("ncp".into()),
            votes: 900,
        }];
        assert!(sync.apply_feed(FeedUpdate { generation: Generation(1), outcome: Ok(winners) }));
        assert_eq!(sync.feed_status(), FeedStatus::Live);
        assert_eq!(sync.leaders()[&SeatId(5)].leader_name, "Declared");
        assert_eq!(sync.fills().unwrap().current_fill(shape(&sync, 0)), Some("#f97316"));

        let failed = FeedUpdate { generation: Generation(2), outcome: Err(SourceError::Cancelled) };
        assert!(sync.apply_feed(failed));
        assert_eq!(sync.feed_status(), FeedStatus::Fallback);
        assert_eq!(sync.leaders()[&SeatId(5)].leader_name, "Declared");

        let stale = FeedUpdate { generation: Generation(1), outcome: Ok(Vec::new()) };
        assert!(!sync.apply_feed(stale));
        assert_eq!(sync.listener().statuses, vec![FeedStatus::Live, FeedStatus::Fallback]);
    }

    #[test]
    fn base_fill_applies_under_data() {
        let config = MapConfig { base_fill: Some("#e2e8f0".into()), ..MapConfig::default() };
        let mut sync = MapSync::new(config, ColorTable::default(), ());
        let generation = sync.begin_load();
        sync.finish_load(generation, Ok(MapDocument::parse(SVG, generation, None).unwrap()));
        let far = ShapeId::new(generation, 2);
        assert_eq!(sync.fills().unwrap().current_fill(far), Some("#e2e8f0"));
    }

    #[test]
    fn dispose_ignores_further_events() {
        let mut sync = loaded();
        let a = shape(&sync, 0);
        sync.dispose();
        sync.hover(a);
        assert_eq!(sync.state(), MapState::Disposed);
        assert!(sync.listener().hover_seats.is_empty());
    }
}
