#![doc = "Seat map core: binds anonymous SVG shapes to seat labels, layers fills and aggregates seat leaders"]
pub mod cli;
pub mod commands;
mod config;
mod error;
mod fill;
mod geom;
mod io;
mod map;
mod results;
mod sync;
mod types;

#[doc(inline)]
pub use config::{MapConfig, DEFAULT_PALETTE};

#[doc(inline)]
pub use error::{DocumentError, LoadError, SourceError};

#[doc(inline)]
pub use types::{Generation, PartyRef, SeatId, ShapeId};

#[doc(inline)]
pub use map::{build_bindings, Bindings, MapDocument, MapLabel, ShapeKind, VectorShape};

#[doc(inline)]
pub use fill::{Changed, ColorTable, FillLayer, FillLayerController, FillState, ShapeStyle};

#[doc(inline)]
pub use results::{
    apply_winners, compute_leaders, compute_leaders_for_seats, stats, Candidate, FeedUpdate, FileResultsSource,
    HttpResultsSource, LeaderKind, Party, ResultsPoller, ResultsSource, Seat, SeatLeader, WinnerRecord,
    NO_VOTES, NO_WINNER, TIED,
};

#[doc(inline)]
pub use sync::{
    CancelScope, CancelToken, DocumentLoader, FeedStatus, Loaded, MapEvent, MapRuntime, MapSource, MapState,
    MapSync, SyncListener,
};

#[doc(inline)]
pub use io::{render_svg, write_atomic};
