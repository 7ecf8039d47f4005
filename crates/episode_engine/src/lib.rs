//! Episode engine: catalog and bypass clients, source resolution, batch
//! harvesting, and the media relay.
mod bypass;
mod catalog;
mod engine;
mod export;
mod fetch;
mod harvest;
mod relay;
mod resolver;
mod types;

pub use bypass::{Bypass, BypassClient};
pub use catalog::{Catalog, CatalogClient, EpisodeListing, EpisodePage};
pub use engine::{ChannelProgressSink, Engine, EngineHandle};
pub use export::{render_labeled_list, render_link_list, write_atomically, PersistError};
pub use fetch::{EngineSettings, RelayIdentity};
pub use harvest::{BatchHarvester, HarvestReport, ProgressSink};
pub use relay::{
    infer_content_type, insert_cors_headers, rewrite_headers, RelayMode, RelayOutcome,
    RelayRequest, RelayResponse, StreamRelay,
};
pub use resolver::SourceResolver;
pub use types::{
    BypassError, CatalogError, EngineEvent, HarvestEvent, RelayError, ResolveError, SetupError,
};
