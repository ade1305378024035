pub const CACHE_CONSTRUCT: &str = "cache_construct";
pub const CACHE_CONSTRUCT_FAILED: &str = "cache_construct_failed";
pub const CACHE_EVICT: &str = "cache_evict";
pub const ROUTE_REGISTER: &str = "route_register";
pub const ROUTE_UNREGISTER: &str = "route_unregister";
pub const ROUTE_UNREGISTER_MISSING: &str = "route_unregister_missing";
pub const INBOUND_DISPATCH: &str = "inbound_dispatch";
pub const INBOUND_DROP_UNROUTED: &str = "inbound_drop_unrouted";
pub const INBOUND_STREAM_ENDED: &str = "inbound_stream_ended";
pub const OUTBOUND_FLUSH: &str = "outbound_flush";
pub const OUTBOUND_TERMINAL: &str = "outbound_terminal";
pub const OUTBOUND_DROPPED_OPEN: &str = "outbound_dropped_open";
pub const OUTBOUND_QUEUE_DRAIN_STOPPED: &str = "outbound_queue_drain_stopped";
