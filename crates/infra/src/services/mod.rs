mod push;

pub use push::{FcmPushService, IPushService, InMemoryPushService};
