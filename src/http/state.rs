use crate::config::PublicClientConfig;
use crate::core::handler::ContactHandler;
use std::sync::Arc;

pub struct State {
    pub contact: ContactHandler,
    pub public_config: PublicClientConfig,
}

impl State {
    pub fn new(contact: ContactHandler, public_config: PublicClientConfig) -> Arc<Self> {
        Arc::new(Self {
            contact,
            public_config,
        })
    }
}
