use std::sync::Arc;

use crate::services::auth::TokenSigner;
use crate::services::description::TextGenerator;
use crate::store::Store;

/// Shared application state: the store, the text-generation collaborator
/// and the token signer, all behind cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: Arc<dyn TextGenerator>,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn TextGenerator>,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            store,
            generator,
            tokens,
        }
    }
}
