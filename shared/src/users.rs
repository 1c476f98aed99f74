use std::sync::Arc;

use crate::store::UserStore;

/// Account and profile operations over a [`UserStore`].
///
/// Session handling lives in [`crate::accounts`], profile handling in
/// [`crate::profiles`]. Holds no state beyond the store handle.
#[derive(Clone)]
pub struct Users {
    pub(crate) store: Arc<dyn UserStore>,
}

impl Users {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

/// Fresh opaque identifier, used for both account ids and session tokens.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
