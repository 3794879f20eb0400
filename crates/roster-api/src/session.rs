//! Handler for `GET /session` — echoes the authenticated caller.

use axum::Json;
use roster_core::identity::Identity;

use crate::auth::CurrentIdentity;

/// `GET /session` — 401 when anonymous.
pub async fn whoami(CurrentIdentity(caller): CurrentIdentity) -> Json<Identity> { Json(caller) }
