//! User-role and role-group administration: admins only.

use domains::Actor;

use super::Decision;

pub fn decide_manage(actor: &Actor) -> Decision {
    Decision::authenticated(actor, |p| p.is_admin())
}
