//! Tag access policy: anyone reads, staff writes.

use domains::Actor;

use super::Decision;

pub fn can_view(_actor: &Actor) -> bool {
    true
}

/// Create, rename and delete share one rule.
pub fn decide_manage(actor: &Actor) -> Decision {
    Decision::authenticated(actor, |p| p.is_staff())
}
