use uuid::Uuid;

/// Produces primary keys for new rows. Called by every `create` before the
/// INSERT is issued; no table relies on a column default for its id.
pub type IdGenerator = fn() -> Uuid;

pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
