use uuid::Uuid;

pub const PUBLIC_ID_MIN: i64 = 100_000;
pub const PUBLIC_ID_MAX: i64 = 999_999;

/// Folds a random UUID into the six digit public id range.
///
/// Ids are not unique by construction, callers have to check for collisions.
pub fn public_id() -> i64 {
    let span = (PUBLIC_ID_MAX - PUBLIC_ID_MIN + 1) as u128;
    let offset = Uuid::new_v4().as_u128() % span;

    let id = PUBLIC_ID_MIN + offset as i64;

    tracing::trace!(public_id = id, "generated public id");

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_ids_stay_six_digits() {
        for _ in 0..1_000 {
            let id = public_id();

            assert!((PUBLIC_ID_MIN..=PUBLIC_ID_MAX).contains(&id), "{} out of range", id);
            assert_eq!(id.to_string().len(), 6);
        }
    }
}
