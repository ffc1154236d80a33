//! availability.rs
//!
//! Seat availability checking for a show (movie + showtime).
//!
//! The invariant this module protects: no seat label may appear in two
//! committed bookings for the same (movie_id, showtime) pair. The check here
//! is the fast path only — the real guarantee is the unique index on
//! booking_seats(movie_id, showtime, seat_label), which the insert path in
//! the bookings controller relies on.

use std::collections::BTreeSet;
use std::future::Future;

use thiserror::Error;

/// Policy: a single booking may hold at most this many seats.
pub const MAX_SEATS_PER_BOOKING: usize = 10;

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityResult {
    Available,
    /// The requested labels that are already held by committed bookings.
    Conflict(BTreeSet<String>),
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The booking store could not be read. Callers must treat this as
    /// "not available" — never fall through to a booking insert.
    #[error("booking store unavailable")]
    Unavailable(#[source] sqlx::Error),
}

/// Lookup collaborator: everything the checker needs from persistence.
pub trait BookingStore {
    /// All seat labels held by committed bookings for the given show.
    /// Labels may repeat across rows; the checker treats them as a set.
    fn fetch_seat_labels(
        &self,
        movie_id: i64,
        showtime: &str,
    ) -> impl Future<Output = sqlx::Result<Vec<String>>> + Send;
}

/// Seat labels are opaque, case-sensitive tokens. Surrounding whitespace
/// (an artifact of comma-joined input) is trimmed; empty tokens and
/// duplicates are dropped.
pub fn normalize_seat_labels(requested: &[String]) -> BTreeSet<String> {
    requested
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Checks whether any of the requested seats is already booked for the show.
///
/// Read-only: the caller is responsible for the subsequent insert, and for
/// catching the unique-constraint violation that closes the race between
/// this check and that insert.
pub async fn check_availability<S: BookingStore>(
    store: &S,
    movie_id: i64,
    showtime: &str,
    requested: &[String],
) -> Result<AvailabilityResult, AvailabilityError> {
    let seats = normalize_seat_labels(requested);
    if seats.is_empty() {
        return Err(AvailabilityError::InvalidRequest(
            "at least one seat must be requested".to_string(),
        ));
    }
    if seats.len() > MAX_SEATS_PER_BOOKING {
        return Err(AvailabilityError::InvalidRequest(format!(
            "at most {} seats per booking",
            MAX_SEATS_PER_BOOKING
        )));
    }

    let occupied = list_booked_seats(store, movie_id, showtime).await?;

    let conflicts: BTreeSet<String> = seats.intersection(&occupied).cloned().collect();
    if conflicts.is_empty() {
        Ok(AvailabilityResult::Available)
    } else {
        Ok(AvailabilityResult::Conflict(conflicts))
    }
}

/// The union of seat labels across all committed bookings for the show.
/// A showtime with no bookings yields an empty set.
pub async fn list_booked_seats<S: BookingStore>(
    store: &S,
    movie_id: i64,
    showtime: &str,
) -> Result<BTreeSet<String>, AvailabilityError> {
    let labels = store
        .fetch_seat_labels(movie_id, showtime)
        .await
        .map_err(AvailabilityError::Unavailable)?;
    Ok(labels.into_iter().collect())
}

/// Store over the live Postgres pool.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: sqlx::PgPool,
}

impl PgBookingStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

impl BookingStore for PgBookingStore {
    async fn fetch_seat_labels(&self, movie_id: i64, showtime: &str) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT seat_label FROM booking_seats WHERE movie_id = $1 AND showtime = $2",
        )
        .bind(movie_id)
        .bind(showtime)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store keyed by (movie_id, showtime).
    #[derive(Default)]
    struct MemStore {
        bookings: Mutex<HashMap<(i64, String), Vec<Vec<String>>>>,
        fail_reads: bool,
    }

    impl MemStore {
        fn commit(&self, movie_id: i64, showtime: &str, seats: &BTreeSet<String>) {
            self.bookings
                .lock()
                .unwrap()
                .entry((movie_id, showtime.to_string()))
                .or_default()
                .push(seats.iter().cloned().collect());
        }

        fn committed_sets(&self, movie_id: i64, showtime: &str) -> Vec<BTreeSet<String>> {
            self.bookings
                .lock()
                .unwrap()
                .get(&(movie_id, showtime.to_string()))
                .map(|sets| sets.iter().map(|s| s.iter().cloned().collect()).collect())
                .unwrap_or_default()
        }
    }

    impl BookingStore for MemStore {
        async fn fetch_seat_labels(
            &self,
            movie_id: i64,
            showtime: &str,
        ) -> sqlx::Result<Vec<String>> {
            if self.fail_reads {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .get(&(movie_id, showtime.to_string()))
                .map(|sets| sets.iter().flatten().cloned().collect())
                .unwrap_or_default())
        }
    }

    fn seats(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_show_is_available() {
        let store = MemStore::default();
        let result = check_availability(&store, 1, "7:00 PM", &seats(&["A1", "B7"]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn booked_seat_conflicts() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1"])));

        let result = check_availability(&store, 1, "7:00 PM", &seats(&["A1"]))
            .await
            .unwrap();
        let expected: BTreeSet<String> = ["A1".to_string()].into();
        assert_eq!(result, AvailabilityResult::Conflict(expected));
    }

    #[tokio::test]
    async fn conflict_reports_only_colliding_labels() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1", "A2"])));

        let result = check_availability(&store, 1, "7:00 PM", &seats(&["A2", "C4"]))
            .await
            .unwrap();
        let expected: BTreeSet<String> = ["A2".to_string()].into();
        assert_eq!(result, AvailabilityResult::Conflict(expected));
    }

    #[tokio::test]
    async fn other_seat_same_show_is_available() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1"])));

        let result = check_availability(&store, 1, "7:00 PM", &seats(&["A2"]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn same_seat_different_showtime_is_available() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1"])));

        let result = check_availability(&store, 1, "10:00 PM", &seats(&["A1"]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn same_seat_different_movie_is_available() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1"])));

        let result = check_availability(&store, 2, "7:00 PM", &seats(&["A1"]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn labels_are_case_sensitive() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1"])));

        let result = check_availability(&store, 1, "7:00 PM", &seats(&["a1"]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn duplicate_requested_labels_dedupe() {
        let store = MemStore::default();
        // A seat cannot conflict with itself within one request.
        let result = check_availability(&store, 1, "7:00 PM", &seats(&["A1", "A1", " A1 "]))
            .await
            .unwrap();
        assert_eq!(result, AvailabilityResult::Available);
    }

    #[tokio::test]
    async fn empty_request_is_invalid() {
        let store = MemStore::default();
        let err = check_availability(&store, 1, "7:00 PM", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidRequest(_)));

        // Whitespace-only labels collapse to an empty set.
        let err = check_availability(&store, 1, "7:00 PM", &seats(&["  ", ""]))
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn too_many_seats_is_invalid() {
        let store = MemStore::default();
        let request: Vec<String> = (0..=MAX_SEATS_PER_BOOKING).map(|i| format!("A{i}")).collect();
        let err = check_availability(&store, 1, "7:00 PM", &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = MemStore {
            fail_reads: true,
            ..MemStore::default()
        };
        let err = check_availability(&store, 1, "7:00 PM", &seats(&["A1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn booked_seats_union_across_bookings() {
        let store = MemStore::default();
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["A1", "A2"])));
        store.commit(1, "7:00 PM", &normalize_seat_labels(&seats(&["B1"])));

        let occupied = list_booked_seats(&store, 1, "7:00 PM").await.unwrap();
        let expected: BTreeSet<String> =
            ["A1".to_string(), "A2".to_string(), "B1".to_string()].into();
        assert_eq!(occupied, expected);

        // Idempotent without intervening writes.
        let again = list_booked_seats(&store, 1, "7:00 PM").await.unwrap();
        assert_eq!(occupied, again);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn seat_label() -> impl Strategy<Value = String> {
            ("[A-E]", 1u8..=12).prop_map(|(row, n)| format!("{row}{n}"))
        }

        fn seat_request() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(seat_label(), 1..=6)
        }

        proptest! {
            // Committing only requests the checker admits keeps all
            // committed seat sets pairwise disjoint.
            #[test]
            fn admitted_bookings_stay_disjoint(requests in prop::collection::vec(seat_request(), 1..20)) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                rt.block_on(async {
                    let store = MemStore::default();
                    for request in &requests {
                        let outcome = check_availability(&store, 1, "7:00 PM", request)
                            .await
                            .unwrap();
                        if outcome == AvailabilityResult::Available {
                            store.commit(1, "7:00 PM", &normalize_seat_labels(request));
                        }
                    }

                    let committed = store.committed_sets(1, "7:00 PM");
                    for (i, a) in committed.iter().enumerate() {
                        for b in committed.iter().skip(i + 1) {
                            prop_assert!(a.is_disjoint(b), "overlap between {a:?} and {b:?}");
                        }
                    }
                    Ok(())
                })?;
            }
        }
    }
}
