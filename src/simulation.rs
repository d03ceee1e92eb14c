//! Simulated case activity for demos: every interval there is a one in
//! five chance that a random ward/disease pair picks up 0 to 2 new cases.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;

use crate::core_state::CoreState;
use crate::store::EntityStore;

/// Chance that a tick produces an update.
pub const TICK_PROBABILITY: f64 = 0.2;
pub const MAX_NEW_CASES: u32 = 2;

/// The counts a tick wants to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTick {
    pub ward: String,
    pub disease: String,
    pub new_cases: u32,
    pub total_cases: u32,
}

/// Roll the dice against the current store. `None` when the tick does not
/// fire or there are no cases to update.
pub fn next_case_tick<R: Rng + ?Sized>(store: &EntityStore, rng: &mut R) -> Option<CaseTick> {
    if !rng.gen_bool(TICK_PROBABILITY) {
        return None;
    }
    let keys = store.case_keys();
    let key = keys.choose(rng)?;
    let current = store.case(&key.ward, &key.disease)?;
    let new_cases = rng.gen_range(0..=MAX_NEW_CASES);
    Some(CaseTick {
        ward: key.ward.clone(),
        disease: key.disease.clone(),
        new_cases,
        total_cases: current.total_cases.saturating_add(new_cases),
    })
}

/// Run ticks against the shared state until the task is aborted.
pub fn spawn(core: Arc<CoreState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;
        tracing::info!(interval_secs = interval.as_secs(), "Simulation started");
        loop {
            ticker.tick().await;
            let mut rng = rand::thread_rng();
            if let Err(e) = core.simulate_tick(&mut rng) {
                tracing::warn!(error = %e, "Simulation tick failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::seed;

    #[test]
    fn empty_store_never_ticks() {
        let store = EntityStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| next_case_tick(&store, &mut rng).is_none()));
    }

    #[test]
    fn ticks_fire_about_one_in_five() {
        let store = EntityStore::from_snapshot(seed::sample_snapshot());
        let mut rng = StdRng::seed_from_u64(42);
        let fired = (0..1_000)
            .filter(|_| next_case_tick(&store, &mut rng).is_some())
            .count();
        assert!((120..=280).contains(&fired), "fired {fired} times");
    }

    #[test]
    fn tick_adds_new_cases_to_total() {
        let store = EntityStore::from_snapshot(seed::sample_snapshot());
        let mut rng = StdRng::seed_from_u64(9);
        let tick = std::iter::repeat_with(|| next_case_tick(&store, &mut rng))
            .flatten()
            .next()
            .unwrap();
        let current = store.case(&tick.ward, &tick.disease).unwrap();
        assert!(tick.new_cases <= MAX_NEW_CASES);
        assert_eq!(tick.total_cases, current.total_cases + tick.new_cases);
    }
}
