use std::cell::Cell;
use std::time::Duration;

use hockey_schedule_web::cache::ResponseCache;

#[test]
fn successful_fetch_is_reused() {
    let cache: ResponseCache<String, Vec<i64>> = ResponseCache::new(10, Duration::from_secs(60));
    let calls = Cell::new(0);
    let fetch = || {
        calls.set(calls.get() + 1);
        Ok::<_, String>(vec![1, 2, 3])
    };

    let first = cache.get_or_try_insert_with("events".to_string(), fetch).unwrap();
    let second = cache.get_or_try_insert_with("events".to_string(), fetch).unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.get(), 1, "second lookup should be served from cache");
}

#[test]
fn failed_fetch_is_not_cached() {
    let cache: ResponseCache<i64, String> = ResponseCache::new(10, Duration::from_secs(60));

    let err = cache.get_or_try_insert_with(1, || Err::<String, _>("upstream down".to_string()));
    assert_eq!(err, Err("upstream down".to_string()));
    assert_eq!(cache.get(&1), None);

    let ok = cache.get_or_try_insert_with(1, || Ok::<_, String>("fresh".to_string()));
    assert_eq!(ok, Ok("fresh".to_string()));
    assert_eq!(cache.get(&1), Some("fresh".to_string()));
}

#[test]
fn invalidation_forces_refetch() {
    let cache: ResponseCache<(), Option<i64>> = ResponseCache::new(1, Duration::from_secs(60));
    cache.insert((), Some(760038));
    assert_eq!(cache.get(&()), Some(Some(760038)));

    cache.invalidate(&());
    assert_eq!(cache.get(&()), None);

    cache.insert((), None);
    cache.invalidate_all();
    assert_eq!(cache.get(&()), None);
}

#[test]
fn entries_expire_after_ttl() {
    let cache: ResponseCache<i64, i64> = ResponseCache::new(10, Duration::from_millis(50));
    cache.insert(1, 42);
    assert_eq!(cache.get(&1), Some(42));
    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(cache.get(&1), None);
}
